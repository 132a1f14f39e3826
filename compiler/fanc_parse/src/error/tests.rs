use super::*;

#[test]
fn codes_follow_kind() {
    let error = ParseError::new(
        ParseErrorKind::UnknownBlock { id: BlockId(700) },
        "root",
        GridPos::new(1, 0, 0),
    );
    let diag = error.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E1001);
    assert_eq!(diag.message, "unknown block id #700");
    assert_eq!(
        diag.primary_location(),
        Some(&Location::block("root", GridPos::new(1, 0, 0)))
    );

    let internal = ParseError::new(
        ParseErrorKind::NoSuchTerminal {
            terminal: TerminalPos::new(9, 9, 9),
        },
        "root",
        GridPos::ORIGIN,
    );
    assert!(internal.to_diagnostic().code.is_internal());
}

#[test]
fn display_includes_location() {
    let error = ParseError::new(
        ParseErrorKind::KindMismatch {
            from: SignalKind::FLOAT,
            to: SignalKind::BOOL,
        },
        "main",
        GridPos::new(2, 0, 3),
    )
    .at_terminal(TerminalPos::new(0, 1, 5));
    assert_eq!(
        error.to_string(),
        "cannot wire a float output into a bool input at main (2, 0, 3)"
    );
    assert_eq!(
        error.to_diagnostic().primary_location(),
        Some(&Location::terminal("main", GridPos::new(2, 0, 3), TerminalPos::new(0, 1, 5)))
    );
}

#[test]
fn warnings_are_warnings() {
    let warning = ParseWarning::OutsideConnectionInRoot {
        unit: "root".into(),
        pos: GridPos::ORIGIN,
        terminal: TerminalPos::AFTER,
    };
    let diag = warning.to_diagnostic();
    assert!(!diag.is_error());
    assert!(diag.code.is_warning());
}
