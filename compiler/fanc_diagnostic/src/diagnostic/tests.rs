use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("unknown block id #42")
        .with_label(Location::block("root", GridPos::new(1, 0, 2)), "placed here")
        .with_note("ids below 597 are built-in")
        .with_suggestion("register the unit in the catalog");

    assert_eq!(diag.code, ErrorCode::E1001);
    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 1);
    assert!(diag.labels[0].is_primary);
    assert_eq!(diag.notes.len(), 1);
    assert_eq!(diag.suggestions.len(), 1);
    assert_eq!(
        diag.primary_location(),
        Some(&Location::block("root", GridPos::new(1, 0, 2)))
    );
}

#[test]
fn test_diagnostic_display() {
    let diag = Diagnostic::warning(ErrorCode::E1101)
        .with_message("outside connection ignored")
        .with_label(
            Location::terminal("root", GridPos::new(0, 0, 0), TerminalPos::new(0, 1, 5)),
            "wire starts here",
        )
        .with_secondary_label(
            Location::Source {
                file: "program.c".into(),
                line: 3,
                column: 7,
            },
            "emitted here",
        )
        .with_note("the root unit has no enclosing block");

    assert_eq!(
        diag.to_string(),
        "warning[E1101]: outside connection ignored\n  \
         --> root (0, 0, 0)<0, 1, 5>: wire starts here\n      \
         program.c:3:7: emitted here\n  \
         = note: the root unit has no enclosing block"
    );
}
