use fanc_diagnostic::{ErrorCode, Location};
use fanc_ir::{ConstraintRef, EnvId, GridPos, ObjectRef, Value, ValueKind};
use glam::{Quat, Vec3};
use pretty_assertions::assert_eq;

use super::*;

fn artifact_with_blocks() -> Artifact {
    Artifact::new(
        String::new(),
        vec!["entry_0".to_owned()],
        vec![
            (4, Location::block("main", GridPos::new(0, 0, 0))),
            (9, Location::block("main", GridPos::new(2, 0, 0))),
        ],
    )
}

#[test]
fn compiler_messages_map_to_blocks() {
    let stderr = "\
/tmp/x/program.c:11:5: error: 'h' undeclared
/tmp/x/runner.c:3:1: warning: unused variable
In file included from program.c:1:
";
    let messages = parse_compiler_messages(stderr, &artifact_with_blocks());
    assert_eq!(messages.len(), 2);

    assert_eq!(messages[0].line, 11);
    assert_eq!(messages[0].column, 5);
    assert_eq!(messages[0].severity, "error");
    assert_eq!(messages[0].message, "'h' undeclared");
    assert_eq!(
        messages[0].block,
        Some(Location::block("main", GridPos::new(2, 0, 0)))
    );

    // Only the generated program maps back to blocks.
    assert_eq!(messages[1].severity, "warning");
    assert_eq!(messages[1].block, None);
}

#[test]
fn compile_diagnostic_points_at_source_and_block() {
    let artifact = artifact_with_blocks();
    let stderr = "program.c:5:2: error: expected ';'\n";
    let error = ToolchainError::Compile {
        compiler: "cc".to_owned(),
        exit_code: Some(1),
        messages: parse_compiler_messages(stderr, &artifact),
        stderr: stderr.to_owned(),
    };
    let diag = error.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E2001);
    assert_eq!(
        diag.primary_location(),
        Some(&Location::Source {
            file: "program.c".to_owned(),
            line: 5,
            column: 2,
        })
    );
    assert!(diag.labels.iter().any(|label| !label.is_primary
        && label.location == Location::block("main", GridPos::new(0, 0, 0))));
}

#[test]
fn error_codes_by_failure() {
    let missing = ToolchainError::CompilerNotFound {
        compiler: "cc".to_owned(),
        message: "No such file".to_owned(),
    };
    assert_eq!(missing.to_diagnostic().code, ErrorCode::E2002);
    assert!(!missing.to_diagnostic().suggestions.is_empty());

    let io = ToolchainError::Io {
        message: "pipe".to_owned(),
    };
    assert_eq!(io.to_diagnostic().code, ErrorCode::E2003);

    assert_eq!(
        FrameError::Timeout { frame: 3 }.to_diagnostic().code,
        ErrorCode::E3001
    );
    let exited = FrameError::RunnerExited {
        message: "signal 11".to_owned(),
    };
    assert_eq!(exited.to_diagnostic().code, ErrorCode::E3002);
    let garbled = FrameError::Protocol {
        line: "???".to_owned(),
    };
    assert_eq!(garbled.to_diagnostic().code, ErrorCode::E3002);
}

#[test]
fn missing_compiler_is_reported() {
    let artifact = artifact_with_blocks();
    let result = CcToolchain::new()
        .with_compiler("fanc-no-such-compiler")
        .build(&artifact);
    assert!(matches!(
        result,
        Err(ToolchainError::CompilerNotFound { compiler, .. }) if compiler == "fanc-no-such-compiler"
    ));
}

#[test]
fn inspect_calls_decode_their_value() {
    let call = HostCall {
        name: "inspect".to_owned(),
        args: vec![1.0, 2.0, 0.0, 3.0, 1.0, 0.5, -1.0, 4.0, 0.0],
    };
    assert_eq!(
        call.inspected(),
        Some((
            EnvId(1),
            GridPos::new(2, 0, 3),
            Value::Vec3(Vec3::new(0.5, -1.0, 4.0))
        ))
    );

    let other = HostCall {
        name: "win".to_owned(),
        args: vec![3.0],
    };
    assert_eq!(other.inspected(), None);

    let short = HostCall {
        name: "inspect".to_owned(),
        args: vec![0.0, 0.0],
    };
    assert_eq!(short.inspected(), None);
}

#[test]
fn values_rebuild_from_floats() {
    assert_eq!(
        value_from_floats(ValueKind::Float, &[2.5]),
        Some(Value::Float(2.5))
    );
    assert_eq!(
        value_from_floats(ValueKind::Rot, &[0.0, 0.0, 0.0, 1.0]),
        Some(Value::Rot(Quat::IDENTITY))
    );
    assert_eq!(
        value_from_floats(ValueKind::Bool, &[1.0]),
        Some(Value::Bool(true))
    );
    assert_eq!(
        value_from_floats(ValueKind::Obj, &[-1.0]),
        Some(Value::Obj(ObjectRef(-1)))
    );
    assert_eq!(
        value_from_floats(ValueKind::Con, &[7.0]),
        Some(Value::Con(ConstraintRef(7)))
    );
    assert_eq!(value_from_floats(ValueKind::Vec3, &[1.0, 2.0]), None);
    assert_eq!(value_from_floats(ValueKind::Float, &[]), None);
}

#[test]
fn widths_match_the_runtime_layout() {
    let widths: Vec<usize> = ValueKind::ALL.into_iter().map(kind_width).collect();
    assert_eq!(widths.iter().sum::<usize>(), 11);
    assert_eq!(kind_width(ValueKind::Rot), 4);
}
