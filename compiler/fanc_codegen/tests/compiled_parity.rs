//! Compiled programs must do what the interpreter does.
//!
//! Each program is run by the interpreter and, when a C compiler is
//! available, built with `CcToolchain` and run for the same frames. The
//! inspected values must agree.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::process::Command;
use std::time::Duration;

use fanc_codegen::{lower, CcToolchain, CodegenOptions, CompiledProgram, FrameError, Toolchain};
use fanc_eval::{Interpreter, Pointer, RuntimeContext, VariableStore};
use fanc_ir::{
    BinaryOp, Builtin, Catalog, Connection, EnvId, GridPos, GridSize, Program, ProgramUnit,
    SettingValue, TerminalAddress, TerminalPos, Value, ValueKind, Variable,
};
use fanc_parse::{parse, ParseOptions};
use pretty_assertions::assert_eq;

const INSPECT: Builtin = Builtin::Inspect(ValueKind::Float);
const VAR: Builtin = Builtin::Variable(ValueKind::Float);
const SET: Builtin = Builtin::SetVariable(ValueKind::Float);
const ADD: Builtin = Builtin::Binary(BinaryOp::Add);

fn have_cc() -> bool {
    let found = Command::new("cc")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success());
    if !found {
        eprintln!("no C compiler on PATH, skipping");
    }
    found
}

#[derive(Default)]
struct Recorder {
    store: VariableStore,
    inspected: Vec<(EnvId, GridPos, Value)>,
    wins: Vec<u8>,
}

impl RuntimeContext for Recorder {
    fn get_value(&self, pointer: Pointer) -> Value {
        self.store.get(pointer)
    }

    fn set_value(&mut self, pointer: Pointer, value: Value) {
        self.store.set(pointer, value);
    }

    fn win(&mut self, delay: u8) {
        self.wins.push(delay);
    }

    fn inspect(&mut self, value: Value, env: EnvId, pos: GridPos) {
        self.inspected.push((env, pos, value));
    }
}

fn at(x: u16) -> GridPos {
    GridPos::new(x, 0, 0)
}

fn term(builtin: Builtin, name: &str) -> TerminalPos {
    let layout = builtin.layout();
    layout
        .inputs
        .iter()
        .chain(&layout.outputs)
        .find(|def| def.name == name)
        .map(|def| def.pos)
        .unwrap()
}

fn wire(from: u16, from_block: Builtin, out: &str, to: u16, to_block: Builtin, input: &str) -> Connection {
    Connection::new(
        TerminalAddress::new(at(from), term(from_block, out)),
        TerminalAddress::new(at(to), term(to_block, input)),
    )
}

fn number(unit: &mut ProgramUnit, x: u16, value: f32) {
    unit.place(at(x), Builtin::Number.id())
        .setting(at(x), 0, SettingValue::Float(value));
}

fn named(unit: &mut ProgramUnit, x: u16, builtin: Builtin, name: &str) {
    unit.place(at(x), builtin.id())
        .setting(at(x), 0, SettingValue::Str(name.into()));
}

/// Sums the loop counter into `$acc` and inspects it after the loop. A
/// late update wins once physics ran.
fn accumulator() -> Program {
    let mut unit = ProgramUnit::new("main", GridSize::new(9, 1, 1));
    number(&mut unit, 0, 0.0);
    number(&mut unit, 1, 4.0);
    unit.place(at(2), Builtin::Loop.id());
    named(&mut unit, 3, VAR, "$acc");
    unit.place(at(4), ADD.id());
    named(&mut unit, 5, SET, "$acc");
    unit.place(at(6), INSPECT.id())
        .place(at(7), Builtin::LateUpdate.id())
        .place(at(8), Builtin::Win.id())
        .connect(wire(0, Builtin::Number, "Number", 2, Builtin::Loop, "Start"))
        .connect(wire(1, Builtin::Number, "Number", 2, Builtin::Loop, "Stop"))
        .connect(wire(2, Builtin::Loop, "Do", 5, SET, "Before"))
        .connect(wire(2, Builtin::Loop, "Counter", 4, ADD, "Left"))
        .connect(wire(3, VAR, "Variable", 4, ADD, "Right"))
        .connect(wire(4, ADD, "Result", 5, SET, "Value"))
        .connect(wire(2, Builtin::Loop, "After", 6, INSPECT, "Before"))
        .connect(wire(3, VAR, "Variable", 6, INSPECT, "Value"))
        .connect(wire(7, Builtin::LateUpdate, "After Physics", 8, Builtin::Win, "Before"));
    parse(&unit, &Catalog::new(), &ParseOptions::default())
        .unwrap()
        .program
}

/// Increments a counter for far longer than any budget allows.
fn runaway() -> Program {
    let mut unit = ProgramUnit::new("main", GridSize::new(5, 1, 1));
    number(&mut unit, 0, 0.0);
    number(&mut unit, 1, 3.0e9);
    unit.place(at(2), Builtin::Loop.id());
    named(&mut unit, 3, VAR, "$n");
    unit.place(at(4), Builtin::IncrementNumber.id())
        .connect(wire(0, Builtin::Number, "Number", 2, Builtin::Loop, "Start"))
        .connect(wire(1, Builtin::Number, "Number", 2, Builtin::Loop, "Stop"))
        .connect(wire(2, Builtin::Loop, "Do", 4, Builtin::IncrementNumber, "Before"))
        .connect(wire(3, VAR, "Variable", 4, Builtin::IncrementNumber, "Variable"));
    parse(&unit, &Catalog::new(), &ParseOptions::default())
        .unwrap()
        .program
}

/// Writes 9 to `$list[index]`.
fn list_write(index: f32) -> Program {
    let element = Builtin::ListElement(ValueKind::Float);
    let set = Builtin::SetPointer(ValueKind::Float);
    let mut unit = ProgramUnit::new("main", GridSize::new(5, 1, 1));
    named(&mut unit, 0, VAR, "$list");
    number(&mut unit, 1, index);
    unit.place(at(2), element.id());
    number(&mut unit, 3, 9.0);
    unit.place(at(4), set.id())
        .connect(wire(0, VAR, "Variable", 2, element, "Variable"))
        .connect(wire(1, Builtin::Number, "Number", 2, element, "Index"))
        .connect(wire(2, element, "Element", 4, set, "Variable"))
        .connect(wire(3, Builtin::Number, "Number", 4, set, "Value"));
    parse(&unit, &Catalog::new(), &ParseOptions::default())
        .unwrap()
        .program
}

fn build(program: &Program, options: &CodegenOptions) -> Box<dyn CompiledProgram> {
    let artifact = lower(program, options).unwrap();
    CcToolchain::from_env().build(&artifact).unwrap()
}

#[test]
fn frames_inspect_the_same_values() {
    if !have_cc() {
        return;
    }
    let program = accumulator();

    let mut interpreter = Interpreter::new(program.clone());
    let mut ctx = Recorder::default();
    let mut compiled = build(&program, &CodegenOptions::default());
    for _ in 0..3 {
        let before = ctx.inspected.len();
        let deferred = interpreter.run_frame(&mut ctx);
        let output = compiled.run_frame().unwrap();
        assert_eq!(output.inspected().collect::<Vec<_>>(), ctx.inspected[before..].to_vec());
        assert_eq!(output.deferred, !deferred.is_empty());
        interpreter.run_deferred(deferred, &mut ctx);
        compiled.run_late().unwrap();
    }
    assert_eq!(ctx.wins, vec![3, 3, 3]);
    // 0 + 1 + 2 + 3 per frame.
    assert_eq!(ctx.inspected.last().unwrap().2, Value::Float(18.0));
}

#[test]
fn late_updates_wait_for_run_late() {
    if !have_cc() {
        return;
    }
    let mut compiled = build(&accumulator(), &CodegenOptions::default());
    let frame = compiled.run_frame().unwrap();
    assert!(frame.deferred);
    assert!(!frame.calls.iter().any(|call| call.name == "win"));

    let late = compiled.run_late().unwrap();
    let wins: Vec<&[f32]> = late
        .calls
        .iter()
        .filter(|call| call.name == "win")
        .map(|call| call.args.as_slice())
        .collect();
    assert_eq!(wins, vec![&[3.0_f32][..]]);
}

#[test]
fn globals_are_readable_between_frames() {
    if !have_cc() {
        return;
    }
    let mut compiled = build(&accumulator(), &CodegenOptions::default());
    compiled.run_frame().unwrap();
    assert_eq!(
        compiled.global_variables().unwrap(),
        vec![("$acc".to_owned(), ValueKind::Float)]
    );
    assert_eq!(
        compiled.get_global_variable("$acc", ValueKind::Float).unwrap(),
        vec![Value::Float(6.0)]
    );
    assert!(compiled
        .get_global_variable("$missing", ValueKind::Float)
        .unwrap()
        .is_empty());
}

#[test]
fn runaway_frames_time_out_and_keep_their_effects() {
    if !have_cc() {
        return;
    }
    let options = CodegenOptions {
        time_budget: Some(Duration::from_millis(50)),
    };
    let mut compiled = build(&runaway(), &options);
    assert_eq!(
        compiled.run_frame().unwrap_err(),
        FrameError::Timeout { frame: 0 }
    );
    let counted = compiled.get_global_variable("$n", ValueKind::Float).unwrap();
    assert!(matches!(counted.as_slice(), [Value::Float(n)] if *n > 0.0));
}

#[test]
fn list_writes_past_the_length_limit_are_dropped() {
    if !have_cc() {
        return;
    }
    let nine = vec![Value::Float(0.0), Value::Float(0.0), Value::Float(9.0)];
    for (index, expected) in [(1.0e10, Vec::new()), (2.0, nine)] {
        let program = list_write(index);
        let id = program
            .variables()
            .lookup(None, &Variable::new("$list", ValueKind::Float))
            .unwrap();

        let mut store = VariableStore::new();
        let _ = Interpreter::new(program.clone()).run_frame(&mut store);
        assert_eq!(store.values(id).to_vec(), expected);

        let mut compiled = build(&program, &CodegenOptions::default());
        compiled.run_frame().unwrap();
        assert_eq!(
            compiled.get_global_variable("$list", ValueKind::Float).unwrap(),
            expected
        );
    }
}
