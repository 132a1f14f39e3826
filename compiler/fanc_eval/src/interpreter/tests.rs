use std::sync::Arc;

use fanc_ir::{
    BinaryOp, BlockId, Builtin, Catalog, Connection, Direction, Footprint, GridPos, GridSize,
    ProgramUnit, SettingValue, SignalKind, TerminalAddress, TerminalPos, TouchState, UnitTerminal,
    UnaryOp, Variable, ValueKind,
};
use fanc_parse::{parse, ParseOptions, ParseOutput};
use pretty_assertions::assert_eq;

use super::*;
use crate::{Pointer, VariableStore};

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Inspect(EnvId, GridPos, Value),
    Win(u8),
}

/// Records effects and answers sensors from fixed fields.
#[derive(Default)]
struct Recorder {
    store: VariableStore,
    events: Vec<Event>,
    touch: Option<(f32, f32)>,
}

impl Recorder {
    fn inspected(&self) -> Vec<(GridPos, Value)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Inspect(_, pos, value) => Some((*pos, *value)),
                Event::Win(_) => None,
            })
            .collect()
    }
}

impl RuntimeContext for Recorder {
    fn get_value(&self, pointer: Pointer) -> Value {
        self.store.get(pointer)
    }

    fn set_value(&mut self, pointer: Pointer, value: Value) {
        self.store.set(pointer, value);
    }

    fn win(&mut self, delay: u8) {
        self.events.push(Event::Win(delay));
    }

    fn touch(&mut self, _state: TouchState, _finger: u8) -> Option<(f32, f32)> {
        self.touch
    }

    fn inspect(&mut self, value: Value, env: EnvId, pos: GridPos) {
        self.events.push(Event::Inspect(env, pos, value));
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

fn flow(from: u16, from_block: Builtin, to: u16, to_block: Builtin) -> Connection {
    wire(from, from_block, "After", to, to_block, "Before")
}

fn number(unit: &mut ProgramUnit, x: u16, value: f32) {
    unit.place(at(x), Builtin::Number.id())
        .setting(at(x), 0, SettingValue::Float(value));
}

fn named(unit: &mut ProgramUnit, x: u16, block: Builtin, name: &str) {
    unit.place(at(x), block.id())
        .setting(at(x), 0, SettingValue::Str(name.into()));
}

fn parse_ok(unit: &ProgramUnit, catalog: &Catalog) -> ParseOutput {
    parse(unit, catalog, &ParseOptions::default()).unwrap()
}

/// Run `frames` full frames, late updates included.
fn run(unit: &ProgramUnit, catalog: &Catalog, frames: usize) -> Recorder {
    let mut interpreter = Interpreter::new(parse_ok(unit, catalog).program);
    let mut ctx = Recorder::default();
    for _ in 0..frames {
        let late = interpreter.run_frame(&mut ctx);
        interpreter.run_deferred(late, &mut ctx);
    }
    ctx
}

const INSPECT: Builtin = Builtin::Inspect(ValueKind::Float);

#[test]
fn statement_chain_runs_in_order_once_per_frame() {
    let mut unit = ProgramUnit::new("main", GridSize::new(3, 1, 1));
    unit.place(at(0), INSPECT.id())
        .place(at(1), INSPECT.id())
        .place(at(2), INSPECT.id())
        .connect(flow(1, INSPECT, 2, INSPECT))
        .connect(flow(0, INSPECT, 1, INSPECT));

    let ctx = run(&unit, &Catalog::new(), 2);
    let order: Vec<GridPos> = ctx.inspected().into_iter().map(|(pos, _)| pos).collect();
    assert_eq!(order, vec![at(0), at(1), at(2), at(0), at(1), at(2)]);
}

/// `condition -> If`, `True -> inspect(2)`, `After -> inspect(3)`; the
/// `False` exit is left unwired.
fn if_unit(condition: Builtin) -> ProgramUnit {
    let mut unit = ProgramUnit::new("main", GridSize::new(4, 1, 1));
    unit.place(at(0), condition.id())
        .place(at(1), Builtin::If.id())
        .place(at(2), INSPECT.id())
        .place(at(3), INSPECT.id())
        .connect(wire(0, condition, "Bool", 1, Builtin::If, "Condition"))
        .connect(wire(1, Builtin::If, "True", 2, INSPECT, "Before"))
        .connect(flow(1, Builtin::If, 3, INSPECT));
    unit
}

#[test]
fn if_runs_the_branch_before_after() {
    let ctx = run(&if_unit(Builtin::True), &Catalog::new(), 1);
    let order: Vec<GridPos> = ctx.inspected().into_iter().map(|(pos, _)| pos).collect();
    assert_eq!(order, vec![at(2), at(3)]);
}

#[test]
fn if_skips_an_unwired_branch() {
    let ctx = run(&if_unit(Builtin::False), &Catalog::new(), 1);
    let order: Vec<GridPos> = ctx.inspected().into_iter().map(|(pos, _)| pos).collect();
    assert_eq!(order, vec![at(3)]);
}

#[test]
fn folded_condition_selects_the_same_branch() {
    // 3 < 2 folds to false; 2 < 3 to true.
    let less = Builtin::Binary(BinaryOp::Less);
    for (left, right, runs) in [(3.0, 2.0, 0), (2.0, 3.0, 1)] {
        let mut unit = ProgramUnit::new("main", GridSize::new(5, 1, 1));
        number(&mut unit, 0, left);
        number(&mut unit, 1, right);
        unit.place(at(2), less.id())
            .place(at(3), Builtin::If.id())
            .place(at(4), INSPECT.id())
            .connect(wire(0, Builtin::Number, "Number", 2, less, "Left"))
            .connect(wire(1, Builtin::Number, "Number", 2, less, "Right"))
            .connect(wire(2, less, "Result", 3, Builtin::If, "Condition"))
            .connect(wire(3, Builtin::If, "True", 4, INSPECT, "Before"));
        let output = parse_ok(&unit, &Catalog::new());
        let folded = fanc_fold::fold(&output.tree);
        assert!(!Arc::ptr_eq(&folded, &output.tree));

        let mut interpreter = Interpreter::new(Program::instantiate(folded, &output.globals));
        let mut ctx = Recorder::default();
        let _ = interpreter.run_frame(&mut ctx);
        assert_eq!(ctx.inspected().len(), runs);
    }
}

fn loop_unit(start: f32, stop: f32) -> ProgramUnit {
    let mut unit = ProgramUnit::new("main", GridSize::new(5, 1, 1));
    number(&mut unit, 0, start);
    number(&mut unit, 1, stop);
    unit.place(at(2), Builtin::Loop.id())
        .place(at(3), INSPECT.id())
        .place(at(4), INSPECT.id())
        .connect(wire(0, Builtin::Number, "Number", 2, Builtin::Loop, "Start"))
        .connect(wire(1, Builtin::Number, "Number", 2, Builtin::Loop, "Stop"))
        .connect(wire(2, Builtin::Loop, "Do", 3, INSPECT, "Before"))
        .connect(wire(2, Builtin::Loop, "Counter", 3, INSPECT, "Value"))
        .connect(flow(2, Builtin::Loop, 4, INSPECT))
        .connect(wire(2, Builtin::Loop, "Counter", 4, INSPECT, "Value"));
    unit
}

#[test]
fn loop_counts_up_to_stop_exclusive() {
    let ctx = run(&loop_unit(0.0, 3.0), &Catalog::new(), 1);
    assert_eq!(
        ctx.inspected(),
        vec![
            (at(3), Value::Float(0.0)),
            (at(3), Value::Float(1.0)),
            (at(3), Value::Float(2.0)),
            // After reads the counter's last value.
            (at(4), Value::Float(2.0)),
        ]
    );
}

#[test]
fn loop_counts_down_when_stop_is_below_start() {
    let ctx = run(&loop_unit(3.0, 0.0), &Catalog::new(), 1);
    let counters: Vec<Value> = ctx.inspected().into_iter().map(|(_, value)| value).collect();
    assert_eq!(
        counters,
        vec![Value::Float(3.0), Value::Float(2.0), Value::Float(1.0), Value::Float(1.0)]
    );
}

#[test]
fn empty_loop_leaves_the_counter_unset() {
    let ctx = run(&loop_unit(2.0, 2.0), &Catalog::new(), 1);
    assert_eq!(ctx.inspected(), vec![(at(4), Value::Float(0.0))]);
}

#[test]
fn play_sensor_fires_on_the_first_frame_only() {
    let mut unit = ProgramUnit::new("main", GridSize::new(2, 1, 1));
    unit.place(at(0), Builtin::PlaySensor.id())
        .place(at(1), Builtin::Win.id())
        .setting(at(1), 0, SettingValue::Byte(1))
        .connect(wire(0, Builtin::PlaySensor, "On Play", 1, Builtin::Win, "Before"));
    let ctx = run(&unit, &Catalog::new(), 3);
    assert_eq!(ctx.events, vec![Event::Win(1)]);
}

#[test]
fn late_update_waits_for_run_deferred() {
    let mut unit = ProgramUnit::new("main", GridSize::new(3, 1, 1));
    unit.place(at(0), Builtin::LateUpdate.id())
        .place(at(1), INSPECT.id())
        .place(at(2), INSPECT.id())
        .connect(wire(0, Builtin::LateUpdate, "After Physics", 1, INSPECT, "Before"))
        .connect(flow(0, Builtin::LateUpdate, 2, INSPECT));
    let mut interpreter = Interpreter::new(parse_ok(&unit, &Catalog::new()).program);
    let mut ctx = Recorder::default();

    let late = interpreter.run_frame(&mut ctx);
    assert_eq!(late.points().len(), 1);
    assert_eq!(ctx.inspected().len(), 1);
    assert_eq!(ctx.inspected()[0].0, at(2));

    interpreter.run_deferred(late, &mut ctx);
    assert_eq!(ctx.inspected()[1].0, at(1));
    assert_eq!(interpreter.frame(), 1);
}

#[test]
fn variables_persist_in_the_context() {
    let var = Builtin::Variable(ValueKind::Float);
    let set = Builtin::SetVariable(ValueKind::Float);
    let mut unit = ProgramUnit::new("main", GridSize::new(5, 1, 1));
    number(&mut unit, 0, 7.0);
    named(&mut unit, 1, set, "score");
    named(&mut unit, 2, var, "score");
    unit.place(at(3), Builtin::IncrementNumber.id())
        .place(at(4), INSPECT.id())
        .connect(wire(0, Builtin::Number, "Number", 1, set, "Value"))
        .connect(flow(1, set, 3, Builtin::IncrementNumber))
        .connect(wire(2, var, "Variable", 3, Builtin::IncrementNumber, "Variable"))
        .connect(flow(3, Builtin::IncrementNumber, 4, INSPECT))
        .connect(wire(2, var, "Variable", 4, INSPECT, "Value"));

    let ctx = run(&unit, &Catalog::new(), 2);
    assert_eq!(
        ctx.inspected(),
        vec![(at(4), Value::Float(8.0)), (at(4), Value::Float(8.0))]
    );
}

/// Writes 9 to `list[index]` and returns what the list holds afterwards.
fn write_list_element(index: f32) -> Vec<Value> {
    let var = Builtin::Variable(ValueKind::Float);
    let element = Builtin::ListElement(ValueKind::Float);
    let set = Builtin::SetPointer(ValueKind::Float);
    let mut unit = ProgramUnit::new("main", GridSize::new(5, 1, 1));
    named(&mut unit, 0, var, "list");
    number(&mut unit, 1, index);
    unit.place(at(2), element.id());
    number(&mut unit, 3, 9.0);
    unit.place(at(4), set.id())
        .connect(wire(0, var, "Variable", 2, element, "Variable"))
        .connect(wire(1, Builtin::Number, "Number", 2, element, "Index"))
        .connect(wire(2, element, "Element", 4, set, "Variable"))
        .connect(wire(3, Builtin::Number, "Number", 4, set, "Value"));

    let output = parse_ok(&unit, &Catalog::new());
    let id = output
        .program
        .variables()
        .lookup(Some(EnvId::ROOT), &Variable::new("list", ValueKind::Float))
        .unwrap();
    let mut interpreter = Interpreter::new(output.program);
    let mut ctx = Recorder::default();
    let _ = interpreter.run_frame(&mut ctx);
    ctx.store.values(id).to_vec()
}

#[test]
fn list_elements_floor_their_index_and_grow_storage() {
    assert_eq!(
        write_list_element(2.7),
        vec![Value::Float(0.0), Value::Float(0.0), Value::Float(9.0)]
    );
}

#[test]
fn list_writes_past_the_length_limit_are_dropped() {
    assert!(write_list_element(1.0e10).is_empty());
    assert!(write_list_element(-1.0).is_empty());
}

#[test]
fn sensor_outputs_stay_readable_downstream() {
    let touch = Builtin::TouchSensor;
    let mut unit = ProgramUnit::new("main", GridSize::new(2, 1, 1));
    unit.place(at(0), touch.id())
        .place(at(1), INSPECT.id())
        .connect(wire(0, touch, "Touched", 1, INSPECT, "Before"))
        .connect(wire(0, touch, "Screen Y", 1, INSPECT, "Value"));
    let mut interpreter = Interpreter::new(parse_ok(&unit, &Catalog::new()).program);
    let mut ctx = Recorder::default();

    let _ = interpreter.run_frame(&mut ctx);
    assert!(ctx.events.is_empty());

    ctx.touch = Some((4.0, 5.0));
    let _ = interpreter.run_frame(&mut ctx);
    assert_eq!(ctx.inspected(), vec![(at(1), Value::Float(5.0))]);
    assert_eq!(
        interpreter.block_state(EnvId::ROOT, fanc_ir::NodeId(0)),
        Some([Value::Float(4.0), Value::Float(5.0)].as_slice())
    );
}

#[test]
fn disconnected_inputs_read_defaults() {
    let look = Builtin::LookRotation;
    let inspect = Builtin::Inspect(ValueKind::Rot);
    let mut unit = ProgramUnit::new("main", GridSize::new(2, 1, 1));
    unit.place(at(0), look.id())
        .place(at(1), inspect.id())
        .connect(wire(0, look, "Rotation", 1, inspect, "Value"));
    let ctx = run(&unit, &Catalog::new(), 1);
    assert_eq!(
        ctx.inspected(),
        vec![(
            at(1),
            Value::Rot(fanc_ir::math::look_rotation(glam::Vec3::ZERO, glam::Vec3::Y))
        )]
    );
}

/// A statement block with a flow in and out, negating its input into its
/// output and inspecting the result on the way through.
fn negate_block() -> (ProgramUnit, [TerminalPos; 4]) {
    let negate = Builtin::Unary(UnaryOp::Negate);
    let footprint = Footprint::new(2, 1, 2);
    let enter = TerminalPos::before(footprint);
    let value = TerminalPos::input(0, footprint).unwrap();
    let leave = TerminalPos::AFTER;
    let result = TerminalPos::output(0, footprint).unwrap();
    let terminal = |name: &str, kind, direction, pos| UnitTerminal {
        name: name.into(),
        kind,
        direction,
        pos,
    };

    let mut body = ProgramUnit::new("negate", GridSize::new(2, 1, 1));
    body.footprint = footprint;
    body.terminals = vec![
        terminal("In", SignalKind::Void, Direction::In, enter),
        terminal("Value", SignalKind::FLOAT, Direction::In, value),
        terminal("Out", SignalKind::Void, Direction::Out, leave),
        terminal("Result", SignalKind::FLOAT, Direction::Out, result),
    ];
    body.place(at(0), INSPECT.id())
        .place(at(1), negate.id())
        .connect(Connection::from_outside(
            enter,
            TerminalAddress::new(at(0), term(INSPECT, "Before")),
        ))
        .connect(Connection::to_outside(
            TerminalAddress::new(at(0), TerminalPos::AFTER),
            leave,
        ))
        .connect(Connection::from_outside(
            value,
            TerminalAddress::new(at(1), term(negate, "Value")),
        ))
        .connect(Connection::to_outside(
            TerminalAddress::new(at(1), term(negate, "Result")),
            result,
        ))
        .connect(wire(1, negate, "Result", 0, INSPECT, "Value"));
    (body, [enter, value, leave, result])
}

#[test]
fn custom_blocks_run_their_body_and_continue_outside() {
    let (body, [_, value, leave, result]) = negate_block();
    let mut catalog = Catalog::new();
    catalog.add_unit(BlockId(600), body).unwrap();

    let mut root = ProgramUnit::new("main", GridSize::new(4, 1, 1));
    number(&mut root, 0, 3.0);
    root.place(at(1), BlockId(600))
        .place(at(3), INSPECT.id())
        .connect(Connection::new(
            TerminalAddress::new(at(0), term(Builtin::Number, "Number")),
            TerminalAddress::new(at(1), value),
        ))
        .connect(Connection::new(
            TerminalAddress::new(at(1), leave),
            TerminalAddress::new(at(3), term(INSPECT, "Before")),
        ))
        .connect(Connection::new(
            TerminalAddress::new(at(1), result),
            TerminalAddress::new(at(3), term(INSPECT, "Value")),
        ));

    let ctx = run(&root, &catalog, 1);
    assert_eq!(
        ctx.events,
        vec![
            Event::Inspect(EnvId(1), at(0), Value::Float(-3.0)),
            Event::Inspect(EnvId::ROOT, at(3), Value::Float(-3.0)),
        ]
    );
}

#[test]
fn reset_starts_over_at_frame_zero() {
    let mut unit = ProgramUnit::new("main", GridSize::new(2, 1, 1));
    unit.place(at(0), Builtin::PlaySensor.id())
        .place(at(1), Builtin::Win.id())
        .connect(wire(0, Builtin::PlaySensor, "On Play", 1, Builtin::Win, "Before"));
    let mut interpreter = Interpreter::new(parse_ok(&unit, &Catalog::new()).program);
    let mut ctx = Recorder::default();
    let _ = interpreter.run_frame(&mut ctx);
    let _ = interpreter.run_frame(&mut ctx);
    interpreter.reset();
    let _ = interpreter.run_frame(&mut ctx);
    assert_eq!(ctx.events.len(), 2);
}
