//! Lowering of an instantiated program to C.
//!
//! Generated code follows the interpreter's execution order exactly:
//! statements run depth first, the first exit and the first wire of each
//! exit before the next, and inputs are read in input order.
//!
//! # Layout of the output
//!
//! ```text
//! #include "fanc_runtime.h"
//! variable lists      v<id>                    one per variable instance
//! state slots         s<env>_<node>_<out>      statement outputs
//! prototypes
//! entry_<i>           one per root entry point
//! flow_<env>_<node>_<x>_<y>_<z>  shared flow targets
//! late_<env>_<node>   late-update flows
//! x<env>_<node>_<out> expression outputs
//! exports             fc_run_frame, fc_run_late, fc_globals, ...
//! ```
//!
//! A flow point with more than one incoming connection becomes a function
//! called from each predecessor; every other point is inlined into its only
//! predecessor. Points revisited through a flow cycle are also emitted as
//! functions so inlining terminates.

mod expr;
mod stmt;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use fanc_diagnostic::Location;
use fanc_ir::{
    ensure_sufficient_stack, EnvId, FlowPoint, NodeId, Program, Value, ValueKind, ValueSource,
};
use rustc_hash::FxHashSet;

use crate::artifact::{Artifact, RUNTIME_FILE};
use crate::{CodegenContext, CodegenError};

/// Lowering options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Wall budget of one frame (or one late-update run). When set, every
    /// loop iteration and every shared flow function checks it and the
    /// frame aborts with a timeout once it is spent.
    pub time_budget: Option<Duration>,
}

/// Lower `program` to a C translation unit.
pub fn lower(program: &Program, options: &CodegenOptions) -> Result<Artifact, CodegenError> {
    let mut lowerer = Lowerer::new(program, options);
    lowerer.emit_entries()?;
    lowerer.drain()?;
    let artifact = lowerer.assemble();
    tracing::debug!(
        functions = artifact.functions.len(),
        lines = artifact.source.lines().count(),
        "lowered program"
    );
    Ok(artifact)
}

/// Work the lowering still has to do.
#[derive(Copy, Clone, Debug)]
enum Pending {
    Flow(FlowPoint),
    Late(EnvId, NodeId),
    Expr(ValueSource),
}

pub(crate) struct Lowerer<'a> {
    program: &'a Program,
    budget: bool,
    budget_ms: f64,
    /// Points with more than one incoming flow.
    shared: FxHashSet<FlowPoint>,
    /// Points being inlined into the current function, outermost first.
    inlining: Vec<FlowPoint>,
    pending: Vec<Pending>,
    /// Statement output slots and their kinds.
    slots: BTreeMap<(EnvId, NodeId, u8), ValueKind>,
    entries: Vec<String>,
    functions: Vec<String>,
    prototypes: Vec<String>,
    ctx: CodegenContext,
}

impl<'a> Lowerer<'a> {
    #[expect(clippy::cast_precision_loss, reason = "budgets are far below 2^52 microseconds")]
    fn new(program: &'a Program, options: &CodegenOptions) -> Self {
        let shared = program
            .incoming_flows()
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(point, _)| point)
            .collect();
        Lowerer {
            program,
            budget: options.time_budget.is_some(),
            budget_ms: options
                .time_budget
                .map_or(0.0, |budget| budget.as_micros() as f64 / 1000.0),
            shared,
            inlining: Vec::new(),
            pending: Vec::new(),
            slots: BTreeMap::new(),
            entries: Vec::new(),
            functions: Vec::new(),
            prototypes: Vec::new(),
            ctx: CodegenContext::new(),
        }
    }

    fn emit_entries(&mut self) -> Result<(), CodegenError> {
        let root = self.program.root();
        for (index, entry) in root.tree.entry_points.iter().enumerate() {
            let point = FlowPoint {
                env: root.id,
                node: entry.node,
                terminal: entry.terminal,
            };
            let name = format!("entry_{index}");
            self.begin_function(&name, "void");
            self.inlining.push(point);
            let result = self.emit_stmt(point);
            self.inlining.clear();
            result?;
            self.end_function();
            self.entries.push(name);
        }
        Ok(())
    }

    /// Emit requested functions until none are left.
    fn drain(&mut self) -> Result<(), CodegenError> {
        while let Some(pending) = self.pending.pop() {
            match pending {
                Pending::Flow(point) => {
                    self.begin_function(&flow_name(point), "void");
                    if self.budget {
                        self.ctx.writeln("FC_CHECK_BUDGET(h);");
                    }
                    self.inlining.push(point);
                    let result = self.emit_stmt(point);
                    self.inlining.clear();
                    result?;
                    self.end_function();
                }
                Pending::Late(env, node) => {
                    self.begin_function(&late_name(env, node), "void");
                    self.emit_exit(env, node, fanc_ir::StmtKind::BRANCH_EXIT)?;
                    self.end_function();
                }
                Pending::Expr(source) => self.emit_expr_function(source),
            }
        }
        Ok(())
    }

    fn begin_function(&mut self, name: &str, returns: &str) {
        self.functions.push(name.to_owned());
        self.prototypes
            .push(format!("static {returns} {name}(fc_host *h);"));
        self.ctx.writeln(&format!("static {returns} {name}(fc_host *h) {{"));
        self.ctx.indent();
    }

    fn end_function(&mut self) {
        self.ctx.dedent();
        self.ctx.writeln("}");
        self.ctx.newline();
    }

    /// Emit the statement at `point`, or a call when it has its own function.
    pub(crate) fn emit_point(&mut self, point: FlowPoint) -> Result<(), CodegenError> {
        if self.shared.contains(&point) || self.inlining.contains(&point) {
            let name = self.request_flow(point);
            self.ctx.writeln(&format!("{name}(h);"));
            return Ok(());
        }
        self.inlining.push(point);
        let result = ensure_sufficient_stack(|| self.emit_stmt(point));
        self.inlining.pop();
        result
    }

    /// Emit everything wired to exit `exit` of `node`, in connection order.
    pub(crate) fn emit_exit(
        &mut self,
        env: EnvId,
        node: NodeId,
        exit: usize,
    ) -> Result<(), CodegenError> {
        for point in self.program.exit_points(env, node, exit) {
            self.emit_point(point)?;
        }
        Ok(())
    }

    fn request_flow(&mut self, point: FlowPoint) -> String {
        let name = flow_name(point);
        if !self.ctx.has_helper(&name) {
            self.ctx.mark_helper(name.as_str());
            self.pending.push(Pending::Flow(point));
        }
        name
    }

    pub(crate) fn request_late(&mut self, env: EnvId, node: NodeId) -> String {
        let name = late_name(env, node);
        if !self.ctx.has_helper(&name) {
            self.ctx.mark_helper(name.as_str());
            self.pending.push(Pending::Late(env, node));
        }
        name
    }

    pub(crate) fn request_expr(&mut self, source: ValueSource) -> String {
        let name = expr_name(source);
        if !self.ctx.has_helper(&name) {
            self.ctx.mark_helper(name.as_str());
            self.pending.push(Pending::Expr(source));
        }
        name
    }

    /// Name of the slot holding output `output` of statement `node`.
    pub(crate) fn slot(&mut self, env: EnvId, node: NodeId, output: u8, kind: ValueKind) -> String {
        self.slots.insert((env, node, output), kind);
        slot_name(env, node, output)
    }

    pub(crate) fn block_location(&self, env: EnvId, node: NodeId) -> Location {
        let tree = &self.program.env(env).tree;
        Location::block(tree.name.as_str(), tree.node(node).pos)
    }

    fn assemble(mut self) -> Artifact {
        let (body, marks) = self.ctx.take_output();
        let mut head = String::with_capacity(body.len() + 2048);

        let _ = writeln!(head, "/* Generated by the Fanc compiler. */");
        let _ = writeln!(head, "#include \"{RUNTIME_FILE}\"");
        head.push('\n');

        let variables = self.program.variables();
        for (id, info) in variables.iter() {
            let _ = writeln!(
                head,
                "static fc_list_{} v{}; /* {} */",
                info.variable.kind.name(),
                id.0,
                comment_text(&info.variable.name)
            );
        }
        for ((env, node, output), kind) in &self.slots {
            let _ = writeln!(
                head,
                "static {} {} = {};",
                c_type(*kind),
                slot_name(*env, *node, *output),
                initializer(&Value::zero(*kind))
            );
        }
        head.push('\n');
        for prototype in &self.prototypes {
            head.push_str(prototype);
            head.push('\n');
        }
        head.push('\n');

        // Shift block marks past the preamble.
        let offset = u32::try_from(head.lines().count()).unwrap_or(u32::MAX);
        let lines = marks
            .into_iter()
            .map(|(line, location)| (line + offset, location))
            .collect();

        head.push_str(&body);
        self.write_exports(&mut head);
        Artifact::new(head, self.functions, lines)
    }

    fn write_exports(&self, out: &mut String) {
        let globals: Vec<_> = self.program.variables().globals().collect();
        let _ = writeln!(out, "static const fc_global fc_global_table[] = {{");
        for (id, variable) in &globals {
            let _ = writeln!(
                out,
                "    {{{}, {}, &v{}}},",
                c_string(&variable.name),
                kind_constant(variable.kind),
                id.0
            );
        }
        let _ = writeln!(out, "    {{NULL, 0, NULL}}");
        let _ = writeln!(out, "}};");
        out.push('\n');
        let _ = writeln!(out, "int fc_global_count(void) {{ return {}; }}", globals.len());
        let _ = writeln!(out, "const fc_global *fc_globals(void) {{ return fc_global_table; }}");
        let _ = writeln!(out, "int32_t fc_get_global(int32_t index, float *out, int32_t capacity) {{");
        let _ = writeln!(out, "    if (index < 0 || index >= {}) return 0;", globals.len());
        let _ = writeln!(out, "    return fc_flatten_global(&fc_global_table[index], out, capacity);");
        let _ = writeln!(out, "}}");
        out.push('\n');

        let _ = writeln!(out, "int fc_run_frame(fc_host *h) {{");
        let _ = writeln!(out, "    fc_frame = fc_frames_run++;");
        let _ = writeln!(out, "    fc_late_len = 0;");
        let _ = writeln!(out, "    fc_in_late = false;");
        self.write_budget_start(out, "");
        for entry in &self.entries {
            let _ = writeln!(out, "    {entry}(h);");
        }
        let _ = writeln!(out, "    return fc_late_len > 0 ? FC_DEFERRED : FC_OK;");
        let _ = writeln!(out, "}}");
        out.push('\n');

        let _ = writeln!(out, "int fc_run_late(fc_host *h) {{");
        let _ = writeln!(out, "    fc_in_late = true;");
        self.write_budget_start(out, " fc_in_late = false; fc_late_len = 0;");
        let _ = writeln!(out, "    for (int32_t i = 0; i < fc_late_len; i++) fc_late_queue[i](h);");
        let _ = writeln!(out, "    fc_late_len = 0;");
        let _ = writeln!(out, "    fc_in_late = false;");
        let _ = writeln!(out, "    return FC_OK;");
        let _ = writeln!(out, "}}");
    }

    fn write_budget_start(&self, out: &mut String, on_timeout: &str) {
        if !self.budget {
            return;
        }
        let _ = writeln!(out, "    fc_budget_start({:?});", self.budget_ms);
        let _ = writeln!(
            out,
            "    if (setjmp(fc_timeout_jmp) != 0) {{{on_timeout} return FC_TIMEOUT; }}"
        );
    }
}

fn flow_name(point: FlowPoint) -> String {
    let t = point.terminal;
    format!("flow_{}_{}_{}_{}_{}", point.env.0, point.node.0, t.x, t.y, t.z)
}

fn late_name(env: EnvId, node: NodeId) -> String {
    format!("late_{}_{}", env.0, node.0)
}

fn expr_name(source: ValueSource) -> String {
    format!("x{}_{}_{}", source.env.0, source.node.0, source.output)
}

fn slot_name(env: EnvId, node: NodeId, output: u8) -> String {
    format!("s{}_{}_{}", env.0, node.0, output)
}

pub(crate) fn c_type(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Float => "float",
        ValueKind::Vec3 => "fc_vec3",
        ValueKind::Rot => "fc_quat",
        ValueKind::Bool => "bool",
        ValueKind::Obj => "fc_obj",
        ValueKind::Con => "fc_con",
    }
}

fn kind_constant(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Float => "FC_KIND_FLOAT",
        ValueKind::Vec3 => "FC_KIND_VEC3",
        ValueKind::Rot => "FC_KIND_ROT",
        ValueKind::Bool => "FC_KIND_BOOL",
        ValueKind::Obj => "FC_KIND_OBJ",
        ValueKind::Con => "FC_KIND_CON",
    }
}

/// A C float literal that reads back as exactly `value`.
pub(crate) fn float_literal(value: f32) -> String {
    if value.is_nan() {
        "NAN".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 { "INFINITY" } else { "(-INFINITY)" }.to_owned()
    } else if value.is_sign_negative() {
        format!("({value:?}f)")
    } else {
        format!("{value:?}f")
    }
}

/// `value` as a C expression.
pub(crate) fn literal(value: &Value) -> String {
    match value {
        Value::Float(v) => float_literal(*v),
        Value::Vec3(v) => format!(
            "fc_vec3_make({}, {}, {})",
            float_literal(v.x),
            float_literal(v.y),
            float_literal(v.z)
        ),
        Value::Rot(q) => format!(
            "fc_quat_make({}, {}, {}, {})",
            float_literal(q.x),
            float_literal(q.y),
            float_literal(q.z),
            float_literal(q.w)
        ),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_owned(),
        Value::Obj(o) => format!("((fc_obj){})", o.0),
        Value::Con(c) => format!("((fc_con){})", c.0),
    }
}

/// `value` as a static initializer.
fn initializer(value: &Value) -> String {
    match value {
        Value::Vec3(v) => format!("{{{}, {}, {}}}", float_literal(v.x), float_literal(v.y), float_literal(v.z)),
        Value::Rot(q) => format!(
            "{{{}, {}, {}, {}}}",
            float_literal(q.x),
            float_literal(q.y),
            float_literal(q.z),
            float_literal(q.w)
        ),
        Value::Obj(o) => o.0.to_string(),
        Value::Con(c) => c.0.to_string(),
        Value::Float(_) | Value::Bool(_) => literal(value),
    }
}

/// A C string literal; bytes outside printable ASCII become octal escapes.
pub(crate) fn c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for byte in text.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b' '..=b'~' => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out.push('"');
    out
}

/// Text safe inside a `/* */` comment.
pub(crate) fn comment_text(text: &str) -> String {
    text.replace("*/", "* /")
}
