//! Input reads and expression functions.
//!
//! Every expression output a program reads gets its own function. A call
//! re-evaluates the expression, matching the interpreter, which caches
//! nothing between reads.

use fanc_ir::node::pure::input_default;
use fanc_ir::{EnvId, ExprKind, NodeKind, SyntaxNode, Value, ValueKind, ValueSource};

use super::{c_type, literal, Lowerer};

/// Output of one expression function: C statements plus the returned
/// expression.
struct Body {
    lines: Vec<String>,
    result: String,
}

impl Lowerer<'_> {
    /// C expression producing `source`: a slot, a literal or a call.
    fn source_expr(&mut self, source: ValueSource) -> String {
        let program = self.program;
        let node = program.env(source.env).tree.node(source.node);
        let kind = node
            .outputs
            .get(usize::from(source.output))
            .and_then(|output| output.kind.value_kind())
            .unwrap_or(ValueKind::Float);
        match &node.kind {
            NodeKind::Stmt(_) => self.slot(source.env, source.node, source.output, kind),
            NodeKind::Expr(ExprKind::Constant(outputs)) => literal(
                &outputs
                    .get(usize::from(source.output))
                    .copied()
                    .unwrap_or_else(|| Value::zero(kind)),
            ),
            // Unresolved custom outputs read zero.
            NodeKind::Expr(ExprKind::Custom(_)) => literal(&Value::zero(kind)),
            NodeKind::Expr(_) => format!("{}(h)", self.request_expr(source)),
        }
    }

    /// C expression reading input `index` of `node` as a value.
    pub(crate) fn value(&mut self, env: EnvId, node: &SyntaxNode, index: usize) -> String {
        let Some(input) = node.inputs.get(index) else {
            return literal(&Value::zero(ValueKind::Float));
        };
        let kind = input.kind.value_kind().unwrap_or(ValueKind::Float);
        let program = self.program;
        let source = input
            .source
            .and_then(|terminal| program.resolve_value(env, &terminal));
        match source {
            Some(source) if program.source_kind(source).is_pointer() => {
                format!("fc_ptr_{}_get({})", kind.name(), self.source_expr(source))
            }
            Some(source) => self.source_expr(source),
            None => literal(&match &node.kind {
                NodeKind::Expr(expr) => input_default(expr, index, input.kind),
                NodeKind::Stmt(_) => Value::zero(kind),
            }),
        }
    }

    /// C expression reading pointer input `index` of `node`; a disconnected
    /// pointer has no list.
    pub(crate) fn pointer(&mut self, env: EnvId, node: &SyntaxNode, index: usize) -> String {
        let kind = node
            .inputs
            .get(index)
            .and_then(|input| input.kind.value_kind())
            .unwrap_or(ValueKind::Float);
        let program = self.program;
        let source = node
            .inputs
            .get(index)
            .and_then(|input| input.source)
            .and_then(|terminal| program.resolve_value(env, &terminal));
        match source {
            Some(source) if program.source_kind(source).is_pointer() => self.source_expr(source),
            _ => null_pointer(kind),
        }
    }

    /// Read input `index` into a fresh local and return its name.
    pub(crate) fn read_value(&mut self, env: EnvId, node: &SyntaxNode, index: usize) -> String {
        let kind = input_kind(node, index);
        let expr = self.value(env, node, index);
        let temp = self.ctx.fresh_temp();
        self.ctx
            .writeln(&format!("{} {temp} = {expr};", c_type(kind)));
        temp
    }

    /// Read pointer input `index` into a fresh local and return its name.
    pub(crate) fn read_pointer(&mut self, env: EnvId, node: &SyntaxNode, index: usize) -> String {
        let kind = input_kind(node, index);
        let expr = self.pointer(env, node, index);
        let temp = self.ctx.fresh_temp();
        self.ctx
            .writeln(&format!("fc_ptr_{} {temp} = {expr};", kind.name()));
        temp
    }

    pub(super) fn emit_expr_function(&mut self, source: ValueSource) {
        let program = self.program;
        let env = source.env;
        let node = program.env(env).tree.node(source.node);
        let output = node.outputs.get(usize::from(source.output));
        let kind = output
            .and_then(|output| output.kind.value_kind())
            .unwrap_or(ValueKind::Float);
        let returns = match output.map(|output| output.kind) {
            Some(signal) if signal.is_pointer() => format!("fc_ptr_{}", kind.name()),
            _ => c_type(kind).to_owned(),
        };

        let name = super::expr_name(source);
        self.begin_function(&name, &returns);
        let location = self.block_location(env, source.node);
        self.ctx.mark_block(location);
        self.ctx.writeln(&format!(
            "/* {} {} {} */",
            super::comment_text(&program.env(env).tree.name),
            node.pos,
            super::comment_text(&node.describe())
        ));
        let body = match &node.kind {
            NodeKind::Expr(expr) => self.expr_body(env, node, expr, source.output, kind),
            NodeKind::Stmt(_) => Body {
                lines: Vec::new(),
                result: literal(&Value::zero(kind)),
            },
        };
        for line in &body.lines {
            self.ctx.writeln(line);
        }
        self.ctx.writeln(&format!("return {};", body.result));
        self.end_function();
    }

    fn expr_body(
        &mut self,
        env: EnvId,
        node: &SyntaxNode,
        expr: &ExprKind,
        output: u8,
        kind: ValueKind,
    ) -> Body {
        let pick = |fields: [&'static str; 3]| fields[usize::from(output).min(2)];
        match expr {
            ExprKind::Variable { var } => {
                let result = self
                    .program
                    .env(env)
                    .variables
                    .get(usize::from(var.0))
                    .map_or_else(
                        || null_pointer(kind),
                        |id| format!("(fc_ptr_{}){{&v{}, 0}}", kind.name(), id.0),
                    );
                Body {
                    lines: Vec::new(),
                    result,
                }
            }
            ExprKind::ListElement => {
                // The index is only read when the base is connected.
                let base = self.read_pointer(env, node, 0);
                self.ctx.writeln(&format!("if ({base}.list == NULL) return {base};"));
                let index = self.read_value(env, node, 1);
                Body {
                    lines: Vec::new(),
                    result: format!("fc_ptr_{}_offset({base}, {index})", kind.name()),
                }
            }
            ExprKind::ScreenSize => {
                let (width, height) = (self.ctx.fresh_temp(), self.ctx.fresh_temp());
                Body {
                    lines: vec![
                        format!("float {width}, {height};"),
                        format!("h->screen_size(h->user, &{width}, &{height});"),
                    ],
                    result: if output == 0 { width } else { height },
                }
            }
            ExprKind::GetPosition => {
                let object = self.read_value(env, node, 0);
                let (p, r) = (self.ctx.fresh_temp(), self.ctx.fresh_temp());
                Body {
                    lines: vec![
                        format!("fc_vec3 {p}; fc_quat {r};"),
                        format!("h->object_position(h->user, {object}, &{p}, &{r});"),
                    ],
                    result: if output == 0 { p } else { r },
                }
            }
            ExprKind::GetVelocity => {
                let object = self.read_value(env, node, 0);
                let (v, s) = (self.ctx.fresh_temp(), self.ctx.fresh_temp());
                Body {
                    lines: vec![
                        format!("fc_vec3 {v}, {s};"),
                        format!("h->object_velocity(h->user, {object}, &{v}, &{s});"),
                    ],
                    result: if output == 0 { v } else { s },
                }
            }
            ExprKind::Raycast => {
                let from = self.read_value(env, node, 0);
                let to = self.read_value(env, node, 1);
                let hit = self.ctx.fresh_temp();
                Body {
                    lines: vec![format!(
                        "fc_raycast_hit {hit} = h->raycast(h->user, {from}, {to});"
                    )],
                    result: format!("{hit}.{}", pick(["hit", "position", "object"])),
                }
            }
            ExprKind::Custom(_) => Body {
                lines: Vec::new(),
                result: literal(&Value::zero(kind)),
            },
            pure => {
                let args: Vec<String> = (0..node.inputs.len())
                    .map(|index| self.read_value(env, node, index))
                    .collect();
                let arg = |i: usize| args.get(i).cloned().unwrap_or_else(|| "0".to_owned());
                let result = match pure {
                    ExprKind::Constant(outputs) => literal(
                        &outputs
                            .get(usize::from(output))
                            .copied()
                            .unwrap_or_else(|| Value::zero(kind)),
                    ),
                    ExprKind::Unary(op) => format!("fc_op_{}({})", op.name(), arg(0)),
                    ExprKind::Binary(op) => format!("fc_op_{}({}, {})", op.name(), arg(0), arg(1)),
                    ExprKind::MakeVector => {
                        format!("fc_vec3_make({}, {}, {})", arg(0), arg(1), arg(2))
                    }
                    ExprKind::BreakVector => format!("{}.{}", arg(0), pick(["x", "y", "z"])),
                    ExprKind::MakeRotation => {
                        format!("fc_euler_to_quat({}, {}, {})", arg(0), arg(1), arg(2))
                    }
                    ExprKind::BreakRotation => {
                        format!("fc_quat_to_euler({}).{}", arg(0), pick(["x", "y", "z"]))
                    }
                    ExprKind::Lerp => {
                        format!("fc_lerp_rotation({}, {}, {})", arg(0), arg(1), arg(2))
                    }
                    ExprKind::AxisAngle => format!("fc_axis_angle({}, {})", arg(0), arg(1)),
                    ExprKind::LookRotation => format!("fc_look_rotation({}, {})", arg(0), arg(1)),
                    ExprKind::LineVsPlane => format!(
                        "fc_line_vs_plane({}, {}, {}, {})",
                        arg(0),
                        arg(1),
                        arg(2),
                        arg(3)
                    ),
                    ExprKind::Random => format!("h->random(h->user, {}, {})", arg(0), arg(1)),
                    // Handled above.
                    ExprKind::ScreenSize
                    | ExprKind::GetPosition
                    | ExprKind::GetVelocity
                    | ExprKind::Raycast
                    | ExprKind::Variable { .. }
                    | ExprKind::ListElement
                    | ExprKind::Custom(_) => literal(&Value::zero(kind)),
                };
                Body {
                    lines: Vec::new(),
                    result,
                }
            }
        }
    }
}

fn input_kind(node: &SyntaxNode, index: usize) -> ValueKind {
    node.inputs
        .get(index)
        .and_then(|input| input.kind.value_kind())
        .unwrap_or(ValueKind::Float)
}

fn null_pointer(kind: ValueKind) -> String {
    format!("(fc_ptr_{}){{NULL, 0}}", kind.name())
}
