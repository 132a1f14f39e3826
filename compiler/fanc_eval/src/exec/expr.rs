//! Expression reads.
//!
//! Expressions are evaluated each time an input reads them, following the
//! wire across custom block boundaries first. Nothing is cached between
//! reads, so host queries such as `Random` draw once per read.

use fanc_ir::node::pure::{eval_pure, input_default};
use fanc_ir::{
    ensure_sufficient_stack, EnvId, ExprKind, NodeKind, Outputs, SyntaxNode, Value, ValueKind,
    ValueSource,
};
use smallvec::smallvec;

use super::Machine;
use crate::{Pointer, RuntimeContext};

/// What an input read produces before dereferencing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Datum {
    Value(Value),
    Pointer(Pointer),
    /// A pointer input with nothing behind it.
    Disconnected,
}

impl<C: RuntimeContext + ?Sized> Machine<'_, C> {
    /// Read input `index` of `node` in `env`.
    pub(crate) fn input(&mut self, env: EnvId, node: &SyntaxNode, index: usize) -> Datum {
        let Some(input) = node.inputs.get(index) else {
            return Datum::Disconnected;
        };
        let source = input
            .source
            .and_then(|terminal| self.program.resolve_value(env, &terminal));
        match source {
            Some(source) => ensure_sufficient_stack(|| self.eval(source)),
            None if input.kind.is_pointer() => Datum::Disconnected,
            None => Datum::Value(match &node.kind {
                NodeKind::Expr(kind) => input_default(kind, index, input.kind),
                NodeKind::Stmt(_) => Value::zero(input.kind.value_kind().unwrap_or(ValueKind::Float)),
            }),
        }
    }

    /// Read input `index` as a value, dereferencing pointers.
    pub(crate) fn value(&mut self, env: EnvId, node: &SyntaxNode, index: usize) -> Value {
        let kind = node
            .inputs
            .get(index)
            .and_then(|input| input.kind.value_kind())
            .unwrap_or(ValueKind::Float);
        match self.input(env, node, index) {
            Datum::Value(value) => value,
            Datum::Pointer(pointer) => self.ctx.get_value(pointer),
            Datum::Disconnected => Value::zero(kind),
        }
    }

    pub(crate) fn pointer(&mut self, env: EnvId, node: &SyntaxNode, index: usize) -> Option<Pointer> {
        match self.input(env, node, index) {
            Datum::Pointer(pointer) => Some(pointer),
            Datum::Value(_) | Datum::Disconnected => None,
        }
    }

    #[expect(clippy::cast_possible_truncation, reason = "list indices saturate at the i32 range")]
    fn eval(&mut self, source: ValueSource) -> Datum {
        let program = self.program;
        let env = source.env;
        let node = program.env(env).tree.node(source.node);
        let output = usize::from(source.output);
        let kind = node
            .outputs
            .get(output)
            .and_then(|output| output.kind.value_kind())
            .unwrap_or(ValueKind::Float);

        let expr = match &node.kind {
            // Statement outputs live in state slots; never written reads zero.
            NodeKind::Stmt(_) => {
                let value = self
                    .state
                    .get(&(env, source.node))
                    .and_then(|slot| slot.get(output))
                    .copied()
                    .unwrap_or_else(|| Value::zero(kind));
                return Datum::Value(value);
            }
            NodeKind::Expr(expr) => expr,
        };

        let outputs: Outputs = match expr {
            ExprKind::Variable { var } => {
                return program
                    .env(env)
                    .variables
                    .get(usize::from(var.0))
                    .map_or(Datum::Disconnected, |id| Datum::Pointer(Pointer::new(*id, kind)));
            }
            ExprKind::ListElement => {
                let Some(base) = self.pointer(env, node, 0) else {
                    return Datum::Disconnected;
                };
                let index = self.value(env, node, 1).as_float().floor();
                return Datum::Pointer(base.offset(index as i32));
            }
            ExprKind::Random => {
                let min = self.value(env, node, 0).as_float();
                let max = self.value(env, node, 1).as_float();
                smallvec![Value::Float(self.ctx.random(min, max))]
            }
            ExprKind::ScreenSize => {
                let (width, height) = self.ctx.screen_size();
                smallvec![Value::Float(width), Value::Float(height)]
            }
            ExprKind::GetPosition => {
                let object = self.value(env, node, 0).as_obj();
                let (position, rotation) = self.ctx.object_position(object);
                smallvec![Value::Vec3(position), Value::Rot(rotation)]
            }
            ExprKind::GetVelocity => {
                let object = self.value(env, node, 0).as_obj();
                let (velocity, spin) = self.ctx.object_velocity(object);
                smallvec![Value::Vec3(velocity), Value::Vec3(spin)]
            }
            ExprKind::Raycast => {
                let from = self.value(env, node, 0).as_vec3();
                let to = self.value(env, node, 1).as_vec3();
                let hit = self.ctx.raycast(from, to);
                smallvec![
                    Value::Bool(hit.hit),
                    Value::Vec3(hit.position),
                    Value::Obj(hit.object)
                ]
            }
            // Resolution steps into bodies; an output the body never drives
            // reads zero.
            ExprKind::Custom(_) => Outputs::new(),
            pure => {
                let values: Outputs = (0..node.inputs.len())
                    .map(|index| self.value(env, node, index))
                    .collect();
                eval_pure(pure, &values).unwrap_or_default()
            }
        };
        Datum::Value(outputs.get(output).copied().unwrap_or_else(|| Value::zero(kind)))
    }
}
