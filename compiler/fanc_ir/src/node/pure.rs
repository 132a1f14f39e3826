//! Evaluation of pure expression blocks.
//!
//! The constant folder and the interpreter both compute pure expressions
//! through [`eval_pure`], and both fill disconnected inputs through
//! [`input_default`]. A folded tree therefore produces bit-identical results
//! to the tree it was folded from.

use glam::Vec3;
use smallvec::smallvec;

use super::{BinaryOp, ExprKind, UnaryOp};
use crate::math;
use crate::{Outputs, SignalKind, Value, ValueKind};

/// Value a disconnected input of an expression reads as.
///
/// Every input defaults to the zero value of its kind, except the `up`
/// input of the look-rotation block, which defaults to world up.
pub fn input_default(kind: &ExprKind, index: usize, input: SignalKind) -> Value {
    if matches!(kind, ExprKind::LookRotation) && index == 1 {
        return Value::Vec3(Vec3::Y);
    }
    Value::zero(input.value_kind().unwrap_or(ValueKind::Float))
}

/// Compute all outputs of a pure expression from its input values.
///
/// Returns `None` for expressions that are not pure (host queries, pointers,
/// custom blocks) or when fewer inputs are supplied than the block reads.
pub fn eval_pure(kind: &ExprKind, inputs: &[Value]) -> Option<Outputs> {
    let float = |i: usize| inputs.get(i).map(Value::as_float);
    let vec3 = |i: usize| inputs.get(i).map(Value::as_vec3);
    let rot = |i: usize| inputs.get(i).map(Value::as_rot);

    let outputs: Outputs = match kind {
        ExprKind::Constant(outputs) => outputs.clone(),
        ExprKind::Unary(op) => smallvec![unary(*op, *inputs.first()?)],
        ExprKind::Binary(op) => smallvec![binary(*op, *inputs.first()?, *inputs.get(1)?)],
        ExprKind::MakeVector => smallvec![Value::Vec3(Vec3::new(float(0)?, float(1)?, float(2)?))],
        ExprKind::BreakVector => {
            let v = vec3(0)?;
            smallvec![Value::Float(v.x), Value::Float(v.y), Value::Float(v.z)]
        }
        ExprKind::MakeRotation => smallvec![Value::Rot(math::euler_degrees_to_quat(
            float(0)?,
            float(1)?,
            float(2)?
        ))],
        ExprKind::BreakRotation => {
            let [x, y, z] = math::quat_to_euler_degrees(rot(0)?);
            smallvec![Value::Float(x), Value::Float(y), Value::Float(z)]
        }
        ExprKind::Lerp => smallvec![Value::Rot(math::lerp_rotation(rot(0)?, rot(1)?, float(2)?))],
        ExprKind::AxisAngle => smallvec![Value::Rot(math::axis_angle(vec3(0)?, float(1)?))],
        ExprKind::LookRotation => smallvec![Value::Rot(math::look_rotation(vec3(0)?, vec3(1)?))],
        ExprKind::LineVsPlane => smallvec![Value::Vec3(math::line_vs_plane(
            vec3(0)?,
            vec3(1)?,
            vec3(2)?,
            vec3(3)?
        ))],
        ExprKind::Random
        | ExprKind::ScreenSize
        | ExprKind::GetPosition
        | ExprKind::GetVelocity
        | ExprKind::Raycast
        | ExprKind::Variable { .. }
        | ExprKind::ListElement
        | ExprKind::Custom(_) => return None,
    };
    Some(outputs)
}

fn unary(op: UnaryOp, a: Value) -> Value {
    match op {
        UnaryOp::Negate => Value::Float(-a.as_float()),
        UnaryOp::NegateVector => Value::Vec3(-a.as_vec3()),
        UnaryOp::Not => Value::Bool(!a.as_bool()),
        UnaryOp::Inverse => Value::Rot(a.as_rot().inverse()),
        UnaryOp::Absolute => Value::Float(a.as_float().abs()),
        UnaryOp::Round => Value::Float(a.as_float().round()),
        UnaryOp::Floor => Value::Float(a.as_float().floor()),
        UnaryOp::Ceiling => Value::Float(a.as_float().ceil()),
        UnaryOp::Sqrt => Value::Float(a.as_float().sqrt()),
        UnaryOp::Sin => Value::Float(math::sin_degrees(a.as_float())),
        UnaryOp::Cos => Value::Float(math::cos_degrees(a.as_float())),
        UnaryOp::Normalize => Value::Vec3(a.as_vec3().normalize_or_zero()),
    }
}

fn binary(op: BinaryOp, a: Value, b: Value) -> Value {
    match op {
        BinaryOp::Add => Value::Float(a.as_float() + b.as_float()),
        BinaryOp::AddVectors => Value::Vec3(a.as_vec3() + b.as_vec3()),
        BinaryOp::Subtract => Value::Float(a.as_float() - b.as_float()),
        BinaryOp::SubtractVectors => Value::Vec3(a.as_vec3() - b.as_vec3()),
        BinaryOp::Multiply => Value::Float(a.as_float() * b.as_float()),
        BinaryOp::ScaleVector => Value::Vec3(a.as_vec3() * b.as_float()),
        BinaryOp::RotateVector => Value::Vec3(b.as_rot() * a.as_vec3()),
        BinaryOp::CombineRotations => Value::Rot(a.as_rot() * b.as_rot()),
        BinaryOp::Divide => Value::Float(a.as_float() / b.as_float()),
        BinaryOp::Modulo => Value::Float(math::modulo(a.as_float(), b.as_float())),
        BinaryOp::Power => Value::Float(a.as_float().powf(b.as_float())),
        BinaryOp::Min => Value::Float(a.as_float().min(b.as_float())),
        BinaryOp::Max => Value::Float(a.as_float().max(b.as_float())),
        BinaryOp::EqualNumbers => Value::Bool(math::numbers_equal(a.as_float(), b.as_float())),
        BinaryOp::EqualVectors => Value::Bool(math::vectors_equal(a.as_vec3(), b.as_vec3())),
        BinaryOp::EqualObjects => Value::Bool(a.as_obj() == b.as_obj()),
        BinaryOp::EqualBools => Value::Bool(a.as_bool() == b.as_bool()),
        BinaryOp::Less => Value::Bool(a.as_float() < b.as_float()),
        BinaryOp::Greater => Value::Bool(a.as_float() > b.as_float()),
        BinaryOp::And => Value::Bool(a.as_bool() && b.as_bool()),
        BinaryOp::Or => Value::Bool(a.as_bool() || b.as_bool()),
        BinaryOp::Cross => Value::Vec3(a.as_vec3().cross(b.as_vec3())),
        BinaryOp::Dot => Value::Float(a.as_vec3().dot(b.as_vec3())),
        BinaryOp::Distance => Value::Float(a.as_vec3().distance(b.as_vec3())),
    }
}
