//! Built-in block → node kind mapping.

use fanc_ir::math::euler_degrees_to_quat;
use fanc_ir::{
    Builtin, ExprKind, GridPos, LocalVar, NodeKind, ObjectRef, StmtKind, TouchState, Value,
    Variable,
};
use glam::Vec3;
use smallvec::smallvec;

use crate::settings::Settings;
use crate::variables::NAME_SETTING;

/// Delay in frames before a win or lose takes effect when unset.
const DEFAULT_END_DELAY: u8 = 3;

/// Node kind of built-in `builtin` placed at `pos`.
///
/// `variables` is the unit's variable list from the discovery pre-pass;
/// every variable block's variable is in it.
pub(crate) fn builtin_kind(
    builtin: Builtin,
    pos: GridPos,
    settings: &Settings<'_>,
    variables: &[Variable],
) -> NodeKind {
    let byte = |index: u8| settings.byte(pos, index);
    let local = |kind| {
        let name = settings.string(pos, NAME_SETTING).unwrap_or_default();
        let index = variables
            .iter()
            .position(|v| v.name == name && v.kind == kind)
            .unwrap_or_default();
        LocalVar(u16::try_from(index).unwrap_or_default())
    };
    let constant = |value: Value| NodeKind::Expr(ExprKind::Constant(smallvec![value]));

    match builtin {
        Builtin::Win => NodeKind::Stmt(StmtKind::Win {
            delay: byte(0).unwrap_or(DEFAULT_END_DELAY),
        }),
        Builtin::Lose => NodeKind::Stmt(StmtKind::Lose {
            delay: byte(0).unwrap_or(DEFAULT_END_DELAY),
        }),
        Builtin::SetScore => NodeKind::Stmt(StmtKind::SetScore {
            ranking: byte(0).unwrap_or_default(),
        }),
        Builtin::SetCamera => NodeKind::Stmt(StmtKind::SetCamera {
            perspective: byte(0).is_some_and(|b| b != 0),
        }),
        Builtin::SetLight => NodeKind::Stmt(StmtKind::SetLight),
        Builtin::SetGravity => NodeKind::Stmt(StmtKind::SetGravity),
        Builtin::SetPosition => NodeKind::Stmt(StmtKind::SetPosition),
        Builtin::SetVisible => NodeKind::Stmt(StmtKind::SetVisible),
        Builtin::CreateObject => NodeKind::Stmt(StmtKind::CreateObject),
        Builtin::DestroyObject => NodeKind::Stmt(StmtKind::DestroyObject),
        Builtin::PlaySound => NodeKind::Stmt(StmtKind::PlaySound {
            looping: byte(0).is_some_and(|b| b != 0),
            sound: byte(1).unwrap_or_default(),
        }),
        Builtin::StopSound => NodeKind::Stmt(StmtKind::StopSound),
        Builtin::AddForce => NodeKind::Stmt(StmtKind::AddForce),
        Builtin::SetVelocity => NodeKind::Stmt(StmtKind::SetVelocity),
        Builtin::If => NodeKind::Stmt(StmtKind::If),
        Builtin::Loop => NodeKind::Stmt(StmtKind::Loop),
        Builtin::PlaySensor => NodeKind::Stmt(StmtKind::PlaySensor),
        Builtin::LateUpdate => NodeKind::Stmt(StmtKind::LateUpdate),
        Builtin::TouchSensor => NodeKind::Stmt(StmtKind::TouchSensor {
            state: TouchState::from_setting(byte(0).unwrap_or_default()),
            finger: byte(1).unwrap_or_default(),
        }),
        Builtin::SwipeSensor => NodeKind::Stmt(StmtKind::SwipeSensor),
        Builtin::Button => NodeKind::Stmt(StmtKind::Button {
            kind: byte(0).unwrap_or_default(),
        }),
        Builtin::Collision => NodeKind::Stmt(StmtKind::Collision),
        Builtin::RandomSeed => NodeKind::Stmt(StmtKind::RandomSeed),
        Builtin::IncrementNumber => NodeKind::Stmt(StmtKind::IncrementNumber),
        Builtin::DecrementNumber => NodeKind::Stmt(StmtKind::DecrementNumber),
        Builtin::SetVariable(kind) => NodeKind::Stmt(StmtKind::SetVariable { var: local(kind) }),
        Builtin::SetPointer(_) => NodeKind::Stmt(StmtKind::SetPointer),
        Builtin::Inspect(_) => NodeKind::Stmt(StmtKind::Inspect),

        Builtin::Number => constant(Value::Float(settings.float(pos, 0).unwrap_or_default())),
        Builtin::Vector => constant(Value::Vec3(settings.vec3(pos, 0).unwrap_or(Vec3::ZERO))),
        Builtin::Rotation => {
            let degrees = settings.vec3(pos, 0).unwrap_or(Vec3::ZERO);
            constant(Value::Rot(euler_degrees_to_quat(degrees.x, degrees.y, degrees.z)))
        }
        Builtin::True => constant(Value::Bool(true)),
        Builtin::False => constant(Value::Bool(false)),
        Builtin::Object => constant(Value::Obj(
            settings.int(pos, 0).map_or(ObjectRef::NONE, ObjectRef),
        )),
        Builtin::MakeVector => NodeKind::Expr(ExprKind::MakeVector),
        Builtin::BreakVector => NodeKind::Expr(ExprKind::BreakVector),
        Builtin::MakeRotation => NodeKind::Expr(ExprKind::MakeRotation),
        Builtin::BreakRotation => NodeKind::Expr(ExprKind::BreakRotation),
        Builtin::Lerp => NodeKind::Expr(ExprKind::Lerp),
        Builtin::AxisAngle => NodeKind::Expr(ExprKind::AxisAngle),
        Builtin::LookRotation => NodeKind::Expr(ExprKind::LookRotation),
        Builtin::LineVsPlane => NodeKind::Expr(ExprKind::LineVsPlane),
        Builtin::Random => NodeKind::Expr(ExprKind::Random),
        Builtin::ScreenSize => NodeKind::Expr(ExprKind::ScreenSize),
        Builtin::GetPosition => NodeKind::Expr(ExprKind::GetPosition),
        Builtin::GetVelocity => NodeKind::Expr(ExprKind::GetVelocity),
        Builtin::Raycast => NodeKind::Expr(ExprKind::Raycast),
        Builtin::Variable(kind) => NodeKind::Expr(ExprKind::Variable { var: local(kind) }),
        Builtin::ListElement(_) => NodeKind::Expr(ExprKind::ListElement),
        Builtin::Unary(op) => NodeKind::Expr(ExprKind::Unary(op)),
        Builtin::Binary(op) => NodeKind::Expr(ExprKind::Binary(op)),
    }
}
