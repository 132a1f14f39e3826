//! The built-in block set.
//!
//! Block ids below [`FIRST_CUSTOM_ID`](super::FIRST_CUSTOM_ID) are reserved
//! for built-ins. Per-kind families (variables, set-variable, pointers,
//! inspect, list elements) occupy six consecutive ids, one per
//! [`ValueKind`] in [`ValueKind::ALL`] order.

use super::layout::{Layout, LayoutBuilder};
use crate::node::{BinaryOp, UnaryOp};
use crate::unit::BlockId;
use crate::{SignalKind, ValueKind};

const SET_VARIABLE_BASE: u16 = 40;
const SET_POINTER_BASE: u16 = 50;
const INSPECT_BASE: u16 = 60;
const VARIABLE_BASE: u16 = 130;
const LIST_ELEMENT_BASE: u16 = 140;
const UNARY_BASE: u16 = 200;
const BINARY_BASE: u16 = 300;

/// A built-in block definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    // Statements
    Win,
    Lose,
    SetScore,
    SetCamera,
    SetLight,
    SetGravity,
    SetPosition,
    SetVisible,
    CreateObject,
    DestroyObject,
    PlaySound,
    StopSound,
    AddForce,
    SetVelocity,
    If,
    Loop,
    PlaySensor,
    LateUpdate,
    TouchSensor,
    SwipeSensor,
    Button,
    Collision,
    RandomSeed,
    IncrementNumber,
    DecrementNumber,
    SetVariable(ValueKind),
    SetPointer(ValueKind),
    Inspect(ValueKind),

    // Expressions
    Number,
    Vector,
    Rotation,
    True,
    False,
    Object,
    MakeVector,
    BreakVector,
    MakeRotation,
    BreakRotation,
    Lerp,
    AxisAngle,
    LookRotation,
    LineVsPlane,
    Random,
    ScreenSize,
    GetPosition,
    GetVelocity,
    Raycast,
    Variable(ValueKind),
    ListElement(ValueKind),
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl Builtin {
    pub fn from_id(id: BlockId) -> Option<Builtin> {
        let n = id.0;
        let kind = |base: u16| {
            n.checked_sub(base)
                .and_then(|offset| u8::try_from(offset).ok())
                .and_then(ValueKind::from_index)
        };
        let builtin = match n {
            10 => Builtin::Win,
            11 => Builtin::Lose,
            12 => Builtin::SetScore,
            13 => Builtin::SetCamera,
            14 => Builtin::SetLight,
            15 => Builtin::SetGravity,
            16 => Builtin::SetPosition,
            17 => Builtin::SetVisible,
            18 => Builtin::CreateObject,
            19 => Builtin::DestroyObject,
            20 => Builtin::PlaySound,
            21 => Builtin::StopSound,
            22 => Builtin::AddForce,
            23 => Builtin::SetVelocity,
            24 => Builtin::If,
            25 => Builtin::Loop,
            26 => Builtin::PlaySensor,
            27 => Builtin::LateUpdate,
            28 => Builtin::TouchSensor,
            29 => Builtin::SwipeSensor,
            30 => Builtin::Button,
            31 => Builtin::Collision,
            32 => Builtin::RandomSeed,
            33 => Builtin::IncrementNumber,
            34 => Builtin::DecrementNumber,
            40..=45 => Builtin::SetVariable(kind(SET_VARIABLE_BASE)?),
            50..=55 => Builtin::SetPointer(kind(SET_POINTER_BASE)?),
            60..=65 => Builtin::Inspect(kind(INSPECT_BASE)?),
            100 => Builtin::Number,
            101 => Builtin::Vector,
            102 => Builtin::Rotation,
            103 => Builtin::True,
            104 => Builtin::False,
            105 => Builtin::Object,
            110 => Builtin::MakeVector,
            111 => Builtin::BreakVector,
            112 => Builtin::MakeRotation,
            113 => Builtin::BreakRotation,
            114 => Builtin::Lerp,
            115 => Builtin::AxisAngle,
            116 => Builtin::LookRotation,
            117 => Builtin::LineVsPlane,
            118 => Builtin::Random,
            119 => Builtin::ScreenSize,
            120 => Builtin::GetPosition,
            121 => Builtin::GetVelocity,
            122 => Builtin::Raycast,
            130..=135 => Builtin::Variable(kind(VARIABLE_BASE)?),
            140..=145 => Builtin::ListElement(kind(LIST_ELEMENT_BASE)?),
            200..=299 => Builtin::Unary(UnaryOp::from_index(n - UNARY_BASE)?),
            300..=399 => Builtin::Binary(BinaryOp::from_index(n - BINARY_BASE)?),
            _ => return None,
        };
        Some(builtin)
    }

    pub fn id(self) -> BlockId {
        let per_kind = |base: u16, kind: ValueKind| base + u16::from(kind.index());
        BlockId(match self {
            Builtin::Win => 10,
            Builtin::Lose => 11,
            Builtin::SetScore => 12,
            Builtin::SetCamera => 13,
            Builtin::SetLight => 14,
            Builtin::SetGravity => 15,
            Builtin::SetPosition => 16,
            Builtin::SetVisible => 17,
            Builtin::CreateObject => 18,
            Builtin::DestroyObject => 19,
            Builtin::PlaySound => 20,
            Builtin::StopSound => 21,
            Builtin::AddForce => 22,
            Builtin::SetVelocity => 23,
            Builtin::If => 24,
            Builtin::Loop => 25,
            Builtin::PlaySensor => 26,
            Builtin::LateUpdate => 27,
            Builtin::TouchSensor => 28,
            Builtin::SwipeSensor => 29,
            Builtin::Button => 30,
            Builtin::Collision => 31,
            Builtin::RandomSeed => 32,
            Builtin::IncrementNumber => 33,
            Builtin::DecrementNumber => 34,
            Builtin::SetVariable(kind) => per_kind(SET_VARIABLE_BASE, kind),
            Builtin::SetPointer(kind) => per_kind(SET_POINTER_BASE, kind),
            Builtin::Inspect(kind) => per_kind(INSPECT_BASE, kind),
            Builtin::Number => 100,
            Builtin::Vector => 101,
            Builtin::Rotation => 102,
            Builtin::True => 103,
            Builtin::False => 104,
            Builtin::Object => 105,
            Builtin::MakeVector => 110,
            Builtin::BreakVector => 111,
            Builtin::MakeRotation => 112,
            Builtin::BreakRotation => 113,
            Builtin::Lerp => 114,
            Builtin::AxisAngle => 115,
            Builtin::LookRotation => 116,
            Builtin::LineVsPlane => 117,
            Builtin::Random => 118,
            Builtin::ScreenSize => 119,
            Builtin::GetPosition => 120,
            Builtin::GetVelocity => 121,
            Builtin::Raycast => 122,
            Builtin::Variable(kind) => per_kind(VARIABLE_BASE, kind),
            Builtin::ListElement(kind) => per_kind(LIST_ELEMENT_BASE, kind),
            Builtin::Unary(op) => UNARY_BASE + op.index(),
            Builtin::Binary(op) => BINARY_BASE + op.index(),
        })
    }

    /// Every built-in, in id order.
    pub fn all() -> impl Iterator<Item = Builtin> {
        (1..super::FIRST_CUSTOM_ID).filter_map(|id| Builtin::from_id(BlockId(id)))
    }

    /// Whether the block names a variable through setting 0.
    pub fn names_variable(self) -> Option<ValueKind> {
        match self {
            Builtin::Variable(kind) | Builtin::SetVariable(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn layout(self) -> Layout {
        use SignalKind as S;
        let stmt = LayoutBuilder::statement;
        let expr = LayoutBuilder::expression;
        let builder = match self {
            Builtin::IncrementNumber | Builtin::DecrementNumber => {
                stmt().input("Variable", S::Pointer(ValueKind::Float))
            }
            Builtin::Win | Builtin::Lose => stmt(),
            Builtin::SetScore => stmt().input("Score", S::FLOAT).input("Coins", S::FLOAT),
            Builtin::SetCamera => stmt()
                .input("Position", S::VEC3)
                .input("Rotation", S::ROT)
                .input("Range", S::FLOAT),
            Builtin::SetLight => stmt().input("Position", S::VEC3).input("Rotation", S::ROT),
            Builtin::SetGravity => stmt().input("Gravity", S::VEC3),
            Builtin::SetPosition => stmt()
                .input("Object", S::OBJ)
                .input("Position", S::VEC3)
                .input("Rotation", S::ROT),
            Builtin::SetVisible => stmt().input("Object", S::OBJ).input("Visible", S::BOOL),
            Builtin::CreateObject => stmt().input("Original", S::OBJ).output("Copy", S::OBJ),
            Builtin::DestroyObject => stmt().input("Object", S::OBJ),
            Builtin::PlaySound => stmt()
                .input("Volume", S::FLOAT)
                .input("Pitch", S::FLOAT)
                .output("Channel", S::FLOAT),
            Builtin::StopSound => stmt().input("Channel", S::FLOAT),
            Builtin::AddForce => stmt()
                .input("Object", S::OBJ)
                .input("Force", S::VEC3)
                .input("Applied at", S::VEC3)
                .input("Torque", S::VEC3),
            Builtin::SetVelocity => stmt()
                .input("Object", S::OBJ)
                .input("Velocity", S::VEC3)
                .input("Spin", S::VEC3),
            Builtin::If => stmt().input("Condition", S::BOOL).exit("True").exit("False"),
            Builtin::Loop => stmt()
                .input("Start", S::FLOAT)
                .input("Stop", S::FLOAT)
                .exit("Do")
                .output("Counter", S::FLOAT),
            Builtin::PlaySensor => stmt().exit("On Play"),
            Builtin::LateUpdate => stmt().exit("After Physics"),
            Builtin::TouchSensor => stmt()
                .exit("Touched")
                .output("Screen X", S::FLOAT)
                .output("Screen Y", S::FLOAT),
            Builtin::SwipeSensor => stmt().exit("Swiped").output("Direction", S::VEC3),
            Builtin::Button => stmt().exit("Pressed"),
            Builtin::Collision => stmt()
                .input("1st Object", S::OBJ)
                .exit("Collided")
                .output("2nd Object", S::OBJ)
                .output("Impulse", S::FLOAT)
                .output("Normal", S::VEC3),
            Builtin::RandomSeed => stmt().input("Seed", S::FLOAT),
            Builtin::SetVariable(kind) => stmt().input("Value", S::Value(kind)),
            Builtin::SetPointer(kind) => stmt()
                .input("Variable", S::Pointer(kind))
                .input("Value", S::Value(kind)),
            Builtin::Inspect(kind) => stmt().input("Value", S::Value(kind)),

            Builtin::Number => expr().output("Number", S::FLOAT),
            Builtin::Vector => expr().output("Vector", S::VEC3),
            Builtin::Rotation => expr().output("Rotation", S::ROT),
            Builtin::True | Builtin::False => expr().output("Bool", S::BOOL),
            Builtin::Object => expr().output("Object", S::OBJ),
            Builtin::MakeVector => expr()
                .input("X", S::FLOAT)
                .input("Y", S::FLOAT)
                .input("Z", S::FLOAT)
                .output("Vector", S::VEC3),
            Builtin::BreakVector => expr()
                .input("Vector", S::VEC3)
                .output("X", S::FLOAT)
                .output("Y", S::FLOAT)
                .output("Z", S::FLOAT),
            Builtin::MakeRotation => expr()
                .input("X angle", S::FLOAT)
                .input("Y angle", S::FLOAT)
                .input("Z angle", S::FLOAT)
                .output("Rotation", S::ROT),
            Builtin::BreakRotation => expr()
                .input("Rotation", S::ROT)
                .output("X angle", S::FLOAT)
                .output("Y angle", S::FLOAT)
                .output("Z angle", S::FLOAT),
            Builtin::Lerp => expr()
                .input("From", S::ROT)
                .input("To", S::ROT)
                .input("Amount", S::FLOAT)
                .output("Rotation", S::ROT),
            Builtin::AxisAngle => expr()
                .input("Axis", S::VEC3)
                .input("Angle", S::FLOAT)
                .output("Rotation", S::ROT),
            Builtin::LookRotation => expr()
                .input("Direction", S::VEC3)
                .input("Up", S::VEC3)
                .output("Rotation", S::ROT),
            Builtin::LineVsPlane => expr()
                .input("Line From", S::VEC3)
                .input("Line To", S::VEC3)
                .input("Plane Point", S::VEC3)
                .input("Plane Normal", S::VEC3)
                .output("Intersection", S::VEC3),
            Builtin::Random => expr()
                .input("Min", S::FLOAT)
                .input("Max", S::FLOAT)
                .output("Random", S::FLOAT),
            Builtin::ScreenSize => expr().output("Width", S::FLOAT).output("Height", S::FLOAT),
            Builtin::GetPosition => expr()
                .input("Object", S::OBJ)
                .output("Position", S::VEC3)
                .output("Rotation", S::ROT),
            Builtin::GetVelocity => expr()
                .input("Object", S::OBJ)
                .output("Velocity", S::VEC3)
                .output("Spin", S::VEC3),
            Builtin::Raycast => expr()
                .input("From", S::VEC3)
                .input("To", S::VEC3)
                .output("Hit", S::BOOL)
                .output("Hit Pos", S::VEC3)
                .output("Hit Obj", S::OBJ),
            Builtin::Variable(kind) => expr().output("Variable", S::Pointer(kind)),
            Builtin::ListElement(kind) => expr()
                .input("Variable", S::Pointer(kind))
                .input("Index", S::FLOAT)
                .output("Element", S::Pointer(kind)),
            Builtin::Unary(op) => expr()
                .input("Value", S::Value(op.operand()))
                .output("Result", S::Value(op.result())),
            Builtin::Binary(op) => {
                let (lhs, rhs) = op.operands();
                expr()
                    .input("Left", S::Value(lhs))
                    .input("Right", S::Value(rhs))
                    .output("Result", S::Value(op.result()))
            }
        };
        builder.build()
    }
}
