//! Operators of the unary and binary math blocks.
//!
//! Each operator fixes the kinds of its operands and its result; there is
//! no overloading at the block level, the catalog holds one block per typed
//! operator.

use crate::ValueKind;

/// One-operand math blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    NegateVector,
    Not,
    Inverse,
    Absolute,
    Round,
    Floor,
    Ceiling,
    Sqrt,
    Sin,
    Cos,
    Normalize,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 12] = [
        UnaryOp::Negate,
        UnaryOp::NegateVector,
        UnaryOp::Not,
        UnaryOp::Inverse,
        UnaryOp::Absolute,
        UnaryOp::Round,
        UnaryOp::Floor,
        UnaryOp::Ceiling,
        UnaryOp::Sqrt,
        UnaryOp::Sin,
        UnaryOp::Cos,
        UnaryOp::Normalize,
    ];

    pub fn from_index(index: u16) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn index(self) -> u16 {
        Self::ALL.iter().position(|op| *op == self).and_then(|i| u16::try_from(i).ok()).unwrap_or(0)
    }

    pub fn operand(self) -> ValueKind {
        match self {
            UnaryOp::NegateVector | UnaryOp::Normalize => ValueKind::Vec3,
            UnaryOp::Not => ValueKind::Bool,
            UnaryOp::Inverse => ValueKind::Rot,
            _ => ValueKind::Float,
        }
    }

    pub fn result(self) -> ValueKind {
        self.operand()
    }

    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Negate => "negate",
            UnaryOp::NegateVector => "negate_vector",
            UnaryOp::Not => "not",
            UnaryOp::Inverse => "inverse",
            UnaryOp::Absolute => "absolute",
            UnaryOp::Round => "round",
            UnaryOp::Floor => "floor",
            UnaryOp::Ceiling => "ceiling",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Normalize => "normalize",
        }
    }
}

/// Two-operand math blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    AddVectors,
    Subtract,
    SubtractVectors,
    Multiply,
    ScaleVector,
    RotateVector,
    CombineRotations,
    Divide,
    Modulo,
    Power,
    Min,
    Max,
    EqualNumbers,
    EqualVectors,
    EqualObjects,
    EqualBools,
    Less,
    Greater,
    And,
    Or,
    Cross,
    Dot,
    Distance,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 24] = [
        BinaryOp::Add,
        BinaryOp::AddVectors,
        BinaryOp::Subtract,
        BinaryOp::SubtractVectors,
        BinaryOp::Multiply,
        BinaryOp::ScaleVector,
        BinaryOp::RotateVector,
        BinaryOp::CombineRotations,
        BinaryOp::Divide,
        BinaryOp::Modulo,
        BinaryOp::Power,
        BinaryOp::Min,
        BinaryOp::Max,
        BinaryOp::EqualNumbers,
        BinaryOp::EqualVectors,
        BinaryOp::EqualObjects,
        BinaryOp::EqualBools,
        BinaryOp::Less,
        BinaryOp::Greater,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Cross,
        BinaryOp::Dot,
        BinaryOp::Distance,
    ];

    pub fn from_index(index: u16) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn index(self) -> u16 {
        Self::ALL.iter().position(|op| *op == self).and_then(|i| u16::try_from(i).ok()).unwrap_or(0)
    }

    /// Kinds of the left and right operands.
    pub fn operands(self) -> (ValueKind, ValueKind) {
        use ValueKind::{Bool, Float, Obj, Rot, Vec3};
        match self {
            BinaryOp::AddVectors
            | BinaryOp::SubtractVectors
            | BinaryOp::EqualVectors
            | BinaryOp::Cross
            | BinaryOp::Dot
            | BinaryOp::Distance => (Vec3, Vec3),
            BinaryOp::ScaleVector => (Vec3, Float),
            BinaryOp::RotateVector => (Vec3, Rot),
            BinaryOp::CombineRotations => (Rot, Rot),
            BinaryOp::EqualObjects => (Obj, Obj),
            BinaryOp::EqualBools | BinaryOp::And | BinaryOp::Or => (Bool, Bool),
            _ => (Float, Float),
        }
    }

    pub fn result(self) -> ValueKind {
        use ValueKind::{Bool, Float, Rot, Vec3};
        match self {
            BinaryOp::AddVectors
            | BinaryOp::SubtractVectors
            | BinaryOp::ScaleVector
            | BinaryOp::RotateVector
            | BinaryOp::Cross => Vec3,
            BinaryOp::CombineRotations => Rot,
            BinaryOp::EqualNumbers
            | BinaryOp::EqualVectors
            | BinaryOp::EqualObjects
            | BinaryOp::EqualBools
            | BinaryOp::Less
            | BinaryOp::Greater
            | BinaryOp::And
            | BinaryOp::Or => Bool,
            _ => Float,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::AddVectors => "add_vectors",
            BinaryOp::Subtract => "subtract",
            BinaryOp::SubtractVectors => "subtract_vectors",
            BinaryOp::Multiply => "multiply",
            BinaryOp::ScaleVector => "scale_vector",
            BinaryOp::RotateVector => "rotate_vector",
            BinaryOp::CombineRotations => "combine_rotations",
            BinaryOp::Divide => "divide",
            BinaryOp::Modulo => "modulo",
            BinaryOp::Power => "power",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
            BinaryOp::EqualNumbers => "equal_numbers",
            BinaryOp::EqualVectors => "equal_vectors",
            BinaryOp::EqualObjects => "equal_objects",
            BinaryOp::EqualBools => "equal_bools",
            BinaryOp::Less => "less",
            BinaryOp::Greater => "greater",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Cross => "cross",
            BinaryOp::Dot => "dot",
            BinaryOp::Distance => "distance",
        }
    }
}
