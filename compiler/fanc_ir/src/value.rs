//! Runtime and literal values.

use std::fmt;

use glam::{Quat, Vec3};
use smallvec::SmallVec;

use crate::ValueKind;

/// Handle to a host object. [`ObjectRef::NONE`] is the disconnected value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(pub i32);

impl ObjectRef {
    pub const NONE: ObjectRef = ObjectRef(-1);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 < 0
    }
}

/// Handle to a host physics constraint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef(pub i32);

impl ConstraintRef {
    pub const NONE: ConstraintRef = ConstraintRef(-1);
}

/// A value of one of the closed set of [`ValueKind`]s.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    Float(f32),
    Vec3(Vec3),
    Rot(Quat),
    Bool(bool),
    Obj(ObjectRef),
    Con(ConstraintRef),
}

/// Values of every output of one node, indexed by output slot.
pub type Outputs = SmallVec<[Value; 3]>;

impl Value {
    /// The value a disconnected input or an unwritten storage slot reads as.
    pub fn zero(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Vec3 => Value::Vec3(Vec3::ZERO),
            ValueKind::Rot => Value::Rot(Quat::IDENTITY),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Obj => Value::Obj(ObjectRef::NONE),
            ValueKind::Con => Value::Con(ConstraintRef::NONE),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Rot(_) => ValueKind::Rot,
            Value::Bool(_) => ValueKind::Bool,
            Value::Obj(_) => ValueKind::Obj,
            Value::Con(_) => ValueKind::Con,
        }
    }

    // Wiring is kind-checked at parse time, so a mismatch here reads as the
    // zero value of the requested kind.

    #[inline]
    pub fn as_float(&self) -> f32 {
        match self {
            Value::Float(v) => *v,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn as_vec3(&self) -> Vec3 {
        match self {
            Value::Vec3(v) => *v,
            _ => Vec3::ZERO,
        }
    }

    #[inline]
    pub fn as_rot(&self) -> Quat {
        match self {
            Value::Rot(q) => *q,
            _ => Quat::IDENTITY,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    #[inline]
    pub fn as_obj(&self) -> ObjectRef {
        match self {
            Value::Obj(o) => *o,
            _ => ObjectRef::NONE,
        }
    }

    #[inline]
    pub fn as_con(&self) -> ConstraintRef {
        match self {
            Value::Con(c) => *c,
            _ => ConstraintRef::NONE,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Vec3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Value::Rot(q) => {
                let [x, y, z] = crate::math::quat_to_euler_degrees(*q);
                write!(f, "rot({x}, {y}, {z})")
            }
            Value::Bool(b) => write!(f, "{b}"),
            Value::Obj(o) if o.is_none() => f.write_str("obj(none)"),
            Value::Obj(o) => write!(f, "obj({})", o.0),
            Value::Con(c) => write!(f, "con({})", c.0),
        }
    }
}
