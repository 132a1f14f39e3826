//! Signal kinds carried by terminals and wires.

use std::fmt;

/// Kinds of values an expression output can carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Float,
    Vec3,
    Rot,
    Bool,
    Obj,
    Con,
}

impl ValueKind {
    pub const ALL: [ValueKind; 6] = [
        ValueKind::Float,
        ValueKind::Vec3,
        ValueKind::Rot,
        ValueKind::Bool,
        ValueKind::Obj,
        ValueKind::Con,
    ];

    /// Dense index, used to derive per-kind block ids and symbol suffixes.
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            ValueKind::Float => 0,
            ValueKind::Vec3 => 1,
            ValueKind::Rot => 2,
            ValueKind::Bool => 3,
            ValueKind::Obj => 4,
            ValueKind::Con => 5,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Float => "float",
            ValueKind::Vec3 => "vec3",
            ValueKind::Rot => "rot",
            ValueKind::Bool => "bool",
            ValueKind::Obj => "obj",
            ValueKind::Con => "con",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of a terminal: void flow, a value, or a pointer to variable storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Void,
    Value(ValueKind),
    Pointer(ValueKind),
}

impl SignalKind {
    pub const FLOAT: SignalKind = SignalKind::Value(ValueKind::Float);
    pub const VEC3: SignalKind = SignalKind::Value(ValueKind::Vec3);
    pub const ROT: SignalKind = SignalKind::Value(ValueKind::Rot);
    pub const BOOL: SignalKind = SignalKind::Value(ValueKind::Bool);
    pub const OBJ: SignalKind = SignalKind::Value(ValueKind::Obj);
    pub const CON: SignalKind = SignalKind::Value(ValueKind::Con);

    #[inline]
    pub fn is_void(self) -> bool {
        matches!(self, SignalKind::Void)
    }

    #[inline]
    pub fn is_pointer(self) -> bool {
        matches!(self, SignalKind::Pointer(_))
    }

    /// The value kind read through this terminal, dereferencing pointers.
    pub fn value_kind(self) -> Option<ValueKind> {
        match self {
            SignalKind::Void => None,
            SignalKind::Value(kind) | SignalKind::Pointer(kind) => Some(kind),
        }
    }

    /// Whether an output of kind `self` may be wired into an input of kind
    /// `input`. Pointers feed value inputs of their pointee kind (implicit
    /// dereference); everything else must match exactly.
    pub fn feeds(self, input: SignalKind) -> bool {
        match (self, input) {
            (SignalKind::Pointer(from), SignalKind::Value(to)) => from == to,
            (from, to) => from == to,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Void => f.write_str("void"),
            SignalKind::Value(kind) => write!(f, "{kind}"),
            SignalKind::Pointer(kind) => write!(f, "{kind}*"),
        }
    }
}
