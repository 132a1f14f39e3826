//! Variables and their program-wide storage ids.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::env::EnvId;
use crate::ValueKind;

/// Name prefix of variables shared by every environment.
pub const GLOBAL_SIGIL: char = '$';

/// Name prefix of global variables that survive between runs.
pub const PERSISTED_SIGIL: char = '!';

/// Elements a variable's list can hold. Writes at or past this index are
/// dropped like writes at a negative index; reads there give zero.
pub const MAX_LIST_LEN: usize = 1 << 20;

/// A variable as named by get/set-variable blocks. Identity is structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub name: String,
    pub kind: ValueKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One instance per environment.
    Local,
    Global,
    Persisted,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Variable {
            name: name.into(),
            kind,
        }
    }

    pub fn scope(&self) -> Scope {
        if self.name.starts_with(GLOBAL_SIGIL) {
            Scope::Global
        } else if self.name.starts_with(PERSISTED_SIGIL) {
            Scope::Persisted
        } else {
            Scope::Local
        }
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        self.scope() != Scope::Local
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.kind)
    }
}

/// Storage id of one variable instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u32);

impl VariableId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A registered variable instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableInfo {
    pub variable: Variable,
    /// Owning environment of a local; `None` for globals.
    pub env: Option<EnvId>,
}

/// Program-wide table of variable instances.
///
/// Locals are keyed by their environment, globals and persisted variables
/// by name and kind alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableTable {
    entries: Vec<VariableInfo>,
    ids: FxHashMap<(Option<EnvId>, Variable), VariableId>,
}

impl VariableTable {
    pub fn new() -> Self {
        VariableTable::default()
    }

    /// Id of `variable` as seen from `env`, registering it on first use.
    #[expect(clippy::cast_possible_truncation, reason = "variable counts fit u32")]
    pub fn intern(&mut self, env: EnvId, variable: &Variable) -> VariableId {
        let owner = if variable.is_global() { None } else { Some(env) };
        let key = (owner, variable.clone());
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        let id = VariableId(self.entries.len() as u32);
        self.entries.push(VariableInfo {
            variable: variable.clone(),
            env: owner,
        });
        self.ids.insert(key, id);
        id
    }

    /// Register a global that no instantiated environment references.
    pub fn intern_global(&mut self, variable: &Variable) -> Option<VariableId> {
        variable
            .is_global()
            .then(|| self.intern(EnvId::ROOT, variable))
    }

    pub fn get(&self, id: VariableId) -> Option<&VariableInfo> {
        self.entries.get(id.index())
    }

    pub fn lookup(&self, env: Option<EnvId>, variable: &Variable) -> Option<VariableId> {
        let owner = if variable.is_global() { None } else { env };
        self.ids.get(&(owner, variable.clone())).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &VariableInfo)> {
        (0u32..).map(VariableId).zip(self.entries.iter())
    }

    /// Global and persisted variables in registration order.
    pub fn globals(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.iter()
            .filter(|(_, info)| info.env.is_none())
            .map(|(id, info)| (id, &info.variable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_follows_sigil() {
        assert_eq!(Variable::new("score", ValueKind::Float).scope(), Scope::Local);
        assert_eq!(Variable::new("$score", ValueKind::Float).scope(), Scope::Global);
        assert_eq!(Variable::new("!best", ValueKind::Float).scope(), Scope::Persisted);
    }

    #[test]
    fn locals_are_per_environment() {
        let mut table = VariableTable::new();
        let local = Variable::new("x", ValueKind::Float);
        let a = table.intern(EnvId(0), &local);
        let b = table.intern(EnvId(1), &local);
        assert_ne!(a, b);
        assert_eq!(table.intern(EnvId(0), &local), a);

        let global = Variable::new("$x", ValueKind::Float);
        assert_eq!(table.intern(EnvId(0), &global), table.intern(EnvId(3), &global));
        assert_eq!(table.globals().count(), 1);
    }

    #[test]
    fn kind_is_part_of_identity() {
        let mut table = VariableTable::new();
        let a = table.intern(EnvId(0), &Variable::new("v", ValueKind::Float));
        let b = table.intern(EnvId(0), &Variable::new("v", ValueKind::Vec3));
        assert_ne!(a, b);
    }
}
