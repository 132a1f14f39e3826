//! List storage behind variable pointers.

use fanc_ir::{Value, VariableId, MAX_LIST_LEN};
use rustc_hash::FxHashMap;

use crate::{Pointer, RuntimeContext};

/// Growable per-variable lists.
///
/// Reads past the end or at a negative index return the zero value of the
/// pointer's kind. Writes past the end grow the list, filling the gap with
/// zeros; writes at a negative index or at [`MAX_LIST_LEN`] and beyond are
/// dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableStore {
    lists: FxHashMap<VariableId, Vec<Value>>,
}

impl VariableStore {
    pub fn new() -> Self {
        VariableStore::default()
    }

    pub fn get(&self, pointer: Pointer) -> Value {
        usize::try_from(pointer.index)
            .ok()
            .and_then(|index| self.lists.get(&pointer.var)?.get(index))
            .copied()
            .unwrap_or_else(|| Value::zero(pointer.kind))
    }

    pub fn set(&mut self, pointer: Pointer, value: Value) {
        let Ok(index) = usize::try_from(pointer.index) else {
            return;
        };
        if index >= MAX_LIST_LEN {
            return;
        }
        let list = self.lists.entry(pointer.var).or_default();
        if index >= list.len() {
            list.resize(index + 1, Value::zero(pointer.kind));
        }
        list[index] = value;
    }

    /// Every element written to `var` so far.
    pub fn values(&self, var: VariableId) -> &[Value] {
        self.lists.get(&var).map_or(&[], Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.lists.clear();
    }
}

/// A context with storage and nothing else, for headless runs.
impl RuntimeContext for VariableStore {
    fn get_value(&self, pointer: Pointer) -> Value {
        self.get(pointer)
    }

    fn set_value(&mut self, pointer: Pointer, value: Value) {
        self.set(pointer, value);
    }
}

#[cfg(test)]
mod tests {
    use fanc_ir::ValueKind;
    use glam::Vec3;

    use super::*;

    fn pointer(index: i32) -> Pointer {
        Pointer::new(VariableId(0), ValueKind::Vec3).offset(index)
    }

    #[test]
    fn unwritten_elements_read_zero() {
        let store = VariableStore::new();
        assert_eq!(store.get(pointer(0)), Value::Vec3(Vec3::ZERO));
        assert_eq!(store.get(pointer(-4)), Value::Vec3(Vec3::ZERO));
    }

    #[test]
    fn writes_grow_with_zeros() {
        let mut store = VariableStore::new();
        store.set(pointer(2), Value::Vec3(Vec3::ONE));
        assert_eq!(
            store.values(VariableId(0)),
            &[Value::Vec3(Vec3::ZERO), Value::Vec3(Vec3::ZERO), Value::Vec3(Vec3::ONE)]
        );
        assert_eq!(store.get(pointer(3)), Value::Vec3(Vec3::ZERO));
    }

    #[test]
    fn negative_writes_are_dropped() {
        let mut store = VariableStore::new();
        store.set(pointer(-1), Value::Vec3(Vec3::ONE));
        assert!(store.values(VariableId(0)).is_empty());
    }

    #[test]
    fn writes_past_the_length_limit_are_dropped() {
        let mut store = VariableStore::new();
        store.set(pointer(i32::MAX), Value::Vec3(Vec3::ONE));
        let last = i32::try_from(MAX_LIST_LEN).unwrap_or(i32::MAX) - 1;
        store.set(pointer(last + 1), Value::Vec3(Vec3::ONE));
        assert!(store.values(VariableId(0)).is_empty());
        assert_eq!(store.get(pointer(i32::MAX)), Value::Vec3(Vec3::ZERO));

        store.set(pointer(last), Value::Vec3(Vec3::ONE));
        assert_eq!(store.values(VariableId(0)).len(), MAX_LIST_LEN);
    }
}
