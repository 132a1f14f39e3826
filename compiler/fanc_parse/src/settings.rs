//! Typed access to block settings.

use fanc_ir::{GridPos, Setting, SettingValue};
use glam::Vec3;
use rustc_hash::FxHashMap;

/// Settings of one unit keyed by `(position, index)`. The first setting
/// for a key wins.
pub(crate) struct Settings<'u> {
    values: FxHashMap<(GridPos, u8), &'u SettingValue>,
}

impl<'u> Settings<'u> {
    pub(crate) fn new(settings: &'u [Setting]) -> Self {
        let mut values = FxHashMap::default();
        for setting in settings {
            values.entry((setting.pos, setting.index)).or_insert(&setting.value);
        }
        Settings { values }
    }

    pub(crate) fn get(&self, pos: GridPos, index: u8) -> Option<&'u SettingValue> {
        self.values.get(&(pos, index)).copied()
    }

    pub(crate) fn byte(&self, pos: GridPos, index: u8) -> Option<u8> {
        match self.get(pos, index)? {
            SettingValue::Byte(b) => Some(*b),
            SettingValue::Int(i) => u8::try_from((*i).clamp(0, 255)).ok(),
            _ => None,
        }
    }

    pub(crate) fn int(&self, pos: GridPos, index: u8) -> Option<i32> {
        match self.get(pos, index)? {
            SettingValue::Byte(b) => Some(i32::from(*b)),
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[expect(clippy::cast_precision_loss, reason = "integer settings are small")]
    pub(crate) fn float(&self, pos: GridPos, index: u8) -> Option<f32> {
        match self.get(pos, index)? {
            SettingValue::Float(v) => Some(*v),
            SettingValue::Int(i) => Some(*i as f32),
            SettingValue::Byte(b) => Some(f32::from(*b)),
            _ => None,
        }
    }

    pub(crate) fn vec3(&self, pos: GridPos, index: u8) -> Option<Vec3> {
        match self.get(pos, index)? {
            SettingValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// String setting; a terminal name counts as a string.
    pub(crate) fn string(&self, pos: GridPos, index: u8) -> Option<&'u str> {
        match self.get(pos, index)? {
            SettingValue::Str(s) | SettingValue::TerminalName(s) => Some(s),
            _ => None,
        }
    }
}
