//! Variable discovery.
//!
//! Runs before any node is built: every get/set-variable block names a
//! variable through its string setting 0 (empty when missing), and its kind
//! comes from the block variant.

use fanc_ir::{Builtin, Catalog, ProgramUnit, Variable, FIRST_CUSTOM_ID};

use crate::settings::Settings;

/// Setting index holding a variable block's name.
pub(crate) const NAME_SETTING: u8 = 0;

/// Variables named in `unit`, in first-mention scan order, without
/// duplicates.
pub fn unit_variables(unit: &ProgramUnit) -> Vec<Variable> {
    let settings = Settings::new(&unit.settings);
    let mut variables: Vec<Variable> = Vec::new();
    for (pos, id) in unit.grid.blocks() {
        if id.0 >= FIRST_CUSTOM_ID {
            continue;
        }
        let Some(kind) = Builtin::from_id(id).and_then(Builtin::names_variable) else {
            continue;
        };
        let name = settings.string(pos, NAME_SETTING).unwrap_or_default();
        let variable = Variable::new(name, kind);
        if !variables.contains(&variable) {
            variables.push(variable);
        }
    }
    variables
}

/// Global and persisted variables named by any unit registered in the
/// catalog, whether or not the program places it.
pub fn catalog_globals(catalog: &Catalog) -> Vec<Variable> {
    let mut globals: Vec<Variable> = Vec::new();
    for (_, unit) in catalog.units() {
        for variable in unit_variables(unit) {
            if variable.is_global() && !globals.contains(&variable) {
                globals.push(variable);
            }
        }
    }
    globals
}

#[cfg(test)]
mod tests {
    use fanc_ir::{BlockId, GridPos, GridSize, SettingValue, ValueKind};

    use super::*;

    fn variable_block(kind: ValueKind) -> BlockId {
        Builtin::Variable(kind).id()
    }

    #[test]
    fn same_name_and_kind_is_one_variable() {
        let mut unit = ProgramUnit::new("main", GridSize::new(3, 1, 1));
        unit.place(GridPos::new(0, 0, 0), variable_block(ValueKind::Float))
            .setting(GridPos::new(0, 0, 0), 0, SettingValue::Str("hp".into()))
            .place(GridPos::new(1, 0, 0), Builtin::SetVariable(ValueKind::Float).id())
            .setting(GridPos::new(1, 0, 0), 0, SettingValue::Str("hp".into()))
            .place(GridPos::new(2, 0, 0), variable_block(ValueKind::Vec3))
            .setting(GridPos::new(2, 0, 0), 0, SettingValue::Str("hp".into()));

        assert_eq!(
            unit_variables(&unit),
            vec![Variable::new("hp", ValueKind::Float), Variable::new("hp", ValueKind::Vec3)]
        );
    }

    #[test]
    fn missing_name_is_empty() {
        let mut unit = ProgramUnit::new("main", GridSize::new(1, 1, 1));
        unit.place(GridPos::ORIGIN, variable_block(ValueKind::Bool));
        assert_eq!(unit_variables(&unit), vec![Variable::new("", ValueKind::Bool)]);
    }
}
