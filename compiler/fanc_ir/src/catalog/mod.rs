//! Block definition lookup.
//!
//! The catalog answers "what is block id N": either a [`Builtin`] with a
//! fixed layout, or a custom block whose body is a registered
//! [`ProgramUnit`]. It is read-only once handed to the parser.

mod builtin;
mod layout;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::unit::{BlockId, ProgramUnit, UnitId};

pub use builtin::Builtin;
pub use layout::{Layout, LayoutBuilder, TerminalDef};

/// First block id available to custom blocks.
pub const FIRST_CUSTOM_ID: u16 = 597;

/// Rejected custom block registrations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("block id {0} is reserved for built-in blocks")]
    ReservedId(BlockId),
    #[error("block id {0} is already registered")]
    Duplicate(BlockId),
    #[error("terminal `{terminal}` of `{unit}` lies outside its footprint")]
    TerminalOutsideFootprint { unit: String, terminal: String },
    #[error("two terminals of `{unit}` share position {pos}")]
    TerminalOverlap { unit: String, pos: String },
}

#[derive(Debug)]
struct CustomDef {
    unit: Arc<ProgramUnit>,
    layout: Layout,
}

/// What a block id resolves to.
#[derive(Clone, Debug)]
pub enum BlockDef<'a> {
    Builtin(Builtin),
    Custom {
        id: UnitId,
        unit: &'a Arc<ProgramUnit>,
        layout: &'a Layout,
    },
}

impl BlockDef<'_> {
    pub fn layout(&self) -> Layout {
        match self {
            BlockDef::Builtin(builtin) => builtin.layout(),
            BlockDef::Custom { layout, .. } => (*layout).clone(),
        }
    }
}

/// Built-in blocks plus registered custom blocks.
#[derive(Debug, Default)]
pub struct Catalog {
    custom: FxHashMap<BlockId, CustomDef>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Register `unit` as the body of custom block `id`.
    pub fn add_unit(&mut self, id: BlockId, unit: ProgramUnit) -> Result<(), CatalogError> {
        if id.0 < FIRST_CUSTOM_ID {
            return Err(CatalogError::ReservedId(id));
        }
        if self.custom.contains_key(&id) {
            return Err(CatalogError::Duplicate(id));
        }
        for (i, terminal) in unit.terminals.iter().enumerate() {
            if !terminal.pos.fits(unit.footprint) {
                return Err(CatalogError::TerminalOutsideFootprint {
                    unit: unit.name.clone(),
                    terminal: terminal.name.clone(),
                });
            }
            if unit.terminals[..i].iter().any(|other| other.pos == terminal.pos) {
                return Err(CatalogError::TerminalOverlap {
                    unit: unit.name.clone(),
                    pos: terminal.pos.to_string(),
                });
            }
        }
        let layout = Layout::of_unit(&unit);
        tracing::trace!(%id, name = %unit.name, "registered custom block");
        self.custom.insert(
            id,
            CustomDef {
                unit: Arc::new(unit),
                layout,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, id: BlockId) -> Option<BlockDef<'_>> {
        if id.is_empty() {
            return None;
        }
        if id.0 < FIRST_CUSTOM_ID {
            return Builtin::from_id(id).map(BlockDef::Builtin);
        }
        self.custom.get(&id).map(|def| BlockDef::Custom {
            id: UnitId::of_block(id),
            unit: &def.unit,
            layout: &def.layout,
        })
    }

    pub fn unit(&self, id: UnitId) -> Option<&Arc<ProgramUnit>> {
        self.custom.get(&BlockId(id.0)).map(|def| &def.unit)
    }

    /// Registered custom units in id order.
    pub fn units(&self) -> Vec<(UnitId, &Arc<ProgramUnit>)> {
        let mut units: Vec<_> = self
            .custom
            .iter()
            .map(|(id, def)| (UnitId::of_block(*id), &def.unit))
            .collect();
        units.sort_by_key(|(id, _)| *id);
        units
    }
}
