//! Program units as handed over by the authoring/persistence layer.
//!
//! A [`ProgramUnit`] is an immutable snapshot: a grid of block ids, the
//! literal settings attached to blocks, and the wires between terminals.
//! Nothing in the compiler mutates it.

use std::fmt;

use glam::Vec3;

use crate::grid::{Footprint, GridPos, GridSize, TerminalAddress, TerminalPos};
use crate::SignalKind;

/// Catalog id of a block definition. `0` marks an empty cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const EMPTY: BlockId = BlockId(0);

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a program unit: the root program or a custom block's body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u16);

impl UnitId {
    pub const ROOT: UnitId = UnitId(0);

    /// Unit id of the body behind a custom block id.
    #[inline]
    pub fn of_block(id: BlockId) -> UnitId {
        UnitId(id.0)
    }
}

/// Dense grid of block ids; a block's id is stored at its origin cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    size: GridSize,
    cells: Vec<BlockId>,
}

impl BlockGrid {
    pub fn new(size: GridSize) -> Self {
        BlockGrid {
            size,
            cells: vec![BlockId::EMPTY; size.volume()],
        }
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Block at `pos`; out-of-bounds positions read as empty.
    pub fn get(&self, pos: GridPos) -> BlockId {
        self.size
            .index_of(pos)
            .map_or(BlockId::EMPTY, |index| self.cells[index])
    }

    /// Place a block. Returns `false` when `pos` is outside the grid.
    pub fn set(&mut self, pos: GridPos, id: BlockId) -> bool {
        match self.size.index_of(pos) {
            Some(index) => {
                self.cells[index] = id;
                true
            }
            None => false,
        }
    }

    /// Non-empty cells in traversal order.
    pub fn blocks(&self) -> impl Iterator<Item = (GridPos, BlockId)> + '_ {
        self.size
            .scan()
            .map(|pos| (pos, self.get(pos)))
            .filter(|(_, id)| !id.is_empty())
    }
}

/// Literal configuration value attached to a block.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
    Byte(u8),
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Str(String),
    TerminalName(String),
}

/// One setting: `(position, index) -> value`.
#[derive(Clone, Debug, PartialEq)]
pub struct Setting {
    pub pos: GridPos,
    pub index: u8,
    pub value: SettingValue,
}

/// A directed wire between two terminals.
///
/// `from_outside` marks a source on the host custom block's input terminal
/// `from.terminal` (the `from.block` field is then ignored); `to_outside`
/// marks a target on the host's output terminal `to.terminal`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub from: TerminalAddress,
    pub to: TerminalAddress,
    pub from_outside: bool,
    pub to_outside: bool,
}

impl Connection {
    /// A wire between two blocks of the same unit.
    pub fn new(from: TerminalAddress, to: TerminalAddress) -> Self {
        Connection {
            from,
            to,
            from_outside: false,
            to_outside: false,
        }
    }

    /// A wire from the host's input terminal `host_terminal` to `to`.
    pub fn from_outside(host_terminal: TerminalPos, to: TerminalAddress) -> Self {
        Connection {
            from: TerminalAddress::new(GridPos::ORIGIN, host_terminal),
            to,
            from_outside: true,
            to_outside: false,
        }
    }

    /// A wire from `from` to the host's output terminal `host_terminal`.
    pub fn to_outside(from: TerminalAddress, host_terminal: TerminalPos) -> Self {
        Connection {
            from,
            to: TerminalAddress::new(GridPos::ORIGIN, host_terminal),
            from_outside: false,
            to_outside: true,
        }
    }
}

/// Direction of a terminal, seen from outside the block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

/// A terminal a custom block's body exposes on its footprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitTerminal {
    pub name: String,
    pub kind: SignalKind,
    pub direction: Direction,
    pub pos: TerminalPos,
}

/// One independently addressable block graph.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramUnit {
    pub name: String,
    pub grid: BlockGrid,
    pub settings: Vec<Setting>,
    pub connections: Vec<Connection>,
    /// Cells the unit covers when placed as a custom block.
    pub footprint: Footprint,
    /// Terminals exposed when placed as a custom block; empty for the root.
    pub terminals: Vec<UnitTerminal>,
}

impl ProgramUnit {
    pub fn new(name: impl Into<String>, size: GridSize) -> Self {
        ProgramUnit {
            name: name.into(),
            grid: BlockGrid::new(size),
            settings: Vec::new(),
            connections: Vec::new(),
            footprint: Footprint::UNIT,
            terminals: Vec::new(),
        }
    }

    pub fn place(&mut self, pos: GridPos, id: BlockId) -> &mut Self {
        self.grid.set(pos, id);
        self
    }

    pub fn setting(&mut self, pos: GridPos, index: u8, value: SettingValue) -> &mut Self {
        self.settings.push(Setting { pos, index, value });
        self
    }

    pub fn connect(&mut self, connection: Connection) -> &mut Self {
        self.connections.push(connection);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_lists_blocks_in_scan_order() {
        let mut grid = BlockGrid::new(GridSize::new(2, 1, 2));
        grid.set(GridPos::new(1, 0, 0), BlockId(7));
        grid.set(GridPos::new(0, 0, 1), BlockId(3));
        assert!(!grid.set(GridPos::new(5, 0, 0), BlockId(1)));
        let blocks: Vec<_> = grid.blocks().collect();
        assert_eq!(
            blocks,
            vec![(GridPos::new(0, 0, 1), BlockId(3)), (GridPos::new(1, 0, 0), BlockId(7))]
        );
    }

    #[test]
    fn out_of_bounds_reads_empty() {
        let grid = BlockGrid::new(GridSize::new(1, 1, 1));
        assert!(grid.get(GridPos::new(3, 3, 3)).is_empty());
    }
}
