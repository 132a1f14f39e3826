//! Block-grid positions and terminal addressing.
//!
//! A program unit is a bounded 3D grid of block cells. Each placed block
//! covers a [`Footprint`] of up to four cells per axis, and every cell is
//! subdivided into `8 x 8 x 8` voxels. Terminals (pins) are addressed by a
//! voxel coordinate in the block's local space ([`TerminalPos`]).
//!
//! Terminal conventions, for a block `w` cells wide and `d` cells deep:
//!
//! ```text
//!            Before (3, 1, 8d-1)
//!        +---------------------+
//! in 0 ->|(0, 1, 8d-3)         |(8w-1, 1, 8d-3)-> out 0
//! in 1 ->|(0, 1, 8d-11)        |(8w-1, 1, 8d-11)-> out 1
//!        +---------------------+
//!            After (3, 1, 0)
//! ```

use std::fmt;

/// Voxels along one axis of a grid cell.
pub const VOXELS_PER_CELL: u8 = 8;

/// Maximum footprint of a block along any axis, in cells.
pub const MAX_FOOTPRINT: u8 = 4;

/// Position of a block within a program unit's grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl GridPos {
    pub const ORIGIN: GridPos = GridPos { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: u16, y: u16, z: u16) -> Self {
        GridPos { x, y, z }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Extent of a program unit's grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl GridSize {
    #[inline]
    pub const fn new(x: u16, y: u16, z: u16) -> Self {
        GridSize { x, y, z }
    }

    /// Number of cells in the grid.
    #[inline]
    pub fn volume(self) -> usize {
        usize::from(self.x) * usize::from(self.y) * usize::from(self.z)
    }

    #[inline]
    pub fn contains(self, pos: GridPos) -> bool {
        pos.x < self.x && pos.y < self.y && pos.z < self.z
    }

    /// Linear cell index of `pos`, or `None` when out of bounds.
    pub fn index_of(self, pos: GridPos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let (x, y, z) = (usize::from(pos.x), usize::from(pos.y), usize::from(pos.z));
        Some(x + usize::from(self.x) * (y + usize::from(self.y) * z))
    }

    /// All positions in traversal order: `z` descending, then `y`
    /// ascending, then `x` ascending.
    ///
    /// This is the only ordering defined between independent entry points,
    /// so every stage that enumerates blocks uses it.
    pub fn scan(self) -> impl Iterator<Item = GridPos> {
        (0..self.z).rev().flat_map(move |z| {
            (0..self.y).flat_map(move |y| (0..self.x).map(move |x| GridPos::new(x, y, z)))
        })
    }
}

/// Cells a block covers along each axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Footprint {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl Footprint {
    pub const UNIT: Footprint = Footprint { x: 1, y: 1, z: 1 };

    /// Build a footprint, clamping every axis into `1..=MAX_FOOTPRINT`.
    pub fn new(x: u8, y: u8, z: u8) -> Self {
        let clamp = |v: u8| v.clamp(1, MAX_FOOTPRINT);
        Footprint {
            x: clamp(x),
            y: clamp(y),
            z: clamp(z),
        }
    }

    #[inline]
    fn voxels(cells: u8) -> u8 {
        cells * VOXELS_PER_CELL
    }
}

/// Voxel coordinate of a terminal in block-local space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl TerminalPos {
    /// The implicit void-flow terminal an executing block is entered through.
    pub fn before(footprint: Footprint) -> Self {
        TerminalPos::new(3, 1, Footprint::voxels(footprint.z) - 1)
    }

    /// The void-flow terminal a block continues through once executed.
    pub const AFTER: TerminalPos = TerminalPos { x: 3, y: 1, z: 0 };

    #[inline]
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        TerminalPos { x, y, z }
    }

    /// Terminal of input slot `index` on the left face, if it fits.
    pub fn input(index: u8, footprint: Footprint) -> Option<Self> {
        Self::side_row(index, footprint).map(|z| TerminalPos::new(0, 1, z))
    }

    /// Terminal of output slot `index` on the right face, if it fits.
    pub fn output(index: u8, footprint: Footprint) -> Option<Self> {
        let x = Footprint::voxels(footprint.x) - 1;
        Self::side_row(index, footprint).map(|z| TerminalPos::new(x, 1, z))
    }

    fn side_row(index: u8, footprint: Footprint) -> Option<u8> {
        if index >= footprint.z {
            return None;
        }
        Some(Footprint::voxels(footprint.z) - 3 - VOXELS_PER_CELL * index)
    }

    /// Whether the terminal lies inside a block of the given footprint.
    pub fn fits(self, footprint: Footprint) -> bool {
        self.x < Footprint::voxels(footprint.x)
            && self.y < Footprint::voxels(footprint.y)
            && self.z < Footprint::voxels(footprint.z)
    }
}

impl fmt::Display for TerminalPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.x, self.y, self.z)
    }
}

/// A terminal on a specific placed block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TerminalAddress {
    pub block: GridPos,
    pub terminal: TerminalPos,
}

impl TerminalAddress {
    #[inline]
    pub const fn new(block: GridPos, terminal: TerminalPos) -> Self {
        TerminalAddress { block, terminal }
    }
}

impl fmt::Display for TerminalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.block, self.terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scan_runs_z_descending() {
        let order: Vec<_> = GridSize::new(2, 1, 2).scan().collect();
        assert_eq!(
            order,
            vec![
                GridPos::new(0, 0, 1),
                GridPos::new(1, 0, 1),
                GridPos::new(0, 0, 0),
                GridPos::new(1, 0, 0),
            ]
        );
    }

    #[test]
    fn index_of_rejects_out_of_bounds() {
        let size = GridSize::new(4, 2, 3);
        assert_eq!(size.index_of(GridPos::new(3, 1, 2)), Some(3 + 4 * (1 + 2 * 2)));
        assert_eq!(size.index_of(GridPos::new(4, 0, 0)), None);
    }

    #[test]
    fn terminals_follow_footprint() {
        let fp = Footprint::new(2, 1, 2);
        assert_eq!(TerminalPos::before(fp), TerminalPos::new(3, 1, 15));
        assert_eq!(TerminalPos::input(0, fp), Some(TerminalPos::new(0, 1, 13)));
        assert_eq!(TerminalPos::input(1, fp), Some(TerminalPos::new(0, 1, 5)));
        assert_eq!(TerminalPos::input(2, fp), None);
        assert_eq!(TerminalPos::output(1, fp), Some(TerminalPos::new(15, 1, 5)));
        assert!(TerminalPos::AFTER.fits(fp));
        assert!(!TerminalPos::new(16, 1, 0).fits(fp));
    }

    #[test]
    fn footprint_is_clamped() {
        assert_eq!(Footprint::new(0, 9, 3), Footprint { x: 1, y: 4, z: 3 });
    }
}
