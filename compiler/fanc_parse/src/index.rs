//! Connection lookup for one unit.

use fanc_ir::{Connection, GridPos, TerminalPos};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

type Key = (GridPos, TerminalPos);

/// A unit's wires indexed by endpoint. Every list keeps connection order.
pub(crate) struct ConnectionIndex<'u> {
    connections: &'u [Connection],
    /// Wires ending on a block terminal.
    incoming: FxHashMap<Key, SmallVec<[usize; 1]>>,
    /// Wires starting from a block terminal.
    outgoing: FxHashMap<Key, SmallVec<[usize; 2]>>,
    /// Wires starting at the host's input terminals.
    from_outside: Vec<usize>,
    /// Wires ending at the host's output terminals.
    to_outside: Vec<usize>,
    /// Outside wires dropped because the unit has no host.
    dropped: Vec<usize>,
}

impl<'u> ConnectionIndex<'u> {
    /// Index `connections`. With `hosted == false` every wire touching the
    /// outside is dropped.
    pub(crate) fn new(connections: &'u [Connection], hosted: bool) -> Self {
        let mut index = ConnectionIndex {
            connections,
            incoming: FxHashMap::default(),
            outgoing: FxHashMap::default(),
            from_outside: Vec::new(),
            to_outside: Vec::new(),
            dropped: Vec::new(),
        };
        for (i, conn) in connections.iter().enumerate() {
            if !hosted && (conn.from_outside || conn.to_outside) {
                index.dropped.push(i);
                continue;
            }
            if conn.from_outside {
                index.from_outside.push(i);
            } else {
                index
                    .outgoing
                    .entry((conn.from.block, conn.from.terminal))
                    .or_default()
                    .push(i);
            }
            if conn.to_outside {
                index.to_outside.push(i);
            } else {
                index
                    .incoming
                    .entry((conn.to.block, conn.to.terminal))
                    .or_default()
                    .push(i);
            }
        }
        index
    }

    /// Every connection that survived indexing, in order.
    pub(crate) fn live(&self) -> impl Iterator<Item = &'u Connection> + '_ {
        let connections = self.connections;
        connections
            .iter()
            .enumerate()
            .filter(move |(i, _)| !self.dropped.contains(i))
            .map(|(_, conn)| conn)
    }

    pub(crate) fn dropped(&self) -> impl Iterator<Item = &'u Connection> + '_ {
        let connections = self.connections;
        self.dropped.iter().map(move |&i| &connections[i])
    }

    pub(crate) fn incoming(&self, block: GridPos, terminal: TerminalPos) -> Vec<&'u Connection> {
        self.lookup(&self.incoming, block, terminal)
    }

    pub(crate) fn outgoing(&self, block: GridPos, terminal: TerminalPos) -> Vec<&'u Connection> {
        self.lookup(&self.outgoing, block, terminal)
    }

    pub(crate) fn has_incoming(&self, block: GridPos, terminal: TerminalPos) -> bool {
        self.incoming.contains_key(&(block, terminal))
    }

    /// Wires starting at the host's input `terminal`.
    pub(crate) fn from_host(&self, terminal: TerminalPos) -> Vec<&'u Connection> {
        let connections = self.connections;
        self.from_outside
            .iter()
            .map(|&i| &connections[i])
            .filter(|conn| conn.from.terminal == terminal)
            .collect()
    }

    /// Wires ending at the host's output `terminal`.
    pub(crate) fn to_host(&self, terminal: TerminalPos) -> Vec<&'u Connection> {
        let connections = self.connections;
        self.to_outside
            .iter()
            .map(|&i| &connections[i])
            .filter(|conn| conn.to.terminal == terminal)
            .collect()
    }

    fn lookup<const N: usize>(
        &self,
        map: &FxHashMap<Key, SmallVec<[usize; N]>>,
        block: GridPos,
        terminal: TerminalPos,
    ) -> Vec<&'u Connection> {
        let connections = self.connections;
        map.get(&(block, terminal))
            .map(|list| list.iter().map(|&i| &connections[i]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use fanc_ir::TerminalAddress;

    use super::*;

    fn addr(x: u16, terminal: TerminalPos) -> TerminalAddress {
        TerminalAddress::new(GridPos::new(x, 0, 0), terminal)
    }

    #[test]
    fn keeps_connection_order() {
        let t = TerminalPos::new(0, 1, 5);
        let wires = [
            Connection::new(addr(0, TerminalPos::AFTER), addr(2, t)),
            Connection::new(addr(0, TerminalPos::AFTER), addr(1, t)),
        ];
        let index = ConnectionIndex::new(&wires, true);
        let targets: Vec<_> = index
            .outgoing(GridPos::ORIGIN, TerminalPos::AFTER)
            .iter()
            .map(|conn| conn.to.block.x)
            .collect();
        assert_eq!(targets, vec![2, 1]);
        assert!(index.has_incoming(GridPos::new(1, 0, 0), t));
    }

    #[test]
    fn unhosted_units_drop_outside_wires() {
        let t = TerminalPos::new(0, 1, 5);
        let wires = [
            Connection::from_outside(t, addr(1, t)),
            Connection::new(addr(0, TerminalPos::AFTER), addr(1, t)),
        ];
        let index = ConnectionIndex::new(&wires, false);
        assert_eq!(index.dropped().count(), 1);
        assert_eq!(index.live().count(), 1);
        assert!(index.from_host(t).is_empty());
        assert_eq!(index.incoming(GridPos::new(1, 0, 0), t).len(), 1);
    }
}
