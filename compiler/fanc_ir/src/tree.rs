//! The parsed form of one program unit.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::grid::{GridPos, TerminalPos};
use crate::node::{FlowTarget, NodeId, SyntaxNode, Terminal};
use crate::unit::UnitId;
use crate::Variable;

/// An unconnected void input: a place execution can start from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    pub pos: GridPos,
    pub node: NodeId,
    pub terminal: TerminalPos,
}

/// Syntax tree of one program unit.
///
/// Immutable once built. Custom blocks hold their body's tree behind an
/// `Arc`, so a unit used in many places is parsed and stored once.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxTree {
    pub unit: UnitId,
    pub name: String,
    nodes: Vec<SyntaxNode>,
    by_pos: FxHashMap<GridPos, NodeId>,
    /// Entry points in grid scan order.
    pub entry_points: Vec<EntryPoint>,
    /// Variables named in this unit, in first-mention scan order.
    pub variables: Vec<Variable>,
    /// Flows started by each of the host's void inputs.
    pub inbound: Vec<(TerminalPos, SmallVec<[FlowTarget; 2]>)>,
    /// Sources of each of the host's value outputs.
    pub outbound: Vec<(TerminalPos, Terminal)>,
    /// Custom-block nesting below this unit; 0 when it has none.
    pub height: u32,
}

impl SyntaxTree {
    #[expect(clippy::cast_possible_truncation, reason = "node counts fit u32")]
    pub fn new(unit: UnitId, name: impl Into<String>, nodes: Vec<SyntaxNode>) -> Self {
        let by_pos = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.pos, NodeId(index as u32)))
            .collect();
        let height = nodes
            .iter()
            .filter_map(SyntaxNode::custom)
            .map(|block| block.body.height + 1)
            .max()
            .unwrap_or(0);
        SyntaxTree {
            unit,
            name: name.into(),
            nodes,
            by_pos,
            entry_points: Vec::new(),
            variables: Vec::new(),
            inbound: Vec::new(),
            outbound: Vec::new(),
            height,
        }
    }

    /// Same tree with the node arena replaced; node ids must be unchanged.
    #[must_use]
    pub fn with_nodes(&self, nodes: Vec<SyntaxNode>) -> Self {
        let mut tree = SyntaxTree::new(self.unit, self.name.clone(), nodes);
        tree.entry_points.clone_from(&self.entry_points);
        tree.variables.clone_from(&self.variables);
        tree.inbound.clone_from(&self.inbound);
        tree.outbound.clone_from(&self.outbound);
        tree
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        (0u32..).map(NodeId).zip(self.nodes.iter())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_at(&self, pos: GridPos) -> Option<NodeId> {
        self.by_pos.get(&pos).copied()
    }

    pub fn inbound(&self, terminal: TerminalPos) -> &[FlowTarget] {
        self.inbound
            .iter()
            .find(|(pos, _)| *pos == terminal)
            .map_or(&[], |(_, targets)| targets.as_slice())
    }

    pub fn outbound(&self, terminal: TerminalPos) -> Option<Terminal> {
        self.outbound
            .iter()
            .find(|(pos, _)| *pos == terminal)
            .map(|(_, source)| *source)
    }
}
