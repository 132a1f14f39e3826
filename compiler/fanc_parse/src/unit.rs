//! Parsing of a single program unit.
//!
//! Node ids are assigned up front, one per placed block in scan order, so
//! the arena layout never depends on the order nodes are built in. Building
//! itself is lazy: a node builds the value-producing nodes it reads from
//! before finishing, and a node met again while it is still being built
//! closes an expression cycle.

use std::sync::Arc;

use fanc_ir::{
    ensure_sufficient_stack, BlockDef, Connection, CustomBlock, Direction, EntryPoint, Exit,
    ExprKind, FlowTarget, GridPos, Input, Layout, NodeId, NodeKind, Output, ProgramUnit,
    SignalKind, StmtKind, SyntaxNode, SyntaxTree, Terminal, TerminalPos, UnitId, Variable,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{ParseError, ParseErrorKind, ParseWarning};
use crate::index::ConnectionIndex;
use crate::kind::builtin_kind;
use crate::settings::Settings;
use crate::variables::unit_variables;
use crate::Parser;

#[derive(Clone)]
struct Placed<'a> {
    pos: GridPos,
    def: BlockDef<'a>,
    layout: Arc<Layout>,
}

impl Placed<'_> {
    /// Whether reading this block's outputs evaluates it on demand.
    ///
    /// Every custom block counts, whatever its body does: one whose output
    /// feeds one of its own inputs is an expression cycle even when no path
    /// inside the body joins the two.
    fn computes_values(&self) -> bool {
        matches!(self.def, BlockDef::Custom { .. }) || !self.layout.is_statement()
    }
}

enum Slot {
    Pending,
    Building,
    Built(SyntaxNode),
}

pub(crate) struct UnitParser<'p, 'a, 'u> {
    parser: &'p mut Parser<'a>,
    id: UnitId,
    unit: &'u ProgramUnit,
    depth: u32,
    settings: Settings<'u>,
    wires: ConnectionIndex<'u>,
    variables: Vec<Variable>,
    blocks: Vec<Placed<'a>>,
    ids: FxHashMap<GridPos, NodeId>,
    slots: Vec<Slot>,
}

impl<'p, 'a, 'u> UnitParser<'p, 'a, 'u> {
    #[expect(clippy::cast_possible_truncation, reason = "block counts fit u32")]
    pub(crate) fn new(
        parser: &'p mut Parser<'a>,
        id: UnitId,
        unit: &'u ProgramUnit,
        depth: u32,
    ) -> Result<Self, ParseError> {
        let wires = ConnectionIndex::new(&unit.connections, depth > 0);
        for conn in wires.dropped() {
            let (pos, terminal) = if conn.from_outside {
                (conn.to.block, conn.to.terminal)
            } else {
                (conn.from.block, conn.from.terminal)
            };
            tracing::warn!(unit = %unit.name, %pos, %terminal, "ignoring outside connection in root unit");
            parser.warnings.push(ParseWarning::OutsideConnectionInRoot {
                unit: unit.name.clone(),
                pos,
                terminal,
            });
        }

        let catalog = parser.catalog;
        let mut blocks = Vec::new();
        let mut ids = FxHashMap::default();
        for (pos, block_id) in unit.grid.blocks() {
            let unknown =
                || ParseError::new(ParseErrorKind::UnknownBlock { id: block_id }, &unit.name, pos);
            let def = catalog.lookup(block_id).ok_or_else(unknown)?;
            let layout = parser.layout(block_id).ok_or_else(unknown)?;
            ids.insert(pos, NodeId(blocks.len() as u32));
            blocks.push(Placed { pos, def, layout });
        }

        let slots = blocks.iter().map(|_| Slot::Pending).collect();
        Ok(UnitParser {
            parser,
            id,
            unit,
            depth,
            settings: Settings::new(&unit.settings),
            wires,
            variables: unit_variables(unit),
            blocks,
            ids,
            slots,
        })
    }

    #[expect(clippy::cast_possible_truncation, reason = "block counts fit u32")]
    pub(crate) fn parse(mut self) -> Result<SyntaxTree, ParseError> {
        self.check_wires()?;
        for index in 0..self.blocks.len() {
            self.build(NodeId(index as u32))?;
        }

        let nodes: Vec<SyntaxNode> = std::mem::take(&mut self.slots)
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Built(node) => Some(node),
                Slot::Pending | Slot::Building => None,
            })
            .collect();
        debug_assert_eq!(nodes.len(), self.blocks.len());

        let mut entry_points = Vec::new();
        for (index, node) in nodes.iter().enumerate() {
            for &terminal in &node.entries {
                if !self.wires.has_incoming(node.pos, terminal) {
                    entry_points.push(EntryPoint {
                        pos: node.pos,
                        node: NodeId(index as u32),
                        terminal,
                    });
                }
            }
        }

        let mut inbound = Vec::new();
        let mut outbound = Vec::new();
        for terminal in &self.unit.terminals {
            match (terminal.direction, terminal.kind) {
                (Direction::In, SignalKind::Void) => {
                    let targets = self
                        .wires
                        .from_host(terminal.pos)
                        .into_iter()
                        .map(|conn| self.flow_target(conn))
                        .collect::<Result<SmallVec<_>, _>>()?;
                    if !targets.is_empty() {
                        inbound.push((terminal.pos, targets));
                    }
                }
                (Direction::Out, kind) if !kind.is_void() => {
                    let wires = self.wires.to_host(terminal.pos);
                    if let Some(extra) = wires.get(1) {
                        return Err(self
                            .error(ParseErrorKind::InputAlreadyConnected, extra.from.block)
                            .at_terminal(extra.from.terminal));
                    }
                    if let Some(conn) = wires.first() {
                        outbound.push((terminal.pos, self.source_terminal(conn)?));
                    }
                }
                _ => {}
            }
        }

        let mut tree = SyntaxTree::new(self.id, self.unit.name.clone(), nodes);
        tree.entry_points = entry_points;
        tree.variables = std::mem::take(&mut self.variables);
        tree.inbound = inbound;
        tree.outbound = outbound;
        tracing::trace!(
            unit = %tree.name,
            nodes = tree.len(),
            entry_points = tree.entry_points.len(),
            variables = tree.variables.len(),
            "parsed unit"
        );
        Ok(tree)
    }

    fn error(&self, kind: ParseErrorKind, pos: GridPos) -> ParseError {
        ParseError::new(kind, &self.unit.name, pos)
    }

    fn placed(&self, pos: GridPos) -> Result<&Placed<'a>, ParseError> {
        self.ids
            .get(&pos)
            .map(|id| &self.blocks[id.index()])
            .ok_or_else(|| self.error(ParseErrorKind::EmptyCell, pos))
    }

    /// Kind of the host terminal at `pos` facing `direction`.
    fn host_terminal(
        &self,
        direction: Direction,
        pos: TerminalPos,
        near: GridPos,
    ) -> Result<SignalKind, ParseError> {
        self.unit
            .terminals
            .iter()
            .find(|terminal| terminal.direction == direction && terminal.pos == pos)
            .map(|terminal| terminal.kind)
            .ok_or_else(|| {
                self.error(ParseErrorKind::NoSuchTerminal { terminal: pos }, near)
                    .at_terminal(pos)
            })
    }

    /// Both ends of every wire must exist and agree on their kind.
    fn check_wires(&self) -> Result<(), ParseError> {
        for conn in self.wires.live() {
            let (from, to) = (conn.from, conn.to);
            let from_kind = if conn.from_outside {
                self.host_terminal(Direction::In, from.terminal, to.block)?
            } else {
                let placed = self.placed(from.block)?;
                placed
                    .layout
                    .outputs
                    .iter()
                    .find(|def| def.pos == from.terminal)
                    .map(|def| def.kind)
                    .ok_or_else(|| {
                        self.error(
                            ParseErrorKind::NoSuchTerminal {
                                terminal: from.terminal,
                            },
                            from.block,
                        )
                        .at_terminal(from.terminal)
                    })?
            };
            let to_kind = if conn.to_outside {
                self.host_terminal(Direction::Out, to.terminal, from.block)?
            } else {
                let placed = self.placed(to.block)?;
                placed
                    .layout
                    .input_at(to.terminal)
                    .map(|def| def.kind)
                    .ok_or_else(|| {
                        self.error(
                            ParseErrorKind::NoSuchTerminal {
                                terminal: to.terminal,
                            },
                            to.block,
                        )
                        .at_terminal(to.terminal)
                    })?
            };
            if !from_kind.feeds(to_kind) {
                let (pos, terminal) = if conn.to_outside {
                    (from.block, from.terminal)
                } else {
                    (to.block, to.terminal)
                };
                return Err(self
                    .error(
                        ParseErrorKind::KindMismatch {
                            from: from_kind,
                            to: to_kind,
                        },
                        pos,
                    )
                    .at_terminal(terminal));
            }
        }
        Ok(())
    }

    fn flow_target(&self, conn: &Connection) -> Result<FlowTarget, ParseError> {
        if conn.to_outside {
            return Ok(FlowTarget::Outside(conn.to.terminal));
        }
        let node = *self
            .ids
            .get(&conn.to.block)
            .ok_or_else(|| self.error(ParseErrorKind::EmptyCell, conn.to.block))?;
        Ok(FlowTarget::Block {
            node,
            terminal: conn.to.terminal,
        })
    }

    fn source_terminal(&self, conn: &Connection) -> Result<Terminal, ParseError> {
        if conn.from_outside {
            return Ok(Terminal::Outside(conn.from.terminal));
        }
        let node = *self
            .ids
            .get(&conn.from.block)
            .ok_or_else(|| self.error(ParseErrorKind::EmptyCell, conn.from.block))?;
        let (output, _) = self.blocks[node.index()]
            .layout
            .value_output_at(conn.from.terminal)
            .ok_or_else(|| {
                self.error(
                    ParseErrorKind::NoSuchTerminal {
                        terminal: conn.from.terminal,
                    },
                    conn.from.block,
                )
                .at_terminal(conn.from.terminal)
            })?;
        Ok(Terminal::Node { node, output })
    }

    /// Build node `id` and, first, every value-producing node it reads.
    fn build(&mut self, id: NodeId) -> Result<(), ParseError> {
        let placed = self.blocks[id.index()].clone();
        match self.slots[id.index()] {
            Slot::Built(_) => return Ok(()),
            Slot::Building => {
                return Err(self.error(ParseErrorKind::ExpressionCycle, placed.pos));
            }
            Slot::Pending => {}
        }
        self.slots[id.index()] = Slot::Building;
        let pos = placed.pos;

        let mut node = SyntaxNode {
            pos,
            kind: NodeKind::Expr(ExprKind::Constant(SmallVec::new())),
            entries: SmallVec::new(),
            inputs: SmallVec::new(),
            outputs: SmallVec::new(),
            exits: SmallVec::new(),
        };

        for def in &placed.layout.inputs {
            if def.kind.is_void() {
                node.entries.push(def.pos);
                continue;
            }
            let wires = self.wires.incoming(pos, def.pos);
            if wires.len() > 1 {
                return Err(self
                    .error(ParseErrorKind::InputAlreadyConnected, pos)
                    .at_terminal(def.pos));
            }
            let source = match wires.first() {
                Some(conn) => Some(self.source_terminal(conn)?),
                None => None,
            };
            if let Some(Terminal::Node { node: from, .. }) = source {
                if self.blocks[from.index()].computes_values() {
                    ensure_sufficient_stack(|| self.build(from))?;
                }
            }
            node.inputs.push(Input {
                kind: def.kind,
                pos: def.pos,
                source,
            });
        }

        for def in &placed.layout.outputs {
            if def.kind.is_void() {
                let targets = self
                    .wires
                    .outgoing(pos, def.pos)
                    .into_iter()
                    .map(|conn| self.flow_target(conn))
                    .collect::<Result<_, _>>()?;
                node.exits.push(Exit {
                    terminal: def.pos,
                    targets,
                });
            } else {
                node.outputs.push(Output {
                    kind: def.kind,
                    pos: def.pos,
                });
            }
        }

        node.kind = match placed.def {
            BlockDef::Builtin(builtin) => {
                builtin_kind(builtin, pos, &self.settings, &self.variables)
            }
            BlockDef::Custom { id: unit_id, unit, layout } => {
                let host = (self.unit.name.as_str(), pos);
                let depth = self.depth + 1;
                let body = ensure_sufficient_stack(|| {
                    self.parser.parse_custom(unit_id, unit, depth, host)
                })?;
                let block = CustomBlock { unit: unit_id, body };
                if layout.is_statement() {
                    NodeKind::Stmt(StmtKind::Custom(block))
                } else {
                    NodeKind::Expr(ExprKind::Custom(block))
                }
            }
        };

        self.slots[id.index()] = Slot::Built(node);
        Ok(())
    }
}
