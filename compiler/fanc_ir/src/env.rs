//! Instantiated environments.
//!
//! A syntax tree describes a unit once; an [`Environment`] is one *use* of
//! it: the root program, or one placed custom block. Each environment gets
//! its own local variables and block state. Environments live in a flat
//! table owned by [`Program`] and refer to their outer environment by index.
//!
//! Connections that cross an environment boundary are resolved here, so the
//! interpreter and the lowering agree on where a flow or a value comes from.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::grid::{GridPos, TerminalPos};
use crate::node::{FlowTarget, NodeId, Terminal};
use crate::stack::ensure_sufficient_stack;
use crate::variable::{Variable, VariableId, VariableTable};
use crate::{SignalKind, SyntaxTree};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvId(pub u32);

impl EnvId {
    pub const ROOT: EnvId = EnvId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EnvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "env{}", self.0)
    }
}

/// One instantiation of a program unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    pub id: EnvId,
    pub tree: Arc<SyntaxTree>,
    pub outer: Option<EnvId>,
    /// The custom block node in `outer` hosting this environment.
    pub host: Option<NodeId>,
    pub host_pos: Option<GridPos>,
    /// Nesting depth; the root is 0.
    pub depth: u32,
    /// Child environment of each custom block node.
    pub children: FxHashMap<NodeId, EnvId>,
    /// Storage id of each entry of the tree's variable list.
    pub variables: Vec<VariableId>,
}

/// A statement entered through one of its void inputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowPoint {
    pub env: EnvId,
    pub node: NodeId,
    pub terminal: TerminalPos,
}

/// A concrete value-producing output after boundary resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValueSource {
    pub env: EnvId,
    pub node: NodeId,
    pub output: u8,
}

/// The environment tree of one parsed program plus its variable table.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    envs: Vec<Environment>,
    variables: VariableTable,
}

impl Program {
    /// Instantiate `root` and, recursively, every custom block below it.
    ///
    /// `extra_globals` are registered even when no environment names them.
    pub fn instantiate(root: Arc<SyntaxTree>, extra_globals: &[Variable]) -> Program {
        let mut program = Program {
            envs: Vec::new(),
            variables: VariableTable::new(),
        };
        program.add_env(root, None, None, 0);
        for variable in extra_globals {
            program.variables.intern_global(variable);
        }
        tracing::debug!(
            environments = program.envs.len(),
            variables = program.variables.len(),
            "instantiated program"
        );
        program
    }

    #[expect(clippy::cast_possible_truncation, reason = "environment counts fit u32")]
    fn add_env(
        &mut self,
        tree: Arc<SyntaxTree>,
        outer: Option<EnvId>,
        host: Option<NodeId>,
        depth: u32,
    ) -> EnvId {
        let id = EnvId(self.envs.len() as u32);
        let host_pos = match (outer, host) {
            (Some(outer), Some(host)) => Some(self.envs[outer.index()].tree.node(host).pos),
            _ => None,
        };
        let variables = tree
            .variables
            .iter()
            .map(|variable| self.variables.intern(id, variable))
            .collect();
        self.envs.push(Environment {
            id,
            tree: Arc::clone(&tree),
            outer,
            host,
            host_pos,
            depth,
            children: FxHashMap::default(),
            variables,
        });

        for (node_id, node) in tree.nodes() {
            if let Some(block) = node.custom() {
                let body = Arc::clone(&block.body);
                let child =
                    ensure_sufficient_stack(|| self.add_env(body, Some(id), Some(node_id), depth + 1));
                self.envs[id.index()].children.insert(node_id, child);
            }
        }
        id
    }

    #[inline]
    pub fn root(&self) -> &Environment {
        &self.envs[0]
    }

    #[inline]
    pub fn env(&self, id: EnvId) -> &Environment {
        &self.envs[id.index()]
    }

    pub fn envs(&self) -> &[Environment] {
        &self.envs
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// Deepest nesting level of any environment.
    pub fn depth(&self) -> u32 {
        self.envs.iter().map(|env| env.depth).max().unwrap_or(0)
    }

    /// Flow points a void connection leads to, seen from `env`.
    ///
    /// A target on the host's void output continues with whatever the host
    /// block's matching exit is wired to in the outer environment. In the
    /// root such targets go nowhere.
    pub fn resolve_flow(&self, env: EnvId, target: &FlowTarget, out: &mut Vec<FlowPoint>) {
        match *target {
            FlowTarget::Block { node, terminal } => out.push(FlowPoint {
                env,
                node,
                terminal,
            }),
            FlowTarget::Outside(terminal) => {
                let inner = self.env(env);
                let (Some(outer), Some(host)) = (inner.outer, inner.host) else {
                    return;
                };
                let Some(exit) = self.env(outer).tree.node(host).exit_at(terminal) else {
                    return;
                };
                for next in &exit.targets {
                    ensure_sufficient_stack(|| self.resolve_flow(outer, next, out));
                }
            }
        }
    }

    /// All flow points reached through one exit of `node` in `env`.
    pub fn exit_points(&self, env: EnvId, node: NodeId, exit: usize) -> Vec<FlowPoint> {
        let mut points = Vec::new();
        if let Some(exit) = self.env(env).tree.node(node).exits.get(exit) {
            for target in &exit.targets {
                self.resolve_flow(env, target, &mut points);
            }
        }
        points
    }

    /// Flow points started inside a custom block when it is entered at
    /// `point`. `None` when `point` is not a custom block.
    pub fn enter_custom(&self, point: FlowPoint) -> Option<Vec<FlowPoint>> {
        let child = *self.env(point.env).children.get(&point.node)?;
        let mut points = Vec::new();
        for target in self.env(child).tree.inbound(point.terminal) {
            self.resolve_flow(child, target, &mut points);
        }
        Some(points)
    }

    /// Follow a value connection across custom-block boundaries to the
    /// output that actually computes it.
    ///
    /// `None` means the chain ends at a disconnected terminal; the reading
    /// input's default applies.
    pub fn resolve_value(&self, env: EnvId, terminal: &Terminal) -> Option<ValueSource> {
        let mut env = env;
        let mut terminal = *terminal;
        loop {
            match terminal {
                Terminal::Node { node, output } => {
                    let current = self.env(env);
                    let syntax = current.tree.node(node);
                    if syntax.custom().is_none() {
                        return Some(ValueSource { env, node, output });
                    }
                    let child = *current.children.get(&node)?;
                    let pos = syntax.outputs.get(usize::from(output))?.pos;
                    terminal = self.env(child).tree.outbound(pos)?;
                    env = child;
                }
                Terminal::Outside(pos) => {
                    let current = self.env(env);
                    let (outer, host) = (current.outer?, current.host?);
                    terminal = self.env(outer).tree.node(host).input_at(pos)?.source?;
                    env = outer;
                }
            }
        }
    }

    /// Signal kind produced at `source`.
    pub fn source_kind(&self, source: ValueSource) -> SignalKind {
        self.env(source.env)
            .tree
            .node(source.node)
            .outputs
            .get(usize::from(source.output))
            .map_or(SignalKind::Void, |output| output.kind)
    }

    /// Incoming void connections per flow point, after boundary resolution.
    ///
    /// Counts every wire out of every exit in every environment, plus the
    /// inbound flows of every custom block entry. A custom block's own exits
    /// are only reached through its body, so they count once per body wire
    /// leading to them rather than once for themselves.
    pub fn incoming_flows(&self) -> FxHashMap<FlowPoint, u32> {
        let mut counts: FxHashMap<FlowPoint, u32> = FxHashMap::default();
        let mut points = Vec::new();
        let mut count = |env: EnvId, target: &FlowTarget| {
            points.clear();
            self.resolve_flow(env, target, &mut points);
            for point in &points {
                *counts.entry(*point).or_default() += 1;
            }
        };
        for env in &self.envs {
            for (node_id, node) in env.tree.nodes() {
                if let Some(child) = env.children.get(&node_id) {
                    for entry in &node.entries {
                        for target in self.env(*child).tree.inbound(*entry) {
                            count(*child, target);
                        }
                    }
                    continue;
                }
                for exit in &node.exits {
                    for target in &exit.targets {
                        count(env.id, target);
                    }
                }
            }
        }
        counts
    }

    /// Environment `id` and its outer chain, innermost first.
    pub fn ancestry(&self, id: EnvId) -> SmallVec<[EnvId; 4]> {
        let mut chain = SmallVec::new();
        let mut current = Some(id);
        while let Some(env) = current {
            chain.push(env);
            current = self.env(env).outer;
        }
        chain
    }
}
