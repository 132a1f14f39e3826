//! Syntax tree nodes.
//!
//! A node is one placed block after wiring has been resolved. Nodes live in
//! a flat arena inside their [`SyntaxTree`](crate::SyntaxTree) and reference
//! each other by [`NodeId`]. Two families exist:
//!
//! - statements ([`StmtKind`]) are entered through a void terminal and
//!   continue through one or more exits;
//! - expressions ([`ExprKind`]) produce values or pointers on demand.
//!
//! Both families share the same shape: resolved value inputs, typed outputs
//! and (statements only) exits with their flow targets.

mod ops;
pub mod pure;

use std::sync::Arc;

use smallvec::SmallVec;

use crate::grid::{GridPos, TerminalPos};
use crate::unit::UnitId;
use crate::{Outputs, SignalKind, SyntaxTree};

pub use ops::{BinaryOp, UnaryOp};

/// Index of a node in its tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Where a connected input reads its value from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// Output `output` (index into the node's value outputs) of `node`.
    Node { node: NodeId, output: u8 },
    /// The hosting custom block's input terminal at this position.
    Outside(TerminalPos),
}

/// Where a void connection continues execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlowTarget {
    /// Enter `node` through its void input at `terminal`.
    Block { node: NodeId, terminal: TerminalPos },
    /// Leave through the hosting custom block's void output at this position.
    Outside(TerminalPos),
}

/// A value or pointer input of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Input {
    pub kind: SignalKind,
    pub pos: TerminalPos,
    /// `None` when nothing is wired in; the block's default applies.
    pub source: Option<Terminal>,
}

/// A value or pointer output of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub kind: SignalKind,
    pub pos: TerminalPos,
}

/// A void output of a statement and everything wired to it, in connection
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exit {
    pub terminal: TerminalPos,
    pub targets: SmallVec<[FlowTarget; 2]>,
}

/// Which touch phase a touch sensor reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TouchState {
    Touching,
    Begins,
    Ends,
}

impl TouchState {
    pub fn from_setting(value: u8) -> Self {
        match value {
            1 => TouchState::Begins,
            2 => TouchState::Ends,
            _ => TouchState::Touching,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            TouchState::Touching => 0,
            TouchState::Begins => 1,
            TouchState::Ends => 2,
        }
    }
}

/// Index of a variable in its tree's [`variables`](crate::SyntaxTree::variables)
/// list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalVar(pub u16);

/// A placed custom block: an instance of another program unit.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomBlock {
    pub unit: UnitId,
    pub body: Arc<SyntaxTree>,
}

/// Statements. Inputs, outputs and exits follow the block's layout order;
/// exit 0 of every built-in statement is `After`.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Win { delay: u8 },
    Lose { delay: u8 },
    SetScore { ranking: u8 },
    SetCamera { perspective: bool },
    SetLight,
    SetGravity,
    SetPosition,
    SetVisible,
    CreateObject,
    DestroyObject,
    PlaySound { looping: bool, sound: u8 },
    StopSound,
    AddForce,
    SetVelocity,
    If,
    Loop,
    PlaySensor,
    LateUpdate,
    TouchSensor { state: TouchState, finger: u8 },
    SwipeSensor,
    Button { kind: u8 },
    Collision,
    RandomSeed,
    SetVariable { var: LocalVar },
    SetPointer,
    IncrementNumber,
    DecrementNumber,
    Inspect,
    Custom(CustomBlock),
}

impl StmtKind {
    /// Exit index of the `True`/`Do`/sensor branch on built-in statements.
    pub const BRANCH_EXIT: usize = 1;
    /// Exit index of the `False` branch of `If`.
    pub const ELSE_EXIT: usize = 2;
    /// Exit index of `After`.
    pub const AFTER_EXIT: usize = 0;
}

/// Expressions.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Literal outputs: number/vector/rotation/bool/object blocks and
    /// folded subexpressions.
    Constant(Outputs),
    Unary(UnaryOp),
    Binary(BinaryOp),
    MakeVector,
    BreakVector,
    MakeRotation,
    BreakRotation,
    Lerp,
    AxisAngle,
    LookRotation,
    LineVsPlane,
    Random,
    ScreenSize,
    GetPosition,
    GetVelocity,
    Raycast,
    /// Pointer to element 0 of a variable.
    Variable { var: LocalVar },
    /// Pointer offset by a floored index.
    ListElement,
    Custom(CustomBlock),
}

impl ExprKind {
    /// Whether the result depends only on the input values.
    pub fn is_pure(&self) -> bool {
        !matches!(
            self,
            ExprKind::Random
                | ExprKind::ScreenSize
                | ExprKind::GetPosition
                | ExprKind::GetVelocity
                | ExprKind::Raycast
                | ExprKind::Variable { .. }
                | ExprKind::ListElement
                | ExprKind::Custom(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Stmt(StmtKind),
    Expr(ExprKind),
}

/// One block of a syntax tree.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxNode {
    pub pos: GridPos,
    pub kind: NodeKind,
    /// Void inputs the node can be entered through.
    pub entries: SmallVec<[TerminalPos; 1]>,
    pub inputs: SmallVec<[Input; 4]>,
    pub outputs: SmallVec<[Output; 3]>,
    pub exits: SmallVec<[Exit; 2]>,
}

impl SyntaxNode {
    #[inline]
    pub fn is_stmt(&self) -> bool {
        matches!(self.kind, NodeKind::Stmt(_))
    }

    pub fn custom(&self) -> Option<&CustomBlock> {
        match &self.kind {
            NodeKind::Stmt(StmtKind::Custom(block)) | NodeKind::Expr(ExprKind::Custom(block)) => {
                Some(block)
            }
            _ => None,
        }
    }

    pub fn custom_mut(&mut self) -> Option<&mut CustomBlock> {
        match &mut self.kind {
            NodeKind::Stmt(StmtKind::Custom(block)) | NodeKind::Expr(ExprKind::Custom(block)) => {
                Some(block)
            }
            _ => None,
        }
    }

    pub fn constant(&self) -> Option<&Outputs> {
        match &self.kind {
            NodeKind::Expr(ExprKind::Constant(outputs)) => Some(outputs),
            _ => None,
        }
    }

    /// Input wired to the terminal at `pos`.
    pub fn input_at(&self, pos: TerminalPos) -> Option<&Input> {
        self.inputs.iter().find(|input| input.pos == pos)
    }

    /// Index of the value output at `pos`.
    pub fn output_at(&self, pos: TerminalPos) -> Option<u8> {
        self.outputs
            .iter()
            .position(|output| output.pos == pos)
            .and_then(|index| u8::try_from(index).ok())
    }

    pub fn exit_at(&self, terminal: TerminalPos) -> Option<&Exit> {
        self.exits.iter().find(|exit| exit.terminal == terminal)
    }

    /// Nodes this node reads values from, in input order.
    pub fn input_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inputs.iter().filter_map(|input| match input.source {
            Some(Terminal::Node { node, .. }) => Some(node),
            _ => None,
        })
    }

    /// Human-readable block name for diagnostics and generated comments.
    pub fn describe(&self) -> String {
        match &self.kind {
            NodeKind::Stmt(StmtKind::Custom(block)) | NodeKind::Expr(ExprKind::Custom(block)) => {
                block.body.name.clone()
            }
            NodeKind::Stmt(kind) => format!("{kind:?}")
                .split([' ', '{', '('])
                .next()
                .unwrap_or_default()
                .to_owned(),
            NodeKind::Expr(ExprKind::Unary(op)) => op.name().to_owned(),
            NodeKind::Expr(ExprKind::Binary(op)) => op.name().to_owned(),
            NodeKind::Expr(kind) => format!("{kind:?}")
                .split([' ', '{', '('])
                .next()
                .unwrap_or_default()
                .to_owned(),
        }
    }
}
