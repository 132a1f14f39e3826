//! Fanc IR - shared data model of the Fanc block-language compiler
//!
//! Programs are blocks placed on a 3D grid and wired terminal to terminal.
//! This crate holds everything the pipeline stages agree on:
//!
//! - grid positions and terminal addressing
//! - signal kinds and runtime values, and the numeric semantics of blocks
//! - program units as handed over by the authoring layer, and the block
//!   catalog that gives block ids their meaning
//! - the syntax tree produced by parsing, instantiated environments and
//!   the variable table
//! - the rewriting framework used by optimization passes
//!
//! # Design
//!
//! - **Flat arenas**: nodes reference each other by `NodeId`, environments
//!   by `EnvId`. Nothing points back up through a reference.
//! - **Immutable trees**: a parsed tree is never mutated; rewrites build a
//!   new tree and share it when nothing changed.
//! - **Closed node set**: statement and expression kinds are enums, so every
//!   stage matches them exhaustively.

pub mod catalog;
pub mod env;
mod grid;
pub mod math;
pub mod node;
pub mod rewrite;
mod signal;
mod stack;
mod tree;
mod unit;
mod value;
mod variable;

pub use catalog::{BlockDef, Builtin, Catalog, CatalogError, Layout, TerminalDef, FIRST_CUSTOM_ID};
pub use env::{EnvId, Environment, FlowPoint, Program, ValueSource};
pub use grid::{
    Footprint, GridPos, GridSize, TerminalAddress, TerminalPos, MAX_FOOTPRINT, VOXELS_PER_CELL,
};
pub use node::{
    BinaryOp, CustomBlock, Exit, ExprKind, FlowTarget, Input, LocalVar, NodeId, NodeKind, Output,
    StmtKind, SyntaxNode, Terminal, TouchState, UnaryOp,
};
pub use rewrite::{rewrite, RewriteCx, RewritePass, Rewriter};
pub use signal::{SignalKind, ValueKind};
pub use stack::ensure_sufficient_stack;
pub use tree::{EntryPoint, SyntaxTree};
pub use unit::{
    BlockGrid, BlockId, Connection, Direction, ProgramUnit, Setting, SettingValue, UnitId,
    UnitTerminal,
};
pub use value::{ConstraintRef, ObjectRef, Outputs, Value};
pub use variable::{
    Scope, Variable, VariableId, VariableInfo, VariableTable, GLOBAL_SIGIL, MAX_LIST_LEN,
    PERSISTED_SIGIL,
};
