//! Fanc Eval - frame-by-frame interpreter for Fanc programs.
//!
//! Runs a parsed [`Program`](fanc_ir::Program) one frame at a time against a
//! host supplied through [`RuntimeContext`]. Every side effect, sensor read
//! and variable access goes through the context; the interpreter itself
//! only keeps the per-block state slots that statement outputs live in.
//!
//! # Architecture
//!
//! - [`Interpreter`]: owns the program and block state across frames
//! - `exec::flow`: the work stack that executes statements in order
//! - `exec::expr`: on-demand evaluation of expression reads
//! - [`VariableStore`]: list storage behind pointers, usable as a headless
//!   context on its own

mod context;
mod exec;
mod interpreter;
mod store;

pub use context::{Collision, Pointer, RaycastHit, RuntimeContext};
pub use interpreter::{Deferred, Interpreter};
pub use store::VariableStore;
