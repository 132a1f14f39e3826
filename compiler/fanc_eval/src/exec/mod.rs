//! Execution of one frame.
//!
//! A [`Machine`] borrows the program, the block state and the host for the
//! duration of one run. Statements are executed by [`flow`], expression
//! reads are answered by [`expr`].

mod expr;
mod flow;

use fanc_ir::{EnvId, FlowPoint, NodeId, Outputs, Program};
use rustc_hash::FxHashMap;

use crate::RuntimeContext;

/// Outputs of statements, keyed by environment and node. Survives frames.
pub(crate) type BlockState = FxHashMap<(EnvId, NodeId), Outputs>;

pub(crate) struct Machine<'a, C: RuntimeContext + ?Sized> {
    program: &'a Program,
    state: &'a mut BlockState,
    ctx: &'a mut C,
    frame: u64,
    /// Whether late-update flows are queued rather than run inline.
    defer_late: bool,
    pub(crate) late: Vec<FlowPoint>,
    pub(crate) executed: usize,
}

impl<'a, C: RuntimeContext + ?Sized> Machine<'a, C> {
    pub(crate) fn new(
        program: &'a Program,
        state: &'a mut BlockState,
        ctx: &'a mut C,
        frame: u64,
        defer_late: bool,
    ) -> Self {
        Machine {
            program,
            state,
            ctx,
            frame,
            defer_late,
            late: Vec::new(),
            executed: 0,
        }
    }
}
