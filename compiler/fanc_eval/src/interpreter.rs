//! The frame loop.

use fanc_ir::{EnvId, FlowPoint, NodeId, Program, Value};

use crate::exec::{BlockState, Machine};
use crate::RuntimeContext;

/// Late-update flows reached during a frame.
///
/// The host runs its physics step after [`Interpreter::run_frame`] returns
/// and then hands this back to [`Interpreter::run_deferred`].
#[must_use = "late-update flows only run when passed to `run_deferred`"]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deferred {
    frame: u64,
    points: Vec<FlowPoint>,
}

impl Deferred {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[FlowPoint] {
        &self.points
    }
}

/// Runs a program frame by frame.
///
/// Block state (loop counters, sensor readings, created objects, sound
/// channels) persists between frames; variables live in the context.
/// Frames must not overlap: each call runs to completion before returning.
#[derive(Clone, Debug)]
pub struct Interpreter {
    program: Program,
    state: BlockState,
    frame: u64,
}

impl Interpreter {
    pub fn new(program: Program) -> Self {
        Interpreter {
            program,
            state: BlockState::default(),
            frame: 0,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Number of frames run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Last outputs stored by the statement `node` in `env`.
    pub fn block_state(&self, env: EnvId, node: NodeId) -> Option<&[Value]> {
        self.state.get(&(env, node)).map(|outputs| outputs.as_slice())
    }

    /// Entry points of the root environment, in grid scan order.
    pub fn entry_points(&self) -> Vec<FlowPoint> {
        let root = self.program.root();
        root.tree
            .entry_points
            .iter()
            .map(|entry| FlowPoint {
                env: root.id,
                node: entry.node,
                terminal: entry.terminal,
            })
            .collect()
    }

    /// Run one frame: every root entry point, depth first.
    pub fn run_frame<C: RuntimeContext + ?Sized>(&mut self, ctx: &mut C) -> Deferred {
        let entries = self.entry_points();
        let frame = self.frame;
        let mut machine = Machine::new(&self.program, &mut self.state, ctx, frame, true);
        machine.run(entries);
        let (executed, late) = (machine.executed, machine.late);
        tracing::debug!(frame, executed, deferred = late.len(), "frame done");
        self.frame += 1;
        Deferred {
            frame,
            points: late,
        }
    }

    /// Run the late-update flows of a finished frame.
    ///
    /// Late updates reached from here run immediately.
    pub fn run_deferred<C: RuntimeContext + ?Sized>(&mut self, deferred: Deferred, ctx: &mut C) {
        if deferred.is_empty() {
            return;
        }
        let mut machine = Machine::new(&self.program, &mut self.state, ctx, deferred.frame, false);
        machine.run(deferred.points);
        tracing::debug!(frame = deferred.frame, executed = machine.executed, "late update done");
    }

    /// Forget block state and start over at frame 0.
    pub fn reset(&mut self) {
        self.state.clear();
        self.frame = 0;
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
