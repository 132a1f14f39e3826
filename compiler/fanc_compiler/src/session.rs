//! Frame-by-frame runs of an interpreted program.

use fanc_eval::{Interpreter, RuntimeContext, VariableStore};
use fanc_ir::{Program, Value, ValueKind, Variable};

/// An interpreter bound to the host it runs against.
///
/// Each [`step`](Self::step) runs one frame and then its late updates, for
/// hosts without a physics step of their own. Hosts that do step physics
/// call [`run_frame`](Self::run_frame) and
/// [`run_deferred`](Self::run_deferred) around it.
pub struct Session<C = VariableStore> {
    interpreter: Interpreter,
    context: C,
}

impl<C: RuntimeContext> Session<C> {
    pub fn new(program: Program, context: C) -> Self {
        Session {
            interpreter: Interpreter::new(program),
            context,
        }
    }

    /// Run one frame, leaving its late updates to the caller.
    pub fn run_frame(&mut self) -> fanc_eval::Deferred {
        self.interpreter.run_frame(&mut self.context)
    }

    pub fn run_deferred(&mut self, deferred: fanc_eval::Deferred) {
        self.interpreter.run_deferred(deferred, &mut self.context);
    }

    /// Run one frame including its late updates.
    pub fn step(&mut self) {
        let deferred = self.run_frame();
        self.run_deferred(deferred);
    }

    /// Run `frames` frames.
    pub fn run(&mut self, frames: u64) {
        for _ in 0..frames {
            self.step();
        }
        tracing::debug!(frames, total = self.interpreter.frame(), "session ran");
    }

    /// Frames run so far.
    pub fn frame(&self) -> u64 {
        self.interpreter.frame()
    }

    /// Start over at frame 0. Variables kept by the context stay.
    pub fn reset(&mut self) {
        self.interpreter.reset();
    }

    pub fn program(&self) -> &Program {
        self.interpreter.program()
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Global and persisted variables, in registration order.
    pub fn global_variables(&self) -> Vec<(String, ValueKind)> {
        self.program()
            .variables()
            .globals()
            .map(|(_, variable)| (variable.name.clone(), variable.kind))
            .collect()
    }

    /// Current elements of a global, read from `store`. Unknown globals
    /// read as empty.
    pub fn global_values(&self, store: &VariableStore, name: &str, kind: ValueKind) -> Vec<Value> {
        let variable = Variable::new(name, kind);
        if !variable.is_global() {
            return Vec::new();
        }
        self.program()
            .variables()
            .lookup(None, &variable)
            .map(|id| store.values(id).to_vec())
            .unwrap_or_default()
    }
}

impl Session<VariableStore> {
    /// A session with no world: only variables are kept.
    pub fn headless(program: Program) -> Self {
        Session::new(program, VariableStore::new())
    }

    /// Current elements of a global. Unknown globals read as empty.
    pub fn get_global_variable(&self, name: &str, kind: ValueKind) -> Vec<Value> {
        self.global_values(&self.context, name, kind)
    }
}
