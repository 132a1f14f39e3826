//! Result types for the compiler pipeline.
//!
//! These carry everything a consumer needs to present or run a compiled
//! program without reaching into the individual stage crates.

use std::sync::Arc;

use fanc_codegen::Artifact;
use fanc_diagnostic::Diagnostic;
use fanc_ir::{Program, SyntaxTree};

/// Which stage produced the error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPhase {
    /// Graph errors: unknown blocks, nesting, wiring.
    Parse,
    /// Internal errors while lowering to C.
    Lower,
}

/// Result of compiling a program unit.
#[derive(Clone, Debug)]
pub struct CompileOutput {
    /// Whether every requested stage completed.
    pub success: bool,
    /// Root syntax tree, folded when folding was enabled.
    pub tree: Option<Arc<SyntaxTree>>,
    /// The instantiated program the tree describes.
    pub program: Option<Program>,
    /// Lowered C program, when lowering was requested and succeeded.
    pub artifact: Option<Artifact>,
    /// Expressions replaced by constants.
    pub folded: usize,
    /// Warnings from every stage, then the error if there was one.
    pub diagnostics: Vec<Diagnostic>,
    pub error_phase: Option<ErrorPhase>,
}

impl CompileOutput {
    pub(crate) fn failed(phase: ErrorPhase, diagnostics: Vec<Diagnostic>) -> Self {
        CompileOutput {
            success: false,
            tree: None,
            program: None,
            artifact: None,
            folded: 0,
            diagnostics,
            error_phase: Some(phase),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}
