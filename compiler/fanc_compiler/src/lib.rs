//! Portable Fanc compiler driver.
//!
//! Runs the whole pipeline on an in-memory grid: parse, fold, lower to C.
//! No filesystem access and no external processes; consumers that want a
//! native program hand the [`Artifact`](fanc_codegen::Artifact) to a
//! [`Toolchain`](fanc_codegen::Toolchain), and consumers that want to run
//! the program directly use a [`Session`].
//!
//! # Usage
//!
//! ```ignore
//! use fanc_compiler::{compile, CompileConfig, Session};
//!
//! let output = compile(&unit, &catalog, &CompileConfig::default());
//! assert!(output.success);
//! let mut session = Session::headless(output.program.unwrap());
//! session.run(10);
//! ```
//!
//! # Architecture
//!
//! ```text
//! fanc_ir, fanc_parse, fanc_fold, fanc_eval, fanc_codegen
//!                          ↓
//!                   fanc_compiler  ← this crate
//! ```

mod output;
mod pipeline;
mod session;

use std::sync::Once;

use fanc_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use fanc_diagnostic::Diagnostic;

pub use output::{CompileOutput, ErrorPhase};
pub use pipeline::{compile, CompileConfig};
pub use session::Session;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once.
///
/// ```bash
/// RUST_LOG=fanc_codegen=debug ...
/// RUST_LOG=fanc_eval=trace,fanc_parse=debug ...
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Render diagnostics as plain text, one block per diagnostic.
pub fn render_diagnostics(diagnostics: &[Diagnostic], color: ColorMode) -> String {
    let mut buf = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut buf, color, false);
        emitter.emit_all(diagnostics);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
