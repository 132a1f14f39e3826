//! C Code Generation Backend for Fanc
//!
//! Lowers an instantiated program to a C99 translation unit plus a small,
//! fixed runtime support library, and drives an external C compiler to turn
//! it into a runnable program.
//!
//! # Architecture
//!
//! ```text
//! Program (environments + variable table)
//!        ↓
//!     lower           (statements inlined or shared, expressions on demand)
//!        ↓
//!     Artifact        (program.c + fanc_runtime.h + runner.c, line map)
//!        ↓
//!    Toolchain        (CcToolchain: cc -std=c99, child process)
//!        ↓
//!  CompiledProgram    (run_frame, run_late, globals)
//! ```
//!
//! Generated programs behave like the interpreter: same execution order,
//! same reads of disconnected inputs and out-of-range list elements, same
//! block math. The host is reached through the `fc_host` callback table,
//! the C counterpart of the interpreter's runtime context.

mod artifact;
mod context;
mod error;
mod lower;
mod toolchain;

pub use artifact::{
    Artifact, RUNNER_FILE, RUNNER_SOURCE, RUNTIME_FILE, RUNTIME_HEADER, SOURCE_FILE,
};
pub use context::CodegenContext;
pub use error::CodegenError;
pub use lower::{lower, CodegenOptions};
pub use toolchain::{
    kind_width, parse_compiler_messages, value_from_floats, CcToolchain, CompiledProgram,
    CompilerMessage, FrameError, FrameOutput, HostCall, Toolchain, ToolchainError,
};
