//! Diagnostic system for error reporting.
//!
//! Every stage converts its typed errors into [`Diagnostic`]s:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary location (which block, which terminal, which generated line)
//! - Notes and suggestions (why, and how to fix)

mod diagnostic;
pub mod emitter;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Location, Severity};
pub use error_code::ErrorCode;
