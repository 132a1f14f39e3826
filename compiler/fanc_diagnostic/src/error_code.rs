//! Error codes for all compiler diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E1001`) with the first digit
//! indicating the compiler phase.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Parser errors (E11xx are warnings)
/// - E2xxx: Lowering and toolchain errors
/// - E3xxx: Runtime errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Parser Errors (E1xxx)
    /// Non-empty cell holds a block id the catalog does not know
    E1001,
    /// Custom block nesting exceeds the configured maximum
    E1002,
    /// Second wire into an input that accepts one
    E1003,
    /// Wire connects terminals of incompatible kinds
    E1004,
    /// Expressions depend on each other in a cycle
    E1005,

    // Parser Warnings (E11xx)
    /// Wire to the enclosing block in a unit that has none
    E1101,

    // Lowering / Toolchain Errors (E2xxx)
    /// External compiler rejected the generated program
    E2001,
    /// External compiler could not be run
    E2002,
    /// Compiled runner could not be loaded or driven
    E2003,

    // Runtime Errors (E3xxx)
    /// Frame exceeded its time budget
    E3001,
    /// Compiled runner stopped unexpectedly
    E3002,

    // Internal Errors (E9xxx)
    /// Wire references a terminal that does not exist
    E9001,
    /// Other internal failure
    E9002,
}

impl ErrorCode {
    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1101 => "E1101",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// Short description, used by `--explain`-style listings.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "unknown block",
            ErrorCode::E1002 => "custom blocks nested too deeply",
            ErrorCode::E1003 => "input already connected",
            ErrorCode::E1004 => "mismatched terminal kinds",
            ErrorCode::E1005 => "expression cycle",
            ErrorCode::E1101 => "outside connection in root unit",
            ErrorCode::E2001 => "generated program failed to compile",
            ErrorCode::E2002 => "compiler toolchain unavailable",
            ErrorCode::E2003 => "compiled runner unusable",
            ErrorCode::E3001 => "frame timed out",
            ErrorCode::E3002 => "runner terminated",
            ErrorCode::E9001 => "invalid terminal address",
            ErrorCode::E9002 => "internal error",
        }
    }

    /// Check if this is a parser error (E1xxx range, excluding warnings).
    pub fn is_parser_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
        )
    }

    /// Check if this is a lowering or toolchain error (E2xxx range).
    pub fn is_toolchain_error(&self) -> bool {
        matches!(self, ErrorCode::E2001 | ErrorCode::E2002 | ErrorCode::E2003)
    }

    /// Check if this is a runtime error (E3xxx range).
    pub fn is_runtime_error(&self) -> bool {
        matches!(self, ErrorCode::E3001 | ErrorCode::E3002)
    }

    /// Check if this is an internal error (E9xxx range).
    pub fn is_internal(&self) -> bool {
        matches!(self, ErrorCode::E9001 | ErrorCode::E9002)
    }

    /// Check if this code is reported as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::E1101)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
