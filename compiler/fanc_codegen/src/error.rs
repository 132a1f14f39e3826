//! Lowering errors.

use fanc_diagnostic::{Diagnostic, ErrorCode, Location};
use fanc_ir::GridPos;
use thiserror::Error;

/// A lowering failure. Lowering a parsed program only fails when the
/// program violates an invariant the parser guarantees.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("flow continues into `{block}`, which is not a statement")]
    NotAStatement {
        unit: String,
        pos: GridPos,
        block: String,
    },
}

impl CodegenError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CodegenError::NotAStatement { unit, pos, .. } => Diagnostic::error(ErrorCode::E9002)
                .with_message(self.to_string())
                .with_label(Location::block(unit.as_str(), *pos), "flow enters here")
                .with_note("the syntax tree was not produced by the parser"),
        }
    }
}
