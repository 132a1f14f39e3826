//! Parse errors and warnings.
//!
//! Every parse error is fatal: the graph either parses completely or not at
//! all. Warnings are collected and returned alongside a successful parse.

use fanc_diagnostic::{Diagnostic, ErrorCode, Location};
use fanc_ir::{BlockId, GridPos, SignalKind, TerminalPos};
use thiserror::Error;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unknown block id {id}")]
    UnknownBlock { id: BlockId },

    #[error("custom block `{name}` nests deeper than the maximum depth of {max}")]
    NestingTooDeep { name: String, max: u32 },

    #[error("input already has a connection")]
    InputAlreadyConnected,

    #[error("cannot wire a {from} output into a {to} input")]
    KindMismatch { from: SignalKind, to: SignalKind },

    #[error("expressions depend on each other in a cycle")]
    ExpressionCycle,

    #[error("block has no terminal at {terminal}")]
    NoSuchTerminal { terminal: TerminalPos },

    #[error("wire ends on an empty cell")]
    EmptyCell,
}

impl ParseErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseErrorKind::UnknownBlock { .. } => ErrorCode::E1001,
            ParseErrorKind::NestingTooDeep { .. } => ErrorCode::E1002,
            ParseErrorKind::InputAlreadyConnected => ErrorCode::E1003,
            ParseErrorKind::KindMismatch { .. } => ErrorCode::E1004,
            ParseErrorKind::ExpressionCycle => ErrorCode::E1005,
            ParseErrorKind::NoSuchTerminal { .. } | ParseErrorKind::EmptyCell => ErrorCode::E9001,
        }
    }
}

/// A fatal parse error and the block it was found at.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} at {unit} {pos}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Name of the unit containing the block.
    pub unit: String,
    pub pos: GridPos,
    pub terminal: Option<TerminalPos>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, unit: impl Into<String>, pos: GridPos) -> Self {
        ParseError {
            kind,
            unit: unit.into(),
            pos,
            terminal: None,
        }
    }

    #[must_use]
    pub fn at_terminal(mut self, terminal: TerminalPos) -> Self {
        self.terminal = Some(terminal);
        self
    }

    fn location(&self) -> Location {
        match self.terminal {
            Some(terminal) => Location::terminal(&self.unit, self.pos, terminal),
            None => Location::block(&self.unit, self.pos),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.kind.code())
            .with_message(self.kind.to_string())
            .with_label(self.location(), "found here");
        match &self.kind {
            ParseErrorKind::UnknownBlock { .. } => {
                diag.with_note("custom blocks must be registered in the catalog before parsing")
            }
            ParseErrorKind::NestingTooDeep { .. } => {
                diag.with_note("a custom block that contains itself can never be expanded")
            }
            ParseErrorKind::InputAlreadyConnected => {
                diag.with_suggestion("remove one of the wires into this input")
            }
            ParseErrorKind::NoSuchTerminal { .. } | ParseErrorKind::EmptyCell => {
                diag.with_note("the block data or the catalog entry is malformed")
            }
            ParseErrorKind::KindMismatch { .. } | ParseErrorKind::ExpressionCycle => diag,
        }
    }
}

/// Non-fatal findings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseWarning {
    /// A wire to or from the enclosing block in a unit parsed as the root.
    OutsideConnectionInRoot {
        unit: String,
        pos: GridPos,
        terminal: TerminalPos,
    },
}

impl ParseWarning {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ParseWarning::OutsideConnectionInRoot {
                unit,
                pos,
                terminal,
            } => Diagnostic::warning(ErrorCode::E1101)
                .with_message("connection to the enclosing block ignored")
                .with_label(Location::terminal(unit, *pos, *terminal), "wired here")
                .with_note("the root unit is not placed inside another block"),
        }
    }
}

#[cfg(test)]
mod tests;
