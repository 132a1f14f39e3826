//! Building and running lowered programs.
//!
//! A [`Toolchain`] turns an [`Artifact`] into a [`CompiledProgram`] that
//! runs frames on request and reports every host callback it made. The
//! bundled [`CcToolchain`] compiles with the system C compiler and drives
//! the result as a child process.

mod cc;

use fanc_diagnostic::{Diagnostic, ErrorCode, Location};
use fanc_ir::{ConstraintRef, EnvId, GridPos, ObjectRef, Value, ValueKind};
use glam::{Quat, Vec3};
use thiserror::Error;

use crate::Artifact;

pub use cc::{parse_compiler_messages, CcToolchain};

/// Something that can build lowered programs.
pub trait Toolchain {
    fn build(&self, artifact: &Artifact) -> Result<Box<dyn CompiledProgram>, ToolchainError>;
}

/// A built program, ready to run frames.
///
/// Frames run in order and never overlap; a frame that timed out leaves
/// whatever its completed statements did in place.
pub trait CompiledProgram {
    /// Run one frame. Late-update flows it reached are queued until
    /// [`run_late`](Self::run_late).
    fn run_frame(&mut self) -> Result<FrameOutput, FrameError>;

    /// Run the late-update flows queued by the last frame.
    fn run_late(&mut self) -> Result<FrameOutput, FrameError>;

    /// Global and persisted variables, in registration order.
    fn global_variables(&mut self) -> Result<Vec<(String, ValueKind)>, FrameError>;

    /// Current elements of a global. Unknown globals read as empty.
    fn get_global_variable(&mut self, name: &str, kind: ValueKind) -> Result<Vec<Value>, FrameError>;
}

/// One callback a compiled program made into its host.
#[derive(Clone, Debug, PartialEq)]
pub struct HostCall {
    pub name: String,
    pub args: Vec<f32>,
}

impl HostCall {
    /// The value, environment and block position of an `inspect` call.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "the runner prints ids and coordinates as whole non-negative floats"
    )]
    pub fn inspected(&self) -> Option<(EnvId, GridPos, Value)> {
        if self.name != "inspect" {
            return None;
        }
        let [env, x, y, z, kind, values @ ..] = self.args.as_slice() else {
            return None;
        };
        let kind = ValueKind::from_index(*kind as u8)?;
        let pos = GridPos::new(*x as u16, *y as u16, *z as u16);
        Some((EnvId(*env as u32), pos, value_from_floats(kind, values)?))
    }
}

/// What a frame did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameOutput {
    pub calls: Vec<HostCall>,
    /// Late-update flows are waiting for [`CompiledProgram::run_late`].
    pub deferred: bool,
}

impl FrameOutput {
    pub fn inspected(&self) -> impl Iterator<Item = (EnvId, GridPos, Value)> + '_ {
        self.calls.iter().filter_map(HostCall::inspected)
    }
}

/// Rebuild a value from its flattened floats.
#[expect(clippy::cast_possible_truncation, reason = "handles are printed as whole floats")]
pub fn value_from_floats(kind: ValueKind, floats: &[f32]) -> Option<Value> {
    Some(match kind {
        ValueKind::Float => Value::Float(*floats.first()?),
        ValueKind::Vec3 => match floats {
            [x, y, z, ..] => Value::Vec3(Vec3::new(*x, *y, *z)),
            _ => return None,
        },
        ValueKind::Rot => match floats {
            [x, y, z, w, ..] => Value::Rot(Quat::from_xyzw(*x, *y, *z, *w)),
            _ => return None,
        },
        ValueKind::Bool => Value::Bool(*floats.first()? != 0.0),
        ValueKind::Obj => Value::Obj(ObjectRef(*floats.first()? as i32)),
        ValueKind::Con => Value::Con(ConstraintRef(*floats.first()? as i32)),
    })
}

/// Floats one element of `kind` flattens to.
pub fn kind_width(kind: ValueKind) -> usize {
    match kind {
        ValueKind::Vec3 => 3,
        ValueKind::Rot => 4,
        ValueKind::Float | ValueKind::Bool | ValueKind::Obj | ValueKind::Con => 1,
    }
}

/// One message from the external compiler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerMessage {
    pub file: String,
    pub line: u32,
    pub column: u32,
    /// `error`, `warning` or `note`.
    pub severity: String,
    pub message: String,
    /// Block whose generated code the line belongs to.
    pub block: Option<Location>,
}

/// Failure to turn an artifact into a runnable program.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ToolchainError {
    #[error("C compiler `{compiler}` not found: {message}")]
    CompilerNotFound { compiler: String, message: String },

    #[error("C compiler `{compiler}` rejected the generated program")]
    Compile {
        compiler: String,
        exit_code: Option<i32>,
        messages: Vec<CompilerMessage>,
        stderr: String,
    },

    #[error("could not start the compiled program: {message}")]
    Io { message: String },
}

impl ToolchainError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ToolchainError::CompilerNotFound { .. } => Diagnostic::error(ErrorCode::E2002)
                .with_message(self.to_string())
                .with_suggestion("install a C99 compiler or point the CC variable at one"),
            ToolchainError::Compile {
                messages,
                stderr,
                exit_code,
                ..
            } => {
                let mut diag = Diagnostic::error(ErrorCode::E2001).with_message(self.to_string());
                let first = messages
                    .iter()
                    .find(|message| message.severity == "error")
                    .or_else(|| messages.first());
                match first {
                    Some(first) => {
                        diag = diag.with_label(
                            Location::Source {
                                file: first.file.clone(),
                                line: first.line,
                                column: first.column,
                            },
                            first.message.clone(),
                        );
                        if let Some(block) = &first.block {
                            diag = diag
                                .with_secondary_label(block.clone(), "generated from this block");
                        }
                    }
                    None if !stderr.is_empty() => diag = diag.with_note(stderr.trim().to_owned()),
                    None => {}
                }
                if let Some(code) = exit_code {
                    diag = diag.with_note(format!("compiler exited with status {code}"));
                }
                diag
            }
            ToolchainError::Io { .. } => {
                Diagnostic::error(ErrorCode::E2003).with_message(self.to_string())
            }
        }
    }
}

/// Failure while running a built program.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame {frame} exceeded its time budget")]
    Timeout { frame: u64 },

    #[error("compiled program stopped: {message}")]
    RunnerExited { message: String },

    #[error("unexpected output from the compiled program: `{line}`")]
    Protocol { line: String },
}

impl FrameError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            FrameError::Timeout { .. } => Diagnostic::error(ErrorCode::E3001)
                .with_message(self.to_string())
                .with_note("statements completed before the timeout keep their effects"),
            FrameError::RunnerExited { .. } | FrameError::Protocol { .. } => {
                Diagnostic::error(ErrorCode::E3002).with_message(self.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests;
