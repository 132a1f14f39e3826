//! The system C compiler as a toolchain.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use fanc_ir::{Value, ValueKind};
use tempfile::TempDir;

use super::{
    kind_width, value_from_floats, CompiledProgram, CompilerMessage, FrameError, FrameOutput,
    HostCall, Toolchain, ToolchainError,
};
use crate::artifact::{Artifact, RUNNER_FILE, RUNTIME_FILE, SOURCE_FILE};

/// Builds with `cc` (or `$CC`) and runs the result as a child process
/// speaking the runner's line protocol.
#[derive(Clone, Debug)]
pub struct CcToolchain {
    compiler: OsString,
    flags: Vec<String>,
}

impl Default for CcToolchain {
    fn default() -> Self {
        CcToolchain {
            compiler: OsString::from("cc"),
            flags: vec!["-std=c99".to_owned(), "-O1".to_owned()],
        }
    }
}

impl CcToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `$CC` when set.
    pub fn from_env() -> Self {
        let mut toolchain = Self::default();
        if let Some(compiler) = std::env::var_os("CC").filter(|cc| !cc.is_empty()) {
            toolchain.compiler = compiler;
        }
        toolchain
    }

    #[must_use]
    pub fn with_compiler(mut self, compiler: impl Into<OsString>) -> Self {
        self.compiler = compiler.into();
        self
    }

    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    fn compiler_name(&self) -> String {
        self.compiler.to_string_lossy().into_owned()
    }

    fn write_sources(dir: &Path, artifact: &Artifact) -> Result<(), ToolchainError> {
        for (name, text) in [
            (SOURCE_FILE, artifact.source.as_str()),
            (RUNTIME_FILE, artifact.runtime),
            (RUNNER_FILE, artifact.runner),
        ] {
            std::fs::write(dir.join(name), text).map_err(|e| ToolchainError::Io {
                message: format!("writing {name}: {e}"),
            })?;
        }
        Ok(())
    }
}

impl Toolchain for CcToolchain {
    fn build(&self, artifact: &Artifact) -> Result<Box<dyn CompiledProgram>, ToolchainError> {
        let dir = tempfile::tempdir().map_err(|e| ToolchainError::Io {
            message: e.to_string(),
        })?;
        Self::write_sources(dir.path(), artifact)?;
        let exe = dir.path().join("fanc_program");

        let mut cmd = Command::new(&self.compiler);
        cmd.current_dir(dir.path())
            .args(&self.flags)
            .arg("-o")
            .arg(&exe)
            .arg(SOURCE_FILE)
            .arg(RUNNER_FILE)
            .arg("-lm");
        tracing::debug!(compiler = %self.compiler_name(), dir = %dir.path().display(), "compiling");

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToolchainError::CompilerNotFound {
                    compiler: self.compiler_name(),
                    message: e.to_string(),
                }
            } else {
                ToolchainError::Io {
                    message: e.to_string(),
                }
            }
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(ToolchainError::Compile {
                compiler: self.compiler_name(),
                exit_code: output.status.code(),
                messages: parse_compiler_messages(&stderr, artifact),
                stderr,
            });
        }

        let mut child = Command::new(&exe)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ToolchainError::Io {
                message: e.to_string(),
            })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(ToolchainError::Io {
                message: "runner pipes unavailable".to_owned(),
            });
        };
        Ok(Box::new(CcProgram {
            _dir: dir,
            child,
            stdin,
            stdout: BufReader::new(stdout),
            frame: 0,
        }))
    }
}

/// Parse `file:line:col: severity: message` lines. Lines of the generated
/// program are mapped back to the block they came from.
pub fn parse_compiler_messages(stderr: &str, artifact: &Artifact) -> Vec<CompilerMessage> {
    stderr
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(5, ':');
            let file = parts.next()?.trim().to_owned();
            let line_no = parts.next()?.trim().parse().ok()?;
            let column = parts.next()?.trim().parse().ok()?;
            let severity = parts.next()?.trim();
            if !matches!(severity, "error" | "fatal error" | "warning" | "note") {
                return None;
            }
            let message = parts.next().unwrap_or_default().trim().to_owned();
            let block = Path::new(&file)
                .file_name()
                .is_some_and(|name| name == SOURCE_FILE)
                .then(|| artifact.block_at_line(line_no).cloned())
                .flatten();
            Some(CompilerMessage {
                file,
                line: line_no,
                column,
                severity: severity.to_owned(),
                message,
                block,
            })
        })
        .collect()
}

/// A compiled runner process.
struct CcProgram {
    _dir: TempDir,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    frame: u64,
}

impl CcProgram {
    /// Send one command and collect the lines before its `end` line.
    fn request(&mut self, command: &str) -> Result<(Vec<String>, String), FrameError> {
        writeln!(self.stdin, "{command}")
            .and_then(|()| self.stdin.flush())
            .map_err(|e| FrameError::RunnerExited {
                message: e.to_string(),
            })?;
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let read = self
                .stdout
                .read_line(&mut line)
                .map_err(|e| FrameError::RunnerExited {
                    message: e.to_string(),
                })?;
            if read == 0 {
                let status = self.child.try_wait().ok().flatten();
                return Err(FrameError::RunnerExited {
                    message: status.map_or_else(
                        || "output closed".to_owned(),
                        |status| status.to_string(),
                    ),
                });
            }
            let line = line.trim_end().to_owned();
            if let Some(status) = line.strip_prefix("end ") {
                return Ok((lines, status.to_owned()));
            }
            lines.push(line);
        }
    }

    fn run(&mut self, command: &str) -> Result<FrameOutput, FrameError> {
        let (lines, status) = self.request(command)?;
        let frame = self.frame;
        let mut calls = Vec::with_capacity(lines.len());
        for line in lines {
            calls.push(parse_call(&line).ok_or(FrameError::Protocol { line })?);
        }
        tracing::trace!(frame, calls = calls.len(), %status, command, "runner answered");
        match status.as_str() {
            "ok" => Ok(FrameOutput {
                calls,
                deferred: false,
            }),
            "deferred" => Ok(FrameOutput {
                calls,
                deferred: true,
            }),
            "timeout" => Err(FrameError::Timeout { frame }),
            _ => Err(FrameError::Protocol {
                line: format!("end {status}"),
            }),
        }
    }
}

fn parse_call(line: &str) -> Option<HostCall> {
    let mut words = line.split_whitespace();
    if words.next()? != "call" {
        return None;
    }
    let name = words.next()?.to_owned();
    let args = words.map(str::parse).collect::<Result<Vec<f32>, _>>().ok()?;
    Some(HostCall { name, args })
}

impl CompiledProgram for CcProgram {
    fn run_frame(&mut self) -> Result<FrameOutput, FrameError> {
        let result = self.run("frame");
        self.frame += 1;
        result
    }

    fn run_late(&mut self) -> Result<FrameOutput, FrameError> {
        let frame = self.frame.saturating_sub(1);
        self.run("late").map_err(|e| match e {
            FrameError::Timeout { .. } => FrameError::Timeout { frame },
            other => other,
        })
    }

    fn global_variables(&mut self) -> Result<Vec<(String, ValueKind)>, FrameError> {
        let (lines, _) = self.request("globals")?;
        lines
            .into_iter()
            .map(|line| {
                let parsed = line.strip_prefix("global ").and_then(|rest| {
                    let (kind, name) = rest.split_once(' ')?;
                    let kind = ValueKind::ALL
                        .into_iter()
                        .find(|candidate| candidate.name() == kind)?;
                    Some((name.to_owned(), kind))
                });
                parsed.ok_or(FrameError::Protocol { line })
            })
            .collect()
    }

    fn get_global_variable(&mut self, name: &str, kind: ValueKind) -> Result<Vec<Value>, FrameError> {
        let globals = self.global_variables()?;
        let Some(index) = globals
            .iter()
            .position(|(global, global_kind)| global == name && *global_kind == kind)
        else {
            return Ok(Vec::new());
        };
        let (lines, _) = self.request(&format!("get {index}"))?;
        let line = lines.into_iter().next().unwrap_or_default();
        let floats: Option<Vec<f32>> = line
            .strip_prefix("values ")
            .and_then(|rest| rest.split_whitespace().skip(1).map(|f| f.parse().ok()).collect());
        let Some(floats) = floats else {
            return Err(FrameError::Protocol { line });
        };
        floats
            .chunks_exact(kind_width(kind))
            .map(|chunk| {
                value_from_floats(kind, chunk).ok_or_else(|| FrameError::Protocol {
                    line: line.clone(),
                })
            })
            .collect()
    }
}

impl Drop for CcProgram {
    fn drop(&mut self) {
        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();
        if self.child.try_wait().ok().flatten().is_none() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}
