//! Output buffer and bookkeeping for C generation.

use fanc_diagnostic::Location;
use rustc_hash::FxHashSet;

/// Code generation context.
///
/// Tracks indentation, the number of lines written, which generated line
/// each block's code starts on, and which functions have been requested.
#[derive(Debug, Default)]
pub struct CodegenContext {
    indent: usize,
    output: String,
    /// Complete lines written so far.
    lines: u32,
    /// First line (1-based) of each block's code.
    marks: Vec<(u32, Location)>,
    generated_helpers: FxHashSet<String>,
    temp_counter: u32,
}

impl CodegenContext {
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            ..Self::default()
        }
    }

    /// Generate a unique temporary variable name.
    pub fn fresh_temp(&mut self) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("t{n}")
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }

    /// Write a string to output.
    #[expect(clippy::cast_possible_truncation, reason = "generated sources stay far below u32::MAX lines")]
    pub fn write(&mut self, s: &str) {
        self.lines += s.bytes().filter(|b| *b == b'\n').count() as u32;
        self.output.push_str(s);
    }

    /// Write a line to output (with indentation and newline).
    pub fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.write(s);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.lines += 1;
        self.output.push('\n');
    }

    /// Record that the next line belongs to the block at `location`.
    pub fn mark_block(&mut self, location: Location) {
        self.marks.push((self.lines + 1, location));
    }

    /// Number of complete lines written.
    pub fn line_count(&self) -> u32 {
        self.lines
    }

    /// Take the generated output and the block marks, leaving the context
    /// empty.
    pub fn take_output(&mut self) -> (String, Vec<(u32, Location)>) {
        self.lines = 0;
        (std::mem::take(&mut self.output), std::mem::take(&mut self.marks))
    }

    /// Check if a helper function has been generated.
    pub fn has_helper(&self, name: &str) -> bool {
        self.generated_helpers.contains(name)
    }

    /// Mark a helper function as generated.
    pub fn mark_helper(&mut self, name: impl Into<String>) {
        self.generated_helpers.insert(name.into());
    }
}
