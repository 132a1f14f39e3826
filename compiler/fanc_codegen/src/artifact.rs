//! The lowered program handed to a toolchain.

use fanc_diagnostic::Location;

/// File name the generated program is written under.
pub const SOURCE_FILE: &str = "program.c";
/// File name of the runtime support header.
pub const RUNTIME_FILE: &str = "fanc_runtime.h";
/// File name of the headless runner.
pub const RUNNER_FILE: &str = "runner.c";

/// Runtime support library included by every generated program.
pub const RUNTIME_HEADER: &str = include_str!("c/fanc_runtime.h");

/// `main` of the headless runner driven by [`CcToolchain`](crate::CcToolchain).
pub const RUNNER_SOURCE: &str = include_str!("c/runner.c");

/// A lowered program: C source plus the fixed runtime library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub source: String,
    pub runtime: &'static str,
    pub runner: &'static str,
    /// Generated functions, by name.
    pub functions: Vec<String>,
    /// First line of each block's code, ascending.
    lines: Vec<(u32, Location)>,
}

impl Artifact {
    pub(crate) fn new(source: String, functions: Vec<String>, lines: Vec<(u32, Location)>) -> Self {
        Artifact {
            source,
            runtime: RUNTIME_HEADER,
            runner: RUNNER_SOURCE,
            functions,
            lines,
        }
    }

    /// The block whose code contains line `line` (1-based) of the source.
    pub fn block_at_line(&self, line: u32) -> Option<&Location> {
        let after = self.lines.partition_point(|(start, _)| *start <= line);
        after.checked_sub(1).map(|index| &self.lines[index].1)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.iter().any(|function| function == name)
    }
}

#[cfg(test)]
mod tests {
    use fanc_ir::GridPos;

    use super::*;

    #[test]
    fn lines_map_to_the_latest_block_above() {
        let first = Location::block("main", GridPos::new(0, 0, 0));
        let second = Location::block("main", GridPos::new(1, 0, 0));
        let artifact = Artifact::new(
            String::new(),
            Vec::new(),
            vec![(10, first.clone()), (20, second.clone())],
        );
        assert_eq!(artifact.block_at_line(5), None);
        assert_eq!(artifact.block_at_line(10), Some(&first));
        assert_eq!(artifact.block_at_line(19), Some(&first));
        assert_eq!(artifact.block_at_line(200), Some(&second));
    }

    #[test]
    fn runtime_list_limit_matches_the_interpreter() {
        let define = format!("#define FC_MAX_LIST_LEN {}\n", fanc_ir::MAX_LIST_LEN);
        assert!(RUNTIME_HEADER.contains(&define));
    }
}
