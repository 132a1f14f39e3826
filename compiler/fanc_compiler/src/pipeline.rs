//! Core compilation pipeline: parse → fold → lower.
//!
//! Portable (no filesystem IO, no external processes). The grid comes in
//! as a [`ProgramUnit`] plus its [`Catalog`]; results come out as a
//! [`CompileOutput`]. Building and running the lowered program is left to
//! a [`Toolchain`](fanc_codegen::Toolchain).

use std::time::Duration;

use fanc_codegen::CodegenOptions;
use fanc_ir::{Catalog, Program, ProgramUnit};
use fanc_parse::{ParseOptions, DEFAULT_MAX_DEPTH};

use crate::output::{CompileOutput, ErrorPhase};

/// Configuration for a compilation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileConfig {
    /// Deepest allowed custom block nesting.
    pub max_depth: u32,
    /// Run the constant folder before lowering.
    pub fold_constants: bool,
    /// Lower to C; without it compilation stops after folding.
    pub lower: bool,
    /// Per-frame time budget compiled into the lowered program.
    pub time_budget: Option<Duration>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            fold_constants: true,
            lower: true,
            time_budget: None,
        }
    }
}

impl CompileConfig {
    /// Defaults overridden by `FANC_MAX_DEPTH`, `FANC_TIME_BUDGET_MS` and
    /// `FANC_NO_FOLD`.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `var`.
    /// Unparsable values are ignored.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = CompileConfig::default();
        if let Some(depth) = var("FANC_MAX_DEPTH") {
            match depth.trim().parse() {
                Ok(depth) => config.max_depth = depth,
                Err(_) => tracing::warn!(value = %depth, "ignoring invalid FANC_MAX_DEPTH"),
            }
        }
        if let Some(ms) = var("FANC_TIME_BUDGET_MS") {
            match ms.trim().parse::<u64>() {
                Ok(0) => config.time_budget = None,
                Ok(ms) => config.time_budget = Some(Duration::from_millis(ms)),
                Err(_) => tracing::warn!(value = %ms, "ignoring invalid FANC_TIME_BUDGET_MS"),
            }
        }
        if let Some(flag) = var("FANC_NO_FOLD") {
            config.fold_constants = matches!(flag.trim(), "" | "0" | "false");
        }
        config
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
        }
    }

    fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            time_budget: self.time_budget,
        }
    }
}

/// Full pipeline: parse → fold → lower.
///
/// The program in the output is instantiated from the folded tree, so the
/// interpreter and the lowered C run the same code.
pub fn compile(root: &ProgramUnit, catalog: &Catalog, config: &CompileConfig) -> CompileOutput {
    // Parse
    let parsed = match fanc_parse::parse(root, catalog, &config.parse_options()) {
        Ok(parsed) => parsed,
        Err(error) => {
            return CompileOutput::failed(ErrorPhase::Parse, vec![error.to_diagnostic()]);
        }
    };
    let mut diagnostics: Vec<_> = parsed
        .warnings
        .iter()
        .map(fanc_parse::ParseWarning::to_diagnostic)
        .collect();

    // Fold
    let (tree, program, folded) = if config.fold_constants {
        let mut folder = fanc_fold::ConstantFolder::new();
        let tree = folder.fold(&parsed.tree);
        let program = Program::instantiate(tree.clone(), &parsed.globals);
        (tree, program, folder.folded())
    } else {
        (parsed.tree, parsed.program, 0)
    };

    // Lower
    let artifact = if config.lower {
        match fanc_codegen::lower(&program, &config.codegen_options()) {
            Ok(artifact) => Some(artifact),
            Err(error) => {
                diagnostics.push(error.to_diagnostic());
                return CompileOutput {
                    tree: Some(tree),
                    program: Some(program),
                    folded,
                    ..CompileOutput::failed(ErrorPhase::Lower, diagnostics)
                };
            }
        }
    } else {
        None
    };

    tracing::debug!(
        unit = %root.name,
        folded,
        functions = artifact.as_ref().map_or(0, |artifact| artifact.functions.len()),
        "compiled"
    );
    CompileOutput {
        success: true,
        tree: Some(tree),
        program: Some(program),
        artifact,
        folded,
        diagnostics,
        error_phase: None,
    }
}
