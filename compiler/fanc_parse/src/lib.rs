//! Parser for Fanc block graphs.
//!
//! Turns a root [`ProgramUnit`] and a [`Catalog`] into a [`SyntaxTree`] and
//! the [`Program`] instantiated from it. Custom blocks are parsed
//! recursively, once per unit, and share their body trees.
//!
//! Parsing is all-or-nothing: the first problem found aborts with a
//! [`ParseError`]. Outside connections in the root unit are the only
//! recoverable finding and are reported as [`ParseWarning`]s.

mod error;
mod index;
mod kind;
mod settings;
mod unit;
mod variables;

use std::sync::Arc;

use fanc_ir::{BlockId, Catalog, Layout, Program, ProgramUnit, SyntaxTree, UnitId, Variable};
use rustc_hash::FxHashMap;

pub use error::{ParseError, ParseErrorKind, ParseWarning};
pub use variables::{catalog_globals, unit_variables};

/// Default bound on custom block nesting.
pub const DEFAULT_MAX_DEPTH: u32 = 32;

/// Parser configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed custom block nesting; the root is depth 0.
    pub max_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A successfully parsed program.
#[derive(Clone, Debug)]
pub struct ParseOutput {
    pub tree: Arc<SyntaxTree>,
    pub program: Program,
    /// Global and persisted variables named anywhere in the program or the
    /// catalog, in discovery order.
    pub globals: Vec<Variable>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse `root` against `catalog`.
pub fn parse(
    root: &ProgramUnit,
    catalog: &Catalog,
    options: &ParseOptions,
) -> Result<ParseOutput, ParseError> {
    let mut parser = Parser::new(catalog, options);
    let tree = parser.parse_root(root)?;

    let mut globals: Vec<Variable> = Vec::new();
    for variable in tree_globals(&tree).chain(catalog_globals(catalog)) {
        if !globals.contains(&variable) {
            globals.push(variable);
        }
    }
    let program = Program::instantiate(Arc::clone(&tree), &globals);
    tracing::debug!(
        root = %root.name,
        nodes = tree.len(),
        entry_points = tree.entry_points.len(),
        environments = program.envs().len(),
        "parsed program"
    );
    Ok(ParseOutput {
        tree,
        program,
        globals,
        warnings: parser.warnings,
    })
}

/// Globals named in `tree` and every body below it.
fn tree_globals(tree: &Arc<SyntaxTree>) -> impl Iterator<Item = Variable> {
    let mut found = Vec::new();
    let mut seen = rustc_hash::FxHashSet::default();
    let mut stack = vec![Arc::clone(tree)];
    while let Some(tree) = stack.pop() {
        if !seen.insert(tree.unit) {
            continue;
        }
        found.extend(tree.variables.iter().filter(|v| v.is_global()).cloned());
        // Reverse so bodies are visited in node order.
        let bodies: Vec<_> = tree
            .nodes()
            .filter_map(|(_, node)| node.custom())
            .map(|block| Arc::clone(&block.body))
            .collect();
        stack.extend(bodies.into_iter().rev());
    }
    found.into_iter()
}

/// Shared state of one parse: the catalog, per-unit tree cache and the
/// warnings collected so far.
pub(crate) struct Parser<'a> {
    catalog: &'a Catalog,
    options: ParseOptions,
    trees: FxHashMap<UnitId, Arc<SyntaxTree>>,
    layouts: FxHashMap<BlockId, Arc<Layout>>,
    warnings: Vec<ParseWarning>,
}

impl<'a> Parser<'a> {
    fn new(catalog: &'a Catalog, options: &ParseOptions) -> Self {
        Parser {
            catalog,
            options: *options,
            trees: FxHashMap::default(),
            layouts: FxHashMap::default(),
            warnings: Vec::new(),
        }
    }

    fn parse_root(&mut self, root: &ProgramUnit) -> Result<Arc<SyntaxTree>, ParseError> {
        let tree = unit::UnitParser::new(self, UnitId::ROOT, root, 0)?.parse()?;
        Ok(Arc::new(tree))
    }

    /// Body tree of custom block unit `id`, placed at nesting depth `depth`.
    ///
    /// `host` locates the placing block for error reports.
    pub(crate) fn parse_custom(
        &mut self,
        id: UnitId,
        unit: &ProgramUnit,
        depth: u32,
        host: (&str, fanc_ir::GridPos),
    ) -> Result<Arc<SyntaxTree>, ParseError> {
        let too_deep = || {
            ParseError::new(
                ParseErrorKind::NestingTooDeep {
                    name: unit.name.clone(),
                    max: self.options.max_depth,
                },
                host.0,
                host.1,
            )
        };
        if depth > self.options.max_depth {
            return Err(too_deep());
        }
        if let Some(tree) = self.trees.get(&id) {
            if depth + tree.height > self.options.max_depth {
                return Err(too_deep());
            }
            return Ok(Arc::clone(tree));
        }

        let tree = Arc::new(unit::UnitParser::new(self, id, unit, depth)?.parse()?);
        tracing::trace!(unit = %unit.name, depth, nodes = tree.len(), "parsed custom block body");
        self.trees.insert(id, Arc::clone(&tree));
        Ok(tree)
    }

    /// Layout of block `id`, cached per id.
    pub(crate) fn layout(&mut self, id: BlockId) -> Option<Arc<Layout>> {
        if let Some(layout) = self.layouts.get(&id) {
            return Some(Arc::clone(layout));
        }
        let layout = Arc::new(self.catalog.lookup(id)?.layout());
        self.layouts.insert(id, Arc::clone(&layout));
        Some(layout)
    }
}
