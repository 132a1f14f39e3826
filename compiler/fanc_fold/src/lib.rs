//! Constant folding.
//!
//! A [`Rewriter`] that replaces pure expressions whose inputs are all
//! literals with a literal holding the result. The rewriter visits inputs
//! first, so chains of pure expressions collapse from the leaves up.
//!
//! # Scope
//!
//! - Arithmetic, vector and rotation blocks (everything
//!   [`eval_pure`] computes)
//! - Disconnected inputs fold as the block's default value
//!
//! Does NOT cover:
//! - Host queries, variables and pointers (never pure)
//! - Values flowing in from outside a custom block body: a body is shared
//!   by every placement, so it folds only what is constant in all of them
//! - Removing nodes that became unreachable; node ids stay stable
//!
//! Folding uses the same [`eval_pure`] and [`input_default`] the
//! interpreter uses, which makes a folded tree evaluate exactly like the
//! tree it came from.

use std::sync::Arc;

use fanc_ir::node::pure::{eval_pure, input_default};
use fanc_ir::{
    ExprKind, NodeKind, Outputs, RewriteCx, RewritePass, Rewriter, SyntaxNode, SyntaxTree,
    Terminal, Value,
};
use smallvec::SmallVec;

/// Whether a node's inputs are known at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Constness {
    Const,
    Runtime,
}

/// The constant folding rewriter.
#[derive(Debug, Default)]
pub struct ConstantFolder {
    folded: usize,
}

impl ConstantFolder {
    pub fn new() -> Self {
        ConstantFolder::default()
    }

    /// Number of nodes replaced so far.
    pub fn folded(&self) -> usize {
        self.folded
    }

    /// Fold `tree` and every custom block body below it.
    pub fn fold(&mut self, tree: &Arc<SyntaxTree>) -> Arc<SyntaxTree> {
        RewritePass::new(self).rewrite(tree)
    }
}

impl Rewriter for ConstantFolder {
    fn rewrite_expr(&mut self, cx: &RewriteCx<'_>, node: &SyntaxNode) -> Option<SyntaxNode> {
        let NodeKind::Expr(kind) = &node.kind else {
            return None;
        };
        if matches!(kind, ExprKind::Constant(_)) || !kind.is_pure() {
            return None;
        }
        let (Constness::Const, values) = input_values(cx, kind, node) else {
            return None;
        };
        let outputs = eval_pure(kind, &values)?;
        self.folded += 1;
        tracing::trace!(pos = %node.pos, block = %node.describe(), "folded expression");
        Some(SyntaxNode {
            pos: node.pos,
            kind: NodeKind::Expr(ExprKind::Constant(outputs)),
            entries: SmallVec::new(),
            inputs: SmallVec::new(),
            outputs: node.outputs.clone(),
            exits: SmallVec::new(),
        })
    }
}

/// Values of `node`'s inputs, as far as they are literals.
fn input_values(cx: &RewriteCx<'_>, kind: &ExprKind, node: &SyntaxNode) -> (Constness, Outputs) {
    let mut values = Outputs::new();
    for (index, input) in node.inputs.iter().enumerate() {
        let value = match input.source {
            None => Some(input_default(kind, index, input.kind)),
            Some(Terminal::Node { node, output }) => literal(cx.node(node), output),
            Some(Terminal::Outside(_)) => None,
        };
        match value {
            Some(value) => values.push(value),
            None => return (Constness::Runtime, values),
        }
    }
    (Constness::Const, values)
}

fn literal(node: &SyntaxNode, output: u8) -> Option<Value> {
    node.constant()?.get(usize::from(output)).copied()
}

/// Fold `tree`, logging how many nodes were replaced.
pub fn fold(tree: &Arc<SyntaxTree>) -> Arc<SyntaxTree> {
    let mut folder = ConstantFolder::new();
    let folded = folder.fold(tree);
    tracing::debug!(unit = %tree.name, folded = folder.folded(), "constant folding done");
    folded
}
