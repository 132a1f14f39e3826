//! Syntax tree rewriting.
//!
//! A [`Rewriter`] gets one hook per node family and returns a replacement
//! node or `None` to keep the current one. [`RewritePass`] drives it:
//!
//! - nodes are visited bottom-up, so a hook sees its inputs already
//!   rewritten (through [`RewriteCx::node`]);
//! - each node is visited once; a node reached again while its own inputs
//!   are still being visited (statement outputs can feed each other) is
//!   seen in its current form;
//! - custom block bodies are rewritten once per unit and shared by every
//!   block placing that unit;
//! - a tree in which nothing changed is returned as the same `Arc`.
//!
//! Node ids are stable across a rewrite, so references between nodes never
//! need patching.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::node::{NodeId, NodeKind, SyntaxNode};
use crate::stack::ensure_sufficient_stack;
use crate::unit::UnitId;
use crate::SyntaxTree;

/// Per-family rewrite hooks. The defaults keep every node.
pub trait Rewriter {
    fn rewrite_stmt(&mut self, cx: &RewriteCx<'_>, node: &SyntaxNode) -> Option<SyntaxNode> {
        let _ = (cx, node);
        None
    }

    fn rewrite_expr(&mut self, cx: &RewriteCx<'_>, node: &SyntaxNode) -> Option<SyntaxNode> {
        let _ = (cx, node);
        None
    }
}

/// View of the tree being rewritten, with replacements made so far.
pub struct RewriteCx<'a> {
    tree: &'a SyntaxTree,
    replaced: &'a [Option<SyntaxNode>],
}

impl<'a> RewriteCx<'a> {
    /// Current form of `id`: its replacement if it has one.
    pub fn node(&self, id: NodeId) -> &'a SyntaxNode {
        match self.replaced.get(id.index()) {
            Some(Some(node)) => node,
            _ => self.tree.node(id),
        }
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Visit {
    Pending,
    Active,
    Done,
}

/// Drives a [`Rewriter`] over a tree and every body below it.
pub struct RewritePass<'r, R: ?Sized> {
    rewriter: &'r mut R,
    bodies: FxHashMap<UnitId, Arc<SyntaxTree>>,
    active: FxHashSet<UnitId>,
}

impl<'r, R: Rewriter + ?Sized> RewritePass<'r, R> {
    pub fn new(rewriter: &'r mut R) -> Self {
        RewritePass {
            rewriter,
            bodies: FxHashMap::default(),
            active: FxHashSet::default(),
        }
    }

    pub fn rewrite(&mut self, tree: &Arc<SyntaxTree>) -> Arc<SyntaxTree> {
        if let Some(done) = self.bodies.get(&tree.unit) {
            return Arc::clone(done);
        }
        if !self.active.insert(tree.unit) {
            return Arc::clone(tree);
        }

        let mut state = vec![Visit::Pending; tree.len()];
        let mut replaced: Vec<Option<SyntaxNode>> = vec![None; tree.len()];
        for (id, _) in tree.nodes() {
            self.visit(tree, id, &mut state, &mut replaced);
        }

        let result = if replaced.iter().all(Option::is_none) {
            Arc::clone(tree)
        } else {
            let changed = replaced.iter().filter(|node| node.is_some()).count();
            tracing::trace!(unit = %tree.name, changed, "rewrote tree");
            let nodes = tree
                .nodes()
                .zip(replaced)
                .map(|((_, original), new)| new.unwrap_or_else(|| original.clone()))
                .collect();
            Arc::new(tree.with_nodes(nodes))
        };
        self.active.remove(&tree.unit);
        self.bodies.insert(tree.unit, Arc::clone(&result));
        result
    }

    fn visit(
        &mut self,
        tree: &Arc<SyntaxTree>,
        id: NodeId,
        state: &mut [Visit],
        replaced: &mut [Option<SyntaxNode>],
    ) {
        if state[id.index()] != Visit::Pending {
            return;
        }
        state[id.index()] = Visit::Active;

        let node = tree.node(id);
        for input in node.input_nodes() {
            ensure_sufficient_stack(|| self.visit(tree, input, state, replaced));
        }

        if let Some(block) = node.custom() {
            let body = ensure_sufficient_stack(|| self.rewrite(&block.body));
            if !Arc::ptr_eq(&body, &block.body) {
                let mut rebuilt = node.clone();
                if let Some(block) = rebuilt.custom_mut() {
                    block.body = body;
                }
                replaced[id.index()] = Some(rebuilt);
            }
        }

        let replacement = {
            let cx = RewriteCx {
                tree,
                replaced: &*replaced,
            };
            let current = cx.node(id);
            match current.kind {
                NodeKind::Stmt(_) => self.rewriter.rewrite_stmt(&cx, current),
                NodeKind::Expr(_) => self.rewriter.rewrite_expr(&cx, current),
            }
        };
        if let Some(node) = replacement {
            replaced[id.index()] = Some(node);
        }
        state[id.index()] = Visit::Done;
    }
}

/// Rewrite `tree` with `rewriter`.
pub fn rewrite<R: Rewriter + ?Sized>(rewriter: &mut R, tree: &Arc<SyntaxTree>) -> Arc<SyntaxTree> {
    RewritePass::new(rewriter).rewrite(tree)
}

#[cfg(test)]
mod tests;
