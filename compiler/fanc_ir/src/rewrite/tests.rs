use std::sync::Arc;

use pretty_assertions::assert_eq;
use smallvec::{smallvec, SmallVec};

use super::*;
use crate::grid::{GridPos, TerminalPos};
use crate::node::{BinaryOp, CustomBlock, ExprKind, Input, Output, Terminal};
use crate::{SignalKind, Value};

fn out() -> Output {
    Output {
        kind: SignalKind::FLOAT,
        pos: TerminalPos::new(7, 1, 5),
    }
}

fn constant(x: u16, value: f32) -> SyntaxNode {
    SyntaxNode {
        pos: GridPos::new(x, 0, 0),
        kind: NodeKind::Expr(ExprKind::Constant(smallvec![Value::Float(value)])),
        entries: SmallVec::new(),
        inputs: SmallVec::new(),
        outputs: smallvec![out()],
        exits: SmallVec::new(),
    }
}

fn add(x: u16, lhs: u32, rhs: u32) -> SyntaxNode {
    let input = |row: u8, node: u32| Input {
        kind: SignalKind::FLOAT,
        pos: TerminalPos::new(0, 1, 13 - 8 * row),
        source: Some(Terminal::Node {
            node: NodeId(node),
            output: 0,
        }),
    };
    SyntaxNode {
        pos: GridPos::new(x, 0, 0),
        kind: NodeKind::Expr(ExprKind::Binary(BinaryOp::Add)),
        entries: SmallVec::new(),
        inputs: smallvec![input(0, lhs), input(1, rhs)],
        outputs: smallvec![out()],
        exits: SmallVec::new(),
    }
}

fn custom(x: u16, body: &Arc<SyntaxTree>) -> SyntaxNode {
    SyntaxNode {
        pos: GridPos::new(x, 0, 0),
        kind: NodeKind::Expr(ExprKind::Custom(CustomBlock {
            unit: body.unit,
            body: Arc::clone(body),
        })),
        entries: SmallVec::new(),
        inputs: SmallVec::new(),
        outputs: smallvec![out()],
        exits: SmallVec::new(),
    }
}

fn root(nodes: Vec<SyntaxNode>) -> Arc<SyntaxTree> {
    Arc::new(SyntaxTree::new(UnitId::ROOT, "root", nodes))
}

#[derive(Default)]
struct Record {
    order: Vec<u16>,
}

impl Rewriter for Record {
    fn rewrite_expr(&mut self, _: &RewriteCx<'_>, node: &SyntaxNode) -> Option<SyntaxNode> {
        self.order.push(node.pos.x);
        None
    }
}

#[derive(Default)]
struct DoubleConstants {
    calls: usize,
    seen_operands: Vec<f32>,
}

impl Rewriter for DoubleConstants {
    fn rewrite_expr(&mut self, cx: &RewriteCx<'_>, node: &SyntaxNode) -> Option<SyntaxNode> {
        self.calls += 1;
        if let NodeKind::Expr(ExprKind::Binary(_)) = node.kind {
            for input in node.input_nodes() {
                if let Some(outputs) = cx.node(input).constant() {
                    self.seen_operands.push(outputs[0].as_float());
                }
            }
            return None;
        }
        let value = node.constant()?.first()?.as_float();
        let mut doubled = node.clone();
        doubled.kind = NodeKind::Expr(ExprKind::Constant(smallvec![Value::Float(value * 2.0)]));
        Some(doubled)
    }
}

#[test]
fn inputs_are_rewritten_first() {
    let tree = root(vec![add(0, 1, 2), constant(1, 1.0), constant(2, 2.0)]);
    let mut record = Record::default();
    rewrite(&mut record, &tree);
    assert_eq!(record.order, vec![1, 2, 0]);
}

#[test]
fn unchanged_tree_is_shared() {
    let tree = root(vec![add(0, 1, 2), constant(1, 1.0), constant(2, 2.0)]);
    let rewritten = rewrite(&mut Record::default(), &tree);
    assert!(Arc::ptr_eq(&tree, &rewritten));
}

#[test]
fn hooks_see_rewritten_inputs() {
    let tree = root(vec![add(0, 1, 2), constant(1, 1.0), constant(2, 2.5)]);
    let mut double = DoubleConstants::default();
    let rewritten = rewrite(&mut double, &tree);
    assert_eq!(double.seen_operands, vec![2.0, 5.0]);
    assert!(!Arc::ptr_eq(&tree, &rewritten));
    assert_eq!(tree.node(NodeId(1)).constant().map(|o| o[0]), Some(Value::Float(1.0)));
    assert_eq!(rewritten.node(NodeId(1)).constant().map(|o| o[0]), Some(Value::Float(2.0)));
    assert_eq!(rewritten.node(NodeId(0)), tree.node(NodeId(0)));
}

#[test]
fn bodies_are_rewritten_once_per_unit() {
    let body = Arc::new(SyntaxTree::new(UnitId(600), "body", vec![constant(0, 3.0)]));
    let tree = root(vec![custom(0, &body), custom(1, &body)]);
    let mut double = DoubleConstants::default();
    let rewritten = rewrite(&mut double, &tree);

    // One body constant plus the two custom nodes.
    assert_eq!(double.calls, 3);
    let first = rewritten.node(NodeId(0)).custom().map(|b| Arc::clone(&b.body));
    let second = rewritten.node(NodeId(1)).custom().map(|b| Arc::clone(&b.body));
    let (Some(first), Some(second)) = (first, second) else {
        panic!("custom nodes lost their bodies");
    };
    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &body));
    assert_eq!(first.node(NodeId(0)).constant().map(|o| o[0]), Some(Value::Float(6.0)));
}
