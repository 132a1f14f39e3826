//! Property-based tests for the block graph parser.
//!
//! Random grids of built-in blocks with random wires between real terminals.
//! Many of them fail to parse (kind mismatches, cycles, doubled inputs);
//! the properties hold either way:
//! 1. Determinism: parsing the same unit twice gives equal results.
//! 2. Entry points come out in grid scan order.
//! 3. Every node's wired inputs point at nodes of the same tree.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use fanc_ir::{
    BinaryOp, Builtin, Catalog, Connection, GridPos, GridSize, ProgramUnit, SettingValue,
    TerminalAddress, Terminal, UnaryOp, ValueKind,
};
use fanc_parse::{parse, ParseOptions};
use proptest::prelude::*;

const PALETTE: [Builtin; 8] = [
    Builtin::Inspect(ValueKind::Float),
    Builtin::Number,
    Builtin::Unary(UnaryOp::Negate),
    Builtin::Binary(BinaryOp::Add),
    Builtin::Binary(BinaryOp::Less),
    Builtin::If,
    Builtin::Loop,
    Builtin::Win,
];

const SIZE: GridSize = GridSize::new(3, 2, 3);

/// `(cell, palette index)` placements and `(from, to, from pin, to pin)`
/// wires, all as raw indices resolved against the placed blocks.
fn unit_strategy() -> impl Strategy<Value = ProgramUnit> {
    let cells = SIZE.volume();
    (
        prop::collection::vec((0..cells, 0..PALETTE.len()), 1..10),
        prop::collection::vec((0usize..32, 0usize..32, 0usize..4, 0usize..4), 0..14),
    )
        .prop_map(|(placements, wires)| build_unit(&placements, &wires))
}

fn build_unit(placements: &[(usize, usize)], wires: &[(usize, usize, usize, usize)]) -> ProgramUnit {
    let positions: Vec<GridPos> = SIZE.scan().collect();
    let mut unit = ProgramUnit::new("random", SIZE);
    for &(cell, block) in placements {
        let pos = positions[cell];
        unit.place(pos, PALETTE[block].id());
        if PALETTE[block] == Builtin::Number {
            unit.setting(pos, 0, SettingValue::Float(f32::from(u16::try_from(cell).unwrap_or_default())));
        }
    }

    let placed: Vec<(GridPos, Builtin)> = unit
        .grid
        .blocks()
        .map(|(pos, id)| (pos, Builtin::from_id(id).unwrap()))
        .collect();
    for &(from, to, from_pin, to_pin) in wires {
        let (from_pos, from_block) = placed[from % placed.len()];
        let (to_pos, to_block) = placed[to % placed.len()];
        let (from_layout, to_layout) = (from_block.layout(), to_block.layout());
        if from_layout.outputs.is_empty() || to_layout.inputs.is_empty() {
            continue;
        }
        let out = &from_layout.outputs[from_pin % from_layout.outputs.len()];
        let input = &to_layout.inputs[to_pin % to_layout.inputs.len()];
        unit.connect(Connection::new(
            TerminalAddress::new(from_pos, out.pos),
            TerminalAddress::new(to_pos, input.pos),
        ));
    }
    unit
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn parsing_is_deterministic(unit in unit_strategy()) {
        let catalog = Catalog::new();
        let options = ParseOptions::default();
        let first = parse(&unit, &catalog, &options);
        let second = parse(&unit, &catalog, &options);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(&a.tree, &b.tree);
                prop_assert_eq!(a.program, b.program);
                prop_assert_eq!(a.warnings, b.warnings);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "outcomes differ: {:?} vs {:?}", a.is_ok(), b.is_ok()),
        }
    }

    #[test]
    fn entry_points_are_in_scan_order(unit in unit_strategy()) {
        let Ok(output) = parse(&unit, &Catalog::new(), &ParseOptions::default()) else {
            return Ok(());
        };
        let order: Vec<GridPos> = SIZE.scan().collect();
        let ranks: Vec<usize> = output
            .tree
            .entry_points
            .iter()
            .map(|entry| order.iter().position(|pos| *pos == entry.pos).unwrap())
            .collect();
        prop_assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn wired_inputs_stay_in_tree(unit in unit_strategy()) {
        let Ok(output) = parse(&unit, &Catalog::new(), &ParseOptions::default()) else {
            return Ok(());
        };
        let tree = &output.tree;
        for (_, node) in tree.nodes() {
            for input in &node.inputs {
                if let Some(Terminal::Node { node: source, output }) = input.source {
                    let source = tree.get(source).unwrap();
                    prop_assert!(usize::from(output) < source.outputs.len());
                }
            }
        }
    }
}
