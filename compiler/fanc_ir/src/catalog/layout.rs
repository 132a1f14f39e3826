//! Terminal layouts of block definitions.

use std::borrow::Cow;

use crate::grid::{Footprint, TerminalPos, MAX_FOOTPRINT};
use crate::unit::{Direction, ProgramUnit};
use crate::SignalKind;

/// One terminal of a block definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalDef {
    pub name: Cow<'static, str>,
    pub kind: SignalKind,
    pub pos: TerminalPos,
}

/// Terminal layout of a block definition.
///
/// Built-in statements list `Before` first among their inputs and `After`
/// first among their outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub footprint: Footprint,
    pub inputs: Vec<TerminalDef>,
    pub outputs: Vec<TerminalDef>,
}

impl Layout {
    /// Layout a custom block exposes: its body's declared terminals.
    pub fn of_unit(unit: &ProgramUnit) -> Layout {
        let defs = |direction: Direction| {
            unit.terminals
                .iter()
                .filter(|terminal| terminal.direction == direction)
                .map(|terminal| TerminalDef {
                    name: Cow::Owned(terminal.name.clone()),
                    kind: terminal.kind,
                    pos: terminal.pos,
                })
                .collect()
        };
        Layout {
            footprint: unit.footprint,
            inputs: defs(Direction::In),
            outputs: defs(Direction::Out),
        }
    }

    pub fn input_at(&self, pos: TerminalPos) -> Option<&TerminalDef> {
        self.inputs.iter().find(|def| def.pos == pos)
    }

    /// Output definition at `pos` together with its index among the
    /// non-void outputs.
    #[expect(clippy::cast_possible_truncation, reason = "blocks have few outputs")]
    pub fn value_output_at(&self, pos: TerminalPos) -> Option<(u8, &TerminalDef)> {
        self.outputs
            .iter()
            .filter(|def| !def.kind.is_void())
            .enumerate()
            .find(|(_, def)| def.pos == pos)
            .map(|(index, def)| (index as u8, def))
    }

    pub fn is_statement(&self) -> bool {
        self.inputs.iter().any(|def| def.kind.is_void())
            || self.outputs.iter().any(|def| def.kind.is_void())
    }
}

/// Builds a built-in layout from named terminals.
///
/// Inputs occupy rows on the left face and outputs (value outputs and extra
/// exits alike) rows on the right face, in declaration order. The block is
/// two cells wide when it has terminals on both faces and as deep as its
/// longest side.
pub struct LayoutBuilder {
    statement: bool,
    inputs: Vec<(&'static str, SignalKind)>,
    outputs: Vec<(&'static str, SignalKind)>,
}

impl LayoutBuilder {
    /// A statement: `Before` input and `After` exit are added implicitly.
    pub fn statement() -> Self {
        LayoutBuilder {
            statement: true,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn expression() -> Self {
        LayoutBuilder {
            statement: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    #[must_use]
    pub fn input(mut self, name: &'static str, kind: SignalKind) -> Self {
        self.inputs.push((name, kind));
        self
    }

    #[must_use]
    pub fn output(mut self, name: &'static str, kind: SignalKind) -> Self {
        self.outputs.push((name, kind));
        self
    }

    /// An extra void exit, placed among the outputs.
    #[must_use]
    pub fn exit(self, name: &'static str) -> Self {
        self.output(name, SignalKind::Void)
    }

    pub fn build(self) -> Layout {
        let rows = self.inputs.len().max(self.outputs.len()).max(1);
        let rows = u8::try_from(rows).unwrap_or(MAX_FOOTPRINT);
        let width = if self.inputs.is_empty() || self.outputs.is_empty() {
            1
        } else {
            2
        };
        let footprint = Footprint::new(width, 1, rows);

        let mut inputs = Vec::with_capacity(self.inputs.len() + 1);
        let mut outputs = Vec::with_capacity(self.outputs.len() + 1);
        if self.statement {
            inputs.push(def("Before", SignalKind::Void, TerminalPos::before(footprint)));
            outputs.push(def("After", SignalKind::Void, TerminalPos::AFTER));
        }
        for (row, (name, kind)) in (0u8..).zip(self.inputs) {
            if let Some(pos) = TerminalPos::input(row, footprint) {
                inputs.push(def(name, kind, pos));
            }
        }
        for (row, (name, kind)) in (0u8..).zip(self.outputs) {
            if let Some(pos) = TerminalPos::output(row, footprint) {
                outputs.push(def(name, kind, pos));
            }
        }
        Layout {
            footprint,
            inputs,
            outputs,
        }
    }
}

fn def(name: &'static str, kind: SignalKind, pos: TerminalPos) -> TerminalDef {
    TerminalDef {
        name: Cow::Borrowed(name),
        kind,
        pos,
    }
}
