//! Column layout of the fixed-width reference log.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::reference::ReferenceParser;
use crate::{Field, ParseError};

/// Reference layout errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("field `{field}` at offset {offset} is not preceded by {label:?} in the sample line")]
    MissingLabel {
        field: Field,
        label: &'static str,
        offset: usize,
    },
    #[error("label {0:?} not found in sample line")]
    LabelNotFound(&'static str),
    #[error("sample line does not parse with this layout: {0}")]
    Sample(#[from] ParseError),
}

/// Byte offsets of each field in a reference log line.
///
/// Register fields are two hex digits. The cycle counter runs from
/// `cycles_start` to the end of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLayout {
    pub pc: Range<usize>,
    pub opcode: Range<usize>,
    /// Operand bytes after the opcode, space separated.
    pub operands: Range<usize>,
    pub mnemonic: Range<usize>,
    pub a: Range<usize>,
    pub x: Range<usize>,
    pub y: Range<usize>,
    pub p: Range<usize>,
    pub sp: Range<usize>,
    pub cycles_start: usize,
}

impl ReferenceLayout {
    /// Layout of the nestest.log golden trace.
    pub const NESTEST: Self = Self {
        pc: 0..4,
        opcode: 6..8,
        operands: 9..14,
        mnemonic: 16..19,
        a: 50..52,
        x: 55..57,
        y: 60..62,
        p: 65..67,
        sp: 71..73,
        cycles_start: 90,
    };

    /// First line of nestest.log.
    pub const NESTEST_SAMPLE: &'static str =
        "C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7";

    /// Register fields with the label that precedes each one.
    fn labelled_fields(&self) -> [(Field, &'static str, usize); 6] {
        [
            (Field::A, "A:", self.a.start),
            (Field::X, "X:", self.x.start),
            (Field::Y, "Y:", self.y.start),
            (Field::P, "P:", self.p.start),
            (Field::Sp, "SP:", self.sp.start),
            (Field::Cycles, "CYC:", self.cycles_start),
        ]
    }

    /// Minimum line length this layout can decode.
    #[must_use]
    pub fn min_len(&self) -> usize {
        [
            self.pc.end,
            self.opcode.end,
            self.operands.end,
            self.mnemonic.end,
            self.a.end,
            self.x.end,
            self.y.end,
            self.p.end,
            self.sp.end,
            self.cycles_start + 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Check the layout against a known-good sample line.
    pub fn validate(&self, sample: &str) -> Result<(), LayoutError> {
        for (field, label, offset) in self.labelled_fields() {
            let preceding = offset
                .checked_sub(label.len())
                .and_then(|start| sample.get(start..offset));
            if preceding != Some(label) {
                return Err(LayoutError::MissingLabel {
                    field,
                    label,
                    offset,
                });
            }
        }
        ReferenceParser::unchecked(self.clone()).parse_line(0, sample)?;
        Ok(())
    }

    /// Derive register and cycle offsets by locating their labels in `sample`.
    ///
    /// The program counter, instruction byte and mnemonic columns keep their nestest
    /// positions. The inferred layout is validated before it is returned.
    pub fn infer(sample: &str) -> Result<Self, LayoutError> {
        let pattern = LABEL_PATTERN.get_or_init(|| {
            Regex::new(r"\b(A|X|Y|P|SP|CYC):([0-9A-Fa-f]+)").expect("label pattern is valid")
        });

        let mut offsets: [Option<usize>; 6] = [None; 6];
        for caps in pattern.captures_iter(sample) {
            let (Some(label), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let slot = match label.as_str() {
                "A" => 0,
                "X" => 1,
                "Y" => 2,
                "P" => 3,
                "SP" => 4,
                _ => 5,
            };
            // First occurrence wins.
            offsets[slot].get_or_insert(value.start());
        }

        let labels = ["A:", "X:", "Y:", "P:", "SP:", "CYC:"];
        let mut found = [0usize; 6];
        for (i, offset) in offsets.into_iter().enumerate() {
            found[i] = offset.ok_or(LayoutError::LabelNotFound(labels[i]))?;
        }
        let [a, x, y, p, sp, cycles_start] = found;

        let layout = Self {
            a: a..a + 2,
            x: x..x + 2,
            y: y..y + 2,
            p: p..p + 2,
            sp: sp..sp + 2,
            cycles_start,
            ..Self::NESTEST
        };
        layout.validate(sample)?;
        Ok(layout)
    }
}

impl Default for ReferenceLayout {
    fn default() -> Self {
        Self::NESTEST
    }
}

static LABEL_PATTERN: OnceLock<Regex> = OnceLock::new();
