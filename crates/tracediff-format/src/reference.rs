//! Fixed-column reference log parser.

use std::ops::Range;

use crate::layout::{LayoutError, ReferenceLayout};
use crate::{
    Field, ParseError, ParseErrorKind, Registers, Result, TraceParser, TraceRecord, parse_cycles,
    parse_hex,
};

/// Parser for the fixed-column nestest log format.
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    layout: ReferenceLayout,
}

impl ReferenceParser {
    /// Create a parser after validating `layout` against a known-good `sample` line.
    pub fn new(layout: ReferenceLayout, sample: &str) -> std::result::Result<Self, LayoutError> {
        layout.validate(sample)?;
        Ok(Self { layout })
    }

    /// Parser with the nestest layout.
    #[must_use]
    pub const fn nestest() -> Self {
        Self {
            layout: ReferenceLayout::NESTEST,
        }
    }

    /// Parser whose layout is inferred from a sample line.
    pub fn from_sample(sample: &str) -> std::result::Result<Self, LayoutError> {
        ReferenceLayout::infer(sample).map(|layout| Self { layout })
    }

    pub(crate) const fn unchecked(layout: ReferenceLayout) -> Self {
        Self { layout }
    }

    #[must_use]
    pub const fn layout(&self) -> &ReferenceLayout {
        &self.layout
    }

    pub(crate) fn parse_line(&self, line: usize, text: &str) -> Result<TraceRecord> {
        let layout = &self.layout;
        let needed = layout.min_len();
        if text.len() < needed {
            return Err(ParseError::new(
                line,
                Field::Line,
                ParseErrorKind::LineTooShort {
                    len: text.len(),
                    needed,
                },
            ));
        }

        let program_counter = parse_hex(
            line,
            Field::ProgramCounter,
            column(line, text, Field::ProgramCounter, &layout.pc)?,
        )?;
        let opcode = parse_hex(
            line,
            Field::Opcode,
            column(line, text, Field::Opcode, &layout.opcode)?,
        )?;
        let operands = column(line, text, Field::Opcode, &layout.operands)?
            .split_whitespace()
            .map(|byte| parse_hex(line, Field::Opcode, byte))
            .collect::<Result<Vec<u8>>>()?;

        let mnemonic = column(line, text, Field::Mnemonic, &layout.mnemonic)?
            .trim()
            .trim_start_matches('*');
        if mnemonic.is_empty() {
            return Err(ParseError::new(line, Field::Mnemonic, ParseErrorKind::Empty));
        }

        let registers = Registers {
            a: parse_hex(line, Field::A, column(line, text, Field::A, &layout.a)?)?,
            x: parse_hex(line, Field::X, column(line, text, Field::X, &layout.x)?)?,
            y: parse_hex(line, Field::Y, column(line, text, Field::Y, &layout.y)?)?,
            p: parse_hex(line, Field::P, column(line, text, Field::P, &layout.p)?)?,
            sp: parse_hex(line, Field::Sp, column(line, text, Field::Sp, &layout.sp)?)?,
        };

        let cycles = text.get(layout.cycles_start..).ok_or_else(|| {
            ParseError::new(
                line,
                Field::Cycles,
                ParseErrorKind::InvalidDecimal(text.to_string()),
            )
        })?;
        let cycle_count = parse_cycles(line, cycles)?;

        Ok(TraceRecord {
            program_counter,
            opcode,
            operands,
            opcode_mnemonic: mnemonic.to_ascii_uppercase(),
            registers,
            cycle_count,
        })
    }
}

impl Default for ReferenceParser {
    fn default() -> Self {
        Self::nestest()
    }
}

impl TraceParser for ReferenceParser {
    fn parse(&self, line: usize, text: &str) -> Result<TraceRecord> {
        self.parse_line(line, text)
    }
}

/// Slice a column; offsets that split a multi-byte character are treated as bad hex.
fn column<'a>(line: usize, text: &'a str, field: Field, range: &Range<usize>) -> Result<&'a str> {
    text.get(range.clone()).ok_or_else(|| {
        ParseError::new(
            line,
            field,
            ParseErrorKind::InvalidHex(String::from_utf8_lossy(
                text.as_bytes().get(range.clone()).unwrap_or_default(),
            )
            .into_owned()),
        )
    })
}
