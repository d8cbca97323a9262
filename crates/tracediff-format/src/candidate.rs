//! Pipe-separated candidate log parser.
//!
//! `PC | BYTES | MNEMONIC [OPERAND] | A X Y SP | CYCLES | FLAGS`, e.g.
//! `c000|4c f5 c5|JMP $c5f5|00 00 00 fd|7|nvUbdIzc`.

use crate::{
    Field, ParseError, ParseErrorKind, Registers, Result, TraceParser, TraceRecord, parse_cycles,
    parse_flags, parse_hex,
};

const FIELD_COUNT: usize = 6;
const REGISTER_TOKENS: usize = 4;
const MAX_INSTRUCTION_BYTES: usize = 3;

/// Parser for the pipe-separated emulator log format.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateParser;

impl TraceParser for CandidateParser {
    fn parse(&self, line: usize, text: &str) -> Result<TraceRecord> {
        let fields: Vec<&str> = text.split('|').map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(ParseError::new(
                line,
                Field::Line,
                ParseErrorKind::MissingFields {
                    found: fields.len(),
                    expected: FIELD_COUNT,
                },
            ));
        }

        let program_counter = parse_hex(line, Field::ProgramCounter, fields[0])?;

        let bytes: Vec<&str> = fields[1].split_whitespace().collect();
        if bytes.is_empty() || bytes.len() > MAX_INSTRUCTION_BYTES {
            return Err(ParseError::new(
                line,
                Field::Opcode,
                ParseErrorKind::MissingFields {
                    found: bytes.len(),
                    expected: MAX_INSTRUCTION_BYTES,
                },
            ));
        }
        let opcode = parse_hex(line, Field::Opcode, bytes[0])?;
        let operands = bytes[1..]
            .iter()
            .map(|byte| parse_hex(line, Field::Opcode, byte))
            .collect::<Result<Vec<u8>>>()?;

        let mnemonic = fields[2]
            .split_whitespace()
            .next()
            .ok_or_else(|| ParseError::new(line, Field::Mnemonic, ParseErrorKind::Empty))?;

        let regs: Vec<&str> = fields[3].split_whitespace().collect();
        let &[a, x, y, sp] = regs.as_slice() else {
            return Err(ParseError::new(
                line,
                Field::Registers,
                ParseErrorKind::MissingFields {
                    found: regs.len(),
                    expected: REGISTER_TOKENS,
                },
            ));
        };
        let a = parse_hex(line, Field::A, a)?;
        let x = parse_hex(line, Field::X, x)?;
        let y = parse_hex(line, Field::Y, y)?;
        let sp = parse_hex(line, Field::Sp, sp)?;

        let cycles = fields[4];
        let cycle_count = parse_cycles(line, cycles.strip_prefix("CYC:").unwrap_or(cycles))?;

        let p = parse_flags(fields[5]).ok_or_else(|| {
            ParseError::new(
                line,
                Field::P,
                ParseErrorKind::InvalidFlags(fields[5].to_string()),
            )
        })?;

        Ok(TraceRecord {
            program_counter,
            opcode,
            operands,
            opcode_mnemonic: mnemonic.to_ascii_uppercase(),
            registers: Registers { a, x, y, p, sp },
            cycle_count,
        })
    }
}
