use std::fmt;

use crate::flags::format_flags;

/// CPU register file at an instruction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    /// Processor status.
    pub p: u8,
    pub sp: u8,
}

impl Registers {
    #[must_use]
    pub const fn new(a: u8, x: u8, y: u8, p: u8, sp: u8) -> Self {
        Self { a, x, y, p, sp }
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
            self.a, self.x, self.y, self.p, self.sp
        )
    }
}

/// One decoded trace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub program_counter: u16,
    /// First instruction byte.
    pub opcode: u8,
    /// Remaining instruction bytes, at most two.
    pub operands: Vec<u8>,
    /// Uppercase mnemonic; diagnostics only, never compared.
    pub opcode_mnemonic: String,
    pub registers: Registers,
    /// Absolute cycle counter reported by the trace source.
    pub cycle_count: u64,
}

impl TraceRecord {
    /// Program counter as lowercase hex without leading zeros.
    #[must_use]
    pub fn normalized_pc(&self) -> String {
        format!("{:x}", self.program_counter)
    }
}

/// Renders the record as a candidate-format line.
impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.registers;
        write!(f, "{:04x}|{:02x}", self.program_counter, self.opcode)?;
        for byte in &self.operands {
            write!(f, " {byte:02x}")?;
        }
        write!(
            f,
            "|{}|{:02x} {:02x} {:02x} {:02x}|{}|{}",
            self.opcode_mnemonic,
            r.a,
            r.x,
            r.y,
            r.sp,
            self.cycle_count,
            format_flags(r.p)
        )
    }
}
