//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// First instructions of the nestest golden log.
pub const NESTEST: &str = "\
C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7\n\
C5F5  A2 00     LDX #$00                        A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 30 CYC:10\n\
C5F7  86 00     STX $00 = 00                    A:00 X:00 Y:00 P:26 SP:FD PPU:  0, 36 CYC:12\n\
C5F9  86 10     STX $10 = 00                    A:00 X:00 Y:00 P:26 SP:FD PPU:  0, 45 CYC:15\n\
C5FB  86 11     STX $11 = 00                    A:00 X:00 Y:00 P:26 SP:FD PPU:  0, 54 CYC:18\n\
C5FD  20 2D C7  JSR $C72D                       A:00 X:00 Y:00 P:26 SP:FD PPU:  0, 63 CYC:21\n\
C72D  EA        NOP                             A:00 X:00 Y:00 P:26 SP:FB PPU:  0, 81 CYC:27\n\
C72E  38        SEC                             A:00 X:00 Y:00 P:26 SP:FB PPU:  0, 87 CYC:29\n\
C72F  B0 04     BCS $C735                       A:00 X:00 Y:00 P:27 SP:FB PPU:  0, 93 CYC:31\n\
C735  EA        NOP                             A:00 X:00 Y:00 P:27 SP:FB PPU:  0,102 CYC:34\n";

/// The same instructions as an emulator would log them.
pub const CANDIDATE: &str = "\
c000|4c f5 c5|JMP $c5f5|00 00 00 fd|7|nvUbdIzc\n\
c5f5|a2 00|LDX #$00|00 00 00 fd|10|nvUbdIzc\n\
c5f7|86 00|STX $00|00 00 00 fd|12|nvUbdIZc\n\
c5f9|86 10|STX $10|00 00 00 fd|15|nvUbdIZc\n\
c5fb|86 11|STX $11|00 00 00 fd|18|nvUbdIZc\n\
c5fd|20 2d c7|JSR $c72d|00 00 00 fd|21|nvUbdIZc\n\
c72d|ea|NOP|00 00 00 fb|27|nvUbdIZc\n\
c72e|38|SEC|00 00 00 fb|29|nvUbdIZc\n\
c72f|b0 04|BCS $c735|00 00 00 fb|31|nvUbdIZC\n\
c735|ea|NOP|00 00 00 fb|34|nvUbdIZC\n";

/// Write `contents` to `dir/name` and return the path.
pub fn write_trace(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write trace");
    path
}

/// Write a zstd-compressed copy of `contents` to `dir/name`.
pub fn write_zst_trace(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let compressed = zstd::encode_all(contents.as_bytes(), 0).expect("failed to compress trace");
    fs::write(&path, compressed).expect("failed to write trace");
    path
}

/// `CANDIDATE` with one line replaced.
pub fn candidate_with(line: usize, replacement: &str) -> String {
    CANDIDATE
        .lines()
        .enumerate()
        .map(|(i, l)| if i == line { replacement } else { l })
        .map(|l| format!("{l}\n"))
        .collect()
}
