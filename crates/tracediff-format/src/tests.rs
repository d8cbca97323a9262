use super::*;

const NESTEST_LINE_BNE: &str =
    "C72A  D0 E0     BNE $C70C                       A:AA X:00 Y:00 P:24 SP:FD PPU:  0,255 CYC:86";
const NESTEST_LINE_ILLEGAL: &str =
    "C6BD  04 A9    *NOP $A9 = 00                    A:AA X:97 Y:4E P:EF SP:F5 PPU:120,285 CYC:13706";

#[test]
fn test_parse_reference_sample() {
    let parser = ReferenceParser::nestest();
    let record = parser.parse(0, ReferenceLayout::NESTEST_SAMPLE).unwrap();

    assert_eq!(record.program_counter, 0xc000);
    assert_eq!(record.opcode, 0x4c);
    assert_eq!(record.operands, [0xf5, 0xc5]);
    assert_eq!(record.opcode_mnemonic, "JMP");
    assert_eq!(record.registers, Registers::new(0x00, 0x00, 0x00, 0x24, 0xfd));
    assert_eq!(record.cycle_count, 7);
}

#[test]
fn test_parse_reference_branch() {
    let record = ReferenceParser::nestest().parse(3, NESTEST_LINE_BNE).unwrap();

    assert_eq!(record.normalized_pc(), "c72a");
    assert_eq!(record.opcode, 0xd0);
    assert_eq!(record.operands, [0xe0]);
    assert_eq!(record.opcode_mnemonic, "BNE");
    assert_eq!(record.registers.a, 0xaa);
    assert_eq!(record.cycle_count, 86);
}

#[test]
fn test_parse_reference_illegal_opcode_marker() {
    let record = ReferenceParser::nestest()
        .parse(0, NESTEST_LINE_ILLEGAL)
        .unwrap();

    assert_eq!(record.opcode_mnemonic, "NOP");
    assert_eq!(record.operands, [0xa9]);
    assert_eq!(record.registers, Registers::new(0xaa, 0x97, 0x4e, 0xef, 0xf5));
    assert_eq!(record.cycle_count, 13706);
}

#[test]
fn test_parse_reference_pc_normalization() {
    let line = ReferenceLayout::NESTEST_SAMPLE.replacen("C000", "00A0", 1);
    let record = ReferenceParser::nestest().parse(0, &line).unwrap();
    assert_eq!(record.normalized_pc(), "a0");

    let lower = ReferenceLayout::NESTEST_SAMPLE.replacen("C000", "c000", 1);
    let record = ReferenceParser::nestest().parse(0, &lower).unwrap();
    assert_eq!(record.normalized_pc(), "c000");
}

#[test]
fn test_parse_reference_too_short() {
    let err = ReferenceParser::nestest()
        .parse(12, "C000  4C F5 C5  JMP $C5F5")
        .unwrap_err();

    assert_eq!(err.line, 12);
    assert_eq!(err.field, Field::Line);
    assert!(matches!(
        err.kind,
        ParseErrorKind::LineTooShort { len: 25, needed: 91 }
    ));
}

#[test]
fn test_parse_reference_bad_register_hex() {
    let line = ReferenceLayout::NESTEST_SAMPLE.replacen("X:00", "X:0G", 1);
    let err = ReferenceParser::nestest().parse(4, &line).unwrap_err();

    assert_eq!(err.line, 4);
    assert_eq!(err.field, Field::X);
    assert_eq!(err.kind, ParseErrorKind::InvalidHex("0G".to_string()));
}

#[test]
fn test_parse_reference_bad_cycles() {
    let line = ReferenceLayout::NESTEST_SAMPLE.replacen("CYC:7", "CYC:7x", 1);
    let err = ReferenceParser::nestest().parse(0, &line).unwrap_err();

    assert_eq!(err.field, Field::Cycles);
    assert_eq!(err.kind, ParseErrorKind::InvalidDecimal("7x".to_string()));
}

#[test]
fn test_parse_reference_non_ascii_does_not_panic() {
    let line = ReferenceLayout::NESTEST_SAMPLE.replacen("C000", "C0é", 1);
    let err = ReferenceParser::nestest().parse(0, &line).unwrap_err();
    assert_eq!(err.field, Field::ProgramCounter);
}

#[test]
fn test_layout_validates_nestest_sample() {
    assert!(
        ReferenceLayout::NESTEST
            .validate(ReferenceLayout::NESTEST_SAMPLE)
            .is_ok()
    );
}

#[test]
fn test_layout_off_by_one_rejected() {
    let layout = ReferenceLayout {
        x: 56..58,
        ..ReferenceLayout::NESTEST
    };
    let err = layout.validate(ReferenceLayout::NESTEST_SAMPLE).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::MissingLabel {
            field: Field::X,
            label: "X:",
            offset: 56
        }
    ));
}

#[test]
fn test_layout_infer_nestest() {
    let layout = ReferenceLayout::infer(ReferenceLayout::NESTEST_SAMPLE).unwrap();
    assert_eq!(layout, ReferenceLayout::NESTEST);

    let layout = ReferenceLayout::infer(NESTEST_LINE_ILLEGAL).unwrap();
    assert_eq!(layout, ReferenceLayout::NESTEST);
}

#[test]
fn test_layout_infer_shifted_columns() {
    // Two extra spaces before the register block.
    let sample = ReferenceLayout::NESTEST_SAMPLE.replacen(" A:00", "   A:00", 1);
    let parser = ReferenceParser::from_sample(&sample).unwrap();

    assert_eq!(parser.layout().a, 52..54);
    assert_eq!(parser.layout().cycles_start, 92);

    let line = NESTEST_LINE_BNE.replacen(" A:AA", "   A:AA", 1);
    let record = parser.parse(0, &line).unwrap();
    assert_eq!(record.registers.a, 0xaa);
    assert_eq!(record.cycle_count, 86);
}

#[test]
fn test_layout_infer_missing_label() {
    let sample = ReferenceLayout::NESTEST_SAMPLE.replacen("CYC:7", "", 1);
    assert_eq!(
        ReferenceLayout::infer(&sample).unwrap_err(),
        LayoutError::LabelNotFound("CYC:")
    );
}

#[test]
fn test_reference_parser_new_checks_sample() {
    assert!(
        ReferenceParser::new(ReferenceLayout::NESTEST, ReferenceLayout::NESTEST_SAMPLE).is_ok()
    );
    assert!(ReferenceParser::new(ReferenceLayout::NESTEST, "C000 JMP").is_err());
}

#[test]
fn test_parse_candidate() {
    let record = CandidateParser
        .parse(0, "c000|4c f5 c5|JMP $c5f5|00 00 00 fd|7|nvUbdIzc")
        .unwrap();

    assert_eq!(record.program_counter, 0xc000);
    assert_eq!(record.opcode, 0x4c);
    assert_eq!(record.operands, [0xf5, 0xc5]);
    assert_eq!(record.opcode_mnemonic, "JMP");
    assert_eq!(record.registers, Registers::new(0x00, 0x00, 0x00, 0x24, 0xfd));
    assert_eq!(record.cycle_count, 7);
}

#[test]
fn test_parse_candidate_padded_fields() {
    let record = CandidateParser
        .parse(0, " C72A | D0 E0 | bne $c70c | AA 00 00 FD | CYC:86 | ..U..I.. ")
        .unwrap();

    assert_eq!(record.normalized_pc(), "c72a");
    assert_eq!(record.opcode_mnemonic, "BNE");
    assert_eq!(record.registers, Registers::new(0xaa, 0x00, 0x00, 0x24, 0xfd));
    assert_eq!(record.cycle_count, 86);
}

#[test]
fn test_parse_candidate_missing_field() {
    let err = CandidateParser
        .parse(9, "c000|4c|JMP|00 00 00 fd|7")
        .unwrap_err();

    assert_eq!(err.line, 9);
    assert_eq!(err.field, Field::Line);
    assert_eq!(
        err.kind,
        ParseErrorKind::MissingFields {
            found: 5,
            expected: 6
        }
    );
}

#[test]
fn test_parse_candidate_register_count() {
    let err = CandidateParser
        .parse(0, "c000|4c|JMP|00 00 fd|7|nvUbdIzc")
        .unwrap_err();

    assert_eq!(err.field, Field::Registers);
    assert_eq!(
        err.kind,
        ParseErrorKind::MissingFields {
            found: 3,
            expected: 4
        }
    );
}

#[test]
fn test_parse_candidate_bad_hex_and_flags() {
    let err = CandidateParser
        .parse(0, "c00z|4c|JMP|00 00 00 fd|7|nvUbdIzc")
        .unwrap_err();
    assert_eq!(err.field, Field::ProgramCounter);

    let err = CandidateParser
        .parse(0, "c000|4c|JMP|00 00 100 fd|7|nvUbdIzc")
        .unwrap_err();
    assert_eq!(err.field, Field::Y);

    let err = CandidateParser
        .parse(0, "c000|4c|JMP|00 00 00 fd|7|nvUbdIz")
        .unwrap_err();
    assert_eq!(err.field, Field::P);
    assert_eq!(err.kind, ParseErrorKind::InvalidFlags("nvUbdIz".to_string()));
}

#[test]
fn test_flags_round_trip() {
    assert_eq!(format_flags(0x24), "nvUbdIzc");
    assert_eq!(format_flags(0xff), "NVUBDIZC");
    assert_eq!(parse_flags("nvUbdIzc"), Some(0x24));
    assert_eq!(parse_flags("..U..I.."), Some(0x24));
    assert_eq!(parse_flags("--U--I--"), Some(0x24));
    assert_eq!(parse_flags("nvUbdIzX"), None);
}

#[test]
fn test_record_display_parses_as_candidate() {
    let record = ReferenceParser::nestest()
        .parse(0, NESTEST_LINE_ILLEGAL)
        .unwrap();
    let line = record.to_string();

    assert_eq!(line, "c6bd|04 a9|NOP|aa 97 4e f5|13706|NVUbDIZC");
    assert_eq!(CandidateParser.parse(0, &line).unwrap(), record);
}

#[test]
fn test_format_tag_selects_parser() {
    let reference = TraceFormat::Reference
        .parser()
        .parse(0, ReferenceLayout::NESTEST_SAMPLE)
        .unwrap();
    let candidate = TraceFormat::Candidate
        .parser()
        .parse(0, "c000|4c f5 c5|JMP $c5f5|00 00 00 fd|7|nvUbdIzc")
        .unwrap();

    assert_eq!(reference, candidate);
    assert!(
        TraceFormat::Candidate
            .parser()
            .parse(0, ReferenceLayout::NESTEST_SAMPLE)
            .is_err()
    );
}
