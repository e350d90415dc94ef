use scudsp::isa::bus::{AluCommand, D1BusCommand, XBusCommand, YBusCommand};
use scudsp::tables::{AluOpcode, D1Destination, D1Source, XOpcode, XySource, YOpcode};
use scudsp::{Codec, Error, SymbolContext};

fn bits(s: &str) -> u32 {
    u32::from_str_radix(s, 2).unwrap()
}

fn parse<C: Codec>(tokens: &[&str]) -> scudsp::Result<C> {
    C::parse(tokens, &SymbolContext::new())
}

#[test]
fn alu_binary_and_text() {
    let cmd = AluCommand::decode(bits("0001")).unwrap();
    assert_eq!(cmd.opcode, AluOpcode::And);
    assert_eq!(cmd.encode(), bits("0001"));

    let cmd: AluCommand = parse(&["AD2"]).unwrap();
    assert_eq!(cmd.opcode, AluOpcode::Ad2);
    assert_eq!(cmd.render(), vec!["AD2"]);
}

#[test]
fn alu_reserved_opcode_is_unknown() {
    assert!(matches!(AluCommand::decode(bits("0111")), Err(Error::UnknownOpcode { .. })));
}

#[test]
fn d1_binary() {
    let cases = [
        ("00000000000000", D1BusCommand::Nop),
        ("01110100000011", D1BusCommand::MovImm { immediate: 3, destination: D1Destination::Ct1 }),
        ("11010000000010", D1BusCommand::MovSrc { source: D1Source::Ram2, destination: D1Destination::Rx }),
    ];
    for (raw, expected) in cases {
        let cmd = D1BusCommand::decode(bits(raw)).unwrap();
        assert_eq!(cmd, expected, "{raw}");
        assert_eq!(cmd.encode(), bits(raw), "{raw}");
    }
}

#[test]
fn d1_text() {
    let cmd: D1BusCommand = parse(&["MOV", "ALL", "WA0"]).unwrap();
    assert_eq!(cmd, D1BusCommand::MovSrc { source: D1Source::All, destination: D1Destination::Wa0 });
    assert_eq!(cmd.render(), vec!["MOV ALL,WA0"]);

    for imm in ["45", "#45", "0x2D", "$2D"] {
        let cmd: D1BusCommand = parse(&["MOV", imm, "WA0"]).unwrap();
        assert_eq!(cmd, D1BusCommand::MovImm { immediate: 45, destination: D1Destination::Wa0 });
        assert_eq!(cmd.render(), vec!["MOV #45,WA0"]);
    }
}

#[test]
fn d1_immediates_use_constants_and_stay_in_range() {
    let mut ctx = SymbolContext::new();
    ctx.register_constant("SIZE", 12).unwrap();
    let cmd = D1BusCommand::parse(&["MOV", "SIZE", "CT0"], &ctx).unwrap();
    assert_eq!(cmd, D1BusCommand::MovImm { immediate: 12, destination: D1Destination::Ct0 });

    assert!(matches!(parse::<D1BusCommand>(&["MOV", "256", "CT0"]), Err(Error::MalformedMnemonic { .. })));
    assert!(matches!(parse::<D1BusCommand>(&["MOV", "-1", "CT0"]), Err(Error::MalformedMnemonic { .. })));
    assert_eq!(parse::<D1BusCommand>(&["MOV", "NOPE", "CT0"]), Err(Error::UnknownSymbol("NOPE".into())));
}

#[test]
fn d1_register_that_is_not_a_source_is_malformed() {
    assert!(matches!(parse::<D1BusCommand>(&["MOV", "RX", "MC0"]), Err(Error::MalformedMnemonic { .. })));
    assert!(matches!(parse::<D1BusCommand>(&["MOV", "CT2", "MC0"]), Err(Error::MalformedMnemonic { .. })));
}

#[test]
fn y_binary() {
    let cases = [
        ("100110", YBusCommand::MovSrcY(XySource::Mc2)),
        ("011011", YBusCommand::MovSrcA(XySource::Ram3)),
        ("010000", YBusCommand::MovAluA),
        ("001000", YBusCommand::ClrA),
        ("000000", YBusCommand::Nop),
        ("110001", YBusCommand::MovSrcYAluA(XySource::Ram1)),
    ];
    for (raw, expected) in cases {
        let cmd = YBusCommand::decode(bits(raw)).unwrap();
        assert_eq!(cmd, expected, "{raw}");
        assert_eq!(cmd.encode(), bits(raw), "{raw}");
    }
}

#[test]
fn y_text() {
    let cases: [(&[&str], YBusCommand, &str); 5] = [
        (&["MOV", "MC2", "Y"], YBusCommand::MovSrcY(XySource::Mc2), "MOV MC2,Y"),
        (&["MOV", "RAM0", "A"], YBusCommand::MovSrcA(XySource::Ram0), "MOV RAM0,A"),
        (&["MOV", "ALU", "A"], YBusCommand::MovAluA, "MOV ALU,A"),
        (&["CLR", "A"], YBusCommand::ClrA, "CLR A"),
        (&["NOP"], YBusCommand::Nop, "NOP"),
    ];
    for (tokens, expected, text) in cases {
        let cmd: YBusCommand = parse(tokens).unwrap();
        assert_eq!(cmd, expected);
        assert_eq!(cmd.render(), vec![text]);
    }
}

#[test]
fn combined_y_renders_two_lines() {
    let out = YBusCommand::MovSrcYAluA(XySource::Ram1).render();
    assert_eq!(out.len(), 2);
    assert!(out.contains(&"MOV ALU,A".to_string()));
    assert!(out.contains(&"MOV RAM1,Y".to_string()));
}

#[test]
fn x_binary() {
    let cases = [
        ("011110", XBusCommand::MovSrcP(XySource::Mc2)),
        ("100011", XBusCommand::MovSrcX(XySource::Ram3)),
        ("010000", XBusCommand::MovMulP),
        ("000000", XBusCommand::Nop),
        ("110001", XBusCommand::MovSrcXMulP(XySource::Ram1)),
    ];
    for (raw, expected) in cases {
        let cmd = XBusCommand::decode(bits(raw)).unwrap();
        assert_eq!(cmd, expected, "{raw}");
        assert_eq!(cmd.encode(), bits(raw), "{raw}");
    }
}

#[test]
fn x_text() {
    let cmd: XBusCommand = parse(&["MOV", "MC2", "X"]).unwrap();
    assert_eq!(cmd, XBusCommand::MovSrcX(XySource::Mc2));
    assert_eq!(cmd.render(), vec!["MOV MC2,X"]);
    let cmd: XBusCommand = parse(&["MOV", "MUL", "P"]).unwrap();
    assert_eq!(cmd, XBusCommand::MovMulP);
    assert_eq!(cmd.render(), vec!["MOV MUL,P"]);
    assert!(matches!(parse::<XBusCommand>(&["MOV", "ALL", "X"]), Err(Error::MalformedMnemonic { .. })));
}

#[test]
fn merges_commute_and_reject_other_pairs() {
    let x = XBusCommand::MovSrcX(XySource::Ram1);
    assert_eq!(x.merge(XBusCommand::MovMulP), XBusCommand::MovMulP.merge(x));
    assert_eq!(x.merge(XBusCommand::MovMulP), Some(XBusCommand::MovSrcXMulP(XySource::Ram1)));
    assert_eq!(x.merge(XBusCommand::MovSrcP(XySource::Ram0)), None);

    let y = YBusCommand::MovSrcY(XySource::Mc0);
    assert_eq!(YBusCommand::MovAluA.merge(y), Some(YBusCommand::MovSrcYAluA(XySource::Mc0)));
    assert_eq!(y.merge(YBusCommand::MovSrcY(XySource::Mc1)), None);
    assert_eq!(YBusCommand::ClrA.merge(YBusCommand::MovAluA), None);
}

#[test]
fn alu_space() {
    for raw in 0..16u32 {
        match AluCommand::decode(raw) {
            Ok(cmd) => assert_eq!(cmd.encode(), raw),
            Err(e) => assert!(matches!(e, Error::UnknownOpcode { .. }), "{raw:04b}"),
        }
    }
    for op in AluOpcode::ALL {
        let cmd = AluCommand { opcode: *op };
        assert_eq!(AluCommand::decode(cmd.encode()).unwrap(), cmd);
    }
}

/// Every 6-bit pattern a bus slot can legally hold: operand-free opcodes
/// carry a zero source field.
fn xy_patterns(opcode_bits: u32, takes_source: bool) -> Vec<u32> {
    if takes_source {
        XySource::ALL.iter().map(|s| (opcode_bits << 3) | s.bits()).collect()
    } else {
        vec![opcode_bits << 3]
    }
}

#[test]
fn x_bus_space() {
    let mut legal = Vec::new();
    for op in XOpcode::ALL {
        let takes_source = !matches!(op, XOpcode::Nop | XOpcode::MovMulP);
        legal.extend(xy_patterns(op.bits(), takes_source));
    }
    for &raw in &legal {
        let cmd = XBusCommand::decode(raw).unwrap();
        assert_eq!(cmd.encode(), raw, "{raw:06b}");
    }
    for raw in 0..64u32 {
        if let Ok(cmd) = XBusCommand::decode(raw) {
            assert_eq!(XBusCommand::decode(cmd.encode()).unwrap(), cmd, "{raw:06b}");
        } else {
            assert!(!legal.contains(&raw));
        }
    }
}

#[test]
fn y_bus_space() {
    let mut legal = Vec::new();
    for op in YOpcode::ALL {
        let takes_source = !matches!(op, YOpcode::Nop | YOpcode::ClrA | YOpcode::MovAluA);
        legal.extend(xy_patterns(op.bits(), takes_source));
    }
    for &raw in &legal {
        let cmd = YBusCommand::decode(raw).unwrap();
        assert_eq!(cmd.encode(), raw, "{raw:06b}");
    }
    for raw in 0..64u32 {
        if let Ok(cmd) = YBusCommand::decode(raw) {
            assert_eq!(YBusCommand::decode(cmd.encode()).unwrap(), cmd, "{raw:06b}");
        } else {
            assert!(!legal.contains(&raw));
        }
    }
}

#[test]
fn d1_bus_space() {
    let mut legal = vec![0u32];
    for dst in D1Destination::ALL {
        for imm in 0..=0xFFu32 {
            legal.push((0b01 << 12) | (dst.bits() << 8) | imm);
        }
        for src in D1Source::ALL {
            legal.push((0b11 << 12) | (dst.bits() << 8) | src.bits());
        }
    }
    for &raw in &legal {
        let cmd = D1BusCommand::decode(raw).unwrap();
        assert_eq!(cmd.encode(), raw, "{raw:014b}");
    }
    for raw in 0..(1u32 << 14) {
        if let Ok(cmd) = D1BusCommand::decode(raw) {
            assert_eq!(D1BusCommand::decode(cmd.encode()).unwrap(), cmd, "{raw:014b}");
        }
    }
}
