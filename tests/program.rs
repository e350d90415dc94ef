use pretty_assertions::assert_eq;

use bitvec::prelude::*;
use scudsp::{Error, Instruction, ListingConfig, Program};

#[test]
fn thirteen_words_ending_in_endi() {
    let mut bytes = vec![0u8; 12 * 4];
    bytes.extend_from_slice(&0xF800_0000u32.to_be_bytes());
    let program = Program::from_bytes(&bytes).unwrap();
    assert_eq!(program.len(), 13);
    assert!(program.instructions()[..12].iter().all(|i| *i == Instruction::default()));
    assert_eq!(program.instructions()[12].to_text(), vec!["ENDI"]);
    assert_eq!(program.to_bytes(), bytes);
}

#[test]
fn errors_carry_the_source_line() {
    let src = "; demo\nNOP\n\nMOV RAM2,Y   MOV RAM1,Y\nEND\n";
    let err = Program::from_text(src).unwrap_err();
    assert_eq!(err.line(), Some(4));
    assert!(matches!(err.kind(), Error::IncompatibleCommands { .. }));
    let msg = err.to_string();
    assert!(msg.starts_with("line 4:"), "{msg}");
    assert!(msg.contains("MOV RAM2 Y MOV RAM1 Y"), "{msg}");
}

#[test]
fn forward_references_resolve_in_pass_two() {
    let src = "\
        JMP #TARGET\n\
        NOP\n\
        TARGET: MVI #TARGET,PC,NZ\n\
        END\n";
    let program = Program::from_text(src).unwrap();
    assert_eq!(program.context().resolve_label("TARGET"), Ok(2));
    assert_eq!(program.words()[0], 0xD000_0002);
    assert_eq!(program.instructions()[2].to_text(), vec!["MVI #2,PC,NZ"]);
}

#[test]
fn unknown_symbols_fail_the_whole_program() {
    let err = Program::from_text("NOP\nJMP NOWHERE\n").unwrap_err();
    assert_eq!(err.kind(), &Error::UnknownSymbol("NOWHERE".into()));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn constants_feed_immediates() {
    let src = "COUNT=12\nMOV COUNT,CT0\nDMA D0,MC2,COUNT\n";
    let program = Program::from_text(src).unwrap();
    assert_eq!(program.len(), 2);
    assert_eq!(program.instructions()[0].to_text(), vec!["NOP", "NOP", "NOP", "MOV #12,CT0"]);
    assert_eq!(program.instructions()[1].to_text(), vec!["DMA D0,MC2,12"]);
}

#[test]
fn size_limits() {
    let full = "NOP\n".repeat(256);
    assert_eq!(Program::from_text(&full).unwrap().len(), 256);
    let over = "NOP\n".repeat(257);
    assert_eq!(Program::from_text(&over), Err(Error::ProgramTooLarge { count: 257 }));
}

#[test]
fn binary_length_must_be_whole_words() {
    let bits = bitvec![u8, Msb0; 0; 40];
    assert!(matches!(Program::from_binary(&bits), Err(Error::MalformedInput(_))));
    assert!(matches!(Program::from_bytes(&[0, 0, 0]), Err(Error::MalformedInput(_))));
    assert!(Program::from_bytes(&[]).unwrap().is_empty());
}

#[test]
fn binary_is_thirty_two_bits_per_instruction() {
    let program = Program::from_text("AND\nEND\nLPS\n").unwrap();
    let bits = program.to_binary();
    assert_eq!(bits.len(), 32 * program.len());
    assert_eq!(Program::from_binary(&bits).unwrap().words(), program.words());
}

#[test]
fn one_bad_word_fails_decoding() {
    let mut bytes = 0u32.to_be_bytes().to_vec();
    bytes.extend_from_slice(&0x4000_0000u32.to_be_bytes());
    assert_eq!(Program::from_bytes(&bytes), Err(Error::UnknownInstructionFormat { word: 0x4000_0000 }));
}

#[test]
fn decompiled_listing_names_branch_targets() {
    let words: [u32; 4] = [0x0400_0000, 0xD208_0000, 0x8000_0000 | (0b1100 << 26) | 3, 0xF000_0000];
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
    let program = Program::from_bytes(&bytes).unwrap();
    assert_eq!(program.context().labels_at(0), vec!["L00"]);
    assert_eq!(program.context().labels_at(3), vec!["L03"]);

    let listing = program.to_text();
    assert_eq!(listing, "L00:\nAND\t\tNOP\t\tNOP\t\tNOP\nJMP NZ,L00\nMVI L03,PC\nL03:\nEND\n");

    let again = Program::from_text(&listing).unwrap();
    assert_eq!(again.words(), words.to_vec());
}

#[test]
fn auto_labels_can_be_turned_off() {
    let cfg = ListingConfig { auto_labels: false, ..ListingConfig::default() };
    let bytes = 0xD000_0000u32.to_be_bytes();
    let program = Program::from_bytes_with(&bytes, &cfg).unwrap();
    assert!(program.context().labels().is_empty());
    assert_eq!(program.listing(&cfg), "JMP 0\n");
}

#[test]
fn targets_outside_the_program_stay_numeric() {
    let bytes = 0xD000_0040u32.to_be_bytes();
    let program = Program::from_bytes(&bytes).unwrap();
    assert!(program.context().labels().is_empty());
    assert_eq!(program.to_text(), "JMP 64\n");
}

#[test]
fn text_round_trip() {
    let src = "\
        ; multiply-accumulate loop\n\
        N = 4\n\
        START:\n\
        MVI #N,LOP\n\
        LOOP: MOV MC0,X MOV MUL,P MOV MC1,Y MOV ALU,A AD2\n\
        MOV ALL,MC2 CLR A\n\
        JMP T0,LOOP\n\
        DMAH MC2,D0,N\n\
        BTM\n\
        ENDI\n";
    let program = Program::from_text(src).unwrap();
    let listing = program.to_text();
    let again = Program::from_text(&listing).unwrap();
    assert_eq!(again.words(), program.words());
    assert_eq!(again.to_text(), listing);
}

#[test]
fn listing_config_reads_from_json() {
    let cfg: ListingConfig = serde_json::from_str(r#"{ "column_width": 24 }"#).unwrap();
    assert_eq!(cfg, ListingConfig { column_width: 24, ..ListingConfig::default() });
    let program = Program::from_text("AND MOV #1,MC0\n").unwrap();
    assert_eq!(program.listing(&cfg), "AND\t\t\tNOP\t\t\tNOP\t\t\tMOV #1,MC0\n");
}

#[test]
fn equals_sign_in_a_trailing_comment_is_not_a_constant() {
    let program = Program::from_text("MOV RAM0,X ; acc = acc + x\nEND\n").unwrap();
    assert_eq!(program.len(), 2);
    assert!(program.context().constants().is_empty());
    let program = Program::from_text("N = 2 ; count = two\nMOV N,CT0\n").unwrap();
    assert_eq!(program.context().resolve_constant("N"), Ok(2));
}
