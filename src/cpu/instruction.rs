// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::fmt;

use crate::cpu::{Cpu, Operand};

// Design:
//   Decoding maps an opcode to an Instruction variant, fetching operand
//   bytes in the process. The base cycle count comes from the canonical
//   6502 timing table below; addressing-mode and branch penalties are
//   accounted separately by the CPU. Undocumented opcodes halt the machine;
//   well-behaved guest software never reaches them and continuing after one
//   would silently corrupt the guest.

pub enum Instruction {
    // Data Movement
    LDA(Operand),
    LDX(Operand),
    LDY(Operand),
    STA(Operand),
    STX(Operand),
    STY(Operand),
    TAX,
    TAY,
    TSX,
    TXA,
    TXS,
    TYA,
    PHA,
    PHP,
    PLA,
    PLP,
    // Arithmetic
    ADC(Operand),
    SBC(Operand),
    CMP(Operand),
    CPX(Operand),
    CPY(Operand),
    DEC(Operand),
    DEX,
    DEY,
    INC(Operand),
    INX,
    INY,
    // Logical
    AND(Operand),
    EOR(Operand),
    ORA(Operand),
    BIT(Operand),
    // Shift and Rotate
    ASL(Operand),
    LSR(Operand),
    ROL(Operand),
    ROR(Operand),
    // Control Flow
    BCC(Operand),
    BCS(Operand),
    BEQ(Operand),
    BMI(Operand),
    BNE(Operand),
    BPL(Operand),
    BVC(Operand),
    BVS(Operand),
    JMP(Operand),
    JSR(Operand),
    RTS,
    RTI,
    BRK,
    // Flags
    CLC,
    CLD,
    CLI,
    CLV,
    SEC,
    SED,
    SEI,
    NOP,
}

// Base execution times per opcode, from 65xx Processor Data
// (http://www.romhacking.net/documents/318/). Zero marks an undocumented
// opcode.
#[rustfmt::skip]
const BASE_CYCLES: [u8; 256] = [
    7, 6, 0, 0, 0, 3, 5, 0, 3, 2, 2, 0, 0, 4, 6, 0, // 0x00
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 0x10
    6, 6, 0, 0, 3, 3, 5, 0, 4, 2, 2, 0, 4, 4, 6, 0, // 0x20
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 0x30
    6, 6, 0, 0, 0, 3, 5, 0, 3, 2, 2, 0, 3, 4, 6, 0, // 0x40
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 0x50
    6, 6, 0, 0, 0, 3, 5, 0, 4, 2, 2, 0, 5, 4, 6, 0, // 0x60
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 0x70
    0, 6, 0, 0, 3, 3, 3, 0, 2, 0, 2, 0, 4, 4, 4, 0, // 0x80
    2, 6, 0, 0, 4, 4, 4, 0, 2, 5, 2, 0, 0, 5, 0, 0, // 0x90
    2, 6, 2, 0, 3, 3, 3, 0, 2, 2, 2, 0, 4, 4, 4, 0, // 0xa0
    2, 5, 0, 0, 4, 4, 4, 0, 2, 4, 2, 0, 4, 4, 4, 0, // 0xb0
    2, 6, 0, 0, 3, 3, 5, 0, 2, 2, 2, 0, 4, 4, 6, 0, // 0xc0
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 0xd0
    2, 6, 0, 0, 3, 3, 5, 0, 2, 2, 2, 0, 4, 4, 6, 0, // 0xe0
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 0xf0
];

impl Instruction {
    pub fn base_cycles(opcode: u8) -> u32 {
        BASE_CYCLES[opcode as usize] as u32
    }

    pub fn decode(cpu: &mut Cpu, opcode: u8) -> Instruction {
        match opcode {
            0x00 => Instruction::BRK,
            0x01 => Instruction::ORA(Operand::IndirectX(cpu.fetch_byte())),
            0x05 => Instruction::ORA(Operand::ZeroPage(cpu.fetch_byte())),
            0x06 => Instruction::ASL(Operand::ZeroPage(cpu.fetch_byte())),
            0x08 => Instruction::PHP,
            0x09 => Instruction::ORA(Operand::Immediate(cpu.fetch_byte())),
            0x0a => Instruction::ASL(Operand::Accumulator),
            0x0d => Instruction::ORA(Operand::Absolute(cpu.fetch_word())),
            0x0e => Instruction::ASL(Operand::Absolute(cpu.fetch_word())),
            0x10 => Instruction::BPL(Operand::Relative(cpu.fetch_byte() as i8)),
            0x11 => Instruction::ORA(Operand::IndirectY(cpu.fetch_byte())),
            0x15 => Instruction::ORA(Operand::ZeroPageX(cpu.fetch_byte())),
            0x16 => Instruction::ASL(Operand::ZeroPageX(cpu.fetch_byte())),
            0x18 => Instruction::CLC,
            0x19 => Instruction::ORA(Operand::AbsoluteY(cpu.fetch_word())),
            0x1d => Instruction::ORA(Operand::AbsoluteX(cpu.fetch_word())),
            0x1e => Instruction::ASL(Operand::AbsoluteX(cpu.fetch_word())),
            0x20 => Instruction::JSR(Operand::Absolute(cpu.fetch_word())),
            0x21 => Instruction::AND(Operand::IndirectX(cpu.fetch_byte())),
            0x24 => Instruction::BIT(Operand::ZeroPage(cpu.fetch_byte())),
            0x25 => Instruction::AND(Operand::ZeroPage(cpu.fetch_byte())),
            0x26 => Instruction::ROL(Operand::ZeroPage(cpu.fetch_byte())),
            0x28 => Instruction::PLP,
            0x29 => Instruction::AND(Operand::Immediate(cpu.fetch_byte())),
            0x2a => Instruction::ROL(Operand::Accumulator),
            0x2c => Instruction::BIT(Operand::Absolute(cpu.fetch_word())),
            0x2d => Instruction::AND(Operand::Absolute(cpu.fetch_word())),
            0x2e => Instruction::ROL(Operand::Absolute(cpu.fetch_word())),
            0x30 => Instruction::BMI(Operand::Relative(cpu.fetch_byte() as i8)),
            0x31 => Instruction::AND(Operand::IndirectY(cpu.fetch_byte())),
            0x35 => Instruction::AND(Operand::ZeroPageX(cpu.fetch_byte())),
            0x36 => Instruction::ROL(Operand::ZeroPageX(cpu.fetch_byte())),
            0x38 => Instruction::SEC,
            0x39 => Instruction::AND(Operand::AbsoluteY(cpu.fetch_word())),
            0x3d => Instruction::AND(Operand::AbsoluteX(cpu.fetch_word())),
            0x3e => Instruction::ROL(Operand::AbsoluteX(cpu.fetch_word())),
            0x40 => Instruction::RTI,
            0x41 => Instruction::EOR(Operand::IndirectX(cpu.fetch_byte())),
            0x45 => Instruction::EOR(Operand::ZeroPage(cpu.fetch_byte())),
            0x46 => Instruction::LSR(Operand::ZeroPage(cpu.fetch_byte())),
            0x48 => Instruction::PHA,
            0x49 => Instruction::EOR(Operand::Immediate(cpu.fetch_byte())),
            0x4a => Instruction::LSR(Operand::Accumulator),
            0x4c => Instruction::JMP(Operand::Absolute(cpu.fetch_word())),
            0x4d => Instruction::EOR(Operand::Absolute(cpu.fetch_word())),
            0x4e => Instruction::LSR(Operand::Absolute(cpu.fetch_word())),
            0x50 => Instruction::BVC(Operand::Relative(cpu.fetch_byte() as i8)),
            0x51 => Instruction::EOR(Operand::IndirectY(cpu.fetch_byte())),
            0x55 => Instruction::EOR(Operand::ZeroPageX(cpu.fetch_byte())),
            0x56 => Instruction::LSR(Operand::ZeroPageX(cpu.fetch_byte())),
            0x58 => Instruction::CLI,
            0x59 => Instruction::EOR(Operand::AbsoluteY(cpu.fetch_word())),
            0x5d => Instruction::EOR(Operand::AbsoluteX(cpu.fetch_word())),
            0x5e => Instruction::LSR(Operand::AbsoluteX(cpu.fetch_word())),
            0x60 => Instruction::RTS,
            0x61 => Instruction::ADC(Operand::IndirectX(cpu.fetch_byte())),
            0x65 => Instruction::ADC(Operand::ZeroPage(cpu.fetch_byte())),
            0x66 => Instruction::ROR(Operand::ZeroPage(cpu.fetch_byte())),
            0x68 => Instruction::PLA,
            0x69 => Instruction::ADC(Operand::Immediate(cpu.fetch_byte())),
            0x6a => Instruction::ROR(Operand::Accumulator),
            0x6c => Instruction::JMP(Operand::Indirect(cpu.fetch_word())),
            0x6d => Instruction::ADC(Operand::Absolute(cpu.fetch_word())),
            0x6e => Instruction::ROR(Operand::Absolute(cpu.fetch_word())),
            0x70 => Instruction::BVS(Operand::Relative(cpu.fetch_byte() as i8)),
            0x71 => Instruction::ADC(Operand::IndirectY(cpu.fetch_byte())),
            0x75 => Instruction::ADC(Operand::ZeroPageX(cpu.fetch_byte())),
            0x76 => Instruction::ROR(Operand::ZeroPageX(cpu.fetch_byte())),
            0x78 => Instruction::SEI,
            0x79 => Instruction::ADC(Operand::AbsoluteY(cpu.fetch_word())),
            0x7d => Instruction::ADC(Operand::AbsoluteX(cpu.fetch_word())),
            0x7e => Instruction::ROR(Operand::AbsoluteX(cpu.fetch_word())),
            0x81 => Instruction::STA(Operand::IndirectX(cpu.fetch_byte())),
            0x84 => Instruction::STY(Operand::ZeroPage(cpu.fetch_byte())),
            0x85 => Instruction::STA(Operand::ZeroPage(cpu.fetch_byte())),
            0x86 => Instruction::STX(Operand::ZeroPage(cpu.fetch_byte())),
            0x88 => Instruction::DEY,
            0x8a => Instruction::TXA,
            0x8c => Instruction::STY(Operand::Absolute(cpu.fetch_word())),
            0x8d => Instruction::STA(Operand::Absolute(cpu.fetch_word())),
            0x8e => Instruction::STX(Operand::Absolute(cpu.fetch_word())),
            0x90 => Instruction::BCC(Operand::Relative(cpu.fetch_byte() as i8)),
            0x91 => Instruction::STA(Operand::IndirectY(cpu.fetch_byte())),
            0x94 => Instruction::STY(Operand::ZeroPageX(cpu.fetch_byte())),
            0x95 => Instruction::STA(Operand::ZeroPageX(cpu.fetch_byte())),
            0x96 => Instruction::STX(Operand::ZeroPageY(cpu.fetch_byte())),
            0x98 => Instruction::TYA,
            0x99 => Instruction::STA(Operand::AbsoluteY(cpu.fetch_word())),
            0x9a => Instruction::TXS,
            0x9d => Instruction::STA(Operand::AbsoluteX(cpu.fetch_word())),
            0xa0 => Instruction::LDY(Operand::Immediate(cpu.fetch_byte())),
            0xa1 => Instruction::LDA(Operand::IndirectX(cpu.fetch_byte())),
            0xa2 => Instruction::LDX(Operand::Immediate(cpu.fetch_byte())),
            0xa4 => Instruction::LDY(Operand::ZeroPage(cpu.fetch_byte())),
            0xa5 => Instruction::LDA(Operand::ZeroPage(cpu.fetch_byte())),
            0xa6 => Instruction::LDX(Operand::ZeroPage(cpu.fetch_byte())),
            0xa8 => Instruction::TAY,
            0xa9 => Instruction::LDA(Operand::Immediate(cpu.fetch_byte())),
            0xaa => Instruction::TAX,
            0xac => Instruction::LDY(Operand::Absolute(cpu.fetch_word())),
            0xad => Instruction::LDA(Operand::Absolute(cpu.fetch_word())),
            0xae => Instruction::LDX(Operand::Absolute(cpu.fetch_word())),
            0xb0 => Instruction::BCS(Operand::Relative(cpu.fetch_byte() as i8)),
            0xb1 => Instruction::LDA(Operand::IndirectY(cpu.fetch_byte())),
            0xb4 => Instruction::LDY(Operand::ZeroPageX(cpu.fetch_byte())),
            0xb5 => Instruction::LDA(Operand::ZeroPageX(cpu.fetch_byte())),
            0xb6 => Instruction::LDX(Operand::ZeroPageY(cpu.fetch_byte())),
            0xb8 => Instruction::CLV,
            0xb9 => Instruction::LDA(Operand::AbsoluteY(cpu.fetch_word())),
            0xba => Instruction::TSX,
            0xbc => Instruction::LDY(Operand::AbsoluteX(cpu.fetch_word())),
            0xbd => Instruction::LDA(Operand::AbsoluteX(cpu.fetch_word())),
            0xbe => Instruction::LDX(Operand::AbsoluteY(cpu.fetch_word())),
            0xc0 => Instruction::CPY(Operand::Immediate(cpu.fetch_byte())),
            0xc1 => Instruction::CMP(Operand::IndirectX(cpu.fetch_byte())),
            0xc4 => Instruction::CPY(Operand::ZeroPage(cpu.fetch_byte())),
            0xc5 => Instruction::CMP(Operand::ZeroPage(cpu.fetch_byte())),
            0xc6 => Instruction::DEC(Operand::ZeroPage(cpu.fetch_byte())),
            0xc8 => Instruction::INY,
            0xc9 => Instruction::CMP(Operand::Immediate(cpu.fetch_byte())),
            0xca => Instruction::DEX,
            0xcc => Instruction::CPY(Operand::Absolute(cpu.fetch_word())),
            0xcd => Instruction::CMP(Operand::Absolute(cpu.fetch_word())),
            0xce => Instruction::DEC(Operand::Absolute(cpu.fetch_word())),
            0xd0 => Instruction::BNE(Operand::Relative(cpu.fetch_byte() as i8)),
            0xd1 => Instruction::CMP(Operand::IndirectY(cpu.fetch_byte())),
            0xd5 => Instruction::CMP(Operand::ZeroPageX(cpu.fetch_byte())),
            0xd6 => Instruction::DEC(Operand::ZeroPageX(cpu.fetch_byte())),
            0xd8 => Instruction::CLD,
            0xd9 => Instruction::CMP(Operand::AbsoluteY(cpu.fetch_word())),
            0xdd => Instruction::CMP(Operand::AbsoluteX(cpu.fetch_word())),
            0xde => Instruction::DEC(Operand::AbsoluteX(cpu.fetch_word())),
            0xe0 => Instruction::CPX(Operand::Immediate(cpu.fetch_byte())),
            0xe1 => Instruction::SBC(Operand::IndirectX(cpu.fetch_byte())),
            0xe4 => Instruction::CPX(Operand::ZeroPage(cpu.fetch_byte())),
            0xe5 => Instruction::SBC(Operand::ZeroPage(cpu.fetch_byte())),
            0xe6 => Instruction::INC(Operand::ZeroPage(cpu.fetch_byte())),
            0xe8 => Instruction::INX,
            0xe9 => Instruction::SBC(Operand::Immediate(cpu.fetch_byte())),
            0xea => Instruction::NOP,
            0xec => Instruction::CPX(Operand::Absolute(cpu.fetch_word())),
            0xed => Instruction::SBC(Operand::Absolute(cpu.fetch_word())),
            0xee => Instruction::INC(Operand::Absolute(cpu.fetch_word())),
            0xf0 => Instruction::BEQ(Operand::Relative(cpu.fetch_byte() as i8)),
            0xf1 => Instruction::SBC(Operand::IndirectY(cpu.fetch_byte())),
            0xf5 => Instruction::SBC(Operand::ZeroPageX(cpu.fetch_byte())),
            0xf6 => Instruction::INC(Operand::ZeroPageX(cpu.fetch_byte())),
            0xf8 => Instruction::SED,
            0xf9 => Instruction::SBC(Operand::AbsoluteY(cpu.fetch_word())),
            0xfd => Instruction::SBC(Operand::AbsoluteX(cpu.fetch_word())),
            0xfe => Instruction::INC(Operand::AbsoluteX(cpu.fetch_word())),
            _ => panic!(
                "undocumented opcode 0x{:02x} at 0x{:04x}, cpu stalled",
                opcode,
                cpu.get_pc().wrapping_sub(1)
            ),
        }
    }

    fn parts(&self) -> (&'static str, Option<&Operand>) {
        match *self {
            Instruction::LDA(ref op) => ("lda", Some(op)),
            Instruction::LDX(ref op) => ("ldx", Some(op)),
            Instruction::LDY(ref op) => ("ldy", Some(op)),
            Instruction::STA(ref op) => ("sta", Some(op)),
            Instruction::STX(ref op) => ("stx", Some(op)),
            Instruction::STY(ref op) => ("sty", Some(op)),
            Instruction::TAX => ("tax", None),
            Instruction::TAY => ("tay", None),
            Instruction::TSX => ("tsx", None),
            Instruction::TXA => ("txa", None),
            Instruction::TXS => ("txs", None),
            Instruction::TYA => ("tya", None),
            Instruction::PHA => ("pha", None),
            Instruction::PHP => ("php", None),
            Instruction::PLA => ("pla", None),
            Instruction::PLP => ("plp", None),
            Instruction::ADC(ref op) => ("adc", Some(op)),
            Instruction::SBC(ref op) => ("sbc", Some(op)),
            Instruction::CMP(ref op) => ("cmp", Some(op)),
            Instruction::CPX(ref op) => ("cpx", Some(op)),
            Instruction::CPY(ref op) => ("cpy", Some(op)),
            Instruction::DEC(ref op) => ("dec", Some(op)),
            Instruction::DEX => ("dex", None),
            Instruction::DEY => ("dey", None),
            Instruction::INC(ref op) => ("inc", Some(op)),
            Instruction::INX => ("inx", None),
            Instruction::INY => ("iny", None),
            Instruction::AND(ref op) => ("and", Some(op)),
            Instruction::EOR(ref op) => ("eor", Some(op)),
            Instruction::ORA(ref op) => ("ora", Some(op)),
            Instruction::BIT(ref op) => ("bit", Some(op)),
            Instruction::ASL(ref op) => ("asl", Some(op)),
            Instruction::LSR(ref op) => ("lsr", Some(op)),
            Instruction::ROL(ref op) => ("rol", Some(op)),
            Instruction::ROR(ref op) => ("ror", Some(op)),
            Instruction::BCC(ref op) => ("bcc", Some(op)),
            Instruction::BCS(ref op) => ("bcs", Some(op)),
            Instruction::BEQ(ref op) => ("beq", Some(op)),
            Instruction::BMI(ref op) => ("bmi", Some(op)),
            Instruction::BNE(ref op) => ("bne", Some(op)),
            Instruction::BPL(ref op) => ("bpl", Some(op)),
            Instruction::BVC(ref op) => ("bvc", Some(op)),
            Instruction::BVS(ref op) => ("bvs", Some(op)),
            Instruction::JMP(ref op) => ("jmp", Some(op)),
            Instruction::JSR(ref op) => ("jsr", Some(op)),
            Instruction::RTS => ("rts", None),
            Instruction::RTI => ("rti", None),
            Instruction::BRK => ("brk", None),
            Instruction::CLC => ("clc", None),
            Instruction::CLD => ("cld", None),
            Instruction::CLI => ("cli", None),
            Instruction::CLV => ("clv", None),
            Instruction::SEC => ("sec", None),
            Instruction::SED => ("sed", None),
            Instruction::SEI => ("sei", None),
            Instruction::NOP => ("nop", None),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.parts() {
            (mnemonic, Some(op)) => write!(f, "{} {}", mnemonic, op),
            (mnemonic, None) => write!(f, "{}", mnemonic),
        }
    }
}
