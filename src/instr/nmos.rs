//! The documented NMOS 6502 instruction set.

use super::AddressingMode::*;
use super::RawEntry;
use crate::cpu::handlers_alu as alu;
use crate::cpu::handlers_branch as branch;
use crate::cpu::handlers_flags as flags;
use crate::cpu::handlers_move as mv;
use crate::cpu::handlers_stack as stack;

pub fn entries() -> &'static [RawEntry] {
    &ENTRIES
}

static ENTRIES: [RawEntry; 151] = [
    // Loads
    (0xA9, "LDA", Imm, 2, 2, 0, mv::lda),
    (0xA5, "LDA", Zpg, 2, 3, 0, mv::lda),
    (0xB5, "LDA", Zpx, 2, 4, 0, mv::lda),
    (0xAD, "LDA", Abs, 3, 4, 0, mv::lda),
    (0xBD, "LDA", Abx, 3, 4, 1, mv::lda),
    (0xB9, "LDA", Aby, 3, 4, 1, mv::lda),
    (0xA1, "LDA", Idx, 2, 6, 0, mv::lda),
    (0xB1, "LDA", Idy, 2, 5, 1, mv::lda),
    (0xA2, "LDX", Imm, 2, 2, 0, mv::ldx),
    (0xA6, "LDX", Zpg, 2, 3, 0, mv::ldx),
    (0xB6, "LDX", Zpy, 2, 4, 0, mv::ldx),
    (0xAE, "LDX", Abs, 3, 4, 0, mv::ldx),
    (0xBE, "LDX", Aby, 3, 4, 1, mv::ldx),
    (0xA0, "LDY", Imm, 2, 2, 0, mv::ldy),
    (0xA4, "LDY", Zpg, 2, 3, 0, mv::ldy),
    (0xB4, "LDY", Zpx, 2, 4, 0, mv::ldy),
    (0xAC, "LDY", Abs, 3, 4, 0, mv::ldy),
    (0xBC, "LDY", Abx, 3, 4, 1, mv::ldy),
    // Stores
    (0x85, "STA", Zpg, 2, 3, 0, mv::sta),
    (0x95, "STA", Zpx, 2, 4, 0, mv::sta),
    (0x8D, "STA", Abs, 3, 4, 0, mv::sta),
    (0x9D, "STA", Abx, 3, 5, 0, mv::sta),
    (0x99, "STA", Aby, 3, 5, 0, mv::sta),
    (0x81, "STA", Idx, 2, 6, 0, mv::sta),
    (0x91, "STA", Idy, 2, 6, 0, mv::sta),
    (0x86, "STX", Zpg, 2, 3, 0, mv::stx),
    (0x96, "STX", Zpy, 2, 4, 0, mv::stx),
    (0x8E, "STX", Abs, 3, 4, 0, mv::stx),
    (0x84, "STY", Zpg, 2, 3, 0, mv::sty),
    (0x94, "STY", Zpx, 2, 4, 0, mv::sty),
    (0x8C, "STY", Abs, 3, 4, 0, mv::sty),
    // Register transfers
    (0xAA, "TAX", Imp, 1, 2, 0, mv::tax),
    (0xA8, "TAY", Imp, 1, 2, 0, mv::tay),
    (0x8A, "TXA", Imp, 1, 2, 0, mv::txa),
    (0x98, "TYA", Imp, 1, 2, 0, mv::tya),
    (0xBA, "TSX", Imp, 1, 2, 0, mv::tsx),
    (0x9A, "TXS", Imp, 1, 2, 0, mv::txs),
    // Stack
    (0x48, "PHA", Imp, 1, 3, 0, stack::pha),
    (0x68, "PLA", Imp, 1, 4, 0, stack::pla),
    (0x08, "PHP", Imp, 1, 3, 0, stack::php),
    (0x28, "PLP", Imp, 1, 4, 0, stack::plp),
    // Logical
    (0x29, "AND", Imm, 2, 2, 0, alu::and),
    (0x25, "AND", Zpg, 2, 3, 0, alu::and),
    (0x35, "AND", Zpx, 2, 4, 0, alu::and),
    (0x2D, "AND", Abs, 3, 4, 0, alu::and),
    (0x3D, "AND", Abx, 3, 4, 1, alu::and),
    (0x39, "AND", Aby, 3, 4, 1, alu::and),
    (0x21, "AND", Idx, 2, 6, 0, alu::and),
    (0x31, "AND", Idy, 2, 5, 1, alu::and),
    (0x09, "ORA", Imm, 2, 2, 0, alu::ora),
    (0x05, "ORA", Zpg, 2, 3, 0, alu::ora),
    (0x15, "ORA", Zpx, 2, 4, 0, alu::ora),
    (0x0D, "ORA", Abs, 3, 4, 0, alu::ora),
    (0x1D, "ORA", Abx, 3, 4, 1, alu::ora),
    (0x19, "ORA", Aby, 3, 4, 1, alu::ora),
    (0x01, "ORA", Idx, 2, 6, 0, alu::ora),
    (0x11, "ORA", Idy, 2, 5, 1, alu::ora),
    (0x49, "EOR", Imm, 2, 2, 0, alu::eor),
    (0x45, "EOR", Zpg, 2, 3, 0, alu::eor),
    (0x55, "EOR", Zpx, 2, 4, 0, alu::eor),
    (0x4D, "EOR", Abs, 3, 4, 0, alu::eor),
    (0x5D, "EOR", Abx, 3, 4, 1, alu::eor),
    (0x59, "EOR", Aby, 3, 4, 1, alu::eor),
    (0x41, "EOR", Idx, 2, 6, 0, alu::eor),
    (0x51, "EOR", Idy, 2, 5, 1, alu::eor),
    (0x24, "BIT", Zpg, 2, 3, 0, alu::bit),
    (0x2C, "BIT", Abs, 3, 4, 0, alu::bit),
    // Arithmetic
    (0x69, "ADC", Imm, 2, 2, 0, alu::adc),
    (0x65, "ADC", Zpg, 2, 3, 0, alu::adc),
    (0x75, "ADC", Zpx, 2, 4, 0, alu::adc),
    (0x6D, "ADC", Abs, 3, 4, 0, alu::adc),
    (0x7D, "ADC", Abx, 3, 4, 1, alu::adc),
    (0x79, "ADC", Aby, 3, 4, 1, alu::adc),
    (0x61, "ADC", Idx, 2, 6, 0, alu::adc),
    (0x71, "ADC", Idy, 2, 5, 1, alu::adc),
    (0xE9, "SBC", Imm, 2, 2, 0, alu::sbc),
    (0xE5, "SBC", Zpg, 2, 3, 0, alu::sbc),
    (0xF5, "SBC", Zpx, 2, 4, 0, alu::sbc),
    (0xED, "SBC", Abs, 3, 4, 0, alu::sbc),
    (0xFD, "SBC", Abx, 3, 4, 1, alu::sbc),
    (0xF9, "SBC", Aby, 3, 4, 1, alu::sbc),
    (0xE1, "SBC", Idx, 2, 6, 0, alu::sbc),
    (0xF1, "SBC", Idy, 2, 5, 1, alu::sbc),
    (0xC9, "CMP", Imm, 2, 2, 0, alu::cmp),
    (0xC5, "CMP", Zpg, 2, 3, 0, alu::cmp),
    (0xD5, "CMP", Zpx, 2, 4, 0, alu::cmp),
    (0xCD, "CMP", Abs, 3, 4, 0, alu::cmp),
    (0xDD, "CMP", Abx, 3, 4, 1, alu::cmp),
    (0xD9, "CMP", Aby, 3, 4, 1, alu::cmp),
    (0xC1, "CMP", Idx, 2, 6, 0, alu::cmp),
    (0xD1, "CMP", Idy, 2, 5, 1, alu::cmp),
    (0xE0, "CPX", Imm, 2, 2, 0, alu::cpx),
    (0xE4, "CPX", Zpg, 2, 3, 0, alu::cpx),
    (0xEC, "CPX", Abs, 3, 4, 0, alu::cpx),
    (0xC0, "CPY", Imm, 2, 2, 0, alu::cpy),
    (0xC4, "CPY", Zpg, 2, 3, 0, alu::cpy),
    (0xCC, "CPY", Abs, 3, 4, 0, alu::cpy),
    // Increment / decrement
    (0xE6, "INC", Zpg, 2, 5, 0, mv::inc),
    (0xF6, "INC", Zpx, 2, 6, 0, mv::inc),
    (0xEE, "INC", Abs, 3, 6, 0, mv::inc),
    (0xFE, "INC", Abx, 3, 7, 0, mv::inc),
    (0xE8, "INX", Imp, 1, 2, 0, mv::inx),
    (0xC8, "INY", Imp, 1, 2, 0, mv::iny),
    (0xC6, "DEC", Zpg, 2, 5, 0, mv::dec),
    (0xD6, "DEC", Zpx, 2, 6, 0, mv::dec),
    (0xCE, "DEC", Abs, 3, 6, 0, mv::dec),
    (0xDE, "DEC", Abx, 3, 7, 0, mv::dec),
    (0xCA, "DEX", Imp, 1, 2, 0, mv::dex),
    (0x88, "DEY", Imp, 1, 2, 0, mv::dey),
    // Shifts
    (0x0A, "ASL", Acc, 1, 2, 0, alu::asl),
    (0x06, "ASL", Zpg, 2, 5, 0, alu::asl),
    (0x16, "ASL", Zpx, 2, 6, 0, alu::asl),
    (0x0E, "ASL", Abs, 3, 6, 0, alu::asl),
    (0x1E, "ASL", Abx, 3, 7, 0, alu::asl),
    (0x4A, "LSR", Acc, 1, 2, 0, alu::lsr),
    (0x46, "LSR", Zpg, 2, 5, 0, alu::lsr),
    (0x56, "LSR", Zpx, 2, 6, 0, alu::lsr),
    (0x4E, "LSR", Abs, 3, 6, 0, alu::lsr),
    (0x5E, "LSR", Abx, 3, 7, 0, alu::lsr),
    (0x2A, "ROL", Acc, 1, 2, 0, alu::rol),
    (0x26, "ROL", Zpg, 2, 5, 0, alu::rol),
    (0x36, "ROL", Zpx, 2, 6, 0, alu::rol),
    (0x2E, "ROL", Abs, 3, 6, 0, alu::rol),
    (0x3E, "ROL", Abx, 3, 7, 0, alu::rol),
    (0x6A, "ROR", Acc, 1, 2, 0, alu::ror),
    (0x66, "ROR", Zpg, 2, 5, 0, alu::ror),
    (0x76, "ROR", Zpx, 2, 6, 0, alu::ror),
    (0x6E, "ROR", Abs, 3, 6, 0, alu::ror),
    (0x7E, "ROR", Abx, 3, 7, 0, alu::ror),
    // Control flow
    (0x4C, "JMP", Abs, 3, 3, 0, branch::jmp),
    (0x6C, "JMP", Ind, 3, 5, 0, branch::jmp_ind),
    (0x20, "JSR", Abs, 3, 6, 0, branch::jsr),
    (0x60, "RTS", Imp, 1, 6, 0, branch::rts),
    (0x40, "RTI", Imp, 1, 6, 0, branch::rti),
    (0x00, "BRK", Imp, 2, 7, 0, branch::brk),
    // Branches
    (0x10, "BPL", Rel, 2, 2, 0, branch::bpl),
    (0x30, "BMI", Rel, 2, 2, 0, branch::bmi),
    (0x50, "BVC", Rel, 2, 2, 0, branch::bvc),
    (0x70, "BVS", Rel, 2, 2, 0, branch::bvs),
    (0x90, "BCC", Rel, 2, 2, 0, branch::bcc),
    (0xB0, "BCS", Rel, 2, 2, 0, branch::bcs),
    (0xD0, "BNE", Rel, 2, 2, 0, branch::bne),
    (0xF0, "BEQ", Rel, 2, 2, 0, branch::beq),
    // Flags
    (0x18, "CLC", Imp, 1, 2, 0, flags::clc),
    (0x38, "SEC", Imp, 1, 2, 0, flags::sec),
    (0x58, "CLI", Imp, 1, 2, 0, flags::cli),
    (0x78, "SEI", Imp, 1, 2, 0, flags::sei),
    (0xB8, "CLV", Imp, 1, 2, 0, flags::clv),
    (0xD8, "CLD", Imp, 1, 2, 0, flags::cld),
    (0xF8, "SED", Imp, 1, 2, 0, flags::sed),
    (0xEA, "NOP", Imp, 1, 2, 0, flags::nop),
];
