//! WDC 65C02 additions: new instructions, new addressing-mode combinations
//! of existing mnemonics, the fixed indirect-JMP wrap, and the reserved
//! (undefined-opcode) filler space's declared timing.
//!
//! ADC/SBC are not overridden here: their handlers already branch on
//! `Cpu::variant()` for decimal-mode overflow, so the NMOS table rows are
//! reused as-is for CMOS too.

use super::AddressingMode::*;
use super::RawEntry;
use crate::cpu::handlers_alu as alu;
use crate::cpu::handlers_branch as branch;
use crate::cpu::handlers_move as mv;
use crate::cpu::handlers_stack as stack;

pub fn additions() -> &'static [RawEntry] {
    &ADDITIONS
}

static ADDITIONS: [RawEntry; 20] = [
    (0x80, "BRA", Rel, 2, 2, 0, branch::bra),
    (0x89, "BIT", Imm, 2, 2, 0, alu::bit_imm),
    (0x34, "BIT", Zpx, 2, 4, 0, alu::bit),
    (0x3C, "BIT", Abx, 3, 4, 1, alu::bit),
    (0x1A, "INC", Acc, 1, 2, 0, mv::inc_acc),
    (0x3A, "DEC", Acc, 1, 2, 0, mv::dec_acc),
    (0x64, "STZ", Zpg, 2, 3, 0, mv::stz),
    (0x74, "STZ", Zpx, 2, 4, 0, mv::stz),
    (0x9C, "STZ", Abs, 3, 4, 0, mv::stz),
    (0x9E, "STZ", Abx, 3, 5, 0, mv::stz),
    (0x04, "TSB", Zpg, 2, 5, 0, alu::tsb),
    (0x0C, "TSB", Abs, 3, 6, 0, alu::tsb),
    (0x14, "TRB", Zpg, 2, 5, 0, alu::trb),
    (0x1C, "TRB", Abs, 3, 6, 0, alu::trb),
    (0xDA, "PHX", Imp, 1, 3, 0, stack::phx),
    (0x5A, "PHY", Imp, 1, 3, 0, stack::phy),
    (0xFA, "PLX", Imp, 1, 4, 0, stack::plx),
    (0x7A, "PLY", Imp, 1, 4, 0, stack::ply),
    // Overrides the NMOS row: fixes the page-wrap bug, at the cost of one
    // extra cycle when the pointer's low byte is $FF.
    (0x6C, "JMP", Ind, 3, 5, 0, branch::jmp_ind_cmos),
    (0x7C, "JMP", Abx, 3, 6, 0, branch::jmp_abx_ind),
];

// ASL/LSR/ROL/ROR/INC/DEC in abs,X share NMOS's table rows; their one
// cycle of CMOS-only timing discount is applied at run time by
// `Cpu::cmos_rmw_discount` rather than by a second table row here.

/// Declared length/cycles for every opcode this table doesn't assign a
/// concrete instruction to. The 65C02 datasheet documents this entire
/// space as NOP variants of specific widths rather than leaving it
/// genuinely undefined the way NMOS does (verified against the worked
/// example of `.ARCH 65c02` executing six undefined-byte "instructions"
/// for a declared total of 9 bytes / 10 cycles).
///
/// The eight `(zp)` addressing-mode opcodes WDC also defines for
/// ORA/AND/EOR/ADC/STA/LDA/CMP/SBC are folded into this list rather than
/// modeled as a 14th addressing mode, since this instruction set
/// otherwise exhaustively covers 13.
pub fn reserved_nops() -> &'static [(u8, u8, u8)] {
    // 64 single-byte NOPs (low nibble 3/7/B/F) + 11 wider documented NOPs +
    // 8 folded-in (zp) opcodes = 86.
    &RESERVED_NOPS
}

static RESERVED_NOPS: [(u8, u8, u8); 86] = [
    // One byte, one cycle: every opcode whose low nibble is 3, 7, B, or F.
    (0x03, 1, 1),
    (0x07, 1, 1),
    (0x0B, 1, 1),
    (0x0F, 1, 1),
    (0x13, 1, 1),
    (0x17, 1, 1),
    (0x1B, 1, 1),
    (0x1F, 1, 1),
    (0x23, 1, 1),
    (0x27, 1, 1),
    (0x2B, 1, 1),
    (0x2F, 1, 1),
    (0x33, 1, 1),
    (0x37, 1, 1),
    (0x3B, 1, 1),
    (0x3F, 1, 1),
    (0x43, 1, 1),
    (0x47, 1, 1),
    (0x4B, 1, 1),
    (0x4F, 1, 1),
    (0x53, 1, 1),
    (0x57, 1, 1),
    (0x5B, 1, 1),
    (0x5F, 1, 1),
    (0x63, 1, 1),
    (0x67, 1, 1),
    (0x6B, 1, 1),
    (0x6F, 1, 1),
    (0x73, 1, 1),
    (0x77, 1, 1),
    (0x7B, 1, 1),
    (0x7F, 1, 1),
    (0x83, 1, 1),
    (0x87, 1, 1),
    (0x8B, 1, 1),
    (0x8F, 1, 1),
    (0x93, 1, 1),
    (0x97, 1, 1),
    (0x9B, 1, 1),
    (0x9F, 1, 1),
    (0xA3, 1, 1),
    (0xA7, 1, 1),
    (0xAB, 1, 1),
    (0xAF, 1, 1),
    (0xB3, 1, 1),
    (0xB7, 1, 1),
    (0xBB, 1, 1),
    (0xBF, 1, 1),
    (0xC3, 1, 1),
    (0xC7, 1, 1),
    (0xCB, 1, 1),
    (0xCF, 1, 1),
    (0xD3, 1, 1),
    (0xD7, 1, 1),
    (0xDB, 1, 1),
    (0xDF, 1, 1),
    (0xE3, 1, 1),
    (0xE7, 1, 1),
    (0xEB, 1, 1),
    (0xEF, 1, 1),
    (0xF3, 1, 1),
    (0xF7, 1, 1),
    (0xFB, 1, 1),
    (0xFF, 1, 1),
    // Two bytes, varying cycles.
    (0x02, 2, 2),
    (0x22, 2, 2),
    (0x42, 2, 2),
    (0x62, 2, 2),
    (0x82, 2, 2),
    (0xC2, 2, 2),
    (0xE2, 2, 2),
    (0x44, 2, 3),
    (0x54, 2, 4),
    (0xD4, 2, 4),
    (0xF4, 2, 4),
    // Three bytes.
    (0x5C, 3, 8),
    (0xDC, 3, 4),
    (0xFC, 3, 4),
    // The eight (zp) opcodes folded in rather than given a 14th mode.
    (0x12, 2, 5),
    (0x32, 2, 5),
    (0x52, 2, 5),
    (0x72, 2, 5),
    (0x92, 2, 5),
    (0xB2, 2, 5),
    (0xD2, 2, 5),
    (0xF2, 2, 5),
];
