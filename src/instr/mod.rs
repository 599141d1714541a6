//! Per-variant 256-entry opcode tables.
//!
//! Each table is built once (see `InstructionSet::new`) from a declarative
//! list of known opcodes; every slot this crate doesn't assign a concrete
//! handler to is filled with an "unused" marker that still consumes its
//! declared length and cycles, per §4.3.

use crate::cpu::Cpu;

mod cmos;
mod nmos;

/// Which physical part this table models. CMOS fixes the indirect-JMP wrap
/// bug, adds instructions, and tweaks decimal-mode ADC/SBC overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Nmos,
    Cmos,
}

/// The 13 addressing modes this ISA distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Imm,
    Imp,
    Rel,
    Zpg,
    Zpx,
    Zpy,
    Abs,
    Abx,
    Aby,
    Ind,
    Idx,
    Idy,
    Acc,
}

/// An instruction handler executes the decoded opcode against `cpu`. It is
/// responsible for resolving its own operand address (via
/// `Cpu::resolve_address`), for any additional cycle accounting beyond the
/// opcode's declared base cycles (page-cross penalties, branch deltas), and
/// for leaving `cpu.pc` exactly where the addressing mode and instruction
/// semantics dictate (branches and jumps move it further than `step` already
/// has).
pub type Handler = fn(&mut Cpu, &Instruction);

/// One decoded opcode slot.
#[derive(Clone, Copy)]
pub struct Instruction {
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
    pub opcode: u8,
    pub length: u8,
    pub cycles: u8,
    pub page_cross_extra: u8,
    pub handler: Handler,
    pub unused: bool,
}

impl Instruction {
    const fn unused(opcode: u8, length: u8, cycles: u8) -> Instruction {
        Instruction {
            mnemonic: "???",
            mode: AddressingMode::Imp,
            opcode,
            length,
            cycles,
            page_cross_extra: 0,
            handler: crate::cpu::handlers_flags::unused,
            unused: true,
        }
    }
}

/// One raw table entry as declared by `nmos`/`cmos`: (opcode, mnemonic,
/// mode, length, base cycles, page-cross extra cycles, handler).
pub type RawEntry = (u8, &'static str, AddressingMode, u8, u8, u8, Handler);

/// A fully populated 256-entry table for one CPU variant.
pub struct InstructionSet {
    variant: Variant,
    table: Vec<Instruction>,
}

impl InstructionSet {
    pub fn new(variant: Variant) -> InstructionSet {
        // NMOS's default "unused" filler: declared length 1, 2 cycles, no
        // side effects (§4.3 Non-goals).
        let mut table: Vec<Instruction> = (0..=255u16)
            .map(|opcode| Instruction::unused(opcode as u8, 1, 2))
            .collect();

        for &(opcode, mnemonic, mode, length, cycles, page_cross_extra, handler) in
            nmos::entries()
        {
            table[opcode as usize] = Instruction {
                mnemonic,
                mode,
                opcode,
                length,
                cycles,
                page_cross_extra,
                handler,
                unused: false,
            };
        }

        if variant == Variant::Cmos {
            for &(opcode, mnemonic, mode, length, cycles, page_cross_extra, handler) in
                cmos::additions()
            {
                table[opcode as usize] = Instruction {
                    mnemonic,
                    mode,
                    opcode,
                    length,
                    cycles,
                    page_cross_extra,
                    handler,
                    unused: false,
                };
            }
            for &(opcode, length, cycles) in cmos::reserved_nops() {
                table[opcode as usize] = Instruction::unused(opcode, length, cycles);
            }
        }

        debug_assert_eq!(table.len(), 256, "every opcode slot must be populated");

        InstructionSet { variant, table }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Looks up the instruction bound to `opcode` in this variant's table.
    /// Every one of the 256 slots is always populated (with an "unused"
    /// marker where no real instruction is defined), so this never fails.
    pub fn decode(&self, opcode: u8) -> &Instruction {
        &self.table[opcode as usize]
    }

    /// Returns every concrete (non-unused) instruction matching `mnemonic`,
    /// case-insensitively. Addressing-mode disambiguation among the
    /// returned candidates is the assembler's job (§4.9).
    pub fn find_by_mnemonic(&self, mnemonic: &str) -> Vec<&Instruction> {
        self.table
            .iter()
            .filter(|instr| !instr.unused && instr.mnemonic.eq_ignore_ascii_case(mnemonic))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_opcode_slot_is_populated() {
        for variant in [Variant::Nmos, Variant::Cmos] {
            let set = InstructionSet::new(variant);
            for opcode in 0..=255u8 {
                let instr = set.decode(opcode);
                assert_eq!(instr.opcode, opcode);
                assert!(instr.length >= 1 && instr.length <= 3);
            }
        }
    }

    #[test]
    fn cmos_only_instructions_are_unused_on_nmos() {
        let nmos = InstructionSet::new(Variant::Nmos);
        // $80 is BRA on CMOS, unused on NMOS.
        assert!(nmos.decode(0x80).unused);

        let cmos = InstructionSet::new(Variant::Cmos);
        assert!(!cmos.decode(0x80).unused);
        assert_eq!(cmos.decode(0x80).mnemonic, "BRA");
    }

    #[test]
    fn find_by_mnemonic_is_case_insensitive_and_returns_all_modes() {
        let set = InstructionSet::new(Variant::Nmos);
        let lda_upper = set.find_by_mnemonic("LDA");
        let lda_lower = set.find_by_mnemonic("lda");
        assert_eq!(lda_upper.len(), lda_lower.len());
        assert!(lda_upper.len() >= 8);
    }

    #[test]
    fn cmos_reserved_opcodes_match_declared_lengths() {
        let set = InstructionSet::new(Variant::Cmos);
        assert_eq!(set.decode(0x02).length, 2);
        assert_eq!(set.decode(0x02).cycles, 2);
        assert_eq!(set.decode(0x03).length, 1);
        assert_eq!(set.decode(0x03).cycles, 1);
        assert_eq!(set.decode(0xFC).length, 3);
        assert_eq!(set.decode(0xFC).cycles, 4);
    }
}
