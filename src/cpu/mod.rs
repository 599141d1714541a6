//! The CPU core: fetch/decode/execute, addressing-mode resolution, the
//! stack, and interrupt/reset handling (§4.5).
//!
//! Instruction bodies live in the sibling `handlers_*` modules, grouped by
//! instruction class the way the register/ALU/branch/stack split in a real
//! datasheet groups them. `InstructionSet` and `Memory` outlive the `Cpu`
//! that borrows them; the `Cpu` never owns either.

pub mod handlers_alu;
pub mod handlers_branch;
pub mod handlers_flags;
pub mod handlers_move;
pub mod handlers_stack;

#[cfg(test)]
mod tests;

use crate::debugger::Debugger;
use crate::instr::{AddressingMode, Instruction, InstructionSet, Variant};
use crate::memory::Memory;
use crate::registers::Registers;

pub struct Cpu<'a> {
    pub regs: Registers,
    memory: &'a mut Memory,
    instruction_set: &'a InstructionSet,
    pub cycles: u64,
    last_pc: u16,
    operand_addr: u16,
    /// Set by the last addressing-mode resolution that could cross a page;
    /// read back by the few CMOS handlers whose timing depends on it.
    page_crossed: bool,
    debugger: Option<Debugger>,
    brk_handler: Option<Box<dyn FnMut(&mut Cpu)>>,
}

impl<'a> Cpu<'a> {
    pub fn new(instruction_set: &'a InstructionSet, memory: &'a mut Memory) -> Cpu<'a> {
        Cpu {
            regs: Registers::new(),
            memory,
            instruction_set,
            cycles: 0,
            last_pc: 0,
            operand_addr: 0,
            page_crossed: false,
            debugger: None,
            brk_handler: None,
        }
    }

    pub fn variant(&self) -> Variant {
        self.instruction_set.variant()
    }

    pub fn set_pc(&mut self, addr: u16) {
        self.regs.pc = addr;
    }

    pub fn last_pc(&self) -> u16 {
        self.last_pc
    }

    pub fn memory(&self) -> &Memory {
        self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        self.memory
    }

    pub fn attach_debugger(&mut self, debugger: Debugger) {
        self.debugger = Some(debugger);
    }

    pub fn take_debugger(&mut self) -> Option<Debugger> {
        self.debugger.take()
    }

    pub fn debugger_mut(&mut self) -> Option<&mut Debugger> {
        self.debugger.as_mut()
    }

    /// Installs a handler invoked in place of the default BRK sequence.
    /// Lets a REPL trap `$00` instead of the CPU pushing PC/status and
    /// jumping through the IRQ/BRK vector.
    pub fn set_brk_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Cpu) + 'static,
    {
        self.brk_handler = Some(Box::new(handler));
    }

    pub fn clear_brk_handler(&mut self) {
        self.brk_handler = None;
    }

    /// Loads PC from the reset vector at `$FFFC`, as power-on or a RESET
    /// line pulse would.
    pub fn reset(&mut self) {
        self.regs = Registers {
            sp: self.regs.sp,
            ..self.regs
        };
        self.regs.pc = self.read_word_linear(0xFFFC);
    }

    /// Decodes (without executing) the instruction at `addr`. Used by
    /// disassemblers and by `next_addr`.
    pub fn decode_at(&self, addr: u16) -> &Instruction {
        self.instruction_set.decode(self.memory.load_byte(addr))
    }

    /// Address immediately following the instruction at `addr`.
    pub fn next_addr(&self, addr: u16) -> u16 {
        addr.wrapping_add(self.decode_at(addr).length as u16)
    }

    /// Runs the instruction at the current PC: notify the debugger, fetch,
    /// decode, advance PC past the instruction, accumulate its base cycles,
    /// and dispatch to its handler. See §4.5 "Step contract".
    pub fn step(&mut self) {
        let pc = self.regs.pc;
        if let Some(dbg) = &mut self.debugger {
            dbg.on_pc(pc);
        }

        let opcode = self.memory.load_byte(pc);

        if opcode == 0x00 && self.brk_handler.is_some() {
            let mut handler = self.brk_handler.take().unwrap();
            handler(self);
            self.brk_handler = Some(handler);
            return;
        }

        let instr = self.instruction_set.decode(opcode);
        self.last_pc = pc;
        self.operand_addr = pc.wrapping_add(1);
        self.regs.pc = pc.wrapping_add(instr.length as u16);
        self.cycles += instr.cycles as u64;
        (instr.handler)(self, instr);
    }

    /// Raises a maskable interrupt. A no-op while `I` is set.
    pub fn irq(&mut self) {
        if self.regs.interrupt_disable {
            return;
        }
        self.service_interrupt(0xFFFE);
    }

    /// Raises a non-maskable interrupt. Unlike `irq`, always services.
    pub fn nmi(&mut self) {
        self.service_interrupt(0xFFFA);
    }

    fn service_interrupt(&mut self, vector: u16) {
        let pc = self.regs.pc;
        self.push_word(pc);
        let status = self.regs.save_status(false);
        self.push_byte(status);
        self.regs.interrupt_disable = true;
        self.regs.pc = self.read_word_linear(vector);
        self.cycles += 7;
    }

    // -- Operand access -------------------------------------------------

    /// Reads the byte immediately following the opcode at the instruction
    /// currently being executed.
    pub(crate) fn operand_byte(&self) -> u8 {
        self.memory.load_byte(self.operand_addr)
    }

    /// Reads the little-endian word immediately following the opcode. This
    /// is a plain linear two-byte read: the operand bytes are fetched by
    /// straightforward PC increments on real hardware, never by the
    /// indirection circuit that misbehaves at a `$xxFF` boundary, so it
    /// must not go through `Memory::load_word`'s wrap rule.
    pub(crate) fn operand_word(&self) -> u16 {
        self.read_word_linear(self.operand_addr)
    }

    /// An ordinary, never-wrapping little-endian word read. Used for
    /// operand decoding, interrupt vectors, and the CMOS (fixed) indirect
    /// JMP. Contrast `Memory::load_word`, which reproduces the NMOS
    /// indirect-addressing page-wrap bug and is reserved for the handful of
    /// places that need it (the zero-page pointer dereference in IDX/IDY,
    /// and NMOS `JMP (ind)`).
    pub(crate) fn read_word_linear(&self, addr: u16) -> u16 {
        let low = self.memory.load_byte(addr);
        let high = self.memory.load_byte(addr.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    /// Resolves the effective address for every mode that has one,
    /// charging any page-cross penalty along the way. `Acc`, `Imp`, `Rel`,
    /// and `Ind` are resolved by their own handlers instead.
    pub(crate) fn resolve_address(&mut self, mode: AddressingMode, page_cross_extra: u8) -> u16 {
        self.page_crossed = false;
        match mode {
            AddressingMode::Imm => self.operand_addr,
            AddressingMode::Zpg => self.operand_byte() as u16,
            AddressingMode::Zpx => self.operand_byte().wrapping_add(self.regs.x) as u16,
            AddressingMode::Zpy => self.operand_byte().wrapping_add(self.regs.y) as u16,
            AddressingMode::Abs => self.operand_word(),
            AddressingMode::Abx => {
                let base = self.operand_word();
                let addr = base.wrapping_add(self.regs.x as u16);
                self.charge_page_cross(base, addr, page_cross_extra);
                addr
            }
            AddressingMode::Aby => {
                let base = self.operand_word();
                let addr = base.wrapping_add(self.regs.y as u16);
                self.charge_page_cross(base, addr, page_cross_extra);
                addr
            }
            AddressingMode::Idx => {
                let zp = self.operand_byte().wrapping_add(self.regs.x);
                self.memory.load_word(zp as u16)
            }
            AddressingMode::Idy => {
                let zp = self.operand_byte();
                let base = self.memory.load_word(zp as u16);
                let addr = base.wrapping_add(self.regs.y as u16);
                self.charge_page_cross(base, addr, page_cross_extra);
                addr
            }
            AddressingMode::Acc | AddressingMode::Imp | AddressingMode::Rel | AddressingMode::Ind => {
                unreachable!("mode {:?} is resolved by its own handler", mode)
            }
        }
    }

    fn charge_page_cross(&mut self, base: u16, addr: u16, extra: u8) {
        self.page_crossed = base & 0xFF00 != addr & 0xFF00;
        if self.page_crossed {
            self.cycles += extra as u64;
        }
    }

    pub(crate) fn page_crossed(&self) -> bool {
        self.page_crossed
    }

    /// CMOS read-modify-write instructions in `abs,X` run one cycle faster
    /// than their NMOS base cycle count when no page boundary is crossed
    /// (the datasheet's one documented RMW timing fix); called by the
    /// shift and INC/DEC handlers after resolving their address.
    pub(crate) fn cmos_rmw_discount(&mut self, mode: AddressingMode) {
        if mode == AddressingMode::Abx
            && self.instruction_set.variant() == Variant::Cmos
            && !self.page_crossed
        {
            self.cycles -= 1;
        }
    }

    // -- Memory, with debugger notification on stores --------------------

    pub(crate) fn load_byte(&self, addr: u16) -> u8 {
        self.memory.load_byte(addr)
    }

    pub(crate) fn store_byte(&mut self, addr: u16, value: u8) {
        self.memory.store_byte(addr, value);
        if let Some(dbg) = &mut self.debugger {
            dbg.on_store(addr, value);
        }
    }

    // -- Stack ------------------------------------------------------------

    pub(crate) fn push_byte(&mut self, value: u8) {
        let addr = self.regs.stack_addr();
        self.store_byte(addr, value);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    pub(crate) fn pull_byte(&mut self) -> u8 {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        self.load_byte(self.regs.stack_addr())
    }

    pub(crate) fn push_word(&mut self, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.push_byte(high);
        self.push_byte(low);
    }

    pub(crate) fn pull_word(&mut self) -> u16 {
        let low = self.pull_byte();
        let high = self.pull_byte();
        u16::from_le_bytes([low, high])
    }
}
