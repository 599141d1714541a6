//! Flag-setting instructions, NOP, and the filler handler for unused
//! opcode slots.

use super::Cpu;
use crate::instr::Instruction;

/// Bound to every opcode slot `InstructionSet` doesn't assign a concrete
/// instruction to. `step` already charged the slot's declared cycles and
/// advanced PC past its declared length; there is nothing left to do.
pub fn unused(_cpu: &mut Cpu, _instr: &Instruction) {}

pub fn nop(_cpu: &mut Cpu, _instr: &Instruction) {}

pub fn clc(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.carry = false;
}

pub fn sec(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.carry = true;
}

pub fn cli(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.interrupt_disable = false;
}

pub fn sei(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.interrupt_disable = true;
}

pub fn clv(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.overflow = false;
}

pub fn cld(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.decimal = false;
}

pub fn sed(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.decimal = true;
}
