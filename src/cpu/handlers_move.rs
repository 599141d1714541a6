//! Loads, stores, register transfers, and increment/decrement.

use super::Cpu;
use crate::instr::Instruction;

pub fn lda(cpu: &mut Cpu, instr: &Instruction) {
    let addr = cpu.resolve_address(instr.mode, instr.page_cross_extra);
    cpu.regs.a = cpu.load_byte(addr);
    cpu.regs.set_zn(cpu.regs.a);
}

pub fn ldx(cpu: &mut Cpu, instr: &Instruction) {
    let addr = cpu.resolve_address(instr.mode, instr.page_cross_extra);
    cpu.regs.x = cpu.load_byte(addr);
    cpu.regs.set_zn(cpu.regs.x);
}

pub fn ldy(cpu: &mut Cpu, instr: &Instruction) {
    let addr = cpu.resolve_address(instr.mode, instr.page_cross_extra);
    cpu.regs.y = cpu.load_byte(addr);
    cpu.regs.set_zn(cpu.regs.y);
}

pub fn sta(cpu: &mut Cpu, instr: &Instruction) {
    let addr = cpu.resolve_address(instr.mode, instr.page_cross_extra);
    let value = cpu.regs.a;
    cpu.store_byte(addr, value);
}

pub fn stx(cpu: &mut Cpu, instr: &Instruction) {
    let addr = cpu.resolve_address(instr.mode, instr.page_cross_extra);
    let value = cpu.regs.x;
    cpu.store_byte(addr, value);
}

pub fn sty(cpu: &mut Cpu, instr: &Instruction) {
    let addr = cpu.resolve_address(instr.mode, instr.page_cross_extra);
    let value = cpu.regs.y;
    cpu.store_byte(addr, value);
}

/// CMOS-only: stores zero, leaving flags untouched.
pub fn stz(cpu: &mut Cpu, instr: &Instruction) {
    let addr = cpu.resolve_address(instr.mode, instr.page_cross_extra);
    cpu.store_byte(addr, 0);
}

pub fn tax(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.x = cpu.regs.a;
    cpu.regs.set_zn(cpu.regs.x);
}

pub fn tay(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.y = cpu.regs.a;
    cpu.regs.set_zn(cpu.regs.y);
}

pub fn txa(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.a = cpu.regs.x;
    cpu.regs.set_zn(cpu.regs.a);
}

pub fn tya(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.a = cpu.regs.y;
    cpu.regs.set_zn(cpu.regs.a);
}

pub fn tsx(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.x = cpu.regs.sp;
    cpu.regs.set_zn(cpu.regs.x);
}

/// Unlike the other transfers, TXS does not touch the flags: SP is not an
/// arithmetic register.
pub fn txs(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.sp = cpu.regs.x;
}

pub fn inc(cpu: &mut Cpu, instr: &Instruction) {
    let addr = cpu.resolve_address(instr.mode, instr.page_cross_extra);
    cpu.cmos_rmw_discount(instr.mode);
    let value = cpu.load_byte(addr).wrapping_add(1);
    cpu.store_byte(addr, value);
    cpu.regs.set_zn(value);
}

/// CMOS-only: `INC A`.
pub fn inc_acc(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.a = cpu.regs.a.wrapping_add(1);
    cpu.regs.set_zn(cpu.regs.a);
}

pub fn inx(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.x = cpu.regs.x.wrapping_add(1);
    cpu.regs.set_zn(cpu.regs.x);
}

pub fn iny(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.y = cpu.regs.y.wrapping_add(1);
    cpu.regs.set_zn(cpu.regs.y);
}

pub fn dec(cpu: &mut Cpu, instr: &Instruction) {
    let addr = cpu.resolve_address(instr.mode, instr.page_cross_extra);
    cpu.cmos_rmw_discount(instr.mode);
    let value = cpu.load_byte(addr).wrapping_sub(1);
    cpu.store_byte(addr, value);
    cpu.regs.set_zn(value);
}

/// CMOS-only: `DEC A`.
pub fn dec_acc(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.a = cpu.regs.a.wrapping_sub(1);
    cpu.regs.set_zn(cpu.regs.a);
}

pub fn dex(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.x = cpu.regs.x.wrapping_sub(1);
    cpu.regs.set_zn(cpu.regs.x);
}

pub fn dey(cpu: &mut Cpu, _instr: &Instruction) {
    cpu.regs.y = cpu.regs.y.wrapping_sub(1);
    cpu.regs.set_zn(cpu.regs.y);
}
