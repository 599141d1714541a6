//! End-to-end fetch/decode/execute scenarios, mirroring the worked examples
//! a disassembler or debugger would step through instruction by instruction.

use super::Cpu;
use crate::instr::{InstructionSet, Variant};
use crate::memory::Memory;

fn run(variant: Variant, origin: u16, code: &[u8], steps: usize) -> (Memory, u64, u16, u8, u8) {
    let mut memory = Memory::with_code(origin, code);
    let iset = InstructionSet::new(variant);
    let (cycles, pc, a, x);
    {
        let mut cpu = Cpu::new(&iset, &mut memory);
        cpu.set_pc(origin);
        for _ in 0..steps {
            cpu.step();
        }
        cycles = cpu.cycles;
        pc = cpu.regs.pc;
        a = cpu.regs.a;
        x = cpu.regs.x;
    }
    (memory, cycles, pc, a, x)
}

#[test]
fn store_then_reload_through_absolute_indexed() {
    // LDA #$55 ; STA $1101 ; LDA #$00 ; LDX #$FF ; LDA $1002,X
    let code = [
        0xA9, 0x55, // LDA #$55
        0x8D, 0x01, 0x11, // STA $1101
        0xA9, 0x00, // LDA #$00
        0xA2, 0xFF, // LDX #$FF
        0xBD, 0x02, 0x10, // LDA $1002,X  (-> $1101, page cross)
    ];
    let (memory, cycles, pc, a, _x) = run(Variant::Nmos, 0x1000, &code, 5);

    assert_eq!(pc, 0x100C);
    assert_eq!(cycles, 15);
    assert_eq!(a, 0x55);
    assert_eq!(memory.load_byte(0x1101), 0x55);
}

#[test]
fn undefined_cmos_opcodes_run_as_declared_width_nops() {
    let code = [0x02, 0x00, 0x03, 0x07, 0x0B, 0x0F, 0xFC, 0x01, 0x02];
    let (_memory, cycles, pc, _a, _x) = run(Variant::Cmos, 0x2000, &code, 6);

    assert_eq!(pc, 0x2000 + 9);
    assert_eq!(cycles, 10);
}

#[test]
fn three_pushes_land_at_descending_stack_addresses() {
    let code = [
        0xA9, 0x11, 0x48, // LDA #$11 ; PHA
        0xA9, 0x12, 0x48, // LDA #$12 ; PHA
        0xA9, 0x13, 0x48, // LDA #$13 ; PHA
    ];
    let mut memory = Memory::with_code(0x1000, &code);
    let iset = InstructionSet::new(Variant::Nmos);
    let mut cpu = Cpu::new(&iset, &mut memory);
    cpu.set_pc(0x1000);
    for _ in 0..6 {
        cpu.step();
    }

    assert_eq!(cpu.regs.sp, 0xFC);
    assert_eq!(cpu.regs.a, 0x13);
    drop(cpu);
    assert_eq!(memory.load_byte(0x01FF), 0x11);
    assert_eq!(memory.load_byte(0x01FE), 0x12);
    assert_eq!(memory.load_byte(0x01FD), 0x13);
}

#[test]
fn nmos_indirect_jmp_wraps_at_page_boundary() {
    let mut memory = Memory::with_code(0x1000, &[0x6C, 0xFF, 0x12]); // JMP ($12FF)
    memory.store_byte(0x12FF, 0x34);
    memory.store_byte(0x1200, 0x56);
    memory.store_byte(0x1300, 0x99); // must be ignored by the NMOS bug

    let iset = InstructionSet::new(Variant::Nmos);
    let mut cpu = Cpu::new(&iset, &mut memory);
    cpu.set_pc(0x1000);
    cpu.step();

    assert_eq!(cpu.regs.pc, 0x5634);
}

#[test]
fn cmos_indirect_jmp_fixes_the_wrap_and_charges_a_cycle() {
    let mut memory = Memory::with_code(0x1000, &[0x6C, 0xFF, 0x12]); // JMP ($12FF)
    memory.store_byte(0x12FF, 0x34);
    memory.store_byte(0x1200, 0x99); // must be ignored on CMOS
    memory.store_byte(0x1300, 0x56);

    let iset = InstructionSet::new(Variant::Cmos);
    let mut cpu = Cpu::new(&iset, &mut memory);
    cpu.set_pc(0x1000);
    cpu.step();

    assert_eq!(cpu.regs.pc, 0x5634);
    assert_eq!(cpu.cycles, 6); // 5 base + 1 for the $FF low byte
}

#[test]
fn decimal_adc_nmos_uses_binary_overflow_regardless_of_mode() {
    let code = [0xA9, 0x79, 0x69, 0x35]; // LDA #$79 ; ADC #$35  (in decimal mode)
    let mut memory = Memory::with_code(0x1000, &code);
    let iset = InstructionSet::new(Variant::Nmos);
    let mut cpu = Cpu::new(&iset, &mut memory);
    cpu.set_pc(0x1000);
    cpu.regs.decimal = true;
    cpu.step();
    cpu.step();

    // 79 + 35 BCD = 114 decimal, carries into a new hundreds digit.
    assert_eq!(cpu.regs.a, 0x14);
    assert!(cpu.regs.carry);
}

#[test]
fn brk_pushes_return_address_and_status_with_break_set() {
    let code = [0x00]; // BRK
    let mut memory = Memory::with_code(0x1000, &code);
    memory.store_word(0xFFFE, 0x9000);
    let iset = InstructionSet::new(Variant::Nmos);
    let mut cpu = Cpu::new(&iset, &mut memory);
    cpu.set_pc(0x1000);
    cpu.step();

    assert_eq!(cpu.regs.pc, 0x9000);
    assert_eq!(cpu.regs.sp, 0xFC);
    drop(cpu);
    assert_eq!(memory.load_byte(0x01FF), 0x10); // return addr high byte
    assert_eq!(memory.load_byte(0x01FE), 0x02); // return addr low byte
    assert_eq!(memory.load_byte(0x01FD) & 0x30, 0x30); // B and reserved set
}

#[test]
fn custom_brk_handler_bypasses_the_default_sequence() {
    use std::cell::Cell;
    use std::rc::Rc;

    let code = [0x00];
    let mut memory = Memory::with_code(0x1000, &code);
    let iset = InstructionSet::new(Variant::Nmos);
    let mut cpu = Cpu::new(&iset, &mut memory);
    cpu.set_pc(0x1000);

    let trapped = Rc::new(Cell::new(false));
    let trapped_inner = trapped.clone();
    cpu.set_brk_handler(move |_cpu| trapped_inner.set(true));
    cpu.step();

    assert!(trapped.get());
    assert_eq!(cpu.regs.pc, 0x1000); // returned without executing at all
    assert_eq!(cpu.regs.sp, 0xFF); // nothing pushed
    assert_eq!(cpu.cycles, 0); // no cycles charged either
}
