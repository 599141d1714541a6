//! Assemble-then-step scenarios: each one assembles a short program, loads
//! the emitted code into memory at its origin, and steps the CPU, checking
//! the resulting registers/memory/cycle count.

use mos6502_toolchain::asm::{self, AssembleOptions};
use mos6502_toolchain::{Cpu, InstructionSet, Memory, Variant};

fn assemble_ok(source: &str, origin: u16) -> Vec<u8> {
    let options = AssembleOptions {
        origin,
        ..AssembleOptions::default()
    };
    let (assembly, _map, sentinel) = asm::assemble(source, "<test>", &options, None);
    assert!(sentinel.is_none(), "unexpected assembly errors: {:?}", assembly.errors);
    assembly.code
}

#[test]
fn store_program_lands_expected_bytes_and_registers() {
    let code = assemble_ok("LDA #$5E\nSTA $15\nSTA $1500\n", 0x1000);
    let mut memory = Memory::with_code(0x1000, &code);
    let instructions = InstructionSet::new(Variant::Nmos);
    let mut cpu = Cpu::new(&instructions, &mut memory);
    cpu.set_pc(0x1000);

    for _ in 0..3 {
        cpu.step();
    }

    assert_eq!(cpu.regs.pc, 0x1007);
    assert_eq!(cpu.cycles, 9);
    assert_eq!(cpu.regs.a, 0x5E);
    assert_eq!(cpu.memory().load_byte(0x15), 0x5E);
    assert_eq!(cpu.memory().load_byte(0x1500), 0x5E);
}

#[test]
fn indexed_load_charges_a_page_cross_cycle() {
    let code = assemble_ok(
        "LDA #$55\nSTA $1101\nLDA #$00\nLDX #$FF\nLDA $1002,X\n",
        0x1000,
    );
    let mut memory = Memory::with_code(0x1000, &code);
    let instructions = InstructionSet::new(Variant::Nmos);
    let mut cpu = Cpu::new(&instructions, &mut memory);
    cpu.set_pc(0x1000);

    for _ in 0..5 {
        cpu.step();
    }

    assert_eq!(cpu.regs.pc, 0x100C);
    assert_eq!(cpu.cycles, 15);
    assert_eq!(cpu.regs.a, 0x55);
    assert_eq!(cpu.memory().load_byte(0x1101), 0x55);
}

#[test]
fn undefined_cmos_opcodes_decode_without_panicking() {
    let code = assemble_ok(
        ".arch 65c02\n.hex 02 00 03 07 0B 0F FC 01 02\n",
        0x1000,
    );
    let mut memory = Memory::with_code(0x1000, &code);
    let instructions = InstructionSet::new(Variant::Cmos);
    let mut cpu = Cpu::new(&instructions, &mut memory);
    cpu.set_pc(0x1000);

    for _ in 0..6 {
        cpu.step();
    }

    assert_eq!(cpu.regs.pc, 0x1000 + 9);
    assert_eq!(cpu.cycles, 10);
}

#[test]
fn three_pushes_leave_stack_and_pointer_in_order() {
    let code = assemble_ok(
        "LDA #$11\nPHA\nLDA #$12\nPHA\nLDA #$13\nPHA\n",
        0x1000,
    );
    let mut memory = Memory::with_code(0x1000, &code);
    let instructions = InstructionSet::new(Variant::Nmos);
    let mut cpu = Cpu::new(&instructions, &mut memory);
    cpu.set_pc(0x1000);

    for _ in 0..6 {
        cpu.step();
    }

    assert_eq!(cpu.regs.sp, 0xFC);
    assert_eq!(cpu.regs.a, 0x13);
    assert_eq!(cpu.memory().load_byte(0x1FF), 0x11);
    assert_eq!(cpu.memory().load_byte(0x1FE), 0x12);
    assert_eq!(cpu.memory().load_byte(0x1FD), 0x13);
}

#[test]
fn nmos_indirect_jmp_reproduces_the_page_wrap_bug() {
    let mut memory = Memory::new();
    memory.store_byte(0x12FF, 0x34);
    memory.store_byte(0x1300, 0x56);
    memory.store_byte(0x1200, 0x78);
    memory.store_byte(0x1000, 0x6C); // JMP (ind)
    memory.store_byte(0x1001, 0xFF);
    memory.store_byte(0x1002, 0x12);

    let instructions = InstructionSet::new(Variant::Nmos);
    let mut cpu = Cpu::new(&instructions, &mut memory);
    cpu.set_pc(0x1000);
    cpu.step();

    assert_eq!(cpu.regs.pc, 0x7834);
}

#[test]
fn cmos_indirect_jmp_fixes_the_page_wrap_and_charges_an_extra_cycle() {
    let mut memory = Memory::new();
    memory.store_byte(0x12FF, 0x34);
    memory.store_byte(0x1300, 0x56);
    memory.store_byte(0x1200, 0x78);
    memory.store_byte(0x1000, 0x6C); // JMP (ind)
    memory.store_byte(0x1001, 0xFF);
    memory.store_byte(0x1002, 0x12);

    let instructions = InstructionSet::new(Variant::Cmos);
    let mut cpu = Cpu::new(&instructions, &mut memory);
    cpu.set_pc(0x1000);
    let cycles_before = cpu.cycles;
    cpu.step();

    assert_eq!(cpu.regs.pc, 0x5634);
    assert_eq!(cpu.cycles - cycles_before, 6);
}

#[test]
fn assembled_program_round_trips_through_its_source_map_crc() {
    let options = AssembleOptions {
        origin: 0x1000,
        ..AssembleOptions::default()
    };
    let (assembly, map, sentinel) =
        asm::assemble("start: LDA #$01\n.export start\n", "<test>", &options, None);
    assert!(sentinel.is_none());
    assert_eq!(map.crc, crc32fast::hash(&assembly.code));
    assert_eq!(map.exports, vec![("start".to_string(), 0x1000)]);
}
