//! Cycle-accurate 6502/65C02 emulation and a macro assembler that targets
//! it.
//!
//! The CPU core (`cpu`, `instr`, `registers`, `memory`, `debugger`) and the
//! assembler (`asm`) are independent: the assembler emits bytes and a
//! source map, the CPU executes bytes, and nothing in either module
//! depends on the other's types.

pub mod asm;
pub mod cpu;
pub mod debugger;
pub mod instr;
pub mod memory;
pub mod registers;

pub use cpu::Cpu;
pub use debugger::{Breakpoint, DataBreakpoint, DebugHandler, Debugger};
pub use instr::{InstructionSet, Variant};
pub use memory::Memory;
pub use registers::Registers;
