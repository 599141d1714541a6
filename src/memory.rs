//! 64 KiB byte-addressable memory.
//!
//! http://www.6502.org/

/// A flat 64 KiB address space. All reads and writes are total: there is no
/// such thing as a failing memory access, only wrapping or zero-padding at
/// the edges of the address space.
pub struct Memory {
    bytes: [u8; Memory::SIZE],
}

impl Memory {
    pub const SIZE: usize = 0x1_0000;

    pub fn new() -> Memory {
        Memory {
            bytes: [0; Memory::SIZE],
        }
    }

    /// Build memory pre-loaded with `code` at `origin`, wrapping if the code
    /// runs past the end of the address space.
    pub fn with_code(origin: u16, code: &[u8]) -> Memory {
        let mut memory = Memory::new();
        memory.store_bytes(origin, code);
        memory
    }

    pub fn load_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    /// Copies `out.len()` bytes starting at `addr` into `out`. Unlike word
    /// access, a multi-byte range is never treated as wrapping: anything
    /// past address `0xFFFF` reads as zero.
    pub fn load_bytes(&self, addr: u16, out: &mut [u8]) {
        for (i, slot) in out.iter_mut().enumerate() {
            let a = addr as usize + i;
            *slot = if a <= 0xFFFF { self.bytes[a] } else { 0 };
        }
    }

    /// NMOS-style word load: on most addresses this is the little-endian
    /// word at `addr`/`addr+1`, but when `addr`'s low byte is `0xFF` the
    /// high byte wraps back to the start of the same page rather than
    /// spilling into the next one. This bug is intentionally preserved,
    /// since it is emulated behavior, not a host bug.
    pub fn load_word(&self, addr: u16) -> u16 {
        let low = self.load_byte(addr);
        let high = if addr & 0xFF == 0xFF {
            self.load_byte(addr & 0xFF00)
        } else {
            self.load_byte(addr.wrapping_add(1))
        };
        u16::from_le_bytes([low, high])
    }

    pub fn store_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }

    pub fn store_bytes(&mut self, addr: u16, values: &[u8]) {
        let mut a = addr;
        for &value in values {
            self.bytes[a as usize] = value;
            a = a.wrapping_add(1);
        }
    }

    /// Mirrors `load_word`'s wrap rule on the way back out.
    pub fn store_word(&mut self, addr: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.store_byte(addr, low);
        if addr & 0xFF == 0xFF {
            self.store_byte(addr & 0xFF00, high);
        } else {
            self.store_byte(addr.wrapping_add(1), high);
        }
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_load_store_roundtrip() {
        let mut mem = Memory::new();
        mem.store_byte(0x1234, 0x42);
        assert_eq!(mem.load_byte(0x1234), 0x42);
    }

    #[test]
    fn word_load_store_normal() {
        let mut mem = Memory::new();
        mem.store_word(0x1000, 0xABCD);
        assert_eq!(mem.load_byte(0x1000), 0xCD);
        assert_eq!(mem.load_byte(0x1001), 0xAB);
        assert_eq!(mem.load_word(0x1000), 0xABCD);
    }

    #[test]
    fn word_load_wraps_at_page_boundary() {
        let mut mem = Memory::new();
        // Low byte at $12FF, high byte should come from $1200, not $1300.
        mem.store_byte(0x12FF, 0x34);
        mem.store_byte(0x1300, 0x56);
        mem.store_byte(0x1200, 0x78);
        assert_eq!(mem.load_word(0x12FF), 0x7834);
    }

    #[test]
    fn word_store_wraps_at_page_boundary() {
        let mut mem = Memory::new();
        mem.store_word(0x12FF, 0x5634);
        assert_eq!(mem.load_byte(0x12FF), 0x34);
        assert_eq!(mem.load_byte(0x1200), 0x56);
        // Unwrapped neighbor must be untouched.
        assert_eq!(mem.load_byte(0x1300), 0x00);
    }

    #[test]
    fn load_bytes_pads_with_zero_past_end_of_address_space() {
        let mut mem = Memory::new();
        mem.store_byte(0xFFFF, 0x11);
        mem.store_byte(0x0000, 0x22);
        let mut out = [0u8; 2];
        mem.load_bytes(0xFFFF, &mut out);
        assert_eq!(out, [0x11, 0x00]);
    }
}
