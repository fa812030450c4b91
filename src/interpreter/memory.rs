use log::warn;

use super::error::{Error, LoadError, Result};
use super::font::{FONT, GLYPH_SIZE};

pub const MEMORY_SIZE: usize = 4096;
/// Where programs are loaded. Addresses in jump/call opcodes assume this base.
pub const PROGRAM_START: usize = 0x200;
/// The glyph table sits directly before the program.
pub const FONT_START: usize = PROGRAM_START - FONT.len();
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START;

/// Flat 4K byte store holding the glyph table and the loaded program.
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
    program_len: usize,
}

impl Memory {
    /// Place the glyph table and `program` into a fresh memory image.
    pub fn load(program: &[u8]) -> std::result::Result<Self, LoadError> {
        if program.is_empty() {
            return Err(LoadError::Empty);
        }
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::TooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        let mut bytes = [0_u8; MEMORY_SIZE];
        bytes[FONT_START..PROGRAM_START].copy_from_slice(&FONT);
        bytes[PROGRAM_START..PROGRAM_START + program.len()].copy_from_slice(program);
        Ok(Memory {
            bytes,
            program_len: program.len(),
        })
    }

    pub fn read_byte(&self, addr: usize) -> Result<u8> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(Error::OutOfBounds { addr })
    }

    pub fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        let byte = self.bytes.get_mut(addr).ok_or(Error::OutOfBounds { addr })?;
        *byte = value;
        Ok(())
    }

    /// Big-endian word from `addr` and `addr + 1`.
    pub fn read_word(&self, addr: usize) -> Result<u16> {
        Ok(u16::from_be_bytes([
            self.read_byte(addr)?,
            self.read_byte(addr + 1)?,
        ]))
    }

    /// Fetch the instruction at program-relative `pc`. Fetching outside the
    /// loaded program is an out of bounds access.
    pub fn fetch(&self, pc: u16) -> Result<u16> {
        let offset = pc as usize;
        if offset + 1 >= self.program_len {
            return Err(Error::OutOfBounds {
                addr: PROGRAM_START + offset,
            });
        }
        self.read_word(PROGRAM_START + offset)
    }

    /// Address of the glyph for hex digit `digit` (low nibble only).
    pub fn glyph_addr(digit: u8) -> u16 {
        if digit > 0xF {
            warn!("glyph {digit:#04X} out of range, using low nibble");
        }
        (FONT_START + (digit & 0xF) as usize * GLYPH_SIZE) as u16
    }

    pub fn program_len(&self) -> usize {
        self.program_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let m = Memory::load(&[0x00, 0xe0])?;
        assert_eq!(m.read_byte(0x200)?, 0x00);
        assert_eq!(m.read_byte(0x201)?, 0xe0);
        assert_eq!(m.program_len(), 2);
        Ok(())
    }

    #[test]
    fn test_font_before_program() -> Result<()> {
        let m = Memory::load(&[0x12, 0x00])?;
        assert_eq!(FONT_START, 0x1b0);
        assert_eq!(m.bytes[FONT_START..PROGRAM_START], FONT);
        assert_eq!(m.bytes[..FONT_START], [0; FONT_START]);
        Ok(())
    }

    #[test]
    fn test_rejects_empty_program() {
        assert!(matches!(Memory::load(&[]), Err(LoadError::Empty)));
    }

    #[test]
    fn test_rejects_oversized_program() {
        let prog = vec![0; MAX_PROGRAM_SIZE + 1];
        assert!(matches!(
            Memory::load(&prog),
            Err(LoadError::TooLarge { size: 3585, max: 3584 })
        ));
        assert!(Memory::load(&prog[1..]).is_ok());
    }

    #[test]
    fn test_read_word() -> Result<()> {
        let mut m = Memory::load(&[0xa2, 0x2a])?;
        m.write_byte(0x300, 0x04)?;
        m.write_byte(0x301, 0x05)?;
        assert_eq!(m.read_word(0x300)?, 0x0405);
        assert_eq!(m.read_word(0x200)?, 0xa22a);
        Ok(())
    }

    #[test]
    fn test_out_of_bounds() -> Result<()> {
        let mut m = Memory::load(&[0x00, 0xe0])?;
        assert!(matches!(
            m.read_byte(4096),
            Err(Error::OutOfBounds { addr: 4096 })
        ));
        assert!(matches!(
            m.write_byte(5000, 1),
            Err(Error::OutOfBounds { addr: 5000 })
        ));
        assert!(matches!(
            m.read_word(4095),
            Err(Error::OutOfBounds { addr: 4096 })
        ));
        Ok(())
    }

    #[test]
    fn test_fetch_stays_in_program() -> Result<()> {
        let m = Memory::load(&[0x00, 0xe0, 0x12, 0x00])?;
        assert_eq!(m.fetch(0)?, 0x00e0);
        assert_eq!(m.fetch(2)?, 0x1200);
        assert!(matches!(
            m.fetch(4),
            Err(Error::OutOfBounds { addr: 0x204 })
        ));
        Ok(())
    }

    #[test]
    fn test_glyph_addr() {
        assert_eq!(Memory::glyph_addr(0), 0x1b0);
        assert_eq!(Memory::glyph_addr(0xa), 0x1b0 + 50);
        assert_eq!(Memory::glyph_addr(0x1f), 0x1b0 + 75);
    }

    #[test]
    fn test_glyph_addr_out_of_range_uses_low_nibble() {
        assert_eq!(Memory::glyph_addr(0xff), Memory::glyph_addr(0xf));
        assert_eq!(Memory::glyph_addr(0x10), FONT_START as u16);
    }
}
