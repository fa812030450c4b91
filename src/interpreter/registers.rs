use super::error::{Error, Result};
use super::opcode::Register;

pub const STACK_DEPTH: usize = 16;

/// General registers, index, timers, program counter and the call stack.
#[derive(Debug, Default)]
pub struct Registers {
    v: [u8; 16],
    i: u16,
    delay_timer: u8,
    sound_timer: u8,
    /// Program-relative; 0 is the first byte of the loaded program.
    pc: u16,
    stack_pointer: u8,
    stack: [u16; STACK_DEPTH],
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn v(&self, reg: Register) -> u8 {
        self.v[reg.index()]
    }

    pub fn set_v(&mut self, reg: Register, value: u8) {
        self.v[reg.index()] = value;
    }

    /// VF, the carry/borrow/collision flag.
    pub fn set_flag(&mut self, set: bool) {
        self.v[0xF] = set as u8;
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn set_i(&mut self, value: u16) {
        self.i = value;
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Move past `count` instructions.
    pub fn advance(&mut self, count: u16) {
        self.pc = self.pc.wrapping_add(2 * count);
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        let sp = self.stack_pointer as usize;
        if sp == STACK_DEPTH {
            return Err(Error::StackOverflow);
        }
        self.stack[sp] = addr;
        self.stack_pointer += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.stack_pointer == 0 {
            return Err(Error::StackUnderflow);
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer as usize])
    }

    /// One 60 Hz tick: both timers count down to zero.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}
