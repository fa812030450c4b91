pub mod error;
mod execute;
mod font;
pub mod io;
pub mod memory;
pub mod opcode;
pub mod registers;
pub mod timer;

use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use std::time::Instant;

pub use error::{Error, LoadError, Result};
pub use execute::Flow;
pub use io::{DisplaySink, FrameBuffer, InputSource};
use memory::Memory;
use opcode::{decode, Register};
use registers::Registers;
use timer::TimerClock;

/// Where the loop is between iterations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Running,
    /// Suspended on LD Vx, K until a key goes down.
    AwaitingKey(Register),
    Halted,
}

/// The whole machine: memory, registers and the loop state. Display and
/// input stay with the host and are lent to each step.
pub struct Machine {
    memory: Memory,
    registers: Registers,
    rng: StdRng,
    state: State,
    clock: TimerClock,
    /// Display changed since the last present.
    dirty: bool,
}

impl Machine {
    pub fn new(program: &[u8], rng: StdRng) -> Result<Self> {
        let memory = Memory::load(program)?;
        info!("loaded {} byte program", memory.program_len());
        Ok(Machine {
            memory,
            registers: Registers::new(),
            rng,
            state: State::Running,
            clock: TimerClock::new(Instant::now()),
            dirty: false,
        })
    }

    /// Read a ROM from disk and load it.
    pub fn from_file(path: impl AsRef<std::path::Path>, rng: StdRng) -> Result<Self> {
        let program = std::fs::read(path).map_err(LoadError::Io)?;
        Self::new(&program, rng)
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn sound_active(&self) -> bool {
        self.registers.sound_timer() != 0
    }

    /// One loop iteration: execute (or keep waiting for a key), tick the
    /// timers, present the display if it changed, then check for quit.
    /// A fault halts the machine and is returned; later calls do nothing.
    pub fn step(
        &mut self,
        display: &mut impl DisplaySink,
        input: &mut impl InputSource,
    ) -> Result<State> {
        self.step_at(Instant::now(), display, input)
    }

    /// [`Machine::step`] with the timers measured against `now`.
    pub fn step_at(
        &mut self,
        now: Instant,
        display: &mut impl DisplaySink,
        input: &mut impl InputSource,
    ) -> Result<State> {
        match self.state {
            State::Halted => return Ok(State::Halted),
            State::AwaitingKey(x) => {
                if let Some(key) = input.wait_for_keydown() {
                    debug!("key {key:X} down, resuming");
                    self.registers.set_v(x, key & 0xF);
                    self.registers.advance(1);
                    self.state = State::Running;
                }
            }
            State::Running => {
                if let Err(e) = self.cycle(display, input) {
                    error!("halting at pc {:#06X}: {e}", self.registers.pc());
                    self.state = State::Halted;
                    return Err(e);
                }
            }
        }

        self.tick_timers(now);

        if self.dirty {
            display.present();
            self.dirty = false;
        }

        if input.poll_terminate() {
            info!("terminate requested");
            self.state = State::Halted;
        }
        Ok(self.state)
    }

    /// Step until the host asks to stop or something goes wrong.
    pub fn run(
        &mut self,
        display: &mut impl DisplaySink,
        input: &mut impl InputSource,
    ) -> Result<()> {
        while self.step(display, input)? != State::Halted {}
        Ok(())
    }

    /// Apply every 60 Hz timer tick that has elapsed by `now`.
    pub fn tick_timers(&mut self, now: Instant) {
        for _ in 0..self.clock.ticks(now).min(u8::MAX as u32) {
            self.registers.tick_timers();
        }
    }

    fn cycle(
        &mut self,
        display: &mut impl DisplaySink,
        input: &mut impl InputSource,
    ) -> Result<()> {
        let pc = self.registers.pc();
        let word = self.memory.fetch(pc)?;
        let op = decode(word);
        trace!("{pc:#06X}: {word:04X}  {op}");

        match self.execute(op, display, input)? {
            Flow::Next => self.registers.advance(1),
            Flow::Skip => self.registers.advance(2),
            Flow::Jumped => (),
            Flow::AwaitKey(x) => {
                debug!("waiting for key into {x}");
                self.state = State::AwaitingKey(x);
            }
        }
        Ok(())
    }
}
