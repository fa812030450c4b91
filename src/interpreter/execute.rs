use log::warn;
use rand::Rng;

use super::error::{Error, Result};
use super::io::{DisplaySink, InputSource, HEIGHT, WIDTH};
use super::memory::{Memory, PROGRAM_START};
use super::opcode::{Instruction, Register};
use super::Machine;

/// What the loop should do with PC after an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Move on to the following instruction.
    Next,
    /// Skip over the following instruction.
    Skip,
    /// PC was set by the instruction itself.
    Jumped,
    /// Suspend until a key goes down, then store it in the register.
    AwaitKey(Register),
}

impl Flow {
    fn skip_if(cond: bool) -> Self {
        if cond {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

/// Opcode addresses assume the program sits at 0x200; PC counts from the
/// first program byte and must land on an instruction boundary.
fn rebase(addr: u16) -> Result<u16> {
    let pc = addr
        .checked_sub(PROGRAM_START as u16)
        .ok_or(Error::OutOfBounds {
            addr: addr as usize,
        })?;
    if pc % 2 != 0 {
        return Err(Error::Misaligned {
            addr: addr as usize,
        });
    }
    Ok(pc)
}

fn key_of(value: u8) -> u8 {
    if value > 0xF {
        warn!("key {value:#04X} out of range, using low nibble");
    }
    value & 0xF
}

impl Machine {
    pub(super) fn execute(
        &mut self,
        op: Instruction,
        display: &mut impl DisplaySink,
        input: &mut impl InputSource,
    ) -> Result<Flow> {
        use Instruction::*;

        let regs = &mut self.registers;
        let flow = match op {
            Cls => {
                display.clear();
                self.dirty = true;
                Flow::Next
            }
            Ret => {
                let pc = regs.pop()?;
                regs.set_pc(pc);
                Flow::Next
            }
            Jp(addr) => {
                regs.set_pc(rebase(addr.get())?);
                Flow::Jumped
            }
            Call(addr) => {
                let target = rebase(addr.get())?;
                regs.push(regs.pc())?;
                regs.set_pc(target);
                Flow::Jumped
            }
            SeByte(x, kk) => Flow::skip_if(regs.v(x) == kk),
            SneByte(x, kk) => Flow::skip_if(regs.v(x) != kk),
            SeReg(x, y) => Flow::skip_if(regs.v(x) == regs.v(y)),
            SneReg(x, y) => Flow::skip_if(regs.v(x) != regs.v(y)),
            LdByte(x, kk) => {
                regs.set_v(x, kk);
                Flow::Next
            }
            AddByte(x, kk) => {
                regs.set_v(x, regs.v(x).wrapping_add(kk));
                Flow::Next
            }
            LdReg(x, y) => {
                regs.set_v(x, regs.v(y));
                Flow::Next
            }
            Or(x, y) => {
                regs.set_v(x, regs.v(x) | regs.v(y));
                Flow::Next
            }
            And(x, y) => {
                regs.set_v(x, regs.v(x) & regs.v(y));
                Flow::Next
            }
            Xor(x, y) => {
                regs.set_v(x, regs.v(x) ^ regs.v(y));
                Flow::Next
            }
            AddReg(x, y) => {
                let (sum, carry) = regs.v(x).overflowing_add(regs.v(y));
                regs.set_v(x, sum);
                regs.set_flag(carry);
                Flow::Next
            }
            Sub(x, y) => {
                let (vx, vy) = (regs.v(x), regs.v(y));
                regs.set_v(x, vx.wrapping_sub(vy));
                regs.set_flag(vx >= vy);
                Flow::Next
            }
            Subn(x, y) => {
                let (vx, vy) = (regs.v(x), regs.v(y));
                regs.set_v(x, vy.wrapping_sub(vx));
                regs.set_flag(vy >= vx);
                Flow::Next
            }
            Shr(x, _) => {
                let vx = regs.v(x);
                regs.set_v(x, vx >> 1);
                regs.set_flag(vx & 0x01 != 0);
                Flow::Next
            }
            Shl(x, _) => {
                let vx = regs.v(x);
                regs.set_v(x, vx << 1);
                regs.set_flag(vx & 0x80 != 0);
                Flow::Next
            }
            LdI(addr) => {
                regs.set_i(addr.get());
                Flow::Next
            }
            // V0 is added to the absolute address, then the sum is rebased once.
            JpV0(addr) => {
                let target = addr.get() + regs.v(Register::new(0)) as u16;
                regs.set_pc(rebase(target)?);
                Flow::Jumped
            }
            Rnd(x, kk) => {
                let value: u8 = self.rng.gen();
                regs.set_v(x, value & kk);
                Flow::Next
            }
            Drw(x, y, n) => {
                let (x0, y0) = (regs.v(x) as usize, regs.v(y) as usize);
                let base = regs.i() as usize;
                let mut collided = false;
                for row in 0..n.get() as usize {
                    let sprite = self.memory.read_byte(base + row)?;
                    for col in 0..8 {
                        if sprite & (0x80 >> col) != 0 {
                            let (px, py) = ((x0 + col) % WIDTH, (y0 + row) % HEIGHT);
                            collided |= display.set_pixel(px, py, true);
                        }
                    }
                }
                regs.set_flag(collided);
                self.dirty = true;
                Flow::Next
            }
            Skp(x) => Flow::skip_if(input.is_down(key_of(regs.v(x)))),
            Sknp(x) => Flow::skip_if(!input.is_down(key_of(regs.v(x)))),
            LdVxDt(x) => {
                regs.set_v(x, regs.delay_timer());
                Flow::Next
            }
            LdVxK(x) => Flow::AwaitKey(x),
            LdDtVx(x) => {
                regs.set_delay_timer(regs.v(x));
                Flow::Next
            }
            LdStVx(x) => {
                regs.set_sound_timer(regs.v(x));
                Flow::Next
            }
            AddIVx(x) => {
                regs.set_i(regs.i().wrapping_add(regs.v(x) as u16));
                Flow::Next
            }
            LdFVx(x) => {
                regs.set_i(Memory::glyph_addr(regs.v(x)));
                Flow::Next
            }
            LdBVx(x) => {
                let (value, base) = (regs.v(x), regs.i() as usize);
                self.memory.write_byte(base, value / 100)?;
                self.memory.write_byte(base + 1, value / 10 % 10)?;
                self.memory.write_byte(base + 2, value % 10)?;
                Flow::Next
            }
            // I is only read here, so it holds its pre-call value afterwards.
            StoreRegs(x) => {
                let base = regs.i() as usize;
                for n in 0..=x.index() {
                    let value = regs.v(Register::new(n as u8));
                    self.memory.write_byte(base + n, value)?;
                }
                Flow::Next
            }
            LoadRegs(x) => {
                let base = regs.i() as usize;
                for n in 0..=x.index() {
                    let value = self.memory.read_byte(base + n)?;
                    regs.set_v(Register::new(n as u8), value);
                }
                Flow::Next
            }
            Unknown(opcode) => {
                return Err(Error::UnknownOpcode {
                    opcode,
                    pc: regs.pc(),
                })
            }
        };
        Ok(flow)
    }
}
