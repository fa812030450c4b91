//! Runs a [`Machine`] inside the `chip8_base` window, which owns the event
//! loop, the surface and the buzzer.

use chip8_base::{Display, Interpreter, Keys, Pixel};
use log::error;
use std::time::Duration;

use crate::interpreter::{FrameBuffer, InputSource, Machine};

/// Keypad state as reported by the window, one snapshot per step.
pub struct Keypad {
    down: Keys,
    previous: Keys,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad {
            down: [false; 16],
            previous: [false; 16],
        }
    }

    pub fn update(&mut self, keys: &Keys) {
        self.previous = self.down;
        self.down = *keys;
    }
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for Keypad {
    fn is_down(&mut self, key: u8) -> bool {
        self.down[(key & 0xF) as usize]
    }

    fn wait_for_keydown(&mut self) -> Option<u8> {
        (0..16)
            .find(|&k| self.down[k] && !self.previous[k])
            .map(|k| k as u8)
    }

    // the window closing ends the process
    fn poll_terminate(&mut self) -> bool {
        false
    }
}

pub struct Chip8Host {
    machine: Machine,
    screen: FrameBuffer,
    keypad: Keypad,
    speed: Duration,
}

impl Chip8Host {
    pub fn new(machine: Machine, speed: Duration) -> Self {
        Chip8Host {
            machine,
            screen: FrameBuffer::new(),
            keypad: Keypad::new(),
            speed,
        }
    }
}

impl Interpreter for Chip8Host {
    fn step(&mut self, keys: &Keys) -> Option<Display> {
        self.keypad.update(keys);
        let frames = self.screen.frames();
        if let Err(e) = self.machine.step(&mut self.screen, &mut self.keypad) {
            error!("{e}");
            std::process::exit(1);
        }
        (self.screen.frames() != frames).then(|| to_display(&self.screen))
    }

    fn speed(&self) -> Duration {
        self.speed
    }

    fn buzzer_active(&self) -> bool {
        self.machine.sound_active()
    }
}

fn to_display(screen: &FrameBuffer) -> Display {
    let mut display = [[Pixel::default(); 64]; 32];
    for (row, cells) in display.iter_mut().zip(screen.rows()) {
        for (pixel, lit) in row.iter_mut().zip(cells) {
            if *lit {
                *pixel = Pixel::White;
            }
        }
    }
    display
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::DisplaySink;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn keys_with(pressed: &[usize]) -> Keys {
        let mut keys = [false; 16];
        for k in pressed {
            keys[*k] = true;
        }
        keys
    }

    #[test]
    fn test_keydown_is_an_edge() {
        let mut keypad = Keypad::new();
        keypad.update(&keys_with(&[4]));
        assert!(keypad.is_down(4));
        assert_eq!(keypad.wait_for_keydown(), Some(4));
        keypad.update(&keys_with(&[4]));
        assert_eq!(keypad.wait_for_keydown(), None);
        keypad.update(&keys_with(&[4, 9]));
        assert_eq!(keypad.wait_for_keydown(), Some(9));
        keypad.update(&keys_with(&[]));
        assert!(!keypad.is_down(4));
        assert_eq!(keypad.wait_for_keydown(), None);
    }

    #[test]
    fn test_frame_conversion() {
        let mut screen = FrameBuffer::new();
        screen.set_pixel(3, 5, true);
        let display = to_display(&screen);
        let lit: bool = display[5][3].into();
        let dark: bool = display[5][4].into();
        assert!(lit);
        assert!(!dark);
    }

    #[test]
    fn test_frame_only_after_draw() {
        // LD V0, 0x01 ; CLS
        let machine = Machine::new(&[0x60, 0x01, 0x00, 0xE0], StdRng::seed_from_u64(0)).unwrap();
        let mut host = Chip8Host::new(machine, Duration::from_millis(1));
        let keys = keys_with(&[]);
        assert!(host.step(&keys).is_none());
        assert!(host.step(&keys).is_some());
        assert!(!host.buzzer_active());
    }
}
