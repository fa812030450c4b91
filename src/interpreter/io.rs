//! Capabilities the interpreter borrows from its host. The core only issues
//! point writes to the display and queries the keypad; it owns neither.

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Somewhere to draw. Coordinates are always in range when called.
pub trait DisplaySink {
    /// XOR `on` into the cell at (x, y). Returns true if a lit cell was cleared.
    fn set_pixel(&mut self, x: usize, y: usize, on: bool) -> bool;

    fn clear(&mut self);

    /// Push accumulated changes out to whatever is showing them.
    fn present(&mut self);
}

/// The 16-key hex keypad plus the host's quit signal.
pub trait InputSource {
    fn is_down(&mut self, key: u8) -> bool;

    /// Returns a key that went down since the last poll, if any. Never blocks
    /// for longer than one polling interval.
    fn wait_for_keydown(&mut self) -> Option<u8>;

    fn poll_terminate(&mut self) -> bool;
}

/// Headless 64x32 monochrome buffer.
#[derive(Clone)]
pub struct FrameBuffer {
    cells: [[bool; WIDTH]; HEIGHT],
    presented: u64,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            cells: [[false; WIDTH]; HEIGHT],
            presented: 0,
        }
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.cells[y % HEIGHT][x % WIDTH]
    }

    pub fn rows(&self) -> &[[bool; WIDTH]; HEIGHT] {
        &self.cells
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().flatten().filter(|lit| **lit).count()
    }

    /// How many times the buffer has been presented.
    pub fn frames(&self) -> u64 {
        self.presented
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for FrameBuffer {
    fn set_pixel(&mut self, x: usize, y: usize, on: bool) -> bool {
        let cell = &mut self.cells[y][x];
        let collided = on && *cell;
        *cell ^= on;
        collided
    }

    fn clear(&mut self) {
        self.cells = [[false; WIDTH]; HEIGHT];
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_and_collision() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.set_pixel(3, 4, true));
        assert!(fb.is_lit(3, 4));
        assert!(!fb.set_pixel(3, 4, false));
        assert!(fb.is_lit(3, 4));
        assert!(fb.set_pixel(3, 4, true));
        assert!(!fb.is_lit(3, 4));
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(0, 0, true);
        fb.set_pixel(63, 31, true);
        assert_eq!(fb.lit_count(), 2);
        fb.clear();
        assert_eq!(fb.lit_count(), 0);
    }
}
