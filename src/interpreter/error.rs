use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions. Any of these halts the machine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Memory access out of bounds at address {addr:#06X}")]
    OutOfBounds { addr: usize },

    #[error("Jump to odd address {addr:#06X}")]
    Misaligned { addr: usize },

    #[error("Stack overflow: more than 16 nested subroutine calls")]
    StackOverflow,

    #[error("Stack underflow: attempted to return from a subroutine with empty call stack")]
    StackUnderflow,

    #[error("Unknown opcode {opcode:#06X} at pc {pc:#06X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("Failed to load ROM: {0}")]
    Load(#[from] LoadError),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("ROM is empty")]
    Empty,

    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}
