//! A CHIP-8 interpreter: byte-code decoder and executor over an explicitly
//! owned machine, with display and keypad supplied by the host.

pub mod config;
pub mod host;
pub mod interpreter;
