use thiserror::Error;

use crate::constants::MAX_ROM_SIZE;

/// Faults the interpreter surfaces to its driver instead of aborting.
///
/// The underflow and unknown-opcode cases are unrecoverable as far as the
/// running program is concerned; whether to tear the whole process down is
/// the caller's decision, not ours.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("unknown opcode {opcode:#06X} at pc {pc:#06X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("return with an empty call stack at pc {pc:#06X}")]
    StackUnderflow { pc: u16 },

    #[error("call stack exhausted at pc {pc:#06X}")]
    StackOverflow { pc: u16 },

    #[error("memory access out of range at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("ROM is {size} bytes; at most {} fit above the program start", MAX_ROM_SIZE)]
    RomTooLarge { size: usize },
}
