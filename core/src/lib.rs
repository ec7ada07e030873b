pub use chip8::Chip8;
pub use error::Chip8Error;
pub use state::{FrameBuffer, Quirks};

mod chip8;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
