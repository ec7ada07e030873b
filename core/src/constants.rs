/// Total addressable memory in bytes.
pub const MEMORY_SIZE: usize = 4096;

/// Where loaded programs begin; everything below is reserved for the
/// interpreter (by convention) and the builtin font.
pub const PROGRAM_START: u16 = 0x200;

/// The largest ROM image that fits between PROGRAM_START and the end of
/// memory.
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Call stack depth of the original hardware.
pub const STACK_DEPTH: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Offset of the builtin font in low memory.
pub const FONT_OFFSET: usize = 0x50;

/// Bytes per font glyph; FX29 multiplies the requested digit by this.
pub const GLYPH_SIZE: u16 = 5;

/// How many cycles a driver should run per second. Timers are decremented
/// once per cycle, so this doubles as the 60Hz timer rate.
pub const CYCLES_PER_SECOND: u32 = 60;

/// Builtin glyphs for the hex digits 0-F, one row per byte, only the high
/// nibble of each row is drawn.
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
