use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT, FONT_OFFSET, MEMORY_SIZE, PROGRAM_START, STACK_DEPTH,
};

/// The display buffer, indexed as `[y][x]`; cells are 0 or 1.
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// Compatibility switches for the instructions whose behavior differs
/// between historical interpreters. The defaults match the majority
/// convention; some ROMs assume the other one.
#[derive(Clone, Copy, Debug, Default)]
pub struct Quirks {
    /// 8XY6/8XYE copy VY into VX before shifting instead of shifting VX in
    /// place.
    pub shift_reads_vy: bool,
    /// FX55/FX65 leave I pointing one past the last register spilled or
    /// filled instead of leaving it untouched.
    pub spill_moves_index: bool,
}

/// A snapshot of the machine state.
///
/// Registers
/// - (v) 16 8-bit registers V0..VF; VF doubles as the carry/borrow/collision
///   flag, so programs that keep data in it lose that data to any flag-setting
///   instruction
/// - (i) the 16-bit index register used by the memory-indexed instructions
/// - (pc) the 16-bit program counter, starting at 0x200
///
/// Memory
/// - 4096 bytes, with everything below 0x200 reserved; the builtin font is
///   seeded at 0x50 on construction and never written again
/// - a 16-deep stack of return addresses plus a stack pointer; the stack is
///   touched only by the call and return instructions
///
/// Timers
/// - two 8-bit timers (delay, sound), decremented once per cycle while
///   non-zero
///
/// Output
/// - the 64x32 frame buffer, plus the per-cycle draw and beep flags the
///   driver polls
///
/// Blocking input
/// - `waiting_for_key` holds the register FX0A is waiting to fill; while it
///   is `Some`, instruction execution is suspended (timers keep running)
#[derive(Clone, Copy)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub beep_flag: bool,
    pub waiting_for_key: Option<u8>,
    pub rom_loaded: bool,
    pub quirks: Quirks,
}

impl State {
    pub fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    pub fn with_quirks(quirks: Quirks) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[FONT_OFFSET..FONT_OFFSET + FONT.len()].copy_from_slice(&FONT);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            beep_flag: false,
            waiting_for_key: None,
            rom_loaded: false,
            quirks,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_state {
    use super::*;

    #[test]
    fn test_new_seeds_font() {
        let state = State::new();
        assert_eq!(state.memory[FONT_OFFSET..FONT_OFFSET + 80], FONT);
        // Nothing else in low memory is populated
        assert_eq!(state.memory[..FONT_OFFSET], [0; FONT_OFFSET]);
        assert_eq!(state.memory[FONT_OFFSET + 80..], [0; MEMORY_SIZE - FONT_OFFSET - 80]);
    }

    #[test]
    fn test_new_starts_at_program_start() {
        let state = State::new();
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sp, 0);
        assert_eq!(state.waiting_for_key, None);
        assert!(!state.rom_loaded);
    }
}
