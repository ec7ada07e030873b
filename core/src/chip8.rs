use log::{error, trace};

use crate::constants::{MAX_ROM_SIZE, MEMORY_SIZE, PROGRAM_START};
use crate::error::Chip8Error;
use crate::instruction;
use crate::state::{FrameBuffer, Quirks, State};

/// # Chip-8
/// An independently owned interpreter instance: all machine state plus the
/// keypad flags the driver writes between cycles.
///
/// The driver contract is narrow:
/// - `initialize` then `load` a ROM image
/// - call `cycle` once per step; each call executes exactly one instruction
///   and then ticks both timers
/// - poll `display_changed`/`frame` to redraw and `beep` for the sound
///   signal
/// - push host input through `set_key`/`key_press`/`key_release`
///
/// Faults (unknown opcode, stack underflow/overflow, out-of-range memory
/// access) come back as `Chip8Error`s; whether they halt just this machine
/// or the whole process is the caller's call. The machine itself is left
/// untouched by a failed cycle.
pub struct Chip8 {
    state: State,
    keys: [bool; 16],
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    pub fn with_quirks(quirks: Quirks) -> Self {
        Chip8 {
            state: State::with_quirks(quirks),
            keys: [false; 16],
        }
    }

    /// Resets everything to power-on state: registers, stack, and timers
    /// cleared, font re-seeded, pc back at the program start, keypad
    /// released, no program loaded. Quirk settings survive. Idempotent.
    pub fn initialize(&mut self) {
        self.state = State::with_quirks(self.state.quirks);
        self.keys = [false; 16];
    }

    /// Copies a ROM image into memory at the program start and marks the
    /// machine runnable. Images that would spill past the end of memory are
    /// rejected untouched.
    ///
    /// No other state is reset; call `initialize` first for a clean run.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge { size: rom.len() });
        }
        let start = PROGRAM_START as usize;
        self.state.memory[start..start + rom.len()].copy_from_slice(rom);
        self.state.rom_loaded = true;
        Ok(())
    }

    /// Runs one fetch-decode-execute step, then ticks the timers.
    ///
    /// Does nothing until a ROM is loaded. While a key-wait is pending only
    /// the timers advance; the pending register is filled from the keypad as
    /// soon as some key is down.
    pub fn cycle(&mut self) -> Result<(), Chip8Error> {
        if !self.state.rom_loaded {
            return Ok(());
        }

        self.state.draw_flag = false;
        self.state.beep_flag = false;

        if let Some(register) = self.state.waiting_for_key {
            if let Some(key) = self.keys.iter().position(|&pressed| pressed) {
                self.state.v[register as usize] = key as u8;
                self.state.waiting_for_key = None;
            }
            self.tick_timers();
            return Ok(());
        }

        if self.state.pc as usize + 1 >= MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds {
                address: self.state.pc,
            });
        }
        let op = self.fetch();
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            self.state.pc
        );

        let result = instruction::decode(op, self.state.pc)
            .and_then(|operation| operation(op, &self.state, self.keys));
        match result {
            Ok(next) => self.state = next,
            Err(fault) => {
                error!("{}", fault);
                return Err(fault);
            }
        }

        self.tick_timers();
        Ok(())
    }

    /// Whether the last `cycle` changed the display buffer.
    pub fn display_changed(&self) -> bool {
        self.state.draw_flag
    }

    /// Whether the sound timer ran out during the last `cycle`.
    pub fn beep(&self) -> bool {
        self.state.beep_flag
    }

    /// The display buffer, for rendering.
    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Sets or clears one of the 16 keypad flags.
    ///
    /// # Panics
    /// If `key` is not a keypad index (0x0..=0xF).
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        assert!(key < 16);
        self.keys[key as usize] = pressed;
    }

    pub fn key_press(&mut self, key: u8) {
        self.set_key(key, true);
    }

    pub fn key_release(&mut self, key: u8) {
        self.set_key(key, false);
    }

    /// Both timers saturate at zero; the beep flag reports the sound
    /// timer's transition to zero.
    fn tick_timers(&mut self) {
        if self.state.delay_timer > 0 {
            self.state.delay_timer -= 1;
        }
        if self.state.sound_timer > 0 {
            self.state.sound_timer -= 1;
            if self.state.sound_timer == 0 {
                self.state.beep_flag = true;
            }
        }
    }

    /// The instruction word at pc: two consecutive big-endian bytes.
    fn fetch(&self) -> u16 {
        let left = u16::from(self.state.memory[self.state.pc as usize]);
        let right = u16::from(self.state.memory[self.state.pc as usize + 1]);
        left << 8 | right
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_chip8 {
    use super::*;
    use crate::constants::{FONT, FONT_OFFSET};

    #[test]
    fn test_initialize_restores_power_on_state() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0x00, 0xE0]).unwrap();
        chip8.cycle().unwrap();
        chip8.state.v[3] = 7;
        chip8.state.delay_timer = 9;
        chip8.keys[2] = true;

        chip8.initialize();
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.state.v, [0; 16]);
        assert_eq!(chip8.state.sp, 0);
        assert_eq!(chip8.state.delay_timer, 0);
        assert_eq!(chip8.state.sound_timer, 0);
        assert_eq!(chip8.keys, [false; 16]);
        assert!(!chip8.state.rom_loaded);
        assert!(chip8.state.frame_buffer.iter().all(|row| row[..] == [0; 64][..]));
        assert_eq!(chip8.state.memory[FONT_OFFSET..FONT_OFFSET + 80], FONT);
    }

    #[test]
    fn test_cycle_is_a_noop_until_loaded() {
        let mut chip8 = Chip8::new();
        assert_eq!(chip8.cycle(), Ok(()));
        assert_eq!(chip8.state.pc, 0x200);
    }

    #[test]
    fn test_load_rejects_oversized_rom() {
        let mut chip8 = Chip8::new();
        let rom = [0u8; 3585];
        assert_eq!(
            chip8.load(&rom),
            Err(Chip8Error::RomTooLarge { size: 3585 })
        );
        assert!(!chip8.state.rom_loaded);
        // A maximal image is still fine
        assert_eq!(chip8.load(&rom[..3584]), Ok(()));
        assert!(chip8.state.rom_loaded);
    }

    #[test]
    fn test_load_places_rom_at_program_start() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0xAA, 0xBB]).unwrap();
        assert_eq!(chip8.state.memory[0x200..0x202], [0xAA, 0xBB]);
        assert_eq!(chip8.fetch(), 0xAABB);
    }

    #[test]
    fn test_cycle_surfaces_unknown_opcode() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0x8F, 0x0F]).unwrap();
        assert_eq!(
            chip8.cycle(),
            Err(Chip8Error::UnknownOpcode {
                opcode: 0x8F0F,
                pc: 0x200
            })
        );
        // The faulting instruction is not stepped past
        assert_eq!(chip8.state.pc, 0x200);
    }

    #[test]
    fn test_cycle_surfaces_stack_underflow() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0x00, 0xEE]).unwrap();
        assert_eq!(
            chip8.cycle(),
            Err(Chip8Error::StackUnderflow { pc: 0x200 })
        );
    }

    #[test]
    fn test_call_and_return_round_trip() {
        let mut chip8 = Chip8::new();
        // 0x200: call 0x204; 0x204: return
        chip8.load(&[0x22, 0x04, 0x00, 0x00, 0x00, 0xEE]).unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.pc, 0x204);
        chip8.cycle().unwrap();
        // Back at the instruction immediately after the call site
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.sp, 0);
    }

    #[test]
    fn test_key_wait_blocks_then_fills_register() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0xF3, 0x0A]).unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.waiting_for_key, Some(0x3));
        assert_eq!(chip8.state.pc, 0x202);

        // Nothing happens while no key is down
        chip8.cycle().unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.waiting_for_key, Some(0x3));

        chip8.key_press(0xA);
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.waiting_for_key, None);
        assert_eq!(chip8.state.v[0x3], 0xA);
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_timers_tick_while_waiting_for_key() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0xF3, 0x0A]).unwrap();
        chip8.state.delay_timer = 3;
        chip8.cycle().unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.waiting_for_key, Some(0x3));
        assert_eq!(chip8.state.delay_timer, 1);
    }

    #[test]
    fn test_timers_saturate_at_zero() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0x60, 0x01, 0x60, 0x01, 0x60, 0x01]).unwrap();
        chip8.state.delay_timer = 2;
        chip8.cycle().unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.delay_timer, 0);
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.delay_timer, 0);
    }

    #[test]
    fn test_beep_fires_on_sound_timer_expiry_only() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0x60, 0x01, 0x60, 0x01, 0x60, 0x01]).unwrap();
        chip8.state.sound_timer = 2;
        chip8.cycle().unwrap();
        assert!(!chip8.beep());
        chip8.cycle().unwrap();
        assert!(chip8.beep());
        chip8.cycle().unwrap();
        assert!(!chip8.beep());
    }

    #[test]
    fn test_display_changed_only_on_drawing_cycles() {
        let mut chip8 = Chip8::new();
        // clear screen, then a register load
        chip8.load(&[0x00, 0xE0, 0x61, 0x02]).unwrap();
        chip8.cycle().unwrap();
        assert!(chip8.display_changed());
        chip8.cycle().unwrap();
        assert!(!chip8.display_changed());
    }

    #[test]
    fn test_cycle_faults_when_pc_leaves_memory() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0x1F, 0xFF]).unwrap(); // jump 0xFFF
        chip8.cycle().unwrap();
        assert_eq!(
            chip8.cycle(),
            Err(Chip8Error::MemoryOutOfBounds { address: 0xFFF })
        );
    }

    #[test]
    fn test_instances_are_independent() {
        let mut a = Chip8::new();
        let mut b = Chip8::new();
        a.load(&[0x61, 0x05]).unwrap();
        b.load(&[0x61, 0x09]).unwrap();
        a.cycle().unwrap();
        b.cycle().unwrap();
        assert_eq!(a.state.v[0x1], 0x05);
        assert_eq!(b.state.v[0x1], 0x09);
    }
}
