use std::time::{Duration, Instant};

use log::{error, info};
use sdl2::event::Event;

use oxid8_core::constants::CYCLES_PER_SECOND;
use oxid8_core::{Chip8, Quirks};
use oxid8_display::Display;

use crate::keymap::keymap;

/// Drives a Chip-8 machine against an SDL2 window until it is closed or the
/// machine faults.
///
/// Each pass of the loop feeds pending input to the machine, runs one cycle,
/// redraws if the frame changed, and then sleeps off the remainder of the
/// cycle budget to hold the machine at its nominal clock speed.
pub fn run(rom: &[u8], quirks: Quirks, scale: u32) -> Result<(), String> {
    let mut chip8 = Chip8::with_quirks(quirks);
    chip8.load(rom).map_err(|e| e.to_string())?;
    info!("loaded {} byte ROM", rom.len());

    let sdl = sdl2::init()?;
    let mut display = Display::new(&sdl, scale)?;
    let mut events = sdl.event_pump()?;

    let cycle_time = Duration::from_nanos(1_000_000_000 / u64::from(CYCLES_PER_SECOND));
    let mut last_cycle = Instant::now();

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match keymap(key) {
                    Some(kc) => chip8.key_press(kc),
                    None => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match keymap(key) {
                    Some(kc) => chip8.key_release(kc),
                    None => continue,
                },
                _ => continue,
            };
        }

        // Update state
        if let Err(fault) = chip8.cycle() {
            error!("halting: {}", fault);
            break 'event;
        }
        if chip8.display_changed() {
            display.render(chip8.frame())?;
        }
        if chip8.beep() {
            // TODO wire up an SDL2 audio callback instead of logging
            info!("beep");
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = current_time;
    }

    Ok(())
}
