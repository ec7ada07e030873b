use std::fs;
use std::process::exit;

use log::error;

use oxid8_core::Quirks;

mod keymap;
mod run;

fn fetch_config<'a>() -> clap::ArgMatches<'a> {
    clap::App::new("oxid8")
        .version("0.1")
        .about("A Chip-8 interpreter")
        .arg(
            clap::Arg::with_name("rom")
                .index(1)
                .required(true)
                .help("Path of the ROM image to run"),
        )
        .arg(
            clap::Arg::with_name("scale")
                .long("scale")
                .takes_value(true)
                .default_value("10")
                .help("Size multiplier for each display pixel"),
        )
        .arg(
            clap::Arg::with_name("shift-quirk")
                .long("shift-quirk")
                .help("8XY6/8XYE copy VY into VX before shifting"),
        )
        .arg(
            clap::Arg::with_name("index-quirk")
                .long("index-quirk")
                .help("FX55/FX65 leave I pointing past the last register"),
        )
        .get_matches()
}

fn main() {
    env_logger::init();
    let config = fetch_config();

    let rom_path = config.value_of("rom").unwrap();
    let rom = match fs::read(rom_path) {
        Ok(rom) => rom,
        Err(e) => {
            error!("unable to read ROM {:?}: {}", rom_path, e);
            exit(1);
        }
    };

    let scale = match config.value_of("scale").unwrap().parse::<u32>() {
        Ok(scale) if scale > 0 => scale,
        _ => {
            error!("scale must be a positive integer");
            exit(1);
        }
    };

    let quirks = Quirks {
        shift_reads_vy: config.is_present("shift-quirk"),
        spill_moves_index: config.is_present("index-quirk"),
    };

    if let Err(e) = run::run(&rom, quirks, scale) {
        error!("{}", e);
        exit(1);
    }
}
