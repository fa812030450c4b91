use chip8::config::Config;
use chip8::host::Chip8Host;
use chip8::interpreter::Machine;
use clap::Parser;
use log::info;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = Config::parse();
    let machine = Machine::from_file(&config.rom, config.rng())?;
    info!("running {} at {} Hz", config.rom.display(), config.clock_hz);
    chip8_base::run(Chip8Host::new(machine, config.speed()));
}
