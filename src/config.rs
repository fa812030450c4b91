use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CLOCK_HZ: u32 = 700;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter", long_about = None)]
pub struct Config {
    #[arg(help = "Path to the ROM file to run")]
    pub rom: PathBuf,

    #[arg(short, long, default_value_t = DEFAULT_CLOCK_HZ, help = "Instructions per second")]
    pub clock_hz: u32,

    #[arg(short, long, help = "Seed for RND, for reproducible runs")]
    pub seed: Option<u64>,
}

impl Config {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Time between instructions.
    pub fn speed(&self) -> Duration {
        Duration::from_secs_f64(1_f64 / self.clock_hz.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["chip8", "roms/pong.ch8"]).unwrap();
        assert_eq!(config.rom, PathBuf::from("roms/pong.ch8"));
        assert_eq!(config.clock_hz, 700);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_clock_and_seed() {
        let config =
            Config::try_parse_from(["chip8", "--clock-hz", "500", "-s", "42", "a.ch8"]).unwrap();
        assert_eq!(config.speed(), Duration::from_millis(2));
        let (a, b): (u64, u64) = (config.rng().gen(), config.rng().gen());
        assert_eq!(a, b);
    }

    #[test]
    fn test_rom_is_required() {
        assert!(Config::try_parse_from(["chip8"]).is_err());
    }
}
