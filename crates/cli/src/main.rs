//! Front-end model CLI.
//!
//! Runs an instruction image through the fetch pipeline and reports what
//! came out. It performs:
//! 1. **Load:** A flat binary at `--base`, or an ELF whose segments carry
//!    their own addresses.
//! 2. **Run:** Redirects fetch to the start PC and ticks the front-end for
//!    a fixed number of cycles.
//! 3. **Report:** Prints each fetched packet (cycle, address, word mask,
//!    instruction words) and the final statistics.

use std::fs;
use std::process;

use clap::Parser;

use rvfront_core::sim::loader;
use rvfront_core::sim::ram::SimRam;
use rvfront_core::{Config, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "rvfront",
    author,
    version,
    about = "Cycle-accurate RV32I instruction front-end model",
    long_about = "Run an instruction image through the fetch pipeline.\n\n\
        Examples:\n  rvfront image.bin --base 0x1000 --cycles 200\n  \
        rvfront image.elf --elf\n  rvfront image.bin --config front.json"
)]
struct Cli {
    /// Image to fetch from (flat binary, or ELF with --elf).
    image: String,

    /// Treat the image as an ELF file.
    #[arg(long)]
    elf: bool,

    /// Load/start address for flat binaries.
    #[arg(long, default_value_t = 0x1000, value_parser = parse_addr)]
    base: u64,

    /// Start PC (defaults to --base, or the ELF entry point).
    #[arg(long, value_parser = parse_addr)]
    pc: Option<u64>,

    /// Cycles to simulate.
    #[arg(long, default_value_t = 1000)]
    cycles: u64,

    /// Translate fetch addresses through the TLB instead of passthru.
    #[arg(long)]
    translate: bool,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<String>,

    /// Backing RAM size in bytes.
    #[arg(long, default_value_t = 4 * 1024 * 1024)]
    ram_size: usize,
}

fn parse_addr(s: &str) -> Result<u64, String> {
    let parsed = s
        .strip_prefix("0x")
        .map_or_else(|| s.parse(), |hex| u64::from_str_radix(hex, 16));
    parsed.map_err(|e| format!("bad address {s:?}: {e}"))
}

fn load_config(path: Option<&str>) -> Result<Config, String> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    let cfg: Config = serde_json::from_str(&text).map_err(|e| format!("{path}: {e}"))?;
    Ok(cfg)
}

fn run(cli: &Cli) -> Result<(), String> {
    let cfg = load_config(cli.config.as_deref())?;
    cfg.validate().map_err(|e| e.to_string())?;

    let bytes = fs::read(&cli.image).map_err(|e| format!("{}: {e}", cli.image))?;
    let mut ram = SimRam::new(0, cli.ram_size);

    let start_pc = if cli.elf {
        let entry = loader::load_elf(&mut ram, &bytes).map_err(|e| e.to_string())?;
        cli.pc.unwrap_or(u64::from(entry))
    } else {
        loader::load_flat(&mut ram, cli.base, &bytes);
        cli.pc.unwrap_or(cli.base)
    };

    let mut sim = Simulator::new(cfg, ram);
    sim.redirect(start_pc as u32, !cli.translate);

    for _ in 0..cli.cycles {
        let cycle = sim.cycles();
        if let Some(packet) = sim.step() {
            let words: Vec<String> = packet
                .data
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    if packet.mask & (1 << i) != 0 {
                        format!("{w:08x}")
                    } else {
                        "........".into()
                    }
                })
                .collect();
            println!(
                "[{cycle:>6}] pc={:08x} mask={:08b} | {}",
                packet.vaddr.val(),
                packet.mask,
                words.join(" ")
            );
        }
    }

    println!();
    print!("{}", sim.front.stats);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(msg) = run(&cli) {
        eprintln!("rvfront: {msg}");
        process::exit(1);
    }
}
