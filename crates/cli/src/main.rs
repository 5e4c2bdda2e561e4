//! SEL32 CPU emulator CLI.
//!
//! This binary loads a raw memory image and runs it on the emulated CPU. It performs:
//! 1. **Configuration:** Built-in defaults, optionally a JSON config file, then command-line overrides.
//! 2. **Loading:** Copies the image to the load address and starts execution there.
//! 3. **Run:** Steps until halt, an idle wait or the step limit.
//! 4. **Report:** Prints the final PSD, registers and statistics.

use std::path::PathBuf;
use std::{fs, process};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use sel32_core::common::{HaltReason, SimError};
use sel32_core::config::Config;
use sel32_core::core::arch::CpuModel;
use sel32_core::sim::{RunExit, Simulator, loader};

#[derive(Parser, Debug)]
#[command(
    name = "sel32",
    author,
    version,
    about = "SEL 32 mapped minicomputer CPU emulator",
    long_about = "Load a raw big-endian memory image and run it.\n\nExamples:\n  sel32 boot.img\n  sel32 --model V9 --memory 0x100000 --load 0x800 prog.img\n  RUST_LOG=sel32_core=trace sel32 --trace prog.img"
)]
struct Cli {
    /// Raw memory image to load.
    image: PathBuf,

    /// Physical load address (also the start PC).
    #[arg(short, long, value_parser = parse_u32, default_value = "0")]
    load: u32,

    /// CPU model (32/7x, 32/27, 32/67, 32/87, 32/97, V6, V9).
    #[arg(short, long)]
    model: Option<CpuModel>,

    /// Installed memory in bytes (multiple of 8KB, at most 16MB).
    #[arg(long, value_parser = parse_u32)]
    memory: Option<u32>,

    /// JSON configuration file; command-line options override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many steps.
    #[arg(short, long)]
    steps: Option<u64>,

    /// Log every instruction at trace level.
    #[arg(short, long)]
    trace: bool,
}

/// Parses a decimal or `0x`-prefixed hexadecimal number.
fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number `{s}`: {e}"))
}

fn build_config(cli: &Cli) -> Result<Config, SimError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if let Some(model) = cli.model {
        config.cpu.model = model;
    }
    if let Some(bytes) = cli.memory {
        config.memory.size_bytes = bytes as usize;
    }
    config.general.trace_instructions |= cli.trace;
    config.general.boot_entry = cli.load;
    Ok(config)
}

fn run(cli: &Cli) -> Result<RunExit, SimError> {
    let config = build_config(cli)?;
    let mut sim = Simulator::new(&config)?;

    println!(
        "Model: {}  Memory: {} KB  Load: {:#08x}  Image: {}",
        config.cpu.model,
        config.memory.size_bytes / 1024,
        cli.load,
        cli.image.display()
    );
    loader::boot_file(&mut sim.cpu, &cli.image, cli.load)?;

    let exit = sim.run(cli.steps);
    match exit {
        RunExit::Halted(reason) => println!("\n[*] Halted: {reason}"),
        RunExit::StepLimit => println!("\n[*] Step limit reached"),
        RunExit::Stopped => println!("\n[*] Stopped"),
        RunExit::Idle => println!("\n[*] Waiting with no interrupt source"),
    }
    sim.cpu.dump_state();
    sim.cpu.stats.print();
    Ok(exit)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(RunExit::Halted(reason)) if reason != HaltReason::HaltInstruction => process::exit(1),
        Ok(_) => {}
        Err(e) => {
            error!("{e}");
            eprintln!("[!] FATAL: {e}");
            process::exit(2);
        }
    }
}
