//! Command-line runner for the nibble-core watch emulator.
//!
//! Loads a raw program image, steps the CPU for a bounded number of
//! instructions and prints the machine state the program left behind.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use nibble_core::{
    Cpu, InterruptSource, MachineConfig, IO_PORT_ADDRESS, IO_PORT_DATA, RESET_PC,
};
#[cfg(test)]
use tempfile as _;

/// Runs a raw program image on the emulated watch CPU.
#[derive(Debug, Parser)]
#[command(name = "nibble-run", version, about)]
struct Args {
    /// Raw program image, big-endian 16-bit words.
    image: PathBuf,

    /// Load address of the image (decimal or 0x-prefixed hex).
    #[arg(long, default_value_t = RESET_PC, value_parser = parse_address)]
    base: u16,

    /// Maximum number of instructions to execute.
    #[arg(long, default_value_t = 1000)]
    steps: u32,

    /// Raise SECOND_TIMER after every N executed steps.
    #[arg(long, value_name = "N")]
    timer_every: Option<u32>,

    /// JSON machine configuration replacing the stock layout.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log every executed instruction.
    #[arg(long)]
    trace: bool,
}

fn parse_address(text: &str) -> Result<u16, String> {
    let parsed = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).map_or_else(
        || text.parse::<u16>(),
        |hex| u16::from_str_radix(hex, 16),
    );
    parsed.map_err(|err| format!("invalid address {text:?}: {err}"))
}

fn load_config(path: Option<&Path>) -> Result<MachineConfig> {
    let Some(path) = path else {
        return Ok(MachineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn init_logging(trace: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if trace {
        builder.filter_level(LevelFilter::Trace);
    }
    builder.format_timestamp(None).init();
}

/// Steps `cpu` up to `steps` times, raising the timer on schedule. Returns
/// the number of completed steps.
fn execute(cpu: &mut Cpu, steps: u32, timer_every: Option<u32>) -> Result<u32> {
    let timer_every = timer_every.filter(|&n| n > 0);
    for done in 0..steps {
        if let Some(every) = timer_every {
            if done > 0 && done % every == 0 {
                cpu.raise(InterruptSource::SecondTimer);
            }
        }
        let pc = cpu.control().pc;
        cpu.step()
            .with_context(|| format!("step {done} at PC {pc:#06X}"))?;
    }
    Ok(steps)
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn summary(cpu: &Cpu, steps: u32) -> String {
    let control = cpu.control();
    let mut out = String::new();
    let _ = writeln!(out, "steps: {steps}");
    let _ = writeln!(
        out,
        "PC={:#06X} SP={:#06X} SA={:#06X} F={:#04X} CB={} AB={}",
        control.pc,
        control.sp,
        control.sa,
        control.flags,
        control.current_bank.get(),
        control.additional_bank.get(),
    );
    let bank = control.current_bank;
    let cells: String = cpu
        .registers()
        .bank(bank)
        .iter()
        .filter_map(|&cell| char::from_digit(u32::from(cell), 16))
        .map(|digit| digit.to_ascii_uppercase())
        .collect();
    let _ = writeln!(out, "bank {}: {cells}", bank.letter());
    for port in [IO_PORT_ADDRESS, IO_PORT_DATA] {
        let written = cpu.io().captured(port).unwrap_or_default();
        let _ = writeln!(out, "port {port}: {}", hex_bytes(written));
    }
    out
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.trace);

    let config = load_config(args.config.as_deref())?;
    let image = fs::read(&args.image)
        .with_context(|| format!("reading image {}", args.image.display()))?;

    let mut cpu = Cpu::new(&config);
    cpu.load_image(args.base, &image)
        .with_context(|| format!("loading image at {:#06X}", args.base))?;
    log::info!(
        "loaded {} bytes at {:#06X}, running up to {} steps",
        image.len(),
        args.base,
        args.steps
    );

    let steps = execute(&mut cpu, args.steps, args.timer_every)?;
    print!("{}", summary(&cpu, steps));
    Ok(())
}
