use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::fs;
use std::path::PathBuf;
use twinkie_log_lib::CaptureReader;

/// Decode a Twinkie capture log and print the PD packet report.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the capture file (concatenated 512-byte records).
    log: PathBuf,
    /// Dump the telemetry series as CSV instead of the packet report.
    #[arg(long)]
    telemetry_csv: bool,
    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .with_target(false)
        .init();

    let data = fs::read(&cli.log).with_context(|| format!("reading {}", cli.log.display()))?;
    let reader = CaptureReader::new(Bytes::from(data));

    if cli.telemetry_csv {
        println!("time_ms,cc1_voltage,cc2_voltage,vbus_voltage,vbus_current");
        for sample in reader.telemetry() {
            println!(
                "{},{},{},{},{}",
                sample.time_ms,
                sample.cc1_voltage,
                sample.cc2_voltage,
                sample.vbus_voltage,
                sample.vbus_current
            );
        }
        return Ok(());
    }

    for summary in reader.packet_summaries() {
        println!("{summary}");
    }
    println!("{}", reader.statistics());
    Ok(())
}
