//! # Steganography CLI
//!
//! Hide text in the low-order bits of an image and read it back.
//!
//! ## Usage
//!
//! ```bash
//! stego encode -i cover.png -o secret.png -m "meet at noon" -b 2
//! stego decode -i secret.png -b 2
//! stego info -i cover.png -b 2
//! stego compare --original cover.png --modified secret.png
//! stego batch -c batches/nightly.toml
//! ```
//!
//! The bit width is not stored in the image: decode with the same `-b` used
//! to encode, or the output is garbage.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::sync::{Arc, Mutex};

use pixel_stego::batch::{BatchMetrics, BatchRunner};
use pixel_stego::common::config::BatchConfig;
use pixel_stego::processing::{self, BitWidth};
use pixel_stego::utils::init_logger;

/// Command-line arguments for the steganography tool
#[derive(Parser, Debug)]
#[command(author, version, about = "Image Steganography Tool", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a message into an image
    Encode {
        /// Input image path
        #[arg(short, long)]
        input: String,
        /// Output image path (use a lossless format such as PNG)
        #[arg(short, long)]
        output: String,
        /// Secret message
        #[arg(short, long)]
        message: String,
        #[command(flatten)]
        bits: BitsArg,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a message from an image
    Decode {
        /// Encoded image path
        #[arg(short, long)]
        input: String,
        #[command(flatten)]
        bits: BitsArg,
    },
    /// Get image information and capacity
    Info {
        /// Image path
        #[arg(short, long)]
        input: String,
        #[command(flatten)]
        bits: BitsArg,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Measure distortion between an original and a modified image
    Compare {
        #[arg(long)]
        original: String,
        #[arg(long)]
        modified: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the jobs in a TOML batch file
    Batch {
        /// Path to the batch file
        #[arg(short, long)]
        config: String,
        /// Override the metrics output path from the batch file
        #[arg(long)]
        metrics_output: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct BitsArg {
    /// Number of LSBs per sample (1-4)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
    bits: u8,
}

impl BitsArg {
    fn width(&self) -> Result<BitWidth> {
        Ok(BitWidth::new(self.bits)?)
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    if let Err(e) = run(args.command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Encode {
            input,
            output,
            message,
            bits,
            json,
        } => {
            let width = bits.width()?;
            let summary = tokio::task::spawn_blocking(move || {
                processing::encode_file(&input, &output, &message, width)
            })
            .await??;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Message encoded successfully into {}", summary.output);
                println!();
                println!("Statistics:");
                println!("  MSE: {:.4}", summary.fidelity.mse);
                println!("  PSNR: {:.2} dB", summary.fidelity.psnr);
                println!("  Changed samples: {:.2}%", summary.fidelity.change_percentage);
            }
        }
        Command::Decode { input, bits } => {
            let width = bits.width()?;
            let message =
                tokio::task::spawn_blocking(move || processing::decode_file(&input, width)).await??;
            println!("Decoded message: {}", message);
        }
        Command::Info { input, bits, json } => {
            let width = bits.width()?;
            let info = tokio::task::spawn_blocking(move || processing::info_file(&input, width)).await??;

            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Image Information:");
                println!("  Dimensions: {}x{}", info.dimensions.0, info.dimensions.1);
                println!("  Channels: {}", info.channels);
                println!();
                println!("Capacity with {} LSB(s):", width);
                println!("  Bits: {}", info.bits);
                println!("  Bytes: {}", info.bytes);
                println!("  Characters: {}", info.characters);
            }
        }
        Command::Compare {
            original,
            modified,
            json,
        } => {
            let report =
                tokio::task::spawn_blocking(move || processing::compare_files(&original, &modified))
                    .await??;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Comparison:");
                println!("  MSE: {:.4}", report.mse);
                println!("  PSNR: {:.2} dB", report.psnr);
                println!(
                    "  Changed samples: {} of {} ({:.2}%)",
                    report.changed_sample_count, report.total_samples, report.change_percentage
                );
            }
        }
        Command::Batch {
            config,
            metrics_output,
        } => {
            let config = BatchConfig::from_file(&config)?;
            let metrics_output = metrics_output.or_else(|| config.batch.metrics_output.clone());
            let metrics = Arc::new(Mutex::new(BatchMetrics::new(config.batch.name.clone())));

            let outcomes = BatchRunner::new(config)
                .with_metrics(metrics.clone())
                .run()
                .await?;

            for outcome in &outcomes {
                let status = if outcome.success { "ok" } else { "FAILED" };
                println!(
                    "[{}] #{} {} {}: {}",
                    status, outcome.index, outcome.kind, outcome.input, outcome.detail
                );
            }

            if let Some(path) = metrics_output {
                let metrics = metrics
                    .lock()
                    .map_err(|_| anyhow::anyhow!("metrics lock poisoned"))?;
                metrics.export_to_json(&path)?;
                println!("Metrics exported to: {}", path);
            }

            let failed = outcomes.iter().filter(|o| !o.success).count();
            if failed > 0 {
                anyhow::bail!("{} of {} batch job(s) failed", failed, outcomes.len());
            }
        }
    }

    Ok(())
}
