//! # FLAC to WAV Example
//!
//! Identifies a FLAC file, prints its format, and writes it out as WAV.
//!
//! Run with:
//! ```bash
//! cargo run --example flac_to_wav --package core-flac -- input.flac output.wav
//!
//! # Accept any whole-byte depth and skip verification
//! cargo run --example flac_to_wav --package core-flac -- input.flac output.wav lenient
//! ```

use core_flac::{flac_file_to_wav, DecodeConfig, FlacFileReader};
use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use std::env;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let (Some(input), Some(output)) = (args.get(1), args.get(2)) else {
        eprintln!("usage: flac_to_wav <input.flac> <output.wav> [lenient]");
        return ExitCode::FAILURE;
    };

    let config = match args.get(3).map(String::as_str) {
        Some("lenient") => DecodeConfig::lenient(),
        _ => DecodeConfig::default(),
    };

    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )
    .expect("Failed to initialize logging");

    match FlacFileReader::from_config(&config).audio_file_format_from_path(input) {
        Ok(file_format) => info!(
            sample_rate = ?file_format.format.sample_rate,
            bits = ?file_format.format.bits_per_sample,
            channels = ?file_format.format.channels,
            frames = ?file_format.frame_length,
            "Input format"
        ),
        Err(e) => {
            error!(error = %e, "Input is not a usable FLAC file");
            return ExitCode::FAILURE;
        }
    }

    match flac_file_to_wav(input, output, &config) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                bytes = summary.bytes_written,
                md5 = ?summary.md5,
                "Done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Export failed");
            ExitCode::FAILURE
        }
    }
}
