use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use vidtag_rs::common::{initialize_logging, LogOutput};
use vidtag_rs::{Config, MediaType};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogTarget {
    Stderr,
    File,
}

/// Tag, rename and file the audio the downloader left in the working directory.
#[derive(Debug, Parser)]
#[command(name = "vidtag", version)]
struct Cli {
    /// Configuration file. Defaults to config.toml in the platform config directory.
    #[arg(short, long, env = "VIDTAG_CONFIG")]
    config: Option<PathBuf>,

    /// The kind of link the batch was downloaded from: video, playlist-video, playlist or channel.
    #[arg(short, long, default_value = "video")]
    media_type: String,

    #[arg(long, value_enum, default_value = "stderr")]
    log_output: LogTarget,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::parse(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let output = match cli.log_output {
        LogTarget::Stderr => LogOutput::Stderr,
        LogTarget::File => LogOutput::File,
    };
    let _guard = match initialize_logging(output, config.verbose_output) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let media_type: MediaType = match cli.media_type.parse() {
        Ok(m) => m,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match vidtag_rs::run(&config, media_type) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
