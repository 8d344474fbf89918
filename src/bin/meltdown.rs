use std::{path::PathBuf, time::Duration};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use meltdown::{DEFAULT_BASE_STRENGTH, DistortionService, FfmpegLogLevel, Workspace};

const CLI_AFTER_HELP: &str = "Examples:\n  meltdown photo.png\n  meltdown clip.mp4 --strength 2.0 --workdir /tmp/meltdown\n  meltdown loop.gif --verbose";

#[derive(Debug, Parser)]
#[command(
    name = "meltdown",
    version,
    about = "Progressively melt images, GIFs, and videos with content-aware distortion",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input media file (image, GIF, or video). Consumed on success.
    input: PathBuf,

    /// Base distortion strength; 1.0 barely distorts, ~2.5 melts heavily.
    #[arg(short, long, default_value_t = DEFAULT_BASE_STRENGTH)]
    strength: f64,

    /// Working directory for staging and output.
    #[arg(long, default_value = ".meltdown")]
    workdir: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.log_level {
        Some(level) => {
            let parsed =
                parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
            meltdown::set_ffmpeg_log_level(parsed);
        }
        None => meltdown::set_ffmpeg_log_level(FfmpegLogLevel::Error),
    }

    let input = cli.input.canonicalize()?;
    let name = input
        .file_name()
        .ok_or_else(|| format!("input has no file name: {}", input.display()))?
        .to_string_lossy()
        .into_owned();
    let input_dir = input
        .parent()
        .ok_or_else(|| format!("input has no parent directory: {}", input.display()))?;

    let workspace = Workspace::under(&cli.workdir)?;
    let output_dir = workspace.output.clone();
    let service = DistortionService::new(input_dir, workspace);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Melting {name}..."));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = service.distort_with_strength(&name, cli.strength);
    spinner.finish_and_clear();

    let output_name = result?;
    println!(
        "{} {}",
        "melted:".green().bold(),
        output_dir.join(output_name).display()
    );

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::parse_log_level;

    #[test]
    fn parse_log_level_aliases() {
        assert!(parse_log_level("quiet").is_some());
        assert!(parse_log_level("WARN").is_some());
        assert!(parse_log_level("Warning").is_some());
        assert!(parse_log_level("trace").is_some());
        assert!(parse_log_level("chatty").is_none());
    }
}
