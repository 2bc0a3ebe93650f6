use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;
use pdf2txt_core::config_file::{self, ConfigFile};
use pdf2txt_core::{BatchOptions, DEFAULT_INPUTS, run_batch};
use pdf2txt_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Convert PDF files to companion text files, one `--- Page N ---` section per page
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// PDF files to convert (defaults to the configured list)
    files: Vec<PathBuf>,

    /// Directory for the text files (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to a config file (default: .pdf2txt.toml over the platform config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Fraction of page height to drop from the top of each page, in [0, 1)
    #[arg(long, value_parser = parse_ratio)]
    header_exclusion: Option<f32>,

    /// Fraction of page height to drop from the bottom of each page, in [0, 1)
    #[arg(long, value_parser = parse_ratio)]
    footer_exclusion: Option<f32>,
}

/// Fully resolved run settings.
#[derive(Debug)]
struct Settings {
    inputs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    header_exclusion: f32,
    footer_exclusion: f32,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => config_file::load_explicit(path)?,
        None => config_file::load_config(),
    };

    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let color = ColorMode(use_color);
    let settings = resolve(cli, &config, std::env::var("PDF2TXT_OUTPUT_DIR").ok());
    tracing::debug!(?settings, "resolved settings");

    let backend = MupdfBackend::new()
        .with_header_exclusion(settings.header_exclusion)
        .with_footer_exclusion(settings.footer_exclusion);
    let options = BatchOptions {
        output_dir: settings.output_dir,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let summary = run_batch(&settings.inputs, &options, &backend, |event| {
        let _ = output::print_event(&mut out, &event, color);
        let _ = out.flush();
    });

    let _ = writeln!(out);
    let _ = output::print_summary(&mut out, &summary, color);

    Ok(())
}

/// Resolve settings: CLI flags > env vars > config file > defaults.
fn resolve(cli: Cli, config: &ConfigFile, env_output_dir: Option<String>) -> Settings {
    let inputs = if !cli.files.is_empty() {
        cli.files
    } else if let Some(files) = config.files() {
        files.iter().map(PathBuf::from).collect()
    } else {
        DEFAULT_INPUTS.iter().map(PathBuf::from).collect()
    };

    let output_dir = cli
        .output_dir
        .or_else(|| env_output_dir.map(PathBuf::from))
        .or_else(|| config.output_dir().map(PathBuf::from));

    Settings {
        inputs,
        output_dir,
        header_exclusion: cli
            .header_exclusion
            .or_else(|| config_ratio("header_exclusion", config.header_exclusion()))
            .unwrap_or(0.0),
        footer_exclusion: cli
            .footer_exclusion
            .or_else(|| config_ratio("footer_exclusion", config.footer_exclusion()))
            .unwrap_or(0.0),
    }
}

fn is_valid_ratio(ratio: f32) -> bool {
    (0.0..1.0).contains(&ratio)
}

/// Parse an exclusion ratio flag, rejecting values outside `[0, 1)`.
fn parse_ratio(s: &str) -> Result<f32, String> {
    let ratio: f32 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if is_valid_ratio(ratio) {
        Ok(ratio)
    } else {
        Err(format!("{} is outside [0, 1)", ratio))
    }
}

/// Config values are not checked by clap; drop out-of-range ones.
fn config_ratio(key: &str, value: Option<f32>) -> Option<f32> {
    let ratio = value?;
    if is_valid_ratio(ratio) {
        Some(ratio)
    } else {
        tracing::warn!(key, ratio, "ignoring out-of-range exclusion ratio in config");
        None
    }
}

/// Install a stderr subscriber filtered by `PDF2TXT_LOG` (default: errors only),
/// keeping stdout for the conversion report.
fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_env("PDF2TXT_LOG") {
        Ok(f) => f,
        Err(_) => tracing_subscriber::EnvFilter::new("error"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
