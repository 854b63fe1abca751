//! md5list CLI Binary
//!
//! Scans the given roots and writes one manifest line per regular file.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use md5list::cli::{format_summary_json, format_summary_text, Cli, SummaryFormat};
use md5list::config::{ConfigLoader, ScanConfig};
use md5list::logging::init_logging;
use md5list::manifest::{manifest_file_name, CsvManifest};
use md5list::scan::Scanner;
use md5list::tree::path::resolve_root;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let summary_format: SummaryFormat = cli.format.parse()?;

    let loaded = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = build_scan_config(cli, loaded);
    config.validate()?;

    init_logging(Some(&config.logging)).context("Failed to initialize logging")?;
    info!(roots = cli.paths.len(), "md5list starting");

    let manifest_path = manifest_path(cli, &config);
    let mut manifest = CsvManifest::create(&manifest_path)
        .with_context(|| format!("Cannot open manifest {}", manifest_path.display()))?;

    // The manifest may live inside a scanned root; it is never fingerprinted.
    let manifest_abs = resolve_root(&manifest_path).unwrap_or_else(|_| manifest_path.clone());
    let summary = Scanner::new(&config)
        .excluding(manifest_abs)
        .run(&cli.paths, &mut manifest)?;
    manifest
        .flush()
        .with_context(|| format!("Cannot write manifest {}", manifest_path.display()))?;

    info!(
        manifest = %manifest_path.display(),
        records = manifest.records(),
        "Manifest complete"
    );

    match summary_format {
        SummaryFormat::Text => {
            let color = config.logging.color && std::io::stdout().is_terminal();
            println!("{}", format_summary_text(&manifest_path, &summary, color));
        }
        SummaryFormat::Json => println!("{}", format_summary_json(&manifest_path, &summary)?),
    }

    Ok(())
}

/// Apply CLI flags on top of the loaded configuration.
/// Precedence: CLI flags override environment override config file override defaults.
fn build_scan_config(cli: &Cli, mut config: ScanConfig) -> ScanConfig {
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    if cli.no_follow_symlinks {
        config.follow_symlinks = false;
    }
    if let Some(ref dir) = cli.output_dir {
        config.output_dir = dir.clone();
    }

    if cli.quiet {
        config.logging.enabled = false;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.logging.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.logging.file = Some(file.clone());
    }

    config
}

fn manifest_path(cli: &Cli, config: &ScanConfig) -> PathBuf {
    match cli.output {
        Some(ref path) => path.clone(),
        None => config.output_dir.join(manifest_file_name(&Local::now())),
    }
}
