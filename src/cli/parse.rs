//! CLI parse: clap types for md5list. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// md5list - fingerprint every file below one or more directories
#[derive(Parser, Debug)]
#[command(name = "md5list")]
#[command(about = "Write an MD5 manifest (path, extension, size, fingerprint) for every file under the given paths")]
pub struct Cli {
    /// Root directories to scan
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Manifest file to write (default: <output-dir>/<timestamp>.csv)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Directory for the timestamped manifest
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Bytes read per chunk while hashing (minimum 64)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Do not descend into symlinked directories
    #[arg(long)]
    pub no_follow_symlinks: bool,

    /// Configuration file path (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Summary format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Disable logging
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
