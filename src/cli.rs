//! Command-line interface definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::config::StaticConfig;

/// urlshort - redirect short paths to full URLs
#[derive(Parser, Debug)]
#[command(name = "urlshort")]
#[command(version)]
#[command(about = "Redirect short paths to full URLs", long_about = None)]
pub struct Cli {
    /// The file where default short URLs are stored (YAML)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub generate_config: bool,
}

impl Cli {
    /// Seed file to load: `--file` wins over `seed.file`; relative paths
    /// resolve against the working directory.
    pub fn seed_file(&self, config: &StaticConfig) -> PathBuf {
        let path = self
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.seed.file));
        if path.is_absolute() {
            return path;
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path,
        }
    }
}
