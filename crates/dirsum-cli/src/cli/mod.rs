//! CLI for dirsum.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dirsum_core::checksum::Encoding;
use dirsum_core::config;
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_completions, run_config, run_man, run_scan, ScanArgs};

/// Top-level CLI for dirsum.
#[derive(Debug, Parser)]
#[command(name = "dirsum")]
#[command(about = "dirsum: checksum every file under a directory, in parallel", long_about = None)]
pub struct Cli {
    /// Use this config file instead of ~/.config/dirsum/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Digest text encoding on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EncodingArg {
    Hex,
    Base64,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Hex => Encoding::Hex,
            EncodingArg::Base64 => Encoding::Base64,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Checksum every file under a directory and print one sorted line per file.
    Scan {
        /// Directory to calculate checksums of.
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Hash up to N files concurrently (default from config, 10).
        #[arg(long, short = 'j', value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
        jobs: Option<u32>,
        /// Digest encoding for output lines (default from config, hex).
        #[arg(long, value_enum)]
        encoding: Option<EncodingArg>,
        /// Descend into symlinked directories.
        #[arg(long)]
        follow_links: bool,
        /// Print progress to stderr while scanning.
        #[arg(long)]
        progress: bool,
    },

    /// Compute SHA-256 of a single file.
    Checksum {
        /// Path to the file.
        path: String,
        /// Digest encoding (default from config, hex).
        #[arg(long, value_enum)]
        encoding: Option<EncodingArg>,
    },

    /// Show the config file location and effective settings.
    Config,

    /// Generate shell completions on stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Render the man page on stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let (cfg, cfg_path) = match &cli.config {
            Some(path) => (config::load_from(path)?, path.clone()),
            None => (config::load_or_init()?, config::config_path()?),
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Scan {
                dir,
                jobs,
                encoding,
                follow_links,
                progress,
            } => {
                let args = ScanArgs {
                    jobs: jobs.map(|n| n as usize),
                    encoding: encoding.map(Encoding::from),
                    follow_links,
                    progress,
                };
                run_scan(&cfg, &dir, &args).await?;
            }
            CliCommand::Checksum { path, encoding } => {
                let encoding = encoding.map(Encoding::from).unwrap_or(cfg.encoding);
                run_checksum(Path::new(&path), encoding).await?;
            }
            CliCommand::Config => run_config(&cfg, &cfg_path)?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
