//! CLI for the seqpeel FASTA minimizer.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use seqpeel_core::config::{self, PeelConfig};
use std::path::{Path, PathBuf};

use commands::{run_index, run_peel};

/// Top-level CLI for seqpeel.
#[derive(Debug, Parser)]
#[command(name = "seqpeel")]
#[command(about = "seqpeel: shrink FASTA inputs while a command keeps misbehaving", long_about = None)]
pub struct Cli {
    /// Mirror log events to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from this file instead of the XDG config file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Minimize the input FASTA files of a command line.
    Peel(PeelArgs),

    /// Print the record index (header, first and last sequence byte, size) of FASTA files.
    Index {
        /// FASTA files to index.
        #[arg(required = true, value_name = "FILE")]
        paths: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct PeelArgs {
    /// Input FASTA files, as they appear on the command line.
    #[arg(
        short = 'l',
        long,
        num_args = 1..,
        value_name = "FILE",
        required_unless_present = "fof",
        conflicts_with = "fof"
    )]
    pub fasta_list: Vec<PathBuf>,

    /// File listing the input FASTA files, one per line.
    #[arg(short = 'f', long, value_name = "FILE")]
    pub fof: Option<PathBuf>,

    /// Command line to run; it must name the input files.
    #[arg(short = 'c', long, value_name = "COMMAND")]
    pub command_line: String,

    /// Expected exit code of the command.
    #[arg(short = 'r', long, value_name = "CODE", allow_negative_numbers = true)]
    pub returncode: Option<i32>,

    /// Text expected in the command's stdout.
    #[arg(short = 'u', long, value_name = "TEXT")]
    pub stdout: Option<String>,

    /// Text expected in the command's stderr.
    #[arg(short = 'e', long, value_name = "TEXT")]
    pub stderr: Option<String>,

    /// Results directory; removed and recreated at start.
    #[arg(short = 'd', long, default_value = "Results", value_name = "DIR")]
    pub outdir: PathBuf,

    /// Files the command writes, redirected into each job directory.
    #[arg(short = 'o', long, num_args = 1.., value_name = "FILE")]
    pub outfilenames: Vec<PathBuf>,

    /// Run up to N candidate commands concurrently (overrides the config file).
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Kill a candidate command after SECS seconds and count it as not reproducing.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Keep every job directory instead of removing it when the job ends.
    #[arg(short = 'k', long)]
    pub keep_dirs: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            CliCommand::Peel(args) => {
                let cfg = load_config(self.config.as_deref())?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_peel(args, cfg).await?;
            }
            CliCommand::Index { paths } => run_index(&paths)?,
        }
        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<PeelConfig> {
    match path {
        Some(path) => config::load_from_path(path),
        None => config::load_or_init(),
    }
}

#[cfg(test)]
mod tests;
