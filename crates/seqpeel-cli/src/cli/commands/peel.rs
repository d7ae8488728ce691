//! `seqpeel peel` – minimize the inputs of a command line.

use anyhow::{bail, Context, Result};
use seqpeel_core::command;
use seqpeel_core::config::PeelConfig;
use seqpeel_core::content::ExperimentContent;
use seqpeel_core::error::PeelError;
use seqpeel_core::fasta::{self, Extractor};
use seqpeel_core::peeler::{Expectation, PeelProgress, Peeler};
use seqpeel_core::report;
use seqpeel_core::sandbox::Sandbox;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::cli::PeelArgs;

const PROGRESS_INTERVAL_MS: u128 = 500;

pub async fn run_peel(args: PeelArgs, mut cfg: PeelConfig) -> Result<()> {
    let inputs = resolve_inputs(&args)?;
    let expectation = Expectation::new(args.returncode, args.stdout.clone(), args.stderr.clone())?;
    if let Some(jobs) = args.jobs {
        cfg.max_concurrent_jobs = jobs.max(1);
    }
    if let Some(secs) = args.timeout {
        cfg.job_timeout_secs = Some(secs);
    }

    let cwd = std::env::current_dir().context("read current directory")?;
    let template = command::absolutize(&args.command_line, &inputs, &args.outfilenames, &cwd)?;
    tracing::debug!(command = %template.command, "command template");
    let outdir = cwd.join(&args.outdir);
    recreate_outdir(&outdir, &template.inputs)?;

    let content = ExperimentContent::load(&template.inputs, template.outputs.clone())?;
    println!(
        "Peeling {} file(s), {} bytes of sequence, {} job(s) at a time",
        content.inputs().len(),
        content.size(),
        cfg.max_concurrent_jobs
    );

    let (progress_tx, progress_rx) = mpsc::channel::<PeelProgress>(64);
    let progress_handle = tokio::spawn(print_progress(progress_rx));

    let sandbox = Sandbox::new(&outdir, &cfg, args.keep_dirs);
    let result = Peeler::new(sandbox, expectation.clone(), &cfg)
        .with_progress(progress_tx)
        .run(content, template.command.clone())
        .await;
    let _ = progress_handle.await;
    let outcome = result?;

    let extractor = Extractor::new(cfg.extract_chunk_bytes);
    let report = report::write_results(
        &outdir,
        &outcome,
        &args.command_line,
        &expectation,
        &extractor,
    )?;

    println!(
        "Reduced {} -> {} bytes in {} file(s) ({} jobs, {:.1}s)",
        report.initial_size,
        report.final_size,
        report.files.len(),
        report.stats.jobs_terminated,
        report.stats.elapsed_secs
    );
    for file in &report.files {
        println!("  {}", file.result.display());
    }
    println!("Command: {}", report.minimized_command);
    Ok(())
}

/// Input paths from `--fasta-list` or the `--fof` manifest.
fn resolve_inputs(args: &PeelArgs) -> Result<Vec<PathBuf>> {
    let inputs = match &args.fof {
        Some(manifest) => fasta::load_manifest(manifest)?,
        None => args.fasta_list.clone(),
    };
    if inputs.is_empty() {
        return Err(PeelError::NoInputs.into());
    }
    if let Some(missing) = inputs.iter().find(|p| !p.is_file()) {
        return Err(PeelError::MissingInput(missing.clone()).into());
    }
    Ok(inputs)
}

/// Wipes and recreates the results directory. Refuses when an input lives
/// inside it.
fn recreate_outdir(outdir: &Path, inputs: &[PathBuf]) -> Result<()> {
    if outdir.exists() {
        let canonical = fs::canonicalize(outdir)
            .with_context(|| format!("resolve {}", outdir.display()))?;
        if let Some(inside) = inputs.iter().find(|p| p.starts_with(&canonical)) {
            bail!(
                "input {} lies inside the results directory {}",
                inside.display(),
                outdir.display()
            );
        }
        fs::remove_dir_all(outdir)
            .map_err(|e| PeelError::io(format!("remove {}", outdir.display()), e))?;
    }
    fs::create_dir_all(outdir)
        .map_err(|e| PeelError::io(format!("create {}", outdir.display()), e))?;
    Ok(())
}

async fn print_progress(mut progress_rx: mpsc::Receiver<PeelProgress>) {
    let mut last_print: Option<Instant> = None;
    let mut pending: Option<PeelProgress> = None;
    while let Some(progress) = progress_rx.recv().await {
        let now = Instant::now();
        let due = last_print.map_or(true, |t| now.duration_since(t).as_millis() >= PROGRESS_INTERVAL_MS);
        if due {
            print_line(&progress);
            last_print = Some(now);
            pending = None;
        } else {
            pending = Some(progress);
        }
    }
    if let Some(progress) = pending {
        print_line(&progress);
    }
}

fn print_line(progress: &PeelProgress) {
    println!(
        "  best {} / {} bytes ({:.1}% removed)  {} file(s)  {} jobs  {:.1}s",
        progress.best_size,
        progress.initial_size,
        progress.fraction_removed() * 100.0,
        progress.files,
        progress.jobs_terminated,
        progress.elapsed_secs
    );
}
