//! Sandboxed execution of candidate jobs.
//!
//! Each job gets a numbered directory under the results root holding its
//! extracted inputs, its outputs and record files (`.cmd.txt`,
//! `.returncode.txt`, `.stdout.txt`, `.stderr.txt`). The command line is
//! rewritten to point at those files and run through the configured shell.

mod dir;
mod process;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use dir::{unique_file_path, write_outcome, SandboxDir};
pub use process::run_shell;

use crate::command::substitute_paths;
use crate::config::PeelConfig;
use crate::fasta::Extractor;
use crate::fragments::FragmentList;
use crate::job::{JobId, JobPlan};
use crate::scheduler::{Launcher, RunHandle};

/// Launcher running jobs as shell commands in sandbox directories.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
    shell: String,
    timeout: Option<Duration>,
    keep_dirs: bool,
    extractor: Extractor,
}

/// A job whose directory and command are ready. Input files are written
/// when the job starts, off the async runtime.
#[derive(Debug)]
pub struct PreparedRun {
    pub id: JobId,
    pub dir: SandboxDir,
    pub command: String,
    pub inputs: Vec<(FragmentList, PathBuf)>,
}

impl Sandbox {
    pub fn new(root: impl Into<PathBuf>, cfg: &PeelConfig, keep_dirs: bool) -> Self {
        Self {
            root: root.into(),
            shell: cfg.shell.clone(),
            timeout: cfg.job_timeout(),
            keep_dirs,
            extractor: Extractor::new(cfg.extract_chunk_bytes),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Writes every input of a job into its sandbox directory.
fn materialize(extractor: &Extractor, inputs: &[(FragmentList, PathBuf)]) -> Result<()> {
    for (fragments, dest) in inputs {
        extractor.extract(fragments, dest)?;
    }
    Ok(())
}

impl Launcher for Sandbox {
    type Prepared = PreparedRun;

    fn prepare(&mut self, id: JobId, plan: &JobPlan) -> Result<PreparedRun> {
        let dir = SandboxDir::create_numbered(&self.root, self.keep_dirs)?;
        let mut taken = HashSet::new();
        let mut substitutions = Vec::new();
        let mut inputs = Vec::with_capacity(plan.content.inputs().len());

        for input in plan.content.inputs() {
            let dest = dir.unique_path(&input.file_name(), &mut taken);
            substitutions.push((input.path.clone(), dest.clone()));
            inputs.push((input.fragments.clone(), dest));
        }
        for output in plan.content.outputs() {
            let name = output
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string());
            let dest = dir.unique_path(&name, &mut taken);
            substitutions.push((output.clone(), dest));
        }

        let command = substitute_paths(&plan.command, &substitutions);
        dir.write_command(&command)?;
        tracing::debug!(
            job = id,
            dir = %dir.path().display(),
            command = %command,
            "sandbox prepared"
        );
        Ok(PreparedRun {
            id,
            dir,
            command,
            inputs,
        })
    }

    fn start(&mut self, prepared: PreparedRun) -> Result<RunHandle> {
        let PreparedRun {
            id,
            dir,
            command,
            inputs,
        } = prepared;
        let shell = self.shell.clone();
        let timeout = self.timeout;
        let extractor = self.extractor;
        let path = dir.path().to_path_buf();
        let task = tokio::spawn(async move {
            tokio::task::spawn_blocking(move || materialize(&extractor, &inputs))
                .await
                .context("materialize task join")?
                .with_context(|| format!("job {id}: materialize inputs"))?;
            let output = run_shell(&shell, &command, &path, timeout)
                .await
                .with_context(|| format!("job {id}"))?;
            write_outcome(&path, &output)?;
            Ok(output)
        });
        Ok(RunHandle::new(task, Some(dir)))
    }
}
