//! Shared fixtures for the end-to-end tests: a scratch directory holding
//! FASTA inputs, and a driver running the real sandbox launcher on it.

#![allow(dead_code)]

use anyhow::Result;
use seqpeel_core::command::absolutize;
use seqpeel_core::config::PeelConfig;
use seqpeel_core::content::ExperimentContent;
use seqpeel_core::peeler::{Expectation, PeelOutcome, Peeler};
use seqpeel_core::sandbox::Sandbox;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Workspace {
    _dir: TempDir,
    root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir(root.join("Results")).unwrap();
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn results(&self) -> PathBuf {
        self.root.join("Results")
    }

    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    /// Peels `inputs` (names relative to the workspace) under `command`,
    /// the way the CLI does after resolving its arguments.
    pub async fn peel(
        &self,
        inputs: &[&str],
        outputs: &[&str],
        command: &str,
        expectation: Expectation,
        cfg: PeelConfig,
    ) -> Result<PeelOutcome> {
        let inputs: Vec<PathBuf> = inputs.iter().map(PathBuf::from).collect();
        let outputs: Vec<PathBuf> = outputs.iter().map(PathBuf::from).collect();
        let template = absolutize(command, &inputs, &outputs, &self.root)?;
        let content = ExperimentContent::load(&template.inputs, template.outputs.clone())?;
        let sandbox = Sandbox::new(self.results(), &cfg, false);
        Peeler::new(sandbox, expectation, &cfg)
            .run(content, template.command)
            .await
    }
}

pub fn config(jobs: usize) -> PeelConfig {
    PeelConfig {
        max_concurrent_jobs: jobs,
        poll_interval_ms: 1,
        ..PeelConfig::default()
    }
}

pub fn exit_code(code: i32) -> Expectation {
    Expectation::new(Some(code), None, None).unwrap()
}

/// Concatenated sequence bytes of every record in `path`, header lines excluded.
pub fn sequence_text(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with('>'))
        .collect()
}
