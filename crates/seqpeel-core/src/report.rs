//! Result files and `report.json` written after a successful run.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::checksum::sha256_path;
use crate::error::PeelError;
use crate::fasta::Extractor;
use crate::peeler::{Expectation, PeelOutcome, PeelStats};
use crate::sandbox::unique_file_path;

pub const RESULT_DIR: &str = "result";
pub const REPORT_FILE: &str = "report.json";

/// One minimized input file.
#[derive(Debug, Clone, Serialize)]
pub struct ReportFile {
    /// The input as given to the run.
    pub input: PathBuf,
    /// Its minimized copy under `<outdir>/result`.
    pub result: PathBuf,
    pub records: usize,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeelReport {
    pub command: String,
    /// Command line as it applies to the minimized input set.
    pub minimized_command: String,
    pub expectation: Expectation,
    pub initial_size: u64,
    pub final_size: u64,
    pub stats: PeelStats,
    pub files: Vec<ReportFile>,
}

/// Extracts the best input set into `<outdir>/result/<basename>` and writes
/// `<outdir>/report.json` describing the run.
pub fn write_results(
    outdir: &Path,
    outcome: &PeelOutcome,
    command: &str,
    expectation: &Expectation,
    extractor: &Extractor,
) -> Result<PeelReport> {
    let result_dir = outdir.join(RESULT_DIR);
    fs::create_dir_all(&result_dir)
        .map_err(|e| PeelError::io(format!("create {}", result_dir.display()), e))?;

    let mut taken = HashSet::new();
    let mut files = Vec::with_capacity(outcome.best.inputs().len());
    for input in outcome.best.inputs() {
        let dest = unique_file_path(&result_dir, &input.file_name(), &mut taken);
        extractor.extract(&input.fragments, &dest)?;
        files.push(ReportFile {
            input: input.path.clone(),
            sha256: sha256_path(&dest)?,
            result: dest,
            records: input.fragments.records().len(),
            size: input.size(),
        });
    }

    let report = PeelReport {
        command: command.to_string(),
        minimized_command: outcome.command.clone(),
        expectation: expectation.clone(),
        initial_size: outcome.stats.initial_size,
        final_size: outcome.stats.final_size,
        stats: outcome.stats.clone(),
        files,
    };
    let path = outdir.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&path, json).map_err(|e| PeelError::io(format!("write {}", path.display()), e))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ExperimentContent;

    #[test]
    fn writes_result_files_and_report() {
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("in.fa");
        fs::write(&input, ">s1\nAAAAAAAAA\n>s2\nCCCCCCCCCCCC\n").unwrap();
        let full = ExperimentContent::load(&[input.clone()], Vec::new()).unwrap();
        // Keep only the second record.
        let fragments = full.inputs()[0].fragments.without_range(0, 9);
        let best = full.with_fragments(0, fragments);
        let outcome = PeelOutcome {
            command: "grep -q C in.fa".into(),
            stats: PeelStats {
                initial_size: 23,
                final_size: best.size(),
                ..PeelStats::default()
            },
            best,
        };
        let expectation = Expectation::new(Some(0), None, None).unwrap();
        let outdir = work.path().join("Results");
        fs::create_dir(&outdir).unwrap();

        let report = write_results(
            &outdir,
            &outcome,
            "grep -q C in.fa",
            &expectation,
            &Extractor::default(),
        )
        .unwrap();

        let result = outdir.join("result").join("in.fa");
        assert_eq!(
            fs::read_to_string(&result).unwrap(),
            "> s2 $$$ left=18 right=30\nCCCCCCCCCCCC\n"
        );
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].size, 13);
        assert_eq!(report.files[0].sha256, sha256_path(&result).unwrap());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(outdir.join("report.json")).unwrap())
                .unwrap();
        assert_eq!(json["final_size"], 13);
        assert_eq!(json["initial_size"], 23);
        assert_eq!(json["expectation"]["exit_code"], 0);
        assert_eq!(json["files"][0]["records"], 1);
    }

    #[test]
    fn unwritable_result_dir_is_an_io_error() {
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("in.fa");
        fs::write(&input, ">s1\nAAAA\n").unwrap();
        let best = ExperimentContent::load(&[input], Vec::new()).unwrap();
        let outcome = PeelOutcome {
            command: "cat in.fa".into(),
            stats: PeelStats::default(),
            best,
        };
        // A plain file where the result directory should go.
        let outdir = work.path().join("Results");
        fs::create_dir(&outdir).unwrap();
        fs::write(outdir.join(RESULT_DIR), "").unwrap();

        let err = write_results(
            &outdir,
            &outcome,
            "cat in.fa",
            &Expectation::new(Some(0), None, None).unwrap(),
            &Extractor::default(),
        )
        .unwrap_err();
        match err.downcast_ref::<PeelError>() {
            Some(PeelError::Io { context, .. }) => assert!(context.starts_with("create ")),
            other => panic!("expected PeelError::Io, got {other:?}"),
        }
        assert!(!outdir.join(REPORT_FILE).exists());
    }
}
