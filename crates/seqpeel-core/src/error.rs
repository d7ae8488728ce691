//! User-facing error taxonomy.
//!
//! Only configuration problems and a root run that never shows the expected
//! behaviour abort a minimization. Everything else (a candidate without the
//! behaviour, a sandbox that could not be launched) just steers the search.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeelError {
    /// No exit code, stdout or stderr expectation was given.
    #[error("at least one trigger (return code, stdout or stderr text) must be set")]
    NoTrigger,
    /// The input list resolved to zero files.
    #[error("no input FASTA file to peel")]
    NoInputs,
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("invalid manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The unmodified input never reproduced the expected behaviour.
    #[error("nothing to minimize: the complete input does not trigger the expected behaviour (exit code {})", exit_code_label(.exit_code))]
    NothingToMinimize { exit_code: Option<i32> },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl PeelError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PeelError::Io {
            context: context.into(),
            source,
        }
    }
}
