//! The behaviour a candidate has to reproduce.

use serde::Serialize;

use crate::error::PeelError;
use crate::scheduler::RunOutput;

/// Expected exit code and/or text in the captured streams. Unset parts
/// always match; at least one part is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expectation {
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl Expectation {
    pub fn new(
        exit_code: Option<i32>,
        stdout: Option<String>,
        stderr: Option<String>,
    ) -> Result<Self, PeelError> {
        if exit_code.is_none() && stdout.is_none() && stderr.is_none() {
            return Err(PeelError::NoTrigger);
        }
        Ok(Self {
            exit_code,
            stdout,
            stderr,
        })
    }

    /// Whether `output` shows the behaviour. A run that timed out or never
    /// started never does.
    pub fn matches(&self, output: &RunOutput) -> bool {
        if output.launch_failed || output.timed_out {
            return false;
        }
        let code_ok = self.exit_code.map_or(true, |c| output.exit_code == Some(c));
        let stdout_ok = self
            .stdout
            .as_deref()
            .map_or(true, |text| output.stdout.contains(text));
        let stderr_ok = self
            .stderr
            .as_deref()
            .map_or(true, |text| output.stderr.contains(text));
        code_ok && stdout_ok && stderr_ok
    }
}
