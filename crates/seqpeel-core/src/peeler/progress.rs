//! Progress events and final statistics of a peel run.

use serde::Serialize;

use crate::job::JobId;

/// Sent whenever a smaller input set reproducing the behaviour is found.
#[derive(Debug, Clone)]
pub struct PeelProgress {
    /// Job that produced the new best.
    pub job: JobId,
    pub best_size: u64,
    pub initial_size: u64,
    /// Input files in the best set.
    pub files: usize,
    pub jobs_terminated: u64,
    pub elapsed_secs: f64,
}

impl PeelProgress {
    /// Fraction of the initial bytes removed so far, in [0.0, 1.0].
    pub fn fraction_removed(&self) -> f64 {
        if self.initial_size == 0 {
            return 0.0;
        }
        1.0 - (self.best_size as f64 / self.initial_size as f64).min(1.0)
    }
}

/// Counters of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeelStats {
    pub jobs_submitted: u64,
    pub jobs_launched: u64,
    pub jobs_terminated: u64,
    pub jobs_canceled: u64,
    pub launch_failures: u64,
    /// Terminated jobs that reproduced the behaviour.
    pub jobs_present: u64,
    pub initial_size: u64,
    pub final_size: u64,
    pub elapsed_secs: f64,
}
