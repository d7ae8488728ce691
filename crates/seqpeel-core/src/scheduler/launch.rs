//! The seam between the scheduler and whatever actually runs a job.

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::job::{JobId, JobPlan};
use crate::sandbox::SandboxDir;

/// Captured result of one command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// `None` when the process was killed by a signal, timed out or never started.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    /// The job never ran (sandbox or spawn failure).
    pub launch_failed: bool,
}

impl RunOutput {
    /// Output of a job that could not be started; it never counts as
    /// reproducing the behaviour.
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self {
            stderr: message.into(),
            launch_failed: true,
            ..Self::default()
        }
    }
}

/// A started job: the task producing its output and the directory it runs in.
pub struct RunHandle {
    task: JoinHandle<Result<RunOutput>>,
    sandbox: Option<SandboxDir>,
}

impl RunHandle {
    pub fn new(task: JoinHandle<Result<RunOutput>>, sandbox: Option<SandboxDir>) -> Self {
        Self { task, sandbox }
    }

    /// Non-blocking completion check.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the output, then releases the sandbox.
    pub async fn finish(self) -> RunOutput {
        let RunHandle { task, sandbox } = self;
        let output = match task.await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => RunOutput::launch_failure(format!("{e:#}")),
            Err(e) => RunOutput::launch_failure(format!("job task join: {e}")),
        };
        release(sandbox).await;
        output
    }

    /// Kills the job (dropping the task drops its child process) and waits
    /// for the task to unwind before releasing the sandbox.
    pub async fn abort(self) {
        let RunHandle { task, sandbox } = self;
        task.abort();
        // Already-finished tasks return their output here; it is discarded.
        let _ = task.await;
        release(sandbox).await;
    }
}

/// Removes the sandbox directory on the blocking pool; a large tree can take
/// a while to delete.
async fn release(sandbox: Option<SandboxDir>) {
    let Some(dir) = sandbox else {
        return;
    };
    if let Err(e) = tokio::task::spawn_blocking(move || drop(dir)).await {
        tracing::warn!(error = %e, "sandbox cleanup task failed");
    }
}

/// Prepares and starts jobs for the [`Scheduler`](super::Scheduler).
///
/// `prepare` does the synchronous setup (directory, input files, command);
/// `start` spawns the run. Either failing counts as a launch failure.
pub trait Launcher {
    type Prepared;

    fn prepare(&mut self, id: JobId, plan: &JobPlan) -> Result<Self::Prepared>;

    fn start(&mut self, prepared: Self::Prepared) -> Result<RunHandle>;
}
