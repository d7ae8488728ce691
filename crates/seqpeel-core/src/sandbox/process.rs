//! Runs one shell command in its own process group.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::scheduler::RunOutput;

/// Kills the whole process group on drop, so commands started by the shell
/// (pipelines, background jobs) die with it when a run is canceled.
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid {
            kill_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    // ESRCH (group already gone) is expected after a race with exit.
    let _ = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}

/// Runs `<shell> -c <command>` inside `dir` with stdin closed and both output
/// streams captured. With a `timeout`, an expired run is killed and reported
/// with `timed_out` set and no exit code.
pub async fn run_shell(
    shell: &str,
    command: &str,
    dir: &Path,
    timeout: Option<Duration>,
) -> Result<RunOutput> {
    let mut cmd = Command::new(shell);
    cmd.arg("-c")
        .arg(command)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd
        .spawn()
        .with_context(|| format!("spawn {shell} in {}", dir.display()))?;
    let mut group = ProcessGroupGuard { pgid: child.id() };

    let wait = child.wait_with_output();
    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(dir = %dir.display(), ?limit, "command timed out");
                return Ok(RunOutput {
                    timed_out: true,
                    ..RunOutput::default()
                });
            }
        },
        None => wait.await,
    }
    .with_context(|| format!("wait for command in {}", dir.display()))?;
    group.disarm();

    Ok(RunOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        ..RunOutput::default()
    })
}
