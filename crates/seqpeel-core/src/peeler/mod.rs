//! The minimization driver.
//!
//! Submits the root job, then repeatedly ticks the scheduler and expands
//! every terminated job: a job reproducing the behaviour cancels the
//! siblings it makes pointless and may become the new best; either way its
//! strategy decides the next candidates.

mod expectation;
mod progress;


use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub use expectation::Expectation;
pub use progress::{PeelProgress, PeelStats};

use crate::config::PeelConfig;
use crate::content::ExperimentContent;
use crate::error::PeelError;
use crate::job::{Job, JobId, JobPlan};
use crate::scheduler::{Finished, Launcher, Scheduler};

/// Smallest input set found, with the command line that runs on it.
#[derive(Debug, Clone)]
pub struct PeelOutcome {
    pub best: ExperimentContent,
    pub command: String,
    pub stats: PeelStats,
}

pub struct Peeler<L: Launcher> {
    scheduler: Scheduler<L>,
    expectation: Expectation,
    poll_interval: Duration,
    progress_tx: Option<mpsc::Sender<PeelProgress>>,
}

struct RunState {
    started: Instant,
    initial_size: u64,
    best: Option<(ExperimentContent, String)>,
    jobs_present: u64,
}

impl<L: Launcher> Peeler<L> {
    pub fn new(launcher: L, expectation: Expectation, cfg: &PeelConfig) -> Self {
        Self {
            scheduler: Scheduler::new(launcher, cfg.max_concurrent_jobs),
            expectation,
            poll_interval: cfg.poll_interval(),
            progress_tx: None,
        }
    }

    /// Reports every improvement on `tx`. Sends never block the search;
    /// events are dropped when the channel is full.
    pub fn with_progress(mut self, tx: mpsc::Sender<PeelProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Runs the minimization of `content` under `command` to completion.
    pub async fn run(mut self, content: ExperimentContent, command: String) -> Result<PeelOutcome> {
        let mut state = RunState {
            started: Instant::now(),
            initial_size: content.size(),
            best: None,
            jobs_present: 0,
        };
        tracing::info!(
            files = content.inputs().len(),
            size = state.initial_size,
            "peel started"
        );
        let root = self
            .scheduler
            .submit_root(JobPlan::complete(content, command));

        loop {
            let mut progressed = self.scheduler.tick().await;
            while let Some(finished) = self.scheduler.next_finished() {
                progressed = true;
                let present = self.expectation.matches(&finished.output);
                if finished.id == root && !present {
                    tracing::info!(
                        exit_code = ?finished.output.exit_code,
                        "complete input does not show the expected behaviour"
                    );
                    return Err(PeelError::NothingToMinimize {
                        exit_code: finished.output.exit_code,
                    }
                    .into());
                }
                self.handle(finished, present, &mut state).await;
            }
            if self.scheduler.is_idle() {
                break;
            }
            if !progressed {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        let (best, command) = state.best.ok_or(PeelError::NothingToMinimize { exit_code: None })?;
        let counters = self.scheduler.counters();
        let stats = PeelStats {
            jobs_submitted: counters.submitted,
            jobs_launched: counters.launched,
            jobs_terminated: counters.terminated,
            jobs_canceled: counters.canceled,
            launch_failures: counters.launch_failures,
            jobs_present: state.jobs_present,
            initial_size: state.initial_size,
            final_size: best.size(),
            elapsed_secs: state.started.elapsed().as_secs_f64(),
        };
        tracing::info!(
            initial = stats.initial_size,
            final_size = stats.final_size,
            files = best.inputs().len(),
            jobs = stats.jobs_terminated,
            canceled = stats.jobs_canceled,
            "peel finished"
        );
        Ok(PeelOutcome {
            best,
            command,
            stats,
        })
    }

    async fn handle(&mut self, finished: Finished, present: bool, state: &mut RunState) {
        let Finished { id, plan, output } = finished;
        tracing::debug!(
            job = id,
            kind = plan.kind.name(),
            size = plan.size(),
            exit_code = ?output.exit_code,
            present,
            "job finished"
        );

        // Present: the subsumed siblings are moot. Absent: so are its children.
        let doomed = if present {
            self.links(id, |job| &job.subsumes)
        } else {
            self.links(id, |job| &job.children)
        };
        for &other in &doomed {
            self.scheduler.cancel(other).await;
        }

        if present {
            state.jobs_present += 1;
            let improves = state
                .best
                .as_ref()
                .map_or(true, |(best, _)| plan.size() < best.size());
            if improves {
                tracing::info!(job = id, size = plan.size(), "new smallest input set");
                state.best = Some((plan.content.clone(), plan.command.clone()));
                self.report_progress(id, state);
            }
        }

        let next = plan.next_jobs(present);
        if !next.is_empty() {
            self.scheduler.submit_children(id, next);
        }

        for other in doomed {
            self.scheduler.release(other);
        }
        self.scheduler.release(id);
    }

    fn links(&self, id: JobId, pick: impl Fn(&Job) -> &Vec<JobId>) -> Vec<JobId> {
        self.scheduler
            .job(id)
            .map(|job| pick(job).clone())
            .unwrap_or_default()
    }

    fn report_progress(&self, id: JobId, state: &RunState) {
        let (Some(tx), Some((best, _))) = (&self.progress_tx, &state.best) else {
            return;
        };
        let _ = tx.try_send(PeelProgress {
            job: id,
            best_size: best.size(),
            initial_size: state.initial_size,
            files: best.inputs().len(),
            jobs_terminated: self.scheduler.counters().terminated,
            elapsed_secs: state.started.elapsed().as_secs_f64(),
        });
    }
}
