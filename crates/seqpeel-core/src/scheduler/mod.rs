//! Speculative job scheduler.
//!
//! Jobs move between four disjoint sets: waiting (FIFO), running (bounded by
//! `max_running`, polled in start order), terminated (FIFO, drained by the
//! driver) and canceled. The scheduler never blocks on a job: `tick` only
//! collects jobs whose task already finished.

mod launch;


use std::collections::{HashMap, HashSet, VecDeque};

pub use launch::{Launcher, RunHandle, RunOutput};

use crate::job::{ChildJob, Job, JobId, JobPlan, JobStatus};

/// A terminated job handed to the driver, with its plan moved out.
#[derive(Debug)]
pub struct Finished {
    pub id: JobId,
    pub plan: JobPlan,
    pub output: RunOutput,
}

/// Lifetime counters of a scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerCounters {
    pub submitted: u64,
    pub launched: u64,
    pub launch_failures: u64,
    pub terminated: u64,
    pub canceled: u64,
}

pub struct Scheduler<L: Launcher> {
    launcher: L,
    jobs: HashMap<JobId, Job>,
    waiting: VecDeque<JobId>,
    running: Vec<(JobId, RunHandle)>,
    terminated: VecDeque<(JobId, RunOutput)>,
    canceled: HashSet<JobId>,
    next_id: JobId,
    max_running: usize,
    counters: SchedulerCounters,
}

impl<L: Launcher> Scheduler<L> {
    pub fn new(launcher: L, max_running: usize) -> Self {
        Self {
            launcher,
            jobs: HashMap::new(),
            waiting: VecDeque::new(),
            running: Vec::new(),
            terminated: VecDeque::new(),
            canceled: HashSet::new(),
            next_id: 0,
            max_running: max_running.max(1),
            counters: SchedulerCounters::default(),
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn counters(&self) -> SchedulerCounters {
        self.counters
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.jobs.get(&id).map(|j| j.status)
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn running_len(&self) -> usize {
        self.running.len()
    }

    pub fn is_canceled(&self, id: JobId) -> bool {
        self.canceled.contains(&id)
    }

    /// Jobs still held, settled or not.
    pub fn tracked_len(&self) -> usize {
        self.jobs.len()
    }

    /// True when nothing is waiting, running or left to drain.
    pub fn is_idle(&self) -> bool {
        self.waiting.is_empty() && self.running.is_empty() && self.terminated.is_empty()
    }

    /// Queues a job with no parent.
    pub fn submit_root(&mut self, plan: JobPlan) -> JobId {
        self.enqueue(None, plan)
    }

    /// Queues the children of `parent`, translating their sibling
    /// subsumption indices into job ids. Returns the new ids in order.
    pub fn submit_children(&mut self, parent: JobId, children: Vec<ChildJob>) -> Vec<JobId> {
        let mut ids = Vec::with_capacity(children.len());
        let mut sibling_links = Vec::with_capacity(children.len());
        for child in children {
            ids.push(self.enqueue(Some(parent), child.plan));
            sibling_links.push(child.subsumes);
        }
        for (id, links) in ids.iter().zip(sibling_links) {
            let subsumes: Vec<JobId> = links.iter().filter_map(|&i| ids.get(i).copied()).collect();
            if let Some(job) = self.jobs.get_mut(id) {
                job.subsumes = subsumes;
            }
        }
        if let Some(parent) = self.jobs.get_mut(&parent) {
            parent.children.extend(ids.iter().copied());
        }
        ids
    }

    fn enqueue(&mut self, parent: Option<JobId>, plan: JobPlan) -> JobId {
        let id = self.next_id;
        self.next_id += 1;
        tracing::debug!(
            job = id,
            parent = ?parent,
            kind = plan.kind.name(),
            size = plan.size(),
            "job submitted"
        );
        self.jobs.insert(id, Job::new(id, parent, plan));
        self.waiting.push_back(id);
        self.counters.submitted += 1;
        id
    }

    fn set_status(&mut self, id: JobId, status: JobStatus) {
        if let Some(job) = self.jobs.get_mut(&id) {
            job.status = status;
        }
    }

    fn mark_terminated(&mut self, id: JobId, output: RunOutput) {
        tracing::debug!(
            job = id,
            exit_code = ?output.exit_code,
            timed_out = output.timed_out,
            "job terminated"
        );
        self.set_status(id, JobStatus::Terminated);
        self.terminated.push_back((id, output));
        self.counters.terminated += 1;
    }

    /// Collects finished jobs, then starts waiting ones while slots are free.
    /// Returns whether anything changed.
    pub async fn tick(&mut self) -> bool {
        let mut progressed = false;

        let mut index = 0;
        while index < self.running.len() {
            if self.running[index].1.is_finished() {
                let (id, handle) = self.running.remove(index);
                let output = handle.finish().await;
                self.mark_terminated(id, output);
                progressed = true;
            } else {
                index += 1;
            }
        }

        while self.running.len() < self.max_running {
            let Some(id) = self.waiting.pop_front() else {
                break;
            };
            self.launch(id);
            progressed = true;
        }

        progressed
    }

    fn launch(&mut self, id: JobId) {
        let Some(plan) = self.jobs.get(&id).and_then(Job::plan) else {
            return;
        };
        let started = match self.launcher.prepare(id, plan) {
            Ok(prepared) => {
                self.set_status(id, JobStatus::Ready);
                self.launcher.start(prepared)
            }
            Err(e) => Err(e),
        };
        match started {
            Ok(handle) => {
                tracing::debug!(job = id, "job started");
                self.set_status(id, JobStatus::Running);
                self.running.push((id, handle));
                self.counters.launched += 1;
            }
            Err(e) => {
                tracing::warn!(job = id, error = %format!("{e:#}"), "job launch failed");
                self.counters.launch_failures += 1;
                self.mark_terminated(id, RunOutput::launch_failure(format!("{e:#}")));
            }
        }
    }

    /// Next terminated job in completion order. Its plan is moved out of the
    /// scheduler; jobs canceled after terminating are skipped.
    pub fn next_finished(&mut self) -> Option<Finished> {
        while let Some((id, output)) = self.terminated.pop_front() {
            let Some(plan) = self.jobs.get_mut(&id).and_then(|j| j.plan.take()) else {
                continue;
            };
            return Some(Finished { id, plan, output });
        }
        None
    }

    /// Cancels `id` and, recursively, all of its descendants. Running jobs are
    /// killed and awaited; waiting and undrained terminated jobs are dropped.
    /// Jobs the driver already drained keep their status. Idempotent.
    pub async fn cancel(&mut self, id: JobId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(job) = self.jobs.get(&id) else {
                continue;
            };
            let status = job.status;
            if status == JobStatus::Canceled {
                continue;
            }
            stack.extend(job.children.iter().copied());

            let canceled = match status {
                JobStatus::NotReady | JobStatus::Ready => {
                    self.waiting.retain(|&w| w != id);
                    true
                }
                JobStatus::Running => {
                    if let Some(pos) = self.running.iter().position(|(r, _)| *r == id) {
                        let (_, handle) = self.running.remove(pos);
                        handle.abort().await;
                    }
                    true
                }
                JobStatus::Terminated => {
                    let before = self.terminated.len();
                    self.terminated.retain(|(t, _)| *t != id);
                    before != self.terminated.len()
                }
                JobStatus::Canceled => false,
            };

            if canceled {
                tracing::debug!(job = id, was = status.as_str(), "job canceled");
                self.set_status(id, JobStatus::Canceled);
                if let Some(job) = self.jobs.get_mut(&id) {
                    job.plan = None;
                }
                self.canceled.insert(id);
                self.counters.canceled += 1;
            }
        }
    }

    /// Forgets `id`, its descendants and then its ancestors, bottom-up, as
    /// long as each one is settled: canceled, or terminated and already
    /// drained, with no remaining children. A job with a live descendant is
    /// kept since cancellation still has to reach through it.
    pub fn release(&mut self, id: JobId) {
        let parent = self.jobs.get(&id).and_then(|j| j.parent);

        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(job) = self.jobs.get(&id) {
                order.push(id);
                stack.extend(job.children.iter().copied());
            }
        }
        // Children come after their parent in `order`.
        let mut released = true;
        for id in order.into_iter().rev() {
            released = self.forget_if_settled(id);
        }
        if !released {
            return;
        }

        let mut next = parent;
        while let Some(id) = next {
            next = self.jobs.get(&id).and_then(|j| j.parent);
            if !self.forget_if_settled(id) {
                break;
            }
        }
    }

    fn forget_if_settled(&mut self, id: JobId) -> bool {
        let Some(job) = self.jobs.get(&id) else {
            return true;
        };
        let settled = match job.status {
            JobStatus::Canceled => true,
            JobStatus::Terminated => job.plan.is_none(),
            _ => false,
        };
        if !settled || job.children.iter().any(|c| self.jobs.contains_key(c)) {
            return false;
        }
        self.jobs.remove(&id);
        self.canceled.remove(&id);
        tracing::trace!(job = id, "job released");
        true
    }
}
