//! Jobs: one candidate input set, the command to run on it, and the rule
//! that decides which candidates to try once its outcome is known.

mod strategy;

#[cfg(test)]
mod tests;

use crate::content::ExperimentContent;

/// Job identifier, allocated by the scheduler in submission order.
pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Submitted, waiting for a free slot.
    NotReady,
    /// Sandbox prepared, process not started yet.
    Ready,
    Running,
    Terminated,
    Canceled,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::NotReady => "not_ready",
            JobStatus::Ready => "ready",
            JobStatus::Running => "running",
            JobStatus::Terminated => "terminated",
            JobStatus::Canceled => "canceled",
        }
    }
}

/// Reduction strategy of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    /// Root job on the unmodified inputs.
    Complete,
    /// Runs `base` without its input `index`.
    FileDeletion {
        index: usize,
        base: Box<ExperimentContent>,
        base_command: String,
    },
    /// Reduces the content of one file under its largest mask.
    Mask,
    /// Placeholder for a strategy that has no expansion rule; never expands.
    Unimplemented(&'static str),
}

impl JobKind {
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Complete => "complete",
            JobKind::FileDeletion { .. } => "file_deletion",
            JobKind::Mask => "mask",
            JobKind::Unimplemented(name) => *name,
        }
    }
}

/// What a job runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPlan {
    pub kind: JobKind,
    pub content: ExperimentContent,
    pub command: String,
}

impl JobPlan {
    /// The root job: the complete inputs with the user command.
    pub fn complete(content: ExperimentContent, command: impl Into<String>) -> Self {
        Self {
            kind: JobKind::Complete,
            content,
            command: command.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.size()
    }
}

/// A job to submit after its parent finished. `subsumes` holds indices of
/// later siblings in the same batch that become pointless if this one
/// reproduces the behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildJob {
    pub plan: JobPlan,
    pub subsumes: Vec<usize>,
}

/// A job as tracked by the scheduler. The plan is released once the job
/// finished and was handed to the driver; the graph links stay until its
/// whole subtree is settled and [`Scheduler::release`](crate::scheduler::Scheduler::release) drops it.
#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub parent: Option<JobId>,
    pub children: Vec<JobId>,
    pub subsumes: Vec<JobId>,
    pub(crate) plan: Option<JobPlan>,
}

impl Job {
    pub(crate) fn new(id: JobId, parent: Option<JobId>, plan: JobPlan) -> Self {
        Self {
            id,
            status: JobStatus::NotReady,
            parent,
            children: Vec::new(),
            subsumes: Vec::new(),
            plan: Some(plan),
        }
    }

    pub fn plan(&self) -> Option<&JobPlan> {
        self.plan.as_ref()
    }
}
