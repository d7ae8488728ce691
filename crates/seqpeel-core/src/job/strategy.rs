//! Expansion rules: which candidates to try after a job finished.
//!
//! Files are removed one at a time first (largest first), then the
//! surviving files are reduced by their largest mask, bisecting while a half
//! keeps the behaviour and peeling from both ends once neither does.

use super::{ChildJob, JobKind, JobPlan};
use crate::command::remove_path_tokens;
use crate::content::ExperimentContent;
use crate::fragments::{FragmentList, MaskPhase};

impl JobPlan {
    /// Children to submit given whether this job reproduced the behaviour.
    pub fn next_jobs(&self, present: bool) -> Vec<ChildJob> {
        match &self.kind {
            JobKind::Complete => self.expand_complete(present),
            JobKind::FileDeletion {
                index,
                base,
                base_command,
            } => self.expand_file_deletion(present, *index, base, base_command),
            JobKind::Mask => self.expand_mask(present),
            JobKind::Unimplemented(name) => {
                tracing::warn!(strategy = *name, "no expansion rule, stopping this branch");
                Vec::new()
            }
        }
    }

    fn expand_complete(&self, present: bool) -> Vec<ChildJob> {
        if !present {
            return Vec::new();
        }
        if self.content.inputs().len() > 1 {
            let sorted = self.content.sorted_by_size_desc();
            file_deletion_chain(&sorted, &self.command, 0)
        } else {
            vec![mask_job(self.content.clone(), &self.command)]
        }
    }

    fn expand_file_deletion(
        &self,
        present: bool,
        index: usize,
        base: &ExperimentContent,
        base_command: &str,
    ) -> Vec<ChildJob> {
        if present {
            if index < self.content.inputs().len() {
                file_deletion_chain(&self.content, &self.command, index)
            } else {
                vec![mask_job(self.content.clone(), &self.command)]
            }
        } else if index + 1 == base.inputs().len() {
            // Every deletion from `base` failed from here on: reduce contents instead.
            vec![mask_job(base.clone(), base_command)]
        } else {
            Vec::new()
        }
    }

    fn expand_mask(&self, present: bool) -> Vec<ChildJob> {
        if !present {
            return Vec::new();
        }
        let Some((file, mask)) = self.content.largest_mask() else {
            return Vec::new();
        };
        let list = &self.content.inputs()[file].fragments;
        let child = |fragments: FragmentList, subsumes: &[usize]| ChildJob {
            plan: JobPlan {
                kind: JobKind::Mask,
                content: self.content.with_fragments(file, fragments),
                command: self.command.clone(),
            },
            subsumes: subsumes.to_vec(),
        };

        if mask.phase == MaskPhase::Dichotomy && mask.size() >= 2 {
            let (left, right) = list.split_dichotomy(mask);
            let (peel_success, peel_error) = list.split_peel(mask);
            vec![
                child(left, &[1, 2, 3]),
                child(right, &[0, 2, 3]),
                child(peel_success, &[3]),
                child(peel_error, &[]),
            ]
        } else {
            let (success, error) = list.split_peel(mask);
            vec![child(success, &[1]), child(error, &[])]
        }
    }
}

fn mask_job(content: ExperimentContent, command: &str) -> ChildJob {
    ChildJob {
        plan: JobPlan {
            kind: JobKind::Mask,
            content,
            command: command.to_string(),
        },
        subsumes: Vec::new(),
    }
}

/// One deletion job per input from `from` on; each subsumes the later ones.
fn file_deletion_chain(base: &ExperimentContent, command: &str, from: usize) -> Vec<ChildJob> {
    let count = base.inputs().len().saturating_sub(from);
    (from..base.inputs().len())
        .enumerate()
        .filter_map(|(position, index)| {
            let (content, removed) = base.without_input(index)?;
            Some(ChildJob {
                plan: JobPlan {
                    kind: JobKind::FileDeletion {
                        index,
                        base: Box::new(base.clone()),
                        base_command: command.to_string(),
                    },
                    content,
                    command: remove_path_tokens(command, removed),
                },
                subsumes: (position + 1..count).collect(),
            })
        })
        .collect()
}
