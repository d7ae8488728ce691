use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::*;
use crate::content::InputFile;
use crate::fragments::{ByteRangeRecord, FragmentList, Mask, MaskPhase};

fn input(name: &str, len: u64) -> InputFile {
    let source: Arc<Path> = Arc::from(Path::new(name));
    InputFile {
        path: PathBuf::from(name),
        fragments: FragmentList::new(
            ByteRangeRecord::with_len("h", 0, len, source)
                .into_iter()
                .collect(),
        ),
    }
}

fn content(files: &[(&str, u64)]) -> ExperimentContent {
    ExperimentContent::new(
        files.iter().map(|(n, l)| input(n, *l)).collect(),
        Vec::new(),
    )
}

fn paths(c: &ExperimentContent) -> Vec<&Path> {
    c.inputs().iter().map(|i| i.path.as_path()).collect()
}

const CMD: &str = "tool /d/a.fa /d/b.fa /d/c.fa";

fn three_files() -> JobPlan {
    JobPlan::complete(
        content(&[("/d/a.fa", 5), ("/d/b.fa", 20), ("/d/c.fa", 9)]),
        CMD,
    )
}

#[test]
fn complete_absent_has_no_children() {
    assert!(three_files().next_jobs(false).is_empty());
}

#[test]
fn complete_present_deletes_largest_file_first() {
    let children = three_files().next_jobs(true);
    assert_eq!(children.len(), 3);

    let removed_order: Vec<_> = children
        .iter()
        .map(|c| match &c.plan.kind {
            JobKind::FileDeletion { index, base, .. } => {
                base.inputs()[*index].path.display().to_string()
            }
            other => panic!("unexpected kind {other:?}"),
        })
        .collect();
    assert_eq!(removed_order, vec!["/d/b.fa", "/d/c.fa", "/d/a.fa"]);

    assert_eq!(children[0].subsumes, vec![1, 2]);
    assert_eq!(children[1].subsumes, vec![2]);
    assert!(children[2].subsumes.is_empty());

    assert_eq!(children[0].plan.command, "tool /d/a.fa /d/c.fa");
    assert_eq!(
        paths(&children[0].plan.content),
        vec![Path::new("/d/c.fa"), Path::new("/d/a.fa")]
    );
    assert_eq!(children[2].plan.size(), 29);
}

#[test]
fn complete_single_file_goes_to_mask() {
    let plan = JobPlan::complete(content(&[("/d/a.fa", 7)]), "cat /d/a.fa");
    let children = plan.next_jobs(true);
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].plan.kind, JobKind::Mask);
    assert_eq!(children[0].plan.content, plan.content);
    assert_eq!(children[0].plan.command, "cat /d/a.fa");
}

#[test]
fn file_deletion_absent_waits_for_sibling() {
    let children = three_files().next_jobs(true);
    assert!(children[0].plan.next_jobs(false).is_empty());
    assert!(children[1].plan.next_jobs(false).is_empty());
}

#[test]
fn last_file_deletion_absent_reduces_base() {
    let children = three_files().next_jobs(true);
    let next = children[2].plan.next_jobs(false);
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].plan.kind, JobKind::Mask);
    assert_eq!(next[0].plan.size(), 34);
    assert_eq!(next[0].plan.command, CMD);
    assert_eq!(
        paths(&next[0].plan.content),
        vec![Path::new("/d/b.fa"), Path::new("/d/c.fa"), Path::new("/d/a.fa")]
    );
}

#[test]
fn file_deletion_present_continues_on_survivors() {
    let children = three_files().next_jobs(true);
    // b.fa removed: survivors [c, a], chain restarts at index 0.
    let next = children[0].plan.next_jobs(true);
    assert_eq!(next.len(), 2);
    assert_eq!(next[0].subsumes, vec![1]);
    assert_eq!(next[0].plan.command, "tool /d/a.fa");
    assert_eq!(paths(&next[0].plan.content), vec![Path::new("/d/a.fa")]);
    assert_eq!(next[1].plan.command, "tool /d/c.fa");

    // c.fa removed (index 1 of [b, c, a]): only index 1 of [b, a] remains.
    let next = children[1].plan.next_jobs(true);
    assert_eq!(next.len(), 1);
    assert_eq!(paths(&next[0].plan.content), vec![Path::new("/d/b.fa")]);
}

#[test]
fn file_deletion_present_at_end_goes_to_mask() {
    let children = three_files().next_jobs(true);
    let next = children[2].plan.next_jobs(true);
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].plan.kind, JobKind::Mask);
    assert_eq!(
        paths(&next[0].plan.content),
        vec![Path::new("/d/b.fa"), Path::new("/d/c.fa")]
    );
    assert_eq!(next[0].plan.command, "tool /d/b.fa /d/c.fa");
}

fn mask_plan(c: ExperimentContent) -> JobPlan {
    JobPlan {
        kind: JobKind::Mask,
        content: c,
        command: "cmd".into(),
    }
}

#[test]
fn mask_dichotomy_yields_halves_and_peels() {
    let plan = mask_plan(content(&[("/d/a.fa", 4), ("/d/b.fa", 23)]));
    let children = plan.next_jobs(true);
    assert_eq!(children.len(), 4);
    assert_eq!(children[0].subsumes, vec![1, 2, 3]);
    assert_eq!(children[1].subsumes, vec![0, 2, 3]);
    assert_eq!(children[2].subsumes, vec![3]);
    assert!(children[3].subsumes.is_empty());

    // Largest mask is b.fa's [0, 22]; a.fa is untouched everywhere.
    for c in &children {
        assert_eq!(c.plan.content.inputs()[0], plan.content.inputs()[0]);
    }
    let sizes: Vec<u64> = children
        .iter()
        .map(|c| c.plan.content.inputs()[1].size())
        .collect();
    // Halves 11 and 12; peel pair on the right peel [11, 22]: 17 or 23.
    assert_eq!(sizes, vec![11, 12, 17, 23]);
    assert_eq!(
        children[3].plan.content.inputs()[1].fragments.masks(),
        &[
            Mask::new(0, 10, MaskPhase::LeftPeel),
            Mask::new(17, 22, MaskPhase::RightPeel),
        ]
    );
}

#[test]
fn mask_peel_yields_success_and_error() {
    let c = content(&[("/d/a.fa", 10)]);
    let peeled = c.with_fragments(
        0,
        c.inputs()[0].fragments.dichotomy_to_peel(c.inputs()[0].fragments.masks()[0]),
    );
    let children = mask_plan(peeled).next_jobs(true);
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].subsumes, vec![1]);
    // Left peel [0, 4] wins the tie with right peel [5, 9].
    assert_eq!(children[0].plan.size(), 8);
    assert_eq!(children[1].plan.size(), 10);
}

#[test]
fn mask_with_nothing_left_stops() {
    let c = content(&[("/d/a.fa", 10)]);
    let settled = c.with_fragments(0, c.inputs()[0].fragments.with_masks(Vec::new()));
    assert!(mask_plan(settled).next_jobs(true).is_empty());

    let empty = ExperimentContent::new(Vec::new(), Vec::new());
    assert!(mask_plan(empty).next_jobs(true).is_empty());
    assert!(mask_plan(c).next_jobs(false).is_empty());
}

#[test]
fn unimplemented_never_expands() {
    let plan = JobPlan {
        kind: JobKind::Unimplemented("sequence_deletion"),
        content: content(&[("/d/a.fa", 3)]),
        command: "cmd".into(),
    };
    assert!(plan.next_jobs(true).is_empty());
    assert_eq!(plan.kind.name(), "sequence_deletion");
}

#[test]
fn status_names() {
    assert_eq!(JobStatus::NotReady.as_str(), "not_ready");
    assert_eq!(JobStatus::Canceled.as_str(), "canceled");
}
