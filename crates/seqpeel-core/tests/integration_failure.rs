//! End-to-end runs that cannot be minimized or whose commands hang.

#![cfg(unix)]

mod common;

use common::{config, exit_code, Workspace};
use seqpeel_core::config::PeelConfig;
use seqpeel_core::content::ExperimentContent;
use seqpeel_core::error::PeelError;
use seqpeel_core::job::JobPlan;
use seqpeel_core::sandbox::Sandbox;
use seqpeel_core::scheduler::Launcher;
use std::time::{Duration, Instant};

#[tokio::test]
async fn missing_behaviour_is_nothing_to_minimize() {
    let ws = Workspace::new();
    ws.write("a.fa", ">a\nACGT\n");

    let err = ws
        .peel(&["a.fa"], &[], "grep -q TTTT a.fa", exit_code(0), config(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PeelError>(),
        Some(PeelError::NothingToMinimize { exit_code: Some(1) })
    ));
}

#[tokio::test]
async fn timed_out_root_counts_as_absent() {
    let ws = Workspace::new();
    ws.write("a.fa", ">a\nACGT\n");
    let cfg = PeelConfig {
        job_timeout_secs: Some(1),
        ..config(1)
    };

    let started = Instant::now();
    let err = ws
        .peel(&["a.fa"], &[], "sleep 30; cat a.fa", exit_code(0), cfg)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PeelError>(),
        Some(PeelError::NothingToMinimize { exit_code: None })
    ));
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[tokio::test]
async fn aborted_run_kills_command_and_removes_directory() {
    let ws = Workspace::new();
    let input = ws.write("a.fa", ">a\nACGT\n");
    let content = ExperimentContent::load(&[input.clone()], Vec::new()).unwrap();
    let plan = JobPlan::complete(content, format!("sleep 30 & sleep 30; cat {}", input.display()));

    let mut sandbox = Sandbox::new(ws.results(), &config(1), false);
    let prepared = sandbox.prepare(0, &plan).unwrap();
    let dir = prepared.dir.path().to_path_buf();
    let handle = sandbox.start(prepared).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished());

    let started = Instant::now();
    handle.abort().await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!dir.exists());
}
