#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use matrix_mul::{Launcher, ProcessLauncher, ThreadLauncher, WorkerStatus};
use shm_matmul_types::{RowRange, WorkerArgs};

fn worker_args(dir: &Path, matrix_a: PathBuf) -> WorkerArgs {
    WorkerArgs {
        range: RowRange::new(0, 1).unwrap(),
        buffer: dir.join("shm.dat"),
        cols: 1,
        matrix_a,
        matrix_b: dir.join("b.txt"),
    }
}

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn process_launcher_kills_worker_after_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let program = script(dir.path(), "hang.sh", "exec sleep 30");
    let args = worker_args(dir.path(), dir.path().join("a.txt"));

    let started = Instant::now();
    let status = ProcessLauncher::new(program)
        .launch(args, Some(Duration::from_millis(200)))
        .await;

    assert_eq!(status, WorkerStatus::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn process_launcher_reports_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let program = script(dir.path(), "fail.sh", "exit 3");
    let args = worker_args(dir.path(), dir.path().join("a.txt"));

    let status = ProcessLauncher::new(program)
        .launch(args, Some(Duration::from_secs(30)))
        .await;

    assert!(matches!(status, WorkerStatus::Failed { code: Some(3), .. }));
}

#[tokio::test]
async fn process_launcher_reports_missing_program() {
    let dir = tempfile::tempdir().unwrap();
    let args = worker_args(dir.path(), dir.path().join("a.txt"));

    let status = ProcessLauncher::new(dir.path().join("no-such-binary"))
        .launch(args, None)
        .await;

    assert!(matches!(status, WorkerStatus::LaunchFailed(_)));
}

#[tokio::test]
async fn thread_launcher_abandons_blocked_worker_after_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("a.fifo");
    let made = std::process::Command::new("mkfifo")
        .arg(&fifo)
        .status()
        .unwrap();
    assert!(made.success());

    // Reading A blocks until something opens the fifo for writing.
    let args = worker_args(dir.path(), fifo.clone());
    let status = ThreadLauncher
        .launch(args, Some(Duration::from_millis(200)))
        .await;
    assert_eq!(status, WorkerStatus::TimedOut);

    // Unblock the abandoned worker so the runtime can shut down.
    drop(std::fs::OpenOptions::new().write(true).open(&fifo).unwrap());
}
