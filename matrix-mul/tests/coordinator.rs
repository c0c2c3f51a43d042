use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use matrix_mul::{
    Coordinator, Error, Inputs, Launcher, State, ThreadLauncher, WorkerStatus, io, reference,
};
use shm_matmul_types::{Matrix, WorkerArgs};
use tempfile::TempDir;

fn write_inputs(dir: &Path, a: &str, b: &str) -> (PathBuf, PathBuf) {
    let (pa, pb) = (dir.join("a.txt"), dir.join("b.txt"));
    std::fs::write(&pa, a).unwrap();
    std::fs::write(&pb, b).unwrap();
    (pa, pb)
}

/// Deterministic, non-trivial values so rounding differences would show.
fn generated(rows: usize, cols: usize, seed: f64) -> Matrix {
    let data = (0..rows * cols)
        .map(|i| ((i as f64 + seed) * 0.7310585786).sin() * 1e3 / (i as f64 + 1.5))
        .collect();
    Matrix::from_vec(rows, cols, data).unwrap()
}

fn scratch() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let buffer = dir.path().join("shm.dat");
    (dir, buffer)
}

#[tokio::test]
async fn two_by_two_with_two_workers() {
    let (dir, buffer) = scratch();
    let (a, b) = write_inputs(dir.path(), "1 2\n3 4\n", "5 6\n7 8\n");

    let mut coordinator = Coordinator::new(ThreadLauncher, 2, &buffer);
    let run = coordinator.multiply(&a, &b).await.unwrap();

    assert_eq!(run.result.to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
    assert_eq!(run.outcomes.len(), 2);
    assert_eq!(coordinator.state(), State::Done);
    assert!(!buffer.exists());
}

#[tokio::test]
async fn more_workers_than_rows() {
    let (dir, buffer) = scratch();
    let (a, b) = write_inputs(dir.path(), "5\n", "3\n");

    let mut coordinator = Coordinator::new(ThreadLauncher, 4, &buffer);
    let run = coordinator.multiply(&a, &b).await.unwrap();

    assert_eq!(run.result.to_rows(), vec![vec![15.0]]);
    assert_eq!(run.ownership.len(), 4);
    assert_eq!(run.outcomes.len(), 1);
    assert_eq!(run.ownership.owner_of(0), Some(0));
}

#[tokio::test]
async fn parallel_matches_reference_bit_for_bit() {
    let (dir, buffer) = scratch();
    let a = generated(13, 9, 1.0);
    let b = generated(9, 11, 2.0);
    let (pa, pb) = (dir.path().join("a.txt"), dir.path().join("b.txt"));
    io::write_matrix(&pa, &a).unwrap();
    io::write_matrix(&pb, &b).unwrap();

    // Compare against the product of what workers will actually parse.
    let inputs = Inputs::load(&pa, &pb).unwrap();
    let expected = reference::multiply(&inputs.a, &inputs.b).unwrap();

    for workers in [1, 2, 3, 5, 13, 20] {
        let mut coordinator = Coordinator::new(ThreadLauncher, workers, &buffer);
        let run = coordinator.run(&inputs).await.unwrap();
        assert_eq!(
            run.result.first_difference(&expected),
            None,
            "workers = {workers}"
        );
    }
}

#[tokio::test]
async fn dimension_mismatch_fails_before_buffer_creation() {
    let (dir, buffer) = scratch();
    let (a, b) = write_inputs(dir.path(), "1 2 3\n", "1 2\n3 4\n");

    let mut coordinator = Coordinator::new(ThreadLauncher, 2, &buffer);
    let err = coordinator.multiply(&a, &b).await.unwrap_err();

    assert!(matches!(err, Error::DimensionMismatch(1, 3, 2, 2)));
    assert_eq!(coordinator.state(), State::Failed);
    assert!(!buffer.exists());
}

#[tokio::test]
async fn zero_workers_is_rejected_before_touching_the_buffer_path() {
    let (dir, buffer) = scratch();
    let (a, b) = write_inputs(dir.path(), "1\n", "1\n");
    std::fs::write(&buffer, "keep me").unwrap();

    let mut coordinator = Coordinator::new(ThreadLauncher, 0, &buffer);
    let err = coordinator.multiply(&a, &b).await.unwrap_err();

    assert!(matches!(err, Error::InvalidWorkerCount(0)));
    assert_eq!(coordinator.state(), State::Failed);
    assert_eq!(std::fs::read_to_string(&buffer).unwrap(), "keep me");
}

/// Fails one chosen worker and counts how many were launched.
struct FlakyLauncher {
    fail_worker_start: usize,
    launched: AtomicUsize,
}

#[async_trait]
impl Launcher for FlakyLauncher {
    async fn launch(&self, args: WorkerArgs, timeout: Option<Duration>) -> WorkerStatus {
        self.launched.fetch_add(1, Ordering::SeqCst);
        if args.range.start() == self.fail_worker_start {
            return WorkerStatus::Failed {
                code: Some(1),
                message: "exit status: 1".to_string(),
            };
        }
        ThreadLauncher.launch(args, timeout).await
    }
}

#[tokio::test]
async fn failed_worker_is_reported_after_all_are_joined() {
    let (dir, buffer) = scratch();
    let (a, b) = write_inputs(dir.path(), "1\n2\n3\n4\n", "1 1\n");

    let launcher = FlakyLauncher {
        fail_worker_start: 1,
        launched: AtomicUsize::new(0),
    };
    let mut coordinator = Coordinator::new(launcher, 4, &buffer);
    let err = coordinator.multiply(&a, &b).await.unwrap_err();

    match err {
        Error::WorkerFailures { failed, launched } => {
            assert_eq!(launched, 4);
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].worker, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(coordinator.state(), State::Failed);
    assert!(!buffer.exists());
}

/// Never finishes within any reasonable timeout.
struct StuckLauncher;

#[async_trait]
impl Launcher for StuckLauncher {
    async fn launch(&self, _args: WorkerArgs, timeout: Option<Duration>) -> WorkerStatus {
        let sleep = tokio::time::sleep(Duration::from_secs(3600));
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, sleep).await {
                Ok(()) => WorkerStatus::Succeeded,
                Err(_) => WorkerStatus::TimedOut,
            },
            None => {
                sleep.await;
                WorkerStatus::Succeeded
            }
        }
    }
}

#[tokio::test]
async fn timed_out_workers_fail_the_run() {
    let (dir, buffer) = scratch();
    let (a, b) = write_inputs(dir.path(), "1\n2\n", "3\n");

    let mut coordinator = Coordinator::new(StuckLauncher, 2, &buffer)
        .with_worker_timeout(Some(Duration::from_millis(50)));
    let err = coordinator.multiply(&a, &b).await.unwrap_err();

    match err {
        Error::WorkerFailures { failed, .. } => {
            assert_eq!(failed.len(), 2);
            assert!(failed.iter().all(|o| o.status == WorkerStatus::TimedOut));
        }
        other => panic!("unexpected error: {other}"),
    }
}
