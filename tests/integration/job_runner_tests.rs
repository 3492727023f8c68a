//! Job runner over file locks

use crate::common::lock_dir;
use curator_rs::{CuratorError, ExclusiveLock, JobOutcome, JobRunner};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

fn runner(dir: &std::path::Path) -> JobRunner {
    JobRunner::new(ExclusiveLock::file(dir).with_poll_interval(Duration::from_millis(10)))
}

#[tokio::test]
async fn test_overlapping_runs_execute_the_job_once() {
    let (_guard, dir) = lock_dir();
    let first = runner(&dir);
    let second = runner(&dir);
    let executions = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(Notify::new());
    let finish = Arc::new(Notify::new());

    let long_run = {
        let executions = executions.clone();
        let started = started.clone();
        let finish = finish.clone();
        tokio::spawn(async move {
            first
                .run("enrich", Duration::from_secs(5), &CancellationToken::new(), || async {
                    executions.fetch_add(1, Ordering::SeqCst);
                    started.notify_one();
                    finish.notified().await;
                    Ok("first")
                })
                .await
        })
    };
    started.notified().await;

    let outcome = second
        .run("enrich", Duration::from_millis(100), &CancellationToken::new(), || async {
            executions.fetch_add(1, Ordering::SeqCst);
            Ok("second")
        })
        .await
        .unwrap();
    assert_eq!(outcome, JobOutcome::AlreadyRunning);

    finish.notify_one();
    assert_eq!(long_run.await.unwrap().unwrap(), JobOutcome::Completed("first"));
    assert_eq!(executions.load(Ordering::SeqCst), 1);
    assert!(!dir.join("enrich.lock").exists());
}

#[tokio::test]
async fn test_failed_job_leaves_no_lock_behind() {
    let (_guard, dir) = lock_dir();
    let runner = runner(&dir);

    let err = runner
        .run("enrich", Duration::from_millis(50), &CancellationToken::new(), || async {
            Err::<(), _>(CuratorError::parsing("bad payload"))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CuratorError::Parsing(_)));
    assert!(!dir.join("enrich.lock").exists());
    let again = runner
        .run("enrich", Duration::from_millis(50), &CancellationToken::new(), || async { Ok(1) })
        .await
        .unwrap();
    assert!(again.is_completed());
}

#[tokio::test]
async fn test_cancelled_lock_wait_does_not_run_job() {
    let (_guard, dir) = lock_dir();
    let holder = ExclusiveLock::file(&dir);
    assert!(holder.try_acquire("enrich", Duration::from_secs(60)).await.unwrap());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = runner(&dir)
        .run("enrich", Duration::from_secs(60), &cancel, || async { Ok(()) })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(holder.is_locked("enrich").unwrap());
}
