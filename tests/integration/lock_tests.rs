//! File locks shared by independent handles, as separate processes would be

use crate::common::lock_dir;
use curator_rs::{CuratorError, ExclusiveLock};
use std::fs;
use std::time::{Duration, SystemTime};

fn handle(dir: &std::path::Path) -> ExclusiveLock {
    ExclusiveLock::file(dir).with_poll_interval(Duration::from_millis(10))
}

#[tokio::test]
async fn test_independent_handles_exclude_each_other() {
    let (_guard, dir) = lock_dir();
    let first = handle(&dir);
    let second = handle(&dir);

    assert!(first.try_acquire("enrich", Duration::from_secs(5)).await.unwrap());
    assert!(!second.try_acquire("enrich", Duration::from_millis(50)).await.unwrap());
    assert!(second.is_locked("enrich").unwrap());

    first.release("enrich").unwrap();
    assert!(second.try_acquire("enrich", Duration::from_millis(50)).await.unwrap());
}

#[tokio::test]
async fn test_unlock_from_another_handle_frees_the_job() {
    let (_guard, dir) = lock_dir();
    let crashed = handle(&dir);
    assert!(crashed.try_acquire("enrich", Duration::from_secs(5)).await.unwrap());

    // what `curator unlock enrich` does
    let operator = handle(&dir);
    operator.release("enrich").unwrap();

    assert!(!dir.join("enrich.lock").exists());
    assert!(operator.try_acquire("enrich", Duration::from_millis(50)).await.unwrap());
}

#[tokio::test]
async fn test_lock_left_by_crashed_process_is_reclaimed() {
    let (_guard, dir) = lock_dir();
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("enrich.lock");
    fs::write(&path, "1700000000\n4242\n").unwrap();
    fs::OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(600))
        .unwrap();

    let lock = handle(&dir);
    assert_eq!(lock.holder("enrich").unwrap().unwrap().pid, Some(4242));

    // 600s old against a 2 x 60s staleness threshold
    assert!(lock.try_acquire("enrich", Duration::from_secs(60)).await.unwrap());
    assert_eq!(
        lock.holder("enrich").unwrap().unwrap().pid,
        Some(std::process::id())
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_lock_permissions_are_private() {
    use std::os::unix::fs::PermissionsExt;

    let (_guard, dir) = lock_dir();
    let lock = handle(&dir);
    assert!(lock.try_acquire("enrich", Duration::from_millis(50)).await.unwrap());

    let dir_mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
    let file_mode = fs::metadata(dir.join("enrich.lock")).unwrap().permissions().mode() & 0o777;
    assert_eq!(dir_mode, 0o700);
    assert_eq!(file_mode, 0o600);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_lock_path_is_an_error() {
    let (guard, dir) = lock_dir();
    fs::create_dir_all(&dir).unwrap();
    let target = guard.path().join("elsewhere");
    fs::write(&target, "").unwrap();
    std::os::unix::fs::symlink(&target, dir.join("enrich.lock")).unwrap();

    let err = handle(&dir)
        .try_acquire("enrich", Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, CuratorError::Lock(_)));
}
