//! Filesystem-backed lock store
//!
//! Exclusion comes from `create_new`, which is atomic on local filesystems.
//! Staleness is judged on the lock file's modification time so that the
//! second-granularity timestamp in its content never skews the age.
//!
//! Reclaiming a stale lock renames it aside, then compares the moved file
//! with the one that was judged stale (inode and mtime). A mismatch means a
//! fresh lock replaced the stale one in between; it is linked back into
//! place. While the path is empty during that restore, two races remain:
//!
//! - another acquirer's `create_new` can succeed, leaving two processes that
//!   believe they hold the key (the restore then fails with `AlreadyExists`
//!   and is logged);
//! - a holder that releases in that window gets its file restored, and the
//!   lock stays taken until it turns stale.
//!
//! Both need a fresh acquisition to land within the reclaim itself, right
//! after the previous holder went stale.

use super::name::LockName;
use super::store::{LockInfo, LockStore, ReclaimOutcome};
use crate::utils::error::{CuratorError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

static RECLAIM_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Lock store writing `<base_dir>/<name>.lock`
#[derive(Debug, Clone)]
pub struct FileLockStore {
    base_dir: PathBuf,
}

impl FileLockStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for(&self, name: &LockName) -> PathBuf {
        self.base_dir.join(name.file_name())
    }

    fn reclaim_path(&self, name: &LockName) -> PathBuf {
        let seq = RECLAIM_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.base_dir.join(format!(
            ".{}.reclaim-{}-{}",
            name.file_name(),
            std::process::id(),
            seq
        ))
    }
}

impl LockStore for FileLockStore {
    fn try_create(&self, name: &LockName, info: &LockInfo) -> Result<bool> {
        ensure_dir(&self.base_dir)?;
        let path = self.path_for(name);
        reject_symlink(&path)?;

        let mut file = match open_new_lock_file(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(err) => return Err(lock_io("failed to create lock file", &path, err)),
        };

        let written = file
            .write_all(info.encode().as_bytes())
            .and_then(|()| file.sync_all());
        if let Err(err) = written {
            // a half-written lock would block the key until it turns stale
            let _ = fs::remove_file(&path);
            return Err(lock_io("failed to write lock file", &path, err));
        }
        Ok(true)
    }

    fn reclaim_if_stale(
        &self,
        name: &LockName,
        max_age: Duration,
        now: SystemTime,
    ) -> Result<ReclaimOutcome> {
        let path = self.path_for(name);
        let judged = match inspect(&path, now)? {
            Some(state) => state,
            None => return Ok(ReclaimOutcome::Vanished),
        };
        if judged.age <= max_age {
            return Ok(ReclaimOutcome::Held { age: judged.age });
        }

        let aside = self.reclaim_path(name);
        match fs::rename(&path, &aside) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(ReclaimOutcome::Vanished);
            }
            Err(err) => return Err(lock_io("failed to move stale lock", &path, err)),
        }

        let holder = fs::read_to_string(&aside)
            .ok()
            .and_then(|content| LockInfo::parse(&content));
        let moved = inspect(&aside, now)?;

        if let Some(moved) = moved.filter(|moved| moved.stamp != judged.stamp) {
            debug!("Lock {} was replaced during reclamation, restoring it", name);
            match fs::hard_link(&aside, &path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    warn!("Lock {} was taken again while restoring a live lock", name);
                }
                Err(err) => {
                    let _ = fs::remove_file(&aside);
                    return Err(lock_io("failed to restore live lock", &path, err));
                }
            }
            let _ = fs::remove_file(&aside);
            return Ok(ReclaimOutcome::Held { age: moved.age });
        }

        match fs::remove_file(&aside) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(lock_io("failed to remove stale lock", &aside, err)),
        }
        Ok(ReclaimOutcome::Reclaimed {
            age: judged.age,
            holder,
        })
    }

    fn remove(&self, name: &LockName) -> Result<()> {
        let path = self.path_for(name);
        reject_symlink(&path)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(lock_io("failed to remove lock file", &path, err)),
        }
    }

    fn read(&self, name: &LockName) -> Result<Option<LockInfo>> {
        let path = self.path_for(name);
        reject_symlink(&path)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(lock_io("failed to read lock file", &path, err)),
        };

        if let Some(info) = LockInfo::parse(&content) {
            return Ok(Some(info));
        }

        // unreadable content, e.g. a holder that crashed mid-write
        match fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => Ok(Some(LockInfo {
                acquired_at: DateTime::<Utc>::from(modified),
                pid: None,
            })),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(lock_io("failed to stat lock file", &path, err)),
        }
    }
}

fn lock_io(context: &str, path: &Path, err: io::Error) -> CuratorError {
    CuratorError::lock(format!("{} {:?}: {}", context, path, err))
}

/// Identity of one lock file: a replacement differs even with an equal mtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    #[cfg(unix)]
    inode: (u64, u64),
}

impl FileStamp {
    fn of(meta: &fs::Metadata, modified: SystemTime) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Self {
                modified,
                inode: (meta.dev(), meta.ino()),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = meta;
            Self { modified }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LockFileState {
    age: Duration,
    stamp: FileStamp,
}

fn inspect(path: &Path, now: SystemTime) -> Result<Option<LockFileState>> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(lock_io("failed to stat lock file", path, err)),
    };
    if meta.file_type().is_symlink() {
        return Err(CuratorError::lock(format!(
            "lock path is a symlink: {:?}",
            path
        )));
    }
    let modified = meta
        .modified()
        .map_err(|err| lock_io("failed to read lock mtime", path, err))?;
    Ok(Some(LockFileState {
        age: now.duration_since(modified).unwrap_or(Duration::ZERO),
        stamp: FileStamp::of(&meta, modified),
    }))
}

fn ensure_dir(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            if meta.file_type().is_symlink() {
                return Err(CuratorError::lock(format!(
                    "lock directory is a symlink: {:?}",
                    path
                )));
            }
            if !meta.is_dir() {
                return Err(CuratorError::lock(format!(
                    "expected directory at {:?}",
                    path
                )));
            }
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path)
                .map_err(|err| lock_io("failed to create lock directory", path, err))?;
            set_dir_permissions(path, 0o700)
        }
        Err(err) => Err(lock_io("failed to inspect lock directory", path, err)),
    }
}

fn reject_symlink(path: &Path) -> Result<()> {
    if let Ok(meta) = fs::symlink_metadata(path) {
        if meta.file_type().is_symlink() {
            return Err(CuratorError::lock(format!(
                "lock path is a symlink: {:?}",
                path
            )));
        }
    }
    Ok(())
}

fn open_new_lock_file(path: &Path) -> io::Result<fs::File> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true).mode(0o600);
        options.open(path)
    }
    #[cfg(not(unix))]
    {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
    }
}

fn set_dir_permissions(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perm = fs::Permissions::from_mode(mode);
        fs::set_permissions(path, perm)
            .map_err(|err| lock_io("failed to set lock directory permissions", path, err))?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
    Ok(())
}
