//! Named exclusive locks for scheduled jobs
//!
//! A lock is one file per key under a base directory, created atomically
//! with `create_new`. Holders that crashed leave their file behind; such a
//! file is reclaimed once it is older than twice the acquire timeout.

mod file_store;
mod manager;
mod memory_store;
mod name;
mod store;


pub use file_store::FileLockStore;
pub use manager::ExclusiveLock;
pub use memory_store::MemoryLockStore;
pub use name::LockName;
pub use store::{LockInfo, LockStore, ReclaimOutcome};
