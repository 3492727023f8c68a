//! In-process lock store
//!
//! Used when no lock directory is configured and by deterministic tests.
//! Exclusion only holds within one process.

use super::name::LockName;
use super::store::{LockInfo, LockStore, ReclaimOutcome};
use crate::utils::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::{Duration, SystemTime};

#[derive(Debug, Default)]
pub struct MemoryLockStore {
    locks: Mutex<HashMap<LockName, LockInfo>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

impl LockStore for MemoryLockStore {
    fn try_create(&self, name: &LockName, info: &LockInfo) -> Result<bool> {
        match self.locks.lock().entry(name.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(info.clone());
                Ok(true)
            }
        }
    }

    fn reclaim_if_stale(
        &self,
        name: &LockName,
        max_age: Duration,
        now: SystemTime,
    ) -> Result<ReclaimOutcome> {
        let mut locks = self.locks.lock();
        let age = match locks.get(name) {
            Some(info) => info.age(now),
            None => return Ok(ReclaimOutcome::Vanished),
        };
        if age <= max_age {
            return Ok(ReclaimOutcome::Held { age });
        }
        let holder = locks.remove(name);
        Ok(ReclaimOutcome::Reclaimed { age, holder })
    }

    fn remove(&self, name: &LockName) -> Result<()> {
        self.locks.lock().remove(name);
        Ok(())
    }

    fn read(&self, name: &LockName) -> Result<Option<LockInfo>> {
        Ok(self.locks.lock().get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_exclusive() {
        let store = MemoryLockStore::new();
        let name = LockName::new("job").unwrap();
        let info = LockInfo::current(SystemTime::now());

        assert!(store.try_create(&name, &info).unwrap());
        assert!(!store.try_create(&name, &info).unwrap());
        assert_eq!(store.len(), 1);

        store.remove(&name).unwrap();
        assert!(store.is_empty());
        assert!(store.try_create(&name, &info).unwrap());
    }

    #[test]
    fn test_reclaim_uses_acquisition_time() {
        let store = MemoryLockStore::new();
        let name = LockName::new("job").unwrap();
        let start = SystemTime::now();
        store
            .try_create(&name, &LockInfo::current(start))
            .unwrap();

        let outcome = store
            .reclaim_if_stale(&name, Duration::from_secs(10), start + Duration::from_secs(10))
            .unwrap();
        assert_eq!(
            outcome,
            ReclaimOutcome::Held {
                age: Duration::from_secs(10)
            }
        );

        let outcome = store
            .reclaim_if_stale(&name, Duration::from_secs(10), start + Duration::from_secs(11))
            .unwrap();
        assert!(matches!(outcome, ReclaimOutcome::Reclaimed { .. }));
        assert_eq!(store.read(&name).unwrap(), None);
    }
}
