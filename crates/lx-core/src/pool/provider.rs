use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use lx_model::{ProviderId, TaskProvider};
use tracing::debug;

use super::relock;
use crate::error::PoolError;

/// Registry of live task providers keyed by provider id.
#[derive(Debug, Default)]
pub struct TaskProviderPool {
    providers: RwLock<HashMap<ProviderId, Arc<TaskProvider>>>,
}

impl TaskProviderPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the provider under its id, returning the one it replaced.
    pub fn register(&self, provider: TaskProvider) -> Option<Arc<TaskProvider>> {
        let id = provider.id.clone();
        let previous = relock(self.providers.write()).insert(id.clone(), Arc::new(provider));
        debug!(provider = %id, replaced = previous.is_some(), "task provider registered");
        previous
    }

    pub fn get(&self, id: &str) -> Result<Arc<TaskProvider>, PoolError> {
        relock(self.providers.read())
            .get(id)
            .cloned()
            .ok_or_else(|| PoolError::NotFound(ProviderId::from(id)))
    }

    pub fn unregister(&self, id: &str) -> Result<Arc<TaskProvider>, PoolError> {
        let removed = relock(self.providers.write())
            .remove(id)
            .ok_or_else(|| PoolError::NotFound(ProviderId::from(id)))?;
        debug!(provider = %id, "task provider unregistered");
        Ok(removed)
    }

    /// All registered providers ordered by id.
    pub fn list(&self) -> Vec<Arc<TaskProvider>> {
        let mut all: Vec<_> = relock(self.providers.read()).values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn len(&self) -> usize {
        relock(self.providers.read()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_get() {
        let pool = TaskProviderPool::new();
        assert!(pool.register(TaskProvider::new("mesos-1", "10.0.0.1:3000")).is_none());

        let provider = pool.get("mesos-1").unwrap();
        assert_eq!(provider.id, "mesos-1");
        assert_eq!(provider.source, "10.0.0.1:3000");
    }

    #[test]
    fn get_unknown_is_not_found() {
        let pool = TaskProviderPool::new();
        let err = pool.get("nope").unwrap_err();
        assert_eq!(err, PoolError::NotFound(ProviderId::from("nope")));
    }

    #[test]
    fn register_replaces_existing() {
        let pool = TaskProviderPool::new();
        pool.register(TaskProvider::new("p", "old"));
        let replaced = pool.register(TaskProvider::new("p", "new")).unwrap();

        assert_eq!(replaced.source, "old");
        assert_eq!(pool.get("p").unwrap().source, "new");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn unregister_removes_and_reports_missing() {
        let pool = TaskProviderPool::new();
        pool.register(TaskProvider::new("p", ""));

        assert_eq!(pool.unregister("p").unwrap().id, "p");
        assert!(pool.is_empty());
        assert!(matches!(pool.unregister("p"), Err(PoolError::NotFound(_))));
    }

    #[test]
    fn list_is_sorted() {
        let pool = TaskProviderPool::new();
        pool.register(TaskProvider::new("b", ""));
        pool.register(TaskProvider::new("a", ""));
        pool.register(TaskProvider::new("c", ""));

        let ids: Vec<_> = pool.list().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn concurrent_register_and_lookup() {
        let pool = Arc::new(TaskProviderPool::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    let id = format!("p-{i}");
                    pool.register(TaskProvider::new(id.as_str(), ""));
                    pool.get(&id).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(pool.len(), 8);
    }
}
