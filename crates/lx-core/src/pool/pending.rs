use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use lx_model::{Task, TaskId};
use tracing::trace;

use super::relock;
use crate::error::{PoolError, Rejected};

/// Tasks admitted but not yet dispatched, in admission order.
///
/// A task id is present at most once. Every removal happens under the same lock as
/// admission, so a task is handed to exactly one caller.
#[derive(Debug, Default)]
pub struct PendingTaskPool {
    inner: Mutex<PendingInner>,
}

#[derive(Debug, Default)]
struct PendingInner {
    order: VecDeque<TaskId>,
    tasks: HashMap<TaskId, Task>,
}

impl PendingInner {
    fn remove(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.remove(id)?;
        self.order.retain(|queued| queued.as_str() != id);
        Some(task)
    }

    fn check(&self, task: &Task) -> Result<(), PoolError> {
        if task.provider.as_ref().is_none_or(|p| p.is_empty()) {
            return Err(PoolError::InvalidState(format!(
                "task {} has no task provider",
                task.id
            )));
        }
        if self.tasks.contains_key(&task.id) {
            return Err(PoolError::Duplicate(task.id.clone()));
        }
        Ok(())
    }
}

impl PendingTaskPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a task.
    ///
    /// Fails with [`PoolError::InvalidState`] if the task carries no provider and with
    /// [`PoolError::Duplicate`] if its id is already pending. A rejected task is handed back.
    pub fn add_task(&self, task: Task) -> Result<(), Rejected<PoolError>> {
        let mut inner = relock(self.inner.lock());
        if let Err(error) = inner.check(&task) {
            return Err(Rejected::new(task, error));
        }

        trace!(task = %task.id, "task added to pending pool");
        inner.order.push_back(task.id.clone());
        inner.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Remove and return the task with the given id.
    pub fn take(&self, id: &str) -> Option<Task> {
        relock(self.inner.lock()).remove(id)
    }

    /// Remove and return up to `n` tasks, oldest first.
    pub fn drain(&self, n: usize) -> Vec<Task> {
        let mut inner = relock(self.inner.lock());
        let count = n.min(inner.order.len());
        let ids: Vec<TaskId> = inner.order.drain(..count).collect();
        ids.iter()
            .filter_map(|id| inner.tasks.remove(id))
            .collect()
    }

    pub fn drain_all(&self) -> Vec<Task> {
        self.drain(usize::MAX)
    }

    /// Swap every batch task for its pending copy, removing it from the pool, all under one lock.
    ///
    /// Tasks that were never admitted pass through unchanged. A task that carries a provider
    /// but is no longer pending was already handed out elsewhere; it is dropped from the
    /// batch and its id returned in the second vector.
    pub fn claim(&self, tasks: Vec<Task>) -> (Vec<Task>, Vec<TaskId>) {
        let mut inner = relock(self.inner.lock());
        let mut claimed = Vec::with_capacity(tasks.len());
        let mut gone = Vec::new();
        for task in tasks {
            match inner.remove(task.id.as_str()) {
                Some(pooled) => claimed.push(pooled),
                None if task.provider.is_some() => gone.push(task.id),
                None => claimed.push(task),
            }
        }
        (claimed, gone)
    }

    /// Put tasks back at the head of the queue in their given order.
    ///
    /// Returns the tasks that cannot be admitted: no provider, or the id is pending again.
    pub fn requeue(&self, tasks: Vec<Task>) -> Vec<Task> {
        let mut inner = relock(self.inner.lock());
        let mut refused = Vec::new();
        for task in tasks.into_iter().rev() {
            if inner.check(&task).is_err() {
                refused.push(task);
                continue;
            }
            inner.order.push_front(task.id.clone());
            inner.tasks.insert(task.id.clone(), task);
        }
        refused.reverse();
        refused
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        relock(self.inner.lock()).tasks.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        relock(self.inner.lock()).tasks.contains_key(id)
    }

    /// Snapshot of all pending tasks, oldest first.
    pub fn list(&self) -> Vec<Task> {
        let inner = relock(self.inner.lock());
        inner
            .order
            .iter()
            .filter_map(|id| inner.tasks.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        relock(self.inner.lock()).tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lx_model::ProviderId;

    use super::*;

    fn routed(id: &str) -> Task {
        let mut task = Task::new(id);
        task.provider = Some(ProviderId::from("mesos-1"));
        task
    }

    #[test]
    fn add_requires_provider() {
        let pool = PendingTaskPool::new();
        let err = pool.add_task(Task::new("t1")).unwrap_err();

        assert!(matches!(err.error(), PoolError::InvalidState(_)));
        assert_eq!(err.task().id, "t1");
        assert!(pool.is_empty());
    }

    #[test]
    fn add_rejects_empty_provider() {
        let pool = PendingTaskPool::new();
        let mut task = Task::new("t1");
        task.provider = Some(ProviderId::from(""));

        assert!(matches!(
            pool.add_task(task).unwrap_err().error(),
            PoolError::InvalidState(_)
        ));
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let pool = PendingTaskPool::new();
        pool.add_task(routed("t1")).unwrap();

        let err = pool.add_task(routed("t1")).unwrap_err();
        assert_eq!(err.error(), &PoolError::Duplicate(TaskId::from("t1")));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn take_removes_once() {
        let pool = PendingTaskPool::new();
        pool.add_task(routed("t1")).unwrap();
        pool.add_task(routed("t2")).unwrap();

        assert_eq!(pool.take("t1").unwrap().id, "t1");
        assert!(pool.take("t1").is_none());
        assert!(!pool.contains("t1"));

        let left: Vec<_> = pool.list().into_iter().map(|t| t.id).collect();
        assert_eq!(left, [TaskId::from("t2")]);
    }

    #[test]
    fn drain_is_fifo_and_bounded() {
        let pool = PendingTaskPool::new();
        for id in ["a", "b", "c"] {
            pool.add_task(routed(id)).unwrap();
        }

        let first: Vec<_> = pool.drain(2).into_iter().map(|t| t.id).collect();
        assert_eq!(first, [TaskId::from("a"), TaskId::from("b")]);

        let rest: Vec<_> = pool.drain_all().into_iter().map(|t| t.id).collect();
        assert_eq!(rest, [TaskId::from("c")]);
        assert!(pool.is_empty());
        assert!(pool.drain(5).is_empty());
    }

    #[test]
    fn taken_id_can_be_admitted_again() {
        let pool = PendingTaskPool::new();
        pool.add_task(routed("t1")).unwrap();
        pool.take("t1").unwrap();
        pool.add_task(routed("t1")).unwrap();
        assert_eq!(pool.list().len(), 1);
    }

    #[test]
    fn claim_takes_pending_copy_once() {
        let pool = PendingTaskPool::new();
        pool.add_task(routed("t1")).unwrap();
        let copy = pool.get("t1").unwrap();

        let (claimed, gone) = pool.claim(vec![copy.clone(), Task::new("direct")]);
        let ids: Vec<_> = claimed.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, [TaskId::from("t1"), TaskId::from("direct")]);
        assert!(gone.is_empty());
        assert!(pool.is_empty());

        let (claimed, gone) = pool.claim(vec![copy]);
        assert!(claimed.is_empty());
        assert_eq!(gone, [TaskId::from("t1")]);
    }

    #[test]
    fn requeue_goes_to_the_front_in_order() {
        let pool = PendingTaskPool::new();
        pool.add_task(routed("c")).unwrap();

        let refused = pool.requeue(vec![routed("a"), Task::new("bare"), routed("b"), routed("c")]);
        let refused: Vec<_> = refused.into_iter().map(|t| t.id).collect();
        assert_eq!(refused, [TaskId::from("bare"), TaskId::from("c")]);

        let order: Vec<_> = pool.list().into_iter().map(|t| t.id).collect();
        assert_eq!(order, [TaskId::from("a"), TaskId::from("b"), TaskId::from("c")]);
    }

    #[test]
    fn concurrent_drains_never_share_a_task() {
        let pool = Arc::new(PendingTaskPool::new());
        for i in 0..200 {
            pool.add_task(routed(&format!("t{i}"))).unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    let mut got = Vec::new();
                    loop {
                        let batch = pool.drain(7);
                        if batch.is_empty() {
                            break got;
                        }
                        got.extend(batch.into_iter().map(|t| t.id));
                    }
                })
            })
            .collect();

        let mut all: Vec<TaskId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 200);
    }
}
