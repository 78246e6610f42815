use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::SystemTime,
};

use lx_model::{Task, TaskId, TaskRecord, TaskStatus};

/// Finished records kept by [`StatusBook::default`].
pub const DEFAULT_FINISHED_RETENTION: usize = 10_000;

struct Records {
    by_id: HashMap<TaskId, TaskRecord>,
    /// Ids in the order they reached a terminal status, with the stamp of that report.
    /// Stale entries are skipped at eviction.
    finished: VecDeque<(TaskId, SystemTime)>,
    retain_finished: usize,
}

impl Records {
    fn new(retain_finished: usize) -> Self {
        Self {
            by_id: HashMap::new(),
            finished: VecDeque::new(),
            retain_finished,
        }
    }

    fn put(&mut self, record: TaskRecord) {
        if record.status.is_terminal() {
            self.finished.push_back((record.id.clone(), record.updated_at));
        }
        self.by_id.insert(record.id.clone(), record);
        self.evict();
    }

    fn evict(&mut self) {
        while self.finished.len() > self.retain_finished {
            let Some((id, stamp)) = self.finished.pop_front() else {
                break;
            };
            let expired = self
                .by_id
                .get(&id)
                .is_some_and(|r| r.status.is_terminal() && r.updated_at == stamp);
            if expired {
                self.by_id.remove(&id);
            }
        }
    }
}

/// Last reported status of every task that has left the pending pool.
///
/// Written only by the driver supervisor loop. Everyone else reads through a [`StatusView`].
/// Records of running tasks are kept until they finish; of finished ones only the most
/// recent `retain_finished` are kept.
#[derive(Clone)]
pub struct StatusBook {
    inner: Arc<RwLock<Records>>,
}

/// Read-only handle onto a [`StatusBook`].
#[derive(Clone)]
pub struct StatusView {
    inner: Arc<RwLock<Records>>,
}

impl Default for StatusBook {
    fn default() -> Self {
        Self::with_retention(DEFAULT_FINISHED_RETENTION)
    }
}

impl StatusBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retain_finished: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Records::new(retain_finished))),
        }
    }

    pub fn view(&self) -> StatusView {
        StatusView {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Record `task` with its current placement, replacing any earlier record.
    pub(crate) fn record(&self, task: &Task, status: TaskStatus, message: Option<String>) {
        self.write().put(TaskRecord {
            id: task.id.clone(),
            provider: task.provider.clone(),
            node: task.node.clone(),
            status,
            message,
            updated_at: SystemTime::now(),
        });
    }

    /// Apply a backend status report. Returns `false` if the task was not known yet,
    /// in which case a bare record is created for it.
    pub(crate) fn update(&self, id: &TaskId, status: TaskStatus, message: Option<String>) -> bool {
        let mut records = self.write();
        let (known, mut record) = match records.by_id.get(id) {
            Some(existing) => (true, existing.clone()),
            None => (
                false,
                TaskRecord {
                    id: id.clone(),
                    provider: None,
                    node: None,
                    status,
                    message: None,
                    updated_at: SystemTime::now(),
                },
            ),
        };
        record.status = status;
        record.message = message;
        record.updated_at = SystemTime::now();
        records.put(record);
        known
    }

    fn write(&self) -> RwLockWriteGuard<'_, Records> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatusView {
    pub fn get(&self, id: &str) -> Option<TaskRecord> {
        self.read().by_id.get(id).cloned()
    }

    pub fn status(&self, id: &str) -> Option<TaskStatus> {
        self.read().by_id.get(id).map(|r| r.status)
    }

    pub fn list_all(&self) -> Vec<TaskRecord> {
        self.read().by_id.values().cloned().collect()
    }

    pub fn list_by_status(&self, status: TaskStatus) -> Vec<TaskRecord> {
        self.read()
            .by_id
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, Records> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}
