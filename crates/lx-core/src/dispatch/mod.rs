//! Offer matching: places tasks on resource units and feeds the driver.

mod channel;
pub use channel::{DispatchQueue, DispatchReceiver, DriverCommand, dispatch_channel};

use std::sync::Arc;

use lx_model::{LaunchBatch, ResourceUnit, Task};
use tracing::{debug, instrument, trace, warn};

use crate::{
    error::{CoreError, LaunchFailure},
    pool::PendingTaskPool,
};

/// Assign nodes to `tasks` by rotating through `resources` in input order.
///
/// The rotation restarts at the first unit on every call. Callers check `resources` is non-empty.
fn assign_round_robin(resources: &[ResourceUnit], tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.node = Some(resources[index % resources.len()].node_id.clone());
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    queue: DispatchQueue,
    pending: Arc<PendingTaskPool>,
}

impl Dispatcher {
    pub fn new(queue: DispatchQueue, pending: Arc<PendingTaskPool>) -> Self {
        Self { queue, pending }
    }

    /// Place every task of the batch and queue it for launch, in batch order.
    ///
    /// An empty resource list rejects the whole batch before anything is touched.
    /// Batch tasks still in the pending pool are claimed from it, so the offer path
    /// cannot launch them a second time; pooled tasks that already left it are skipped.
    /// Offers are revived first, then each task is sent exactly once.
    /// Returns how many tasks were queued.
    #[instrument(
        level = "debug",
        skip(self, batch),
        fields(resources = batch.resources.len(), tasks = batch.tasks.len())
    )]
    pub fn launch_tasks(&self, batch: LaunchBatch) -> Result<usize, LaunchFailure> {
        let LaunchBatch { resources, tasks } = batch;
        if resources.is_empty() {
            return Err(LaunchFailure::new(CoreError::InsufficientResources, 0, 0, tasks));
        }

        let (tasks, handed_out) = self.pending.claim(tasks);
        for id in &handed_out {
            debug!(task = %id, "task already left the pending pool; not launched again");
        }
        self.dispatch(&resources, tasks)
    }

    /// Match an offer batch against everything currently pending.
    ///
    /// Pending tasks are drained (and the pool lock released) before anything is sent.
    /// If the dispatch channel is gone they are put back into the pool.
    pub fn on_offers(&self, resources: Vec<ResourceUnit>) -> Result<usize, LaunchFailure> {
        if resources.is_empty() {
            return Err(LaunchFailure::new(CoreError::InsufficientResources, 0, 0, Vec::new()));
        }

        let tasks = self.pending.drain_all();
        if tasks.is_empty() {
            trace!(resources = resources.len(), "offers received with nothing pending");
            return Ok(0);
        }
        self.dispatch(&resources, tasks)
    }

    fn dispatch(&self, resources: &[ResourceUnit], mut tasks: Vec<Task>) -> Result<usize, LaunchFailure> {
        if let Err(error) = self.queue.revive_offers() {
            return Err(self.hand_back(error, 0, tasks));
        }

        assign_round_robin(resources, &mut tasks);

        let mut launched = 0;
        let mut remaining = tasks.into_iter();
        while let Some(task) = remaining.next() {
            trace!(task = %task.id, node = ?task.node, "task matched");
            if let Err(rejected) = self.queue.launch(task) {
                let (task, error) = rejected.into_parts();
                let unsent = std::iter::once(task).chain(remaining).collect();
                return Err(self.hand_back(error, launched, unsent));
            }
            launched += 1;
        }

        debug!(launched, "launch batch queued");
        Ok(launched)
    }

    /// Readmit unsent tasks to the pending pool; whatever it refuses goes back to the caller.
    fn hand_back(&self, error: CoreError, launched: usize, mut unsent: Vec<Task>) -> LaunchFailure {
        for task in &mut unsent {
            task.node = None;
        }
        let total = unsent.len();
        let unsent = self.pending.requeue(unsent);
        let requeued = total - unsent.len();
        warn!(%error, launched, requeued, handed_back = unsent.len(), "launch batch interrupted");
        LaunchFailure::new(error, launched, requeued, unsent)
    }
}

#[cfg(test)]
mod tests {
    use lx_model::{NodeId, ProviderId, TaskId};

    use super::*;

    fn units(nodes: &[&str]) -> Vec<ResourceUnit> {
        nodes.iter().map(|n| ResourceUnit::new(*n)).collect()
    }

    fn tasks(ids: &[&str]) -> Vec<Task> {
        ids.iter().map(|id| Task::new(*id)).collect()
    }

    fn launches(rx: &mut DispatchReceiver) -> Vec<(TaskId, NodeId)> {
        let mut out = Vec::new();
        while let Some(cmd) = rx.try_recv() {
            if let DriverCommand::Launch(task) = cmd {
                let node = task.node.clone().expect("launched task carries a node");
                out.push((task.id, node));
            }
        }
        out
    }

    fn dispatcher() -> (Dispatcher, DispatchReceiver, Arc<PendingTaskPool>) {
        let (queue, rx) = dispatch_channel();
        let pending = Arc::new(PendingTaskPool::new());
        (Dispatcher::new(queue, Arc::clone(&pending)), rx, pending)
    }

    #[test]
    fn round_robin_wraps_around() {
        let (d, mut rx, _) = dispatcher();
        let batch = LaunchBatch::new(units(&["R0", "R1", "R2"]), tasks(&["T0", "T1", "T2", "T3"]));

        assert_eq!(d.launch_tasks(batch).unwrap(), 4);
        assert_eq!(rx.try_recv(), Some(DriverCommand::ReviveOffers));

        let got = launches(&mut rx);
        let expected: Vec<(TaskId, NodeId)> = [("T0", "R0"), ("T1", "R1"), ("T2", "R2"), ("T3", "R0")]
            .into_iter()
            .map(|(t, n)| (TaskId::from(t), NodeId::from(n)))
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn empty_resources_reject_everything() {
        let (d, mut rx, _) = dispatcher();
        let err = d
            .launch_tasks(LaunchBatch::new(vec![], tasks(&["T0", "T1"])))
            .unwrap_err();

        assert!(matches!(err.error(), CoreError::InsufficientResources));
        assert_eq!(err.unsent().len(), 2);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn every_task_is_sent_once() {
        let (d, mut rx, _) = dispatcher();
        let ids: Vec<String> = (0..37).map(|i| format!("t{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();

        let n = d
            .launch_tasks(LaunchBatch::new(units(&["a", "b"]), tasks(&refs)))
            .unwrap();
        assert_eq!(n, 37);

        let sent: Vec<TaskId> = launches(&mut rx).into_iter().map(|(t, _)| t).collect();
        let expected: Vec<TaskId> = refs.iter().map(|id| TaskId::from(*id)).collect();
        assert_eq!(sent, expected);
    }

    #[test]
    fn rotation_restarts_each_call() {
        let (d, mut rx, _) = dispatcher();
        d.launch_tasks(LaunchBatch::new(units(&["a", "b"]), tasks(&["1"])))
            .unwrap();
        d.launch_tasks(LaunchBatch::new(units(&["a", "b"]), tasks(&["2"])))
            .unwrap();

        let nodes: Vec<NodeId> = launches(&mut rx).into_iter().map(|(_, n)| n).collect();
        assert_eq!(nodes, [NodeId::from("a"), NodeId::from("a")]);
    }

    fn routed(id: &str) -> Task {
        let mut task = Task::new(id);
        task.provider = Some(ProviderId::from("mesos-1"));
        task
    }

    #[test]
    fn closed_channel_hands_unadmitted_tasks_back() {
        let (d, rx, pending) = dispatcher();
        drop(rx);
        let err = d
            .launch_tasks(LaunchBatch::new(units(&["a"]), tasks(&["t"])))
            .unwrap_err();

        assert!(matches!(err.error(), CoreError::DispatchClosed));
        assert_eq!(err.launched(), 0);
        assert_eq!(err.requeued(), 0);
        let unsent = err.into_unsent();
        assert_eq!(unsent[0].id, "t");
        assert!(unsent[0].node.is_none());
        assert!(pending.is_empty());
    }

    #[test]
    fn launching_a_pending_task_claims_it() {
        let (d, mut rx, pending) = dispatcher();
        pending.add_task(routed("t1")).unwrap();
        let copy = pending.get("t1").unwrap();

        assert_eq!(d.launch_tasks(LaunchBatch::new(units(&["n1"]), vec![copy.clone()])).unwrap(), 1);
        assert!(pending.is_empty());

        assert_eq!(d.on_offers(units(&["n1"])).unwrap(), 0);
        assert_eq!(d.launch_tasks(LaunchBatch::new(units(&["n1"]), vec![copy])).unwrap(), 0);

        let sent: Vec<TaskId> = launches(&mut rx).into_iter().map(|(t, _)| t).collect();
        assert_eq!(sent, [TaskId::from("t1")]);
    }

    #[test]
    fn closed_channel_puts_drained_tasks_back() {
        let (d, rx, pending) = dispatcher();
        pending.add_task(routed("t1")).unwrap();
        pending.add_task(routed("t2")).unwrap();
        drop(rx);

        let err = d.on_offers(units(&["n1"])).unwrap_err();
        assert!(matches!(err.error(), CoreError::DispatchClosed));
        assert_eq!(err.requeued(), 2);
        assert!(err.unsent().is_empty());

        let back: Vec<Task> = pending.list();
        let ids: Vec<_> = back.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, [TaskId::from("t1"), TaskId::from("t2")]);
        assert!(back.iter().all(|t| t.node.is_none()));
    }

    #[test]
    fn offers_drain_pending_tasks() {
        let (d, mut rx, pending) = dispatcher();
        for id in ["t1", "t2", "t3"] {
            pending.add_task(routed(id)).unwrap();
        }

        assert_eq!(d.on_offers(units(&["n1", "n2"])).unwrap(), 3);
        assert!(pending.is_empty());

        let got: Vec<(String, String)> = launches(&mut rx)
            .into_iter()
            .map(|(t, n)| (t.to_string(), n.to_string()))
            .collect();
        assert_eq!(
            got,
            [
                ("t1".to_string(), "n1".to_string()),
                ("t2".to_string(), "n2".to_string()),
                ("t3".to_string(), "n1".to_string()),
            ]
        );
    }

    #[test]
    fn offers_with_nothing_pending_do_not_revive() {
        let (d, mut rx, _) = dispatcher();
        assert_eq!(d.on_offers(units(&["n1"])).unwrap(), 0);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn empty_offers_leave_pending_untouched() {
        let (d, _rx, pending) = dispatcher();
        let mut task = Task::new("t1");
        task.provider = Some(ProviderId::from("p"));
        pending.add_task(task).unwrap();

        let err = d.on_offers(vec![]).unwrap_err();
        assert!(matches!(err.error(), CoreError::InsufficientResources));
        assert!(pending.contains("t1"));
    }

    #[test]
    fn assign_round_robin_is_pure() {
        let mut ts = tasks(&["a", "b", "c"]);
        assign_round_robin(&units(&["x", "y"]), &mut ts);
        let nodes: Vec<_> = ts.iter().map(|t| t.node.clone().unwrap()).collect();
        assert_eq!(nodes, [NodeId::from("x"), NodeId::from("y"), NodeId::from("x")]);
    }
}
