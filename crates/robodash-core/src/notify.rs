//! "Ready for pickup" notifications.
//!
//! A received task is announced while its status is awaiting collection and
//! the user has not acknowledged it. Acknowledgements are expected to be
//! persisted by the caller (see the gateway's ack store); [`Inbox`] only keeps
//! the set it was seeded with plus dismissals made since.

use std::collections::BTreeSet;

use crate::ids::TaskId;
use crate::model::Task;

/// Received tasks that should be announced.
pub fn pending_collection<'a>(
    received: &'a [Task],
    acknowledged: &BTreeSet<TaskId>,
) -> Vec<&'a Task> {
    received
        .iter()
        .filter(|t| t.status.is_awaiting_collection())
        .filter(|t| !acknowledged.contains(&t.task_id))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Inbox {
    acknowledged: BTreeSet<TaskId>,
    pending: Vec<Task>,
}

impl Inbox {
    pub fn new(acknowledged: BTreeSet<TaskId>) -> Self {
        Self {
            acknowledged,
            pending: Vec::new(),
        }
    }

    /// Replace the received queue with a fresh fetch. Returns the tasks that
    /// were not pending before this refresh.
    pub fn refresh(&mut self, received: &[Task]) -> Vec<Task> {
        let next: Vec<Task> = pending_collection(received, &self.acknowledged)
            .into_iter()
            .cloned()
            .collect();
        let fresh = next
            .iter()
            .filter(|t| !self.pending.iter().any(|p| p.task_id == t.task_id))
            .cloned()
            .collect();
        self.pending = next;
        fresh
    }

    /// Merge acknowledgements learned elsewhere (e.g. another session).
    pub fn absorb_acknowledged(&mut self, ids: impl IntoIterator<Item = TaskId>) {
        self.acknowledged.extend(ids);
        let acked = &self.acknowledged;
        self.pending.retain(|t| !acked.contains(&t.task_id));
    }

    pub fn pending(&self) -> &[Task] {
        &self.pending
    }

    pub fn should_show(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Dismiss one task. Returns `true` if it was pending.
    pub fn dismiss(&mut self, id: &TaskId) -> bool {
        self.acknowledged.insert(id.clone());
        let before = self.pending.len();
        self.pending.retain(|t| &t.task_id != id);
        before != self.pending.len()
    }

    /// Dismiss everything currently shown; returns the ids to persist.
    pub fn dismiss_all(&mut self) -> Vec<TaskId> {
        let ids: Vec<TaskId> = self.pending.drain(..).map(|t| t.task_id).collect();
        self.acknowledged.extend(ids.iter().cloned());
        ids
    }

    pub fn acknowledged(&self) -> &BTreeSet<TaskId> {
        &self.acknowledged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Progress, TaskStatus};

    fn received(id: &str, status: &str) -> Task {
        Task {
            task_id: TaskId::from_str(id),
            sender: "bob".into(),
            receiver: "alice".into(),
            start_station: "StationA".into(),
            end_station: "StationB".into(),
            slot: 2,
            description: "linen".into(),
            priority: 4,
            progress: Progress::UnloadingDone,
            status: TaskStatus::from(status),
            timestamp: None,
            timeslot: None,
        }
    }

    #[test]
    fn only_awaiting_collection_is_pending() {
        let queue = vec![
            received("1", "PendingCollection"),
            received("2", "Ongoing"),
            received("3", "WaitingCollection"),
        ];
        let got = pending_collection(&queue, &BTreeSet::new());
        let ids: Vec<&str> = got.iter().map(|t| t.task_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn dismissed_tasks_stay_hidden_across_refreshes() {
        let queue = vec![received("1", "PendingCollection"), received("2", "PendingCollection")];
        let mut inbox = Inbox::default();
        assert_eq!(inbox.refresh(&queue).len(), 2);

        assert!(inbox.dismiss(&TaskId::from_str("1")));
        assert_eq!(inbox.pending().len(), 1);

        // Same backend state on the next poll: still only one.
        assert!(inbox.refresh(&queue).is_empty());
        assert_eq!(inbox.pending().len(), 1);
    }

    #[test]
    fn reseeded_inbox_honours_persisted_acks() {
        let queue = vec![received("1", "PendingCollection")];
        let mut first = Inbox::default();
        first.refresh(&queue);
        let acked = first.dismiss_all();
        assert_eq!(acked, vec![TaskId::from_str("1")]);
        assert!(!first.should_show());

        let mut second = Inbox::new(acked.into_iter().collect());
        assert!(second.refresh(&queue).is_empty());

        // Without the persisted set the task resurfaces.
        let mut fresh = Inbox::default();
        assert_eq!(fresh.refresh(&queue).len(), 1);
    }

    #[test]
    fn absorbing_acks_hides_pending() {
        let queue = vec![received("7", "PendingCollection")];
        let mut inbox = Inbox::default();
        inbox.refresh(&queue);
        inbox.absorb_acknowledged([TaskId::from_str("7")]);
        assert!(!inbox.should_show());
    }
}
