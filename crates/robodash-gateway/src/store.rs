use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use robodash_core::{now_ms, StatusReport, TaskId};

/// Gateway state that must outlive a request: the robot status value and
/// which pickup notifications each user has dismissed.
#[async_trait]
pub trait Store: Send + Sync {
    async fn status(&self) -> Result<Option<StatusReport>>;

    async fn set_status(&self, status: &str) -> Result<StatusReport>;

    async fn acks(&self, user: &str) -> Result<BTreeSet<TaskId>>;

    /// Add to the user's acknowledged set and return the whole set.
    async fn add_acks(&self, user: &str, task_ids: &[TaskId]) -> Result<BTreeSet<TaskId>>;
}

/// In-memory store for tests and `--memory` runs. Not durable.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    status: Option<StatusReport>,
    acks: HashMap<String, BTreeSet<TaskId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn status(&self) -> Result<Option<StatusReport>> {
        Ok(self.lock()?.status.clone())
    }

    async fn set_status(&self, status: &str) -> Result<StatusReport> {
        let report = StatusReport {
            status: status.to_string(),
            timestamp: Some(now_ms()),
        };
        self.lock()?.status = Some(report.clone());
        Ok(report)
    }

    async fn acks(&self, user: &str) -> Result<BTreeSet<TaskId>> {
        Ok(self.lock()?.acks.get(user).cloned().unwrap_or_default())
    }

    async fn add_acks(&self, user: &str, task_ids: &[TaskId]) -> Result<BTreeSet<TaskId>> {
        let mut inner = self.lock()?;
        let set = inner.acks.entry(user.to_string()).or_default();
        set.extend(task_ids.iter().cloned());
        Ok(set.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acks_are_per_user_and_idempotent() {
        let store = MemoryStore::new();
        let seven = TaskId::from_str("7");
        store.add_acks("alice", &[seven.clone()]).await.unwrap();
        let set = store.add_acks("alice", &[seven.clone()]).await.unwrap();
        assert_eq!(set.len(), 1);
        assert!(store.acks("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_starts_empty() {
        let store = MemoryStore::new();
        assert!(store.status().await.unwrap().is_none());
        let report = store.set_status("Pickup").await.unwrap();
        assert_eq!(store.status().await.unwrap(), Some(report));
    }
}
