use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use robodash_core::{now_ms, StatusReport, TaskId};
use serde::{Deserialize, Serialize};
use surrealdb::{engine::any::connect, Surreal};

use crate::store::Store;

const SCHEMA: &str = "
DEFINE TABLE IF NOT EXISTS robot_status SCHEMALESS;
DEFINE TABLE IF NOT EXISTS ack SCHEMALESS;
DEFINE INDEX IF NOT EXISTS ack_username ON TABLE ack COLUMNS username;
";

/// Embedded SurrealDB store (SurrealKV engine).
#[derive(Clone)]
pub struct SurrealStore {
    inner: Surreal<surrealdb::engine::any::Any>,
}

#[derive(Debug, Serialize)]
struct StatusRow {
    status: String,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct AckRow {
    task_id: String,
}

impl SurrealStore {
    /// Open (or create) the datastore at `db_dir`.
    pub async fn connect(db_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(db_dir)
            .with_context(|| format!("creating db_dir {}", db_dir.display()))?;
        let endpoint = format!("surrealkv://{}", db_dir.display());
        let db = connect(endpoint)
            .await
            .context("connecting to embedded SurrealKV")?;
        db.use_ns("robodash")
            .use_db("gateway")
            .await
            .context("selecting surreal namespace/db")?;
        let store = Self { inner: db };
        store.apply_schema().await?;
        Ok(store)
    }

    async fn apply_schema(&self) -> Result<()> {
        self.inner
            .query(SCHEMA)
            .await
            .context("applying schema")?
            .check()
            .context("applying schema")?;
        Ok(())
    }
}

#[async_trait]
impl Store for SurrealStore {
    async fn status(&self) -> Result<Option<StatusReport>> {
        let mut res = self
            .inner
            .query("SELECT status, timestamp FROM type::thing('robot_status', 'current');")
            .await?;
        let report: Option<StatusReport> = res.take(0)?;
        Ok(report)
    }

    async fn set_status(&self, status: &str) -> Result<StatusReport> {
        let row = StatusRow {
            status: status.to_string(),
            timestamp: now_ms(),
        };
        self.inner
            .query("UPSERT type::thing('robot_status', 'current') CONTENT $row RETURN NONE;")
            .bind(("row", serde_json::to_value(&row)?))
            .await?
            .check()?;
        Ok(StatusReport {
            status: row.status,
            timestamp: Some(row.timestamp),
        })
    }

    async fn acks(&self, user: &str) -> Result<BTreeSet<TaskId>> {
        let mut res = self
            .inner
            .query("SELECT task_id FROM ack WHERE username = $username;")
            .bind(("username", user.to_string()))
            .await?;
        let rows: Vec<AckRow> = res.take(0)?;
        Ok(rows.into_iter().map(|r| TaskId::from_str(r.task_id)).collect())
    }

    async fn add_acks(&self, user: &str, task_ids: &[TaskId]) -> Result<BTreeSet<TaskId>> {
        let now = now_ms();
        for id in task_ids {
            // Record id is (user, task) so repeated dismissals stay one row.
            self.inner
                .query(
                    "UPSERT type::thing('ack', [$username, $task_id]) \
                     SET username = $username, task_id = $task_id, acked_ms = $now RETURN NONE;",
                )
                .bind(("username", user.to_string()))
                .bind(("task_id", id.as_str().to_string()))
                .bind(("now", now))
                .await?
                .check()?;
        }
        self.acks(user).await
    }
}
