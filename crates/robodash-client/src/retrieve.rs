use robodash_core::api::RetrieveMessage;
use robodash_core::stations::{group_slot_records, normalize_slots};
use robodash_core::{BaseStation, Slot, SlotRecord, Task};
use serde_json::Value;
use tracing::debug;

use crate::client::DashboardClient;
use crate::error::{ClientError, Result};

impl DashboardClient {
    async fn retrieve<T: serde::de::DeserializeOwned>(
        &self,
        message: RetrieveMessage,
        user: Option<&str>,
    ) -> Result<T> {
        let mut params = vec![("message", message.as_str())];
        if let Some(u) = user {
            params.push(("userId", u));
        }
        let url = self.url_with(&self.endpoints.retrieve_url, &params)?;
        debug!(message = message.as_str(), "retrieve");
        self.get_json(url).await
    }

    /// Base-station slot availability, grouped per station.
    pub async fn fetch_availability(&self) -> Result<Vec<BaseStation>> {
        let records: Vec<SlotRecord> = self
            .retrieve(RetrieveMessage::BaseStationAvailability, None)
            .await?;
        Ok(group_slot_records(records))
    }

    /// Compartments of the robot's top unit, ascending by slot.
    pub async fn fetch_top_units(&self) -> Result<Vec<Slot>> {
        let slots: Vec<Slot> = self
            .retrieve(RetrieveMessage::TopUnitAvailability, None)
            .await?;
        Ok(normalize_slots(slots))
    }

    /// Tasks sent by or addressed to `user`.
    pub async fn fetch_queue(&self, user: &str, queue: RetrieveMessage) -> Result<Vec<Task>> {
        let user = user_queue_args(user, queue)?;
        self.retrieve(queue, Some(user)).await
    }

    /// The same queue as [`fetch_queue`](Self::fetch_queue), records left
    /// exactly as the backend wrote them.
    pub async fn fetch_queue_records(&self, user: &str, queue: RetrieveMessage) -> Result<Vec<Value>> {
        let user = user_queue_args(user, queue)?;
        self.retrieve(queue, Some(user)).await
    }

    /// Every task known to the backend.
    pub async fn fetch_task_log(&self) -> Result<Vec<Task>> {
        self.retrieve(RetrieveMessage::TaskQueue, None).await
    }
}

fn user_queue_args(user: &str, queue: RetrieveMessage) -> Result<&str> {
    if !queue.is_user_queue() {
        return Err(ClientError::InvalidInput(format!(
            "{} is not a per-user queue",
            queue.as_str()
        )));
    }
    let user = user.trim();
    if user.is_empty() {
        return Err(ClientError::InvalidInput("userId is required".to_string()));
    }
    Ok(user)
}
