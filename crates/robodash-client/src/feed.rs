//! Ready-made pollers for the dashboard views.

use robodash_core::api::RetrieveMessage;
use robodash_core::progress::StatusView;
use robodash_core::tasks::TaskBoard;
use robodash_core::BaseStation;

use crate::client::DashboardClient;
use crate::config::Polling;
use crate::error::Result;
use crate::poller::{spawn_poller, Poller};

impl DashboardClient {
    /// Sent and received queues fetched concurrently. Either failure fails
    /// the whole board.
    pub async fn fetch_board(&self, user: &str) -> Result<TaskBoard> {
        let (sent, received) = tokio::join!(
            self.fetch_queue(user, RetrieveMessage::SendQueue),
            self.fetch_queue(user, RetrieveMessage::ReceiveQueue),
        );
        Ok(TaskBoard {
            sent: sent?,
            received: received?,
        })
    }

    pub async fn fetch_status_view(&self) -> Result<StatusView> {
        Ok(StatusView::from(self.fetch_status().await?))
    }
}

pub fn status_poller(client: &DashboardClient, polling: &Polling) -> Poller<StatusView> {
    let client = client.clone();
    spawn_poller("status", polling.status(), move || {
        let client = client.clone();
        async move { client.fetch_status_view().await }
    })
}

pub fn board_poller(client: &DashboardClient, polling: &Polling, user: &str) -> Poller<TaskBoard> {
    let client = client.clone();
    let user = user.to_string();
    spawn_poller("tasks", polling.tasks(), move || {
        let client = client.clone();
        let user = user.clone();
        async move { client.fetch_board(&user).await }
    })
}

pub fn station_poller(client: &DashboardClient, polling: &Polling) -> Poller<Vec<BaseStation>> {
    let client = client.clone();
    spawn_poller("stations", polling.stations(), move || {
        let client = client.clone();
        async move { client.fetch_availability().await }
    })
}
