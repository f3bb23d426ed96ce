//! HTTP access to the dashboard's collaborators (retrieval endpoint, command
//! webhook, classification service, user directory, gateway) plus the shared
//! background poller.

mod acks;
mod classifier;
mod client;
mod directory;
mod dispatch;
mod retrieve;
mod status;

pub mod config;
pub mod error;
pub mod feed;
pub mod poller;

pub use client::DashboardClient;
pub use config::{ClientConfig, Endpoints, Polling};
pub use error::{ClientError, Result};
pub use poller::{spawn_poller, PollState, Poller};
