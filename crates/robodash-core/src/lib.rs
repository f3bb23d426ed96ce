#![forbid(unsafe_code)]

//! Shared models and pure logic for the delivery-robot dashboard: the task
//! wizard, slot matching, fallback classification, status mapping and inbox
//! filtering. Nothing in this crate performs I/O.

pub mod api;
pub mod classify;
pub mod ids;
pub mod model;
pub mod notify;
pub mod progress;
pub mod simulator;
pub mod stations;
pub mod tasks;
pub mod wizard;

mod clock;

pub use classify::*;
pub use ids::*;
pub use model::*;
pub use clock::{now_ms, EpochMs};
