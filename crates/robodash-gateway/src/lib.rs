//! HTTP gateway in front of the robot backend: task-queue proxy, user
//! listing, classification proxy, the shared robot status value and
//! per-user notification acknowledgements.

pub mod api;
pub mod config;
pub mod db;
pub mod store;
