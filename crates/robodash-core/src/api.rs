//! Wire types for the collaborator endpoints and the gateway.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::TaskId;
use crate::model::Priority;

/// `message` query values understood by the retrieval endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrieveMessage {
    TaskQueue,
    BaseStationAvailability,
    TopUnitAvailability,
    SendQueue,
    ReceiveQueue,
}

impl RetrieveMessage {
    pub fn as_str(self) -> &'static str {
        match self {
            RetrieveMessage::TaskQueue => "TaskQueue",
            RetrieveMessage::BaseStationAvailability => "BaseStationAvailability",
            RetrieveMessage::TopUnitAvailability => "TopUnitAvailability",
            RetrieveMessage::SendQueue => "SendQueue",
            RetrieveMessage::ReceiveQueue => "ReceiveQueue",
        }
    }

    /// Queues that are scoped to one user and need a `userId`.
    pub fn is_user_queue(self) -> bool {
        matches!(self, RetrieveMessage::SendQueue | RetrieveMessage::ReceiveQueue)
    }
}

/// Payload of an AddTask command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(rename = "taskID")]
    pub task_id: TaskId,
    pub start: String,
    pub end: String,
    pub slot: u32,
    pub priority: Priority,
    pub receiver: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub description: String,
}

/// Commands accepted by the webhook endpoint, tagged by `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message")]
pub enum Command {
    AddTask(NewTask),
    UserDropoff {
        #[serde(rename = "taskID")]
        task_id: TaskId,
    },
    UserPickup {
        #[serde(rename = "taskID")]
        task_id: TaskId,
    },
    LoadingDone {
        #[serde(rename = "taskID", default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
        #[serde(rename = "unloadCompartment", default, skip_serializing_if = "Option::is_none")]
        unload_compartment: Option<String>,
    },
    UnloadingDone {
        #[serde(rename = "taskID", default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
    },
    InitiateLoading {
        start: String,
        end: String,
        #[serde(rename = "loadCompartment")]
        load_compartment: String,
        #[serde(rename = "unloadCompartment")]
        unload_compartment: String,
    },
    LoadingDocked {
        end: String,
        #[serde(rename = "loadCompartment")]
        load_compartment: String,
        #[serde(rename = "unloadCompartment")]
        unload_compartment: String,
    },
    UnloadingDocked {
        #[serde(rename = "unloadCompartment")]
        unload_compartment: String,
    },
    Reset,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTask(_) => "AddTask",
            Command::UserDropoff { .. } => "UserDropoff",
            Command::UserPickup { .. } => "UserPickup",
            Command::LoadingDone { .. } => "LoadingDone",
            Command::UnloadingDone { .. } => "UnloadingDone",
            Command::InitiateLoading { .. } => "InitiateLoading",
            Command::LoadingDocked { .. } => "LoadingDocked",
            Command::UnloadingDocked { .. } => "UnloadingDocked",
            Command::Reset => "Reset",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub description: String,
}

/// Classification service reply. Both fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

/// Query of the gateway's task-queue proxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchTasksQuery {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/status`; older callers send `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default, alias = "message")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckRequest {
    pub task_ids: Vec<TaskId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckList {
    pub user: String,
    pub task_ids: BTreeSet<TaskId>,
}

/// Generic `{ "error": ... }` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Generic `{ "message": ... }` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}
