use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::api::Command;
use crate::ids::TaskId;
use crate::model::{Progress, Task, TaskStatus};

/// Operator actions that move a task along its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    UserDropoff,
    LoadingDone,
    UnloadingDone,
    UserPickup,
}

impl TaskAction {
    pub const ALL: [TaskAction; 4] = [
        TaskAction::UserDropoff,
        TaskAction::LoadingDone,
        TaskAction::UnloadingDone,
        TaskAction::UserPickup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskAction::UserDropoff => "UserDropoff",
            TaskAction::LoadingDone => "LoadingDone",
            TaskAction::UnloadingDone => "UnloadingDone",
            TaskAction::UserPickup => "UserPickup",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            TaskAction::UserDropoff => "User dropped off item",
            TaskAction::LoadingDone => "Loading completed",
            TaskAction::UnloadingDone => "Unloading completed",
            TaskAction::UserPickup => "User picked up item",
        }
    }

    /// Whether the action applies to the task in its current state.
    pub fn is_enabled_for(self, task: &Task) -> bool {
        match self {
            TaskAction::UserDropoff => task.status == TaskStatus::PendingDropoff,
            TaskAction::LoadingDone => task.progress == Progress::Loading,
            TaskAction::UnloadingDone => task.progress == Progress::Unloading,
            TaskAction::UserPickup => task.status == TaskStatus::PendingCollection,
        }
    }

    pub fn command(self, task_id: TaskId) -> Command {
        match self {
            TaskAction::UserDropoff => Command::UserDropoff { task_id },
            TaskAction::LoadingDone => Command::LoadingDone {
                task_id: Some(task_id),
                end: None,
                unload_compartment: None,
            },
            TaskAction::UnloadingDone => Command::UnloadingDone {
                task_id: Some(task_id),
            },
            TaskAction::UserPickup => Command::UserPickup { task_id },
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskAction::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}

pub fn available_actions(task: &Task) -> Vec<TaskAction> {
    TaskAction::ALL
        .into_iter()
        .filter(|a| a.is_enabled_for(task))
        .collect()
}

/// Sent and received queues of one user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBoard {
    pub sent: Vec<Task>,
    pub received: Vec<Task>,
}

impl TaskBoard {
    pub fn all(&self) -> impl Iterator<Item = &Task> {
        self.sent.iter().chain(self.received.iter())
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.all().find(|t| &t.task_id == id)
    }
}

/// Column of the task log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TaskId,
    Receiver,
    Status,
    Progress,
    StartStation,
    EndStation,
    Slot,
    Priority,
    Timestamp,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "taskid" | "task_id" | "id" => SortKey::TaskId,
            "receiver" => SortKey::Receiver,
            "status" => SortKey::Status,
            "progress" => SortKey::Progress,
            "start" | "start_station" => SortKey::StartStation,
            "end" | "end_station" => SortKey::EndStation,
            "slot" => SortKey::Slot,
            "priority" => SortKey::Priority,
            "timestamp" | "time" => SortKey::Timestamp,
            other => return Err(format!("unknown sort key: {other}")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Workflow position; values outside the workflow go last, by name.
fn progress_rank(t: &Task) -> (usize, &str) {
    (t.progress.ordinal().unwrap_or(usize::MAX), t.progress.as_str())
}

fn compare(a: &Task, b: &Task, key: SortKey) -> Ordering {
    match key {
        SortKey::TaskId => a.task_id.cmp(&b.task_id),
        SortKey::Receiver => a.receiver.cmp(&b.receiver),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        SortKey::Progress => progress_rank(a).cmp(&progress_rank(b)),
        SortKey::StartStation => a.start_station.cmp(&b.start_station),
        SortKey::EndStation => a.end_station.cmp(&b.end_station),
        SortKey::Slot => a.slot.cmp(&b.slot),
        SortKey::Priority => a.priority.cmp(&b.priority),
        SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
    }
}

/// Stable sort of the task log by one column.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, order: SortOrder) {
    tasks.sort_by(|a, b| {
        let o = compare(a, b, key);
        match order {
            SortOrder::Asc => o,
            SortOrder::Desc => o.reverse(),
        }
    });
}
