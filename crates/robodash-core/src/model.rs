use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::ids::TaskId;
use crate::clock::EpochMs;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("priority must be between 1 and 5 (got {0})")]
    PriorityOutOfRange(i64),
}

/// Delivery urgency, 1 (highest) to 5 (lowest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(1);
    pub const LOWEST: Priority = Priority(5);

    pub fn new(value: i64) -> Result<Self, ParseError> {
        if (1..=5).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ParseError::PriorityOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Priority {
    type Error = ParseError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Priority::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The five fixed item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Medicine,
    #[serde(rename = "Blood Samples")]
    BloodSamples,
    Documents,
    #[serde(rename = "Linen Supplies")]
    LinenSupplies,
    Others,
}

impl Category {
    /// All categories, most urgent first.
    pub const ALL: [Category; 5] = [
        Category::Medicine,
        Category::BloodSamples,
        Category::Documents,
        Category::LinenSupplies,
        Category::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Medicine => "Medicine",
            Category::BloodSamples => "Blood Samples",
            Category::Documents => "Documents",
            Category::LinenSupplies => "Linen Supplies",
            Category::Others => "Others",
        }
    }

    /// Fixed category to priority table.
    pub fn priority(self) -> Priority {
        match self {
            Category::Medicine => Priority(1),
            Category::BloodSamples => Priority(2),
            Category::Documents => Priority(3),
            Category::LinenSupplies => Priority(4),
            Category::Others => Priority(5),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ParseError;

    /// Case-insensitive match on the label; surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseError::UnknownCategory(s.to_string()))
    }
}

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    /// Remote classification service.
    Service,
    /// Local keyword heuristic after a service failure.
    Fallback,
    /// Picked by the user.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub priority: Priority,
    pub source: ClassificationSource,
}

impl ClassificationResult {
    pub fn manual(category: Category) -> Self {
        Self {
            category,
            priority: category.priority(),
            source: ClassificationSource::Manual,
        }
    }

    /// Best-guess results should be offered for manual correction.
    pub fn is_adjustable(&self) -> bool {
        self.source == ClassificationSource::Fallback
    }
}

macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal $(| $alias:literal)*),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// Value not known to this client, kept verbatim.
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(s) => s.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $($wire $(| $alias)* => $name::$variant,)+
                    _ => $name::Other(s),
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name::from(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> String {
                match v {
                    $name::Other(s) => s,
                    other => other.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::Other(String::new())
            }
        }
    };
}

open_enum! {
    /// Robot-side step of a task, in workflow order.
    Progress {
        Pending => "Pending",
        UserDropoff => "UserDropoff",
        MoveToStart => "MoveToStart",
        Loading => "Loading",
        LoadingDone => "LoadingDone",
        MoveToEnd => "MoveToEnd",
        Unloading => "Unloading",
        UnloadingDone => "UnloadingDone",
        Completed => "Completed",
    }
}

impl Progress {
    /// Position in the workflow (0-based), `None` for unknown values.
    pub fn ordinal(&self) -> Option<usize> {
        Some(match self {
            Progress::Pending => 0,
            Progress::UserDropoff => 1,
            Progress::MoveToStart => 2,
            Progress::Loading => 3,
            Progress::LoadingDone => 4,
            Progress::MoveToEnd => 5,
            Progress::Unloading => 6,
            Progress::UnloadingDone => 7,
            Progress::Completed => 8,
            Progress::Other(_) => return None,
        })
    }
}

open_enum! {
    /// User-facing status of a task.
    TaskStatus {
        PendingDropoff => "PendingDropoff",
        Ongoing => "Ongoing",
        PendingCollection => "PendingCollection" | "WaitingCollection",
        Completed => "Completed",
    }
}

impl TaskStatus {
    pub fn is_awaiting_collection(&self) -> bool {
        matches!(self, TaskStatus::PendingCollection)
    }
}

/// A delivery task as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "taskID")]
    pub task_id: TaskId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub receiver: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_station: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_station: String,
    #[serde(default, deserialize_with = "integral_or_default")]
    pub slot: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Raw priority as stored; 0 when the record has none.
    #[serde(default, deserialize_with = "integral_or_default")]
    pub priority: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: Progress,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "integral", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<EpochMs>,
    #[serde(default, deserialize_with = "integral", skip_serializing_if = "Option::is_none")]
    pub timeslot: Option<u32>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Numbers as the backend writes them: `2` and `2.0` both mean 2.
#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Int(i64),
    Float(f64),
}

fn integral<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = match Option::<Number>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Number::Int(n)) => n,
        Some(Number::Float(f)) if f.fract() == 0.0 && f.abs() < 9e15 => f as i64,
        Some(Number::Float(f)) => {
            return Err(serde::de::Error::custom(format!("expected a whole number, got {f}")))
        }
    };
    T::try_from(value)
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("{value} is out of range")))
}

fn integral_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + Default,
{
    Ok(integral(deserializer)?.unwrap_or_default())
}

/// One availability record as returned by the retrieval endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub station: String,
    pub slot: u32,
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub slot: u32,
    #[serde(rename = "status", default)]
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStation {
    pub station: String,
    /// Ascending by slot number, unique.
    pub slots: Vec<Slot>,
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
}

/// Current robot status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(alias = "message")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<EpochMs>,
}

/// Map the signed-in email to a directory user.
pub fn resolve_identity<'a>(users: &'a [User], email: &str) -> Option<&'a User> {
    users.iter().find(|u| u.email == email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_table_is_total() {
        let got: Vec<u8> = Category::ALL.iter().map(|c| c.priority().get()).collect();
        assert_eq!(got, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn category_parses_labels() {
        assert_eq!("blood samples".parse::<Category>(), Ok(Category::BloodSamples));
        assert_eq!(" Others ".parse::<Category>(), Ok(Category::Others));
        assert!("Food".parse::<Category>().is_err());
    }

    #[test]
    fn priority_bounds() {
        assert!(Priority::new(0).is_err());
        assert!(Priority::new(6).is_err());
        assert_eq!(Priority::new(3).unwrap().get(), 3);
        assert!(serde_json::from_str::<Priority>("9").is_err());
    }

    #[test]
    fn open_enums_keep_unknown_values() {
        let s: TaskStatus = serde_json::from_str(r#""Returned""#).unwrap();
        assert_eq!(s, TaskStatus::Other("Returned".into()));
        assert_eq!(serde_json::to_string(&s).unwrap(), r#""Returned""#);

        let legacy = TaskStatus::from("WaitingCollection");
        assert!(legacy.is_awaiting_collection());
        assert_eq!(legacy.as_str(), "PendingCollection");
    }

    #[test]
    fn status_report_accepts_message_field() {
        let a: StatusReport = serde_json::from_str(r#"{"message":"Pickup"}"#).unwrap();
        let b: StatusReport = serde_json::from_str(r#"{"status":"Pickup","timestamp":5}"#).unwrap();
        assert_eq!(a.status, "Pickup");
        assert_eq!(b.timestamp, Some(5));
    }

    #[test]
    fn task_decodes_sparse_records() {
        let t: Task = serde_json::from_str(
            r#"{"taskID": 12, "receiver": "alice", "status": "PendingDropoff", "slot": null}"#,
        )
        .unwrap();
        assert_eq!(t.task_id.as_str(), "12");
        assert_eq!(t.slot, 0);
        assert_eq!(t.status, TaskStatus::PendingDropoff);
        assert_eq!(t.progress, Progress::Other(String::new()));
    }

    #[test]
    fn task_numbers_accept_whole_floats() {
        let t: Task = serde_json::from_str(
            r#"{"taskID": 3, "slot": 2.0, "priority": 4.0, "timestamp": 1700000000000.0, "timeslot": 9}"#,
        )
        .unwrap();
        assert_eq!((t.slot, t.priority), (2, 4));
        assert_eq!(t.timestamp, Some(1_700_000_000_000));
        assert_eq!(t.timeslot, Some(9));
        assert!(serde_json::from_str::<Task>(r#"{"taskID": 3, "slot": 2.5}"#).is_err());
    }
}
