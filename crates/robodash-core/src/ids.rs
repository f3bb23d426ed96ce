use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ulid::Ulid;

/// Identifier of a delivery task.
///
/// New tasks get a ULID. Records already in the backend store may carry
/// plain numeric ids; those are written back as JSON numbers so commands hit
/// the same record. Equality and hashing use the textual form, so `42` and
/// `"42"` name the same task. Ordering puts numeric ids first, by value.
#[derive(Clone, Debug)]
pub struct TaskId {
    text: String,
    number: Option<i64>,
}

impl TaskId {
    /// Fresh, globally unique id.
    pub fn generate() -> Self {
        Self::from_str(Ulid::new().to_string())
    }

    pub fn from_str(s: impl Into<String>) -> Self {
        Self {
            text: s.into(),
            number: None,
        }
    }

    /// Id the backend stores as a JSON number.
    pub fn number(n: i64) -> Self {
        Self {
            text: n.to_string(),
            number: Some(n),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_numeric(&self) -> bool {
        self.number.is_some()
    }
}

impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for TaskId {}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Ord for TaskId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.text.parse::<i64>(), other.text.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.text.cmp(&other.text)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.text.cmp(&other.text),
        }
    }
}

impl PartialOrd for TaskId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.number {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => TaskId::from_str(s),
            Raw::Int(n) => TaskId::number(n),
            Raw::Float(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => TaskId::number(n as i64),
            Raw::Float(n) => TaskId::from_str(format!("{n}")),
        })
    }
}

/// Source of ids for tasks created by the wizard.
pub type IdSource = fn() -> TaskId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_numeric_and_text_ids() {
        let a: TaskId = serde_json::from_str("520409635").unwrap();
        let b: TaskId = serde_json::from_str(r#""01J0000000000000000000000A""#).unwrap();
        assert_eq!(a.as_str(), "520409635");
        assert_eq!(b.as_str(), "01J0000000000000000000000A");
        assert_eq!(serde_json::to_string(&b).unwrap(), r#""01J0000000000000000000000A""#);
    }

    #[test]
    fn numeric_ids_stay_numbers_on_the_wire() {
        let a: TaskId = serde_json::from_str("42").unwrap();
        assert!(a.is_numeric());
        assert_eq!(serde_json::to_string(&a).unwrap(), "42");

        let integral: TaskId = serde_json::from_str("42.0").unwrap();
        assert_eq!(serde_json::to_string(&integral).unwrap(), "42");

        // Same task whichever way it was spelled.
        assert_eq!(a, TaskId::from_str("42"));
    }

    #[test]
    fn numeric_ids_order_by_value() {
        let mut ids = vec![
            TaskId::number(100),
            TaskId::from_str("abc"),
            TaskId::number(9),
            TaskId::from_str("10"),
        ];
        ids.sort();
        let got: Vec<&str> = ids.iter().map(TaskId::as_str).collect();
        assert_eq!(got, vec!["9", "10", "100", "abc"]);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }
}
