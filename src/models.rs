use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::DueTimeError;

/// Backend-assigned task identifier.
///
/// The backend decides the shape (json-server style backends hand out numbers,
/// others strings); the client never interprets it, only echoes it back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum TaskId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId::Number(n)
    }
}

impl FromStr for TaskId {
    type Err = std::convert::Infallible;

    /// Digits become a numeric id so that `toggle 3` matches a backend id of `3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(n) => TaskId::Number(n),
            Err(_) => TaskId::Text(s.to_string()),
        })
    }
}

/// Time of day (hour:minute) at which a reminder fires, evaluated against today's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DueTime(NaiveTime);

impl DueTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, DueTimeError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(DueTime)
            .ok_or_else(|| DueTimeError::OutOfRange(format!("{hour:02}:{minute:02}")))
    }

    /// Parses `HH:MM`; a trailing `:SS` is accepted and dropped.
    ///
    /// Every field must be exactly two ASCII digits.
    pub fn parse(s: &str) -> Result<Self, DueTimeError> {
        let s = s.trim();
        let malformed = || DueTimeError::Malformed(s.to_string());
        let fields: Vec<&str> = s.split(':').collect();
        if !(2..=3).contains(&fields.len()) {
            return Err(malformed());
        }
        let mut numbers = [0u32; 3];
        for (slot, field) in numbers.iter_mut().zip(&fields) {
            *slot = two_digits(field).ok_or_else(malformed)?;
        }
        if numbers[2] > 59 {
            return Err(DueTimeError::OutOfRange(s.to_string()));
        }
        Self::new(numbers[0], numbers[1])
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// The instant this due time denotes on `date`.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }
}

fn two_digits(field: &str) -> Option<u32> {
    match field.as_bytes() {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

impl fmt::Display for DueTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for DueTime {
    type Err = DueTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DueTime::parse(s)
    }
}

/// Represents a single task on the list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Identifier assigned by the backend on creation.
    pub id: TaskId,
    /// Free-text label.
    #[serde(rename = "task", alias = "description")]
    pub description: String,
    /// Whether the user has checked the task off.
    #[serde(default)]
    pub complete: bool,
    /// Reminder time; `None` means no reminder.
    #[serde(rename = "time", alias = "dueTime", default, with = "optional_due_time")]
    pub due_time: Option<DueTime>,
}

/// Creation payload; the backend answers with the same fields plus an `id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewTask {
    #[serde(rename = "task", alias = "description")]
    pub description: String,
    #[serde(default)]
    pub complete: bool,
    #[serde(rename = "time", alias = "dueTime", default, with = "optional_due_time")]
    pub due_time: Option<DueTime>,
}

impl NewTask {
    pub fn new(description: impl Into<String>, due_time: Option<DueTime>) -> Self {
        NewTask {
            description: description.into(),
            complete: false,
            due_time,
        }
    }

    pub fn with_id(self, id: TaskId) -> Task {
        Task {
            id,
            description: self.description,
            complete: self.complete,
            due_time: self.due_time,
        }
    }
}

/// `time` travels as `"HH:MM"`, with `""` (or null, or nothing) for "no reminder".
mod optional_due_time {
    use super::DueTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DueTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.collect_str(t),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DueTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => DueTime::parse(s).map(Some).map_err(de::Error::custom),
        }
    }
}
