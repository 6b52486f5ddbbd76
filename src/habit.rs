use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeMap, fmt};

pub type HabitId = u64;

/// Per-day state of a single habit cell.
///
/// Absence of a day in [`Habit::days`] means [`Status::NotTracked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    NotTracked,
    Completed,
    Failed,
    NotPlanned,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::NotTracked,
        Status::Completed,
        Status::Failed,
        Status::NotPlanned,
    ];

    /// Advances a cell one step around the ring
    /// `NotTracked -> Completed -> Failed -> NotPlanned -> NotTracked`.
    pub fn next(self) -> Self {
        match self {
            Status::NotTracked => Status::Completed,
            Status::Completed => Status::Failed,
            Status::Failed => Status::NotPlanned,
            Status::NotPlanned => Status::NotTracked,
        }
    }

    /// Like [`Status::next`] for a raw wire value; anything unrecognised
    /// advances to `Completed`.
    pub fn next_from_raw(raw: &str) -> Self {
        Status::parse(raw).map_or(Status::Completed, Status::next)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::NotTracked => "not-tracked",
            Status::Completed => "completed",
            Status::Failed => "failed",
            Status::NotPlanned => "not-planned",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == raw.trim())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Stored blobs may carry values written by older builds; those read as
// untracked instead of rejecting the whole blob.
impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Status::parse(&raw).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub days: BTreeMap<NaiveDate, Status>,
}

impl Habit {
    pub fn new(id: HabitId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            days: BTreeMap::new(),
        }
    }

    pub fn status_on(&self, date: NaiveDate) -> Status {
        self.days.get(&date).copied().unwrap_or_default()
    }

    pub(crate) fn set_status(&mut self, date: NaiveDate, status: Status) {
        if status == Status::NotTracked {
            self.days.remove(&date);
        } else {
            self.days.insert(date, status);
        }
    }
}
