use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Cancelled,
    Completed,
}

impl EventStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(format!("Unknown event status: {other}")),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub volunteers_needed: i32,
    pub volunteers_registered: i32,
    pub category: String,
    pub status: EventStatus,
    pub created_by: i32,
    pub creator_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Event {
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.volunteers_registered >= self.volunteers_needed
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EventStatus::Active
    }

    #[must_use]
    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.event_date < today
    }
}
