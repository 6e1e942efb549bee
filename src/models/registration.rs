use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
    Attended,
}

impl RegistrationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Attended => "attended",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "attended" => Ok(Self::Attended),
            other => Err(format!("Unknown registration status: {other}")),
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A volunteer's sign-up for an event, with the display fields listings
/// join in from the event and volunteer sides.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub id: i32,
    pub event_id: i32,
    pub volunteer_id: i32,
    pub status: RegistrationStatus,
    pub notes: Option<String>,
    pub registered_at: String,
    pub updated_at: Option<String>,

    pub event_title: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub event_start_time: Option<NaiveTime>,
    pub event_end_time: Option<NaiveTime>,
    pub event_location: Option<String>,
    pub volunteer_name: Option<String>,
}
