use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolunteerStatus {
    Active,
    Inactive,
}

impl VolunteerStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// The opposite status, used by the admin activate/deactivate toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

impl FromStr for VolunteerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("Unknown volunteer status: {other}")),
        }
    }
}

impl fmt::Display for VolunteerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volunteer profile plus the user fields listings join in.
#[derive(Debug, Clone, Serialize)]
pub struct Volunteer {
    pub id: i32,
    pub user_id: i32,
    pub skills: String,
    pub availability: String,
    pub experience: Option<String>,
    pub interests: Option<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub status: VolunteerStatus,
    pub created_at: String,
    pub updated_at: String,

    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(
            "active".parse::<VolunteerStatus>().unwrap(),
            VolunteerStatus::Active
        );
        assert!("ACTIVE".parse::<VolunteerStatus>().is_err());
    }

    #[test]
    fn test_status_toggle() {
        assert_eq!(VolunteerStatus::Active.toggled(), VolunteerStatus::Inactive);
        assert_eq!(VolunteerStatus::Inactive.toggled(), VolunteerStatus::Active);
    }
}
