use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Shortlisted,
    InterviewScheduled,
    Offered,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(ApplicationStatus::Applied),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "interview_scheduled" => Ok(ApplicationStatus::InterviewScheduled),
            "offered" => Ok(ApplicationStatus::Offered),
            "hired" => Ok(ApplicationStatus::Hired),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub job_id: i64,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}
