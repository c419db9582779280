use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Candidate profile joined with the owning user's identity fields.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub completeness: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileDetail {
    #[serde(flatten)]
    pub profile: Profile,
    pub experiences: Vec<Experience>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Experience {
    pub id: i64,
    pub profile_id: i64,
    pub title: Option<String>,
    pub company: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Profile fields accepted on create and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFields {
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub completeness: Option<i32>,
}

/// Experience fields in their stored form.
///
/// The HTTP handlers never set `start_date` or `end_date`; only direct store
/// callers populate them.
#[derive(Debug, Clone, Default)]
pub struct ExperienceFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}
