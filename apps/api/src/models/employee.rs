use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Employee record joined with the owning user's display fields.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub user_id: i64,
    /// `first last` of the linked user; empty when the user row is gone.
    pub name: String,
    pub email: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub job_location: Option<String>,
    pub photo: Option<String>,
    pub hired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeDetail {
    #[serde(flatten)]
    pub employee: Employee,
    pub performances: Vec<Performance>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Performance {
    pub id: i64,
    pub employee_id: i64,
    pub metric: Option<String>,
    pub value: Option<String>,
    #[sqlx(rename = "recorded_on")]
    pub date: Option<NaiveDate>,
}

/// Employment fields accepted on create and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFields {
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub job_location: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceFields {
    pub metric: Option<String>,
    #[serde(default, deserialize_with = "metric_value")]
    pub value: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Metric values are stored as text; numeric JSON is accepted and kept as written.
fn metric_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "performance value must be a string or number, got {other}"
        ))),
    }
}

pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_string()
}
