use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown role '{0}' (expected candidate, hr or employee)")]
pub struct UnknownRole(pub String);

/// Account role. Stored as lower-case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Candidate,
    Hr,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Hr => "hr",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candidate" => Ok(Role::Candidate),
            "hr" => Ok(Role::Hr),
            "employee" => Ok(Role::Employee),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Row of the candidate directory: a candidate with their contact phone and,
/// when they have one, their employee record id.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub employee_id: Option<i64>,
}

/// Public handle shown to users: the first name followed by the last three
/// digits of their phone number.
pub fn public_handle(first_name: &str, phone: Option<&str>) -> String {
    let digits: Vec<char> = phone
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    let tail: String = digits[digits.len().saturating_sub(3)..].iter().collect();
    format!("{first_name}{tail}")
}

/// Emails are compared and stored trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("HR".parse::<Role>().unwrap(), Role::Hr);
        assert_eq!(" employee ".parse::<Role>().unwrap(), Role::Employee);
        assert!("applicant".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Hr).unwrap(), "\"hr\"");
        assert_eq!(Role::Candidate.to_string(), "candidate");
    }

    #[test]
    fn test_handle_uses_last_three_digits() {
        assert_eq!(public_handle("Rajesh", Some("9876543210")), "Rajesh210");
        assert_eq!(public_handle("Vikram", Some("+91-755-888-42-10")), "Vikram210");
        assert_eq!(public_handle("Ravi Kumar", Some("4321098765")), "Ravi Kumar765");
    }

    #[test]
    fn test_handle_with_short_or_missing_digits() {
        assert_eq!(public_handle("Sanjay", Some("45")), "Sanjay45");
        assert_eq!(public_handle("Kiran", Some("++--##")), "Kiran");
        assert_eq!(public_handle("Meera", None), "Meera");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Priya.HR@TechCorp.in "), "priya.hr@techcorp.in");
    }
}
