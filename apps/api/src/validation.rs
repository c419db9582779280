use crate::errors::AppError;
use crate::models::user::Role;

/// Trims the value and drops it when nothing is left.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional role, defaulting to `candidate` when absent or blank.
pub fn parse_role(value: Option<String>) -> Result<Role, AppError> {
    match non_blank(value) {
        Some(role) => role
            .parse()
            .map_err(|e: crate::models::user::UnknownRole| AppError::Validation(e.to_string())),
        None => Ok(Role::default()),
    }
}

/// Collects required request fields and reports every missing one at once.
#[derive(Default)]
pub struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    /// Returns the trimmed value, or records `name` as missing.
    pub fn text(&mut self, name: &'static str, value: Option<&str>) -> String {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v.to_string(),
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    /// Like [`Required::text`] but keeps surrounding whitespace.
    pub fn secret(&mut self, name: &'static str, value: Option<&str>) -> String {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => v.to_string(),
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Missing required fields: {}",
                self.missing.join(", ")
            )))
        }
    }
}
