//! Storage seam for every portal resource.
//!
//! `AppState` carries an `Arc<dyn Store>`. Production uses [`PgStore`]; the
//! router tests run against the in-memory implementation in `memory`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::application::{Application, ApplicationStatus};
use crate::models::employee::{Employee, EmployeeFields, Performance, PerformanceFields};
use crate::models::job::{Job, JobFields};
use crate::models::profile::{Experience, ExperienceFields, Profile, ProfileFields};
use crate::models::user::{CandidateSummary, Role, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("referenced record does not exist: {0}")]
    MissingReference(String),

    #[error("value does not match column type: {0}")]
    TypeMismatch(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let message = db.message().to_string();
            match db.code().as_deref() {
                Some("23505") => return StoreError::Conflict(message),
                Some("23503") => return StoreError::MissingReference(message),
                Some("42804") => return StoreError::TypeMismatch(message),
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// A new account. When `phone` is set a profile carrying it is created in the
/// same transaction.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
    pub phone: Option<String>,
}

/// Partial account update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the company.
    pub company_name: Option<Option<String>>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 1-based.
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub user_id: i64,
    pub job_id: i64,
    pub status: ApplicationStatus,
}

/// Account side of a hire.
#[derive(Debug, Clone)]
pub enum HireAccount {
    /// An existing user; `promote` turns a candidate into an employee.
    Existing { user_id: i64, promote: bool },
    /// A brand-new account, created with its phone profile like [`NewUser`].
    New(NewUser),
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub account: HireAccount,
    pub fields: EmployeeFields,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: i64,
    pub fields: ProfileFields,
}

#[async_trait]
pub trait Store: Send + Sync {
    // ── Users ────────────────────────────────────────────────────────────

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Newest accounts first.
    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, StoreError>;
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, StoreError>;
    async fn update_user(&self, id: i64, changes: UserChanges)
        -> Result<Option<User>, StoreError>;
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;
    /// Phone from the user's earliest profile.
    async fn user_phone(&self, user_id: i64) -> Result<Option<String>, StoreError>;

    // ── Jobs ─────────────────────────────────────────────────────────────

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError>;
    async fn get_job(&self, id: i64) -> Result<Option<Job>, StoreError>;
    async fn create_job(&self, job: JobFields) -> Result<Job, StoreError>;
    async fn update_job(&self, id: i64, changes: JobFields) -> Result<Option<Job>, StoreError>;
    async fn delete_job(&self, id: i64) -> Result<bool, StoreError>;

    // ── Applications ─────────────────────────────────────────────────────

    async fn list_applications(&self) -> Result<Vec<Application>, StoreError>;
    async fn get_application(&self, id: i64) -> Result<Option<Application>, StoreError>;
    async fn create_application(&self, app: NewApplication) -> Result<Application, StoreError>;
    async fn count_applications(&self, user_id: i64, job_id: i64) -> Result<i64, StoreError>;
    async fn update_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, StoreError>;
    async fn delete_application(&self, id: i64) -> Result<bool, StoreError>;

    // ── Employees & performances ─────────────────────────────────────────

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;
    async fn get_employee(&self, id: i64) -> Result<Option<Employee>, StoreError>;
    /// Applies the account side of the hire and inserts the employee record
    /// atomically: on failure neither the account change nor the record
    /// persists.
    async fn create_employee(&self, employee: NewEmployee)
        -> Result<(User, Employee), StoreError>;
    async fn update_employee(
        &self,
        id: i64,
        changes: EmployeeFields,
    ) -> Result<Option<Employee>, StoreError>;
    async fn delete_employee(&self, id: i64) -> Result<bool, StoreError>;

    async fn list_performances(&self, employee_id: i64) -> Result<Vec<Performance>, StoreError>;
    async fn create_performance(
        &self,
        employee_id: i64,
        fields: PerformanceFields,
    ) -> Result<Performance, StoreError>;
    async fn update_performance(
        &self,
        employee_id: i64,
        id: i64,
        changes: PerformanceFields,
    ) -> Result<Option<Performance>, StoreError>;
    async fn delete_performance(&self, employee_id: i64, id: i64) -> Result<bool, StoreError>;

    // ── Profiles & experiences ───────────────────────────────────────────

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError>;
    async fn get_profile(&self, id: i64) -> Result<Option<Profile>, StoreError>;
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, StoreError>;
    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileFields,
    ) -> Result<Option<Profile>, StoreError>;
    async fn delete_profile(&self, id: i64) -> Result<bool, StoreError>;

    async fn list_experiences(&self, profile_id: i64) -> Result<Vec<Experience>, StoreError>;
    async fn create_experience(
        &self,
        profile_id: i64,
        fields: ExperienceFields,
    ) -> Result<Experience, StoreError>;
    async fn update_experience(
        &self,
        profile_id: i64,
        id: i64,
        changes: ExperienceFields,
    ) -> Result<Option<Experience>, StoreError>;
    async fn delete_experience(&self, profile_id: i64, id: i64) -> Result<bool, StoreError>;
}
