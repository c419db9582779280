//! Resolves the account an employee record belongs to.
//!
//! A hire either names an existing user by id, names one by email, or
//! describes a brand-new person. Candidates are promoted to `employee` on
//! hire; HR and existing employees keep their role.

use serde::Deserialize;

use crate::auth::password::hash_password;
use crate::errors::AppError;
use crate::models::employee::EmployeeFields;
use crate::models::user::{normalize_email, Role};
use crate::store::{HireAccount, NewUser, Store};
use crate::validation::{non_blank, Required};

#[derive(Debug, Default, Deserialize)]
pub struct HireRequest {
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub fields: EmployeeFields,
}

/// Decides the account side of a hire. Performs lookups and validation
/// only; the returned plan is applied by `Store::create_employee`.
pub async fn plan_hire(store: &dyn Store, req: &HireRequest) -> Result<HireAccount, AppError> {
    let existing = match req.user_id {
        Some(user_id) => store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?,
        None => {
            let email = non_blank(req.email.clone())
                .map(|e| normalize_email(&e))
                .ok_or_else(|| {
                    AppError::Validation("Either user_id or email is required".to_string())
                })?;
            match store.find_user_by_email(&email).await? {
                Some(user) => user,
                None => return new_account(req, email),
            }
        }
    };

    Ok(HireAccount::Existing {
        user_id: existing.id,
        promote: existing.role == Role::Candidate,
    })
}

fn new_account(req: &HireRequest, email: String) -> Result<HireAccount, AppError> {
    let mut required = Required::default();
    let first_name = required.text("first_name", req.first_name.as_deref());
    let last_name = required.text("last_name", req.last_name.as_deref());
    let password = required.secret("password", req.password.as_deref());
    required.finish()?;

    Ok(HireAccount::New(NewUser {
        first_name,
        last_name,
        company_name: None,
        email,
        password_hash: Some(hash_password(&password)?),
        role: Role::Employee,
        phone: non_blank(req.phone.clone()),
    }))
}
