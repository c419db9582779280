use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::application::{Application, ApplicationStatus};
use crate::models::employee::{Employee, EmployeeFields, Performance, PerformanceFields};
use crate::models::job::{Job, JobFields};
use crate::models::profile::{Experience, ExperienceFields, Profile, ProfileFields};
use crate::models::user::{CandidateSummary, User};
use crate::store::{
    HireAccount, NewApplication, NewEmployee, NewProfile, NewUser, Page, PageRequest, Store,
    StoreError, UserChanges,
};

const EMPLOYEE_SELECT: &str = r#"
    SELECT e.id, e.user_id,
           TRIM(CONCAT(u.first_name, ' ', u.last_name)) AS name,
           u.email, e.job_title, e.department, e.job_location, e.photo, e.hired_at
    FROM employees e
    LEFT JOIN users u ON u.id = e.user_id
"#;

const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.user_id, u.first_name, u.last_name, u.email,
           p.phone, p.location, p.summary, p.completeness
    FROM profiles p
    LEFT JOIN users u ON u.id = p.user_id
"#;

/// Inserts the account and, when it carries a phone, its first profile.
async fn insert_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &NewUser,
) -> Result<User, StoreError> {
    let created: User = sqlx::query_as(
        r#"
        INSERT INTO users (first_name, last_name, company_name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.company_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .fetch_one(&mut **tx)
    .await?;

    if let Some(phone) = &user.phone {
        sqlx::query("INSERT INTO profiles (user_id, phone) VALUES ($1, $2)")
            .bind(created.id)
            .bind(phone)
            .execute(&mut **tx)
            .await?;
    }
    Ok(created)
}

/// [`Store`] backed by the PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;
        let created = insert_user(&mut tx, &user).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as("SELECT * FROM users ORDER BY id DESC LIMIT $1 OFFSET $2")
            .bind(i64::from(page.per_page))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page { items, total })
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, StoreError> {
        Ok(sqlx::query_as(
            r#"
            SELECT u.id, u.first_name, u.last_name, u.email,
                   (SELECT p.phone FROM profiles p
                    WHERE p.user_id = u.id ORDER BY p.id LIMIT 1) AS phone,
                   (SELECT e.id FROM employees e
                    WHERE e.user_id = u.id ORDER BY e.id LIMIT 1) AS employee_id
            FROM users u
            WHERE u.role = 'candidate'
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let clear_or_set_company = changes.company_name.is_some();

        Ok(sqlx::query_as(
            r#"
            UPDATE users SET
                first_name    = COALESCE($2, first_name),
                last_name     = COALESCE($3, last_name),
                company_name  = CASE WHEN $4 THEN $5 ELSE company_name END,
                email         = COALESCE($6, email),
                password_hash = COALESCE($7, password_hash),
                role          = COALESCE($8, role)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(clear_or_set_company)
        .bind(changes.company_name.flatten())
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn user_phone(&self, user_id: i64) -> Result<Option<String>, StoreError> {
        let phone: Option<Option<String>> =
            sqlx::query_scalar("SELECT phone FROM profiles WHERE user_id = $1 ORDER BY id LIMIT 1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(phone.flatten())
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM jobs ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_job(&self, id: i64) -> Result<Option<Job>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_job(&self, job: JobFields) -> Result<Job, StoreError> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO jobs (title, description, company, location, job_type, salary, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(job.title)
        .bind(job.description)
        .bind(job.company)
        .bind(job.location)
        .bind(job.job_type)
        .bind(job.salary)
        .bind(job.tags)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_job(&self, id: i64, changes: JobFields) -> Result<Option<Job>, StoreError> {
        Ok(sqlx::query_as(
            r#"
            UPDATE jobs SET
                title       = COALESCE($2, title),
                description = COALESCE($3, description),
                company     = COALESCE($4, company),
                location    = COALESCE($5, location),
                job_type    = COALESCE($6, job_type),
                salary      = COALESCE($7, salary),
                tags        = COALESCE($8, tags)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.company)
        .bind(changes.location)
        .bind(changes.job_type)
        .bind(changes.salary)
        .bind(changes.tags)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_job(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM applications ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_application(&self, id: i64) -> Result<Option<Application>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_application(&self, app: NewApplication) -> Result<Application, StoreError> {
        Ok(sqlx::query_as(
            "INSERT INTO applications (user_id, job_id, status) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(app.user_id)
        .bind(app.job_id)
        .bind(app.status.as_str())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn count_applications(&self, user_id: i64, job_id: i64) -> Result<i64, StoreError> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE user_id = $1 AND job_id = $2")
                .bind(user_id)
                .bind(job_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn update_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, StoreError> {
        Ok(
            sqlx::query_as("UPDATE applications SET status = $2 WHERE id = $1 RETURNING *")
                .bind(id)
                .bind(status.as_str())
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_application(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(sqlx::query_as(&format!("{EMPLOYEE_SELECT} ORDER BY e.id"))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_employee(&self, id: i64) -> Result<Option<Employee>, StoreError> {
        Ok(sqlx::query_as(&format!("{EMPLOYEE_SELECT} WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_employee(
        &self,
        employee: NewEmployee,
    ) -> Result<(User, Employee), StoreError> {
        let NewEmployee { account, fields } = employee;
        let mut tx = self.pool.begin().await?;

        let user: User = match account {
            HireAccount::Existing { user_id, promote } => sqlx::query_as(
                r#"
                UPDATE users
                SET role = CASE WHEN $2 THEN 'employee' ELSE role END
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(promote)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::MissingReference(format!("users.id = {user_id}")))?,
            HireAccount::New(new_user) => insert_user(&mut tx, &new_user).await?,
        };

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO employees (user_id, job_title, department, job_location, photo)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user.id)
        .bind(fields.job_title)
        .bind(fields.department)
        .bind(fields.job_location)
        .bind(fields.photo)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let employee = self
            .get_employee(id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        Ok((user, employee))
    }

    async fn update_employee(
        &self,
        id: i64,
        changes: EmployeeFields,
    ) -> Result<Option<Employee>, StoreError> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE employees SET
                job_title    = COALESCE($2, job_title),
                department   = COALESCE($3, department),
                job_location = COALESCE($4, job_location),
                photo        = COALESCE($5, photo)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(changes.job_title)
        .bind(changes.department)
        .bind(changes.job_location)
        .bind(changes.photo)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.get_employee(id).await,
            None => Ok(None),
        }
    }

    async fn delete_employee(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_performances(&self, employee_id: i64) -> Result<Vec<Performance>, StoreError> {
        Ok(
            sqlx::query_as("SELECT * FROM performances WHERE employee_id = $1 ORDER BY id")
                .bind(employee_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn create_performance(
        &self,
        employee_id: i64,
        fields: PerformanceFields,
    ) -> Result<Performance, StoreError> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO performances (employee_id, metric, value, recorded_on)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(fields.metric)
        .bind(fields.value)
        .bind(fields.date)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_performance(
        &self,
        employee_id: i64,
        id: i64,
        changes: PerformanceFields,
    ) -> Result<Option<Performance>, StoreError> {
        Ok(sqlx::query_as(
            r#"
            UPDATE performances SET
                metric      = COALESCE($3, metric),
                value       = COALESCE($4, value),
                recorded_on = COALESCE($5, recorded_on)
            WHERE employee_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(id)
        .bind(changes.metric)
        .bind(changes.value)
        .bind(changes.date)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_performance(&self, employee_id: i64, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM performances WHERE employee_id = $1 AND id = $2")
            .bind(employee_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(sqlx::query_as(&format!("{PROFILE_SELECT} ORDER BY p.id"))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_profile(&self, id: i64) -> Result<Option<Profile>, StoreError> {
        Ok(sqlx::query_as(&format!("{PROFILE_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, StoreError> {
        let NewProfile { user_id, fields } = profile;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO profiles (user_id, phone, location, summary, completeness)
            VALUES ($1, $2, $3, $4, COALESCE($5, 0))
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(fields.phone)
        .bind(fields.location)
        .bind(fields.summary)
        .bind(fields.completeness)
        .fetch_one(&self.pool)
        .await?;

        self.get_profile(id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileFields,
    ) -> Result<Option<Profile>, StoreError> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE profiles SET
                phone        = COALESCE($2, phone),
                location     = COALESCE($3, location),
                summary      = COALESCE($4, summary),
                completeness = COALESCE($5, completeness)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(changes.phone)
        .bind(changes.location)
        .bind(changes.summary)
        .bind(changes.completeness)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.get_profile(id).await,
            None => Ok(None),
        }
    }

    async fn delete_profile(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_experiences(&self, profile_id: i64) -> Result<Vec<Experience>, StoreError> {
        Ok(
            sqlx::query_as("SELECT * FROM experiences WHERE profile_id = $1 ORDER BY id")
                .bind(profile_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn create_experience(
        &self,
        profile_id: i64,
        fields: ExperienceFields,
    ) -> Result<Experience, StoreError> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO experiences (profile_id, title, company, start_date, end_date, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(fields.title)
        .bind(fields.company)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.description)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_experience(
        &self,
        profile_id: i64,
        id: i64,
        changes: ExperienceFields,
    ) -> Result<Option<Experience>, StoreError> {
        Ok(sqlx::query_as(
            r#"
            UPDATE experiences SET
                title       = COALESCE($3, title),
                company     = COALESCE($4, company),
                start_date  = COALESCE($5, start_date),
                end_date    = COALESCE($6, end_date),
                description = COALESCE($7, description)
            WHERE profile_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(id)
        .bind(changes.title)
        .bind(changes.company)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(changes.description)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_experience(&self, profile_id: i64, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM experiences WHERE profile_id = $1 AND id = $2")
            .bind(profile_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
