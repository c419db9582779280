//! In-memory [`Store`] for router tests. Mirrors the Postgres schema rules:
//! unique emails, foreign-key checks and cascading deletes.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::application::{Application, ApplicationStatus};
use crate::models::employee::{
    display_name, Employee, EmployeeFields, Performance, PerformanceFields,
};
use crate::models::job::{Job, JobFields};
use crate::models::profile::{Experience, ExperienceFields, Profile, ProfileFields};
use crate::models::user::{CandidateSummary, Role, User};
use crate::store::{
    HireAccount, NewApplication, NewEmployee, NewProfile, NewUser, Page, PageRequest, Store,
    StoreError, UserChanges,
};

#[derive(Debug, Clone)]
struct EmployeeRow {
    id: i64,
    user_id: i64,
    fields: EmployeeFields,
    hired_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ProfileRow {
    id: i64,
    user_id: i64,
    phone: Option<String>,
    location: Option<String>,
    summary: Option<String>,
    completeness: i32,
}

#[derive(Default)]
struct Tables {
    sequences: BTreeMap<&'static str, i64>,
    users: BTreeMap<i64, User>,
    jobs: BTreeMap<i64, Job>,
    applications: BTreeMap<i64, Application>,
    employees: BTreeMap<i64, EmployeeRow>,
    performances: BTreeMap<i64, Performance>,
    profiles: BTreeMap<i64, ProfileRow>,
    experiences: BTreeMap<i64, Experience>,
}

impl Tables {
    /// Per-table sequence starting at 1; ids are never reused, like BIGSERIAL.
    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }

    fn employee_view(&self, row: &EmployeeRow) -> Employee {
        let user = self.users.get(&row.user_id);
        Employee {
            id: row.id,
            user_id: row.user_id,
            name: user
                .map(|u| display_name(&u.first_name, &u.last_name))
                .unwrap_or_default(),
            email: user.map(|u| u.email.clone()),
            job_title: row.fields.job_title.clone(),
            department: row.fields.department.clone(),
            job_location: row.fields.job_location.clone(),
            photo: row.fields.photo.clone(),
            hired_at: row.hired_at,
        }
    }

    fn profile_view(&self, row: &ProfileRow) -> Profile {
        let user = self.users.get(&row.user_id);
        Profile {
            id: row.id,
            user_id: row.user_id,
            first_name: user.map(|u| u.first_name.clone()),
            last_name: user.map(|u| u.last_name.clone()),
            email: user.map(|u| u.email.clone()),
            phone: row.phone.clone(),
            location: row.location.clone(),
            summary: row.summary.clone(),
            completeness: row.completeness,
        }
    }

    fn insert_user(&mut self, user: NewUser) -> Result<User, StoreError> {
        if self.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("users.email = {}", user.email)));
        }

        let created = User {
            id: self.next_id("users"),
            first_name: user.first_name,
            last_name: user.last_name,
            company_name: user.company_name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        self.users.insert(created.id, created.clone());

        if let Some(phone) = user.phone {
            let id = self.next_id("profiles");
            self.profiles.insert(
                id,
                ProfileRow {
                    id,
                    user_id: created.id,
                    phone: Some(phone),
                    location: None,
                    summary: None,
                    completeness: 0,
                },
            );
        }
        Ok(created)
    }

    fn require_user(&self, user_id: i64) -> Result<(), StoreError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference(format!("users.id = {user_id}")))
        }
    }

    fn remove_employee(&mut self, id: i64) -> bool {
        self.performances.retain(|_, p| p.employee_id != id);
        self.employees.remove(&id).is_some()
    }

    fn remove_profile(&mut self, id: i64) -> bool {
        self.experiences.retain(|_, e| e.profile_id != id);
        self.profiles.remove(&id).is_some()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.tables().insert_user(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, StoreError> {
        let t = self.tables();
        let items = t
            .users
            .values()
            .rev()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.per_page as usize)
            .cloned()
            .collect();
        Ok(Page {
            items,
            total: t.users.len() as i64,
        })
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, StoreError> {
        let t = self.tables();
        Ok(t.users
            .values()
            .filter(|u| u.role == Role::Candidate)
            .map(|u| CandidateSummary {
                id: u.id,
                first_name: u.first_name.clone(),
                last_name: u.last_name.clone(),
                email: u.email.clone(),
                phone: t
                    .profiles
                    .values()
                    .find(|p| p.user_id == u.id)
                    .and_then(|p| p.phone.clone()),
                employee_id: t
                    .employees
                    .values()
                    .find(|e| e.user_id == u.id)
                    .map(|e| e.id),
            })
            .collect())
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut t = self.tables();
        if let Some(email) = &changes.email {
            if t.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Conflict(format!("users.email = {email}")));
            }
        }

        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.first_name {
            user.first_name = v;
        }
        if let Some(v) = changes.last_name {
            user.last_name = v;
        }
        if let Some(v) = changes.company_name {
            user.company_name = v;
        }
        if let Some(v) = changes.email {
            user.email = v;
        }
        if let Some(v) = changes.password_hash {
            user.password_hash = Some(v);
        }
        if let Some(v) = changes.role {
            user.role = v;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables();
        let employees: Vec<i64> = t
            .employees
            .values()
            .filter(|e| e.user_id == id)
            .map(|e| e.id)
            .collect();
        for employee_id in employees {
            t.remove_employee(employee_id);
        }
        let profiles: Vec<i64> = t
            .profiles
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for profile_id in profiles {
            t.remove_profile(profile_id);
        }
        t.applications.retain(|_, a| a.user_id != id);
        Ok(t.users.remove(&id).is_some())
    }

    async fn user_phone(&self, user_id: i64) -> Result<Option<String>, StoreError> {
        Ok(self
            .tables()
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .and_then(|p| p.phone.clone()))
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.tables().jobs.values().cloned().collect())
    }

    async fn get_job(&self, id: i64) -> Result<Option<Job>, StoreError> {
        Ok(self.tables().jobs.get(&id).cloned())
    }

    async fn create_job(&self, job: JobFields) -> Result<Job, StoreError> {
        let mut t = self.tables();
        let created = Job {
            id: t.next_id("jobs"),
            title: job.title.unwrap_or_default(),
            description: job.description,
            company: job.company,
            location: job.location,
            job_type: job.job_type,
            salary: job.salary,
            tags: job.tags,
            created_at: Utc::now(),
        };
        t.jobs.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_job(&self, id: i64, changes: JobFields) -> Result<Option<Job>, StoreError> {
        let mut t = self.tables();
        let Some(job) = t.jobs.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.title {
            job.title = v;
        }
        job.description = changes.description.or(job.description.take());
        job.company = changes.company.or(job.company.take());
        job.location = changes.location.or(job.location.take());
        job.job_type = changes.job_type.or(job.job_type.take());
        job.salary = changes.salary.or(job.salary.take());
        job.tags = changes.tags.or(job.tags.take());
        Ok(Some(job.clone()))
    }

    async fn delete_job(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables();
        t.applications.retain(|_, a| a.job_id != id);
        Ok(t.jobs.remove(&id).is_some())
    }

    async fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        Ok(self.tables().applications.values().cloned().collect())
    }

    async fn get_application(&self, id: i64) -> Result<Option<Application>, StoreError> {
        Ok(self.tables().applications.get(&id).cloned())
    }

    async fn create_application(&self, app: NewApplication) -> Result<Application, StoreError> {
        let mut t = self.tables();
        t.require_user(app.user_id)?;
        if !t.jobs.contains_key(&app.job_id) {
            return Err(StoreError::MissingReference(format!("jobs.id = {}", app.job_id)));
        }
        let created = Application {
            id: t.next_id("applications"),
            user_id: app.user_id,
            job_id: app.job_id,
            status: app.status,
            applied_at: Utc::now(),
        };
        t.applications.insert(created.id, created.clone());
        Ok(created)
    }

    async fn count_applications(&self, user_id: i64, job_id: i64) -> Result<i64, StoreError> {
        Ok(self
            .tables()
            .applications
            .values()
            .filter(|a| a.user_id == user_id && a.job_id == job_id)
            .count() as i64)
    }

    async fn update_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, StoreError> {
        let mut t = self.tables();
        Ok(t.applications.get_mut(&id).map(|a| {
            a.status = status;
            a.clone()
        }))
    }

    async fn delete_application(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables().applications.remove(&id).is_some())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let t = self.tables();
        Ok(t.employees.values().map(|e| t.employee_view(e)).collect())
    }

    async fn get_employee(&self, id: i64) -> Result<Option<Employee>, StoreError> {
        let t = self.tables();
        Ok(t.employees.get(&id).map(|e| t.employee_view(e)))
    }

    async fn create_employee(
        &self,
        employee: NewEmployee,
    ) -> Result<(User, Employee), StoreError> {
        let mut t = self.tables();
        let user = match employee.account {
            HireAccount::Existing { user_id, promote } => {
                let user = t
                    .users
                    .get_mut(&user_id)
                    .ok_or_else(|| StoreError::MissingReference(format!("users.id = {user_id}")))?;
                if promote {
                    user.role = Role::Employee;
                }
                user.clone()
            }
            HireAccount::New(new_user) => t.insert_user(new_user)?,
        };

        let row = EmployeeRow {
            id: t.next_id("employees"),
            user_id: user.id,
            fields: employee.fields,
            hired_at: Utc::now(),
        };
        let view = t.employee_view(&row);
        t.employees.insert(row.id, row);
        Ok((user, view))
    }

    async fn update_employee(
        &self,
        id: i64,
        changes: EmployeeFields,
    ) -> Result<Option<Employee>, StoreError> {
        let mut t = self.tables();
        let Some(row) = t.employees.get_mut(&id) else {
            return Ok(None);
        };
        let fields = &mut row.fields;
        fields.job_title = changes.job_title.or(fields.job_title.take());
        fields.department = changes.department.or(fields.department.take());
        fields.job_location = changes.job_location.or(fields.job_location.take());
        fields.photo = changes.photo.or(fields.photo.take());
        let row = row.clone();
        Ok(Some(t.employee_view(&row)))
    }

    async fn delete_employee(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables().remove_employee(id))
    }

    async fn list_performances(&self, employee_id: i64) -> Result<Vec<Performance>, StoreError> {
        Ok(self
            .tables()
            .performances
            .values()
            .filter(|p| p.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn create_performance(
        &self,
        employee_id: i64,
        fields: PerformanceFields,
    ) -> Result<Performance, StoreError> {
        let mut t = self.tables();
        if !t.employees.contains_key(&employee_id) {
            return Err(StoreError::MissingReference(format!(
                "employees.id = {employee_id}"
            )));
        }
        let created = Performance {
            id: t.next_id("performances"),
            employee_id,
            metric: fields.metric,
            value: fields.value,
            date: fields.date,
        };
        t.performances.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_performance(
        &self,
        employee_id: i64,
        id: i64,
        changes: PerformanceFields,
    ) -> Result<Option<Performance>, StoreError> {
        let mut t = self.tables();
        let Some(p) = t
            .performances
            .get_mut(&id)
            .filter(|p| p.employee_id == employee_id)
        else {
            return Ok(None);
        };
        p.metric = changes.metric.or(p.metric.take());
        p.value = changes.value.or(p.value.take());
        p.date = changes.date.or(p.date);
        Ok(Some(p.clone()))
    }

    async fn delete_performance(&self, employee_id: i64, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables();
        match t.performances.get(&id) {
            Some(p) if p.employee_id == employee_id => Ok(t.performances.remove(&id).is_some()),
            _ => Ok(false),
        }
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let t = self.tables();
        Ok(t.profiles.values().map(|p| t.profile_view(p)).collect())
    }

    async fn get_profile(&self, id: i64) -> Result<Option<Profile>, StoreError> {
        let t = self.tables();
        Ok(t.profiles.get(&id).map(|p| t.profile_view(p)))
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, StoreError> {
        let mut t = self.tables();
        t.require_user(profile.user_id)?;
        let row = ProfileRow {
            id: t.next_id("profiles"),
            user_id: profile.user_id,
            phone: profile.fields.phone,
            location: profile.fields.location,
            summary: profile.fields.summary,
            completeness: profile.fields.completeness.unwrap_or(0),
        };
        let view = t.profile_view(&row);
        t.profiles.insert(row.id, row);
        Ok(view)
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileFields,
    ) -> Result<Option<Profile>, StoreError> {
        let mut t = self.tables();
        let Some(row) = t.profiles.get_mut(&id) else {
            return Ok(None);
        };
        row.phone = changes.phone.or(row.phone.take());
        row.location = changes.location.or(row.location.take());
        row.summary = changes.summary.or(row.summary.take());
        if let Some(c) = changes.completeness {
            row.completeness = c;
        }
        let row = row.clone();
        Ok(Some(t.profile_view(&row)))
    }

    async fn delete_profile(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables().remove_profile(id))
    }

    async fn list_experiences(&self, profile_id: i64) -> Result<Vec<Experience>, StoreError> {
        Ok(self
            .tables()
            .experiences
            .values()
            .filter(|e| e.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn create_experience(
        &self,
        profile_id: i64,
        fields: ExperienceFields,
    ) -> Result<Experience, StoreError> {
        let mut t = self.tables();
        if !t.profiles.contains_key(&profile_id) {
            return Err(StoreError::MissingReference(format!(
                "profiles.id = {profile_id}"
            )));
        }
        let created = Experience {
            id: t.next_id("experiences"),
            profile_id,
            title: fields.title,
            company: fields.company,
            start_date: fields.start_date,
            end_date: fields.end_date,
            description: fields.description,
        };
        t.experiences.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_experience(
        &self,
        profile_id: i64,
        id: i64,
        changes: ExperienceFields,
    ) -> Result<Option<Experience>, StoreError> {
        let mut t = self.tables();
        let Some(e) = t
            .experiences
            .get_mut(&id)
            .filter(|e| e.profile_id == profile_id)
        else {
            return Ok(None);
        };
        e.title = changes.title.or(e.title.take());
        e.company = changes.company.or(e.company.take());
        e.start_date = changes.start_date.or(e.start_date);
        e.end_date = changes.end_date.or(e.end_date);
        e.description = changes.description.or(e.description.take());
        Ok(Some(e.clone()))
    }

    async fn delete_experience(&self, profile_id: i64, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables();
        match t.experiences.get(&id) {
            Some(e) if e.profile_id == profile_id => Ok(t.experiences.remove(&id).is_some()),
            _ => Ok(false),
        }
    }
}
