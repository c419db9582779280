pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::{applications, auth, chatbot, employees, jobs, profiles, users};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        // Auth
        .route("/api/auth/ping", get(auth::handlers::handle_ping))
        .route("/api/auth/register", post(auth::handlers::handle_register))
        .route("/api/auth/login", post(auth::handlers::handle_login))
        .route("/api/auth/me", get(auth::handlers::handle_me))
        .route("/api/auth/users/basic", get(auth::handlers::handle_users_basic))
        .route(
            "/api/auth/google-login",
            get(auth::handlers::handle_google_login),
        )
        .route(
            "/api/auth/google/callback",
            get(auth::handlers::handle_google_callback),
        )
        // Jobs
        .route(
            "/api/jobs",
            get(jobs::handlers::handle_list_jobs).post(jobs::handlers::handle_create_job),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::handlers::handle_get_job)
                .put(jobs::handlers::handle_update_job)
                .delete(jobs::handlers::handle_delete_job),
        )
        // Applications
        .route(
            "/api/applications",
            get(applications::handlers::handle_list_applications)
                .post(applications::handlers::handle_create_application),
        )
        .route(
            "/api/applications/:id",
            get(applications::handlers::handle_get_application)
                .put(applications::handlers::handle_update_application)
                .delete(applications::handlers::handle_delete_application),
        )
        // Employees & performances
        .route(
            "/api/employees",
            get(employees::handlers::handle_list_employees)
                .post(employees::handlers::handle_create_employee),
        )
        .route(
            "/api/employees/:id",
            get(employees::handlers::handle_get_employee)
                .put(employees::handlers::handle_update_employee)
                .delete(employees::handlers::handle_delete_employee),
        )
        .route(
            "/api/employees/:id/performances",
            post(employees::handlers::handle_create_performance),
        )
        .route(
            "/api/employees/:id/performances/:perf_id",
            put(employees::handlers::handle_update_performance)
                .delete(employees::handlers::handle_delete_performance),
        )
        // Profiles & experiences
        .route(
            "/api/profiles",
            get(profiles::handlers::handle_list_profiles)
                .post(profiles::handlers::handle_create_profile),
        )
        .route(
            "/api/profiles/:id",
            get(profiles::handlers::handle_get_profile)
                .put(profiles::handlers::handle_update_profile)
                .delete(profiles::handlers::handle_delete_profile),
        )
        .route(
            "/api/profiles/:id/experiences",
            post(profiles::handlers::handle_create_experience),
        )
        .route(
            "/api/profiles/:id/experiences/:exp_id",
            put(profiles::handlers::handle_update_experience)
                .delete(profiles::handlers::handle_delete_experience),
        )
        // Users
        .route(
            "/api/users",
            get(users::handlers::handle_list_users).post(users::handlers::handle_create_user),
        )
        .route("/api/users/health", get(users::handlers::handle_users_health))
        .route(
            "/api/users/:id",
            get(users::handlers::handle_get_user)
                .patch(users::handlers::handle_update_user)
                .delete(users::handlers::handle_delete_user),
        )
        // Chatbot
        .route("/api/chatbot/ask", post(chatbot::handlers::handle_ask))
        .with_state(state)
}
