pub mod handlers;
pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(handlers::handle_register))
        .route("/api/v1/auth/login", post(handlers::handle_login))
        .route("/api/v1/auth/logout", post(handlers::handle_logout))
        .route("/api/v1/auth/session", get(handlers::handle_check_login))
        // Profile
        .route(
            "/api/v1/profile",
            get(handlers::handle_get_profile).patch(handlers::handle_update_profile),
        )
        // Child records
        .route(
            "/api/v1/projects",
            get(handlers::handle_list_projects).post(handlers::handle_add_project),
        )
        .route(
            "/api/v1/projects/:id",
            patch(handlers::handle_update_project).delete(handlers::handle_delete_project),
        )
        .route(
            "/api/v1/certificates",
            get(handlers::handle_list_certificates).post(handlers::handle_add_certificate),
        )
        .route(
            "/api/v1/certificates/:id",
            delete(handlers::handle_delete_certificate),
        )
        .route(
            "/api/v1/assessments",
            get(handlers::handle_list_assessments).post(handlers::handle_add_assessment),
        )
        .route(
            "/api/v1/assessments/:id",
            delete(handlers::handle_delete_assessment),
        )
        // Sharing and export
        .route(
            "/api/v1/portfolio-links",
            get(handlers::handle_list_portfolio_links)
                .post(handlers::handle_create_portfolio_link),
        )
        .route("/api/v1/cv", get(handlers::handle_generate_cv))
        .with_state(state)
}
