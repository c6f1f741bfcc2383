use axum::{
    extract::{FromRequest, Path, State},
    response::Html,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::GatewayError;
use crate::gateway::auth::SignedIn;
use crate::gateway::outcome::Outcome;
use crate::gateway::{GeneratedCv, LoginStatus, ShareLink};
use crate::models::{
    Assessment, Certificate, NewAssessment, NewCertificate, NewProject, Profile, ProfileUpdate,
    Project, ProjectUpdate,
};
use crate::state::AppState;

type OutcomeResult<T> = Result<Json<Outcome<T>>, GatewayError>;

/// JSON request body whose rejection is rendered as a failure outcome.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(GatewayError))]
pub struct JsonBody<T>(pub T);

fn success<T>(value: T) -> OutcomeResult<T> {
    Ok(Json(Outcome::Success(value)))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> OutcomeResult<SignedIn> {
    success(
        state
            .gateway
            .register(&req.email, &req.password, &req.full_name)
            .await?,
    )
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> OutcomeResult<SignedIn> {
    success(state.gateway.login(&req.email, &req.password).await?)
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(State(state): State<AppState>) -> OutcomeResult<()> {
    success(state.gateway.logout().await?)
}

/// GET /api/v1/auth/session
pub async fn handle_check_login(State(state): State<AppState>) -> Json<LoginStatus> {
    Json(state.gateway.check_login().await)
}

/// GET /api/v1/profile
pub async fn handle_get_profile(State(state): State<AppState>) -> Json<Option<Profile>> {
    Json(state.gateway.get_profile().await)
}

/// PATCH /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> OutcomeResult<()> {
    success(state.gateway.update_profile(&update).await?)
}

/// GET /api/v1/projects
pub async fn handle_list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.gateway.list_projects().await)
}

/// POST /api/v1/projects
pub async fn handle_add_project(
    State(state): State<AppState>,
    JsonBody(new): JsonBody<NewProject>,
) -> OutcomeResult<Project> {
    success(state.gateway.add_project(&new).await?)
}

/// PATCH /api/v1/projects/:id
pub async fn handle_update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(update): JsonBody<ProjectUpdate>,
) -> OutcomeResult<()> {
    success(state.gateway.update_project(id, &update).await?)
}

/// DELETE /api/v1/projects/:id
pub async fn handle_delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> OutcomeResult<()> {
    success(state.gateway.delete_project(id).await?)
}

/// GET /api/v1/certificates
pub async fn handle_list_certificates(State(state): State<AppState>) -> Json<Vec<Certificate>> {
    Json(state.gateway.list_certificates().await)
}

/// POST /api/v1/certificates
pub async fn handle_add_certificate(
    State(state): State<AppState>,
    JsonBody(new): JsonBody<NewCertificate>,
) -> OutcomeResult<Certificate> {
    success(state.gateway.add_certificate(&new).await?)
}

/// DELETE /api/v1/certificates/:id
pub async fn handle_delete_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> OutcomeResult<()> {
    success(state.gateway.delete_certificate(id).await?)
}

/// GET /api/v1/assessments
pub async fn handle_list_assessments(State(state): State<AppState>) -> Json<Vec<Assessment>> {
    Json(state.gateway.list_assessments().await)
}

/// POST /api/v1/assessments
pub async fn handle_add_assessment(
    State(state): State<AppState>,
    JsonBody(new): JsonBody<NewAssessment>,
) -> OutcomeResult<Assessment> {
    success(state.gateway.add_assessment(&new).await?)
}

/// DELETE /api/v1/assessments/:id
pub async fn handle_delete_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> OutcomeResult<()> {
    success(state.gateway.delete_assessment(id).await?)
}

/// GET /api/v1/portfolio-links
pub async fn handle_list_portfolio_links(State(state): State<AppState>) -> Json<Vec<ShareLink>> {
    Json(state.gateway.list_portfolio_links().await)
}

/// POST /api/v1/portfolio-links
pub async fn handle_create_portfolio_link(
    State(state): State<AppState>,
) -> OutcomeResult<ShareLink> {
    success(state.gateway.create_portfolio_link().await?)
}

/// GET /api/v1/cv
/// Serves the rendered CV as a standalone page for the UI to open in a new tab.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
) -> Result<Html<String>, GatewayError> {
    let GeneratedCv { html } = state.gateway.generate_cv().await?;
    Ok(Html(html))
}
