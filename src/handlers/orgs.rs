// src/handlers/orgs.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::org::{CreateOrganizationPayload, Organization},
};

// GET /api/admin/organizations
// Root enxerga todas as organizações; um usuário comum, apenas a sua.
#[utoipa::path(
    get,
    path = "/api/admin/organizations",
    tag = "Organizações",
    responses(
        (status = 200, description = "Organizações visíveis para o chamador", body = Vec<Organization>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_organizations(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.context();
    let orgs = app_state.gateway_service.organization_list(&caller).await?;
    Ok((StatusCode::OK, Json(orgs)))
}

// POST /api/admin/organizations
#[utoipa::path(
    post,
    path = "/api/admin/organizations",
    tag = "Organizações",
    request_body = CreateOrganizationPayload,
    responses(
        (status = 201, description = "Organização criada", body = Organization),
        (status = 403, description = "Apenas root cria organizações"),
        (status = 409, description = "Nome já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_organization(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateOrganizationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let caller = user.context();
    let org = app_state
        .directory_service
        .create_organization(&caller, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(org)))
}
