// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        admin::UserFormDescriptor,
        auth::{CreateUserPayload, UpdateUserPayload, User},
    },
};

// GET /api/admin/users
// A listagem de usuários também é escopada: quem não é root só vê
// os usuários da própria organização.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Usuários",
    responses(
        (status = 200, description = "Usuários visíveis para o chamador", body = Vec<User>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.context();
    let users = app_state.gateway_service.user_list(&caller).await?;
    Ok((StatusCode::OK, Json(users)))
}

// POST /api/admin/users
// Um usuário comum criando usuários: eles nascem na organização dele,
// ignorando qualquer organizationId do payload.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Usuários",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 404, description = "Organização pedida não existe"),
        (status = 409, description = "E-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let caller = user.context();
    let created = app_state
        .directory_service
        .create_user(&caller, &payload.email, &payload.password, payload.organization_id)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/admin/users/form
// Os grupos de campos que o chamador pode editar num usuário, com a
// organização pré-preenchida e as opções do seletor já filtradas.
#[utoipa::path(
    get,
    path = "/api/admin/users/form",
    tag = "Usuários",
    responses(
        (status = 200, description = "Descritor do formulário de usuário", body = UserFormDescriptor)
    ),
    security(("api_jwt" = []))
)]
pub async fn user_form(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.context();
    let form = app_state.gateway_service.user_form(&caller).await?;
    Ok((StatusCode::OK, Json(form)))
}

// PUT /api/admin/users/{id}
// Campos fora dos grupos do chamador são rejeitados (403), nunca
// aplicados em silêncio. Alvo fora do escopo responde 404.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Usuários",
    request_body = UpdateUserPayload,
    params(("id" = Uuid, Path, description = "ID do usuário alvo")),
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 403, description = "Campo não editável para o chamador"),
        (status = 404, description = "Usuário fora do escopo do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let caller = user.context();
    let updated = app_state
        .gateway_service
        .update_user(&caller, id, payload)
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}
