// src/handlers/entities.rs

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
        admin::ScopedFormDescriptor,
        org::{CreateScopedRecordPayload, RelatedOption, ScopedRecord},
    },
};

// As rotas genéricas da administração de entidades escopadas.
// O {entity} da URL é o slug do registro estático; slug desconhecido
// responde 404 antes de qualquer consulta.

// GET /api/admin/entities/{entity}
#[utoipa::path(
    get,
    path = "/api/admin/entities/{entity}",
    tag = "Entidades",
    params(("entity" = String, Path, description = "Slug da entidade (ex.: widget)")),
    responses(
        (status = 200, description = "Registros visíveis para o chamador", body = Vec<ScopedRecord>),
        (status = 404, description = "Entidade desconhecida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_records(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(entity): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.context();
    let records = app_state
        .gateway_service
        .list_entities(&caller, &entity)
        .await?;
    Ok((StatusCode::OK, Json(records)))
}

// GET /api/admin/entities/{entity}/{id}
#[utoipa::path(
    get,
    path = "/api/admin/entities/{entity}/{id}",
    tag = "Entidades",
    params(
        ("entity" = String, Path, description = "Slug da entidade"),
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    responses(
        (status = 200, description = "O registro", body = ScopedRecord),
        (status = 404, description = "Registro fora do escopo ou inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_record(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path((entity, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.context();
    let record = app_state
        .gateway_service
        .get_entity(&caller, &entity, id)
        .await?;
    Ok((StatusCode::OK, Json(record)))
}

// POST /api/admin/entities/{entity}
#[utoipa::path(
    post,
    path = "/api/admin/entities/{entity}",
    tag = "Entidades",
    request_body = CreateScopedRecordPayload,
    params(("entity" = String, Path, description = "Slug da entidade")),
    responses(
        (status = 201, description = "Registro criado na organização decidida pela política", body = ScopedRecord),
        (status = 404, description = "Entidade desconhecida")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_record(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(entity): Path<String>,
    Json(payload): Json<CreateScopedRecordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let caller = user.context();
    let record = app_state
        .gateway_service
        .create_entity(&caller, &entity, &payload.name, payload.organization_id)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

// GET /api/admin/entities/{entity}/form
#[utoipa::path(
    get,
    path = "/api/admin/entities/{entity}/form",
    tag = "Entidades",
    params(("entity" = String, Path, description = "Slug da entidade")),
    responses(
        (status = 200, description = "Descritor do formulário de criação", body = ScopedFormDescriptor),
        (status = 404, description = "Entidade desconhecida")
    ),
    security(("api_jwt" = []))
)]
pub async fn new_record_form(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(entity): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.context();
    let form = app_state.gateway_service.new_entity_form(&caller, &entity)?;
    Ok((StatusCode::OK, Json(form)))
}

// GET /api/admin/entities/{entity}/fields/{field}/options
// As opções de um seletor de campo de referência, já escopadas.
// Campo sem mapeamento no registro responde 422 (falha fechada).
#[utoipa::path(
    get,
    path = "/api/admin/entities/{entity}/fields/{field}/options",
    tag = "Entidades",
    params(
        ("entity" = String, Path, description = "Slug da entidade"),
        ("field" = String, Path, description = "Nome do campo de referência")
    ),
    responses(
        (status = 200, description = "Opções do seletor", body = Vec<RelatedOption>),
        (status = 422, description = "Campo sem mapeamento configurado")
    ),
    security(("api_jwt" = []))
)]
pub async fn field_options(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path((entity, field)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.context();
    let options = app_state
        .gateway_service
        .entity_field_options(&caller, &entity, &field)
        .await?;
    Ok((StatusCode::OK, Json(options)))
}
