// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Regra geral: tudo que envolve escopo de organização "falha fechado" —
// na dúvida, negamos o acesso em vez de vazar dados de outro tenant.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Já existe uma organização chamada '{0}'")]
    OrganizationNameTaken(String),

    // O setup inicial só pode rodar uma vez (enquanto não há usuários).
    #[error("O sistema já foi inicializado")]
    AlreadyBootstrapped,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Permissão negada: {0}")]
    PermissionDenied(String),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Organização não encontrada")]
    OrganizationNotFound,

    #[error("Registro não encontrado")]
    RecordNotFound,

    #[error("Tipo de entidade desconhecido: '{0}'")]
    UnknownEntity(String),

    // Campo de referência sem mapeamento no registro de entidades.
    // Antigamente isso era "adivinhado" pelo nome do campo; agora é erro.
    #[error("Campo de referência '{field}' não mapeado para a entidade '{entity}'")]
    UnknownRelatedField { entity: String, field: String },

    #[error("Violação de chave única: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::OrganizationNameTaken(ref name) => (
                StatusCode::CONFLICT,
                format!("Já existe uma organização chamada '{}'.", name),
            ),
            AppError::AlreadyBootstrapped => (
                StatusCode::CONFLICT,
                "O sistema já foi inicializado; use a administração para criar usuários.".to_string(),
            ),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::PermissionDenied(ref detail) => {
                (StatusCode::FORBIDDEN, format!("Permissão negada: {}.", detail))
            }
            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::OrganizationNotFound => {
                (StatusCode::NOT_FOUND, "Organização não encontrada.".to_string())
            }
            AppError::RecordNotFound => {
                (StatusCode::NOT_FOUND, "Registro não encontrado.".to_string())
            }
            AppError::UnknownEntity(ref slug) => (
                StatusCode::NOT_FOUND,
                format!("Tipo de entidade desconhecido: '{}'.", slug),
            ),
            AppError::UnknownRelatedField { ref entity, ref field } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!(
                    "O campo '{}' da entidade '{}' não tem mapeamento configurado.",
                    field, entity
                ),
            ),
            AppError::UniqueConstraintViolation(ref constraint) => (
                StatusCode::CONFLICT,
                format!("Violação de chave única ({}).", constraint),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::PermissionDenied("campo 'is_root'".into())
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::UnknownRelatedField {
                entity: "gadget".into(),
                field: "cog".into()
            }
            .into_response()
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::UnknownEntity("thing".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn conflict_errors_map_to_409() {
        assert_eq!(
            AppError::OrganizationNameTaken("Acme".into())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::AlreadyBootstrapped.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::EmailAlreadyExists.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn auth_errors_map_to_401() {
        assert_eq!(
            AppError::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
