// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados.
// Todo usuário pertence a exatamente UMA organização (organization_id é NOT NULL).
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    // Controle total do site; não deve ser dado a clientes.
    // Preferimos um bit de segurança específico a reutilizar is_superuser.
    pub is_root: bool,
    pub is_staff: bool,
    pub is_superuser: bool,

    pub organization_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para o setup inicial (primeiro usuário = root)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetupPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "root@exemplo.com")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para criar um usuário pela administração.
// organizationId é opcional: se ausente, usamos a organização de quem criou.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub organization_id: Option<Uuid>,
}

// Dados para editar um usuário pela administração.
// Campos fora dos grupos permitidos para quem chama são REJEITADOS
// (nunca aplicados em silêncio).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub organization_id: Option<Uuid>,
    pub is_root: Option<bool>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_payload_rejects_bad_email() {
        let payload = SetupPayload {
            email: "nao-e-email".into(),
            password: "secreta".into(),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn setup_payload_rejects_short_password() {
        let payload = SetupPayload {
            email: "root@exemplo.com".into(),
            password: "abc".into(),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn update_payload_fields_are_all_optional() {
        let payload = UpdateUserPayload::default();
        assert!(payload.validate().is_ok());
    }
}
