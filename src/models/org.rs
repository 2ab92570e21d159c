// src/models/org.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. Organization (a fronteira de isolamento)
// ---
// Toda entidade escopada e todo usuário pertencem a exatamente uma.
// O nome é ÚNICO (constraint no banco): várias buscas são por nome,
// então nomes duplicados quebrariam a resolução de forma silenciosa.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. ScopedRecord (a forma comum das entidades escopadas)
// ---
// Toda entidade de negócio isolada por tenant carrega: nome + organização.
// As colunas extras de cada tabela (referências etc.) não entram na listagem.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopedRecord {
    pub id: Uuid,
    pub name: String,
    pub organization_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 3. RelatedOption (uma opção de um seletor de referência)
// ---
// O que o seletor de um campo de referência mostra: id + rótulo.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelatedOption {
    pub id: Uuid,
    pub name: String,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationPayload {
    #[validate(length(min = 1, message = "O nome da organização é obrigatório."))]
    #[schema(example = "Acme")]
    pub name: String,
}

// Criação de um registro escopado.
// organizationId só é respeitado para usuários root; para os demais,
// o registro SEMPRE nasce na organização de quem chamou.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScopedRecordPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub organization_id: Option<Uuid>,
}
