// src/db/scoped_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::org::{RelatedOption, ScopedRecord},
    registry::EntityDef,
    services::scope::ScopeFilter,
};

// Repositório genérico das entidades escopadas por organização.
// O nome da tabela vem SEMPRE do registro estático validado no boot
// (nunca da requisição), então o format! abaixo é seguro.
#[derive(Clone)]
pub struct ScopedEntityRepository {
    pool: PgPool,
}

impl ScopedEntityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lista os registros de uma entidade sob o filtro de escopo.
    pub async fn list(
        &self,
        def: &EntityDef,
        filter: &ScopeFilter,
    ) -> Result<Vec<ScopedRecord>, AppError> {
        let records = match filter.organization() {
            Some(org_id) => {
                sqlx::query_as::<_, ScopedRecord>(&format!(
                    "SELECT id, name, organization_id, created_at, updated_at \
                     FROM {} WHERE organization_id = $1 ORDER BY name",
                    def.table
                ))
                .bind(org_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ScopedRecord>(&format!(
                    "SELECT id, name, organization_id, created_at, updated_at \
                     FROM {} ORDER BY name",
                    def.table
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(records)
    }

    /// Busca um registro DENTRO do escopo. Fora do escopo = não existe.
    pub async fn find_scoped(
        &self,
        def: &EntityDef,
        id: Uuid,
        filter: &ScopeFilter,
    ) -> Result<Option<ScopedRecord>, AppError> {
        let record = match filter.organization() {
            Some(org_id) => {
                sqlx::query_as::<_, ScopedRecord>(&format!(
                    "SELECT id, name, organization_id, created_at, updated_at \
                     FROM {} WHERE id = $1 AND organization_id = $2",
                    def.table
                ))
                .bind(id)
                .bind(org_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ScopedRecord>(&format!(
                    "SELECT id, name, organization_id, created_at, updated_at \
                     FROM {} WHERE id = $1",
                    def.table
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(record)
    }

    /// Insere um registro. A organização já foi decidida pela política
    /// (não-root sempre cai na própria organização).
    pub async fn create(
        &self,
        def: &EntityDef,
        name: &str,
        organization_id: Uuid,
    ) -> Result<ScopedRecord, AppError> {
        let record = sqlx::query_as::<_, ScopedRecord>(&format!(
            "INSERT INTO {} (name, organization_id) VALUES ($1, $2) \
             RETURNING id, name, organization_id, created_at, updated_at",
            def.table
        ))
        .bind(name)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// Opções (id + nome) de uma tabela de entidade para um seletor de
    /// campo de referência, sob o filtro de escopo.
    pub async fn options(
        &self,
        table: &str,
        filter: &ScopeFilter,
    ) -> Result<Vec<RelatedOption>, AppError> {
        let options = match filter.organization() {
            Some(org_id) => {
                sqlx::query_as::<_, RelatedOption>(&format!(
                    "SELECT id, name FROM {} WHERE organization_id = $1 ORDER BY name",
                    table
                ))
                .bind(org_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RelatedOption>(&format!(
                    "SELECT id, name FROM {} ORDER BY name",
                    table
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(options)
    }
}
