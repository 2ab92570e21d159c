// src/db/org_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::org::{Organization, RelatedOption},
    services::scope::ScopeFilter,
};

// O repositório de organizações, responsável por todas as interações
// com a tabela 'organizations'.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria uma organização. Aceita um executor (pool ou transação) para
    /// poder participar do setup inicial, que é transacional.
    pub async fn create<'e, E>(&self, executor: E, name: &str) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    // O nome é a chave de resolução do sistema inteiro;
                    // duplicado vira conflito, não "segundo registro".
                    return AppError::OrganizationNameTaken(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let maybe_org = sqlx::query_as::<_, Organization>(
            "SELECT id, name, created_at, updated_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_org)
    }

    /// Busca por nome. Com a constraint UNIQUE, o resultado é determinístico.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Organization>, AppError> {
        let maybe_org = sqlx::query_as::<_, Organization>(
            "SELECT id, name, created_at, updated_at FROM organizations WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_org)
    }

    /// Lista organizações sob o filtro de escopo.
    /// Na tabela de organizações o filtro incide sobre o próprio id:
    /// um usuário comum só enxerga a organização da qual faz parte.
    pub async fn list(&self, filter: &ScopeFilter) -> Result<Vec<Organization>, AppError> {
        let orgs = match filter.organization() {
            Some(org_id) => {
                sqlx::query_as::<_, Organization>(
                    "SELECT id, name, created_at, updated_at FROM organizations WHERE id = $1",
                )
                .bind(org_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Organization>(
                    "SELECT id, name, created_at, updated_at FROM organizations ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(orgs)
    }

    /// Opções para o seletor do campo organização.
    pub async fn options(&self, filter: &ScopeFilter) -> Result<Vec<RelatedOption>, AppError> {
        let options = match filter.organization() {
            Some(org_id) => {
                sqlx::query_as::<_, RelatedOption>(
                    "SELECT id, name FROM organizations WHERE id = $1",
                )
                .bind(org_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RelatedOption>(
                    "SELECT id, name FROM organizations ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(options)
    }
}
