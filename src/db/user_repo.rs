// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User, services::scope::ScopeFilter};

const USER_COLUMNS: &str = "id, email, password_hash, is_root, is_staff, is_superuser, \
                            organization_id, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    /// Busca um usuário pelo ID DENTRO do escopo do chamador.
    /// Um usuário de outra organização simplesmente "não existe" para
    /// quem não é root.
    pub async fn find_scoped(
        &self,
        id: Uuid,
        filter: &ScopeFilter,
    ) -> Result<Option<User>, AppError> {
        let maybe_user = match filter.organization() {
            Some(org_id) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND organization_id = $2"
                ))
                .bind(id)
                .bind(org_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => self.find_by_id(id).await?,
        };
        Ok(maybe_user)
    }

    /// Lista usuários sob o filtro de escopo (a listagem da administração).
    pub async fn list(&self, filter: &ScopeFilter) -> Result<Vec<User>, AppError> {
        let users = match filter.organization() {
            Some(org_id) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE organization_id = $1 ORDER BY email"
                ))
                .bind(org_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY email"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(users)
    }

    /// Quantos usuários existem no total (o setup inicial só roda com zero).
    pub async fn count_all(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    // Cria um novo usuário no banco de dados.
    // A organização é obrigatória (NOT NULL no banco): não existe usuário
    // sem organização em momento algum.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        organization_id: Uuid,
        is_root: bool,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, organization_id, is_root, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(organization_id)
        .bind(is_root)
        .bind(is_staff)
        .bind(is_superuser)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if let Some(constraint) = db_err.constraint() {
                        return match constraint {
                            // O nome padrão que o Postgres cria para "UNIQUE" na coluna email
                            "users_email_key" => AppError::EmailAlreadyExists,
                            // Fallback (caso adicione outras chaves únicas no futuro)
                            _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                        };
                    }
                }
            }
            e.into()
        })
    }

    /// Regrava um usuário inteiro. O serviço já montou o `User` final
    /// depois de aplicar a política de campos editáveis.
    pub async fn update_user(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = $2,
                password_hash = $3,
                is_root = $4,
                is_staff = $5,
                is_superuser = $6,
                organization_id = $7,
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_root)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }
}
