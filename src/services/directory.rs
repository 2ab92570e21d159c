// src/services/directory.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, UserRepository},
    models::{auth::User, org::Organization},
    services::{auth::hash_password, scope::{CallerContext, ScopePolicy}},
};

// Nome fixo da organização criada no setup para abrigar o primeiro usuário.
// Com a organização obrigatória em todo usuário, o primeiro precisa de uma
// organização que ainda não existe — então ela nasce junto com ele.
const ROOT_ORG_NAME: &str = "rootorg";

// ---
// Tenant Directory: organizações e o vínculo usuário -> organização
// ---
#[derive(Clone)]
pub struct DirectoryService {
    org_repo: OrganizationRepository,
    user_repo: UserRepository,
    policy: ScopePolicy,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl DirectoryService {
    pub fn new(
        org_repo: OrganizationRepository,
        user_repo: UserRepository,
        policy: ScopePolicy,
        pool: PgPool,
    ) -> Self {
        Self { org_repo, user_repo, policy, pool }
    }

    /// Setup inicial: cria, atomicamente, a organização sentinela e o
    /// primeiro usuário com is_root, is_staff e is_superuser ligados.
    /// Este é o ÚNICO caminho que produz um root automaticamente; os
    /// próximos roots são promovidos pela administração.
    pub async fn bootstrap_root_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        if self.user_repo.count_all().await? > 0 {
            return Err(AppError::AlreadyBootstrapped);
        }

        // O hash pode ficar fora da transação (não toca no banco)
        let password_hash = hash_password(password).await?;

        // Se qualquer passo falhar, o rollback desfaz a organização órfã.
        let mut tx = self.pool.begin().await?;

        let org = self.org_repo.create(&mut *tx, ROOT_ORG_NAME).await?;

        let user = self
            .user_repo
            .create_user(&mut *tx, email, &password_hash, org.id, true, true, true)
            .await?;

        tx.commit().await?;

        tracing::info!("✅ Setup concluído: usuário root criado em '{}'.", ROOT_ORG_NAME);
        Ok(user)
    }

    /// Cria uma organização (somente root; nome único).
    pub async fn create_organization(
        &self,
        caller: &CallerContext,
        name: &str,
    ) -> Result<Organization, AppError> {
        self.policy.ensure_can_create_organization(caller)?;

        // Pré-checagem para uma mensagem melhor; a constraint UNIQUE do
        // banco continua sendo quem garante a unicidade de verdade.
        if self.org_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::OrganizationNameTaken(name.to_string()));
        }

        self.org_repo.create(&self.pool, name).await
    }

    /// Cria um usuário pela administração.
    /// Não-root: o novo usuário SEMPRE nasce na organização de quem criou,
    /// ignorando qualquer organização pedida. Root: pode escolher.
    pub async fn create_user(
        &self,
        caller: &CallerContext,
        email: &str,
        password: &str,
        requested_org: Option<Uuid>,
    ) -> Result<User, AppError> {
        let organization_id = self.policy.resolve_new_record_org(caller, requested_org);

        // Para root escolhendo outra organização, conferimos antes para
        // devolver 404 em vez de um erro de FK do banco.
        if organization_id != caller.organization_id
            && self.org_repo.find_by_id(organization_id).await?.is_none()
        {
            return Err(AppError::OrganizationNotFound);
        }

        let password_hash = hash_password(password).await?;

        // Usuários criados pela administração não nascem staff nem root.
        self.user_repo
            .create_user(
                &self.pool,
                email,
                &password_hash,
                organization_id,
                false,
                false,
                false,
            )
            .await
    }
}
