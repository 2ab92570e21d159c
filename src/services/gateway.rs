// src/services/gateway.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, ScopedEntityRepository, UserRepository},
    models::{
        admin::{ScopedFormDescriptor, UserFormDescriptor},
        auth::{UpdateUserPayload, User},
        org::{Organization, RelatedOption, ScopedRecord},
    },
    services::{
        auth::hash_password,
        scope::{CallerContext, FormHost, RelatedQuery, ScopePolicy},
    },
};

// ---
// Scoped Access Gateway
// ---
// A metade com I/O do gateway: recebe o CallerContext explícito de cada
// requisição, pergunta à política qual filtro vale e executa nos
// repositórios. Nenhuma consulta administrativa passa por fora daqui.
#[derive(Clone)]
pub struct GatewayService {
    policy: ScopePolicy,
    org_repo: OrganizationRepository,
    user_repo: UserRepository,
    scoped_repo: ScopedEntityRepository,
}

impl GatewayService {
    pub fn new(
        policy: ScopePolicy,
        org_repo: OrganizationRepository,
        user_repo: UserRepository,
        scoped_repo: ScopedEntityRepository,
    ) -> Self {
        Self { policy, org_repo, user_repo, scoped_repo }
    }

    // ---
    // Entidades escopadas
    // ---

    /// Listagem administrativa de uma entidade: root vê tudo,
    /// os demais veem só a própria organização.
    pub async fn list_entities(
        &self,
        caller: &CallerContext,
        slug: &str,
    ) -> Result<Vec<ScopedRecord>, AppError> {
        let def = self.policy.entity(slug)?;
        let filter = self.policy.scope_filter(caller);
        self.scoped_repo.list(def, &filter).await
    }

    /// Detalhe de um registro, dentro do escopo do chamador.
    pub async fn get_entity(
        &self,
        caller: &CallerContext,
        slug: &str,
        id: Uuid,
    ) -> Result<ScopedRecord, AppError> {
        let def = self.policy.entity(slug)?;
        let filter = self.policy.scope_filter(caller);
        self.scoped_repo
            .find_scoped(def, id, &filter)
            .await?
            .ok_or(AppError::RecordNotFound)
    }

    /// Cria um registro escopado. A organização final é decidida pela
    /// política: não-root cai na própria organização, sempre.
    pub async fn create_entity(
        &self,
        caller: &CallerContext,
        slug: &str,
        name: &str,
        requested_org: Option<Uuid>,
    ) -> Result<ScopedRecord, AppError> {
        let def = self.policy.entity(slug)?;
        let organization_id = self.policy.resolve_new_record_org(caller, requested_org);

        if organization_id != caller.organization_id
            && self.org_repo.find_by_id(organization_id).await?.is_none()
        {
            return Err(AppError::OrganizationNotFound);
        }

        self.scoped_repo.create(def, name, organization_id).await
    }

    /// Descritor do formulário de criação de uma entidade:
    /// organização pré-preenchida e, para não-root, nem exibida.
    pub fn new_entity_form(
        &self,
        caller: &CallerContext,
        slug: &str,
    ) -> Result<ScopedFormDescriptor, AppError> {
        let def = self.policy.entity(slug)?;
        Ok(ScopedFormDescriptor {
            entity: def.slug.to_string(),
            show_organization_field: self.policy.show_organization_field(caller),
            initial_organization_id: self.policy.default_organization(caller),
        })
    }

    /// Opções do seletor de um campo de referência de uma entidade.
    /// Campo não mapeado falha fechado (erro de configuração).
    pub async fn entity_field_options(
        &self,
        caller: &CallerContext,
        slug: &str,
        field: &str,
    ) -> Result<Vec<RelatedOption>, AppError> {
        let def = self.policy.entity(slug)?;
        let query = self
            .policy
            .related_options(caller, FormHost::Entity(def), field)?;
        self.run_related_query(query).await
    }

    // ---
    // Organizações
    // ---

    /// Root vê todas; um usuário comum vê apenas a sua.
    pub async fn organization_list(
        &self,
        caller: &CallerContext,
    ) -> Result<Vec<Organization>, AppError> {
        let filter = self.policy.organization_filter(caller);
        self.org_repo.list(&filter).await
    }

    // ---
    // Usuários
    // ---

    /// A listagem de usuários também é escopada — usuários de outras
    /// organizações não aparecem para quem não é root.
    pub async fn user_list(&self, caller: &CallerContext) -> Result<Vec<User>, AppError> {
        let filter = self.policy.scope_filter(caller);
        self.user_repo.list(&filter).await
    }

    /// Descritor do formulário de usuário: grupos de campos conforme o
    /// chamador, organização inicial e as opções do seletor.
    pub async fn user_form(
        &self,
        caller: &CallerContext,
    ) -> Result<UserFormDescriptor, AppError> {
        let fieldsets = self.policy.user_edit_fieldsets(caller);
        let query = self
            .policy
            .related_options(caller, FormHost::User, "organization")?;
        let organization_options = self.run_related_query(query).await?;

        Ok(UserFormDescriptor {
            fieldsets,
            initial_organization_id: self.policy.default_organization(caller),
            organization_options,
        })
    }

    /// Edita um usuário aplicando a política de campos:
    /// campo fora dos grupos do chamador => rejeição, não descarte.
    pub async fn update_user(
        &self,
        caller: &CallerContext,
        target_id: Uuid,
        payload: UpdateUserPayload,
    ) -> Result<User, AppError> {
        let forbidden = self.policy.forbidden_user_update_fields(caller, &payload);
        if !forbidden.is_empty() {
            return Err(AppError::PermissionDenied(format!(
                "os campos [{}] não são editáveis para este usuário",
                forbidden.join(", ")
            )));
        }

        // Fora do escopo, o alvo "não existe".
        let filter = self.policy.scope_filter(caller);
        let mut target = self
            .user_repo
            .find_scoped(target_id, &filter)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if let Some(email) = payload.email {
            target.email = email;
        }
        if let Some(password) = payload.password {
            target.password_hash = hash_password(&password).await?;
        }
        if let Some(is_staff) = payload.is_staff {
            target.is_staff = is_staff;
        }
        if let Some(is_superuser) = payload.is_superuser {
            target.is_superuser = is_superuser;
        }
        if let Some(is_root) = payload.is_root {
            target.is_root = is_root;
        }
        if let Some(organization_id) = payload.organization_id {
            // Só root chega aqui; ainda assim a organização precisa existir.
            if self.org_repo.find_by_id(organization_id).await?.is_none() {
                return Err(AppError::OrganizationNotFound);
            }
            target.organization_id = organization_id;
        }

        self.user_repo.update_user(&target).await
    }

    // ---
    // Interno
    // ---

    async fn run_related_query(
        &self,
        query: RelatedQuery,
    ) -> Result<Vec<RelatedOption>, AppError> {
        match query {
            RelatedQuery::Organizations(filter) => self.org_repo.options(&filter).await,
            RelatedQuery::Entity { table, filter, .. } => {
                self.scoped_repo.options(table, &filter).await
            }
        }
    }
}
