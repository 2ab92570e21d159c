// src/services/scope.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{admin::Fieldset, auth::User},
    registry::{EntityDef, EntityRegistry, RelatedTarget},
};

// ---
// 1. CallerContext (quem está pedindo)
// ---
// Tudo que a política precisa saber sobre quem chama, passado EXPLICITAMENTE
// em cada operação. Nada de contexto ambiente/global: se uma função decide
// escopo, ela recebe o contexto por parâmetro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: Uuid,
    pub is_root: bool,
    pub organization_id: Uuid,
}

impl CallerContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            is_root: user.is_root,
            organization_id: user.organization_id,
        }
    }
}

// ---
// 2. AccessMode e ScopeFilter
// ---

/// Modo de acesso, derivado do flag is_root a cada operação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Sem restrição de organização.
    Root,
    /// Restrito à organização indicada.
    Tenant(Uuid),
}

/// O predicado que os repositórios aplicam às consultas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    Unrestricted,
    Organization(Uuid),
}

impl ScopeFilter {
    /// A organização exigida pelo filtro, se houver.
    pub fn organization(&self) -> Option<Uuid> {
        match self {
            ScopeFilter::Unrestricted => None,
            ScopeFilter::Organization(id) => Some(*id),
        }
    }
}

/// Em qual formulário o seletor de referência está sendo montado.
#[derive(Debug, Clone, Copy)]
pub enum FormHost<'a> {
    /// O formulário de usuário da administração.
    User,
    /// O formulário de uma entidade escopada.
    Entity(&'a EntityDef),
}

/// O que o seletor de um campo de referência deve consultar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedQuery {
    /// Opções vindas da tabela de organizações.
    Organizations(ScopeFilter),
    /// Opções vindas de outra entidade escopada.
    Entity {
        slug: &'static str,
        table: &'static str,
        filter: ScopeFilter,
    },
}

// ---
// 3. ScopePolicy (a política em si)
// ---
// Objeto único e componível, injetado nos serviços — substitui a herança
// múltipla de mixins da versão antiga deste sistema. Não faz I/O nenhum:
// decide filtros e grupos de campos, e os serviços executam.
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    registry: EntityRegistry,
}

impl ScopePolicy {
    pub fn new(registry: EntityRegistry) -> Self {
        Self { registry }
    }

    /// Resolve um slug de entidade ou falha com erro de entidade desconhecida.
    pub fn entity(&self, slug: &str) -> Result<&'static EntityDef, AppError> {
        self.registry
            .get(slug)
            .ok_or_else(|| AppError::UnknownEntity(slug.to_string()))
    }

    /// Deriva o modo de acesso do chamador (fresco, a cada operação).
    pub fn access_mode(&self, caller: &CallerContext) -> AccessMode {
        if caller.is_root {
            AccessMode::Root
        } else {
            AccessMode::Tenant(caller.organization_id)
        }
    }

    /// O filtro aplicado a TODA listagem (entidades escopadas e usuários):
    /// root vê tudo; os demais veem só a própria organização.
    pub fn scope_filter(&self, caller: &CallerContext) -> ScopeFilter {
        match self.access_mode(caller) {
            AccessMode::Root => ScopeFilter::Unrestricted,
            AccessMode::Tenant(org) => ScopeFilter::Organization(org),
        }
    }

    /// Filtro da listagem de organizações: root vê todas; os demais veem
    /// apenas a sua própria.
    pub fn organization_filter(&self, caller: &CallerContext) -> ScopeFilter {
        self.scope_filter(caller)
    }

    /// Resolve o seletor de um campo de referência de um formulário.
    ///
    /// O campo `organization` é intrínseco e tratado à parte: as opções são
    /// restritas à organização do chamador, EXCETO para root no formulário
    /// de usuário (é assim que root move usuários entre organizações).
    /// Qualquer outro campo passa pelo mapeamento explícito do registro;
    /// campo não mapeado é erro de configuração, nunca consulta sem filtro.
    pub fn related_options(
        &self,
        caller: &CallerContext,
        host: FormHost<'_>,
        field: &str,
    ) -> Result<RelatedQuery, AppError> {
        if field == "organization" {
            let filter = match (host, self.access_mode(caller)) {
                (FormHost::User, AccessMode::Root) => ScopeFilter::Unrestricted,
                _ => ScopeFilter::Organization(caller.organization_id),
            };
            return Ok(RelatedQuery::Organizations(filter));
        }

        let def = match host {
            FormHost::Entity(def) => def,
            // O formulário de usuário não tem outros campos de referência.
            FormHost::User => {
                return Err(AppError::UnknownRelatedField {
                    entity: "user".to_string(),
                    field: field.to_string(),
                });
            }
        };

        match def.reference(field) {
            Some(RelatedTarget::Organization) => Ok(RelatedQuery::Organizations(
                ScopeFilter::Organization(caller.organization_id),
            )),
            Some(RelatedTarget::Entity(target)) => {
                // O boot validou o alvo, mas ainda assim falhamos fechado.
                let target_def = self.registry.get(target).ok_or_else(|| {
                    AppError::UnknownRelatedField {
                        entity: def.slug.to_string(),
                        field: field.to_string(),
                    }
                })?;
                Ok(RelatedQuery::Entity {
                    slug: target_def.slug,
                    table: target_def.table,
                    filter: ScopeFilter::Organization(caller.organization_id),
                })
            }
            None => Err(AppError::UnknownRelatedField {
                entity: def.slug.to_string(),
                field: field.to_string(),
            }),
        }
    }

    /// Valor inicial do campo organização em formulários de criação:
    /// a organização de quem chama, sempre.
    pub fn default_organization(&self, caller: &CallerContext) -> Uuid {
        caller.organization_id
    }

    /// Em qual organização um registro escopado novo deve nascer.
    /// Não-root: SEMPRE na organização do chamador, ignorando o que veio
    /// na requisição. Root: na organização pedida (ou na sua, por padrão).
    pub fn resolve_new_record_org(
        &self,
        caller: &CallerContext,
        requested: Option<Uuid>,
    ) -> Uuid {
        match self.access_mode(caller) {
            AccessMode::Root => requested.unwrap_or(caller.organization_id),
            AccessMode::Tenant(org) => org,
        }
    }

    /// Formulários compactos omitem o campo organização para não-root
    /// (ele é preenchido automaticamente no servidor).
    pub fn show_organization_field(&self, caller: &CallerContext) -> bool {
        caller.is_root
    }

    /// Só root cria organizações.
    pub fn ensure_can_create_organization(
        &self,
        caller: &CallerContext,
    ) -> Result<(), AppError> {
        match self.access_mode(caller) {
            AccessMode::Root => Ok(()),
            AccessMode::Tenant(_) => Err(AppError::PermissionDenied(
                "apenas usuários root criam organizações".to_string(),
            )),
        }
    }

    /// Grupos de campos do formulário de usuário.
    /// Não-root: só identificação e credenciais. Root: ganha também o grupo
    /// de organização (inserido como terceiro), o de permissões e o de root.
    pub fn user_edit_fieldsets(&self, caller: &CallerContext) -> Vec<Fieldset> {
        let mut fieldsets = vec![
            Fieldset::new("Identificação", &["email"]),
            Fieldset::new("Credenciais", &["password"]),
        ];

        if caller.is_root {
            fieldsets.insert(2, Fieldset::new("Organização", &["organization"]));
            fieldsets.push(Fieldset::new("Permissões", &["is_staff", "is_superuser"]));
            fieldsets.push(Fieldset::new("Root", &["is_root"]));
        }

        fieldsets
    }

    /// Campos de um update de usuário que o chamador NÃO pode tocar.
    /// O que não aparece nos fieldsets dele não pode vir no payload.
    pub fn forbidden_user_update_fields(
        &self,
        caller: &CallerContext,
        payload: &crate::models::auth::UpdateUserPayload,
    ) -> Vec<&'static str> {
        let mut forbidden = Vec::new();
        if !caller.is_root {
            if payload.organization_id.is_some() {
                forbidden.push("organization");
            }
            if payload.is_root.is_some() {
                forbidden.push("is_root");
            }
            if payload.is_staff.is_some() {
                forbidden.push("is_staff");
            }
            if payload.is_superuser.is_some() {
                forbidden.push("is_superuser");
            }
        }
        forbidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UpdateUserPayload;
    use crate::registry::EntityRegistry;

    fn policy() -> ScopePolicy {
        ScopePolicy::new(EntityRegistry::load().unwrap())
    }

    fn tenant_caller(org: Uuid) -> CallerContext {
        CallerContext {
            user_id: Uuid::new_v4(),
            is_root: false,
            organization_id: org,
        }
    }

    fn root_caller(org: Uuid) -> CallerContext {
        CallerContext {
            user_id: Uuid::new_v4(),
            is_root: true,
            organization_id: org,
        }
    }

    // Propriedade 1: não-root só enxerga a própria organização.
    #[test]
    fn tenant_listing_is_filtered_to_own_org() {
        let policy = policy();
        let org = Uuid::new_v4();
        let caller = tenant_caller(org);
        assert_eq!(policy.scope_filter(&caller), ScopeFilter::Organization(org));
        assert_eq!(policy.scope_filter(&caller).organization(), Some(org));
    }

    // Propriedade 2: root enxerga tudo.
    #[test]
    fn root_listing_is_unrestricted() {
        let policy = policy();
        let caller = root_caller(Uuid::new_v4());
        assert_eq!(policy.scope_filter(&caller), ScopeFilter::Unrestricted);
        assert_eq!(policy.scope_filter(&caller).organization(), None);
    }

    // Propriedade 3: registro novo de não-root nasce na organização dele,
    // mesmo que a requisição peça outra.
    #[test]
    fn tenant_create_ignores_requested_org() {
        let policy = policy();
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let caller = tenant_caller(own);
        assert_eq!(policy.resolve_new_record_org(&caller, Some(other)), own);
        assert_eq!(policy.resolve_new_record_org(&caller, None), own);
    }

    #[test]
    fn root_create_may_choose_org() {
        let policy = policy();
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let caller = root_caller(own);
        assert_eq!(policy.resolve_new_record_org(&caller, Some(other)), other);
        assert_eq!(policy.resolve_new_record_org(&caller, None), own);
    }

    #[test]
    fn organization_selector_is_scoped_for_tenant_on_any_form() {
        let policy = policy();
        let org = Uuid::new_v4();
        let caller = tenant_caller(org);

        let on_user = policy
            .related_options(&caller, FormHost::User, "organization")
            .unwrap();
        assert_eq!(
            on_user,
            RelatedQuery::Organizations(ScopeFilter::Organization(org))
        );

        let widget = policy.entity("widget").unwrap();
        let on_widget = policy
            .related_options(&caller, FormHost::Entity(widget), "organization")
            .unwrap();
        assert_eq!(
            on_widget,
            RelatedQuery::Organizations(ScopeFilter::Organization(org))
        );
    }

    // Root trocando a organização de um usuário: seletor sem restrição.
    #[test]
    fn organization_selector_is_unrestricted_for_root_on_user_form() {
        let policy = policy();
        let caller = root_caller(Uuid::new_v4());
        let query = policy
            .related_options(&caller, FormHost::User, "organization")
            .unwrap();
        assert_eq!(query, RelatedQuery::Organizations(ScopeFilter::Unrestricted));
    }

    // Fora do formulário de usuário, nem root escolhe organização alheia
    // no seletor (evita mover dados entre organizações sem querer).
    #[test]
    fn organization_selector_stays_scoped_for_root_on_entity_form() {
        let policy = policy();
        let org = Uuid::new_v4();
        let caller = root_caller(org);
        let widget = policy.entity("widget").unwrap();
        let query = policy
            .related_options(&caller, FormHost::Entity(widget), "organization")
            .unwrap();
        assert_eq!(
            query,
            RelatedQuery::Organizations(ScopeFilter::Organization(org))
        );
    }

    #[test]
    fn mapped_reference_field_resolves_to_target_entity_scoped() {
        let policy = policy();
        let org = Uuid::new_v4();
        let caller = tenant_caller(org);
        let gadget = policy.entity("gadget").unwrap();
        let query = policy
            .related_options(&caller, FormHost::Entity(gadget), "widget")
            .unwrap();
        assert_eq!(
            query,
            RelatedQuery::Entity {
                slug: "widget",
                table: "widgets",
                filter: ScopeFilter::Organization(org),
            }
        );
    }

    // Falha fechada: campo sem mapeamento é erro de configuração,
    // nunca uma consulta sem escopo.
    #[test]
    fn unmapped_reference_field_fails_closed() {
        let policy = policy();
        let caller = tenant_caller(Uuid::new_v4());
        let gadget = policy.entity("gadget").unwrap();
        let err = policy
            .related_options(&caller, FormHost::Entity(gadget), "cog")
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownRelatedField { .. }));
    }

    #[test]
    fn unknown_entity_slug_is_an_error() {
        let policy = policy();
        let err = policy.entity("thing").unwrap_err();
        assert!(matches!(err, AppError::UnknownEntity(_)));
    }

    // Propriedade 6: não-root não recebe (nem pode tocar) organização e root.
    #[test]
    fn tenant_fieldsets_hide_organization_and_root() {
        let policy = policy();
        let caller = tenant_caller(Uuid::new_v4());
        let fieldsets = policy.user_edit_fieldsets(&caller);
        assert_eq!(fieldsets.len(), 2);
        let all_fields: Vec<_> = fieldsets.iter().flat_map(|f| f.fields.iter()).collect();
        assert!(!all_fields.iter().any(|f| *f == "organization"));
        assert!(!all_fields.iter().any(|f| *f == "is_root"));
    }

    #[test]
    fn root_fieldsets_add_organization_and_root_groups() {
        let policy = policy();
        let caller = root_caller(Uuid::new_v4());
        let fieldsets = policy.user_edit_fieldsets(&caller);
        let titles: Vec<_> = fieldsets.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Identificação", "Credenciais", "Organização", "Permissões", "Root"]
        );
        // O grupo de organização entra como terceiro, como no formulário antigo.
        assert_eq!(fieldsets[2].fields, vec!["organization".to_string()]);
    }

    #[test]
    fn tenant_update_with_forbidden_fields_is_flagged() {
        let policy = policy();
        let caller = tenant_caller(Uuid::new_v4());
        let payload = UpdateUserPayload {
            email: Some("novo@exemplo.com".into()),
            organization_id: Some(Uuid::new_v4()),
            is_root: Some(true),
            ..Default::default()
        };
        let forbidden = policy.forbidden_user_update_fields(&caller, &payload);
        assert_eq!(forbidden, vec!["organization", "is_root"]);
    }

    #[test]
    fn root_update_has_no_forbidden_fields() {
        let policy = policy();
        let caller = root_caller(Uuid::new_v4());
        let payload = UpdateUserPayload {
            organization_id: Some(Uuid::new_v4()),
            is_root: Some(true),
            is_staff: Some(true),
            is_superuser: Some(true),
            ..Default::default()
        };
        assert!(policy.forbidden_user_update_fields(&caller, &payload).is_empty());
    }

    #[test]
    fn compact_forms_hide_organization_field_for_tenant() {
        let policy = policy();
        assert!(!policy.show_organization_field(&tenant_caller(Uuid::new_v4())));
        assert!(policy.show_organization_field(&root_caller(Uuid::new_v4())));
    }

    #[test]
    fn only_root_creates_organizations() {
        let policy = policy();
        assert!(policy
            .ensure_can_create_organization(&root_caller(Uuid::new_v4()))
            .is_ok());
        let err = policy
            .ensure_can_create_organization(&tenant_caller(Uuid::new_v4()))
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }
}
