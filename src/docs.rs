// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::setup,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Organizações ---
        handlers::orgs::list_organizations,
        handlers::orgs::create_organization,

        // --- Usuários ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::user_form,
        handlers::users::update_user,

        // --- Entidades escopadas ---
        handlers::entities::list_records,
        handlers::entities::get_record,
        handlers::entities::create_record,
        handlers::entities::new_record_form,
        handlers::entities::field_options,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::SetupPayload,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::AuthResponse,

            // --- Organizações e entidades ---
            models::org::Organization,
            models::org::ScopedRecord,
            models::org::RelatedOption,
            models::org::CreateOrganizationPayload,
            models::org::CreateScopedRecordPayload,

            // --- Formulários administrativos ---
            models::admin::Fieldset,
            models::admin::UserFormDescriptor,
            models::admin::ScopedFormDescriptor,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Setup inicial, login e identidade"),
        (name = "Organizações", description = "A fronteira de isolamento"),
        (name = "Usuários", description = "Administração de usuários, escopada por organização"),
        (name = "Entidades", description = "Administração genérica das entidades escopadas")
    )
)]
pub struct ApiDoc;
