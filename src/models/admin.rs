// src/models/admin.rs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::org::RelatedOption;

// ---
// Descritores de formulário administrativo
// ---
// O backend não renderiza nada: ele entrega à UI administrativa a lista de
// grupos de campos que PODEM ser editados e os valores iniciais. O que não
// vem aqui, a UI não mostra — e o serviço rejeita se vier num update.

// Um grupo nomeado de campos (o "fieldset" do formulário)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Fieldset {
    pub title: String,
    pub fields: Vec<String>,
}

impl Fieldset {
    pub fn new(title: &str, fields: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

// Formulário de edição/criação de usuário
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserFormDescriptor {
    pub fieldsets: Vec<Fieldset>,
    // Pré-preenche a organização com a de quem chamou, para que um
    // usuário comum nunca precise escolher o campo.
    pub initial_organization_id: Uuid,
    pub organization_options: Vec<RelatedOption>,
}

// Formulário de criação de um registro escopado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopedFormDescriptor {
    pub entity: String,
    // Em formulários compactos o campo organização nem aparece
    // (ele é preenchido automaticamente no servidor).
    pub show_organization_field: bool,
    pub initial_organization_id: Uuid,
}
