// src/registry.rs

use std::collections::HashMap;

use thiserror::Error;

// ---
// O Registro de Entidades Escopadas
// ---
// Cada entidade de negócio isolada por organização é declarada aqui de forma
// ESTÁTICA: slug da API, tabela no banco e o mapeamento explícito de cada
// campo de referência para a entidade alvo. O mapeamento é validado no boot;
// um campo sem alvo registrado derruba a aplicação na inicialização em vez
// de falhar (ou pior, vazar dados sem filtro) no meio de uma requisição.

/// Alvo de um campo de referência de uma entidade escopada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedTarget {
    /// O campo aponta para a própria tabela de organizações.
    Organization,
    /// O campo aponta para outra entidade escopada, pelo slug dela.
    Entity(&'static str),
}

/// Mapeamento explícito: nome do campo -> entidade alvo.
#[derive(Debug, Clone, Copy)]
pub struct FieldBinding {
    pub field: &'static str,
    pub target: RelatedTarget,
}

/// Declaração estática de uma entidade escopada por organização.
/// A tabela precisa ter as colunas comuns: id, name, organization_id,
/// created_at, updated_at.
#[derive(Debug)]
pub struct EntityDef {
    pub slug: &'static str,
    pub table: &'static str,
    pub display: &'static str,
    // Campos de referência ALÉM do campo organization (que é intrínseco
    // a toda entidade escopada e tratado à parte pela política).
    pub reference_fields: &'static [FieldBinding],
}

impl EntityDef {
    /// Busca o alvo de um campo de referência declarado.
    pub fn reference(&self, field: &str) -> Option<RelatedTarget> {
        self.reference_fields
            .iter()
            .find(|b| b.field == field)
            .map(|b| b.target)
    }
}

inventory::collect!(EntityDef);

// ---
// Entidades de demonstração do repositório
// ---

inventory::submit! {
    EntityDef {
        slug: "widget",
        table: "widgets",
        display: "Widget",
        reference_fields: &[],
    }
}

inventory::submit! {
    EntityDef {
        slug: "gadget",
        table: "gadgets",
        display: "Gadget",
        reference_fields: &[FieldBinding {
            field: "widget",
            target: RelatedTarget::Entity("widget"),
        }],
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("slug de entidade duplicado: '{0}'")]
    DuplicateSlug(&'static str),

    #[error("nome de tabela inválido para a entidade '{slug}': '{table}'")]
    InvalidTable { slug: &'static str, table: &'static str },

    #[error("o campo '{field}' da entidade '{entity}' aponta para '{target}', que não está registrado")]
    UnmappedTarget {
        entity: &'static str,
        field: &'static str,
        target: &'static str,
    },
}

/// Registro validado, construído uma única vez na inicialização.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    entities: HashMap<&'static str, &'static EntityDef>,
}

impl EntityRegistry {
    /// Monta o registro a partir das declarações `inventory::submit!`.
    pub fn load() -> Result<Self, RegistryError> {
        Self::from_defs(inventory::iter::<EntityDef>.into_iter())
    }

    /// Monta e valida o registro a partir de um conjunto de definições.
    pub fn from_defs(
        defs: impl Iterator<Item = &'static EntityDef>,
    ) -> Result<Self, RegistryError> {
        let mut entities: HashMap<&'static str, &'static EntityDef> = HashMap::new();

        for def in defs {
            // Os nomes de tabela entram em SQL montado por format!, então
            // só aceitamos identificadores simples (minúsculas + underscore).
            if !is_safe_identifier(def.table) {
                return Err(RegistryError::InvalidTable {
                    slug: def.slug,
                    table: def.table,
                });
            }
            if entities.insert(def.slug, def).is_some() {
                return Err(RegistryError::DuplicateSlug(def.slug));
            }
        }

        // Todo campo de referência precisa apontar para algo registrado.
        for def in entities.values() {
            for binding in def.reference_fields {
                if let RelatedTarget::Entity(target) = binding.target {
                    if !entities.contains_key(target) {
                        return Err(RegistryError::UnmappedTarget {
                            entity: def.slug,
                            field: binding.field,
                            target,
                        });
                    }
                }
            }
        }

        Ok(Self { entities })
    }

    pub fn get(&self, slug: &str) -> Option<&'static EntityDef> {
        self.entities.get(slug).copied()
    }

    /// Slugs registrados, em ordem estável (útil para logs e para a UI).
    pub fn slugs(&self) -> Vec<&'static str> {
        let mut slugs: Vec<_> = self.entities.keys().copied().collect();
        slugs.sort_unstable();
        slugs
    }
}

fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_loads_and_validates() {
        let registry = EntityRegistry::load().expect("registro embutido deve validar");
        assert_eq!(registry.slugs(), vec!["gadget", "widget"]);

        let gadget = registry.get("gadget").unwrap();
        assert_eq!(gadget.table, "gadgets");
        assert_eq!(gadget.reference("widget"), Some(RelatedTarget::Entity("widget")));
        // Campo não mapeado: nada de "adivinhar" pelo nome.
        assert_eq!(gadget.reference("cog"), None);
    }

    #[test]
    fn unknown_slug_is_none() {
        let registry = EntityRegistry::load().unwrap();
        assert!(registry.get("thing").is_none());
    }

    #[test]
    fn unmapped_reference_target_fails_at_load() {
        static BROKEN: EntityDef = EntityDef {
            slug: "orphan",
            table: "orphans",
            display: "Orphan",
            reference_fields: &[FieldBinding {
                field: "parent",
                target: RelatedTarget::Entity("missing"),
            }],
        };
        let err = EntityRegistry::from_defs([&BROKEN].into_iter()).unwrap_err();
        assert!(matches!(err, RegistryError::UnmappedTarget { target: "missing", .. }));
    }

    #[test]
    fn duplicate_slug_fails_at_load() {
        static A: EntityDef = EntityDef {
            slug: "twin",
            table: "twins_a",
            display: "Twin A",
            reference_fields: &[],
        };
        static B: EntityDef = EntityDef {
            slug: "twin",
            table: "twins_b",
            display: "Twin B",
            reference_fields: &[],
        };
        let err = EntityRegistry::from_defs([&A, &B].into_iter()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSlug("twin")));
    }

    #[test]
    fn hostile_table_names_fail_at_load() {
        static EVIL: EntityDef = EntityDef {
            slug: "evil",
            table: "widgets; DROP TABLE users",
            display: "Evil",
            reference_fields: &[],
        };
        let err = EntityRegistry::from_defs([&EVIL].into_iter()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTable { .. }));
    }
}
