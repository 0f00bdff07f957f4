//! Class template catalog.

use echoes_core::{ClassKind, ClassTemplate};
use strum::IntoEnumIterator;

/// Problems found while assembling a catalog from data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("class {0} is defined more than once")]
    Duplicate(ClassKind),
}

/// One template per playable class, indexed by [`ClassKind`] discriminant.
///
/// Classes missing from the data fall back to their built-in template.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassCatalog {
    templates: Vec<ClassTemplate>,
}

impl ClassCatalog {
    /// Catalog of the built-in templates.
    pub fn builtin() -> Self {
        Self {
            templates: ClassKind::iter().map(ClassTemplate::builtin).collect(),
        }
    }

    /// Builds a catalog from loaded templates, filling gaps with built-ins.
    pub fn from_templates(templates: Vec<ClassTemplate>) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin();
        let mut seen = Vec::with_capacity(templates.len());
        for template in templates {
            if seen.contains(&template.kind) {
                return Err(CatalogError::Duplicate(template.kind));
            }
            seen.push(template.kind);
            catalog.insert(template);
        }
        for kind in ClassKind::iter().filter(|kind| !seen.contains(kind)) {
            tracing::debug!(%kind, "class not in data, using built-in template");
        }
        Ok(catalog)
    }

    pub fn get(&self, kind: ClassKind) -> &ClassTemplate {
        &self.templates[kind as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassTemplate> {
        self.templates.iter()
    }

    fn insert(&mut self, template: ClassTemplate) {
        let slot = template.kind as usize;
        self.templates[slot] = template;
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
