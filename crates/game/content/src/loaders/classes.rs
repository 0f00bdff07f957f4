//! Class template loader.

use std::path::Path;

use echoes_core::ClassTemplate;

use crate::catalog::ClassCatalog;
use crate::loaders::{LoadResult, read_file};

/// Loader for class templates from RON files.
pub struct ClassLoader;

impl ClassLoader {
    /// Load a class catalog from a RON file.
    ///
    /// RON format: `Vec<ClassTemplate>`, at most one entry per class.
    pub fn load(path: &Path) -> LoadResult<ClassCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid class catalog {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<ClassCatalog> {
        let templates: Vec<ClassTemplate> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse class catalog RON: {}", e))?;
        Ok(ClassCatalog::from_templates(templates)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echoes_core::{ClassKind, Specialization, Timeline};

    #[test]
    fn parses_partial_catalog() {
        let ron = r#"[
            (
                kind: VoidMage,
                stats: (
                    health: 650.0,
                    timeline_energy: 220.0,
                    stamina_regen: 8.0,
                    timeline_power: 85.0,
                    critical_chance: 0.08,
                    dodge_chance: 0.05,
                ),
                affinity: (
                    preferred_timeline: DarkWorld,
                    energy_efficiency: 1.5,
                    damage_bonus: 1.4,
                    resistance: 0.7,
                ),
                specializations: [VoidWalker],
            ),
        ]"#;
        let catalog = ClassLoader::parse(ron).expect("catalog");
        let mage = catalog.get(ClassKind::VoidMage);
        assert_eq!(mage.stats.health, 650.0);
        assert_eq!(mage.affinity.preferred_timeline, Timeline::DarkWorld);
        assert_eq!(mage.specializations, vec![Specialization::VoidWalker]);
        assert_eq!(
            catalog.get(ClassKind::TimeWarrior),
            &ClassTemplate::builtin(ClassKind::TimeWarrior)
        );
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(ClassLoader::parse("[ (kind: Bard) ]").is_err());
    }
}
