//! Region catalogue loader.
//!
//! ```toml
//! generate_unlisted = true
//!
//! [[regions]]
//! id = 0
//! depth = 0
//! surface = true
//! safe = true
//! persistent = true
//! preload = true
//!
//! [[regions]]
//! id = 12
//! depth = 12
//! time_factor = 50
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use game_core::{RegionFlags, RegionId, RegionSpec};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};
use crate::regions::RegionCatalog;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    generate_unlisted: bool,
    #[serde(default)]
    regions: Vec<RegionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionEntry {
    id: u32,
    depth: u32,
    #[serde(default)]
    time_factor: Option<u32>,
    #[serde(default)]
    surface: bool,
    #[serde(default)]
    safe: bool,
    #[serde(default)]
    persistent: bool,
    #[serde(default)]
    preload: bool,
}

impl RegionEntry {
    fn spec(&self) -> RegionSpec {
        let mut flags = RegionFlags::empty();
        flags.set(RegionFlags::SURFACE, self.surface);
        flags.set(RegionFlags::SAFE, self.safe);
        flags.set(RegionFlags::PERSISTENT, self.persistent);

        let spec = RegionSpec::at_depth(self.depth).with_flags(flags);
        match self.time_factor {
            Some(percent) => spec.with_time_factor(percent),
            None => spec,
        }
    }
}

/// Loader for region catalogues from TOML files.
pub struct RegionLoader;

impl RegionLoader {
    pub fn load(path: &Path) -> LoadResult<RegionCatalog> {
        let content = read_file(path)?;
        let catalog = Self::load_str(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;

        tracing::info!(
            path = %path.display(),
            regions = catalog.len(),
            preloaded = catalog.preloaded().count(),
            "region catalogue loaded"
        );
        Ok(catalog)
    }

    /// Parse a catalogue. Duplicate ids are rejected.
    pub fn load_str(content: &str) -> LoadResult<RegionCatalog> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse region TOML: {}", e))?;

        let mut seen = BTreeSet::new();
        let mut catalog = RegionCatalog::new().with_fallback(file.generate_unlisted);
        for entry in &file.regions {
            if !seen.insert(entry.id) {
                anyhow::bail!("Duplicate region id {}", entry.id);
            }
            catalog.insert(RegionId(entry.id), entry.spec(), entry.preload);
        }

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use game_core::LevelGenerator;

    use super::*;

    const CATALOG: &str = r#"
        [[regions]]
        id = 0
        depth = 0
        surface = true
        safe = true
        persistent = true
        preload = true

        [[regions]]
        id = 12
        depth = 12
        time_factor = 50
    "#;

    #[test]
    fn entries_become_region_specs() {
        let mut catalog = RegionLoader::load_str(CATALOG).unwrap();

        let town = catalog.get(RegionId(0)).copied().unwrap();
        assert_eq!(
            town.flags,
            RegionFlags::SURFACE | RegionFlags::SAFE | RegionFlags::PERSISTENT
        );
        assert_eq!(town.time_factor, None);

        assert_eq!(
            catalog.generate(RegionId(12)),
            Some(RegionSpec::at_depth(12).with_time_factor(50))
        );
        assert_eq!(catalog.generate(RegionId(13)), None);

        let preloaded: Vec<_> = catalog.preloaded().map(|(id, _)| id).collect();
        assert_eq!(preloaded, vec![RegionId(0)]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = RegionLoader::load_str(
            r#"
            [[regions]]
            id = 3
            depth = 3

            [[regions]]
            id = 3
            depth = 4
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate region id 3"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(RegionLoader::load_str("[[regions]]\nid = 1\ndepth = 1\nlava = true\n").is_err());
    }

    #[test]
    fn generate_unlisted_enables_fallback() {
        let mut catalog = RegionLoader::load_str("generate_unlisted = true").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.generate(RegionId(4)), Some(RegionSpec::at_depth(4)));
    }
}
