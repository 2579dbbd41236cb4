//! Read-only display catalogs injected into the scorer.
//!
//! Two lookups live here:
//!   - competitor names, indexed by a provider's seed
//!   - the provider-id → display-name directory
//!
//! Both are built once (from data/catalogs/ or the compiled-in
//! defaults) and never mutated afterwards, so a single `Catalogs`
//! can be shared by every scorer and every thread.

use crate::{
    config::read_json_or_default,
    error::{ScoreError, ScoreResult},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
struct CompetitorCatalogFile {
    competitors: Vec<String>,
}

impl Default for CompetitorCatalogFile {
    fn default() -> Self {
        Self {
            competitors: Catalogs::default_competitors()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Provider id → display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDirectory {
    names: HashMap<String, String>,
}

impl NameDirectory {
    pub fn new(names: HashMap<String, String>) -> Self {
        let names = names
            .into_iter()
            .filter(|(_, name)| !is_placeholder_name(name))
            .map(|(id, name)| (id.trim().to_string(), name.trim().to_string()))
            .collect();
        Self { names }
    }

    pub fn lookup(&self, provider_id: &str) -> Option<&str> {
        self.names.get(provider_id.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for NameDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogs {
    competitors: Vec<String>,
    pub names: NameDirectory,
}

impl Catalogs {
    /// Build from explicit parts. The competitor catalog must not be empty.
    pub fn new(competitors: Vec<String>, names: NameDirectory) -> ScoreResult<Self> {
        if competitors.is_empty() {
            return Err(ScoreError::invalid_config(
                "catalogs.competitors",
                "competitor catalog is empty",
            ));
        }
        Ok(Self { competitors, names })
    }

    /// Load from data/catalogs/. Missing files fall back to defaults.
    pub fn load(data_dir: impl AsRef<Path>) -> ScoreResult<Self> {
        let dir = data_dir.as_ref().join("catalogs");
        let competitors: CompetitorCatalogFile =
            read_json_or_default(&dir.join("competitors.json"))?;
        let names: HashMap<String, String> =
            read_json_or_default(&dir.join("npi_name_map.json"))?;
        let catalogs = Self::new(competitors.competitors, NameDirectory::new(names))?;
        log::debug!(
            "Catalogs ready: {} competitors, {} provider names",
            catalogs.competitors.len(),
            catalogs.names.len()
        );
        Ok(catalogs)
    }

    /// Competitor name for a provider seed. Same seed, same name.
    pub fn competitor_for(&self, seed: u64) -> &str {
        let index = (seed % self.competitors.len() as u64) as usize;
        &self.competitors[index]
    }

    pub fn competitors(&self) -> &[String] {
        &self.competitors
    }

    fn default_competitors() -> &'static [&'static str] {
        &[
            "Regional Medical Center",
            "University Health System",
            "Summit Specialty Group",
            "Valley Physicians Network",
            "Metro Care Partners",
            "Coastal Health Alliance",
            "Premier Medical Associates",
            "Lakeside Clinic Group",
        ]
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            competitors: CompetitorCatalogFile::default().competitors,
            names: NameDirectory::default(),
        }
    }
}

/// Names the upstream pipeline writes when it could not resolve a provider.
pub fn is_placeholder_name(name: &str) -> bool {
    let lowered = name.trim().to_ascii_lowercase();
    matches!(lowered.as_str(), "" | "unknown provider" | "nan" | "nan, nan")
}
