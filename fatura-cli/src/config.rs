use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use fatura_ingest::GrammarConfig;
use fatura_resolve::DescriptionMapping;

/// On-disk CLI configuration: statement grammar overrides plus the
/// account's learned description mappings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub account_id: String,
    pub grammar: GrammarConfig,
    pub mappings: Vec<MappingEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    pub original: String,
    pub simplified: String,
    pub category: Option<String>,
}

impl Config {
    pub fn mappings(&self) -> Vec<DescriptionMapping> {
        self.mappings
            .iter()
            .map(|m| DescriptionMapping {
                original: m.original.clone(),
                simplified: m.simplified.clone(),
                category: m.category.clone(),
                account_id: self.account_id.clone(),
            })
            .collect()
    }
}

/// Load the config file, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(p) = path else {
        return Ok(Config::default());
    };
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}
