use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::types::Neighbor;

/// Standalone rule-set file: `[rule_sets.<name>]` tables.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct RuleSetsConfig {
    #[serde(default)]
    pub rule_sets: HashMap<String, RuleSetDef>,
}

impl RuleSetsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(text)?)
    }
}

pub fn load_rule_sets_from_path(path: &Path) -> Result<RuleSetsConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    RuleSetsConfig::from_toml_str(&s)
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct RuleSetDef {
    /// Visual used for fully surrounded cells and when no rule has visuals.
    #[serde(default)]
    pub default_visual: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct RuleDef {
    #[serde(default)]
    pub visuals: Vec<String>,
    #[serde(default)]
    pub neighbors: Vec<NeighborDef>,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct NeighborDef {
    pub at: [i32; 2],
    #[serde(default)]
    pub is: Neighbor,
}
