use std::collections::HashMap;
use std::error::Error;

use tilegen_geom::Offset;

use super::config::{RuleDef, RuleSetDef, RuleSetsConfig};
use super::types::{RuleSet, TilingRule};

pub type RuleSetId = u16;

/// Compiled rule sets addressed by name or dense id.
#[derive(Default, Clone, Debug)]
pub struct RuleSetRegistry {
    pub sets: Vec<RuleSet>,
    pub by_name: HashMap<String, RuleSetId>,
}

impl RuleSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, id: RuleSetId) -> Option<&RuleSet> {
        self.sets.get(id as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<RuleSetId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&RuleSet> {
        self.id_by_name(name).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Box<dyn Error>> {
        Ok(Self::from_defs(&RuleSetsConfig::from_toml_str(text)?.rule_sets))
    }

    /// Ids are assigned in name order so they do not depend on map iteration.
    pub fn from_defs(defs: &HashMap<String, RuleSetDef>) -> Self {
        let mut names: Vec<&String> = defs.keys().collect();
        names.sort();
        let mut reg = Self::new();
        for name in names {
            reg.insert(compile_rule_set(name, &defs[name]));
        }
        reg
    }

    pub fn insert(&mut self, set: RuleSet) -> RuleSetId {
        if let Some(id) = self.by_name.get(&set.name).copied() {
            self.sets[id as usize] = set;
            return id;
        }
        let id = self.sets.len() as RuleSetId;
        self.by_name.insert(set.name.clone(), id);
        self.sets.push(set);
        id
    }
}

pub fn compile_rule_set(name: &str, def: &RuleSetDef) -> RuleSet {
    let rules = def
        .rules
        .iter()
        .enumerate()
        .map(|(k, r)| compile_rule(name, k, r))
        .collect();
    RuleSet {
        name: name.to_string(),
        default_visual: def.default_visual.clone(),
        rules,
    }
}

fn compile_rule(set: &str, index: usize, def: &RuleDef) -> TilingRule {
    let constraints = def
        .neighbors
        .iter()
        .map(|n| (Offset::new(n.at[0], n.at[1]), n.is))
        .collect::<Vec<_>>();
    if let Some((at, _)) = constraints.iter().find(|(at, _)| at.neighbor_slot().is_none()) {
        log::warn!(
            "rule set '{}' rule {} references ({}, {}) outside the 3x3 neighborhood; it is ignored when matching",
            set,
            index,
            at.dx,
            at.dy
        );
    }
    TilingRule {
        visuals: def.visuals.clone(),
        constraints,
    }
}
