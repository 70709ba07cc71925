use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use tilegen_rules::config::{RuleSetDef, RuleSetsConfig};

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    /// Side of the generated square window, in cells.
    #[serde(default = "default_size")]
    pub size: i32,
    /// Extra ring of cells sampled around the window so edge tiles see their neighbors.
    #[serde(default = "default_margin")]
    pub margin: i32,
    #[serde(default)]
    pub static_position: [f32; 2],
    #[serde(default = "default_cell_size")]
    pub cell_size: [f32; 2],
    #[serde(default = "default_true")]
    pub generate_on_start: bool,
    #[serde(default)]
    pub streaming: Streaming,
    #[serde(default)]
    pub base: BaseDef,
    #[serde(default)]
    pub regions: Vec<RegionDef>,
    #[serde(default)]
    pub rule_sets: HashMap<String, RuleSetDef>,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Static,
            size: default_size(),
            margin: default_margin(),
            static_position: [0.0, 0.0],
            cell_size: default_cell_size(),
            generate_on_start: true,
            streaming: Streaming::default(),
            base: BaseDef::default(),
            regions: Vec::new(),
            rule_sets: HashMap::new(),
        }
    }
}

impl WorldGenConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(text)?)
    }

    /// Adds rule sets kept in a separate file; same-named sets replace the inline ones.
    pub fn merge_rule_sets(&mut self, extra: RuleSetsConfig) {
        for (name, def) in extra.rule_sets {
            if self.rule_sets.insert(name.clone(), def).is_some() {
                log::debug!("rule set {name} replaced by an external definition");
            }
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<WorldGenConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    WorldGenConfig::from_toml_str(&s)
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Static,
    Infinite,
}

fn default_mode() -> Mode {
    Mode::Static
}
fn default_size() -> i32 {
    50
}
fn default_margin() -> i32 {
    5
}
fn default_cell_size() -> [f32; 2] {
    [1.0, 1.0]
}
fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct Streaming {
    #[serde(default = "default_budget")]
    pub place_per_tick: i32,
    #[serde(default = "default_budget")]
    pub clear_per_tick: i32,
    /// Focus travel, in cells, that arms a regeneration.
    #[serde(default = "default_regenerate_distance")]
    pub regenerate_distance: f32,
    /// Seconds between focus-triggered regenerations.
    #[serde(default = "default_generation_period")]
    pub generation_period: f32,
}
fn default_budget() -> i32 {
    50
}
fn default_regenerate_distance() -> f32 {
    1.0
}
fn default_generation_period() -> f32 {
    0.5
}
impl Default for Streaming {
    fn default() -> Self {
        Self {
            place_per_tick: default_budget(),
            clear_per_tick: default_budget(),
            regenerate_distance: default_regenerate_distance(),
            generation_period: default_generation_period(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColliderKind {
    #[default]
    Walkable,
    NonWalkable,
}

/// Cells no region claims.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BaseDef {
    #[serde(default)]
    pub visual: Option<String>,
    #[serde(default)]
    pub collider: ColliderKind,
    #[serde(default)]
    pub height: Option<HeightDef>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    OpenSimplex2,
    OpenSimplex2s,
    Cellular,
    #[default]
    Perlin,
    ValueCubic,
    Value,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct NoiseDef {
    #[serde(default)]
    pub kind: NoiseKind,
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
}
fn default_seed() -> i32 {
    1234
}
fn default_frequency() -> f32 {
    0.05
}
impl Default for NoiseDef {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Perlin,
            seed: default_seed(),
            frequency: default_frequency(),
        }
    }
}

fn default_threshold() -> f32 {
    0.9
}
fn default_priority() -> i32 {
    1
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegionDef {
    pub name: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub rule_set: Option<String>,
    #[serde(default)]
    pub collider: ColliderKind,
    #[serde(default = "default_region_thickness")]
    pub collider_thickness: f32,
    #[serde(default)]
    pub noise: NoiseDef,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub height: Option<HeightDef>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
}
fn default_region_thickness() -> f32 {
    0.05
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SlopeVisuals {
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub bottom: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HeightDef {
    #[serde(default)]
    pub rule_set: Option<String>,
    #[serde(default)]
    pub slopes: SlopeVisuals,
    /// 0 disables slopes, 10 is the densest setting.
    #[serde(default = "default_slope_frequency")]
    pub slope_frequency: i32,
    #[serde(default = "default_cliff_thickness")]
    pub collider_thickness: f32,
    #[serde(default = "default_cliff_padding")]
    pub collider_padding: f32,
    #[serde(default)]
    pub noise: NoiseDef,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}
fn default_slope_frequency() -> i32 {
    8
}
fn default_cliff_thickness() -> f32 {
    0.25
}
fn default_cliff_padding() -> f32 {
    0.1
}
impl Default for HeightDef {
    fn default() -> Self {
        Self {
            rule_set: None,
            slopes: SlopeVisuals::default(),
            slope_frequency: default_slope_frequency(),
            collider_thickness: default_cliff_thickness(),
            collider_padding: default_cliff_padding(),
            noise: NoiseDef::default(),
            threshold: default_threshold(),
        }
    }
}

/// `kind = { prefab = [...] }` or `kind = { sprite = [...] }`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKindDef {
    Prefab(Vec<String>),
    Sprite(Vec<String>),
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCollider {
    #[default]
    None,
    Circle,
    Box,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ObjectDef {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: ObjectKindDef,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub collider: ObjectCollider,
    #[serde(default = "default_object_collider_size")]
    pub collider_size: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Whether the object may also appear on top of raised terrain.
    #[serde(default = "default_true")]
    pub covers_height: bool,
    #[serde(default)]
    pub noise: NoiseDef,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}
fn default_object_collider_size() -> f32 {
    0.5
}
fn default_scale() -> f32 {
    1.0
}
