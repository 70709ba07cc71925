//! Validated, ready-to-sample world description built from a [`WorldGenConfig`].

use std::cmp::Reverse;

use tilegen_geom::Vec2;
use tilegen_rules::registry::{RuleSetId, RuleSetRegistry};
use tilegen_rules::RuleSet;

use crate::error::ConfigError;
use crate::noise::ThresholdNoise;
use crate::tile::{RegionId, SlopeDir};
use crate::worldgen::{
    ColliderKind, HeightDef, Mode, NoiseDef, ObjectCollider, ObjectDef, ObjectKindDef,
    RegionDef, SlopeVisuals, WorldGenConfig,
};

const MIN_MARGIN: i32 = 3;
const MAX_SLOPE_FREQUENCY: i32 = 10;

#[derive(Debug)]
pub struct HeightSpec {
    pub rule_set: Option<RuleSetId>,
    pub slopes: SlopeVisuals,
    pub slope_frequency: u8,
    pub collider_thickness: f32,
    pub collider_padding: f32,
    pub noise: ThresholdNoise,
}

impl HeightSpec {
    pub fn slope_visual(&self, dir: SlopeDir) -> Option<&str> {
        match dir {
            SlopeDir::Top => self.slopes.top.as_deref(),
            SlopeDir::Right => self.slopes.right.as_deref(),
            SlopeDir::Left => self.slopes.left.as_deref(),
            SlopeDir::Bottom => self.slopes.bottom.as_deref(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObjectKind {
    Prefab(Vec<String>),
    Sprite(Vec<String>),
}

impl ObjectKind {
    pub fn choices(&self) -> &[String] {
        match self {
            ObjectKind::Prefab(v) | ObjectKind::Sprite(v) => v,
        }
    }
}

#[derive(Debug)]
pub struct ObjectSpec {
    pub name: String,
    pub kind: ObjectKind,
    pub priority: i32,
    pub collider: ObjectCollider,
    pub collider_size: f32,
    pub scale: f32,
    pub covers_height: bool,
    pub noise: ThresholdNoise,
}

#[derive(Debug)]
pub struct RegionSpec {
    pub name: String,
    pub priority: i32,
    pub rule_set: Option<RuleSetId>,
    pub collider: ColliderKind,
    pub collider_thickness: f32,
    pub noise: ThresholdNoise,
    pub height: Option<HeightSpec>,
    pub objects: Vec<ObjectSpec>,
}

impl RegionSpec {
    /// Regions without a rule set never claim cells.
    #[inline]
    pub fn classifies(&self) -> bool {
        self.rule_set.is_some()
    }
}

/// An object spec as it appears in the global scatter order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectRef {
    pub owner: Option<RegionId>,
    pub index: u16,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamingSettings {
    pub place_per_tick: usize,
    pub clear_per_tick: usize,
    pub regenerate_distance: f32,
    pub generation_period: f32,
}

#[derive(Debug)]
pub struct WorldCatalog {
    pub mode: Mode,
    pub size: i32,
    pub margin: i32,
    pub static_position: Vec2,
    pub cell_size: Vec2,
    pub generate_on_start: bool,
    pub streaming: StreamingSettings,
    pub base_visual: Option<String>,
    pub base_collider: ColliderKind,
    pub base_height: Option<HeightSpec>,
    pub base_objects: Vec<ObjectSpec>,
    /// Sorted by descending priority; the index is the [`RegionId`].
    pub regions: Vec<RegionSpec>,
    pub rules: RuleSetRegistry,
    /// Object specs with at least one visual, by descending priority.
    pub scatter_order: Vec<ObjectRef>,
}

impl WorldCatalog {
    pub fn from_config(cfg: &WorldGenConfig) -> Result<Self, ConfigError> {
        let rules = RuleSetRegistry::from_defs(&cfg.rule_sets);

        let cell_size = Vec2::new(cfg.cell_size[0], cfg.cell_size[1]);
        if !(cell_size.x.is_finite() && cell_size.y.is_finite())
            || cell_size.x <= 0.0
            || cell_size.y <= 0.0
        {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive, got [{}, {}]",
                cell_size.x, cell_size.y
            )));
        }
        let static_position = Vec2::new(cfg.static_position[0], cfg.static_position[1]);
        finite("world", "static_position", static_position.x)?;
        finite("world", "static_position", static_position.y)?;
        if cfg.regions.len() > RegionId::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "at most {} regions are supported, got {}",
                RegionId::MAX,
                cfg.regions.len()
            )));
        }

        let s = &cfg.streaming;
        finite("streaming", "regenerate_distance", s.regenerate_distance)?;
        finite("streaming", "generation_period", s.generation_period)?;
        let streaming = StreamingSettings {
            place_per_tick: s.place_per_tick.max(0) as usize,
            clear_per_tick: s.clear_per_tick.max(0) as usize,
            regenerate_distance: s.regenerate_distance.max(0.0),
            generation_period: s.generation_period.max(0.0),
        };

        let base_height = cfg
            .base
            .height
            .as_ref()
            .map(|h| compile_height("base height", h, &rules))
            .transpose()?;
        let base_objects = compile_objects("base", &cfg.base.objects)?;

        let mut sorted: Vec<&RegionDef> = cfg.regions.iter().collect();
        sorted.sort_by_key(|r| Reverse(r.priority));
        let regions = sorted
            .into_iter()
            .map(|r| compile_region(r, &rules))
            .collect::<Result<Vec<_>, _>>()?;

        let size = cfg.size.max(1);
        let margin = cfg.margin.max(MIN_MARGIN);
        if margin != cfg.margin {
            log::warn!("margin {} raised to {}", cfg.margin, margin);
        }

        let mut catalog = Self {
            mode: cfg.mode,
            size,
            margin,
            static_position,
            cell_size,
            generate_on_start: cfg.generate_on_start,
            streaming,
            base_visual: cfg.base.visual.clone(),
            base_collider: cfg.base.collider,
            base_height,
            base_objects,
            regions,
            rules,
            scatter_order: Vec::new(),
        };
        catalog.scatter_order = catalog.build_scatter_order();
        log::debug!(
            "catalog: {} regions, {} rule sets, {} scatterable objects",
            catalog.regions.len(),
            catalog.rules.len(),
            catalog.scatter_order.len()
        );
        Ok(catalog)
    }

    fn build_scatter_order(&self) -> Vec<ObjectRef> {
        let owners = std::iter::once((None, &self.base_objects)).chain(
            self.regions
                .iter()
                .enumerate()
                .map(|(k, r)| (Some(k as RegionId), &r.objects)),
        );
        let mut order: Vec<(i32, ObjectRef)> = Vec::new();
        for (owner, objects) in owners {
            for (index, spec) in objects.iter().enumerate() {
                if spec.kind.choices().is_empty() {
                    continue;
                }
                order.push((
                    spec.priority,
                    ObjectRef {
                        owner,
                        index: index as u16,
                    },
                ));
            }
        }
        order.sort_by_key(|(p, _)| Reverse(*p));
        order.into_iter().map(|(_, r)| r).collect()
    }

    #[inline]
    pub fn region(&self, id: RegionId) -> Option<&RegionSpec> {
        self.regions.get(id as usize)
    }

    pub fn region_rule_set(&self, id: RegionId) -> Option<&RuleSet> {
        self.region(id)
            .and_then(|r| r.rule_set)
            .and_then(|rs| self.rules.get(rs))
    }

    /// Height spec of an owner; `None` is the base height spec.
    pub fn height_spec(&self, owner: Option<RegionId>) -> Option<&HeightSpec> {
        match owner {
            Some(id) => self.region(id).and_then(|r| r.height.as_ref()),
            None => self.base_height.as_ref(),
        }
    }

    pub fn height_rule_set(&self, owner: Option<RegionId>) -> Option<&RuleSet> {
        self.height_spec(owner)
            .and_then(|h| h.rule_set)
            .and_then(|rs| self.rules.get(rs))
    }

    pub fn objects(&self, owner: Option<RegionId>) -> &[ObjectSpec] {
        match owner {
            Some(id) => self.region(id).map(|r| r.objects.as_slice()).unwrap_or(&[]),
            None => &self.base_objects,
        }
    }

    pub fn object(&self, owner: Option<RegionId>, index: u16) -> Option<&ObjectSpec> {
        self.objects(owner).get(index as usize)
    }
}

fn finite(owner: &str, field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite {
            owner: owner.to_string(),
            field,
            value,
        })
    }
}

fn resolve_rule_set(
    owner: &str,
    name: Option<&String>,
    rules: &RuleSetRegistry,
) -> Result<Option<RuleSetId>, ConfigError> {
    match name {
        None => Ok(None),
        Some(name) => rules
            .id_by_name(name)
            .map(Some)
            .ok_or_else(|| ConfigError::UnknownRuleSet {
                owner: owner.to_string(),
                name: name.clone(),
            }),
    }
}

fn compile_noise(owner: &str, noise: &NoiseDef, threshold: f32) -> Result<ThresholdNoise, ConfigError> {
    finite(owner, "noise.frequency", noise.frequency)?;
    finite(owner, "threshold", threshold)?;
    Ok(ThresholdNoise::new(noise, threshold))
}

fn compile_height(
    owner: &str,
    def: &HeightDef,
    rules: &RuleSetRegistry,
) -> Result<HeightSpec, ConfigError> {
    let rule_set = resolve_rule_set(owner, def.rule_set.as_ref(), rules)?;
    if rule_set.is_none() {
        log::warn!("{owner} has no rule set; no cliffs will be generated for it");
    }
    Ok(HeightSpec {
        rule_set,
        slopes: def.slopes.clone(),
        slope_frequency: def.slope_frequency.clamp(0, MAX_SLOPE_FREQUENCY) as u8,
        collider_thickness: finite(owner, "collider_thickness", def.collider_thickness)?
            .clamp(0.0, 1.0),
        collider_padding: finite(owner, "collider_padding", def.collider_padding)?.clamp(0.0, 1.0),
        noise: compile_noise(owner, &def.noise, def.threshold)?,
    })
}

fn compile_objects(owner: &str, defs: &[ObjectDef]) -> Result<Vec<ObjectSpec>, ConfigError> {
    defs.iter()
        .enumerate()
        .map(|(k, def)| {
            let name = def.name.clone().unwrap_or_else(|| format!("{owner} object {k}"));
            let kind = match &def.kind {
                ObjectKindDef::Prefab(v) => ObjectKind::Prefab(v.clone()),
                ObjectKindDef::Sprite(v) => ObjectKind::Sprite(v.clone()),
            };
            if kind.choices().is_empty() {
                log::warn!("{name} has no visuals and will never be scattered");
            }
            Ok(ObjectSpec {
                kind,
                priority: def.priority,
                collider: def.collider,
                collider_size: finite(&name, "collider_size", def.collider_size)?.max(0.0),
                scale: finite(&name, "scale", def.scale)?,
                covers_height: def.covers_height,
                noise: compile_noise(&name, &def.noise, def.threshold)?,
                name,
            })
        })
        .collect()
}

fn compile_region(def: &RegionDef, rules: &RuleSetRegistry) -> Result<RegionSpec, ConfigError> {
    let owner = format!("region '{}'", def.name);
    let rule_set = resolve_rule_set(&owner, def.rule_set.as_ref(), rules)?;
    if rule_set.is_none() {
        log::warn!("{owner} has no rule set and will not claim any cells");
    }
    let height = def
        .height
        .as_ref()
        .map(|h| compile_height(&format!("{owner} height"), h, rules))
        .transpose()?;
    Ok(RegionSpec {
        name: def.name.clone(),
        priority: def.priority,
        rule_set,
        collider: def.collider,
        collider_thickness: finite(&owner, "collider_thickness", def.collider_thickness)?
            .clamp(0.0, 1.0),
        noise: compile_noise(&owner, &def.noise, def.threshold)?,
        height,
        objects: compile_objects(&owner, &def.objects)?,
    })
}
