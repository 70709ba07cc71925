use serde::Deserialize;
use tilegen_geom::{EIGHT_DIRECTIONS, Offset};

/// Neighbor constraint of a tiling rule, and the state a signature records for a neighbor.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Neighbor {
    #[default]
    Any,
    This,
    NotThis,
}

/// Presence flags for the eight neighbors, indexed like `EIGHT_DIRECTIONS`.
pub type Occupancy = [bool; 8];

/// Per-neighbor expected states around a cell. `None` leaves a neighbor unconstrained,
/// so rules that mention it neither gain nor lose score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    slots: [Option<Neighbor>; 8],
}

impl Signature {
    /// A signature with no recorded neighbors; every rule scores zero against it.
    pub const fn unconstrained() -> Self {
        Self { slots: [None; 8] }
    }

    pub fn from_fn(mut f: impl FnMut(Offset) -> Neighbor) -> Self {
        let mut slots = [None; 8];
        for (slot, d) in slots.iter_mut().zip(EIGHT_DIRECTIONS) {
            *slot = Some(f(d));
        }
        Self { slots }
    }

    #[inline]
    pub fn get(&self, at: Offset) -> Option<Neighbor> {
        at.neighbor_slot().and_then(|s| self.slots[s])
    }

    pub fn is_unconstrained(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TilingRule {
    pub visuals: Vec<String>,
    pub constraints: Vec<(Offset, Neighbor)>,
}

impl TilingRule {
    #[inline]
    pub fn has_visuals(&self) -> bool {
        !self.visuals.is_empty()
    }

    #[inline]
    pub fn first_visual(&self) -> Option<&str> {
        self.visuals.first().map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleSet {
    pub name: String,
    pub default_visual: Option<String>,
    pub rules: Vec<TilingRule>,
}

impl RuleSet {
    #[inline]
    pub fn rule(&self, index: usize) -> Option<&TilingRule> {
        self.rules.get(index)
    }

    /// Visual for a rule index, or the default visual for `None`.
    pub fn visual(&self, index: Option<usize>) -> Option<&str> {
        match index {
            Some(k) => self.rule(k).and_then(TilingRule::first_visual),
            None => self.default_visual.as_deref(),
        }
    }
}
