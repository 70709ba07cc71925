use tilegen_geom::{Cell, Layer};

/// Dense id of a region: its index after sorting regions by descending priority.
pub type RegionId = u16;

/// Which missing cardinal a slope tile faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlopeDir {
    /// Everything but the cell below belongs to the cliff.
    Bottom,
    Top,
    Right,
    Left,
}

/// What a cell shows on its layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileCode {
    /// Owner's default visual, or the world base visual when there is no owner.
    Default,
    /// Index into the owner's rule set.
    Rule(u16),
    Slope(SlopeDir),
    /// Index into the owner's object list.
    Object(u16),
}

impl TileCode {
    #[inline]
    pub fn rule_index(self) -> Option<usize> {
        match self {
            TileCode::Rule(k) => Some(k as usize),
            _ => None,
        }
    }
}

/// One output of a generation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TilePlacement {
    pub cell: Cell,
    pub layer: Layer,
    /// `None` is the base (unclaimed) terrain.
    pub owner: Option<RegionId>,
    pub code: TileCode,
}
