use rayon::prelude::*;
use tilegen_geom::FOUR_DIRECTIONS;

use crate::catalog::WorldCatalog;
use crate::grid::{Grid, PassWindow};
use crate::tile::RegionId;

pub type RegionGrid = Grid<Option<RegionId>>;

/// Assigns each buffer cell the highest-priority region whose noise clears its threshold.
pub fn classify_regions(catalog: &WorldCatalog, window: &PassWindow) -> RegionGrid {
    let side = window.side();
    let cells: Vec<Option<RegionId>> = (0..window.len())
        .into_par_iter()
        .map(|i| {
            let (x, y) = window.coords(i);
            let w = window.world(x, y);
            catalog
                .regions
                .iter()
                .position(|r| r.classifies() && r.noise.accepts(w.x, w.y))
                .map(|k| k as RegionId)
        })
        .collect();
    Grid::from_vec(side, cells, None)
}

/// Fills single-cell holes: an empty cell with at least three 4-neighbors of one region
/// joins that region. One in-place sweep over the emitted window.
pub fn close_gaps(grid: &mut RegionGrid, window: &PassWindow) -> usize {
    let mut filled = 0;
    for (x, y) in window.output_cells() {
        if grid.get(x, y).is_some() {
            continue;
        }
        if let Some(id) = majority_of_four(|d| grid.neighbor(x, y, d)) {
            grid.set(x, y, Some(id));
            filled += 1;
        }
    }
    filled
}

/// The value held by at least three of the four cardinal neighbors, if any.
pub(crate) fn majority_of_four<T: Copy + PartialEq>(
    at: impl Fn(tilegen_geom::Offset) -> Option<T>,
) -> Option<T> {
    let around = FOUR_DIRECTIONS.map(&at);
    around.iter().flatten().copied().find(|candidate| {
        around.iter().filter(|v| **v == Some(*candidate)).count() >= 3
    })
}
