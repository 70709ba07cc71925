use tilegen_geom::Layer;

use crate::catalog::WorldCatalog;
use crate::classify::RegionGrid;
use crate::grid::{Grid, PassWindow};
use crate::height::HeightGrid;
use crate::tile::{RegionId, TileCode, TilePlacement};

/// Places at most one object per emitted cell.
///
/// Transition tiles and cliff edges stay clear. The first object in priority order that belongs
/// to the cell's region and whose noise clears its threshold wins; raised cells only take
/// objects that cover heights.
pub fn scatter_objects(
    catalog: &WorldCatalog,
    window: &PassWindow,
    regions: &RegionGrid,
    transitions: &Grid<Option<RegionId>>,
    heights: &HeightGrid,
    edges: &Grid<bool>,
) -> Vec<TilePlacement> {
    let mut out = Vec::new();
    if catalog.scatter_order.is_empty() {
        return out;
    }
    for (x, y) in window.output_cells() {
        if transitions.get(x, y).is_some() || edges.get(x, y) {
            continue;
        }
        let owner = regions.get(x, y);
        let cell = window.world(x, y);
        let picked = catalog
            .scatter_order
            .iter()
            .filter(|r| r.owner == owner)
            .find_map(|r| {
                let spec = catalog.object(r.owner, r.index)?;
                spec.noise.accepts(cell.x, cell.y).then_some((r.index, spec))
            });
        let Some((index, spec)) = picked else { continue };
        let layer = if heights.get(x, y).is_some() {
            if !spec.covers_height {
                continue;
            }
            Layer::HeightObjects
        } else {
            Layer::BaseObjects
        };
        out.push(TilePlacement {
            cell,
            layer,
            owner,
            code: TileCode::Object(index),
        });
    }
    out
}
