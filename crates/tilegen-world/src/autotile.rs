use rayon::prelude::*;
use tilegen_geom::{EIGHT_DIRECTIONS, Layer};
use tilegen_rules::{match_rule, transition_signature};

use crate::catalog::WorldCatalog;
use crate::classify::RegionGrid;
use crate::grid::{Grid, PassWindow};
use crate::tile::{RegionId, TileCode, TilePlacement};

/// Base layer tiles plus the transition region of every edge cell.
#[derive(Debug)]
pub struct BaseLayer {
    pub tiles: Vec<TilePlacement>,
    pub transitions: Grid<Option<RegionId>>,
}

/// Resolves one base tile per emitted cell.
///
/// Classified cells show their region's default visual. Unclassified cells next to a region
/// become transition tiles of the last such neighbor in scan order; the rest show the world
/// base visual.
pub fn resolve_base_tiles(
    catalog: &WorldCatalog,
    window: &PassWindow,
    regions: &RegionGrid,
) -> BaseLayer {
    let cells: Vec<(i32, i32)> = window.output_cells().collect();
    let resolved: Vec<(TilePlacement, Option<RegionId>)> = cells
        .par_iter()
        .map(|&(x, y)| {
            let cell = window.world(x, y);
            if let Some(n) = regions.get(x, y) {
                return (
                    TilePlacement {
                        cell,
                        layer: Layer::Base,
                        owner: Some(n),
                        code: TileCode::Default,
                    },
                    None,
                );
            }
            let Some(t) = EIGHT_DIRECTIONS
                .iter()
                .rev()
                .find_map(|d| regions.neighbor(x, y, *d))
            else {
                return (
                    TilePlacement {
                        cell,
                        layer: Layer::Base,
                        owner: None,
                        code: TileCode::Default,
                    },
                    None,
                );
            };
            let present = EIGHT_DIRECTIONS.map(|d| regions.neighbor(x, y, d) == Some(t));
            let code = catalog
                .region_rule_set(t)
                .and_then(|set| match_rule(set, &transition_signature(&present)))
                .map_or(TileCode::Default, |k| TileCode::Rule(k as u16));
            (
                TilePlacement {
                    cell,
                    layer: Layer::Base,
                    owner: Some(t),
                    code,
                },
                Some(t),
            )
        })
        .collect();

    let mut transitions = Grid::new(window.side(), None, None);
    for (&(x, y), (_, t)) in cells.iter().zip(&resolved) {
        transitions.set(x, y, *t);
    }
    BaseLayer {
        tiles: resolved.into_iter().map(|(p, _)| p).collect(),
        transitions,
    }
}
