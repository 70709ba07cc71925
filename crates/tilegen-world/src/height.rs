//! Raised terrain: which cells are elevated, which are cliff edges, and where slopes go.

use rayon::prelude::*;
use tilegen_geom::{EIGHT_DIRECTIONS, Layer, Offset};
use tilegen_rules::{cliff_signature, match_rule};

use crate::catalog::WorldCatalog;
use crate::classify::{RegionGrid, majority_of_four};
use crate::grid::{Grid, PassWindow};
use crate::hash::should_place_slope;
use crate::tile::{RegionId, SlopeDir, TileCode, TilePlacement};

/// Owner of an elevated cell. `Base` is elevation on unclaimed terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeightOwner {
    Base,
    Region(RegionId),
}

impl HeightOwner {
    #[inline]
    pub fn region(self) -> Option<RegionId> {
        match self {
            HeightOwner::Base => None,
            HeightOwner::Region(id) => Some(id),
        }
    }
}

pub type HeightGrid = Grid<Option<HeightOwner>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeightReport {
    pub seeded: usize,
    pub filled: usize,
    pub pruned: usize,
    pub slopes: usize,
}

#[derive(Debug)]
pub struct HeightLayer {
    pub tiles: Vec<TilePlacement>,
    pub owners: HeightGrid,
    /// Cliff edge or slope cells; objects never land on these.
    pub edges: Grid<bool>,
    pub report: HeightReport,
}

pub fn build_height_layer(
    catalog: &WorldCatalog,
    window: &PassWindow,
    regions: &RegionGrid,
) -> HeightLayer {
    let mut report = HeightReport::default();
    let mut owners = classify_heights(catalog, window, regions);
    report.seeded = owners.as_slice().iter().filter(|o| o.is_some()).count();
    report.filled = fill_height_gaps(&mut owners);
    let mut slopes: Grid<Option<SlopeDir>> = Grid::new(window.side(), None, None);
    let (pruned, placed) = prune_and_slope(catalog, window, &mut owners, &mut slopes);
    report.pruned = pruned;
    report.slopes = placed;

    let mut edges = Grid::new(window.side(), false, false);
    let mut tiles = Vec::new();
    for (x, y) in window.output_cells() {
        let Some(owner) = owners.get(x, y) else { continue };
        let cell = window.world(x, y);
        let spec = catalog.height_spec(owner.region());
        let slope = slopes
            .get(x, y)
            .filter(|dir| spec.is_some_and(|s| s.slope_visual(*dir).is_some()));
        let code = if let Some(dir) = slope {
            edges.set(x, y, true);
            TileCode::Slope(dir)
        } else {
            let same = same_owner(&owners, x, y, owner);
            if same.iter().all(|s| *s) {
                TileCode::Default
            } else {
                edges.set(x, y, true);
                catalog
                    .height_rule_set(owner.region())
                    .and_then(|set| match_rule(set, &cliff_signature(&same)))
                    .map_or(TileCode::Default, |k| TileCode::Rule(k as u16))
            }
        };
        tiles.push(TilePlacement {
            cell,
            layer: Layer::Height,
            owner: owner.region(),
            code,
        });
    }

    HeightLayer {
        tiles,
        owners,
        edges,
        report,
    }
}

fn same_owner(owners: &HeightGrid, x: i32, y: i32, owner: HeightOwner) -> [bool; 8] {
    EIGHT_DIRECTIONS.map(|d| owners.neighbor(x, y, d) == Some(owner))
}

/// A cell is elevated only when its whole 3x3 neighborhood shares its base classification
/// and the owner's height noise clears the threshold.
fn classify_heights(catalog: &WorldCatalog, window: &PassWindow, regions: &RegionGrid) -> HeightGrid {
    let side = window.side();
    let cells: Vec<Option<HeightOwner>> = (0..window.len())
        .into_par_iter()
        .map(|i| {
            let (x, y) = window.coords(i);
            if x < 1 || y < 1 || x >= side - 1 || y >= side - 1 {
                return None;
            }
            let base = regions.get(x, y);
            let spec = catalog.height_spec(base).filter(|h| h.rule_set.is_some())?;
            let w = window.world(x, y);
            let uniform = EIGHT_DIRECTIONS
                .iter()
                .all(|d| regions.neighbor(x, y, *d) == base);
            (uniform && spec.noise.accepts(w.x, w.y)).then_some(match base {
                Some(id) => HeightOwner::Region(id),
                None => HeightOwner::Base,
            })
        })
        .collect();
    Grid::from_vec(side, cells, None)
}

fn fill_height_gaps(owners: &mut HeightGrid) -> usize {
    let side = owners.side();
    let mut filled = 0;
    for y in 1..side - 1 {
        for x in 1..side - 1 {
            if owners.get(x, y).is_some() {
                continue;
            }
            if let Some(owner) = majority_of_four(|d| owners.neighbor(x, y, d)) {
                owners.set(x, y, Some(owner));
                filled += 1;
            }
        }
    }
    filled
}

/// Each cell must sit in an L of three same-owner neighbors (side, corner, side); a cell with
/// all four sides but only one diagonal pair is an inconsistent pinch.
fn holds_shape(owners: &HeightGrid, x: i32, y: i32, owner: HeightOwner) -> bool {
    let is = |dx: i32, dy: i32| owners.neighbor(x, y, Offset::new(dx, dy)) == Some(owner);
    let (t, b, l, r) = (is(0, 1), is(0, -1), is(-1, 0), is(1, 0));
    let (tl, tr, bl, br) = (is(-1, 1), is(1, 1), is(-1, -1), is(1, -1));
    let l_shape = (t && tl && l) || (t && tr && r) || (b && bl && l) || (b && br && r);
    let all_sides = t && b && l && r;
    let pinched = all_sides && ((tr && bl && !tl && !br) || (!tr && !bl && tl && br));
    l_shape && !pinched
}

fn slope_for(owners: &HeightGrid, x: i32, y: i32, owner: HeightOwner) -> Option<SlopeDir> {
    let same = same_owner(owners, x, y, owner);
    if same.iter().all(|s| *s) {
        return None;
    }
    let (tp, dn, lf, rt) = (same[0], same[1], same[2], same[3]);
    match (tp, dn, lf, rt) {
        (true, false, true, true) => Some(SlopeDir::Bottom),
        (false, true, true, true) => Some(SlopeDir::Top),
        (true, true, true, false) => Some(SlopeDir::Right),
        (true, true, false, true) => Some(SlopeDir::Left),
        _ => None,
    }
}

/// Flood-fills every elevated component, strips cells that cannot form a clean cliff outline
/// until nothing changes, then marks slope cells on what remains.
fn prune_and_slope(
    catalog: &WorldCatalog,
    window: &PassWindow,
    owners: &mut HeightGrid,
    slopes: &mut Grid<Option<SlopeDir>>,
) -> (usize, usize) {
    let side = owners.side();
    let mut visited = Grid::new(side, false, true);
    let mut stack: Vec<(i32, i32)> = Vec::new();
    let mut members: Vec<(i32, i32)> = Vec::new();
    let (mut pruned, mut placed) = (0, 0);

    for y in 1..side - 1 {
        for x in 1..side - 1 {
            let Some(owner) = owners.get(x, y) else { continue };
            if visited.get(x, y) {
                continue;
            }
            members.clear();
            stack.push((x, y));
            visited.set(x, y, true);
            while let Some((cx, cy)) = stack.pop() {
                members.push((cx, cy));
                for d in EIGHT_DIRECTIONS {
                    let (nx, ny) = (cx + d.dx, cy + d.dy);
                    if !visited.get(nx, ny) && owners.get(nx, ny) == Some(owner) {
                        visited.set(nx, ny, true);
                        stack.push((nx, ny));
                    }
                }
            }

            loop {
                let before = members.len();
                members.retain(|&(mx, my)| {
                    let keep = holds_shape(owners, mx, my, owner);
                    if !keep {
                        owners.set(mx, my, None);
                    }
                    keep
                });
                pruned += before - members.len();
                if members.len() == before {
                    break;
                }
            }

            let frequency = catalog
                .height_spec(owner.region())
                .map_or(0, |h| h.slope_frequency);
            for &(mx, my) in &members {
                let w = window.world(mx, my);
                if !should_place_slope(w.x, w.y, frequency) {
                    continue;
                }
                if let Some(dir) = slope_for(owners, mx, my, owner) {
                    slopes.set(mx, my, Some(dir));
                    placed += 1;
                }
            }
        }
    }
    (pruned, placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worldgen::WorldGenConfig;
    use tilegen_geom::Cell;

    fn owners_with(side: i32, cells: &[(i32, i32)]) -> HeightGrid {
        let mut g = Grid::new(side, None, None);
        for &(x, y) in cells {
            g.set(x, y, Some(HeightOwner::Base));
        }
        g
    }

    fn block(x0: i32, y0: i32, w: i32, h: i32) -> Vec<(i32, i32)> {
        (y0..y0 + h).flat_map(|y| (x0..x0 + w).map(move |x| (x, y))).collect()
    }

    fn catalog(slope_frequency: i32) -> WorldCatalog {
        let toml = format!(
            r#"
            [base.height]
            rule_set = "cliff"
            threshold = 0.0
            slope_frequency = {slope_frequency}
            slopes = {{ top = "st", bottom = "sb", left = "sl", right = "sr" }}

            [rule_sets.cliff]
            default_visual = "cliff_top"

            [[rule_sets.cliff.rules]]
            visuals = ["cliff_edge"]
        "#
        );
        WorldCatalog::from_config(&WorldGenConfig::from_toml_str(&toml).unwrap()).unwrap()
    }

    #[test]
    fn single_thin_line_is_pruned_away() {
        let mut owners = owners_with(12, &block(2, 5, 7, 1));
        let mut slopes = Grid::new(12, None, None);
        let window = PassWindow::new(Cell::new(0, 0), 6, 3);
        let (pruned, _) = prune_and_slope(&catalog(0), &window, &mut owners, &mut slopes);
        assert_eq!(pruned, 7);
        assert!(owners.as_slice().iter().all(Option::is_none));
    }

    #[test]
    fn solid_block_survives_pruning() {
        let cells = block(3, 3, 4, 4);
        let mut owners = owners_with(12, &cells);
        let mut slopes = Grid::new(12, None, None);
        let window = PassWindow::new(Cell::new(0, 0), 6, 3);
        let (pruned, placed) = prune_and_slope(&catalog(0), &window, &mut owners, &mut slopes);
        assert_eq!(pruned, 0);
        assert_eq!(placed, 0);
        assert!(cells.iter().all(|&(x, y)| owners.get(x, y) == Some(HeightOwner::Base)));
    }

    #[test]
    fn pinched_diagonal_cell_is_removed() {
        // centre has all four sides and only the top-left/bottom-right diagonals
        let mut owners = owners_with(5, &[(2, 2), (2, 3), (2, 1), (1, 2), (3, 2), (1, 3), (3, 1)]);
        assert!(!holds_shape(&owners, 2, 2, HeightOwner::Base));
        owners.set(3, 3, Some(HeightOwner::Base));
        owners.set(1, 1, Some(HeightOwner::Base));
        assert!(holds_shape(&owners, 2, 2, HeightOwner::Base));
    }

    #[test]
    fn edge_cells_get_slopes_when_enabled() {
        let mut owners = owners_with(12, &block(3, 3, 5, 5));
        let mut slopes = Grid::new(12, None, None);
        let window = PassWindow::new(Cell::new(0, 0), 6, 3);
        let (_, placed) = prune_and_slope(&catalog(10), &window, &mut owners, &mut slopes);
        assert!(placed > 0);
        // middle of the bottom edge: everything but the cell below is raised
        assert_eq!(slopes.get(5, 3), Some(SlopeDir::Bottom));
        assert_eq!(slopes.get(5, 7), Some(SlopeDir::Top));
        // interior and corners never slope
        assert_eq!(slopes.get(5, 5), None);
        assert_eq!(slopes.get(3, 3), None);
    }

    #[test]
    fn base_height_needs_an_unclaimed_neighborhood() {
        let cat = catalog(0);
        let window = PassWindow::new(Cell::new(0, 0), 4, 3);
        let mut regions: RegionGrid = Grid::new(window.side(), None, None);
        regions.set(5, 5, Some(0));
        let owners = classify_heights(&cat, &window, &regions);
        assert_eq!(owners.get(5, 5), None);
        assert_eq!(owners.get(4, 4), None);
        assert_eq!(owners.get(2, 2), Some(HeightOwner::Base));
        // buffer rim is never elevated
        assert_eq!(owners.get(0, 3), None);
    }

    #[test]
    fn layer_marks_edges_and_keeps_interior_default() {
        let cat = catalog(0);
        let window = PassWindow::new(Cell::new(0, 0), 6, 3);
        let regions: RegionGrid = Grid::new(window.side(), None, None);
        let layer = build_height_layer(&cat, &window, &regions);
        // every buffer cell except the rim is elevated, so the emitted window is all interior
        assert_eq!(layer.tiles.len(), 36);
        assert!(layer.tiles.iter().all(|t| t.code == TileCode::Default && t.owner.is_none()));
        assert!(window.output_cells().all(|(x, y)| !layer.edges.get(x, y)));
    }
}
