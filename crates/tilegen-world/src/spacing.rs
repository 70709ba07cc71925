//! Keeps different regions apart.
//!
//! The first pass removes direct contact between regions. The second removes two-cell
//! bridges: two region cells facing each other across a single empty cell. Conflicts go to
//! the higher priority region; equal priorities clear the lexicographically smaller position.

use tilegen_geom::EIGHT_DIRECTIONS;

use crate::catalog::WorldCatalog;
use crate::classify::RegionGrid;
use crate::grid::{Grid, PassWindow};
use crate::tile::RegionId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpacingReport {
    pub adjacent_cleared: usize,
    pub bridged_cleared: usize,
    pub components: usize,
}

/// Union-find over connectivity labels. Label 0 means unlabelled.
#[derive(Debug)]
struct Labels {
    parent: Vec<u32>,
}

impl Labels {
    fn new() -> Self {
        Self { parent: vec![0] }
    }

    fn fresh(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    fn find(&mut self, mut a: u32) -> u32 {
        while self.parent[a as usize] != a {
            let grand = self.parent[self.parent[a as usize] as usize];
            self.parent[a as usize] = grand;
            a = grand;
        }
        a
    }

    /// Merges two sets; the smaller root survives.
    fn union(&mut self, a: u32, b: u32) -> u32 {
        let (ra, rb) = (self.find(a), self.find(b));
        let (lo, hi) = (ra.min(rb), ra.max(rb));
        self.parent[hi as usize] = lo;
        lo
    }

    fn roots(&self) -> usize {
        self.parent
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(k, p)| *k as u32 == **p)
            .count()
    }
}

/// Returns true when cell `a` (holding `ra`) must yield to cell `b` (holding `rb`).
fn yields(catalog: &WorldCatalog, a: (i32, i32), ra: RegionId, b: (i32, i32), rb: RegionId) -> bool {
    let pa = catalog.region(ra).map_or(i32::MIN, |r| r.priority);
    let pb = catalog.region(rb).map_or(i32::MIN, |r| r.priority);
    match pa.cmp(&pb) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => a < b,
    }
}

pub fn enforce_spacing(
    grid: &mut RegionGrid,
    catalog: &WorldCatalog,
    window: &PassWindow,
) -> SpacingReport {
    let search = (window.margin - 2).max(0);
    let lo = window.margin - search;
    let hi = window.side() - window.margin + search;
    let mut report = SpacingReport::default();
    let mut labels = Labels::new();
    let mut cell_label: Grid<u32> = Grid::new(window.side(), 0, 0);

    // Pass 1: direct contact, and connectivity labels for the survivors.
    for y in lo..hi {
        for x in lo..hi {
            let Some(n) = grid.get(x, y) else { continue };
            let mut cleared = false;
            for d in EIGHT_DIRECTIONS {
                let (nx, ny) = (x + d.dx, y + d.dy);
                let Some(m) = grid.get(nx, ny) else { continue };
                if m == n {
                    continue;
                }
                report.adjacent_cleared += 1;
                if yields(catalog, (x, y), n, (nx, ny), m) {
                    grid.set(x, y, None);
                    cleared = true;
                    break;
                }
                grid.set(nx, ny, None);
            }
            if cleared {
                continue;
            }
            let mut root: Option<u32> = None;
            for d in EIGHT_DIRECTIONS {
                let (nx, ny) = (x + d.dx, y + d.dy);
                let l = cell_label.get(nx, ny);
                if l == 0 || grid.get(nx, ny) != Some(n) {
                    continue;
                }
                root = Some(match root {
                    None => labels.find(l),
                    Some(r) => labels.union(r, l),
                });
            }
            let label = root.unwrap_or_else(|| labels.fresh());
            cell_label.set(x, y, label);
        }
    }
    report.components = labels.roots();

    // Pass 2: cells two steps apart with an empty cell between them.
    let mut side_cells: Vec<(i32, i32)> = Vec::new();
    for y in lo..hi {
        for x in lo..hi {
            let Some(n) = grid.get(x, y) else { continue };
            side_cells.clear();
            let mut lose = false;
            'scan: for d1 in EIGHT_DIRECTIONS {
                let (ex, ey) = (x + d1.dx, y + d1.dy);
                if grid.get(ex, ey).is_some() || !grid.contains(ex, ey) {
                    continue;
                }
                for d2 in EIGHT_DIRECTIONS {
                    let (qx, qy) = (ex + d2.dx, ey + d2.dy);
                    if (qx, qy) == (x, y) {
                        continue;
                    }
                    let Some(m) = grid.get(qx, qy) else { continue };
                    let (dx, dy) = (qx - x, qy - y);
                    if dx * dx + dy * dy <= 1 {
                        continue;
                    }
                    if m == n {
                        let (la, lb) = (cell_label.get(x, y), cell_label.get(qx, qy));
                        // Unlabelled cells lie outside the scanned band; leave them alone.
                        if la == 0 || lb == 0 || labels.find(la) == labels.find(lb) {
                            continue;
                        }
                    }
                    if yields(catalog, (x, y), n, (qx, qy), m) {
                        lose = true;
                        break 'scan;
                    }
                    side_cells.push((qx, qy));
                }
            }
            if lose {
                grid.set(x, y, None);
                report.bridged_cleared += 1;
            } else {
                for &(qx, qy) in &side_cells {
                    if grid.get(qx, qy).is_some() {
                        grid.set(qx, qy, None);
                        report.bridged_cleared += 1;
                    }
                }
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worldgen::WorldGenConfig;
    use tilegen_geom::Cell;

    fn two_regions(p0: i32, p1: i32) -> WorldCatalog {
        let toml = format!(
            r#"
            [[regions]]
            name = "a"
            priority = {p0}
            rule_set = "r"

            [[regions]]
            name = "b"
            priority = {p1}
            rule_set = "r"

            [rule_sets.r]
        "#
        );
        WorldCatalog::from_config(&WorldGenConfig::from_toml_str(&toml).unwrap()).unwrap()
    }

    fn empty(window: &PassWindow) -> RegionGrid {
        Grid::new(window.side(), None, None)
    }

    #[test]
    fn adjacent_conflict_clears_lower_priority() {
        let cat = two_regions(5, 1);
        let window = PassWindow::new(Cell::new(0, 0), 6, 3);
        let mut g = empty(&window);
        g.set(5, 5, Some(0));
        g.set(6, 6, Some(1));
        let report = enforce_spacing(&mut g, &cat, &window);
        assert_eq!(g.get(5, 5), Some(0));
        assert_eq!(g.get(6, 6), None);
        assert_eq!(report.adjacent_cleared, 1);
    }

    #[test]
    fn equal_priority_clears_lexicographically_smaller_cell() {
        let cat = two_regions(2, 2);
        let window = PassWindow::new(Cell::new(0, 0), 6, 3);
        let mut g = empty(&window);
        g.set(5, 5, Some(0));
        g.set(6, 5, Some(1));
        enforce_spacing(&mut g, &cat, &window);
        assert_eq!(g.get(5, 5), None);
        assert_eq!(g.get(6, 5), Some(1));
    }

    #[test]
    fn bridge_across_one_empty_cell_is_removed() {
        let cat = two_regions(2, 2);
        let window = PassWindow::new(Cell::new(0, 0), 6, 3);
        let mut g = empty(&window);
        g.set(4, 5, Some(1));
        g.set(6, 5, Some(0));
        let report = enforce_spacing(&mut g, &cat, &window);
        // (4,5) < (6,5), so the left cell goes.
        assert_eq!(g.get(4, 5), None);
        assert_eq!(g.get(6, 5), Some(0));
        assert_eq!(report.bridged_cleared, 1);
    }

    #[test]
    fn same_component_wrapping_around_a_hole_is_kept() {
        let cat = two_regions(1, 1);
        let window = PassWindow::new(Cell::new(0, 0), 6, 3);
        let mut g = empty(&window);
        // ring of region 0 around (5,5)
        for (x, y) in [(4, 4), (5, 4), (6, 4), (4, 5), (6, 5), (4, 6), (5, 6), (6, 6)] {
            g.set(x, y, Some(0));
        }
        let report = enforce_spacing(&mut g, &cat, &window);
        assert_eq!(report.adjacent_cleared + report.bridged_cleared, 0);
        assert_eq!(report.components, 1);
    }

    #[test]
    fn separate_blobs_of_one_region_keep_a_two_cell_gap() {
        let cat = two_regions(1, 1);
        let window = PassWindow::new(Cell::new(0, 0), 6, 3);
        let mut g = empty(&window);
        g.set(4, 4, Some(0));
        g.set(6, 4, Some(0));
        enforce_spacing(&mut g, &cat, &window);
        assert_eq!(g.get(4, 4), None);
        assert_eq!(g.get(6, 4), Some(0));
    }

    #[test]
    fn labels_merge_to_smallest_root() {
        let mut l = Labels::new();
        let a = l.fresh();
        let b = l.fresh();
        let c = l.fresh();
        assert_eq!(l.union(c, b), b);
        assert_eq!(l.union(b, a), a);
        assert_eq!(l.find(c), a);
        assert_eq!(l.roots(), 1);
    }
}
