use tilegen_geom::{Cell, Layer};

use crate::autotile::resolve_base_tiles;
use crate::catalog::WorldCatalog;
use crate::classify::{classify_regions, close_gaps};
use crate::grid::PassWindow;
use crate::height::{HeightReport, build_height_layer};
use crate::scatter::scatter_objects;
use crate::spacing::{SpacingReport, enforce_spacing};
use crate::tile::TilePlacement;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub classified: usize,
    pub gaps_filled: usize,
    pub spacing: SpacingReport,
    pub height: HeightReport,
    pub base_tiles: usize,
    pub height_tiles: usize,
    pub objects: usize,
}

#[derive(Debug, Default)]
pub struct PassOutput {
    /// Base tiles, then height tiles, then objects; each group in row-major window order.
    pub tiles: Vec<TilePlacement>,
    pub stats: PassStats,
}

impl PassOutput {
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &TilePlacement> {
        self.tiles.iter().filter(move |t| t.layer == layer)
    }
}

/// Runs every stage for the `size x size` window whose bottom-left cell is `bottom_left`.
///
/// The working buffers exist only for the duration of the call.
pub fn generate_pass(catalog: &WorldCatalog, bottom_left: Cell, size: i32) -> PassOutput {
    let window = PassWindow::new(bottom_left, size, catalog.margin);
    let mut stats = PassStats::default();

    let mut regions = classify_regions(catalog, &window);
    stats.classified = regions.as_slice().iter().filter(|r| r.is_some()).count();
    stats.spacing = enforce_spacing(&mut regions, catalog, &window);
    stats.gaps_filled = close_gaps(&mut regions, &window);

    let base = resolve_base_tiles(catalog, &window, &regions);
    let height = build_height_layer(catalog, &window, &regions);
    let objects = scatter_objects(
        catalog,
        &window,
        &regions,
        &base.transitions,
        &height.owners,
        &height.edges,
    );

    stats.height = height.report;
    stats.base_tiles = base.tiles.len();
    stats.height_tiles = height.tiles.len();
    stats.objects = objects.len();

    let mut tiles = base.tiles;
    tiles.extend(height.tiles);
    tiles.extend(objects);
    log::debug!(
        "pass at ({}, {}) size {}: {} classified, {:?}, {} gaps filled, {} base, {} height, {} objects",
        bottom_left.x,
        bottom_left.y,
        window.size,
        stats.classified,
        stats.spacing,
        stats.gaps_filled,
        stats.base_tiles,
        stats.height_tiles,
        stats.objects
    );
    PassOutput { tiles, stats }
}
