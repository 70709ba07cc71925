//! TOML dump of a recorded picture, for diffing worlds between config edits.

use std::error::Error;
use std::path::Path;

use serde::Serialize;
use tilegen_geom::ColliderShape;
use tilegen_runtime::{RecordingHost, Visual};

#[derive(Serialize)]
struct Snapshot {
    tiles: Vec<TileRow>,
}

#[derive(Serialize)]
struct TileRow {
    x: i32,
    y: i32,
    layer: &'static str,
    kind: &'static str,
    visual: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    collider: Option<&'static str>,
}

fn collider_name(shape: &ColliderShape) -> &'static str {
    match shape {
        ColliderShape::Box { .. } => "box",
        ColliderShape::Polygon { .. } => "polygon",
        ColliderShape::Circle { .. } => "circle",
    }
}

pub fn write_snapshot(host: &RecordingHost, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut entries: Vec<_> = host.tiles.iter().collect();
    entries.sort_unstable_by_key(|((cell, layer), _)| (*layer, cell.y, cell.x));
    let tiles = entries
        .into_iter()
        .map(|((cell, layer), cmd)| TileRow {
            x: cell.x,
            y: cell.y,
            layer: layer.name(),
            kind: match cmd.visual {
                Visual::Tile(_) => "tile",
                Visual::Sprite { .. } => "sprite",
                Visual::Prefab { .. } => "prefab",
            },
            visual: cmd.visual.name().to_owned(),
            collider: cmd.collider.as_ref().map(collider_name),
        })
        .collect();
    let text = toml::to_string_pretty(&Snapshot { tiles })?;
    std::fs::write(path, text)?;
    log::info!("wrote {} tiles to {:?}", host.tiles.len(), path);
    Ok(())
}
