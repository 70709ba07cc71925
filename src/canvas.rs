//! Text rendering of whatever a [`RecordingHost`] currently shows.

use std::fmt::Write as _;

use hashbrown::{HashMap, HashSet};
use tilegen_geom::{Cell, Layer};
use tilegen_runtime::RecordingHost;

/// Topmost first.
const STACK: [Layer; 4] = [
    Layer::HeightObjects,
    Layer::Height,
    Layer::BaseObjects,
    Layer::Base,
];

const FALLBACK_GLYPHS: &str = "0123456789#%&*+=?@$~";

/// One glyph per visual name, stable for a given set of names.
fn assign_glyphs<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<&'a str, char> {
    let mut sorted: Vec<&str> = names.collect();
    sorted.sort_unstable();
    sorted.dedup();
    let mut taken: HashSet<char> = HashSet::new();
    let mut glyphs = HashMap::with_capacity(sorted.len());
    for name in sorted {
        let first = name.chars().find(|c| c.is_ascii_alphanumeric()).unwrap_or('?');
        let candidates = [first.to_ascii_lowercase(), first.to_ascii_uppercase()];
        let glyph = candidates
            .into_iter()
            .chain(FALLBACK_GLYPHS.chars())
            .find(|c| !taken.contains(c))
            .unwrap_or('.');
        taken.insert(glyph);
        glyphs.insert(name, glyph);
    }
    glyphs
}

/// Renders the picture with +y up, followed by a glyph legend.
pub fn render(host: &RecordingHost) -> String {
    let mut out = String::new();
    let Some((min, max)) = bounds(host) else {
        out.push_str("(empty)\n");
        return out;
    };
    let glyphs = assign_glyphs(host.tiles.values().map(|c| c.visual.name()));
    for y in (min.y..=max.y).rev() {
        for x in min.x..=max.x {
            let cell = Cell::new(x, y);
            let glyph = STACK
                .iter()
                .find_map(|l| host.get(cell, *l))
                .and_then(|cmd| glyphs.get(cmd.visual.name()).copied())
                .unwrap_or(' ');
            out.push(glyph);
        }
        out.push('\n');
    }

    let mut legend: Vec<(&str, char)> = glyphs.into_iter().collect();
    legend.sort_unstable_by_key(|(name, _)| *name);
    for (name, glyph) in legend {
        let _ = writeln!(out, "  {glyph}  {name}");
    }
    out
}

fn bounds(host: &RecordingHost) -> Option<(Cell, Cell)> {
    host.tiles.keys().map(|(c, _)| *c).fold(None, |acc, c| {
        Some(match acc {
            None => (c, c),
            Some((lo, hi)) => (
                Cell::new(lo.x.min(c.x), lo.y.min(c.y)),
                Cell::new(hi.x.max(c.x), hi.y.max(c.y)),
            ),
        })
    })
}
