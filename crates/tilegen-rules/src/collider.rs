//! Collider synthesis for autotiled cells.
//!
//! A rule's neighbor constraints are scored against twelve reference patterns (four edges,
//! four outer corners, four inner corners) and the winner picks a box or corner polygon.

use tilegen_geom::{ColliderShape, Offset, Vec2};

use crate::types::{Neighbor, TilingRule};

type Pattern = [(Offset, bool); 6];

const fn o(dx: i32, dy: i32) -> Offset {
    Offset::new(dx, dy)
}

pub const PATTERN_TOP: usize = 0;
pub const PATTERN_DOWN: usize = 1;
pub const PATTERN_RIGHT: usize = 2;
pub const PATTERN_LEFT: usize = 3;
pub const PATTERN_TOP_RIGHT: usize = 4;
pub const PATTERN_TOP_LEFT: usize = 5;
pub const PATTERN_BOTTOM_RIGHT: usize = 6;
pub const PATTERN_BOTTOM_LEFT: usize = 7;
pub const PATTERN_TOP_RIGHT_AREA: usize = 8;
pub const PATTERN_TOP_LEFT_AREA: usize = 9;
pub const PATTERN_BOTTOM_RIGHT_AREA: usize = 10;
pub const PATTERN_BOTTOM_LEFT_AREA: usize = 11;

pub const COLLIDER_PATTERNS: [Pattern; 12] = [
    // top
    [(o(0, 1), true), (o(0, -1), false), (o(-1, 1), true), (o(1, 1), true), (o(-1, -1), false), (o(1, -1), false)],
    // down
    [(o(0, 1), false), (o(0, -1), true), (o(-1, 1), false), (o(1, 1), false), (o(-1, -1), true), (o(1, -1), true)],
    // right
    [(o(-1, 0), false), (o(1, 0), true), (o(-1, 1), false), (o(1, 1), true), (o(-1, -1), false), (o(1, -1), true)],
    // left
    [(o(-1, 0), true), (o(1, 0), false), (o(-1, 1), true), (o(1, 1), false), (o(-1, -1), true), (o(1, -1), false)],
    // top right
    [(o(0, -1), false), (o(-1, 0), false), (o(-1, 1), false), (o(1, 1), true), (o(-1, -1), false), (o(1, -1), false)],
    // top left
    [(o(0, -1), false), (o(1, 0), false), (o(-1, 1), true), (o(1, 1), false), (o(-1, -1), false), (o(1, -1), false)],
    // bottom right
    [(o(0, 1), false), (o(-1, 0), false), (o(-1, 1), false), (o(1, 1), false), (o(-1, -1), false), (o(1, -1), true)],
    // bottom left
    [(o(0, 1), false), (o(1, 0), false), (o(-1, 1), false), (o(1, 1), false), (o(-1, -1), true), (o(1, -1), false)],
    // top right area
    [(o(0, 1), true), (o(1, 0), true), (o(-1, 1), true), (o(1, 1), true), (o(-1, -1), false), (o(1, -1), true)],
    // top left area
    [(o(0, 1), true), (o(-1, 0), true), (o(-1, 1), true), (o(1, 1), true), (o(-1, -1), true), (o(1, -1), false)],
    // bottom right area
    [(o(0, -1), true), (o(1, 0), true), (o(-1, 1), false), (o(1, 1), true), (o(-1, -1), true), (o(1, -1), true)],
    // bottom left area
    [(o(0, -1), true), (o(-1, 0), true), (o(-1, 1), true), (o(1, 1), false), (o(-1, -1), true), (o(1, -1), true)],
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderParams {
    pub cell_size: Vec2,
    /// Fraction of the cell covered by the collider edge, in [0, 1].
    pub thickness: f32,
    /// Horizontal inset of cliff corner polygons, in [0, 1].
    pub padding: f32,
    pub cliff: bool,
}

impl ColliderParams {
    pub fn ground(cell_size: Vec2, thickness: f32) -> Self {
        Self {
            cell_size,
            thickness: thickness.clamp(0.0, 1.0),
            padding: 0.0,
            cliff: false,
        }
    }

    pub fn cliff(cell_size: Vec2, thickness: f32, padding: f32) -> Self {
        Self {
            cell_size,
            thickness: thickness.clamp(0.0, 1.0),
            padding: padding.clamp(0.0, 1.0),
            cliff: true,
        }
    }
}

fn pattern_score(rule: &TilingRule, pattern: &Pattern) -> i32 {
    rule.constraints
        .iter()
        .filter(|(at, want)| {
            pattern
                .iter()
                .find(|(p, _)| p == at)
                .is_some_and(|(_, solid)| {
                    (*solid && *want == Neighbor::This) || (!*solid && *want == Neighbor::NotThis)
                })
        })
        .count() as i32
}

/// Best matching reference pattern, first one on ties. Always in `0..12`.
pub fn classify_pattern(rule: &TilingRule) -> usize {
    let mut best = 0;
    let mut best_score = i32::MIN;
    for (k, pattern) in COLLIDER_PATTERNS.iter().enumerate() {
        let s = pattern_score(rule, pattern);
        if s > best_score {
            best = k;
            best_score = s;
        }
    }
    best
}

/// Shape for a pattern, relative to the cell centre.
pub fn synthesize(pattern: usize, params: &ColliderParams) -> ColliderShape {
    let cx = params.cell_size.x;
    let cy = params.cell_size.y;
    let t = params.thickness;
    let p = params.padding;
    let hx = cx * 0.5;
    let hy = cy * 0.5;
    let tx = cx * t * 0.5;
    let ty = cy * t * 0.5;
    let poly = |pts: &[(f32, f32)]| ColliderShape::Polygon {
        points: pts.iter().map(|(x, y)| Vec2::new(*x, *y)).collect(),
    };

    match pattern {
        PATTERN_TOP if params.cliff => {
            // Half-height box hugging the top edge, extended downwards by the thickness.
            let size = Vec2::new(cx, hy + ty);
            ColliderShape::Box {
                size,
                offset: Vec2::new(0.0, ty - size.y * 0.5),
            }
        }
        PATTERN_TOP | PATTERN_DOWN => ColliderShape::Box {
            size: Vec2::new(cx, cy * t),
            offset: Vec2::ZERO,
        },
        PATTERN_RIGHT | PATTERN_LEFT => ColliderShape::Box {
            size: Vec2::new(cx * t, cy),
            offset: Vec2::ZERO,
        },
        PATTERN_TOP_RIGHT if params.cliff => poly(&[
            (hx, ty),
            (hx, -hy),
            (cx * p - hx, -hy),
            (cx * p - hx, hy),
            (tx, hy),
        ]),
        PATTERN_TOP_RIGHT | PATTERN_BOTTOM_LEFT_AREA => {
            poly(&[(hx, ty), (hx, -ty), (-tx, hy), (tx, hy)])
        }
        PATTERN_TOP_LEFT if params.cliff => poly(&[
            (-hx, ty),
            (-hx, -hy),
            (hx - cx * p, -hy),
            (hx - cx * p, hy),
            (-tx, hy),
        ]),
        PATTERN_TOP_LEFT | PATTERN_BOTTOM_RIGHT_AREA => {
            poly(&[(-hx, -ty), (-hx, ty), (-tx, hy), (tx, hy)])
        }
        PATTERN_TOP_LEFT_AREA if params.cliff => {
            poly(&[(hx, ty), (hx, -hy), (tx, -hy), (-tx, -hy)])
        }
        PATTERN_BOTTOM_RIGHT | PATTERN_TOP_LEFT_AREA => {
            poly(&[(hx, ty), (hx, -ty), (tx, -hy), (-tx, -hy)])
        }
        PATTERN_TOP_RIGHT_AREA if params.cliff => {
            poly(&[(-hx, ty), (-hx, -hy), (-tx, -hy), (tx, -hy)])
        }
        _ => poly(&[(-hx, ty), (-hx, -ty), (-tx, -hy), (tx, -hy)]),
    }
}

pub fn collider_for_rule(rule: &TilingRule, params: &ColliderParams) -> ColliderShape {
    synthesize(classify_pattern(rule), params)
}
