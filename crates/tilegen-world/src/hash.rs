//! Position hashes. Both are stable across runs and platforms.

use tilegen_geom::Cell;

const SLOPE_BUCKETS: [u32; 10] = [0, 4, 7, 2, 9, 3, 6, 1, 5, 8];

/// Whether a slope may sit at this cell for a density in `0..=10`.
///
/// Cells split into 2x2 blocks repeating every 20 cells; only cells whose x and y parity match
/// are candidates, and the density enables that many block columns/rows in a fixed order.
pub fn should_place_slope(x: i32, y: i32, frequency: u8) -> bool {
    if frequency == 0 {
        return false;
    }
    let frequency = frequency.min(10) as usize;
    let (ax, ay) = (x.unsigned_abs(), y.unsigned_abs());
    if ax % 2 != ay % 2 {
        return false;
    }
    let xi = (ax % 20) / 2;
    let yi = (ay % 20) / 2;
    SLOPE_BUCKETS[..frequency]
        .iter()
        .any(|b| *b == xi || *b == yi)
}

/// Deterministic index in `0..count` for a cell. `count` of zero yields zero.
pub fn consistent_index(cell: Cell, count: usize, seed: u32) -> usize {
    if count == 0 {
        return 0;
    }
    let hash = (cell.x.wrapping_mul(73_856_093) as u32)
        ^ (cell.y.wrapping_mul(19_349_663) as u32)
        ^ seed;
    hash as usize % count
}
