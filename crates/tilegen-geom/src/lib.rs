//! Grid and plane geometry shared by the tile generator crates.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise product, used to scale unit shapes by a cell size.
    #[inline]
    pub fn scale(self, by: Vec2) -> Vec2 {
        Vec2::new(self.x * by.x, self.y * by.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Relative step between two grid cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    #[inline]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Slot of this offset in [`EIGHT_DIRECTIONS`], if it is one of the eight neighbors.
    #[inline]
    pub fn neighbor_slot(self) -> Option<usize> {
        EIGHT_DIRECTIONS.iter().position(|d| *d == self)
    }
}

pub const UP: Offset = Offset::new(0, 1);
pub const DOWN: Offset = Offset::new(0, -1);
pub const LEFT: Offset = Offset::new(-1, 0);
pub const RIGHT: Offset = Offset::new(1, 0);
pub const UP_LEFT: Offset = Offset::new(-1, 1);
pub const UP_RIGHT: Offset = Offset::new(1, 1);
pub const DOWN_LEFT: Offset = Offset::new(-1, -1);
pub const DOWN_RIGHT: Offset = Offset::new(1, -1);

/// Neighbor scan order. Transition and signature code depends on this exact order.
pub const EIGHT_DIRECTIONS: [Offset; 8] = [
    UP, DOWN, LEFT, RIGHT, UP_LEFT, UP_RIGHT, DOWN_LEFT, DOWN_RIGHT,
];

pub const FOUR_DIRECTIONS: [Offset; 4] = [UP, DOWN, LEFT, RIGHT];

/// Integer grid cell. Ordering is lexicographic on `(x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn step(self, by: Offset) -> Cell {
        Cell::new(self.x + by.dx, self.y + by.dy)
    }

    #[inline]
    pub fn distance_sq(self, other: Cell) -> i64 {
        let dx = (self.x as i64) - (other.x as i64);
        let dy = (self.y as i64) - (other.y as i64);
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, other: Cell) -> f32 {
        (self.distance_sq(other) as f64).sqrt() as f32
    }

    /// Cell containing a world-space point for the given cell size.
    #[inline]
    pub fn from_world(pos: Vec2, cell_size: Vec2) -> Cell {
        Cell::new(
            (pos.x / cell_size.x).floor() as i32,
            (pos.y / cell_size.y).floor() as i32,
        )
    }

    /// World-space centre of the cell.
    #[inline]
    pub fn center(self, cell_size: Vec2) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) * cell_size.x,
            (self.y as f32 + 0.5) * cell_size.y,
        )
    }
}

impl From<(i32, i32)> for Cell {
    fn from(v: (i32, i32)) -> Self {
        Cell::new(v.0, v.1)
    }
}

impl From<Cell> for (i32, i32) {
    fn from(c: Cell) -> Self {
        (c.x, c.y)
    }
}

/// Output layers, in the order hosts usually stack them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Base = 0,
    BaseObjects = 1,
    Height = 2,
    HeightObjects = 3,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::Base,
        Layer::BaseObjects,
        Layer::Height,
        Layer::HeightObjects,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Layer::Base => "base",
            Layer::BaseObjects => "base_objects",
            Layer::Height => "height",
            Layer::HeightObjects => "height_objects",
        }
    }
}

/// Collision geometry relative to a cell centre.
#[derive(Clone, Debug, PartialEq)]
pub enum ColliderShape {
    Box { size: Vec2, offset: Vec2 },
    Polygon { points: Vec<Vec2> },
    Circle { radius: f32 },
}

impl ColliderShape {
    /// Half extents of the axis-aligned bounds around the cell centre.
    pub fn half_extents(&self) -> Vec2 {
        match self {
            ColliderShape::Box { size, offset } => Vec2::new(
                size.x * 0.5 + offset.x.abs(),
                size.y * 0.5 + offset.y.abs(),
            ),
            ColliderShape::Polygon { points } => points.iter().fold(Vec2::ZERO, |acc, p| {
                Vec2::new(acc.x.max(p.x.abs()), acc.y.max(p.y.abs()))
            }),
            ColliderShape::Circle { radius } => Vec2::new(*radius, *radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cell_step_roundtrip(c in any::<Cell>().prop_filter("in range", |c| c.x.abs() < 1 << 20 && c.y.abs() < 1 << 20)) {
            for d in EIGHT_DIRECTIONS {
                let back = Offset::new(-d.dx, -d.dy);
                prop_assert_eq!(c.step(d).step(back), c);
            }
        }
    }

    #[test]
    fn direction_slots_are_stable() {
        assert_eq!(UP.neighbor_slot(), Some(0));
        assert_eq!(DOWN_RIGHT.neighbor_slot(), Some(7));
        assert_eq!(Offset::new(0, 0).neighbor_slot(), None);
        assert_eq!(Offset::new(2, 0).neighbor_slot(), None);
    }

    #[test]
    fn cardinals_lead_the_neighbor_table() {
        assert!(FOUR_DIRECTIONS.iter().all(|d| (d.dx == 0) != (d.dy == 0)));
        assert!(EIGHT_DIRECTIONS[4..].iter().all(|d| d.dx != 0 && d.dy != 0));
        assert_eq!(&EIGHT_DIRECTIONS[..4], &FOUR_DIRECTIONS[..]);
    }
}
