use tilegen_geom::{Cell, Offset};

/// Placement of a pass buffer in world space.
///
/// The buffer is `size + 2 * margin` cells on a side. Buffer cell `(margin, margin)` maps to
/// `bottom_left`; only the inner `size x size` window is emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassWindow {
    pub bottom_left: Cell,
    pub size: i32,
    pub margin: i32,
}

impl PassWindow {
    pub fn new(bottom_left: Cell, size: i32, margin: i32) -> Self {
        Self {
            bottom_left,
            size: size.max(1),
            margin: margin.max(0),
        }
    }

    #[inline]
    pub fn side(&self) -> i32 {
        self.size + 2 * self.margin
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.side() * self.side()) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn coords(&self, idx: usize) -> (i32, i32) {
        let side = self.side() as usize;
        ((idx % side) as i32, (idx / side) as i32)
    }

    #[inline]
    pub fn world(&self, x: i32, y: i32) -> Cell {
        Cell::new(
            self.bottom_left.x + x - self.margin,
            self.bottom_left.y + y - self.margin,
        )
    }

    /// True for buffer cells inside the emitted window.
    #[inline]
    pub fn in_output(&self, x: i32, y: i32) -> bool {
        let hi = self.side() - self.margin;
        x >= self.margin && y >= self.margin && x < hi && y < hi
    }

    /// Buffer coordinates of the emitted window in row-major order.
    pub fn output_cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let (lo, hi) = (self.margin, self.side() - self.margin);
        (lo..hi).flat_map(move |y| (lo..hi).map(move |x| (x, y)))
    }
}

/// Square row-major buffer. Reads outside the buffer yield `outside`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    side: i32,
    cells: Vec<T>,
    outside: T,
}

impl<T: Copy> Grid<T> {
    pub fn new(side: i32, fill: T, outside: T) -> Self {
        let side = side.max(0);
        Self {
            side,
            cells: vec![fill; (side * side) as usize],
            outside,
        }
    }

    pub fn from_vec(side: i32, cells: Vec<T>, outside: T) -> Self {
        debug_assert_eq!(cells.len(), (side * side) as usize);
        Self { side, cells, outside }
    }

    #[inline]
    pub fn side(&self) -> i32 {
        self.side
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.side && y < self.side
    }

    #[inline]
    pub fn index(&self, x: i32, y: i32) -> usize {
        (x + y * self.side) as usize
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> T {
        if self.contains(x, y) {
            self.cells[self.index(x, y)]
        } else {
            self.outside
        }
    }

    #[inline]
    pub fn neighbor(&self, x: i32, y: i32, d: Offset) -> T {
        self.get(x + d.dx, y + d.dy)
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: T) {
        if self.contains(x, y) {
            let i = self.index(x, y);
            self.cells[i] = value;
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_maps_margin_to_bottom_left() {
        let w = PassWindow::new(Cell::new(10, -4), 5, 3);
        assert_eq!(w.side(), 11);
        assert_eq!(w.world(3, 3), Cell::new(10, -4));
        assert!(w.in_output(3, 7));
        assert!(!w.in_output(8, 3));
        assert_eq!(w.output_cells().count(), 25);
        assert_eq!(w.output_cells().next(), Some((3, 3)));
    }

    #[test]
    fn grid_reads_outside_as_sentinel() {
        let mut g = Grid::new(3, 0u8, 9);
        g.set(1, 1, 5);
        g.set(7, 7, 5);
        assert_eq!(g.get(1, 1), 5);
        assert_eq!(g.get(-1, 0), 9);
        assert_eq!(g.neighbor(2, 2, Offset::new(1, 0)), 9);
    }
}
