//! Integer rectangles on the simulation grid.

/// An axis-aligned rectangle in grid cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the cell `(x, y)` lies inside this rectangle.
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Iterate every cell covered by the rectangle, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let Rect { x, y, w, h } = *self;
        (y..y + h.max(0)).flat_map(move |cy| (x..x + w.max(0)).map(move |cx| (cx, cy)))
    }
}
