//! A single seven-segment digit.

use driftclock_core::Rect;

/// One bar of a seven-segment digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Top,
    TopLeft,
    TopRight,
    Middle,
    BottomLeft,
    BottomRight,
    Bottom,
}

impl Segment {
    pub const ALL: [Segment; 7] = [
        Segment::Top,
        Segment::TopLeft,
        Segment::TopRight,
        Segment::Middle,
        Segment::BottomLeft,
        Segment::BottomRight,
        Segment::Bottom,
    ];

    fn is_horizontal(self) -> bool {
        matches!(self, Segment::Top | Segment::Middle | Segment::Bottom)
    }
}

/// Lit segments per numeral, in [`Segment::ALL`] order.
///
/// Seven keeps its top-left bar.
pub const SEGMENTS: [[bool; 7]; 10] = [
    // 0
    [true, true, true, false, true, true, true],
    // 1
    [false, false, true, false, false, true, false],
    // 2
    [true, false, true, true, true, false, true],
    // 3
    [true, false, true, true, false, true, true],
    // 4
    [false, true, true, true, false, true, false],
    // 5
    [true, true, false, true, false, true, true],
    // 6
    [true, true, false, true, true, true, true],
    // 7
    [true, true, true, false, false, true, false],
    // 8
    [true, true, true, true, true, true, true],
    // 9
    [true, true, true, true, false, true, true],
];

/// A positioned digit showing one numeral, or nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Digit {
    rects: [Rect; 7],
    lit: [bool; 7],
}

impl Digit {
    /// Lay the digit out with its top-left corner at `(x, y)`.
    ///
    /// `segment_width` spans the whole digit, `segment_height` is the
    /// distance between horizontal bars and `thickness` the bar width.
    pub fn new(x: i32, y: i32, segment_width: i32, segment_height: i32, thickness: i32) -> Self {
        let (sw, sh, st) = (segment_width, segment_height, thickness);
        let mut rects = [Rect::default(); 7];
        for (rect, segment) in rects.iter_mut().zip(Segment::ALL) {
            let mut r = Rect::new(x, y, st, st);
            if segment.is_horizontal() {
                r.x += st;
                r.w = sw - st * 2;
            } else {
                r.y += st;
                r.h = sh - st;
            }
            match segment {
                Segment::TopRight => r.x += sw - st,
                Segment::BottomRight => {
                    r.x += sw - st;
                    r.y += sh;
                }
                Segment::BottomLeft | Segment::Middle => r.y += sh,
                Segment::Bottom => r.y += sh * 2,
                Segment::Top | Segment::TopLeft => {}
            }
            *rect = r;
        }
        Self {
            rects,
            lit: [false; 7],
        }
    }

    /// Show the numeral `n`; anything above nine blanks the digit.
    pub fn show(&mut self, n: u32) {
        self.lit = SEGMENTS.get(n as usize).copied().unwrap_or([false; 7]);
    }

    pub fn is_lit(&self, segment: Segment) -> bool {
        self.lit[segment as usize]
    }

    pub fn rect(&self, segment: Segment) -> Rect {
        self.rects[segment as usize]
    }

    /// Rectangles of the lit segments.
    pub fn lit_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.rects
            .iter()
            .zip(self.lit)
            .filter(|&(r, lit)| lit && !r.is_empty())
            .map(|(r, _)| *r)
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.lit_rects().any(|r| r.contains(x, y))
    }
}
