//! Four-digit clock face laid out on the simulation grid.

use driftclock_core::{HueMode, Moment, ObstacleMask, PackedColor, Rect, TimeFormat};

use crate::digit::Digit;
use crate::hue::face_color;

/// An `HH:MM` seven-segment face.
///
/// Width is split into thirteenths (gap, digit, gap, digit, colon, digit,
/// gap, digit, gap, with every digit two thirteenths wide); digits start two
/// sevenths of the way down.
#[derive(Debug, Clone)]
pub struct DigitalClock {
    width: i32,
    height: i32,
    digits: [Digit; 4],
    /// Lit segment rectangles for the numerals on show.
    regions: Vec<Rect>,
    hue_mode: HueMode,
    time_format: TimeFormat,
    color: PackedColor,
    last_moment: Option<Moment>,
    /// Hour and minute currently drawn.
    shown: Option<(u32, u32)>,
}

impl DigitalClock {
    pub fn new(width: i32, height: i32, hue_mode: HueMode, time_format: TimeFormat) -> Self {
        let thickness = (width.min(height) / 24).max(1);
        let segment_width = 2 * width / 13;
        let segment_height = 3 * height / 14;
        let y = 2 * height / 7 - thickness / 2;
        let digits = std::array::from_fn(|i| {
            let x = ((i as i32 * 3 + 1) * width) / 13;
            Digit::new(x, y, segment_width, segment_height, thickness)
        });
        Self {
            width,
            height,
            digits,
            regions: Vec::new(),
            hue_mode,
            time_format,
            color: face_color(hue_mode, Moment::default()),
            last_moment: None,
            shown: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn hue_mode(&self) -> HueMode {
        self.hue_mode
    }

    pub fn time_format(&self) -> TimeFormat {
        self.time_format
    }

    /// Switch hue mode; takes effect on the next [`DigitalClock::set_time`].
    pub fn set_hue_mode(&mut self, hue_mode: HueMode) {
        self.hue_mode = hue_mode;
        self.last_moment = None;
    }

    /// Switch time format; takes effect on the next [`DigitalClock::set_time`].
    pub fn set_time_format(&mut self, time_format: TimeFormat) {
        self.time_format = time_format;
        self.last_moment = None;
        self.shown = None;
    }

    /// Move the face to `moment`.
    ///
    /// The color follows every new second; the digits only every new minute.
    /// Returns true when the solid shape may have changed.
    pub fn set_time(&mut self, moment: Moment) -> bool {
        if self.last_moment == Some(moment) {
            return false;
        }
        self.last_moment = Some(moment);
        self.color = face_color(self.hue_mode, moment);

        let hour = moment.display_hour(self.time_format);
        if self.shown == Some((hour, moment.minute)) {
            return false;
        }
        self.shown = Some((hour, moment.minute));

        let numerals = [hour / 10, hour % 10, moment.minute / 10, moment.minute % 10];
        for (digit, n) in self.digits.iter_mut().zip(numerals) {
            digit.show(n);
        }
        self.regions = self.digits.iter().flat_map(Digit::lit_rects).collect();
        log::debug!("clock face now shows {hour:02}:{:02}", moment.minute);
        true
    }

    /// Lit segment rectangles.
    pub fn regions(&self) -> &[Rect] {
        &self.regions
    }

    pub fn color(&self) -> PackedColor {
        self.color
    }
}

impl ObstacleMask for DigitalClock {
    fn is_solid(&self, x: i32, y: i32) -> bool {
        self.regions.iter().any(|r| r.contains(x, y))
    }
}
