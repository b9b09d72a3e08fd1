//! Clock face colors.

use driftclock_core::{HueMode, Moment, PackedColor};

/// Minutes for the rainbow to walk the whole hue circle.
const HUE_ROTATION_MINUTES: u32 = 30;

/// Convert a hue in `[0, 1)` at full saturation and value to a color.
///
/// Blue is lifted into the red and green channels so the blue end of the
/// circle stays readable on a dark terminal.
pub fn hue_to_rgb(h: f64) -> PackedColor {
    let h = h.rem_euclid(1.0);
    let x = 1.0 - ((h * 6.0) % 2.0 - 1.0).abs();
    let (r, g, b) = match (h * 6.0) as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    PackedColor::from_rgb(
        (255.0 * r + 64.0 * b).min(255.0) as u8,
        (191.0 * g + 64.0 * b).min(255.0) as u8,
        (255.0 * b) as u8,
    )
}

/// Color of the face at `moment`.
pub fn face_color(mode: HueMode, moment: Moment) -> PackedColor {
    let second = moment.second.min(59);
    match mode {
        HueMode::Rainbow => {
            let s = second + 60 * (moment.minute % HUE_ROTATION_MINUTES);
            hue_to_rgb(f64::from(s) / f64::from(60 * HUE_ROTATION_MINUTES))
        }
        HueMode::Festive => {
            let s = if moment.minute % 2 == 1 { 59 - second } else { second };
            let (r, g) = if s < 30 {
                (255, s * 255 / 29)
            } else {
                ((59 - s) * 255 / 29, 255)
            };
            PackedColor::from_rgb(r as u8, g as u8, 0)
        }
    }
}
