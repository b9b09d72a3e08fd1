//! Packed grain colors.

use serde::{Deserialize, Serialize};

/// A grain color packed as `0x00RRGGBB`.
///
/// The value `0` is reserved for "no grain here", so every color built through
/// [`PackedColor::from_rgb`] is guaranteed to be nonzero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackedColor(pub u32);

impl PackedColor {
    /// The empty cell marker.
    pub const EMPTY: PackedColor = PackedColor(0);

    /// Pack an RGB triple. Pure black is nudged to the darkest blue so it
    /// still reads as material.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let packed = ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        if packed == 0 {
            PackedColor(1)
        } else {
            PackedColor(packed)
        }
    }

    /// A grey of the given brightness (used for snow).
    pub const fn grey(level: u8) -> Self {
        Self::from_rgb(level, level, level)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Whether this is the empty marker.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_is_not_empty() {
        assert!(!PackedColor::from_rgb(0, 0, 0).is_empty());
        assert!(PackedColor::EMPTY.is_empty());
    }

    #[test]
    fn test_channels() {
        let c = PackedColor::from_rgb(0x12, 0x34, 0x56);
        assert_eq!(c.0, 0x0012_3456);
        assert_eq!((c.r(), c.g(), c.b()), (0x12, 0x34, 0x56));
    }
}
