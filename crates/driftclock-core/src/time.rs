//! Wall-clock time as seen by the clock face and the simulation.

use serde::{Deserialize, Serialize};

/// A wall-clock instant at one-second resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Moment {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl Moment {
    pub const fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Hour as shown on the face for the given format.
    pub fn display_hour(&self, format: TimeFormat) -> u32 {
        match format {
            TimeFormat::TwentyFourHour => self.hour % 24,
            TimeFormat::TwelveHour => match self.hour % 12 {
                0 => 12,
                h => h,
            },
        }
    }
}

/// Time format for the clock display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    #[default]
    TwentyFourHour,
    TwelveHour,
}

impl TimeFormat {
    /// Toggle between 12-hour and 24-hour format.
    pub fn toggle(&self) -> Self {
        match self {
            TimeFormat::TwentyFourHour => TimeFormat::TwelveHour,
            TimeFormat::TwelveHour => TimeFormat::TwentyFourHour,
        }
    }
}
