// Ekadashi calculator.
// Finds the eleventh tithi of the waxing or waning fortnight.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::location::ObserverLocation;

use super::ephemeris::LunarCycle;

/// Tithis per fortnight; each spans 12 degrees of moon-sun elongation.
const TITHIS_PER_PAKSHA: i32 = 15;
/// Ekadashi is the eleventh tithi, starting after ten have elapsed.
const EKADASHI_INDEX: i32 = 10;

/// Lunar fortnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Paksha {
    /// Waxing fortnight, new moon to full moon.
    Shukla,
    /// Waning fortnight, full moon to new moon.
    Krishna,
}

impl Paksha {
    pub fn title(&self) -> &'static str {
        match self {
            Paksha::Shukla => "Shukla Ekadashi",
            Paksha::Krishna => "Krishna Ekadashi",
        }
    }
}

/// One Ekadashi window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ekadashi {
    pub paksha: Paksha,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Ekadashi {
    pub fn is_active(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// The Ekadashi in progress at `instant`, or the next one to begin.
///
/// Elongation is interpolated linearly between the bracketing new and full
/// moons, so window edges can be off by a few hours; the sunrise rule used
/// by almanacs to pick the observance day is not applied.
pub fn next_ekadashi(location: &ObserverLocation, instant: DateTime<Utc>) -> Result<Ekadashi> {
    location.validate()?;

    let cycle = LunarCycle::at(instant)?;
    if let Some(window) = windows(&cycle).into_iter().find(|w| w.end > instant) {
        return Ok(window);
    }

    // Both windows of this lunation are behind us; step into the next one
    let following = LunarCycle::at(cycle.next_new_moon + Duration::days(1))?;
    let [shukla, _] = windows(&following);
    Ok(shukla)
}

fn windows(cycle: &LunarCycle) -> [Ekadashi; 2] {
    let full = cycle.full_moon_in_lunation();
    [
        window(Paksha::Shukla, cycle.previous_new_moon, full),
        window(Paksha::Krishna, full, cycle.next_new_moon),
    ]
}

fn window(paksha: Paksha, from: DateTime<Utc>, to: DateTime<Utc>) -> Ekadashi {
    let tithi = (to - from) / TITHIS_PER_PAKSHA;
    let start = from + tithi * EKADASHI_INDEX;
    Ekadashi {
        paksha,
        start,
        end: start + tithi,
    }
}
