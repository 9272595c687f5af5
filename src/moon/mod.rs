// Moon phase calculator.
// Turns an observer location and an instant into phase, illumination and upcoming events.

pub mod ekadashi;
pub mod ephemeris;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::location::ObserverLocation;

pub use ekadashi::{Ekadashi, Paksha, next_ekadashi};
pub use ephemeris::LunarCycle;

/// Below this illuminated fraction the moon is "new" regardless of direction.
const NEW_MOON_LIMIT: f64 = 0.0625;
/// Above this illuminated fraction the moon is "full" regardless of direction.
const FULL_MOON_LIMIT: f64 = 0.9375;
const CRESCENT_LIMIT: f64 = 0.4375;
const QUARTER_LIMIT: f64 = 0.5625;

/// Named phase of the moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl PhaseName {
    pub const ALL: [PhaseName; 8] = [
        PhaseName::NewMoon,
        PhaseName::WaxingCrescent,
        PhaseName::FirstQuarter,
        PhaseName::WaxingGibbous,
        PhaseName::FullMoon,
        PhaseName::WaningGibbous,
        PhaseName::LastQuarter,
        PhaseName::WaningCrescent,
    ];

    /// Bucket an illuminated fraction into a phase. Direction only matters
    /// between the new and full moon limits.
    pub fn classify(illuminated_fraction: f64, is_waxing: bool) -> Self {
        let k = illuminated_fraction;
        if k < NEW_MOON_LIMIT {
            PhaseName::NewMoon
        } else if k > FULL_MOON_LIMIT {
            PhaseName::FullMoon
        } else if k < CRESCENT_LIMIT {
            if is_waxing {
                PhaseName::WaxingCrescent
            } else {
                PhaseName::WaningCrescent
            }
        } else if k < QUARTER_LIMIT {
            if is_waxing {
                PhaseName::FirstQuarter
            } else {
                PhaseName::LastQuarter
            }
        } else if is_waxing {
            PhaseName::WaxingGibbous
        } else {
            PhaseName::WaningGibbous
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PhaseName::NewMoon => "New Moon",
            PhaseName::WaxingCrescent => "Waxing Crescent",
            PhaseName::FirstQuarter => "First Quarter",
            PhaseName::WaxingGibbous => "Waxing Gibbous",
            PhaseName::FullMoon => "Full Moon",
            PhaseName::WaningGibbous => "Waning Gibbous",
            PhaseName::LastQuarter => "Last Quarter",
            PhaseName::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            PhaseName::NewMoon => "🌑",
            PhaseName::WaxingCrescent => "🌒",
            PhaseName::FirstQuarter => "🌓",
            PhaseName::WaxingGibbous => "🌔",
            PhaseName::FullMoon => "🌕",
            PhaseName::WaningGibbous => "🌖",
            PhaseName::LastQuarter => "🌗",
            PhaseName::WaningCrescent => "🌘",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Current appearance of the moon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoonState {
    pub illuminated_fraction: f64,
    pub phase_name: PhaseName,
    pub is_waxing: bool,
}

/// Next principal phases after an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoonEvents {
    pub next_full_moon: DateTime<Utc>,
    pub next_new_moon: DateTime<Utc>,
}

/// Phase of the moon seen from `location` at `instant`.
///
/// The ephemeris is geocentric: the location is validated but parallax is
/// not applied, which shifts event times by at most a few minutes.
pub fn current_phase(location: &ObserverLocation, instant: DateTime<Utc>) -> Result<MoonState> {
    location.validate()?;
    let cycle = LunarCycle::at(instant)?;
    Ok(state_in_cycle(&cycle, instant))
}

/// Next full and new moon strictly after `instant`.
pub fn upcoming_events(location: &ObserverLocation, instant: DateTime<Utc>) -> Result<MoonEvents> {
    location.validate()?;
    let cycle = LunarCycle::at(instant)?;
    Ok(MoonEvents {
        next_full_moon: cycle.next_full_moon,
        next_new_moon: cycle.next_new_moon,
    })
}

fn state_in_cycle(cycle: &LunarCycle, instant: DateTime<Utc>) -> MoonState {
    let illuminated_fraction = ephemeris::illuminated_fraction(instant);
    let is_waxing = cycle.is_waxing(instant);
    tracing::trace!(
        lunation = cycle.lunation(instant),
        new_moon = %cycle.previous_new_moon,
        "Lunar cycle"
    );
    MoonState {
        illuminated_fraction,
        phase_name: PhaseName::classify(illuminated_fraction, is_waxing),
        is_waxing,
    }
}
