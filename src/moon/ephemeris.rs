// Geocentric lunar ephemeris.
// Mean new/full moon instants with periodic corrections (Meeus ch. 49) and
// the illuminated fraction of the disk (Meeus ch. 48, low precision).

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Utc};

use crate::error::{Result, SkybarError};

const DEG: f64 = PI / 180.0;

/// Mean synodic month in days.
pub const SYNODIC_MONTH: f64 = 29.530588861;

/// JDE of the mean new moon of 2000 January 6 (k = 0).
const EPOCH_NEW_MOON: f64 = 2451550.09766;

const UNIX_EPOCH_JD: f64 = 2440587.5;
const J2000: f64 = 2451545.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Which principal phase to solve for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    New,
    Full,
}

impl Principal {
    fn offset(self) -> f64 {
        match self {
            Principal::New => 0.0,
            Principal::Full => 0.5,
        }
    }
}

/// The principal phases bracketing an instant.
#[derive(Debug, Clone, Copy)]
pub struct LunarCycle {
    pub previous_new_moon: DateTime<Utc>,
    pub next_new_moon: DateTime<Utc>,
    pub previous_full_moon: DateTime<Utc>,
    pub next_full_moon: DateTime<Utc>,
}

impl LunarCycle {
    /// Compute the cycle at `instant`. Previous events are `<= instant`,
    /// next events are strictly after it.
    pub fn at(instant: DateTime<Utc>) -> Result<Self> {
        let (previous_new_moon, next_new_moon) = bracket(instant, Principal::New)?;
        let (previous_full_moon, next_full_moon) = bracket(instant, Principal::Full)?;

        Ok(Self {
            previous_new_moon,
            next_new_moon,
            previous_full_moon,
            next_full_moon,
        })
    }

    /// The full moon that falls inside the current new-to-new lunation.
    pub fn full_moon_in_lunation(&self) -> DateTime<Utc> {
        if self.next_full_moon < self.next_new_moon {
            self.next_full_moon
        } else {
            self.previous_full_moon
        }
    }

    /// Fraction of the lunation elapsed at `instant`, 0 at new moon.
    pub fn lunation(&self, instant: DateTime<Utc>) -> f64 {
        let span = (self.next_new_moon - self.previous_new_moon).num_milliseconds() as f64;
        let elapsed = (instant - self.previous_new_moon).num_milliseconds() as f64;
        if span <= 0.0 {
            return 0.0;
        }
        (elapsed / span).clamp(0.0, 1.0)
    }

    /// True when the next full moon is nearer in time than the previous one.
    pub fn is_waxing(&self, instant: DateTime<Utc>) -> bool {
        (self.next_full_moon - instant) < (instant - self.previous_full_moon)
    }
}

/// Julian Day (UT) of an instant, millisecond resolution.
pub fn julian_day(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

/// Instant of a Julian Day (UT).
pub fn from_julian_day(jd: f64) -> Result<DateTime<Utc>> {
    let millis = ((jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round();
    if !millis.is_finite() {
        return Err(SkybarError::Other(format!("Julian day {} out of range", jd)));
    }
    DateTime::from_timestamp_millis(millis as i64)
        .ok_or_else(|| SkybarError::Other(format!("Julian day {} out of range", jd)))
}

/// Illuminated fraction of the lunar disk at `instant`, in [0, 1].
pub fn illuminated_fraction(instant: DateTime<Utc>) -> f64 {
    let jde = julian_day(instant) + delta_t_seconds(decimal_year(instant)) / 86400.0;
    let t = (jde - J2000) / 36525.0;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let d = normalize_degrees(
        297.8501921 + 445267.1114034 * t - 0.0018819 * t2 + t3 / 545868.0 - t4 / 113065000.0,
    ) * DEG;
    let m = normalize_degrees(357.5291092 + 35999.0502909 * t - 0.0001536 * t2 + t3 / 24490000.0)
        * DEG;
    let mp = normalize_degrees(
        134.9633964 + 477198.8675055 * t + 0.0087414 * t2 + t3 / 69699.0 - t4 / 14712000.0,
    ) * DEG;

    // Phase angle i (48.4)
    let i = 180.0
        - d / DEG
        - 6.289 * mp.sin()
        + 2.100 * m.sin()
        - 1.274 * (2.0 * d - mp).sin()
        - 0.658 * (2.0 * d).sin()
        - 0.214 * (2.0 * mp).sin()
        - 0.110 * d.sin();

    ((1.0 + (i * DEG).cos()) / 2.0).clamp(0.0, 1.0)
}

/// Previous (`<= instant`) and next (`> instant`) occurrence of a principal phase.
fn bracket(instant: DateTime<Utc>, kind: Principal) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let offset = kind.offset();
    let jd = julian_day(instant);
    let mut k = ((jd - EPOCH_NEW_MOON) / SYNODIC_MONTH - offset).floor() + offset;

    // Corrections move events by well under a day, so these settle in a step or two
    while event_time(k, kind)? > instant {
        k -= 1.0;
    }
    while event_time(k + 1.0, kind)? <= instant {
        k += 1.0;
    }

    Ok((event_time(k, kind)?, event_time(k + 1.0, kind)?))
}

fn event_time(k: f64, kind: Principal) -> Result<DateTime<Utc>> {
    from_julian_day(event_ut(k, kind))
}

/// Principal phase for lunation number `k`, converted from TT to UT.
fn event_ut(k: f64, kind: Principal) -> f64 {
    let jde = event_jde(k, kind);
    let year = 2000.0 + k / 12.3685;
    jde - delta_t_seconds(year) / 86400.0
}

/// True phase instant (JDE) for lunation `k`; integral k for new moon,
/// k + 0.5 for full moon.
fn event_jde(k: f64, kind: Principal) -> f64 {
    let t = k / 1236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let mean = EPOCH_NEW_MOON + SYNODIC_MONTH * k + 0.00015437 * t2 - 0.000000150 * t3
        + 0.00000000073 * t4;

    let e = 1.0 - 0.002516 * t - 0.0000074 * t2;
    let m = normalize_degrees(2.5534 + 29.10535670 * k - 0.0000014 * t2 - 0.00000011 * t3) * DEG;
    let mp = normalize_degrees(
        201.5643 + 385.81693528 * k + 0.0107582 * t2 + 0.00001238 * t3 - 0.000000058 * t4,
    ) * DEG;
    let f = normalize_degrees(
        160.7108 + 390.67050284 * k - 0.0016118 * t2 - 0.00000227 * t3 + 0.000000011 * t4,
    ) * DEG;
    let omega = normalize_degrees(124.7746 - 1.56375588 * k + 0.0020672 * t2 + 0.00000215 * t3)
        * DEG;

    let (c_mp, c_m, c_2mp, c_2f, c_mp_m, c_mp_p_m, c_2m) = match kind {
        Principal::New => (
            -0.40720, 0.17241, 0.01608, 0.01039, 0.00739, -0.00514, 0.00208,
        ),
        Principal::Full => (
            -0.40614, 0.17302, 0.01614, 0.01043, 0.00734, -0.00515, 0.00209,
        ),
    };

    let periodic = c_mp * mp.sin()
        + c_m * e * m.sin()
        + c_2mp * (2.0 * mp).sin()
        + c_2f * (2.0 * f).sin()
        + c_mp_m * e * (mp - m).sin()
        + c_mp_p_m * e * (mp + m).sin()
        + c_2m * e * e * (2.0 * m).sin()
        - 0.00111 * (mp - 2.0 * f).sin()
        - 0.00057 * (mp + 2.0 * f).sin()
        + 0.00056 * e * (2.0 * mp + m).sin()
        - 0.00042 * (3.0 * mp).sin()
        + 0.00042 * e * (m + 2.0 * f).sin()
        + 0.00038 * e * (m - 2.0 * f).sin()
        - 0.00024 * e * (2.0 * mp - m).sin()
        - 0.00017 * omega.sin()
        - 0.00007 * (mp + 2.0 * m).sin()
        + 0.00004 * (2.0 * mp - 2.0 * f).sin()
        + 0.00004 * (3.0 * m).sin()
        + 0.00003 * (mp + m - 2.0 * f).sin()
        + 0.00003 * (2.0 * mp + 2.0 * f).sin()
        - 0.00003 * (mp + m + 2.0 * f).sin()
        + 0.00003 * (mp - m + 2.0 * f).sin()
        - 0.00002 * (mp - m - 2.0 * f).sin()
        - 0.00002 * (3.0 * mp + m).sin()
        + 0.00002 * (4.0 * mp).sin();

    mean + periodic + planetary_correction(k, t2)
}

// Planetary arguments A1..A14 (coefficient, constant, rate per lunation)
const PLANETARY_TERMS: [(f64, f64, f64); 13] = [
    (0.000165, 251.88, 0.016321),
    (0.000164, 251.83, 26.651886),
    (0.000126, 349.42, 36.412478),
    (0.000110, 84.66, 18.206239),
    (0.000062, 141.74, 53.303771),
    (0.000060, 207.14, 2.453732),
    (0.000056, 154.84, 7.306860),
    (0.000047, 34.52, 27.261239),
    (0.000042, 207.19, 0.121824),
    (0.000040, 291.34, 1.844379),
    (0.000037, 161.72, 24.198154),
    (0.000035, 239.56, 25.513099),
    (0.000023, 331.55, 3.592518),
];

fn planetary_correction(k: f64, t2: f64) -> f64 {
    let a1 = normalize_degrees(299.77 + 0.107408 * k - 0.009173 * t2) * DEG;
    let rest: f64 = PLANETARY_TERMS
        .iter()
        .map(|&(coeff, base, rate)| coeff * (normalize_degrees(base + rate * k) * DEG).sin())
        .sum();
    0.000325 * a1.sin() + rest
}

/// ΔT = TT - UT in seconds (Espenak & Meeus polynomials).
fn delta_t_seconds(year: f64) -> f64 {
    if (2005.0..2050.0).contains(&year) {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t * t
    } else if (1986.0..2005.0).contains(&year) {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if (1961.0..1986.0).contains(&year) {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t * t / 260.0 - t.powi(3) / 718.0
    } else if (2050.0..2150.0).contains(&year) {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - year)
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

fn decimal_year(instant: DateTime<Utc>) -> f64 {
    instant.year() as f64 + (instant.ordinal0() as f64 + 0.5) / 365.25
}

fn normalize_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}
