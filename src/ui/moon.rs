// Moon module rendering.
// Builds the phase text and the moon/Ekadashi tooltip sections.

use chrono::{DateTime, TimeZone, Utc};

use crate::moon::{Ekadashi, MoonEvents, MoonState};

use super::WaybarOutput;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Tooltip lines for the moon phase and next principal phases.
pub fn moon_section<Tz>(state: &MoonState, events: &MoonEvents, tz: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    vec![
        "🌕 <b>Moon Phases</b>".to_string(),
        format!(
            "Now: {} {} ({:.0}% lit)",
            state.phase_name.emoji(),
            state.phase_name,
            state.illuminated_fraction * 100.0
        ),
        format!(
            "Next Full Moon: {}",
            events.next_full_moon.with_timezone(tz).format(DATE_FORMAT)
        ),
        format!(
            "Next New Moon: {}",
            events.next_new_moon.with_timezone(tz).format(DATE_FORMAT)
        ),
    ]
}

/// Tooltip lines for the upcoming (or ongoing) Ekadashi.
pub fn ekadashi_section<Tz>(ekadashi: &Ekadashi, now: DateTime<Utc>, tz: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let start = ekadashi.start.with_timezone(tz);
    let end = ekadashi.end.with_timezone(tz);
    let label = if ekadashi.is_active(now) { "Now" } else { "Next" };

    vec![
        "🕉️ <b>Ekadashi</b>".to_string(),
        format!("{}: {}", label, ekadashi.paksha.title()),
        format!("Date: {}", start.format(DATE_FORMAT)),
        format!(
            "Start: {} {}, End: {} {}",
            start.format(DATE_FORMAT),
            start.format(TIME_FORMAT),
            end.format(DATE_FORMAT),
            end.format(TIME_FORMAT)
        ),
    ]
}

/// Full record for the moon module.
pub fn moon_output<Tz>(
    state: &MoonState,
    events: &MoonEvents,
    ekadashi: &Ekadashi,
    now: DateTime<Utc>,
    tz: &Tz,
) -> WaybarOutput
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut lines = moon_section(state, events, tz);
    lines.push(String::new());
    lines.extend(ekadashi_section(ekadashi, now, tz));

    WaybarOutput::new(state.phase_name.emoji(), lines.join("\n"))
        .with_class(if state.is_waxing { "waxing" } else { "waning" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moon::{Paksha, PhaseName};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn state() -> MoonState {
        MoonState {
            illuminated_fraction: 0.81,
            phase_name: PhaseName::WaxingGibbous,
            is_waxing: true,
        }
    }

    fn events() -> MoonEvents {
        MoonEvents {
            next_full_moon: utc(2024, 1, 25, 17, 54),
            next_new_moon: utc(2024, 2, 9, 22, 59),
        }
    }

    fn ekadashi() -> Ekadashi {
        Ekadashi {
            paksha: Paksha::Krishna,
            start: utc(2024, 2, 4, 21, 15),
            end: utc(2024, 2, 5, 21, 35),
        }
    }

    #[test]
    fn test_moon_section() {
        let lines = moon_section(&state(), &events(), &Utc);
        assert_eq!(lines[1], "Now: 🌔 Waxing Gibbous (81% lit)");
        assert_eq!(lines[2], "Next Full Moon: 2024-01-25");
        assert_eq!(lines[3], "Next New Moon: 2024-02-09");
    }

    #[test]
    fn test_ekadashi_section() {
        let lines = ekadashi_section(&ekadashi(), utc(2024, 1, 27, 0, 0), &Utc);
        assert_eq!(lines[1], "Next: Krishna Ekadashi");
        assert_eq!(lines[2], "Date: 2024-02-04");
        assert_eq!(lines[3], "Start: 2024-02-04 21:15, End: 2024-02-05 21:35");

        let lines = ekadashi_section(&ekadashi(), utc(2024, 2, 5, 0, 0), &Utc);
        assert_eq!(lines[1], "Now: Krishna Ekadashi");
    }

    #[test]
    fn test_moon_output() {
        let output = moon_output(&state(), &events(), &ekadashi(), utc(2024, 1, 22, 0, 0), &Utc);
        assert_eq!(output.text, "🌔");
        assert_eq!(output.class.as_deref(), Some("waxing"));
        assert!(output.tooltip.starts_with("🌕 <b>Moon Phases</b>\n"));
        assert!(output.tooltip.contains("\n\n🕉️ <b>Ekadashi</b>\n"));
    }
}
