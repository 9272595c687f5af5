// Weather module rendering.
// Formats current conditions, air quality and the daily forecast in the provider's local time.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::cache::Source;
use crate::config::Units;
use crate::weather::{ForecastItem, WeatherSnapshot, condition_emoji};

use super::{WaybarOutput, escape_markup, format_relative_time};

/// Forecast days shown in the tooltip.
const FORECAST_DAYS: usize = 3;

/// Inputs for the weather record.
pub struct WeatherView<'a> {
    pub snapshot: &'a WeatherSnapshot,
    pub units: Units,
    pub source: Source,
    pub stored_at: DateTime<Utc>,
}

/// Bar text: condition emoji and feels-like temperature, single-digit
/// positive values get a leading `+` so the width stays stable.
pub fn bar_text(snapshot: &WeatherSnapshot) -> String {
    let code = snapshot.current.condition().map(|c| c.id).unwrap_or_default();
    let feels = snapshot.current.main.feels_like.round() as i64;
    let sign = if (1..10).contains(&feels) { "+" } else { "" };
    format!("{} {}{}°", condition_emoji(code), sign, feels)
}

/// Full record for the weather module. `extra` sections (moon, Ekadashi)
/// are inserted between current conditions and the forecast.
pub fn weather_output(view: &WeatherView<'_>, extra: &[Vec<String>], now: DateTime<Utc>) -> WaybarOutput {
    let current = &view.snapshot.current;
    let offset = local_offset(current.timezone);

    let mut lines = Vec::new();
    let location = &view.snapshot.location;
    let place = if current.name.is_empty() || location.label.is_some() {
        location.display_name()
    } else {
        current.name.clone()
    };
    lines.push(format!("<b>{}</b>", escape_markup(&place)));

    let description = current
        .condition()
        .map(|c| capitalize(&c.description))
        .unwrap_or_default();
    lines.push(format!(
        "<b>{} {:.0}°</b>",
        escape_markup(&description),
        current.main.temp
    ));
    lines.push(format!("Feels like: {:.0}°", current.main.feels_like));
    lines.push(format!(
        "Wind: {:.0}{}",
        view.units.wind_speed(current.wind.speed),
        view.units.wind_label()
    ));
    lines.push(format!("Humidity: {:.0}%", current.main.humidity));
    lines.push(format!("AQI: {}/5", format_aqi(view.snapshot.aqi)));
    lines.push(format!(
        "🌅 {} 🌇 {}",
        format_clock(current.sys.sunrise, offset),
        format_clock(current.sys.sunset, offset)
    ));

    for section in extra {
        lines.push(String::new());
        lines.extend(section.iter().cloned());
    }

    if let Some(forecast) = &view.snapshot.forecast {
        let today = now.with_timezone(&offset).date_naive();
        for (date, items) in group_by_day(&forecast.list, offset)
            .into_iter()
            .take(FORECAST_DAYS)
        {
            lines.push(String::new());
            lines.extend(day_lines(date, &items, today, offset));
        }
    }

    let mut output = WaybarOutput::new(bar_text(view.snapshot), lines.join("\n"));
    if view.source == Source::Stale {
        output.tooltip.push_str(&format!(
            "\n\n<i>⚠️ Offline, showing data from {}</i>",
            format_relative_time(&view.stored_at, now)
        ));
        output = output.with_class("stale");
    }
    output
}

fn day_lines(
    date: NaiveDate,
    items: &[&ForecastItem],
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<String> {
    let prefix = match (date - today).num_days() {
        0 => "Today, ",
        1 => "Tomorrow, ",
        _ => "",
    };
    let max = items
        .iter()
        .map(|i| i.main.temp_max)
        .fold(f64::NEG_INFINITY, f64::max);
    let min = items
        .iter()
        .map(|i| i.main.temp_min)
        .fold(f64::INFINITY, f64::min);

    let mut lines = vec![
        format!("<b>{}{}</b>", prefix, date.format("%Y-%m-%d")),
        format!("⬆️ {:.0}° ⬇️ {:.0}°", max, min),
    ];
    for item in items {
        let (code, description) = item
            .condition()
            .map(|c| (c.id, capitalize(&c.description)))
            .unwrap_or_default();
        let mut line = format!(
            "{} {} {:>3}° {}",
            format_hour(item.dt, offset),
            condition_emoji(code),
            item.main.feels_like.round() as i64,
            escape_markup(&description)
        );
        if item.pop > 0.0 {
            line.push_str(&format!(", Rain {:.0}%", item.pop * 100.0));
        }
        lines.push(line);
    }
    lines
}

/// Group forecast steps by local calendar day, preserving order.
fn group_by_day(items: &[ForecastItem], offset: FixedOffset) -> Vec<(NaiveDate, Vec<&ForecastItem>)> {
    let mut days: Vec<(NaiveDate, Vec<&ForecastItem>)> = Vec::new();
    for item in items {
        let Some(date) = DateTime::from_timestamp(item.dt, 0)
            .map(|dt| dt.with_timezone(&offset).date_naive())
        else {
            continue;
        };
        match days.last_mut() {
            Some((last, group)) if *last == date => group.push(item),
            _ => days.push((date, vec![item])),
        }
    }
    days
}

fn local_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

fn format_clock(timestamp: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(&offset).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn format_hour(timestamp: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(&offset).format("%H").to_string())
        .unwrap_or_else(|| "--".to_string())
}

fn format_aqi(aqi: Option<u8>) -> String {
    aqi.map(|value| value.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::fixtures::{current_body, forecast_body};
    use crate::weather::{CurrentWeather, Forecast};
    use crate::location::ObserverLocation;
    use chrono::TimeZone;

    fn snapshot() -> WeatherSnapshot {
        let current: CurrentWeather = serde_json::from_value(current_body()).unwrap();
        let forecast: Forecast = serde_json::from_value(forecast_body()).unwrap();
        WeatherSnapshot {
            location: ObserverLocation::new(59.91, 10.75),
            current,
            forecast: Some(forecast),
            aqi: Some(2),
        }
    }

    fn now() -> DateTime<Utc> {
        // 2024-01-01 12:00 UTC, 13:00 at the fixture's +01:00 offset
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn view(snapshot: &WeatherSnapshot, source: Source) -> WeatherView<'_> {
        WeatherView {
            snapshot,
            units: Units::Metric,
            source,
            stored_at: now() - chrono::Duration::hours(2),
        }
    }

    #[test]
    fn test_bar_text() {
        let mut snapshot = snapshot();
        assert_eq!(bar_text(&snapshot), "⛅ +5°");

        snapshot.current.main.feels_like = -3.4;
        assert_eq!(bar_text(&snapshot), "⛅ -3°");

        snapshot.current.main.feels_like = 21.0;
        assert_eq!(bar_text(&snapshot), "⛅ 21°");

        snapshot.current.main.feels_like = 0.2;
        assert_eq!(bar_text(&snapshot), "⛅ 0°");
    }

    #[test]
    fn test_current_section() {
        let snapshot = snapshot();
        let output = weather_output(&view(&snapshot, Source::Fetched), &[], now());
        let lines: Vec<&str> = output.tooltip.lines().collect();

        assert_eq!(lines[0], "<b>Oslo</b>");
        assert_eq!(lines[1], "<b>Few clouds 7°</b>");
        assert_eq!(lines[2], "Feels like: 5°");
        assert_eq!(lines[3], "Wind: 11km/h");
        assert_eq!(lines[4], "Humidity: 81%");
        assert_eq!(lines[5], "AQI: 2/5");
        assert_eq!(lines[6], "🌅 09:00 🌇 17:00");
        assert!(output.class.is_none());
    }

    #[test]
    fn test_forecast_grouped_by_day() {
        let mut snapshot = snapshot();
        snapshot.location = snapshot.location.clone().with_label("Home");
        let output = weather_output(&view(&snapshot, Source::Cache), &[], now());

        assert!(output.tooltip.starts_with("<b>Home</b>"));
        assert!(output.tooltip.contains("<b>Today, 2024-01-01</b>\n⬆️ 7° ⬇️ 2°"));
        assert!(output.tooltip.contains("15 🌧️   4° Light rain, Rain 40%"));
        assert!(output.tooltip.contains("18 ☁️   1° Overcast clouds\n"));
        assert!(output.tooltip.contains("<b>Tomorrow, 2024-01-02</b>"));
    }

    #[test]
    fn test_extra_sections_and_stale_marker() {
        let mut snapshot = snapshot();
        snapshot.aqi = None;
        let extra = vec![vec!["🌕 <b>Moon Phases</b>".to_string()]];
        let output = weather_output(&view(&snapshot, Source::Stale), &extra, now());

        assert!(output.tooltip.contains("AQI: N/A/5"));
        assert!(output.tooltip.contains("\n\n🌕 <b>Moon Phases</b>"));
        assert!(output.tooltip.ends_with("<i>⚠️ Offline, showing data from 2h ago</i>"));
        assert_eq!(output.class.as_deref(), Some("stale"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("light rain"), "Light rain");
        assert_eq!(capitalize(""), "");
    }
}
