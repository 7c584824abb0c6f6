//! Plain-text rendering of a dashboard snapshot.

use weather_dashboard_core::{
    DataSource, Snapshot, UnitSystem,
    display::{compass_point, direction_glyph_for, icon_for, temperature_band},
};

/// Entries shown in the temperature trend: 48 hours at 3-hour steps.
const TREND_ENTRIES: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Emit 24-bit ANSI colors for temperatures.
    pub color: bool,
}

pub fn render(snapshot: &Snapshot, opts: &RenderOptions) -> String {
    let mut out = String::new();
    let current = &snapshot.current;
    let units = snapshot.units;
    let temp_unit = units.temperature_label();
    let speed_unit = units.speed_label();

    out.push_str(&format!(
        "Current Weather in {}, {}\n",
        current.location.name, current.location.country
    ));
    if snapshot.source == DataSource::Demo {
        out.push_str("(Demo data: OpenWeather is unavailable or no API key is configured)\n");
    }
    out.push('\n');

    out.push_str(&format!(
        "  {}  {}\n",
        icon_for(&current.condition.icon),
        capitalize(&current.condition.description)
    ));
    out.push_str(&format!(
        "  {}\n",
        paint_temperature(current.temperature.current, units, opts, 0)
    ));
    out.push_str(&format!(
        "  Feels like: {:.1}{temp_unit}\n\n",
        current.temperature.feels_like
    ));

    out.push_str("Details\n");
    out.push_str(&format!(
        "  Min/Max:     {:.1}{temp_unit} / {:.1}{temp_unit}\n",
        current.temperature.min, current.temperature.max
    ));
    out.push_str(&format!("  Humidity:    {}%\n", current.humidity));
    out.push_str(&format!("  Pressure:    {} hPa\n", current.pressure));
    out.push_str(&format!(
        "  Visibility:  {:.1} km\n",
        f64::from(current.visibility) / 1000.0
    ));
    out.push_str(&format!("  Cloudiness:  {}%\n\n", current.cloudiness));

    let degrees = f64::from(current.wind.degrees);
    out.push_str("Wind\n");
    out.push_str(&format!("  Speed:       {} {speed_unit}\n", current.wind.speed));
    out.push_str(&format!(
        "  Direction:   {}° {} {}\n",
        current.wind.degrees,
        compass_point(degrees),
        direction_glyph_for(degrees)
    ));
    if let Some(gust) = current.wind.gust {
        out.push_str(&format!("  Gust:        {gust} {speed_unit}\n"));
    }
    out.push_str(&format!("  Sunrise:     {}\n", clock(current.local_time(current.sunrise))));
    out.push_str(&format!("  Sunset:      {}\n\n", clock(current.local_time(current.sunset))));

    let forecast = &snapshot.forecast;
    out.push_str("5-Day Forecast\n");
    for (date, entry) in forecast.daily_summary() {
        out.push_str(&format!(
            "  {}  {}  {:<20} {}  Humidity {:>3}%  Wind {} {speed_unit}\n",
            date.format("%a, %b %d"),
            icon_for(&entry.condition.icon),
            capitalize(&entry.condition.description),
            paint_temperature(entry.temperature.current, units, opts, 8),
            entry.humidity,
            entry.wind.speed,
        ));
    }
    out.push('\n');

    out.push_str("Temperature Trend (48 hours)\n");
    out.push_str(&format!(
        "  {:<11} {:>8} {:>8} {:>6}\n",
        "Time", "Temp", "Feels", "Rain"
    ));
    for entry in forecast.trend(TREND_ENTRIES) {
        let time = forecast
            .local_time(entry.timestamp)
            .map_or_else(|| "--".to_string(), |t| t.format("%a %H:%M").to_string());
        out.push_str(&format!(
            "  {:<11} {:>8} {:>8} {:>5.0}%\n",
            time,
            format!("{:.1}{temp_unit}", entry.temperature.current),
            format!("{:.1}{temp_unit}", entry.temperature.feels_like),
            entry.precipitation_probability * 100.0,
        ));
    }

    out
}

/// Format a temperature right-aligned to `width` columns, coloured by band.
///
/// Padding is applied before the escape codes so columns line up either way.
fn paint_temperature(temp: f64, units: UnitSystem, opts: &RenderOptions, width: usize) -> String {
    let text = format!("{:>width$}", format!("{temp:.1}{}", units.temperature_label()));
    if !opts.color {
        return text;
    }
    let (r, g, b) = temperature_band(temp, units).rgb();
    format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
}

fn clock(time: Option<chrono::NaiveDateTime>) -> String {
    time.map_or_else(|| "--:--".to_string(), |t| t.format("%H:%M").to_string())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
