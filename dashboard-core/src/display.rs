//! Pure mappings from raw weather values to display primitives.

use crate::model::UnitSystem;

/// Glyph shown for icon codes OpenWeather does not document.
pub const UNKNOWN_ICON: &str = "❓";

/// Emoji for an OpenWeather icon code. Never fails.
pub fn icon_for(code: &str) -> &'static str {
    match code {
        "01d" => "☀️",
        "01n" => "🌙",
        "02d" => "🌤️",
        "02n" => "☁️",
        "03d" => "⛅",
        "03n" => "☁️",
        "04d" | "04n" => "☁️",
        "09d" | "09n" => "🌧️",
        "10d" => "🌦️",
        "10n" => "🌧️",
        "11d" | "11n" => "⛈️",
        "13d" | "13n" => "❄️",
        "50d" | "50n" => "🌫️",
        _ => UNKNOWN_ICON,
    }
}

/// Temperature bands, coldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemperatureBand {
    Frigid,
    Cold,
    Cool,
    Mild,
    Warm,
    Hot,
    VeryHot,
    Scorching,
}

impl TemperatureBand {
    pub const ALL: [TemperatureBand; 8] = [
        TemperatureBand::Frigid,
        TemperatureBand::Cold,
        TemperatureBand::Cool,
        TemperatureBand::Mild,
        TemperatureBand::Warm,
        TemperatureBand::Hot,
        TemperatureBand::VeryHot,
        TemperatureBand::Scorching,
    ];

    /// Band for a Celsius temperature. The lowest band whose upper bound
    /// exceeds the value wins; NaN lands in the hottest band.
    pub fn from_celsius(celsius: f64) -> Self {
        const UPPER_BOUNDS: [(f64, TemperatureBand); 7] = [
            (-10.0, TemperatureBand::Frigid),
            (0.0, TemperatureBand::Cold),
            (10.0, TemperatureBand::Cool),
            (20.0, TemperatureBand::Mild),
            (25.0, TemperatureBand::Warm),
            (30.0, TemperatureBand::Hot),
            (35.0, TemperatureBand::VeryHot),
        ];

        UPPER_BOUNDS
            .iter()
            .find(|(bound, _)| celsius < *bound)
            .map_or(TemperatureBand::Scorching, |(_, band)| *band)
    }

    pub fn hex(&self) -> &'static str {
        match self {
            TemperatureBand::Frigid => "#0022FF",
            TemperatureBand::Cold => "#0066FF",
            TemperatureBand::Cool => "#00AAFF",
            TemperatureBand::Mild => "#00CCAA",
            TemperatureBand::Warm => "#00CC00",
            TemperatureBand::Hot => "#DDCC00",
            TemperatureBand::VeryHot => "#FF8800",
            TemperatureBand::Scorching => "#FF0000",
        }
    }

    /// The color as an RGB triple, for terminals that take 24-bit escapes.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = &self.hex()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn temperature_band(temp: f64, unit: UnitSystem) -> TemperatureBand {
    let celsius = match unit {
        UnitSystem::Metric => temp,
        UnitSystem::Imperial => fahrenheit_to_celsius(temp),
    };
    TemperatureBand::from_celsius(celsius)
}

/// Hex color for a temperature expressed in `unit`.
pub fn color_for(temp: f64, unit: UnitSystem) -> &'static str {
    temperature_band(temp, unit).hex()
}

const OCTANT_GLYPHS: [&str; 8] = ["⬇️", "↙️", "⬅️", "↖️", "⬆️", "↗️", "➡️", "↘️"];
const OCTANT_LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Octant index 0..8 with north at 0, each octant 45° wide and centred on
/// its compass point.
fn octant(degrees: f64) -> usize {
    let normalized = degrees.rem_euclid(360.0);
    ((normalized + 22.5) / 45.0).floor() as usize % 8
}

/// Arrow showing where the wind blows to, given where it comes from.
pub fn direction_glyph_for(degrees: f64) -> &'static str {
    OCTANT_GLYPHS[octant(degrees)]
}

pub fn compass_point(degrees: f64) -> &'static str {
    OCTANT_LABELS[octant(degrees)]
}
