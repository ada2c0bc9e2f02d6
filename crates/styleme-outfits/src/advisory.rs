//! Weather-only advisory suggestions.

use styleme_weather::WeatherReading;

use crate::occasion::classify_for_advisories;

/// Temperature bands, checked in ascending order with strict upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    /// below 0 °C
    HeavyWinter,
    /// 0 to 10 °C
    WarmJacket,
    /// 10 to 15 °C
    LightJacket,
    /// 15 to 25 °C
    LightLayer,
    /// 25 °C and up
    WarmWeather,
}

impl TemperatureBand {
    pub fn from_celsius(temperature: f64) -> Self {
        if temperature < 0.0 {
            Self::HeavyWinter
        } else if temperature < 10.0 {
            Self::WarmJacket
        } else if temperature < 15.0 {
            Self::LightJacket
        } else if temperature < 25.0 {
            Self::LightLayer
        } else {
            Self::WarmWeather
        }
    }

    pub fn items(self) -> &'static [&'static str] {
        match self {
            Self::HeavyWinter => &[
                "Heavy winter coat",
                "Warm boots",
                "Gloves",
                "Scarf",
                "Thermal layers",
            ],
            Self::WarmJacket => &["Warm jacket", "Long pants", "Closed shoes", "Light sweater"],
            Self::LightJacket => &["Light jacket", "Jeans", "Sneakers", "Long sleeve shirt"],
            Self::LightLayer => &[
                "Light cardigan",
                "Jeans or light pants",
                "Comfortable shoes",
            ],
            Self::WarmWeather => &["Light shirt", "Shorts or light pants", "Sandals", "Sun hat"],
        }
    }
}

const RAIN_GEAR: &[&str] = &["Umbrella", "Waterproof jacket", "Water-resistant shoes"];
const SNOW_GEAR: &[&str] = &["Warm boots", "Heavy coat", "Gloves"];
const SUN_GEAR: &[&str] = &["Sunglasses", "Light colors", "Breathable fabrics"];

/// Gear lists triggered by the condition text. Every matching overlay applies.
fn condition_overlays(condition: &str) -> impl Iterator<Item = &'static [&'static str]> + '_ {
    [
        (condition.contains("rain"), RAIN_GEAR),
        (condition.contains("snow"), SNOW_GEAR),
        (
            condition.contains("sun") || condition.contains("clear"),
            SUN_GEAR,
        ),
    ]
    .into_iter()
    .filter_map(|(matched, gear)| matched.then_some(gear))
}

/// Build the advisory list: band items, condition gear, then occasion items,
/// deduplicated in first-seen order and truncated to `limit`.
pub fn advisories(reading: &WeatherReading, occasion: Option<&str>, limit: usize) -> Vec<String> {
    let band = TemperatureBand::from_celsius(reading.temperature);
    let condition = reading.condition.keyword_text();

    let occasion_items = occasion
        .and_then(classify_for_advisories)
        .map(|kind| kind.advisory_items())
        .unwrap_or_default();

    let candidates = band
        .items()
        .iter()
        .chain(condition_overlays(&condition).flatten())
        .chain(occasion_items.iter());

    let mut out: Vec<String> = Vec::with_capacity(limit);
    for item in candidates {
        if out.len() == limit {
            break;
        }
        if !out.iter().any(|seen| seen == item) {
            out.push((*item).to_string());
        }
    }
    out
}
