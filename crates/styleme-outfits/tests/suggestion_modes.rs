//! Both suggestion modes driven through the engine.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use styleme_core::SuggestionsConfig;
use styleme_outfits::{OutfitSuggestion, SuggestionEngine, SuggestionInputs, SuggestionMode};
use styleme_wardrobe::{Category, Season, WardrobeItem};
use styleme_weather::{PrimaryCondition, WeatherReading};

fn reading(temperature: f64, code: u16, description: &str) -> WeatherReading {
    WeatherReading {
        location_name: "Oslo".into(),
        country: Some("Norway".into()),
        temperature,
        feels_like: temperature,
        humidity: 80,
        temp_min: temperature - 1.0,
        temp_max: temperature + 1.0,
        wind_speed_kmh: 10.0,
        wind_direction_degrees: 270,
        wind_direction: "W".into(),
        pressure_hpa: 1001.0,
        condition: PrimaryCondition::from_code(code, description),
        observed_at: Utc::now(),
    }
}

fn wardrobe_item(id: i64, name: &str, category: Category, color: &str) -> WardrobeItem {
    WardrobeItem {
        id,
        name: name.into(),
        image: None,
        category,
        color: color.into(),
        season: Season::All,
        favorite: false,
        created_at: Utc::now(),
    }
}

fn engine(seed: u64) -> SuggestionEngine {
    let config = SuggestionsConfig {
        simulated_latency_ms: 0,
        ..SuggestionsConfig::default()
    };
    SuggestionEngine::with_rng(config, StdRng::seed_from_u64(seed))
}

#[test]
fn advisory_for_freezing_snow_is_deduplicated() {
    let inputs = SuggestionInputs {
        weather: Some(reading(-5.0, 326, "Light snow")),
        occasion: Some("Weekend brunch".into()),
        mode: SuggestionMode::Advisory,
        ..Default::default()
    };

    let OutfitSuggestion::Advisory(items) = engine(0).suggest(&inputs) else {
        panic!("expected advisory suggestions");
    };

    assert!(items.len() <= 8);
    assert!(items.contains(&"Heavy winter coat".to_string()));
    assert!(items.contains(&"Heavy coat".to_string()));
    let unique: HashSet<_> = items.iter().collect();
    assert_eq!(unique.len(), items.len());
}

#[test]
fn wardrobe_picks_one_per_represented_category() {
    let wardrobe = vec![
        wardrobe_item(1, "Silk Blouse", Category::Tops, "Ivory"),
        wardrobe_item(2, "Linen Tee", Category::Tops, "White"),
        wardrobe_item(3, "Slip Dress", Category::Dresses, "Black"),
        wardrobe_item(4, "Clutch", Category::Accessories, "Gold"),
        wardrobe_item(5, "Espadrilles", Category::Shoes, "Tan"),
    ];

    for seed in 0..10 {
        let inputs = SuggestionInputs {
            weather: Some(reading(30.0, 113, "Sunny")),
            wardrobe: wardrobe.clone(),
            occasion: Some("office party".into()),
            mode: SuggestionMode::Wardrobe,
        };
        let OutfitSuggestion::Items(items) = engine(seed).suggest(&inputs) else {
            panic!("expected wardrobe picks");
        };

        assert!(items.len() <= 6);
        let categories: HashSet<_> = items.iter().map(|i| i.category.clone()).collect();
        assert_eq!(categories.len(), items.len());
    }
}

#[tokio::test]
async fn refresh_publishes_latest() {
    let engine = engine(3);
    let inputs = SuggestionInputs {
        weather: Some(reading(12.0, 119, "Cloudy")),
        ..Default::default()
    };

    assert!(engine.latest().is_none());
    let result = engine
        .refresh(styleme_outfits::RefreshTrigger::OccasionChanged, &inputs)
        .await;
    assert_eq!(engine.latest(), Some(result));
}
