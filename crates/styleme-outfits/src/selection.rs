//! Wardrobe-aware outfit selection.

use rand::seq::SliceRandom;
use rand::Rng;
use styleme_wardrobe::{Category, Season, WardrobeItem};

use crate::occasion::{classify_for_wardrobe, OccasionKind};

/// Categories considered for an outfit, in pick order.
pub const CATEGORY_ORDER: [Category; 6] = [
    Category::Tops,
    Category::Pants,
    Category::Dresses,
    Category::Jackets,
    Category::Shoes,
    Category::Accessories,
];

/// Whether `item` suits the temperature. The 10-25 °C range keeps everything.
pub fn suits_temperature(item: &WardrobeItem, temperature: f64) -> bool {
    if temperature < 10.0 {
        matches!(item.category, Category::Jackets | Category::Pants)
            || matches!(item.season, Season::Winter | Season::All)
    } else if temperature > 25.0 {
        matches!(item.category, Category::Tops | Category::Dresses)
            || matches!(item.season, Season::Summer | Season::All)
    } else {
        true
    }
}

pub fn suits_occasion(item: &WardrobeItem, occasion: OccasionKind) -> bool {
    match occasion {
        OccasionKind::Work => {
            matches!(item.category, Category::Jackets | Category::Pants)
                || item.color_is("Black")
                || item.color_is("Navy")
        }
        OccasionKind::Party => {
            matches!(item.category, Category::Dresses | Category::Accessories) || item.favorite
        }
        OccasionKind::Casual => {
            matches!(
                item.category,
                Category::Tops | Category::Pants | Category::Shoes
            )
        }
        OccasionKind::Date | OccasionKind::Sport => true,
    }
}

/// Temperature filter, then the occasion filter unless it would leave
/// nothing.
pub fn candidates<'a>(
    wardrobe: &'a [WardrobeItem],
    temperature: f64,
    occasion: Option<&str>,
) -> Vec<&'a WardrobeItem> {
    let by_weather: Vec<&WardrobeItem> = wardrobe
        .iter()
        .filter(|item| suits_temperature(item, temperature))
        .collect();

    let Some(kind) = occasion.and_then(classify_for_wardrobe) else {
        return by_weather;
    };

    let by_occasion: Vec<&WardrobeItem> = by_weather
        .iter()
        .copied()
        .filter(|item| suits_occasion(item, kind))
        .collect();

    if by_occasion.is_empty() {
        tracing::debug!(
            "Occasion {:?} matched no items, keeping {} weather-suitable items",
            kind,
            by_weather.len()
        );
        by_weather
    } else {
        by_occasion
    }
}

/// Pick at most one item per category, in [`CATEGORY_ORDER`], capped at
/// `limit`.
pub fn select_outfit<R: Rng + ?Sized>(
    wardrobe: &[WardrobeItem],
    temperature: f64,
    occasion: Option<&str>,
    limit: usize,
    rng: &mut R,
) -> Vec<WardrobeItem> {
    let pool = candidates(wardrobe, temperature, occasion);

    let mut outfit = Vec::new();
    for category in &CATEGORY_ORDER {
        if outfit.len() >= limit {
            break;
        }
        let in_category: Vec<&WardrobeItem> = pool
            .iter()
            .copied()
            .filter(|item| &item.category == category)
            .collect();
        if let Some(item) = in_category.choose(rng) {
            outfit.push((*item).clone());
        }
    }
    outfit
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn item(id: i64, name: &str, category: Category, color: &str, season: Season) -> WardrobeItem {
        WardrobeItem {
            id,
            name: name.to_string(),
            image: None,
            category,
            color: color.to_string(),
            season,
            favorite: false,
            created_at: Utc::now(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn demo() -> Vec<WardrobeItem> {
        let mut blazer = item(1, "Navy Blazer", Category::Jackets, "Navy", Season::All);
        blazer.favorite = true;
        let mut dress = item(6, "Summer Dress", Category::Dresses, "Floral", Season::Summer);
        dress.favorite = true;
        vec![
            blazer,
            item(2, "White Button Shirt", Category::Tops, "White", Season::All),
            item(3, "Black Dress Pants", Category::Pants, "Black", Season::All),
            item(5, "Blue Jeans", Category::Pants, "Blue", Season::All),
            dress,
        ]
    }

    #[test]
    fn test_cold_filter() {
        let wardrobe = vec![
            item(1, "Linen Top", Category::Tops, "White", Season::Summer),
            item(2, "Sweater", Category::Tops, "Grey", Season::Winter),
            item(3, "Shorts", Category::Pants, "Khaki", Season::Summer),
        ];
        let names: Vec<_> = candidates(&wardrobe, 4.0, None)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Sweater", "Shorts"]);
    }

    #[test]
    fn test_hot_filter() {
        let wardrobe = vec![
            item(1, "Parka", Category::Jackets, "Black", Season::Winter),
            item(2, "Tank", Category::Tops, "White", Season::Winter),
            item(3, "Sandals", Category::Shoes, "Brown", Season::Summer),
        ];
        let names: Vec<_> = candidates(&wardrobe, 31.0, None)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Tank", "Sandals"]);
    }

    #[test]
    fn test_mild_range_keeps_everything() {
        let wardrobe = vec![
            item(1, "Parka", Category::Jackets, "Black", Season::Winter),
            item(2, "Sandals", Category::Shoes, "Brown", Season::Summer),
        ];
        assert_eq!(candidates(&wardrobe, 10.0, None).len(), 2);
        assert_eq!(candidates(&wardrobe, 25.0, None).len(), 2);
    }

    #[test]
    fn test_work_filter_uses_category_and_color() {
        let wardrobe = vec![
            item(1, "Black Tee", Category::Tops, "black", Season::All),
            item(2, "Red Tee", Category::Tops, "Red", Season::All),
            item(3, "Chinos", Category::Pants, "Beige", Season::All),
        ];
        let names: Vec<_> = candidates(&wardrobe, 18.0, Some("work"))
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Black Tee", "Chinos"]);
    }

    #[test]
    fn test_narrow_occasion_falls_back() {
        let wardrobe = vec![
            item(1, "Parka", Category::Jackets, "Green", Season::Winter),
            item(2, "Wool Pants", Category::Pants, "Grey", Season::Winter),
        ];
        // No dresses, accessories or favorites: party filter is empty.
        let pool = candidates(&wardrobe, 2.0, Some("party"));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_one_item_per_category() {
        let wardrobe = demo();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outfit = select_outfit(&wardrobe, 18.0, None, 6, &mut rng);
            let categories: HashSet<_> = outfit.iter().map(|i| i.category.clone()).collect();
            assert_eq!(categories.len(), outfit.len());
            assert_eq!(outfit.len(), 4);
            assert!(outfit.len() <= 6);
        }
    }

    #[test]
    fn test_pick_order_follows_categories() {
        let outfit = select_outfit(&demo(), 18.0, None, 6, &mut rng());
        let categories: Vec<_> = outfit.iter().map(|i| i.category.clone()).collect();
        assert_eq!(
            categories,
            vec![
                Category::Tops,
                Category::Pants,
                Category::Dresses,
                Category::Jackets
            ]
        );
    }

    #[test]
    fn test_limit_caps_outfit() {
        let outfit = select_outfit(&demo(), 18.0, None, 2, &mut rng());
        assert_eq!(outfit.len(), 2);
        assert_eq!(outfit[0].category, Category::Tops);
    }

    #[test]
    fn test_hot_office_party() {
        // 5 items across 4 categories; "office party" filters to the party rule.
        let outfit = select_outfit(&demo(), 30.0, Some("office party"), 6, &mut rng());
        let names: Vec<_> = outfit.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Summer Dress", "Navy Blazer"]);
    }

    #[test]
    fn test_same_seed_same_outfit() {
        let wardrobe = demo();
        let a = select_outfit(&wardrobe, 18.0, None, 6, &mut StdRng::seed_from_u64(42));
        let b = select_outfit(&wardrobe, 18.0, None, 6, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_other_categories_are_not_picked() {
        let wardrobe = vec![item(
            1,
            "Cardigan",
            Category::Other("Knitwear".into()),
            "Grey",
            Season::All,
        )];
        assert!(select_outfit(&wardrobe, 18.0, None, 6, &mut rng()).is_empty());
    }
}
