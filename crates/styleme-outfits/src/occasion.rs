//! Occasion keyword tables.
//!
//! Labels are free text matched by case-insensitive substring. Tables are
//! scanned in order and the first rule with a matching keyword wins.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccasionKind {
    Work,
    Party,
    Casual,
    Date,
    Sport,
}

/// Keyword table for advisory suggestions.
const ADVISORY_RULES: &[(&[&str], OccasionKind)] = &[
    (&["work", "office"], OccasionKind::Work),
    (&["party", "celebration"], OccasionKind::Party),
    (&["casual", "weekend"], OccasionKind::Casual),
    (&["date"], OccasionKind::Date),
    (&["sport", "gym"], OccasionKind::Sport),
];

/// Keyword table for wardrobe filtering. Only these occasions narrow the
/// wardrobe.
const WARDROBE_RULES: &[(&[&str], OccasionKind)] = &[
    (&["work"], OccasionKind::Work),
    (&["party"], OccasionKind::Party),
    (&["casual"], OccasionKind::Casual),
];

fn first_match(rules: &[(&[&str], OccasionKind)], label: &str) -> Option<OccasionKind> {
    let label = label.to_lowercase();
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| label.contains(k)))
        .map(|(_, kind)| *kind)
}

/// Occasion used to extend advisory suggestions.
pub fn classify_for_advisories(label: &str) -> Option<OccasionKind> {
    first_match(ADVISORY_RULES, label)
}

/// Occasion used to filter wardrobe items.
pub fn classify_for_wardrobe(label: &str) -> Option<OccasionKind> {
    first_match(WARDROBE_RULES, label)
}

impl OccasionKind {
    pub fn advisory_items(self) -> &'static [&'static str] {
        match self {
            Self::Work => &["Blazer", "Dress shirt", "Formal shoes", "Watch", "Belt"],
            Self::Party => &[
                "Dress",
                "Heels",
                "Statement jewelry",
                "Clutch",
                "Bold lipstick",
            ],
            Self::Casual => &["Jeans", "T-shirt", "Sneakers", "Casual jacket"],
            Self::Date => &["Nice dress", "Comfortable heels", "Light perfume", "Small bag"],
            Self::Sport => &["Athletic wear", "Sports shoes", "Water bottle", "Towel"],
        }
    }
}
