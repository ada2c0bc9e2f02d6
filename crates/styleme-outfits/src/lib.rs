//! Outfit suggestions for StyleMe
//!
//! Two modes share one engine: weather advisories (band + condition +
//! occasion lists) and wardrobe picks (filter by temperature and occasion,
//! then one random item per category).

pub mod advisory;
pub mod engine;
pub mod occasion;
pub mod selection;

pub use advisory::{advisories, TemperatureBand};
pub use engine::{
    InsufficientData, OutfitSuggestion, RefreshState, RefreshTrigger, SuggestionEngine,
    SuggestionInputs, SuggestionMode,
};
pub use occasion::{classify_for_advisories, classify_for_wardrobe, OccasionKind};
pub use selection::{select_outfit, CATEGORY_ORDER};
