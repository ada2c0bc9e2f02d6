//! Wardrobe catalog for StyleMe
//!
//! Item model plus a local SQLite store.

pub mod error;
pub mod item;
pub mod store;

pub use error::{WardrobeError, WardrobeResult};
pub use item::{Category, NewItem, Season, WardrobeItem};
pub use store::WardrobeStore;
