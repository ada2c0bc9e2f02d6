use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clothing category. Unknown labels are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Tops,
    Pants,
    Dresses,
    Jackets,
    Shoes,
    Accessories,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tops => "Tops",
            Self::Pants => "Pants",
            Self::Dresses => "Dresses",
            Self::Jackets => "Jackets",
            Self::Shoes => "Shoes",
            Self::Accessories => "Accessories",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "tops" => Self::Tops,
            "pants" => Self::Pants,
            "dresses" => Self::Dresses,
            "jackets" => Self::Jackets,
            "shoes" => Self::Shoes,
            "accessories" => Self::Accessories,
            _ => Self::Other(label.trim().to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Season {
    #[default]
    All,
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
        }
    }

    /// Case-insensitive; "autumn" is accepted for `Fall`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "spring" => Some(Self::Spring),
            "summer" => Some(Self::Summer),
            "fall" | "autumn" => Some(Self::Fall),
            "winter" => Some(Self::Winter),
            _ => None,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalogued clothing item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: i64,
    pub name: String,
    /// Path or URL of the item photo
    pub image: Option<String>,
    pub category: Category,
    pub color: String,
    pub season: Season,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl WardrobeItem {
    pub fn color_is(&self, color: &str) -> bool {
        self.color.eq_ignore_ascii_case(color)
    }
}

/// Fields supplied when adding an item. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub image: Option<String>,
    pub category: Category,
    pub color: String,
    pub season: Season,
}

impl NewItem {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            image: None,
            category,
            color: String::new(),
            season: Season::All,
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn season(mut self, season: Season) -> Self {
        self.season = season;
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
