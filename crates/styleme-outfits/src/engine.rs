//! Suggestion engine: picks the mode, applies the rules, and tracks refreshes.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use styleme_core::SuggestionsConfig;
use styleme_wardrobe::WardrobeItem;
use styleme_weather::WeatherReading;

use crate::advisory::advisories;
use crate::selection::select_outfit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionMode {
    /// Generic advice strings, no wardrobe needed
    #[default]
    Advisory,
    /// Items picked from the user's wardrobe
    Wardrobe,
}

impl std::str::FromStr for SuggestionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "wardrobe" => Ok(Self::Wardrobe),
            other => Err(format!("unknown mode '{other}' (expected advisory or wardrobe)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsufficientData {
    MissingWeather,
    EmptyWardrobe,
    /// Wardrobe has items but none suit the conditions
    NoSuitableItems,
}

impl InsufficientData {
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingWeather => "Weather data needed for suggestions",
            Self::EmptyWardrobe => "Add some items to your wardrobe to get outfit picks",
            Self::NoSuitableItems => "Nothing in your wardrobe suits today's weather",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutfitSuggestion {
    Advisory(Vec<String>),
    Items(Vec<WardrobeItem>),
    InsufficientData(InsufficientData),
}

impl OutfitSuggestion {
    pub fn len(&self) -> usize {
        match self {
            Self::Advisory(items) => items.len(),
            Self::Items(items) => items.len(),
            Self::InsufficientData(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Snapshot the engine works from. Never mutated by the engine.
#[derive(Debug, Clone, Default)]
pub struct SuggestionInputs {
    pub weather: Option<WeatherReading>,
    pub wardrobe: Vec<WardrobeItem>,
    pub occasion: Option<String>,
    pub mode: SuggestionMode,
}

impl SuggestionInputs {
    fn occasion(&self) -> Option<&str> {
        self.occasion
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
    }
}

/// What caused a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    WeatherChanged,
    OccasionChanged,
    WardrobeChanged,
    Manual,
}

/// Loading indicator state for refreshes.
///
/// Refreshes may overlap; the state stays `Loading` until the last one
/// finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Loading { in_flight: usize },
}

impl RefreshState {
    pub fn is_loading(self) -> bool {
        matches!(self, RefreshState::Loading { .. })
    }

    /// State after a refresh starts.
    pub fn on_start(self) -> Self {
        match self {
            RefreshState::Idle => RefreshState::Loading { in_flight: 1 },
            RefreshState::Loading { in_flight } => RefreshState::Loading {
                in_flight: in_flight + 1,
            },
        }
    }

    /// State after a refresh completes.
    pub fn on_done(self) -> Self {
        match self {
            RefreshState::Loading { in_flight } if in_flight > 1 => RefreshState::Loading {
                in_flight: in_flight - 1,
            },
            _ => RefreshState::Idle,
        }
    }
}

struct Shared {
    state: RefreshState,
    latest: Option<OutfitSuggestion>,
}

pub struct SuggestionEngine {
    config: SuggestionsConfig,
    rng: Mutex<StdRng>,
    shared: Mutex<Shared>,
}

impl SuggestionEngine {
    pub fn new(config: SuggestionsConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Use a specific random source (seeded for reproducible picks).
    pub fn with_rng(config: SuggestionsConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng: Mutex::new(rng),
            shared: Mutex::new(Shared {
                state: RefreshState::Idle,
                latest: None,
            }),
        }
    }

    /// Compute a suggestion immediately. Never fails.
    pub fn suggest(&self, inputs: &SuggestionInputs) -> OutfitSuggestion {
        let Some(weather) = inputs.weather.as_ref() else {
            return OutfitSuggestion::InsufficientData(InsufficientData::MissingWeather);
        };

        match inputs.mode {
            SuggestionMode::Advisory => OutfitSuggestion::Advisory(advisories(
                weather,
                inputs.occasion(),
                self.config.advisory_limit(),
            )),
            SuggestionMode::Wardrobe => {
                if inputs.wardrobe.is_empty() {
                    return OutfitSuggestion::InsufficientData(InsufficientData::EmptyWardrobe);
                }
                let picks = select_outfit(
                    &inputs.wardrobe,
                    weather.temperature,
                    inputs.occasion(),
                    self.config.item_limit(),
                    &mut *self.rng.lock(),
                );
                if picks.is_empty() {
                    OutfitSuggestion::InsufficientData(InsufficientData::NoSuitableItems)
                } else {
                    OutfitSuggestion::Items(picks)
                }
            }
        }
    }

    /// Recompute after the simulated latency and publish the result.
    ///
    /// Overlapping refreshes are not cancelled; whichever finishes last is
    /// what [`SuggestionEngine::latest`] reports.
    pub async fn refresh(
        &self,
        trigger: RefreshTrigger,
        inputs: &SuggestionInputs,
    ) -> OutfitSuggestion {
        {
            let mut shared = self.shared.lock();
            shared.state = shared.state.on_start();
        }
        tracing::debug!(?trigger, mode = ?inputs.mode, "Refreshing suggestions");

        let latency = self.config.simulated_latency();
        if latency > Duration::ZERO {
            tokio::time::sleep(latency).await;
        }

        let suggestion = self.suggest(inputs);

        let mut shared = self.shared.lock();
        shared.state = shared.state.on_done();
        shared.latest = Some(suggestion.clone());
        tracing::info!(?trigger, count = suggestion.len(), "Suggestions refreshed");
        suggestion
    }

    pub fn state(&self) -> RefreshState {
        self.shared.lock().state
    }

    pub fn latest(&self) -> Option<OutfitSuggestion> {
        self.shared.lock().latest.clone()
    }
}
