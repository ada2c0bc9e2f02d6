use anyhow::{bail, Context, Result};
use styleme_core::{AppError, Config};
use styleme_outfits::{
    OutfitSuggestion, RefreshTrigger, SuggestionEngine, SuggestionInputs, SuggestionMode,
};
use styleme_wardrobe::WardrobeStore;
use styleme_weather::{SourcedReading, WeatherAcquisition};

const USAGE: &str = "usage: styleme [--mode advisory|wardrobe] [occasion words...]";

struct Args {
    mode: SuggestionMode,
    occasion: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Option<Args>> {
    let mut mode = SuggestionMode::default();
    let mut words = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--mode" => {
                let value = args.next().context("--mode needs a value")?;
                mode = value.parse().map_err(anyhow::Error::msg)?;
            }
            _ => {
                if let Some(value) = arg.strip_prefix("--mode=") {
                    mode = value.parse().map_err(anyhow::Error::msg)?;
                } else if arg.starts_with("--") {
                    bail!("unknown option {arg}\n{USAGE}");
                } else {
                    words.push(arg);
                }
            }
        }
    }

    let occasion = (!words.is_empty()).then(|| words.join(" "));
    Ok(Some(Args { mode, occasion }))
}

fn print_weather(sourced: &SourcedReading) {
    let reading = &sourced.reading;
    println!("{} ({})", reading.display_location(), sourced.provenance);
    println!(
        "  {}  {} [{}]  {}",
        reading.display_temperature(),
        reading.condition.description,
        reading.condition.icon,
        reading.display_feels_like()
    );
    println!(
        "  Low/High {}  Humidity {}  Wind {}",
        reading.display_range(),
        reading.display_humidity(),
        reading.display_wind()
    );
}

fn print_suggestion(suggestion: &OutfitSuggestion) {
    match suggestion {
        OutfitSuggestion::Advisory(items) => {
            println!("\nToday's outfit suggestions:");
            for item in items {
                println!("  - {item}");
            }
        }
        OutfitSuggestion::Items(items) => {
            println!("\nFrom your wardrobe:");
            for item in items {
                let star = if item.favorite { " *" } else { "" };
                println!("  - {} ({}, {}){}", item.name, item.category, item.color, star);
            }
        }
        OutfitSuggestion::InsufficientData(reason) => {
            println!("\n{}", reason.message());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let Some(args) = parse_args(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    let (config, validation) = Config::load_validated()?;
    styleme_core::init(&config.logging.level)?;

    tracing::info!("Configuration loaded from {}", Config::config_path()?.display());
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    tracing::info!(mode = ?args.mode, occasion = ?args.occasion, "StyleMe started");

    let acquisition = WeatherAcquisition::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to set up weather provider: {e}"))?;

    let weather = match acquisition.acquire().await {
        Ok(sourced) => {
            print_weather(&sourced);
            Some(sourced.reading)
        }
        Err(err) => {
            let retryable = err.is_retryable();
            let app_err = AppError::from(err);
            eprintln!("{}", app_err.user_message());
            if retryable {
                eprintln!("Run styleme again to retry.");
            }
            None
        }
    };

    let wardrobe = match args.mode {
        SuggestionMode::Wardrobe => {
            let store = WardrobeStore::new(&config.wardrobe.database_path)
                .map_err(AppError::from)
                .with_context(|| {
                    format!(
                        "Failed to open wardrobe at {}",
                        config.wardrobe.database_path.display()
                    )
                })?;
            store.seed_demo_items().map_err(AppError::from)?;
            store.items().map_err(AppError::from)?
        }
        SuggestionMode::Advisory => Vec::new(),
    };

    let engine = SuggestionEngine::new(config.suggestions.clone());
    let inputs = SuggestionInputs {
        weather,
        wardrobe,
        occasion: args.occasion,
        mode: args.mode,
    };
    let suggestion = engine.refresh(RefreshTrigger::WeatherChanged, &inputs).await;
    print_suggestion(&suggestion);

    if let Some(occasion) = &inputs.occasion {
        println!("\nOccasion: {occasion}");
    }

    Ok(())
}
