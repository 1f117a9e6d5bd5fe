//! Engine configuration: TOML file plus `TAROT_*` environment overrides.
//!
//! ```toml
//! reversal_probability = 0.5
//! rng_seed = 42
//! shuffle_delay_ms = 800
//! draw_delay_ms = 400
//!
//! [[custom_spreads]]
//! id = "moon-phases"
//! name = "Moon Phases"
//! icon = "moon"
//! card_count = 2
//! positions = [
//!     { id = "waxing", title = "Waxing" },
//!     { id = "waning", title = "Waning" },
//! ]
//! ```

use std::{env, fmt::Display, fs, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::reading_engine::{
    deck::DEFAULT_REVERSAL_PROBABILITY,
    error::{ReadingError, ReadingResult},
    models::PositionLabel,
    spreads::{SpreadDefinition, SpreadType},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Probability that each drawn card comes out reversed.
    pub reversal_probability: f64,
    /// Fixed seed for reproducible sessions; `None` draws from entropy.
    pub rng_seed: Option<u64>,
    pub shuffle_delay_ms: u64,
    pub draw_delay_ms: u64,
    pub custom_spreads: Vec<CustomSpreadConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            reversal_probability: DEFAULT_REVERSAL_PROBABILITY,
            rng_seed: None,
            shuffle_delay_ms: 0,
            draw_delay_ms: 0,
            custom_spreads: Vec::new(),
        }
    }
}

/// A spread declared in configuration rather than built in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSpreadConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub card_count: usize,
    pub positions: Vec<PositionLabel>,
}

impl CustomSpreadConfig {
    /// Convert into a table entry. Ids that collide with a built-in spread
    /// resolve to the built-in type and are rejected by the table as duplicates.
    pub fn to_definition(&self) -> ReadingResult<SpreadDefinition> {
        let spread_type = self
            .id
            .parse::<SpreadType>()
            .map_err(|_| ReadingError::invalid_spread(&self.id, "id must be kebab-case"))?;
        Ok(SpreadDefinition {
            spread_type,
            name: self.name.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            card_count: self.card_count,
            positions: self.positions.clone(),
        })
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> ReadingResult<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ReadingResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|e| ReadingError::Config(format!("cannot read {}: {e}", path.display())))?;
        info!(path = %path.display(), "loaded engine config");
        Self::from_toml_str(&source)
    }

    /// Apply `TAROT_*` environment variables on top of this config.
    /// Unparseable values are logged and ignored.
    pub fn with_env_overrides(self) -> ReadingResult<Self> {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ReadingResult<Self> {
        if let Some(p) = parse_override(&lookup, "TAROT_REVERSAL_PROBABILITY") {
            self.reversal_probability = p;
        }
        if let Some(seed) = parse_override(&lookup, "TAROT_RNG_SEED") {
            self.rng_seed = Some(seed);
        }
        if let Some(ms) = parse_override(&lookup, "TAROT_SHUFFLE_DELAY_MS") {
            self.shuffle_delay_ms = ms;
        }
        if let Some(ms) = parse_override(&lookup, "TAROT_DRAW_DELAY_MS") {
            self.draw_delay_ms = ms;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ReadingResult<()> {
        if !(0.0..=1.0).contains(&self.reversal_probability) {
            return Err(ReadingError::Config(format!(
                "reversal_probability must be within 0..=1, got {}",
                self.reversal_probability
            )));
        }
        Ok(())
    }

    pub fn shuffle_delay(&self) -> Duration {
        Duration::from_millis(self.shuffle_delay_ms)
    }

    pub fn draw_delay(&self) -> Duration {
        Duration::from_millis(self.draw_delay_ms)
    }

    pub fn custom_definitions(&self) -> ReadingResult<Vec<SpreadDefinition>> {
        self.custom_spreads.iter().map(CustomSpreadConfig::to_definition).collect()
    }
}

fn parse_override<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T::Err: Display,
{
    let raw = lookup(key)?;
    raw.trim()
        .parse()
        .map_err(|e| warn!("Invalid {key} value '{raw}': {e}"))
        .ok()
}
