//! Spread configuration table.
//!
//! Maps every [`SpreadType`] to exactly one [`SpreadDefinition`]. The table is
//! built once (built-ins plus any configured custom spreads), validated at
//! construction, and never mutated afterwards. A misconfigured spread fails
//! here, at load time, instead of in the middle of a session.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::reading_engine::{
    error::{ReadingError, ReadingResult},
    models::PositionLabel,
};

// ---------------------------------------------------------------------------
// Spread type
// ---------------------------------------------------------------------------

/// Spread identifier shared by the table and `ReadingSession::start`.
///
/// Serialized as its kebab-case id (`"three-card"`, `"celtic-cross"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SpreadType {
    SingleCard,
    ThreeCard,
    Love,
    Career,
    CelticCross,
    DecisionMaking,
    ElementalBalance,
    /// A spread registered through configuration, keyed by its id.
    Custom(String),
}

impl SpreadType {
    pub const BUILTIN: [SpreadType; 7] = [
        SpreadType::SingleCard,
        SpreadType::ThreeCard,
        SpreadType::Love,
        SpreadType::Career,
        SpreadType::CelticCross,
        SpreadType::DecisionMaking,
        SpreadType::ElementalBalance,
    ];

    pub fn id(&self) -> &str {
        match self {
            SpreadType::SingleCard       => "single-card",
            SpreadType::ThreeCard        => "three-card",
            SpreadType::Love             => "love",
            SpreadType::Career           => "career",
            SpreadType::CelticCross      => "celtic-cross",
            SpreadType::DecisionMaking   => "decision-making",
            SpreadType::ElementalBalance => "elemental-balance",
            SpreadType::Custom(id)       => id,
        }
    }
}

impl fmt::Display for SpreadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for SpreadType {
    type Err = ReadingError;

    /// Known ids map to their variant; any other well-formed kebab-case id
    /// becomes `Custom`. Whether a custom id exists is decided by the table.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let known = SpreadType::BUILTIN.into_iter().find(|t| t.id() == s);
        if let Some(spread) = known {
            return Ok(spread);
        }
        let well_formed = !s.is_empty()
            && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if well_formed {
            Ok(SpreadType::Custom(s.to_string()))
        } else {
            Err(ReadingError::UnknownSpreadType(s.to_string()))
        }
    }
}

impl From<SpreadType> for String {
    fn from(spread: SpreadType) -> Self {
        spread.id().to_string()
    }
}

impl TryFrom<String> for SpreadType {
    type Error = ReadingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadDefinition {
    pub spread_type: SpreadType,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub card_count: usize,
    pub positions: Vec<PositionLabel>,
}

impl SpreadDefinition {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.positions.iter().map(|p| p.id.as_str())
    }

    fn validate(&self, max_cards: usize) -> ReadingResult<()> {
        let spread = self.spread_type.id();
        if self.card_count == 0 {
            return Err(ReadingError::invalid_spread(spread, "card count must be at least 1"));
        }
        if self.card_count != self.positions.len() {
            return Err(ReadingError::invalid_spread(
                spread,
                format!(
                    "advertises {} cards but defines {} position labels",
                    self.card_count,
                    self.positions.len()
                ),
            ));
        }
        if self.card_count > max_cards {
            return Err(ReadingError::invalid_spread(
                spread,
                format!("needs {} cards but the deck holds {max_cards}", self.card_count),
            ));
        }
        let mut seen = HashSet::new();
        for label in &self.positions {
            if !seen.insert(label.id.as_str()) {
                return Err(ReadingError::invalid_spread(
                    spread,
                    format!("duplicate position label '{}'", label.id),
                ));
            }
        }
        Ok(())
    }
}

/// Validated spread lookup. Listing order follows insertion order.
#[derive(Debug, Clone)]
pub struct SpreadTable {
    definitions: Vec<SpreadDefinition>,
    index: HashMap<SpreadType, usize>,
}

impl SpreadTable {
    /// Validate `definitions` and build the lookup.
    ///
    /// `max_cards` is the size of the deck the spreads will be drawn from.
    pub fn new(definitions: Vec<SpreadDefinition>, max_cards: usize) -> ReadingResult<Self> {
        let mut index = HashMap::with_capacity(definitions.len());
        for (i, def) in definitions.iter().enumerate() {
            def.validate(max_cards)?;
            if index.insert(def.spread_type.clone(), i).is_some() {
                return Err(ReadingError::invalid_spread(
                    def.spread_type.id(),
                    "spread type is defined more than once",
                ));
            }
        }
        Ok(SpreadTable { definitions, index })
    }

    /// Built-in spreads only.
    pub fn builtin(max_cards: usize) -> ReadingResult<Self> {
        Self::new(builtin_definitions(), max_cards)
    }

    pub fn get(&self, spread_type: &SpreadType) -> ReadingResult<&SpreadDefinition> {
        self.index
            .get(spread_type)
            .map(|&i| &self.definitions[i])
            .ok_or_else(|| ReadingError::UnknownSpreadType(spread_type.id().to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpreadDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Built-in spreads
// ---------------------------------------------------------------------------

fn spread(
    spread_type: SpreadType, name: &str, description: &str, icon: &str,
    positions: &[(&str, &str, &str)],
) -> SpreadDefinition {
    SpreadDefinition {
        spread_type,
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        card_count: positions.len(),
        positions: positions
            .iter()
            .map(|&(id, title, desc)| PositionLabel::new(id, title, desc))
            .collect(),
    }
}

/// Canonical spread definitions, in picker order.
pub fn builtin_definitions() -> Vec<SpreadDefinition> {
    vec![
        spread(
            SpreadType::SingleCard, "Single Card", "One card of guidance for the day.", "sparkles",
            &[("guidance", "Guidance", "The message you most need right now")],
        ),
        spread(
            SpreadType::ThreeCard, "Past, Present, Future", "A quick look along the timeline of a question.", "clock",
            &[
                ("past", "Past", "What led to this situation"),
                ("present", "Present", "Where things stand now"),
                ("future", "Future", "Where things are heading"),
            ],
        ),
        spread(
            SpreadType::Love, "Love", "Explore a relationship and its direction.", "heart",
            &[
                ("you", "You", "Your feelings and role in the relationship"),
                ("partner", "Partner", "Your partner's feelings and role"),
                ("connection", "Connection", "The bond between you"),
                ("challenge", "Challenge", "What stands in the way"),
                ("outcome", "Outcome", "Where the relationship is heading"),
            ],
        ),
        spread(
            SpreadType::Career, "Career", "Work, ambition and the next professional step.", "briefcase",
            &[
                ("current-position", "Current Position", "Your situation at work today"),
                ("obstacles", "Obstacles", "What is holding you back"),
                ("strengths", "Strengths", "What you can rely on"),
                ("advice", "Advice", "The action to take"),
                ("outcome", "Outcome", "The likely result"),
            ],
        ),
        spread(
            SpreadType::CelticCross, "Celtic Cross", "The classic ten-card in-depth reading.", "cross",
            &[
                ("present", "Present", "The heart of the matter"),
                ("challenge", "Challenge", "What crosses you"),
                ("foundation", "Foundation", "The root of the situation"),
                ("recent-past", "Recent Past", "What is passing away"),
                ("crown", "Crown", "The best that can be achieved"),
                ("near-future", "Near Future", "What is coming soon"),
                ("self", "Self", "Your attitude and position"),
                ("environment", "Environment", "The people and forces around you"),
                ("hopes-fears", "Hopes and Fears", "What you hope for or dread"),
                ("outcome", "Outcome", "Where this path leads"),
            ],
        ),
        spread(
            SpreadType::DecisionMaking, "Decision Making", "Weigh two options side by side.", "scale",
            &[
                ("situation", "Situation", "The decision in front of you"),
                ("option-a", "Option A", "The nature of the first path"),
                ("option-b", "Option B", "The nature of the second path"),
                ("outcome-a", "Outcome A", "Where the first path leads"),
                ("outcome-b", "Outcome B", "Where the second path leads"),
            ],
        ),
        spread(
            SpreadType::ElementalBalance, "Elemental Balance", "Check the balance of the four elements in your life.", "flame",
            &[
                ("fire", "Fire", "Passion, energy and drive"),
                ("water", "Water", "Emotions and relationships"),
                ("air", "Air", "Thoughts and communication"),
                ("earth", "Earth", "Body, money and material matters"),
            ],
        ),
    ]
}
