use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reading_engine::spreads::SpreadType;

// ---------------------------------------------------------------------------
// Card primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Wands,
    Cups,
    Swords,
    Pentacles,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Wands, Suit::Cups, Suit::Swords, Suit::Pentacles];

    /// Classical element associated with the suit.
    pub fn element(self) -> &'static str {
        match self {
            Suit::Wands     => "fire",
            Suit::Cups      => "water",
            Suit::Swords    => "air",
            Suit::Pentacles => "earth",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suit::Wands     => write!(f, "Wands"),
            Suit::Cups      => write!(f, "Cups"),
            Suit::Swords    => write!(f, "Swords"),
            Suit::Pentacles => write!(f, "Pentacles"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arcana {
    Major,
    Minor,
}

/// Immutable catalog entry. `suit == None` marks a major arcana (trump) card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub localized_name: String,
    pub image: String,
    pub suit: Option<Suit>,
    /// 0..=21 for major arcana, 1..=14 (Ace..King) within a suit.
    pub number: u8,
    #[serde(default)]
    pub upright_keywords: Vec<String>,
    #[serde(default)]
    pub reversed_keywords: Vec<String>,
    pub upright_meaning: String,
    pub reversed_meaning: String,
}

impl Card {
    pub fn arcana(&self) -> Arcana {
        match self.suit {
            Some(_) => Arcana::Minor,
            None    => Arcana::Major,
        }
    }

    pub fn meaning(&self, is_reversed: bool) -> &str {
        if is_reversed { &self.reversed_meaning } else { &self.upright_meaning }
    }

    pub fn keywords(&self, is_reversed: bool) -> &[String] {
        if is_reversed { &self.reversed_keywords } else { &self.upright_keywords }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ---------------------------------------------------------------------------
// Spread positions and drawn cards
// ---------------------------------------------------------------------------

/// One slot in a spread layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLabel {
    /// Stable kebab-case identifier, e.g. `"past"` or `"hopes-fears"`.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl PositionLabel {
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        PositionLabel { id: id.into(), title: title.into(), description: description.into() }
    }
}

impl fmt::Display for PositionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A card pulled from the deck with its orientation, before a position is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub card: Card,
    pub is_reversed: bool,
}

/// A card bound to a session slot. Fields are private so identity, position
/// and orientation cannot change after the draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCard {
    card: Card,
    position: usize,
    position_label: PositionLabel,
    is_reversed: bool,
}

impl DrawnCard {
    pub(crate) fn new(draw: Draw, position: usize, position_label: PositionLabel) -> Self {
        DrawnCard { card: draw.card, position, position_label, is_reversed: draw.is_reversed }
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn position_label(&self) -> &PositionLabel {
        &self.position_label
    }

    pub fn is_reversed(&self) -> bool {
        self.is_reversed
    }

    pub fn meaning(&self) -> &str {
        self.card.meaning(self.is_reversed)
    }
}

impl fmt::Display for DrawnCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orientation = if self.is_reversed { " (reversed)" } else { "" };
        write!(f, "{}. {}: {}{}", self.position + 1, self.position_label, self.card, orientation)
    }
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Shuffling,
    Drawing,
    Revealing,
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle      => write!(f, "idle"),
            SessionState::Shuffling => write!(f, "shuffling"),
            SessionState::Drawing   => write!(f, "drawing"),
            SessionState::Revealing => write!(f, "revealing"),
            SessionState::Complete  => write!(f, "complete"),
        }
    }
}

// ---------------------------------------------------------------------------
// Finished reading / persistence shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingCardRecord {
    pub card_id: String,
    pub position: usize,
    pub position_label: String,
    pub is_reversed: bool,
}

/// Snapshot of a completed session, handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedReading {
    pub session_id: Uuid,
    pub reading_type: SpreadType,
    pub question: Option<String>,
    pub cards: Vec<ReadingCardRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "id")]
pub enum ReadingOwner {
    User(String),
    Anonymous(String),
}

impl fmt::Display for ReadingOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingOwner::User(id)      => write!(f, "user:{id}"),
            ReadingOwner::Anonymous(id) => write!(f, "anon:{id}"),
        }
    }
}

pub type SavedReadingId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReading {
    pub id: SavedReadingId,
    pub owner: ReadingOwner,
    pub reading: FinishedReading,
    pub created_at: DateTime<Utc>,
    pub is_favorite: bool,
}
