//! Core reading engine — deck handling, spreads, and the reading session.
//!
//! ## Module overview
//!
//! | Module           | Purpose |
//! |------------------|---------|
//! | `models`         | Shared types: cards, position labels, drawn cards, finished/saved readings |
//! | `catalog`        | Card catalog collaborator, built-in 78-card deck, fallback policy |
//! | `deck`           | Duplicate-free deck with Fisher-Yates shuffle, draw and position binding |
//! | `spreads`        | Spread types and the validated spread table |
//! | `session`        | Reading session state machine and phase hooks |
//! | `engine`         | `ReadingEngine` — validated setup, hands out sessions |
//! | `interpretation` | Templated interpretations of finished readings |
//! | `store`          | Persistence collaborator and an in-memory store |
//! | `config`         | TOML + environment configuration |
//! | `error`          | `ReadingError` |

pub mod catalog;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod interpretation;
pub mod models;
pub mod session;
pub mod spreads;
pub mod store;

// Re-export the public API surface so callers can use
// `reading_engine::ReadingEngine` without reaching into sub-modules.
pub use catalog::{BuiltinCatalog, CardCatalog, FallbackCatalog, JsonCatalog, TAROT_DECK_SIZE};
pub use config::{CustomSpreadConfig, EngineConfig};
pub use deck::{bind_positions, Deck, DEFAULT_REVERSAL_PROBABILITY};
pub use engine::ReadingEngine;
pub use error::{ReadingError, ReadingResult};
pub use interpretation::{CardPassage, Interpretation, Interpreter, TemplateInterpreter, TextStyle};
pub use models::{
    Arcana, Card, Draw, DrawnCard, FinishedReading, PositionLabel, ReadingCardRecord,
    ReadingOwner, SavedReading, SavedReadingId, SessionState, Suit,
};
pub use session::{NoDelay, PhaseHook, ReadingSession, RevealOutcome, SleepHook};
pub use spreads::{SpreadDefinition, SpreadTable, SpreadType};
pub use store::{InMemoryReadingStore, ReadingStore};
