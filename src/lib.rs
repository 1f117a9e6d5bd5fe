//! # tarot_reading_engine
//!
//! The deck, draw and reveal engine behind a tarot reading app.
//!
//! A reading moves through a small state machine: the engine shuffles the
//! deck, draws the cards a spread needs without replacement, gives each one
//! an independent upright/reversed orientation, binds it to the spread's
//! position labels, and then lets the caller reveal the cards one at a time.
//! Once every card is face up the session yields a [`FinishedReading`] that
//! the caller hands to its persistence layer.
//!
//! ## How it works
//!
//! 1. Build a [`ReadingEngine`] from an [`EngineConfig`]. This validates the
//!    deck (no duplicate ids) and the spread table (label count matches card
//!    count) once, up front.
//! 2. Call [`ReadingEngine::new_session`] and `start` it with a [`SpreadType`]
//!    and an optional question.
//! 3. Reveal cards with `reveal_card(index)`. Reveals are strictly
//!    sequential; an out-of-turn or repeated index is ignored. `reveal_all`
//!    skips straight to the result.
//! 4. Call `finish` for the snapshot, optionally interpret it with a
//!    [`TemplateInterpreter`], and save it through a [`ReadingStore`].
//!
//! ## Quick start
//!
//! ```rust
//! use tarot_reading_engine::{EngineConfig, ReadingEngine, SessionState, SpreadType};
//!
//! let engine = ReadingEngine::new(EngineConfig::default()).unwrap();
//! let mut session = engine.new_seeded_session(42);
//!
//! session.start(SpreadType::ThreeCard, Some("Will I get the job?".into())).unwrap();
//! assert_eq!(session.drawn_cards().len(), 3);
//!
//! for i in 0..3 {
//!     session.reveal_card(i);
//! }
//! assert_eq!(session.state(), SessionState::Complete);
//!
//! let reading = session.finish().unwrap();
//! for card in &reading.cards {
//!     println!("{} {} reversed={}", card.position_label, card.card_id, card.is_reversed);
//! }
//! ```

pub mod payload;
pub mod reading_engine;

// Convenience re-exports so callers can use `tarot_reading_engine::ReadingEngine`
// directly without reaching into `reading_engine::`.
pub use payload::{to_card_rows, to_reading_row};
pub use reading_engine::{
    BuiltinCatalog, Card, CardCatalog, DrawnCard, EngineConfig, FallbackCatalog,
    FinishedReading, InMemoryReadingStore, Interpretation, Interpreter, JsonCatalog,
    PhaseHook, PositionLabel, ReadingCardRecord, ReadingEngine, ReadingError, ReadingOwner,
    ReadingResult, ReadingSession, ReadingStore, RevealOutcome, SavedReading, SessionState,
    SpreadDefinition, SpreadType, Suit, TemplateInterpreter, TextStyle,
};

#[cfg(test)]
mod tests;
