//! Scenario tests for the `tarot_reading_engine` crate.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Scenarios | Three-card reading with out-of-order taps; Celtic cross skip-to-results |
//! | Spreads | Every built-in spread draws its card count, bound to its labels in order |
//! | Completion | `complete` exactly on the last sequential reveal |
//! | Lifecycle | Reset from every state; a reset session starts cleanly |
//! | Hand-off | Finish → interpret → save → persistence rows |
//! | Fallback | Unreachable catalog still yields a working engine |

use std::collections::HashSet;

use crate::payload::{to_card_rows, to_reading_row};
use crate::reading_engine::{
    CardCatalog, EngineConfig, FallbackCatalog, InMemoryReadingStore, Interpreter,
    ReadingEngine, ReadingError, ReadingOwner, ReadingResult, ReadingStore, RevealOutcome,
    SessionState, SpreadType, TemplateInterpreter, TextStyle,
};

// ── helpers ──────────────────────────────────────────────────────────────────

fn engine() -> ReadingEngine {
    ReadingEngine::new(EngineConfig::default()).unwrap()
}

const SEEDS: [u64; 5] = [1, 42, 999, 0xDEAD_BEEF, 7];

// ── scenarios ────────────────────────────────────────────────────────────────

#[test]
fn three_card_reading_end_to_end() {
    let engine = engine();
    let mut session = engine.new_seeded_session(2026);

    session.start(SpreadType::ThreeCard, Some("Will I get the job?".into())).unwrap();
    assert_eq!(session.state(), SessionState::Revealing);

    let cards = session.drawn_cards();
    assert_eq!(cards.len(), 3);
    let ids: HashSet<&str> = cards.iter().map(|dc| dc.card().id.as_str()).collect();
    assert_eq!(ids.len(), 3, "cards must be distinct");
    let labels: Vec<&str> = cards.iter().map(|dc| dc.position_label().id.as_str()).collect();
    assert_eq!(labels, ["past", "present", "future"]);

    assert_eq!(session.reveal_card(0), RevealOutcome::Revealed { index: 0, completed: false });
    assert_eq!(session.state(), SessionState::Revealing);

    assert_eq!(session.reveal_card(2), RevealOutcome::Ignored);
    assert_eq!(session.revealed(), [true, false, false]);

    assert!(session.reveal_card(1).is_revealed());
    assert_eq!(session.reveal_card(2), RevealOutcome::Revealed { index: 2, completed: true });
    assert_eq!(session.state(), SessionState::Complete);

    let reading = session.finish().unwrap();
    assert_eq!(reading.question.as_deref(), Some("Will I get the job?"));
    let tuples: Vec<(usize, &str)> =
        reading.cards.iter().map(|c| (c.position, c.position_label.as_str())).collect();
    assert_eq!(tuples, [(0, "past"), (1, "present"), (2, "future")]);
}

#[test]
fn celtic_cross_reveal_all() {
    let engine = engine();
    let mut session = engine.new_seeded_session(10);
    session.start_by_id("celtic-cross", None).unwrap();

    let labels: Vec<&str> =
        session.drawn_cards().iter().map(|dc| dc.position_label().id.as_str()).collect();
    assert_eq!(
        labels,
        [
            "present", "challenge", "foundation", "recent-past", "crown",
            "near-future", "self", "environment", "hopes-fears", "outcome",
        ]
    );

    assert_eq!(session.reveal_all(), (0..10).collect::<Vec<_>>());
    assert_eq!(session.state(), SessionState::Complete);
    assert_eq!(session.revealed(), [true; 10]);
}

// ── spreads ──────────────────────────────────────────────────────────────────

#[test]
fn every_builtin_spread_draws_its_card_count() {
    let engine = engine();
    for spread in SpreadType::BUILTIN {
        let def = engine.spread_table().get(&spread).unwrap().clone();
        for seed in SEEDS {
            let mut session = engine.new_seeded_session(seed);
            session.start(spread.clone(), None).unwrap();
            let drawn = session.drawn_cards();
            assert_eq!(drawn.len(), def.card_count, "{spread} seed={seed}");
            for (i, (dc, label)) in drawn.iter().zip(def.positions.iter()).enumerate() {
                assert_eq!(dc.position(), i, "{spread} seed={seed}");
                assert_eq!(dc.position_label(), label, "{spread} seed={seed}");
            }
            let unique: HashSet<&str> = drawn.iter().map(|dc| dc.card().id.as_str()).collect();
            assert_eq!(unique.len(), def.card_count, "duplicate card in {spread} seed={seed}");
        }
    }
}

#[test]
fn unknown_spread_id_is_rejected() {
    let engine = engine();
    let mut session = engine.new_session();
    let err = session.start_by_id("tea-leaves", None).unwrap_err();
    assert_eq!(err, ReadingError::UnknownSpreadType("tea-leaves".into()));
    assert!(err.is_configuration());
    assert_eq!(session.state(), SessionState::Idle);
}

// ── completion ───────────────────────────────────────────────────────────────

#[test]
fn completes_exactly_on_last_sequential_reveal() {
    let engine = engine();
    for spread in SpreadType::BUILTIN {
        let mut session = engine.new_seeded_session(3);
        session.start(spread.clone(), None).unwrap();
        let n = session.drawn_cards().len();
        for i in 0..n {
            assert_eq!(session.state(), SessionState::Revealing, "{spread} before reveal {i}");
            let outcome = session.reveal_card(i);
            assert_eq!(outcome, RevealOutcome::Revealed { index: i, completed: i + 1 == n });
        }
        assert!(session.is_complete(), "{spread}");
    }
}

#[test]
fn reveal_all_completes_regardless_of_progress() {
    let engine = engine();
    for already in 0..5 {
        let mut session = engine.new_seeded_session(already as u64);
        session.start(SpreadType::Love, None).unwrap();
        for i in 0..already {
            session.reveal_card(i);
        }
        let newly = session.reveal_all();
        assert_eq!(newly, (already..5).collect::<Vec<_>>());
        assert!(session.is_complete());
    }
}

// ── lifecycle ────────────────────────────────────────────────────────────────

#[test]
fn reset_then_restart_draws_a_fresh_reading() {
    let engine = engine();
    let mut session = engine.new_seeded_session(8);
    session.start(SpreadType::ThreeCard, Some("first".into())).unwrap();
    session.reveal_all();
    let first = session.finish().unwrap();

    session.reset();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.drawn_cards().is_empty());
    assert!(session.revealed().is_empty());
    assert!(session.finish().is_err());

    session.start(SpreadType::ThreeCard, Some("second".into())).unwrap();
    assert_eq!(session.revealed(), [false; 3]);
    session.reveal_all();
    let second = session.finish().unwrap();
    assert_ne!(first.session_id, second.session_id);
    assert_eq!(second.question.as_deref(), Some("second"));
}

// ── hand-off ─────────────────────────────────────────────────────────────────

#[test]
fn finished_reading_is_interpreted_saved_and_mapped_to_rows() {
    let engine = engine();
    let mut session = engine.new_seeded_session(77);
    session.start(SpreadType::ElementalBalance, Some("Where is my energy?".into())).unwrap();
    session.reveal_all();
    let reading = session.finish().unwrap();

    let interpretation = TemplateInterpreter::new(TextStyle::Detailed)
        .interpret(&reading, engine.deck(), engine.spread_table())
        .unwrap();
    let titles: Vec<&str> =
        interpretation.passages.iter().map(|p| p.position_title.as_str()).collect();
    assert_eq!(titles, ["Fire", "Water", "Air", "Earth"]);
    assert!(interpretation.summary.contains("Where is my energy?"));

    let store = InMemoryReadingStore::new();
    let owner = ReadingOwner::Anonymous("device-1".into());
    let id = store.save(&owner, &reading).unwrap();
    assert_eq!(store.save(&owner, &reading).unwrap(), id);

    let saved = store.get(id).unwrap().unwrap();
    assert_eq!(to_reading_row(&saved)["reading_type"], "elemental-balance");
    let rows = to_card_rows(&saved);
    assert_eq!(rows.len(), 4);
    for (row, card) in rows.iter().zip(reading.cards.iter()) {
        assert_eq!(row["card_id"], card.card_id.as_str());
        assert_eq!(row["is_reversed"], card.is_reversed);
    }
}

#[test]
fn seeded_engine_readings_are_saved_separately() {
    let config = EngineConfig { rng_seed: Some(5), ..EngineConfig::default() };
    let engine = ReadingEngine::new(config).unwrap();
    let owner = ReadingOwner::User("alice".into());
    let store = InMemoryReadingStore::new();

    let mut job = engine.new_session();
    job.start(SpreadType::ThreeCard, Some("Will I get the job?".into())).unwrap();
    job.reveal_all();
    let job = job.finish().unwrap();

    let mut love = engine.new_session();
    love.start(SpreadType::CelticCross, Some("Love?".into())).unwrap();
    love.reveal_all();
    let love = love.finish().unwrap();

    assert_ne!(job.session_id, love.session_id);
    let job_id = store.save(&owner, &job).unwrap();
    let love_id = store.save(&owner, &love).unwrap();
    assert_ne!(job_id, love_id);

    let listed = store.list_for_owner(&owner).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].reading.reading_type, SpreadType::CelticCross);
    assert_eq!(listed[0].reading.question.as_deref(), Some("Love?"));
    assert_eq!(listed[1].reading, job);
}

#[test]
fn finished_reading_serializes_with_camel_case_keys() {
    let engine = engine();
    let mut session = engine.new_seeded_session(1);
    session.start(SpreadType::SingleCard, None).unwrap();
    session.reveal_card(0);
    let json = serde_json::to_value(session.finish().unwrap()).unwrap();
    assert_eq!(json["readingType"], "single-card");
    assert!(json["question"].is_null());
    assert_eq!(json["cards"][0]["positionLabel"], "guidance");
    assert_eq!(json["cards"][0]["position"], 0);
    assert!(json["cards"][0]["cardId"].is_string());
    assert!(json["cards"][0]["isReversed"].is_boolean());
}

// ── fallback ─────────────────────────────────────────────────────────────────

struct Offline;

impl CardCatalog for Offline {
    fn fetch_cards(&self) -> ReadingResult<Vec<crate::Card>> {
        Err(ReadingError::Catalog("timeout".into()))
    }
}

#[test]
fn offline_catalog_fails_fast_but_fallback_recovers() {
    let err = ReadingEngine::with_catalog(EngineConfig::default(), &Offline).unwrap_err();
    assert!(matches!(err, ReadingError::Catalog(_)));

    let engine =
        ReadingEngine::with_catalog(EngineConfig::default(), &FallbackCatalog::new(Offline)).unwrap();
    assert_eq!(engine.deck().len(), 78);
}
