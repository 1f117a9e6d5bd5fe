//! Walk through a full reading in the terminal.
//!
//! Run with: `cargo run --example reading`
//!
//! 1. **Three-card reading**: the cards are revealed one tap at a time,
//!    including an out-of-turn tap that the session ignores.
//! 2. **Celtic cross**: skips straight to the result with `reveal_all`, then
//!    prints a detailed templated interpretation.
//! 3. **History**: both readings are saved to an in-memory store and printed
//!    as the rows a Postgres backend would receive.
//!
//! Set `RUST_LOG=debug` to watch the session phases, and `TAROT_RNG_SEED`
//! to make the draw reproducible.

use tarot_reading_engine::{
    to_card_rows, to_reading_row, EngineConfig, InMemoryReadingStore, Interpreter,
    ReadingEngine, ReadingOwner, ReadingResult, ReadingStore, RevealOutcome, SpreadType,
    TemplateInterpreter, TextStyle,
};
use tracing_subscriber::EnvFilter;

fn rule() {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

fn main() -> ReadingResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::default().with_env_overrides()?;
    let engine = ReadingEngine::new(config)?;
    let store = InMemoryReadingStore::new();
    let owner = ReadingOwner::Anonymous("demo".into());

    println!("Available spreads:");
    for def in engine.spreads() {
        println!("  [{}] {:<20} {} cards  {}", def.icon, def.name, def.card_count, def.description);
    }

    // ── 1. three cards, tap by tap ──────────────────────────────────────────
    rule();
    let mut session = engine.new_session();
    session.start(SpreadType::ThreeCard, Some("Will I get the job?".into()))?;
    println!("  Q: {}", session.question().unwrap_or_default());

    for index in [0, 2, 1, 2] {
        match session.reveal_card(index) {
            RevealOutcome::Revealed { index, completed } => {
                let card = &session.drawn_cards()[index];
                println!("  tap {index}: {card}{}", if completed { "  (complete)" } else { "" });
            }
            RevealOutcome::Ignored => println!("  tap {index}: ignored, not this card's turn"),
        }
    }
    let three = session.finish()?;
    let simple = TemplateInterpreter::new(TextStyle::Simple).interpret(&three, engine.deck(), engine.spread_table())?;
    println!();
    for passage in &simple.passages {
        println!("  {}", passage.text);
    }
    println!("  {}", simple.summary);
    store.save(&owner, &three)?;

    // ── 2. celtic cross, skip to results ────────────────────────────────────
    rule();
    session.reset();
    session.start(SpreadType::CelticCross, None)?;
    let newly = session.reveal_all();
    println!("  revealed all at once: {newly:?}");
    let cross = session.finish()?;
    let detailed = TemplateInterpreter::new(TextStyle::Detailed).interpret(&cross, engine.deck(), engine.spread_table())?;
    for passage in &detailed.passages {
        println!("  {}", passage.text);
    }
    println!();
    println!("  {}", detailed.summary);
    store.save(&owner, &cross)?;

    // ── 3. history rows ─────────────────────────────────────────────────────
    rule();
    for saved in store.list_for_owner(&owner)? {
        println!("  {}", to_reading_row(&saved));
        for row in to_card_rows(&saved) {
            println!("    {row}");
        }
    }
    Ok(())
}
