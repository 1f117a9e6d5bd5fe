use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::reading_engine::{
    catalog::{BuiltinCatalog, CardCatalog},
    config::EngineConfig,
    deck::Deck,
    error::ReadingResult,
    session::{NoDelay, PhaseHook, ReadingSession, SleepHook},
    spreads::{builtin_definitions, SpreadDefinition, SpreadTable},
};

/// Owns the validated deck and spread table and hands out sessions.
///
/// Everything that can be misconfigured is checked in the constructor, so a
/// bad custom spread or a catalog with duplicate ids fails at startup.
#[derive(Debug, Clone)]
pub struct ReadingEngine {
    config: EngineConfig,
    deck: Arc<Deck>,
    spreads: Arc<SpreadTable>,
    /// Sessions handed out so far; offsets the configured seed per session.
    sessions: Arc<AtomicU64>,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    }
}

impl ReadingEngine {
    /// Engine over the built-in 78-card deck.
    pub fn new(config: EngineConfig) -> ReadingResult<Self> {
        Self::with_catalog(config, &BuiltinCatalog)
    }

    pub fn with_catalog(config: EngineConfig, catalog: &dyn CardCatalog) -> ReadingResult<Self> {
        config.validate()?;
        let deck = Deck::new(catalog.fetch_cards()?)?;

        let mut definitions = builtin_definitions();
        definitions.extend(config.custom_definitions()?);
        let spreads = SpreadTable::new(definitions, deck.len())?;

        info!(
            cards = deck.len(),
            spreads = spreads.len(),
            reversal_probability = config.reversal_probability,
            "reading engine ready"
        );
        Ok(ReadingEngine {
            config,
            deck: Arc::new(deck),
            spreads: Arc::new(spreads),
            sessions: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Seed for the next configured session. With a fixed `rng_seed` the
    /// n-th session of an engine is reproducible but differs from the others.
    fn next_seed(&self) -> Option<u64> {
        let n = self.sessions.fetch_add(1, Ordering::Relaxed);
        self.config.rng_seed.map(|seed| seed.wrapping_add(n))
    }

    /// Idle session using the configured seed and presentation delays.
    pub fn new_session(&self) -> ReadingSession {
        let hook: Box<dyn PhaseHook> = if self.config.shuffle_delay_ms == 0 && self.config.draw_delay_ms == 0 {
            Box::new(NoDelay)
        } else {
            Box::new(SleepHook { shuffle: self.config.shuffle_delay(), draw: self.config.draw_delay() })
        };
        self.build_session(self.next_seed(), hook)
    }

    pub fn new_session_with_hook(&self, hook: impl PhaseHook + 'static) -> ReadingSession {
        self.build_session(self.next_seed(), Box::new(hook))
    }

    /// Idle session with an explicit seed, ignoring the configured one.
    pub fn new_seeded_session(&self, seed: u64) -> ReadingSession {
        self.build_session(Some(seed), Box::new(NoDelay))
    }

    fn build_session(&self, seed: Option<u64>, hook: Box<dyn PhaseHook>) -> ReadingSession {
        ReadingSession::new(
            Arc::clone(&self.spreads),
            Arc::clone(&self.deck),
            self.config.reversal_probability,
            make_rng(seed),
            hook,
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn spread_table(&self) -> &SpreadTable {
        &self.spreads
    }

    /// Spread definitions in picker order.
    pub fn spreads(&self) -> impl Iterator<Item = &SpreadDefinition> {
        self.spreads.iter()
    }
}
