//! Reading session state machine.
//!
//! ```text
//! idle --start--> shuffling --> drawing --> revealing --revealCard*--> complete
//!   ^                                           |                        |
//!   +------------------- reset -----------------+------------------------+
//! ```
//!
//! `start` runs shuffling and drawing synchronously; the intermediate phases
//! are only observable through a [`PhaseHook`], which is where a UI injects
//! its animation delays. Reveals are strictly sequential: `reveal_card(i)`
//! only succeeds when `i` equals the number of cards already revealed, so a
//! watcher always sees positions revealed in increasing order. Anything else
//! is ignored rather than treated as an error.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};
use uuid::{Builder, Uuid};

use crate::reading_engine::{
    deck::{bind_positions, Deck},
    error::{ReadingError, ReadingResult},
    models::{DrawnCard, FinishedReading, ReadingCardRecord, SessionState},
    spreads::{SpreadTable, SpreadType},
};

// ---------------------------------------------------------------------------
// Phase hook
// ---------------------------------------------------------------------------

/// Called as a session enters `Shuffling`, `Drawing` and `Revealing`.
pub trait PhaseHook {
    fn on_phase(&mut self, phase: SessionState);
}

impl<F: FnMut(SessionState)> PhaseHook for F {
    fn on_phase(&mut self, phase: SessionState) {
        self(phase)
    }
}

/// Runs every phase back to back.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl PhaseHook for NoDelay {
    fn on_phase(&mut self, _phase: SessionState) {}
}

/// Blocks the calling thread for a presentation delay while shuffling and drawing.
#[derive(Debug, Clone, Copy)]
pub struct SleepHook {
    pub shuffle: Duration,
    pub draw: Duration,
}

impl PhaseHook for SleepHook {
    fn on_phase(&mut self, phase: SessionState) {
        let delay = match phase {
            SessionState::Shuffling => self.shuffle,
            SessionState::Drawing   => self.draw,
            _ => Duration::ZERO,
        };
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Revealed { index: usize, completed: bool },
    /// Wrong state, out of order, or already revealed. Nothing changed.
    Ignored,
}

impl RevealOutcome {
    pub fn is_revealed(self) -> bool {
        matches!(self, RevealOutcome::Revealed { .. })
    }
}

/// Caller-owned reading aggregate. One per reading; drop or `reset` to discard.
pub struct ReadingSession {
    spreads: Arc<SpreadTable>,
    deck: Arc<Deck>,
    reversal_probability: f64,
    rng: StdRng,
    hook: Box<dyn PhaseHook>,

    state: SessionState,
    session_id: Option<Uuid>,
    spread_type: Option<SpreadType>,
    question: Option<String>,
    drawn_cards: Vec<DrawnCard>,
    revealed: Vec<bool>,
}

impl fmt::Debug for ReadingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadingSession")
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .field("spread_type", &self.spread_type)
            .field("question", &self.question)
            .field("drawn_cards", &self.drawn_cards)
            .field("revealed", &self.revealed)
            .finish_non_exhaustive()
    }
}

impl ReadingSession {
    pub(crate) fn new(
        spreads: Arc<SpreadTable>,
        deck: Arc<Deck>,
        reversal_probability: f64,
        rng: StdRng,
        hook: Box<dyn PhaseHook>,
    ) -> Self {
        ReadingSession {
            spreads,
            deck,
            reversal_probability,
            rng,
            hook,
            state: SessionState::Idle,
            session_id: None,
            spread_type: None,
            question: None,
            drawn_cards: Vec::new(),
            revealed: Vec::new(),
        }
    }

    /// Shuffle, draw and bind a spread, leaving the session in `Revealing`.
    ///
    /// Fails with `UnknownSpreadType` if the table has no such spread and with
    /// `InvalidTransition` unless the session is idle. On failure the session
    /// is back in `Idle` with nothing retained.
    pub fn start(&mut self, spread_type: SpreadType, question: Option<String>) -> ReadingResult<()> {
        if self.state != SessionState::Idle {
            return Err(ReadingError::InvalidTransition { operation: "start", state: self.state });
        }
        let result = self.run_start(spread_type, question);
        if result.is_err() {
            self.clear();
        }
        result
    }

    /// `start` with a kebab-case spread id such as `"celtic-cross"`.
    pub fn start_by_id(&mut self, spread_id: &str, question: Option<String>) -> ReadingResult<()> {
        self.start(spread_id.parse()?, question)
    }

    fn run_start(&mut self, spread_type: SpreadType, question: Option<String>) -> ReadingResult<()> {
        let spreads = Arc::clone(&self.spreads);
        let spread = spreads.get(&spread_type)?;

        let session_id = Builder::from_random_bytes(self.rng.gen()).into_uuid();
        self.session_id = Some(session_id);
        self.spread_type = Some(spread_type);
        self.question = question;

        self.enter(SessionState::Shuffling);
        let shuffled = self.deck.shuffle(&mut self.rng);

        self.enter(SessionState::Drawing);
        let draws = shuffled.draw(&mut self.rng, spread.card_count, self.reversal_probability)?;
        let drawn_cards = bind_positions(draws, spread)?;

        self.revealed = vec![false; drawn_cards.len()];
        self.drawn_cards = drawn_cards;
        self.enter(SessionState::Revealing);

        info!(
            %session_id,
            spread = %spread.spread_type,
            cards = self.drawn_cards.len(),
            "reading session started"
        );
        Ok(())
    }

    fn enter(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "session phase");
        self.state = next;
        self.hook.on_phase(next);
    }

    /// Reveal the card at `index` if it is the next one in line.
    pub fn reveal_card(&mut self, index: usize) -> RevealOutcome {
        if self.state != SessionState::Revealing {
            debug!(index, state = %self.state, "reveal ignored: not revealing");
            return RevealOutcome::Ignored;
        }
        let next = self.revealed_count();
        if index != next {
            debug!(index, next, "reveal ignored: out of order");
            return RevealOutcome::Ignored;
        }

        self.revealed[index] = true;
        let completed = self.revealed.iter().all(|&r| r);
        debug!(index, "card revealed");
        if completed {
            self.complete();
        }
        RevealOutcome::Revealed { index, completed }
    }

    /// Reveal everything still face down. Returns the newly revealed
    /// indices in increasing order; empty when there is nothing to reveal.
    pub fn reveal_all(&mut self) -> Vec<usize> {
        if self.state != SessionState::Revealing {
            return Vec::new();
        }
        let newly: Vec<usize> = self
            .revealed
            .iter()
            .enumerate()
            .filter(|&(_, &r)| !r)
            .map(|(i, _)| i)
            .collect();
        self.revealed.iter_mut().for_each(|r| *r = true);
        self.complete();
        newly
    }

    fn complete(&mut self) {
        self.state = SessionState::Complete;
        if let Some(id) = self.session_id {
            info!(session_id = %id, "reading session complete");
        }
    }

    /// Discard all session data and return to `Idle`. Always legal.
    pub fn reset(&mut self) {
        debug!(from = %self.state, "session reset");
        self.clear();
    }

    fn clear(&mut self) {
        self.state = SessionState::Idle;
        self.session_id = None;
        self.spread_type = None;
        self.question = None;
        self.drawn_cards.clear();
        self.revealed.clear();
    }

    /// Snapshot for the persistence collaborator. Only available once complete.
    pub fn finish(&self) -> ReadingResult<FinishedReading> {
        let not_complete = ReadingError::InvalidTransition { operation: "finish", state: self.state };
        if self.state != SessionState::Complete {
            return Err(not_complete);
        }
        let (Some(session_id), Some(reading_type)) = (self.session_id, self.spread_type.clone()) else {
            return Err(not_complete);
        };
        Ok(FinishedReading {
            session_id,
            reading_type,
            question: self.question.clone(),
            cards: self
                .drawn_cards
                .iter()
                .map(|dc| ReadingCardRecord {
                    card_id: dc.card().id.clone(),
                    position: dc.position(),
                    position_label: dc.position_label().id.clone(),
                    is_reversed: dc.is_reversed(),
                })
                .collect(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn spread_type(&self) -> Option<&SpreadType> {
        self.spread_type.as_ref()
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn drawn_cards(&self) -> &[DrawnCard] {
        &self.drawn_cards
    }

    pub fn revealed(&self) -> &[bool] {
        &self.revealed
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|&&r| r).count()
    }

    /// Index the next `reveal_card` call must use, if any card is still hidden.
    pub fn next_index(&self) -> Option<usize> {
        match self.state {
            SessionState::Revealing => Some(self.revealed_count()),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Cards revealed so far, in position order.
    pub fn visible_cards(&self) -> impl Iterator<Item = &DrawnCard> {
        self.drawn_cards
            .iter()
            .zip(self.revealed.iter())
            .filter(|&(_, &r)| r)
            .map(|(dc, _)| dc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading_engine::catalog::builtin_cards;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session_with(seed: u64, hook: Box<dyn PhaseHook>) -> ReadingSession {
        let deck = Deck::new(builtin_cards()).unwrap();
        let spreads = SpreadTable::builtin(deck.len()).unwrap();
        ReadingSession::new(Arc::new(spreads), Arc::new(deck), 0.5, StdRng::seed_from_u64(seed), hook)
    }

    fn session(seed: u64) -> ReadingSession {
        session_with(seed, Box::new(NoDelay))
    }

    fn started(spread: SpreadType) -> ReadingSession {
        let mut s = session(11);
        s.start(spread, None).unwrap();
        s
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let s = session(1);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.drawn_cards().is_empty());
        assert!(s.revealed().is_empty());
        assert_eq!(s.next_index(), None);
    }

    #[test]
    fn start_moves_through_phases_to_revealing() {
        let phases = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&phases);
        let mut s = session_with(1, Box::new(move |p: SessionState| seen.borrow_mut().push(p)));

        s.start(SpreadType::Love, Some("Does she miss me?".into())).unwrap();

        assert_eq!(
            *phases.borrow(),
            [SessionState::Shuffling, SessionState::Drawing, SessionState::Revealing]
        );
        assert_eq!(s.state(), SessionState::Revealing);
        assert_eq!(s.drawn_cards().len(), 5);
        assert_eq!(s.revealed(), [false; 5]);
        assert_eq!(s.question(), Some("Does she miss me?"));
        assert!(s.session_id().is_some());
    }

    #[test]
    fn question_is_kept_verbatim() {
        let mut s = session(1);
        s.start(SpreadType::SingleCard, Some("  what now?\n".into())).unwrap();
        assert_eq!(s.question(), Some("  what now?\n"));
    }

    #[test]
    fn unknown_spread_fails_and_stays_idle() {
        let mut s = session(1);
        let err = s.start(SpreadType::Custom("tea-leaves".into()), None).unwrap_err();
        assert_eq!(err, ReadingError::UnknownSpreadType("tea-leaves".into()));
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.spread_type().is_none());

        assert!(s.start_by_id("Celtic Cross!", None).is_err());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn start_requires_idle() {
        let mut s = started(SpreadType::ThreeCard);
        let err = s.start(SpreadType::ThreeCard, None).unwrap_err();
        assert_eq!(
            err,
            ReadingError::InvalidTransition { operation: "start", state: SessionState::Revealing }
        );
        assert_eq!(s.drawn_cards().len(), 3, "failed restart must not disturb the session");
    }

    #[test]
    fn drawn_cards_are_distinct_and_positioned() {
        let s = started(SpreadType::CelticCross);
        let ids: std::collections::HashSet<&str> =
            s.drawn_cards().iter().map(|dc| dc.card().id.as_str()).collect();
        assert_eq!(ids.len(), 10);
        for (i, dc) in s.drawn_cards().iter().enumerate() {
            assert_eq!(dc.position(), i);
        }
    }

    #[test]
    fn reveal_ahead_of_turn_is_a_no_op() {
        let mut s = started(SpreadType::Career);
        for i in 1..5 {
            assert_eq!(s.reveal_card(i), RevealOutcome::Ignored);
        }
        assert_eq!(s.revealed_count(), 0);
        assert_eq!(s.state(), SessionState::Revealing);
    }

    #[test]
    fn sequential_reveal_increments_by_one() {
        let mut s = started(SpreadType::Career);
        for i in 0..4 {
            assert_eq!(s.reveal_card(i), RevealOutcome::Revealed { index: i, completed: false });
            assert_eq!(s.revealed_count(), i + 1);
            assert_eq!(s.next_index(), Some(i + 1));
        }
        assert_eq!(s.reveal_card(4), RevealOutcome::Revealed { index: 4, completed: true });
        assert_eq!(s.state(), SessionState::Complete);
        assert_eq!(s.next_index(), None);
    }

    #[test]
    fn duplicate_reveal_is_ignored() {
        let mut s = started(SpreadType::ThreeCard);
        assert!(s.reveal_card(0).is_revealed());
        assert_eq!(s.reveal_card(0), RevealOutcome::Ignored);
        assert_eq!(s.revealed(), [true, false, false]);
    }

    #[test]
    fn reveal_in_idle_or_complete_is_ignored() {
        let mut s = session(1);
        assert_eq!(s.reveal_card(0), RevealOutcome::Ignored);
        assert!(s.reveal_all().is_empty());
        assert_eq!(s.state(), SessionState::Idle);

        let mut s = started(SpreadType::SingleCard);
        assert!(s.reveal_card(0).is_revealed());
        assert_eq!(s.reveal_card(0), RevealOutcome::Ignored);
        assert_eq!(s.reveal_card(1), RevealOutcome::Ignored);
    }

    #[test]
    fn reveal_all_completes_from_any_progress() {
        let mut s = started(SpreadType::DecisionMaking);
        s.reveal_card(0);
        s.reveal_card(1);
        assert_eq!(s.reveal_all(), vec![2, 3, 4]);
        assert_eq!(s.state(), SessionState::Complete);
        assert!(s.revealed().iter().all(|&r| r));

        assert!(s.reveal_all().is_empty(), "reveal_all is idempotent");
        assert_eq!(s.state(), SessionState::Complete);
    }

    #[test]
    fn visible_cards_track_reveals() {
        let mut s = started(SpreadType::ThreeCard);
        assert_eq!(s.visible_cards().count(), 0);
        s.reveal_card(0);
        let visible: Vec<usize> = s.visible_cards().map(|dc| dc.position()).collect();
        assert_eq!(visible, [0]);
    }

    #[test]
    fn finish_requires_completion() {
        let mut s = started(SpreadType::ThreeCard);
        assert!(matches!(s.finish(), Err(ReadingError::InvalidTransition { operation: "finish", .. })));
        s.reveal_all();
        let reading = s.finish().unwrap();
        assert_eq!(reading.reading_type, SpreadType::ThreeCard);
        assert_eq!(reading.cards.len(), 3);
        assert_eq!(Some(reading.session_id), s.session_id());
    }

    #[test]
    fn reset_clears_everything_from_any_state() {
        let mut idle = session(1);
        idle.reset();
        assert_eq!(idle.state(), SessionState::Idle);

        let mut revealing = started(SpreadType::Love);
        revealing.reveal_card(0);
        let mut complete = started(SpreadType::Love);
        complete.reveal_all();

        for mut s in [revealing, complete] {
            s.reset();
            assert_eq!(s.state(), SessionState::Idle);
            assert!(s.drawn_cards().is_empty());
            assert!(s.revealed().is_empty());
            assert!(s.spread_type().is_none());
            assert!(s.question().is_none());
            assert!(s.session_id().is_none());
            s.start(SpreadType::ThreeCard, None).unwrap();
            assert_eq!(s.revealed(), [false; 3]);
        }
    }

    #[test]
    fn same_seed_draws_same_reading() {
        let draw = |seed| {
            let mut s = session(seed);
            s.start(SpreadType::CelticCross, None).unwrap();
            s.reveal_all();
            s.finish().unwrap()
        };
        assert_eq!(draw(42), draw(42));
        assert_ne!(draw(42).cards, draw(43).cards);
    }

    #[test]
    fn sleep_hook_with_zero_delays_returns_immediately() {
        let mut hook = SleepHook { shuffle: Duration::ZERO, draw: Duration::ZERO };
        hook.on_phase(SessionState::Shuffling);
        hook.on_phase(SessionState::Drawing);
    }
}
