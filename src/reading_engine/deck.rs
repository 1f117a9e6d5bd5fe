use std::collections::HashSet;

use rand::seq::index;
use rand::Rng;

use crate::reading_engine::{
    error::{ReadingError, ReadingResult},
    models::{Card, Draw, DrawnCard},
    spreads::SpreadDefinition,
};

/// Orientation probability used when none is configured.
pub const DEFAULT_REVERSAL_PROBABILITY: f64 = 0.5;

/// An ordered, duplicate-free sequence of cards.
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Assemble a deck, rejecting repeated card identifiers.
    pub fn new(cards: Vec<Card>) -> ReadingResult<Self> {
        if cards.is_empty() {
            return Err(ReadingError::EmptyCatalog);
        }
        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if !seen.insert(card.id.as_str()) {
                return Err(ReadingError::DuplicateCard(card.id.clone()));
            }
        }
        Ok(Deck { cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn find(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    /// Return a shuffled copy; `self` is left untouched.
    pub fn shuffle<R: Rng>(&self, rng: &mut R) -> Deck {
        let mut cards = self.cards.clone();

        // Fisher-Yates shuffle
        for i in (1..cards.len()).rev() {
            let j = rng.gen_range(0..=i);
            cards.swap(i, j);
        }

        Deck { cards }
    }

    /// Pick `count` distinct cards without replacement, each with an
    /// independent orientation (reversed with `reversal_probability`).
    pub fn draw<R: Rng>(
        &self,
        rng: &mut R,
        count: usize,
        reversal_probability: f64,
    ) -> ReadingResult<Vec<Draw>> {
        if count > self.cards.len() {
            return Err(ReadingError::InvalidSpreadSize {
                requested: count,
                available: self.cards.len(),
            });
        }
        if !(0.0..=1.0).contains(&reversal_probability) {
            return Err(ReadingError::Config(format!(
                "reversal probability {reversal_probability} is outside 0..=1"
            )));
        }

        let picks = index::sample(rng, self.cards.len(), count);
        Ok(picks
            .into_iter()
            .map(|i| Draw {
                card: self.cards[i].clone(),
                is_reversed: rng.gen_bool(reversal_probability),
            })
            .collect())
    }
}

/// Attach spread positions to draws, in draw order.
pub fn bind_positions(drawn: Vec<Draw>, spread: &SpreadDefinition) -> ReadingResult<Vec<DrawnCard>> {
    if drawn.len() != spread.positions.len() {
        return Err(ReadingError::SpreadMismatch {
            spread: spread.spread_type.id().to_string(),
            labels: spread.positions.len(),
            cards: drawn.len(),
        });
    }
    Ok(drawn
        .into_iter()
        .zip(spread.positions.iter())
        .enumerate()
        .map(|(i, (draw, label))| DrawnCard::new(draw, i, label.clone()))
        .collect())
}
