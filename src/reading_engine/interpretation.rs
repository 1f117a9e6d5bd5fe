//! Templated interpretations of finished readings.
//!
//! An AI-backed interpreter is an external collaborator; it plugs in by
//! implementing [`Interpreter`] as well.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::reading_engine::{
    deck::Deck,
    error::{ReadingError, ReadingResult},
    models::{Arcana, Card, FinishedReading, Suit},
    spreads::SpreadTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextStyle {
    /// Plain sentences, meaning only.
    #[default]
    Simple,
    /// Adds keywords, arcana and element detail.
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPassage {
    pub position: usize,
    pub position_title: String,
    pub card_name: String,
    pub is_reversed: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub summary: String,
    pub passages: Vec<CardPassage>,
}

pub trait Interpreter {
    fn interpret(
        &self,
        reading: &FinishedReading,
        deck: &Deck,
        spreads: &SpreadTable,
    ) -> ReadingResult<Interpretation>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateInterpreter {
    pub style: TextStyle,
}

impl TemplateInterpreter {
    pub fn new(style: TextStyle) -> Self {
        TemplateInterpreter { style }
    }

    fn passage(&self, title: &str, card: &Card, is_reversed: bool) -> String {
        let orientation = if is_reversed { "reversed" } else { "upright" };
        match self.style {
            TextStyle::Simple => format!(
                "{title}: {} ({orientation}). {}",
                card.localized_name,
                card.meaning(is_reversed)
            ),
            TextStyle::Detailed => {
                let arcana = match card.suit {
                    Some(suit) => format!("minor arcana, {suit}, element of {}", suit.element()),
                    None => "major arcana".to_string(),
                };
                format!(
                    "{title}: {} ({orientation}; {arcana}). Keywords: {}. {}",
                    card.localized_name,
                    card.keywords(is_reversed).join(", "),
                    card.meaning(is_reversed)
                )
            }
        }
    }

    fn summary(&self, reading: &FinishedReading, cards: &[(&Card, bool)]) -> String {
        let total = cards.len();
        let majors = cards.iter().filter(|(c, _)| c.arcana() == Arcana::Major).count();
        let reversed = cards.iter().filter(|(_, r)| *r).count();

        let mut parts = Vec::new();
        if let Some(q) = reading.question.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            parts.push(format!("You asked: \"{q}\"."));
        }

        parts.push(if majors * 2 > total {
            "Major arcana dominate this spread: powerful forces are shaping the situation.".to_string()
        } else if majors == 0 {
            "No major arcana appear: the matter lies in everyday choices within your control.".to_string()
        } else {
            format!("{majors} of {total} cards are major arcana.")
        });

        if reversed * 2 > total {
            parts.push("Most cards are reversed, pointing to blocked or inward-turned energy.".to_string());
        } else if self.style == TextStyle::Detailed {
            parts.push(format!("{reversed} of {total} cards are reversed."));
        }

        if let Some(suit) = dominant_suit(cards) {
            parts.push(format!(
                "{suit} lead the spread, emphasising the element of {}.",
                suit.element()
            ));
        }
        parts.join(" ")
    }
}

/// Suit with a strict plurality of at least two cards.
fn dominant_suit(cards: &[(&Card, bool)]) -> Option<Suit> {
    let mut counts: HashMap<Suit, usize> = HashMap::new();
    for (card, _) in cards {
        if let Some(suit) = card.suit {
            *counts.entry(suit).or_default() += 1;
        }
    }
    let best = counts.values().copied().max()?;
    let mut leaders = Suit::ALL.into_iter().filter(|s| counts.get(s) == Some(&best));
    match (leaders.next(), leaders.next()) {
        (Some(suit), None) if best >= 2 => Some(suit),
        _ => None,
    }
}

impl Interpreter for TemplateInterpreter {
    fn interpret(
        &self,
        reading: &FinishedReading,
        deck: &Deck,
        spreads: &SpreadTable,
    ) -> ReadingResult<Interpretation> {
        let spread = spreads.get(&reading.reading_type)?;

        let cards = reading
            .cards
            .iter()
            .map(|rec| {
                deck.find(&rec.card_id)
                    .map(|card| (card, rec.is_reversed))
                    .ok_or_else(|| ReadingError::Catalog(format!("card '{}' is not in the deck", rec.card_id)))
            })
            .collect::<ReadingResult<Vec<_>>>()?;

        let passages = reading
            .cards
            .iter()
            .zip(cards.iter())
            .map(|(rec, &(card, is_reversed))| {
                let title = spread
                    .positions
                    .get(rec.position)
                    .filter(|p| p.id == rec.position_label)
                    .map(|p| p.title.as_str())
                    .unwrap_or(rec.position_label.as_str());
                CardPassage {
                    position: rec.position,
                    position_title: title.to_string(),
                    card_name: card.localized_name.clone(),
                    is_reversed,
                    text: self.passage(title, card, is_reversed),
                }
            })
            .collect();

        Ok(Interpretation { summary: self.summary(reading, &cards), passages })
    }
}
