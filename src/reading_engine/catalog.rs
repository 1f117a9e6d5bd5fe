//! Card catalog collaborator.
//!
//! The engine only needs "a list of cards"; where they come from is the
//! caller's business. [`BuiltinCatalog`] is the canonical 78-card deck and
//! doubles as the local fallback when a remote catalog cannot be reached.

use tracing::warn;

use crate::reading_engine::{
    error::{ReadingError, ReadingResult},
    models::{Card, Suit},
};

pub const TAROT_DECK_SIZE: usize = 78;

/// Source of card records.
pub trait CardCatalog {
    fn fetch_cards(&self) -> ReadingResult<Vec<Card>>;
}

/// The canonical deck shipped with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl CardCatalog for BuiltinCatalog {
    fn fetch_cards(&self) -> ReadingResult<Vec<Card>> {
        Ok(builtin_cards())
    }
}

/// Catalog parsed from a JSON array of card records (camelCase keys).
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    cards: Vec<Card>,
}

impl JsonCatalog {
    pub fn from_json(json: &str) -> ReadingResult<Self> {
        let cards: Vec<Card> = serde_json::from_str(json)?;
        Ok(JsonCatalog { cards })
    }
}

impl CardCatalog for JsonCatalog {
    fn fetch_cards(&self) -> ReadingResult<Vec<Card>> {
        Ok(self.cards.clone())
    }
}

/// Serves the primary catalog, or the built-in deck if the primary fails or
/// comes back empty.
#[derive(Debug, Clone)]
pub struct FallbackCatalog<P> {
    primary: P,
}

impl<P: CardCatalog> FallbackCatalog<P> {
    pub fn new(primary: P) -> Self {
        FallbackCatalog { primary }
    }
}

impl<P: CardCatalog> CardCatalog for FallbackCatalog<P> {
    fn fetch_cards(&self) -> ReadingResult<Vec<Card>> {
        match self.primary.fetch_cards() {
            Ok(cards) if !cards.is_empty() => Ok(cards),
            Ok(_) => {
                warn!("card catalog returned no cards, using built-in deck");
                Ok(builtin_cards())
            }
            Err(err) => {
                warn!(error = %err, "card catalog unavailable, using built-in deck");
                Ok(builtin_cards())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in deck data
// ---------------------------------------------------------------------------

struct MajorEntry {
    name: &'static str,
    upright: [&'static str; 3],
    reversed: [&'static str; 3],
    upright_meaning: &'static str,
    reversed_meaning: &'static str,
}

const fn major(
    name: &'static str,
    upright: [&'static str; 3],
    reversed: [&'static str; 3],
    upright_meaning: &'static str,
    reversed_meaning: &'static str,
) -> MajorEntry {
    MajorEntry { name, upright, reversed, upright_meaning, reversed_meaning }
}

static MAJOR_ARCANA: [MajorEntry; 22] = [
    major("The Fool", ["beginnings", "innocence", "spontaneity"], ["recklessness", "hesitation", "naivety"],
        "A leap of faith into something new, taken with an open heart.",
        "Holding back out of fear, or rushing ahead without looking."),
    major("The Magician", ["manifestation", "skill", "willpower"], ["manipulation", "untapped talent", "trickery"],
        "You have every tool you need to make this happen.",
        "Talent is going unused, or someone is not being straight with you."),
    major("The High Priestess", ["intuition", "mystery", "inner voice"], ["secrets", "disconnection", "withdrawal"],
        "Trust what you sense beneath the surface.",
        "You are ignoring your intuition or something is being hidden."),
    major("The Empress", ["abundance", "nurturing", "creativity"], ["dependence", "smothering", "creative block"],
        "Growth, comfort and care flourish around you.",
        "Neglecting your own needs or holding on too tightly."),
    major("The Emperor", ["authority", "structure", "stability"], ["rigidity", "domination", "lack of discipline"],
        "Order and firm leadership bring security.",
        "Control has turned into stubbornness, or structure is missing."),
    major("The Hierophant", ["tradition", "guidance", "belief"], ["rebellion", "nonconformity", "restriction"],
        "Established wisdom and trusted mentors point the way.",
        "Conventions feel confining and you are ready to question them."),
    major("The Lovers", ["love", "harmony", "choice"], ["imbalance", "misalignment", "indecision"],
        "A meaningful union or a choice made from the heart.",
        "Values are out of step and a relationship needs honesty."),
    major("The Chariot", ["determination", "victory", "control"], ["scattered focus", "aggression", "stalling"],
        "Willpower carries you past obstacles.",
        "Momentum is lost to conflicting directions."),
    major("Strength", ["courage", "patience", "compassion"], ["self-doubt", "insecurity", "impatience"],
        "Gentle strength tames what force could not.",
        "Doubt is draining the confidence you already have."),
    major("The Hermit", ["reflection", "solitude", "wisdom"], ["isolation", "loneliness", "avoidance"],
        "Step back and look inward for the answer.",
        "Withdrawal has gone too far and is cutting you off."),
    major("Wheel of Fortune", ["cycles", "change", "destiny"], ["bad luck", "resistance", "stagnation"],
        "The wheel turns and a new chapter begins.",
        "Fighting change only prolongs a difficult turn."),
    major("Justice", ["fairness", "truth", "accountability"], ["injustice", "dishonesty", "avoidance"],
        "Actions meet their fair consequences.",
        "Something is unbalanced or responsibility is being dodged."),
    major("The Hanged Man", ["surrender", "pause", "new perspective"], ["delay", "resistance", "stalling"],
        "Letting go reveals a view you could not see before.",
        "Waiting has become an excuse not to act."),
    major("Death", ["endings", "transformation", "transition"], ["resisting change", "stagnation", "fear of endings"],
        "One door closes so another can open.",
        "Clinging to what is already over."),
    major("Temperance", ["balance", "moderation", "patience"], ["excess", "imbalance", "haste"],
        "Blend opposites slowly and find the middle way.",
        "Overindulgence or hurry is upsetting your balance."),
    major("The Devil", ["attachment", "temptation", "shadow"], ["release", "breaking free", "awareness"],
        "Habits or desires are holding you captive.",
        "You are starting to see the chains and slip out of them."),
    major("The Tower", ["upheaval", "revelation", "sudden change"], ["averted disaster", "fear of change", "delayed collapse"],
        "A sudden shake-up clears away false foundations.",
        "Disaster is postponed, not avoided, until you face it."),
    major("The Star", ["hope", "renewal", "inspiration"], ["despair", "discouragement", "lost faith"],
        "Healing and quiet hope after the storm.",
        "You have lost sight of what keeps you going."),
    major("The Moon", ["illusion", "dreams", "uncertainty"], ["clarity", "released fear", "truth revealed"],
        "Not everything is as it seems, so move carefully.",
        "Confusion lifts and hidden things come to light."),
    major("The Sun", ["joy", "success", "vitality"], ["dimmed joy", "overconfidence", "delay"],
        "Warmth, success and simple happiness.",
        "The light is still there, only clouded for a while."),
    major("Judgement", ["awakening", "reckoning", "renewal"], ["self-doubt", "harsh judgement", "ignoring the call"],
        "A moment of reckoning and rebirth.",
        "Fear of judgement keeps you from answering your calling."),
    major("The World", ["completion", "fulfilment", "wholeness"], ["incompletion", "loose ends", "shortcuts"],
        "A cycle closes in accomplishment.",
        "Something remains unfinished before you can move on."),
];

struct RankEntry {
    name: &'static str,
    upright: &'static str,
    reversed: &'static str,
    upright_meaning: &'static str,
    reversed_meaning: &'static str,
}

static RANKS: [RankEntry; 14] = [
    RankEntry { name: "Ace", upright: "new potential", reversed: "missed opportunity",
        upright_meaning: "A fresh opening appears", reversed_meaning: "A promising start is blocked or delayed" },
    RankEntry { name: "Two", upright: "partnership", reversed: "imbalance",
        upright_meaning: "Two forces come into balance", reversed_meaning: "A partnership or choice falls out of balance" },
    RankEntry { name: "Three", upright: "growth", reversed: "setback",
        upright_meaning: "Early efforts begin to bear fruit", reversed_meaning: "Growth stalls through poor cooperation" },
    RankEntry { name: "Four", upright: "stability", reversed: "restlessness",
        upright_meaning: "A stable base is established", reversed_meaning: "Stability turns into stagnation" },
    RankEntry { name: "Five", upright: "conflict", reversed: "recovery",
        upright_meaning: "Friction and loss test you", reversed_meaning: "The worst of a struggle is passing" },
    RankEntry { name: "Six", upright: "harmony", reversed: "nostalgia",
        upright_meaning: "Generosity and progress return", reversed_meaning: "Dwelling on the past slows progress" },
    RankEntry { name: "Seven", upright: "assessment", reversed: "doubt",
        upright_meaning: "You stand your ground and weigh your options", reversed_meaning: "Doubt or deception clouds judgement" },
    RankEntry { name: "Eight", upright: "movement", reversed: "stagnation",
        upright_meaning: "Things move quickly through effort", reversed_meaning: "Energy is scattered or stuck" },
    RankEntry { name: "Nine", upright: "fruition", reversed: "anxiety",
        upright_meaning: "Near the goal, resilience pays off", reversed_meaning: "Worry overshadows what you have achieved" },
    RankEntry { name: "Ten", upright: "completion", reversed: "burden",
        upright_meaning: "A cycle reaches its peak", reversed_meaning: "The weight of the cycle becomes too much" },
    RankEntry { name: "Page", upright: "curiosity", reversed: "immaturity",
        upright_meaning: "A message or eager new beginning arrives", reversed_meaning: "Enthusiasm lacks follow-through" },
    RankEntry { name: "Knight", upright: "action", reversed: "impulsiveness",
        upright_meaning: "Bold pursuit of a goal", reversed_meaning: "Action without direction" },
    RankEntry { name: "Queen", upright: "nurturing mastery", reversed: "insecurity",
        upright_meaning: "Mature, caring command of the situation", reversed_meaning: "Self-doubt undermines inner authority" },
    RankEntry { name: "King", upright: "leadership", reversed: "control",
        upright_meaning: "Confident, responsible leadership", reversed_meaning: "Authority is misused or absent" },
];

fn suit_domain(suit: Suit) -> (&'static str, &'static str) {
    match suit {
        Suit::Wands     => ("passion", "ambition, creativity and drive"),
        Suit::Cups      => ("emotion", "love, feelings and relationships"),
        Suit::Swords    => ("intellect", "thoughts, words and conflict"),
        Suit::Pentacles => ("material", "money, work and the body"),
    }
}

fn slug(name: &str) -> String {
    name.to_ascii_lowercase().replace(' ', "-")
}

fn card_image(id: &str) -> String {
    format!("/cards/{id}.jpg")
}

/// The full 78-card deck: major arcana 0..=21, then each suit Ace..King.
pub fn builtin_cards() -> Vec<Card> {
    let majors = MAJOR_ARCANA.iter().enumerate().map(|(n, m)| {
        let id = slug(m.name);
        Card {
            image: card_image(&id),
            id,
            name: m.name.to_string(),
            localized_name: m.name.to_string(),
            suit: None,
            number: n as u8,
            upright_keywords: m.upright.iter().map(|k| k.to_string()).collect(),
            reversed_keywords: m.reversed.iter().map(|k| k.to_string()).collect(),
            upright_meaning: m.upright_meaning.to_string(),
            reversed_meaning: m.reversed_meaning.to_string(),
        }
    });

    let minors = Suit::ALL.into_iter().flat_map(|suit| {
        let (keyword, domain) = suit_domain(suit);
        RANKS.iter().enumerate().map(move |(i, rank)| {
            let name = format!("{} of {}", rank.name, suit);
            let id = slug(&name);
            Card {
                image: card_image(&id),
                id,
                localized_name: name.clone(),
                name,
                suit: Some(suit),
                number: (i + 1) as u8,
                upright_keywords: vec![rank.upright.to_string(), keyword.to_string()],
                reversed_keywords: vec![rank.reversed.to_string(), keyword.to_string()],
                upright_meaning: format!("{} in matters of {domain}.", rank.upright_meaning),
                reversed_meaning: format!("{} in matters of {domain}.", rank.reversed_meaning),
            }
        })
    });

    majors.chain(minors).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading_engine::models::Arcana;
    use std::collections::HashSet;

    struct Unreachable;

    impl CardCatalog for Unreachable {
        fn fetch_cards(&self) -> ReadingResult<Vec<Card>> {
            Err(ReadingError::Catalog("connection refused".into()))
        }
    }

    #[test]
    fn builtin_deck_has_78_unique_cards() {
        let cards = builtin_cards();
        assert_eq!(cards.len(), TAROT_DECK_SIZE);
        let ids: HashSet<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), TAROT_DECK_SIZE);
    }

    #[test]
    fn builtin_deck_has_22_majors_and_14_per_suit() {
        let cards = builtin_cards();
        assert_eq!(cards.iter().filter(|c| c.arcana() == Arcana::Major).count(), 22);
        for suit in Suit::ALL {
            let numbers: Vec<u8> = cards.iter().filter(|c| c.suit == Some(suit)).map(|c| c.number).collect();
            assert_eq!(numbers, (1..=14).collect::<Vec<u8>>(), "{suit}");
        }
    }

    #[test]
    fn builtin_cards_are_fully_described() {
        for card in builtin_cards() {
            assert!(!card.name.is_empty());
            assert!(!card.localized_name.is_empty());
            assert!(card.image.ends_with(".jpg"), "{}", card.id);
            assert!(!card.upright_keywords.is_empty(), "{}", card.id);
            assert!(!card.reversed_keywords.is_empty(), "{}", card.id);
            assert!(!card.upright_meaning.is_empty());
            assert!(!card.reversed_meaning.is_empty());
        }
        let cards = builtin_cards();
        assert_eq!(cards[0].id, "the-fool");
        assert_eq!(cards[22].id, "ace-of-wands");
        assert_eq!(cards[77].id, "king-of-pentacles");
    }

    #[test]
    fn json_catalog_parses_camel_case_records() {
        let json = r#"[{
            "id": "the-fool", "name": "The Fool", "localizedName": "Le Mat",
            "image": "/img/fool.png", "suit": null, "number": 0,
            "uprightKeywords": ["beginnings"], "reversedKeywords": ["recklessness"],
            "uprightMeaning": "Leap.", "reversedMeaning": "Look first."
        }, {
            "id": "two-of-cups", "name": "Two of Cups", "localizedName": "Deux de Coupes",
            "image": "/img/2c.png", "suit": "cups", "number": 2,
            "uprightMeaning": "Union.", "reversedMeaning": "Rift."
        }]"#;
        let cards = JsonCatalog::from_json(json).unwrap().fetch_cards().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].localized_name, "Le Mat");
        assert_eq!(cards[1].suit, Some(Suit::Cups));
        assert!(cards[1].upright_keywords.is_empty());
    }

    #[test]
    fn malformed_json_is_a_catalog_error() {
        let err = JsonCatalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ReadingError::Catalog(_)));
    }

    #[test]
    fn fallback_serves_builtin_deck_when_primary_fails() {
        let cards = FallbackCatalog::new(Unreachable).fetch_cards().unwrap();
        assert_eq!(cards.len(), TAROT_DECK_SIZE);

        let empty = JsonCatalog::from_json("[]").unwrap();
        assert_eq!(FallbackCatalog::new(empty).fetch_cards().unwrap().len(), TAROT_DECK_SIZE);
    }

    #[test]
    fn fallback_prefers_primary_when_available() {
        let primary = JsonCatalog { cards: builtin_cards().into_iter().take(3).collect() };
        assert_eq!(FallbackCatalog::new(primary).fetch_cards().unwrap().len(), 3);
    }
}
