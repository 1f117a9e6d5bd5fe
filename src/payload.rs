use serde_json::{json, Value};

use crate::reading_engine::models::{ReadingOwner, SavedReading};

/// Split an owner into the `(user_id, anonymous_id)` column pair; exactly one is set.
fn owner_columns(owner: &ReadingOwner) -> (Value, Value) {
    match owner {
        ReadingOwner::User(id)      => (json!(id), Value::Null),
        ReadingOwner::Anonymous(id) => (Value::Null, json!(id)),
    }
}

/// Build the `readings` table row for a saved reading.
pub fn to_reading_row(saved: &SavedReading) -> Value {
    let (user_id, anonymous_id) = owner_columns(&saved.owner);
    json!({
        "id":           saved.id.to_string(),
        "user_id":      user_id,
        "anonymous_id": anonymous_id,
        "session_id":   saved.reading.session_id.to_string(),
        "reading_type": saved.reading.reading_type.id(),
        "question":     saved.reading.question,
        "is_favorite":  saved.is_favorite,
        "card_count":   saved.reading.cards.len(),
        "created_at":   saved.created_at.to_rfc3339(),
    })
}

/// Build one `reading_cards` row per card, in position order.
pub fn to_card_rows(saved: &SavedReading) -> Vec<Value> {
    let mut cards: Vec<_> = saved.reading.cards.iter().collect();
    cards.sort_by_key(|c| c.position);
    cards
        .into_iter()
        .map(|c| {
            json!({
                "reading_id":     saved.id.to_string(),
                "card_id":        c.card_id,
                "position":       c.position,
                "position_label": c.position_label,
                "is_reversed":    c.is_reversed,
            })
        })
        .collect()
}
