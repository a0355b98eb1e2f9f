//! Category inference for free-text intake
//!
//! Some intake channels (SMS relays, chat bridges) only deliver a sentence.
//! These helpers guess a category from keywords so the event can enter the
//! pipeline; the router itself always trusts the category it is given.

use std::time::Duration;

use orchestration_types::{DisruptionCategory, DisruptionEvent, Urgency};

const RULES: &[(DisruptionCategory, &[&str])] = &[
    (DisruptionCategory::Traffic, &["traffic", "highway", "road closure", "accident", "jam"]),
    (DisruptionCategory::MerchantFailure, &["restaurant", "merchant", "kitchen", "store closed"]),
    (
        DisruptionCategory::DeliveryMishap,
        &["package", "parcel", "wrong address", "damaged", "lost delivery"],
    ),
    (
        DisruptionCategory::CustomerComplaint,
        &["customer", "complaint", "angry", "frustrated", "refund"],
    ),
];

/// First matching rule wins, in the order traffic, merchant, delivery,
/// complaint. No match is [`DisruptionCategory::Other`].
pub fn infer_category(description: &str) -> DisruptionCategory {
    let text = description.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(DisruptionCategory::Other)
}

/// Build an event from a bare description with the given deadline budget
pub fn event_from_text(description: &str, urgency: Urgency, budget: Duration) -> DisruptionEvent {
    DisruptionEvent::builder()
        .category(infer_category(description))
        .urgency(urgency)
        .description(description)
        .budget(budget)
        .build()
}
