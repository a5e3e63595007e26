//! Which extracted facts need human confirmation.
//!
//! A fact goes to review when the model flagged it, when its confidence is
//! below [`CONFIDENCE_THRESHOLD`], or when it would replace a different value
//! the user already accepted for the same fact type.

use chrono::Utc;

use quest_types::confirmation::{ConfirmationStatus, PendingConfirmation};
use quest_types::fact::{ExtractedFact, UserFact};

pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

pub fn is_low_confidence(fact: &ExtractedFact) -> bool {
    fact.confidence < CONFIDENCE_THRESHOLD
}

/// The accepted value this fact would overwrite, if any.
pub fn overwritten_value<'a>(fact: &ExtractedFact, accepted: &'a [UserFact]) -> Option<&'a str> {
    accepted
        .iter()
        .find(|a| a.fact_type == fact.fact_type)
        .filter(|a| !a.value.trim().eq_ignore_ascii_case(fact.value.trim()))
        .map(|a| a.value.as_str())
}

/// Build (unpersisted) confirmations for the facts that need review.
///
/// `user_id` is empty for anonymous requests.
pub fn plan_confirmations(
    user_id: &str,
    facts: &[ExtractedFact],
    accepted: &[UserFact],
) -> Vec<PendingConfirmation> {
    facts
        .iter()
        .filter_map(|fact| {
            let old_value = overwritten_value(fact, accepted);
            let needs_review =
                fact.requires_confirmation || is_low_confidence(fact) || old_value.is_some();
            needs_review.then(|| PendingConfirmation {
                id: None,
                user_id: user_id.to_string(),
                fact_type: fact.fact_type,
                old_value: old_value.map(str::to_string),
                new_value: fact.value.clone(),
                confidence: fact.confidence,
                context: fact.context.clone(),
                status: ConfirmationStatus::Pending,
                created_at: Utc::now(),
            })
        })
        .collect()
}
