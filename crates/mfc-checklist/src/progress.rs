//! # Completion Progress
//!
//! Progress is a pure function of the response set and the template's
//! item counts. There is deliberately no separately-tracked "completed
//! items" set to fall out of sync with the responses; any consumer
//! needing `items_completed` recomputes it from here.

use std::collections::HashSet;

use thiserror::Error;

use mfc_template::NormalizedTemplate;

use crate::response::WireResponse;

/// Number of distinct items with a meaningful response.
///
/// Deduplicates by `item_id` first, so a retried save that appended the
/// same answer twice does not double-count.
pub fn completed_count(responses: &[WireResponse]) -> usize {
    let mut seen = HashSet::new();
    responses
        .iter()
        .filter(|r| r.is_meaningful())
        .filter(|r| seen.insert(r.item_id.as_str()))
        .count()
}

/// Completion percentage, 0..=100, rounded to the nearest integer.
///
/// `total_items == 0` yields 0. An item-less checklist is never
/// "complete", and division by zero must not surface.
pub fn percentage(responses: &[WireResponse], total_items: usize) -> u8 {
    if total_items == 0 {
        return 0;
    }
    let completed = completed_count(responses).min(total_items);
    let pct = (completed as f64 / total_items as f64) * 100.0;
    pct.round() as u8
}

/// A mandatory item lacks a meaningful response at submit time.
///
/// This is the client-side gate; the backend's rejection remains the
/// authoritative check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} mandatory item(s) unanswered: {}", missing.len(), missing.join(", "))]
pub struct ValidationError {
    /// Ids of mandatory items without a meaningful response, in
    /// template order.
    pub missing: Vec<String>,
}

/// Check that every mandatory item has a meaningful response.
///
/// Callers are expected to run this before attempting the submit
/// network call.
pub fn ready_to_submit(
    template: &NormalizedTemplate,
    responses: &[WireResponse],
) -> Result<(), ValidationError> {
    let answered: HashSet<&str> = responses
        .iter()
        .filter(|r| r.is_meaningful())
        .map(|r| r.item_id.as_str())
        .collect();

    let missing: Vec<String> = template
        .mandatory_ids()
        .filter(|id| !answered.contains(id))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}
