//! Request and response types matching the fleet compliance API schemas.
//!
//! Response types use `#[serde(default)]` liberally for resilience
//! against backend schema evolution. The live API may return additional
//! fields not modeled here, so `serde(deny_unknown_fields)` is
//! intentionally NOT used.

use serde::{Deserialize, Serialize};

use mfc_checklist::{ChecklistStatus, WireResponse};
use mfc_core::{ChecklistId, TemplateId, Timestamp, UserId, VoyageId};

// -- Response types -----------------------------------------------------------

/// A checklist instance as returned by the fleet API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub id: ChecklistId,
    pub voyage_id: VoyageId,
    pub template_id: TemplateId,
    #[serde(default = "default_status")]
    pub status: ChecklistStatus,
    /// Denormalized template name, if the backend includes it.
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub items_completed: u32,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub progress_percentage: u8,
    #[serde(default)]
    pub submitted_at: Option<Timestamp>,
    #[serde(default)]
    pub submitted_by: Option<UserId>,
    /// Stored responses. List endpoints may omit these entirely.
    #[serde(default)]
    pub responses: Vec<WireResponse>,
    /// Raw template payload, when the backend embeds it on detail reads.
    #[serde(default)]
    pub template_data: Option<serde_json::Value>,
}

fn default_status() -> ChecklistStatus {
    ChecklistStatus::Draft
}

impl Checklist {
    /// Whether this checklist has been submitted.
    pub fn is_submitted(&self) -> bool {
        self.status == ChecklistStatus::Submitted
    }
}

/// Envelope for single-checklist write responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistEnvelope {
    pub checklist: Checklist,
}

/// Response to an auto-create call: the checklists now present on the
/// voyage, whether created by this call or already there.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoCreateResponse {
    #[serde(default)]
    pub checklists: Vec<Checklist>,
}

/// Envelope for the response-save summary.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEnvelope {
    pub summary: UpdateSummary,
}

/// Summary of a bulk response save.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSummary {
    #[serde(default)]
    pub created: u32,
    #[serde(default)]
    pub updated: u32,
    #[serde(default)]
    pub total_processed: u32,
}

// -- Request types ------------------------------------------------------------

/// Request to seed a voyage with one checklist per applicable template.
#[derive(Debug, Serialize)]
pub struct AutoCreateRequest {
    pub vessel_name: String,
    pub user_id: UserId,
}

/// Request to create a single checklist from a template.
#[derive(Debug, Serialize)]
pub struct CreateChecklistRequest {
    pub template_id: TemplateId,
    pub vessel_name: String,
    pub user_id: UserId,
}

/// Request to save a batch of responses.
#[derive(Debug, Serialize)]
pub struct SaveResponsesRequest {
    pub responses: Vec<WireResponse>,
    pub user_id: UserId,
}

/// Request to submit a checklist.
#[derive(Debug, Serialize)]
pub struct SubmitRequest {
    pub user_id: UserId,
    /// Resubmission override, set from [`SubmitOptions::force_overwrite`].
    pub force_overwrite: bool,
}

// -- Orchestration types ------------------------------------------------------

/// What triggered a save. Auto-saves log at debug, manual saves at info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Auto,
    Manual,
}

/// How a submit attempt handles an existing submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Sent on the wire; asks the backend to replace an existing
    /// submission instead of rejecting with a 409.
    pub force_overwrite: bool,
    /// Whether a 409 is resolved as an `already_submitted` success.
    /// When false it surfaces as a conflict error instead.
    pub tolerate_conflict: bool,
}

impl SubmitOptions {
    /// A lost submit race reads as success. The interactive default.
    pub fn tolerant() -> Self {
        Self {
            force_overwrite: false,
            tolerate_conflict: true,
        }
    }

    /// A 409 surfaces as an error. For callers that must know their
    /// own attempt was the one recorded.
    pub fn strict() -> Self {
        Self {
            force_overwrite: false,
            tolerate_conflict: false,
        }
    }
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self::tolerant()
    }
}

/// Outcome of a submit attempt, after any conflict resolution.
///
/// A 409 from the backend means another session already submitted this
/// checklist. Compliance-wise that is success (the checklist IS
/// submitted), so the resolver reports it as such with
/// `already_submitted` set rather than surfacing an error.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub checklist_id: ChecklistId,
    pub status: ChecklistStatus,
    pub submitted_at: Option<Timestamp>,
    pub submitted_by: Option<UserId>,
    pub progress_percentage: u8,
    /// True when this attempt lost the race and the recorded submission
    /// belongs to another session.
    pub already_submitted: bool,
}
