//! # Checklist Lifecycle State Machine
//!
//! Models the lifecycle of a checklist instance.
//!
//! ## States
//!
//! ```text
//! Draft ──▶ InProgress ──▶ Complete
//!               │              │  ▲
//!               │              │  │ (reopen, while not submitted)
//!               ▼              ▼  │
//!             Submitted ◀──────┘
//!             (terminal)
//! ```
//!
//! `Submitted` is reachable from `InProgress` or `Complete` and is
//! terminal under normal operation; `submitted_at`/`submitted_by` are
//! set once and survive until an explicit reset.
//!
//! The view/edit UI mode is *derived* from status (`Complete` and
//! `Submitted` default to view, everything else to edit) and can be
//! toggled explicitly. The toggle is exposed unconditionally;
//! permission gating (who may re-edit a submitted checklist) is the
//! caller's policy, not the state machine's.
//!
//! ## Design Decision
//!
//! Four states with validated transitions use an enum and `Result`-
//! returning methods rather than typestates; the invariants are simple
//! sequencing rules and the status arrives from the backend at runtime
//! anyway.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mfc_core::{Timestamp, UserId};

// ─── Status ──────────────────────────────────────────────────────────

/// Lifecycle status of a checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    /// Created, no responses recorded yet.
    Draft,
    /// At least one response recorded.
    InProgress,
    /// All items answered; not yet submitted.
    Complete,
    /// Submitted to the office (terminal).
    Submitted,
}

impl ChecklistStatus {
    /// Wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::Submitted => "submitted",
        }
    }

    /// Whether this status is terminal under normal operation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// The UI mode a checklist in this status opens in.
    pub fn default_mode(&self) -> UiMode {
        match self {
            Self::Complete | Self::Submitted => UiMode::View,
            Self::Draft | Self::InProgress => UiMode::Edit,
        }
    }
}

impl std::fmt::Display for ChecklistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the checklist form renders read-only or editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMode {
    View,
    Edit,
}

impl UiMode {
    /// The opposite mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::View => Self::Edit,
            Self::Edit => Self::View,
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Attempted transition is not valid from the current status.
    #[error("invalid checklist transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// The checklist is already submitted.
    #[error("checklist is already submitted")]
    AlreadySubmitted,
}

// ─── State machine ───────────────────────────────────────────────────

/// Record of one status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from_status: ChecklistStatus,
    pub to_status: ChecklistStatus,
    pub at: Timestamp,
}

/// A checklist's lifecycle state: status, derived UI mode, submission
/// audit fields, and the ordered transition log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistState {
    pub status: ChecklistStatus,
    pub mode: UiMode,
    pub submitted_at: Option<Timestamp>,
    pub submitted_by: Option<UserId>,
    pub transitions: Vec<TransitionRecord>,
}

impl ChecklistState {
    /// Create state for a checklist in the given status, with the
    /// derived default UI mode.
    pub fn new(status: ChecklistStatus) -> Self {
        Self {
            status,
            mode: status.default_mode(),
            submitted_at: None,
            submitted_by: None,
            transitions: Vec::new(),
        }
    }

    /// Record that responses have started accruing (DRAFT → IN_PROGRESS).
    pub fn begin(&mut self) -> Result<(), LifecycleError> {
        self.require(ChecklistStatus::Draft, ChecklistStatus::InProgress)?;
        self.do_transition(ChecklistStatus::InProgress);
        Ok(())
    }

    /// Record that every item is answered (IN_PROGRESS → COMPLETE).
    pub fn mark_complete(&mut self) -> Result<(), LifecycleError> {
        self.require(ChecklistStatus::InProgress, ChecklistStatus::Complete)?;
        self.do_transition(ChecklistStatus::Complete);
        Ok(())
    }

    /// Re-enter editing (COMPLETE → IN_PROGRESS). Rejected once submitted.
    pub fn reopen(&mut self) -> Result<(), LifecycleError> {
        self.require(ChecklistStatus::Complete, ChecklistStatus::InProgress)?;
        self.do_transition(ChecklistStatus::InProgress);
        self.mode = UiMode::Edit;
        Ok(())
    }

    /// Submit (IN_PROGRESS | COMPLETE → SUBMITTED), recording the actor
    /// and time once.
    ///
    /// The caller must have saved current responses successfully before
    /// invoking this; that sequencing is the orchestration's contract.
    pub fn submit(&mut self, by: UserId, at: Timestamp) -> Result<(), LifecycleError> {
        match self.status {
            ChecklistStatus::Submitted => Err(LifecycleError::AlreadySubmitted),
            ChecklistStatus::InProgress | ChecklistStatus::Complete => {
                self.do_transition(ChecklistStatus::Submitted);
                self.submitted_at = Some(at);
                self.submitted_by = Some(by);
                self.mode = UiMode::View;
                Ok(())
            }
            ChecklistStatus::Draft => Err(LifecycleError::InvalidTransition {
                from: self.status.to_string(),
                to: ChecklistStatus::Submitted.to_string(),
            }),
        }
    }

    /// Explicit reset of a submission (SUBMITTED → COMPLETE), clearing
    /// the audit fields. Authorization is the caller's concern.
    pub fn reset_submission(&mut self) -> Result<(), LifecycleError> {
        self.require(ChecklistStatus::Submitted, ChecklistStatus::Complete)?;
        self.do_transition(ChecklistStatus::Complete);
        self.submitted_at = None;
        self.submitted_by = None;
        Ok(())
    }

    /// Drive the status from a freshly computed completion percentage.
    ///
    /// Draft with any progress becomes in-progress; full progress marks
    /// complete; a complete checklist that loses progress (an answer was
    /// cleared) drops back to in-progress. No effect once submitted.
    pub fn apply_progress(&mut self, percentage: u8) {
        match (self.status, percentage) {
            (ChecklistStatus::Draft, p) if p > 0 => self.do_transition(ChecklistStatus::InProgress),
            (ChecklistStatus::InProgress, 100) => self.do_transition(ChecklistStatus::Complete),
            (ChecklistStatus::Complete, p) if p < 100 => {
                self.do_transition(ChecklistStatus::InProgress)
            }
            _ => {}
        }
        if self.status == ChecklistStatus::InProgress && percentage == 100 {
            self.do_transition(ChecklistStatus::Complete);
        }
    }

    /// Flip between view and edit mode. Exposed unconditionally; whether
    /// a submitted checklist may be re-edited is caller policy.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    /// Whether the form should accept edits right now.
    pub fn can_edit(&self) -> bool {
        self.mode == UiMode::Edit
    }

    fn require(
        &self,
        expected: ChecklistStatus,
        target: ChecklistStatus,
    ) -> Result<(), LifecycleError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            })
        }
    }

    fn do_transition(&mut self, to: ChecklistStatus) {
        self.transitions.push(TransitionRecord {
            from_status: self.status,
            to_status: to,
            at: Timestamp::now(),
        });
        self.status = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
