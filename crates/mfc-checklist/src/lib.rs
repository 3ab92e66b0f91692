//! # mfc-checklist — Checklist Engine Logic
//!
//! The pure logic of the checklist engine, independent of transport:
//!
//! - [`response`] — the wire response contract, the meaningful-value
//!   invariant, and the encode/optimize codec.
//! - [`progress`] — completion percentages and the mandatory-items
//!   submission gate. Progress is always *derived* from the response
//!   set, never tracked as separate mutable state.
//! - [`table`] — merging stored table rows with template structure, for
//!   both free-form and predefined-row tables.
//! - [`lifecycle`] — the draft → in_progress → complete / submitted
//!   state machine and the derived view/edit UI mode.
//!
//! Everything here is synchronous and deterministic; the async plumbing
//! (caching, conflict handling, HTTP) lives in `mfc-client`.

pub mod lifecycle;
pub mod progress;
pub mod response;
pub mod table;

pub use lifecycle::{ChecklistState, ChecklistStatus, LifecycleError, TransitionRecord, UiMode};
pub use progress::{completed_count, percentage, ready_to_submit, ValidationError};
pub use response::{encode, optimize, FormAnswer, FormValue, TableRowData, WireResponse};
pub use table::{delete_row, merge, DisplayRow, TableEditError};
