//! # mfc-core — Foundational Types for the Fleet Compliance Stack
//!
//! Defines the type-system primitives shared by every other crate in the
//! workspace: identifier newtypes, the UTC-only `Timestamp`, and the core
//! error taxonomy. This crate depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `ChecklistId`,
//!    `TemplateId`, `VoyageId`, `UserId`: you cannot pass a voyage
//!    identifier where a checklist identifier is expected.
//!
//! 2. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision. Submission audit fields (`submitted_at`) must be
//!    comparable across vessels regardless of local bridge time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mfc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::CoreError;
pub use identity::{ChecklistId, TemplateId, UserId, VoyageId};
pub use temporal::Timestamp;
