//! # mfc-client — Fleet Compliance API Client
//!
//! Async access to the fleet compliance backend, in three layers:
//!
//! - [`api`] — typed `reqwest` client for the nine checklist endpoints.
//!   Transport, status classification, and decoding only.
//! - [`cache`] — keyed TTL cache with in-flight request deduplication.
//! - [`service`] — the orchestration the UI talks to: cached reads,
//!   auto-create on first voyage visit, save/submit sequencing, and
//!   submit-conflict resolution.
//!
//! This crate is the only path to the backend; nothing else in the
//! workspace issues HTTP requests.
//!
//! ## Quick start
//!
//! ```no_run
//! use mfc_client::{ChecklistService, FleetApiConfig};
//!
//! # async fn run() -> Result<(), mfc_client::ApiError> {
//! let service = ChecklistService::new(FleetApiConfig::from_env()?)?;
//! let templates = service.templates().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod service;
pub mod types;

pub use api::ChecklistApi;
pub use cache::{Clock, ManualClock, RequestCache, SystemClock, DEFAULT_TTL};
pub use config::{ConfigError, FleetApiConfig};
pub use error::ApiError;
pub use service::ChecklistService;
pub use types::{Checklist, SaveKind, SubmitOptions, SubmitOutcome, UpdateSummary};
