//! # Checklist Service Orchestration
//!
//! Ties the typed API client to the request cache and implements the
//! flows the UI calls: cached reads, auto-create on first voyage visit,
//! save (auto and manual), submit with conflict tolerance, delete.
//!
//! ## Cache discipline
//!
//! Reads go through [`RequestCache::get_or_fetch`] under stable string
//! keys. Every write invalidates the affected keys twice: once before
//! the request goes out, and again once the response has resolved,
//! before the result is interpreted. The second pass matters because a
//! read landing while the write is in flight refetches pre-write
//! backend state and re-populates the cache with it; without the
//! post-resolve invalidation that stale entry would survive the write.
//! Voyage listing entries cannot be matched to a checklist id from the
//! key alone, so checklist writes clear the voyage cache wholesale.

use std::sync::Arc;
use std::time::Duration;

use mfc_checklist::{optimize, WireResponse};
use mfc_core::{ChecklistId, TemplateId, UserId, VoyageId};
use mfc_template::{normalize, NormalizedTemplate, RawTemplate};

use crate::api::ChecklistApi;
use crate::cache::{Clock, RequestCache, SystemClock};
use crate::config::FleetApiConfig;
use crate::error::ApiError;
use crate::types::{
    AutoCreateRequest, Checklist, CreateChecklistRequest, SaveKind, SaveResponsesRequest,
    SubmitOptions, SubmitOutcome, SubmitRequest, UpdateSummary,
};

const TEMPLATES_ALL_KEY: &str = "templates:all";

fn template_key(id: TemplateId) -> String {
    format!("template:{}", id.as_uuid())
}

fn checklist_key(id: ChecklistId) -> String {
    format!("checklist:{}", id.as_uuid())
}

fn voyage_key(id: VoyageId) -> String {
    format!("voyage:{}:checklists", id.as_uuid())
}

/// High-level checklist engine: cached reads plus write orchestration.
pub struct ChecklistService {
    api: ChecklistApi,
    templates: RequestCache<Vec<RawTemplate>>,
    template: RequestCache<RawTemplate>,
    checklists: RequestCache<Checklist>,
    voyages: RequestCache<Vec<Checklist>>,
}

impl ChecklistService {
    /// Build the service from configuration.
    pub fn new(config: FleetApiConfig) -> Result<Self, ApiError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the service with an injected clock (expiry tests).
    pub fn with_clock(config: FleetApiConfig, clock: Arc<dyn Clock>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    reqwest::header::HeaderValue::from_str(&format!(
                        "Bearer {}",
                        config.api_token
                    ))
                    .map_err(|_| {
                        ApiError::Config(crate::config::ConfigError::MissingToken)
                    })?,
                );
                headers
            })
            .build()
            .map_err(|e| ApiError::Transport {
                endpoint: "client_init".into(),
                reason: e.to_string(),
            })?;

        let ttl = Duration::from_secs(config.cache_ttl_secs);
        Ok(Self {
            api: ChecklistApi::new(http, config.base_url),
            templates: RequestCache::with_clock(ttl, clock.clone()),
            template: RequestCache::with_clock(ttl, clock.clone()),
            checklists: RequestCache::with_clock(ttl, clock.clone()),
            voyages: RequestCache::with_clock(ttl, clock),
        })
    }

    /// Direct access to the underlying API client (uncached).
    pub fn api(&self) -> &ChecklistApi {
        &self.api
    }

    // ─── Cached reads ────────────────────────────────────────────────

    /// List all templates, cached.
    pub async fn templates(&self) -> Result<Vec<RawTemplate>, ApiError> {
        self.templates
            .get_or_fetch(TEMPLATES_ALL_KEY, || self.api.list_templates())
            .await
    }

    /// Get one raw template, cached.
    pub async fn template(&self, id: TemplateId) -> Result<RawTemplate, ApiError> {
        self.template
            .get_or_fetch(&template_key(id), || self.api.get_template(id))
            .await
    }

    /// Get a template normalized into its flat item list.
    pub async fn normalized_template(
        &self,
        id: TemplateId,
    ) -> Result<NormalizedTemplate, ApiError> {
        let raw = self.template(id).await?;
        Ok(normalize(&raw)?)
    }

    /// Get a checklist with responses, cached.
    pub async fn checklist(&self, id: ChecklistId) -> Result<Checklist, ApiError> {
        self.checklists
            .get_or_fetch(&checklist_key(id), || self.api.get_checklist(id))
            .await
    }

    /// List a voyage's checklists, cached. A voyage with no checklist
    /// record yet reads as an empty list.
    pub async fn voyage_checklists(&self, voyage_id: VoyageId) -> Result<Vec<Checklist>, ApiError> {
        self.voyages
            .get_or_fetch(&voyage_key(voyage_id), || async move {
                Ok(self
                    .api
                    .voyage_checklists(voyage_id)
                    .await?
                    .unwrap_or_default())
            })
            .await
    }

    // ─── Creation flows ──────────────────────────────────────────────

    /// List a voyage's checklists, seeding them on first visit.
    ///
    /// When the voyage has no checklists yet, auto-create is invoked
    /// once and its result returned. A voyage that already has
    /// checklists is returned as-is; auto-create is never called for it.
    pub async fn ensure_voyage_checklists(
        &self,
        voyage_id: VoyageId,
        vessel_name: &str,
        user_id: UserId,
    ) -> Result<Vec<Checklist>, ApiError> {
        let existing = self.voyage_checklists(voyage_id).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        tracing::info!(voyage_id = %voyage_id, vessel = vessel_name, "seeding voyage checklists");
        let created = self
            .api
            .auto_create(
                voyage_id,
                &AutoCreateRequest {
                    vessel_name: vessel_name.to_string(),
                    user_id,
                },
            )
            .await?;

        self.voyages.store(&voyage_key(voyage_id), created.clone());
        Ok(created)
    }

    /// Create one checklist from a template on a voyage.
    pub async fn create_checklist(
        &self,
        voyage_id: VoyageId,
        template_id: TemplateId,
        vessel_name: &str,
        user_id: UserId,
    ) -> Result<Checklist, ApiError> {
        self.voyages.invalidate_key(&voyage_key(voyage_id));

        let checklist = self
            .api
            .create_checklist(
                voyage_id,
                &CreateChecklistRequest {
                    template_id,
                    vessel_name: vessel_name.to_string(),
                    user_id,
                },
            )
            .await?;

        // A voyage read racing the create may have cached the pre-create
        // listing; drop it now that the create has resolved.
        self.voyages.invalidate_key(&voyage_key(voyage_id));
        self.checklists
            .store(&checklist_key(checklist.id), checklist.clone());
        Ok(checklist)
    }

    // ─── Writes ──────────────────────────────────────────────────────

    /// Save a batch of responses, optimizing duplicates and empties out
    /// of the payload first.
    pub async fn save_responses(
        &self,
        checklist_id: ChecklistId,
        responses: Vec<WireResponse>,
        user_id: UserId,
        kind: SaveKind,
    ) -> Result<UpdateSummary, ApiError> {
        let before = responses.len();
        let responses = optimize(responses);
        match kind {
            SaveKind::Auto => tracing::debug!(
                checklist_id = %checklist_id,
                sent = responses.len(),
                dropped = before - responses.len(),
                "auto-saving responses"
            ),
            SaveKind::Manual => tracing::info!(
                checklist_id = %checklist_id,
                sent = responses.len(),
                dropped = before - responses.len(),
                "saving responses"
            ),
        }

        self.invalidate_checklist(checklist_id);
        let summary = self
            .api
            .save_responses(checklist_id, &SaveResponsesRequest { responses, user_id })
            .await?;
        // A read racing the save may have re-cached pre-save state while
        // the request was in flight.
        self.invalidate_checklist(checklist_id);
        Ok(summary)
    }

    /// Submit a checklist, treating a lost submit race as success.
    ///
    /// Equivalent to [`Self::submit_with`] under
    /// [`SubmitOptions::tolerant`], which is what interactive sessions
    /// want: another session having submitted first still means the
    /// checklist is submitted.
    pub async fn submit(
        &self,
        checklist_id: ChecklistId,
        user_id: UserId,
    ) -> Result<SubmitOutcome, ApiError> {
        self.submit_with(checklist_id, user_id, SubmitOptions::tolerant())
            .await
    }

    /// Submit a checklist with explicit conflict handling.
    ///
    /// `options.force_overwrite` is passed to the backend and asks it to
    /// replace an existing submission. `options.tolerate_conflict`
    /// decides what a 409 means here: resolved as an
    /// `already_submitted` success, or surfaced as
    /// [`ApiError::Conflict`] for callers that must not paper over a
    /// lost race.
    pub async fn submit_with(
        &self,
        checklist_id: ChecklistId,
        user_id: UserId,
        options: SubmitOptions,
    ) -> Result<SubmitOutcome, ApiError> {
        self.invalidate_checklist(checklist_id);

        let result = self
            .api
            .submit(
                checklist_id,
                &SubmitRequest {
                    user_id,
                    force_overwrite: options.force_overwrite,
                },
            )
            .await;

        // Same stale-read window as saves: drop whatever a racing read
        // cached while the submit was in flight.
        self.invalidate_checklist(checklist_id);

        match result {
            Ok(checklist) => {
                self.checklists
                    .store(&checklist_key(checklist.id), checklist.clone());
                Ok(SubmitOutcome {
                    checklist_id: checklist.id,
                    status: checklist.status,
                    submitted_at: checklist.submitted_at,
                    submitted_by: checklist.submitted_by,
                    progress_percentage: checklist.progress_percentage,
                    already_submitted: false,
                })
            }
            Err(ApiError::Conflict { .. }) if options.tolerate_conflict => {
                Ok(self.resolve_submit_conflict(checklist_id, user_id).await)
            }
            Err(e) => Err(e),
        }
    }

    /// Save then submit, in that order. A failed save aborts the submit
    /// entirely; stale responses must never be what gets locked in.
    pub async fn save_and_submit(
        &self,
        checklist_id: ChecklistId,
        responses: Vec<WireResponse>,
        user_id: UserId,
    ) -> Result<SubmitOutcome, ApiError> {
        self.save_responses(checklist_id, responses, user_id, SaveKind::Manual)
            .await?;
        self.submit(checklist_id, user_id).await
    }

    /// Delete a checklist.
    pub async fn delete_checklist(&self, checklist_id: ChecklistId) -> Result<(), ApiError> {
        self.invalidate_checklist(checklist_id);
        self.api.delete_checklist(checklist_id).await?;
        self.invalidate_checklist(checklist_id);
        Ok(())
    }

    // ─── Conflict resolution ─────────────────────────────────────────

    /// Resolve a 409 from submit.
    ///
    /// The conflict means another session submitted first. Compliance
    /// already holds what it needs, so this is reported as success with
    /// `already_submitted` set. One authoritative fetch (bypassing the
    /// cache) recovers the real audit fields; any successful fetch is
    /// carried through as-is, even when its status disagrees with the
    /// 409. Only when that fetch fails is the outcome synthesized as
    /// submitted-now-by-this-actor so the UI can settle. No re-submit
    /// is ever attempted.
    async fn resolve_submit_conflict(
        &self,
        checklist_id: ChecklistId,
        user_id: UserId,
    ) -> SubmitOutcome {
        match self.api.get_checklist(checklist_id).await {
            Ok(checklist) => {
                if checklist.is_submitted() {
                    tracing::info!(
                        checklist_id = %checklist_id,
                        submitted_by = ?checklist.submitted_by,
                        "submit race lost, adopting recorded submission"
                    );
                    self.checklists
                        .store(&checklist_key(checklist.id), checklist.clone());
                } else {
                    // The 409 and the fetched copy disagree (lagging
                    // replica). Report what the fetch actually said.
                    tracing::warn!(
                        checklist_id = %checklist_id,
                        status = %checklist.status,
                        "conflict reported but fetched status disagrees"
                    );
                }
                SubmitOutcome {
                    checklist_id: checklist.id,
                    status: checklist.status,
                    submitted_at: checklist.submitted_at,
                    submitted_by: checklist.submitted_by,
                    progress_percentage: 100,
                    already_submitted: true,
                }
            }
            Err(e) => {
                tracing::warn!(
                    checklist_id = %checklist_id,
                    error = %e,
                    "authoritative fetch after conflict failed, synthesizing outcome"
                );
                self.synthesize_outcome(checklist_id, user_id)
            }
        }
    }

    fn synthesize_outcome(&self, checklist_id: ChecklistId, user_id: UserId) -> SubmitOutcome {
        SubmitOutcome {
            checklist_id,
            status: mfc_checklist::ChecklistStatus::Submitted,
            submitted_at: Some(mfc_core::Timestamp::now()),
            submitted_by: Some(user_id),
            progress_percentage: 100,
            already_submitted: true,
        }
    }

    /// Runs before each write goes out and again after it resolves; see
    /// the module docs for why both passes are needed.
    fn invalidate_checklist(&self, checklist_id: ChecklistId) {
        self.checklists.invalidate_key(&checklist_key(checklist_id));
        // Voyage listing keys carry no checklist id, so all of them go.
        self.voyages.clear();
    }
}
