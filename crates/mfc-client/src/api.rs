//! Typed client for the fleet compliance checklist API.
//!
//! ## API Paths
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/checklist-templates` | List templates |
//! | GET    | `/checklist-templates/{id}` | Get template |
//! | GET    | `/voyage/{voyageId}/checklists` | List checklists for voyage |
//! | POST   | `/voyage/{voyageId}/checklists/auto-create` | Seed voyage checklists |
//! | POST   | `/voyage/{voyageId}/checklists/create` | Create from template |
//! | GET    | `/checklist/{id}` | Get checklist with responses |
//! | PUT    | `/checklist/{id}/responses` | Save responses |
//! | POST   | `/checklist/{id}/submit` | Submit (409 when already submitted) |
//! | DELETE | `/checklist/{id}` | Delete checklist |
//!
//! This layer does transport, status classification, and decoding only.
//! Caching, invalidation, and conflict resolution live in
//! [`crate::service`].

use serde::de::DeserializeOwned;

use mfc_core::{ChecklistId, TemplateId, VoyageId};
use mfc_template::RawTemplate;

use crate::error::ApiError;
use crate::types::{
    AutoCreateRequest, AutoCreateResponse, Checklist, ChecklistEnvelope, SaveResponsesRequest,
    SubmitRequest, UpdateEnvelope, UpdateSummary,
};

/// Low-level HTTP client for the checklist endpoints.
#[derive(Debug, Clone)]
pub struct ChecklistApi {
    http: reqwest::Client,
    base_url: url::Url,
}

impl ChecklistApi {
    /// Endpoint paths are appended textually, so the base path must end
    /// in `/` or `https://host/api` would yield `https://host/apichecklist-...`.
    pub(crate) fn new(http: reqwest::Client, mut base_url: url::Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    /// List all checklist templates.
    ///
    /// Calls `GET {base_url}/checklist-templates`.
    pub async fn list_templates(&self) -> Result<Vec<RawTemplate>, ApiError> {
        let endpoint = "GET /checklist-templates";
        let url = format!("{}checklist-templates", self.base_url);

        let resp = self.http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_send(endpoint, e))?;

        decode(endpoint, check_status(endpoint, resp).await?).await
    }

    /// Get a single template by id. 404 is a hard error here: the
    /// caller already holds a template id and absence means breakage.
    ///
    /// Calls `GET {base_url}/checklist-templates/{id}`.
    pub async fn get_template(&self, id: TemplateId) -> Result<RawTemplate, ApiError> {
        let endpoint = format!("GET /checklist-templates/{}", id.as_uuid());
        let url = format!("{}checklist-templates/{}", self.base_url, id.as_uuid());

        let resp = self.http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_send(&endpoint, e))?;

        decode(&endpoint, check_status(&endpoint, resp).await?).await
    }

    /// List the checklists attached to a voyage. 404 means the voyage
    /// has no checklist record yet, which the caller may treat as an
    /// empty set, so it maps to `Ok(None)` rather than an error.
    ///
    /// Calls `GET {base_url}/voyage/{voyageId}/checklists`.
    pub async fn voyage_checklists(
        &self,
        voyage_id: VoyageId,
    ) -> Result<Option<Vec<Checklist>>, ApiError> {
        let endpoint = format!("GET /voyage/{}/checklists", voyage_id.as_uuid());
        let url = format!("{}voyage/{}/checklists", self.base_url, voyage_id.as_uuid());

        let resp = self.http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_send(&endpoint, e))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        decode(&endpoint, check_status(&endpoint, resp).await?)
            .await
            .map(Some)
    }

    /// Seed a voyage with one checklist per applicable template.
    ///
    /// Calls `POST {base_url}/voyage/{voyageId}/checklists/auto-create`.
    pub async fn auto_create(
        &self,
        voyage_id: VoyageId,
        req: &AutoCreateRequest,
    ) -> Result<Vec<Checklist>, ApiError> {
        let endpoint = format!("POST /voyage/{}/checklists/auto-create", voyage_id.as_uuid());
        let url = format!(
            "{}voyage/{}/checklists/auto-create",
            self.base_url,
            voyage_id.as_uuid()
        );

        let resp = self.http
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| ApiError::from_send(&endpoint, e))?;

        let body: AutoCreateResponse =
            decode(&endpoint, check_status(&endpoint, resp).await?).await?;
        Ok(body.checklists)
    }

    /// Create a single checklist from a template.
    ///
    /// Calls `POST {base_url}/voyage/{voyageId}/checklists/create`.
    pub async fn create_checklist(
        &self,
        voyage_id: VoyageId,
        req: &crate::types::CreateChecklistRequest,
    ) -> Result<Checklist, ApiError> {
        let endpoint = format!("POST /voyage/{}/checklists/create", voyage_id.as_uuid());
        let url = format!(
            "{}voyage/{}/checklists/create",
            self.base_url,
            voyage_id.as_uuid()
        );

        let resp = self.http
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| ApiError::from_send(&endpoint, e))?;

        let body: ChecklistEnvelope =
            decode(&endpoint, check_status(&endpoint, resp).await?).await?;
        Ok(body.checklist)
    }

    /// Get a checklist with its stored responses and embedded template.
    ///
    /// Calls `GET {base_url}/checklist/{id}`.
    pub async fn get_checklist(&self, id: ChecklistId) -> Result<Checklist, ApiError> {
        let endpoint = format!("GET /checklist/{}", id.as_uuid());
        let url = format!("{}checklist/{}", self.base_url, id.as_uuid());

        let resp = self.http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_send(&endpoint, e))?;

        decode(&endpoint, check_status(&endpoint, resp).await?).await
    }

    /// Save a batch of responses.
    ///
    /// Calls `PUT {base_url}/checklist/{id}/responses`.
    pub async fn save_responses(
        &self,
        id: ChecklistId,
        req: &SaveResponsesRequest,
    ) -> Result<UpdateSummary, ApiError> {
        let endpoint = format!("PUT /checklist/{}/responses", id.as_uuid());
        let url = format!("{}checklist/{}/responses", self.base_url, id.as_uuid());

        let resp = self.http
            .put(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| ApiError::from_send(&endpoint, e))?;

        let body: UpdateEnvelope = decode(&endpoint, check_status(&endpoint, resp).await?).await?;
        Ok(body.summary)
    }

    /// Submit a checklist. A 409 maps to [`ApiError::Conflict`] so the
    /// service layer can run conflict resolution.
    ///
    /// Calls `POST {base_url}/checklist/{id}/submit`.
    pub async fn submit(
        &self,
        id: ChecklistId,
        req: &SubmitRequest,
    ) -> Result<Checklist, ApiError> {
        let endpoint = format!("POST /checklist/{}/submit", id.as_uuid());
        let url = format!("{}checklist/{}/submit", self.base_url, id.as_uuid());

        let resp = self.http
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| ApiError::from_send(&endpoint, e))?;

        let body: ChecklistEnvelope =
            decode(&endpoint, check_status(&endpoint, resp).await?).await?;
        Ok(body.checklist)
    }

    /// Delete a checklist.
    ///
    /// Calls `DELETE {base_url}/checklist/{id}`.
    pub async fn delete_checklist(&self, id: ChecklistId) -> Result<(), ApiError> {
        let endpoint = format!("DELETE /checklist/{}", id.as_uuid());
        let url = format!("{}checklist/{}", self.base_url, id.as_uuid());

        let resp = self.http
            .delete(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_send(&endpoint, e))?;

        check_status(&endpoint, resp).await?;
        Ok(())
    }
}

/// Classify a non-2xx response into the matching error variant.
async fn check_status(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    match status {
        reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound {
            endpoint: endpoint.to_string(),
        }),
        reqwest::StatusCode::CONFLICT => Err(ApiError::Conflict {
            endpoint: endpoint.to_string(),
            body,
        }),
        _ => Err(ApiError::Backend {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        }),
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    resp.json().await.map_err(|e| ApiError::Deserialization {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}
