//! Contract tests for response saving and submission, including the
//! lost-submit-race policy.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | PUT    | `/checklist/{id}/responses` | `save_responses_*` |
//! | POST   | `/checklist/{id}/submit` | `submit_*` |

use mfc_checklist::{ChecklistStatus, WireResponse};
use mfc_client::{ApiError, ChecklistService, FleetApiConfig, SaveKind, SubmitOptions};
use mfc_core::{ChecklistId, UserId};
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VOYAGE: &str = "550e8400-e29b-41d4-a716-446655440001";
const CHECKLIST: &str = "550e8400-e29b-41d4-a716-446655440002";
const TEMPLATE: &str = "550e8400-e29b-41d4-a716-446655440003";
const OTHER_USER: &str = "550e8400-e29b-41d4-a716-446655440077";

fn test_service(mock_server: &MockServer) -> ChecklistService {
    let config = FleetApiConfig::local_mock(&mock_server.uri(), "test-token").unwrap();
    ChecklistService::new(config).unwrap()
}

fn checklist_id() -> ChecklistId {
    CHECKLIST.parse().unwrap()
}

fn submitted_checklist_json() -> serde_json::Value {
    serde_json::json!({
        "id": CHECKLIST,
        "voyage_id": VOYAGE,
        "template_id": TEMPLATE,
        "status": "submitted",
        "progress_percentage": 100,
        "submitted_at": "2026-03-01T08:15:00Z",
        "submitted_by": OTHER_USER
    })
}

// ── PUT /checklist/{id}/responses ────────────────────────────────────

#[tokio::test]
async fn save_responses_sends_optimized_payload() {
    let mock_server = MockServer::start().await;
    let user = UserId::new();

    // Duplicate of "charts" collapses to its last value; the empty
    // "eta" answer is dropped before the request goes out.
    let expected = serde_json::json!({
        "responses": [
            {"item_id": "charts", "yes_no_na_value": "No"}
        ],
        "user_id": user.as_uuid()
    });

    Mock::given(method("PUT"))
        .and(path(format!("/checklist/{CHECKLIST}/responses")))
        .and(body_json(expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "summary": {"created": 0, "updated": 1, "total_processed": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let responses = vec![
        WireResponse::yes_no_na("charts", "Yes"),
        WireResponse::text("eta", "   "),
        WireResponse::yes_no_na("charts", "No"),
    ];

    let summary = service
        .save_responses(checklist_id(), responses, user, SaveKind::Manual)
        .await
        .unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.total_processed, 1);
}

#[tokio::test]
async fn save_responses_backend_rejection_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/checklist/{CHECKLIST}/responses")))
        .respond_with(ResponseTemplate::new(422).set_body_string("unknown item id"))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let err = service
        .save_responses(
            checklist_id(),
            vec![WireResponse::text("ghost", "x")],
            UserId::new(),
            SaveKind::Auto,
        )
        .await
        .unwrap_err();

    match err {
        ApiError::Backend { status, .. } => assert_eq!(status, 422),
        other => panic!("expected Backend, got: {other:?}"),
    }
}

// ── POST /checklist/{id}/submit ──────────────────────────────────────

#[tokio::test]
async fn submit_success_reports_backend_audit_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/checklist/{CHECKLIST}/submit")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "checklist": submitted_checklist_json()
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let outcome = service.submit(checklist_id(), UserId::new()).await.unwrap();

    assert_eq!(outcome.status, ChecklistStatus::Submitted);
    assert_eq!(outcome.progress_percentage, 100);
    assert!(!outcome.already_submitted);
    assert!(outcome.submitted_at.is_some());
}

#[tokio::test]
async fn submit_conflict_adopts_recorded_submission() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/checklist/{CHECKLIST}/submit")))
        .respond_with(ResponseTemplate::new(409).set_body_string("already submitted"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The authoritative fetch that resolves the conflict.
    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(submitted_checklist_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let outcome = service.submit(checklist_id(), UserId::new()).await.unwrap();

    // Losing the race is success: the checklist IS submitted.
    assert!(outcome.already_submitted);
    assert_eq!(outcome.status, ChecklistStatus::Submitted);
    assert_eq!(outcome.progress_percentage, 100);
    let other: UserId = OTHER_USER.parse().unwrap();
    assert_eq!(outcome.submitted_by, Some(other));
}

#[tokio::test]
async fn submit_conflict_with_disagreeing_fetch_reports_fetched_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/checklist/{CHECKLIST}/submit")))
        .respond_with(ResponseTemplate::new(409).set_body_string("already submitted"))
        .mount(&mock_server)
        .await;

    // The authoritative fetch hit a lagging replica: no submission
    // recorded yet. The outcome still resolves as success but carries
    // the fetched fields, not fabricated ones.
    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": CHECKLIST,
            "voyage_id": VOYAGE,
            "template_id": TEMPLATE,
            "status": "in_progress",
            "progress_percentage": 60
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let outcome = service.submit(checklist_id(), UserId::new()).await.unwrap();

    assert!(outcome.already_submitted);
    assert_eq!(outcome.status, ChecklistStatus::InProgress);
    assert!(outcome.submitted_at.is_none());
    assert!(outcome.submitted_by.is_none());
    assert_eq!(outcome.progress_percentage, 100);
}

#[tokio::test]
async fn submit_conflict_with_failed_fetch_synthesizes_outcome() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/checklist/{CHECKLIST}/submit")))
        .respond_with(ResponseTemplate::new(409))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let user = UserId::new();
    let outcome = service.submit(checklist_id(), user).await.unwrap();

    assert!(outcome.already_submitted);
    assert_eq!(outcome.status, ChecklistStatus::Submitted);
    assert_eq!(outcome.progress_percentage, 100);
    // With no authoritative record reachable, the current actor and the
    // current time stand in.
    assert_eq!(outcome.submitted_by, Some(user));
    assert!(outcome.submitted_at.is_some());
}

#[tokio::test]
async fn strict_submit_surfaces_conflict_without_resolution() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/checklist/{CHECKLIST}/submit")))
        .respond_with(ResponseTemplate::new(409).set_body_string("already submitted"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // No resolving fetch may run when the caller disallows tolerance.
    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(submitted_checklist_json()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let err = service
        .submit_with(checklist_id(), UserId::new(), SubmitOptions::strict())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
}

#[tokio::test]
async fn force_overwrite_flag_reaches_the_wire() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/checklist/{CHECKLIST}/submit")))
        .and(body_partial_json(serde_json::json!({
            "force_overwrite": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "checklist": submitted_checklist_json()
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let options = SubmitOptions {
        force_overwrite: true,
        tolerate_conflict: true,
    };
    let outcome = service
        .submit_with(checklist_id(), UserId::new(), options)
        .await
        .unwrap();
    assert_eq!(outcome.status, ChecklistStatus::Submitted);
}

#[tokio::test]
async fn submit_non_conflict_error_passes_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/checklist/{CHECKLIST}/submit")))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let err = service
        .submit(checklist_id(), UserId::new())
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

// ── save_and_submit sequencing ───────────────────────────────────────

#[tokio::test]
async fn failed_save_blocks_submit_entirely() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/checklist/{CHECKLIST}/responses")))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad payload"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/checklist/{CHECKLIST}/submit")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let result = service
        .save_and_submit(
            checklist_id(),
            vec![WireResponse::text("charts", "ok")],
            UserId::new(),
        )
        .await;

    assert!(result.is_err());
    // expect(0) on the submit mock verifies no submit was attempted.
}

#[tokio::test]
async fn save_and_submit_runs_save_then_submit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/checklist/{CHECKLIST}/responses")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "summary": {"created": 1, "updated": 0, "total_processed": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/checklist/{CHECKLIST}/submit")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "checklist": submitted_checklist_json()
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let outcome = service
        .save_and_submit(
            checklist_id(),
            vec![WireResponse::text("charts", "ok")],
            UserId::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, ChecklistStatus::Submitted);
    assert!(!outcome.already_submitted);
}
