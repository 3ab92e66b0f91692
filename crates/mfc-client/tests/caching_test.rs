//! Caching behavior through the service layer: in-flight deduplication
//! and post-write invalidation freshness, verified with wiremock call
//! counting.

use std::sync::Arc;
use std::time::Duration;

use mfc_checklist::WireResponse;
use mfc_client::{ChecklistService, FleetApiConfig, ManualClock, SaveKind};
use mfc_core::{ChecklistId, UserId};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VOYAGE: &str = "550e8400-e29b-41d4-a716-446655440001";
const CHECKLIST: &str = "550e8400-e29b-41d4-a716-446655440002";
const TEMPLATE: &str = "550e8400-e29b-41d4-a716-446655440003";

fn test_service(mock_server: &MockServer) -> ChecklistService {
    let config = FleetApiConfig::local_mock(&mock_server.uri(), "test-token").unwrap();
    ChecklistService::new(config).unwrap()
}

fn checklist_id() -> ChecklistId {
    CHECKLIST.parse().unwrap()
}

fn checklist_json(progress: u8) -> serde_json::Value {
    serde_json::json!({
        "id": CHECKLIST,
        "voyage_id": VOYAGE,
        "template_id": TEMPLATE,
        "status": "in_progress",
        "progress_percentage": progress
    })
}

#[tokio::test]
async fn concurrent_reads_collapse_to_one_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(checklist_json(33))
                // Hold the request open so the second caller joins the
                // in-flight fetch instead of finding a cached value.
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = Arc::new(test_service(&mock_server));

    let a = {
        let service = service.clone();
        tokio::spawn(async move { service.checklist(checklist_id()).await })
    };
    let b = {
        let service = service.clone();
        tokio::spawn(async move { service.checklist(checklist_id()).await })
    };

    let first = a.await.unwrap().unwrap();
    let second = b.await.unwrap().unwrap();
    assert_eq!(first.progress_percentage, 33);
    assert_eq!(second.progress_percentage, 33);
    // expect(1) verifies the fetches were deduplicated.
}

#[tokio::test]
async fn repeated_reads_inside_ttl_hit_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(checklist_json(33)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    service.checklist(checklist_id()).await.unwrap();
    service.checklist(checklist_id()).await.unwrap();
    service.checklist(checklist_id()).await.unwrap();
}

#[tokio::test]
async fn save_invalidates_checklist_so_next_read_is_fresh() {
    let mock_server = MockServer::start().await;

    // First read sees 33%; the read after the save must refetch and see
    // the post-save 67%.
    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(checklist_json(33)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("/checklist/{CHECKLIST}/responses")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "summary": {"created": 0, "updated": 1, "total_processed": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(checklist_json(67)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);

    let before = service.checklist(checklist_id()).await.unwrap();
    assert_eq!(before.progress_percentage, 33);

    service
        .save_responses(
            checklist_id(),
            vec![WireResponse::text("eta", "2026-03-01")],
            UserId::new(),
            SaveKind::Auto,
        )
        .await
        .unwrap();

    let after = service.checklist(checklist_id()).await.unwrap();
    assert_eq!(after.progress_percentage, 67);
}

#[tokio::test]
async fn read_racing_a_slow_save_cannot_pin_stale_state() {
    let mock_server = MockServer::start().await;

    // Pre-save state, served to the initial read and to the read that
    // lands while the save is still in flight.
    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(checklist_json(33)))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("/checklist/{CHECKLIST}/responses")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "summary": {"created": 0, "updated": 1, "total_processed": 1}
                }))
                // Keep the save in flight long enough for a read to land
                // in the middle of it.
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(checklist_json(67)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = Arc::new(test_service(&mock_server));

    let before = service.checklist(checklist_id()).await.unwrap();
    assert_eq!(before.progress_percentage, 33);

    let save = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .save_responses(
                    checklist_id(),
                    vec![WireResponse::text("eta", "2026-03-01")],
                    UserId::new(),
                    SaveKind::Auto,
                )
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // This read refetches (the save invalidated on entry) and caches the
    // pre-save state; it must not survive the save's completion.
    let during = service.checklist(checklist_id()).await.unwrap();
    assert_eq!(during.progress_percentage, 33);

    save.await.unwrap().unwrap();

    let after = service.checklist(checklist_id()).await.unwrap();
    assert_eq!(after.progress_percentage, 67);
}

#[tokio::test]
async fn expired_entries_refetch_under_injected_clock() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/checklist/{CHECKLIST}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(checklist_json(33)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let clock = Arc::new(ManualClock::new());
    let config = FleetApiConfig::local_mock(&mock_server.uri(), "test-token").unwrap();
    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let service = ChecklistService::with_clock(config, clock.clone()).unwrap();

    service.checklist(checklist_id()).await.unwrap();
    // Still fresh one second before expiry.
    clock.advance(ttl - Duration::from_secs(1));
    service.checklist(checklist_id()).await.unwrap();
    // Crossing the TTL forces the second fetch.
    clock.advance(Duration::from_secs(2));
    service.checklist(checklist_id()).await.unwrap();
}
