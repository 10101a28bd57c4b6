//! End-to-end flows against a mocked reflection backend.
//!
//! Poll delays are shrunk to milliseconds so the cycle runs on the real clock.

use reflect_core::config::{ApiConfig, PollerConfig};
use reflect_core::history::{reflection_detail, recent_reflections};
use reflect_core::insights::{sections, InsightKind};
use reflect_core::poller::PollState;
use reflect_core::progress::load_progress;
use reflect_core::{DashboardSession, HttpReflectionClient, Prompt, ReflectionApi, ReflectionDraft};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_config() -> ApiConfig {
    ApiConfig {
        base_url: String::new(),
        auth_token: None,
        timeout_seconds: 5,
        max_retries: 1,
        retry_delay_ms: 5,
    }
}

fn fast_poller() -> PollerConfig {
    PollerConfig {
        initial_delay_ms: 10,
        retry_delay_ms: 20,
        max_attempts: 10,
    }
}

fn client(server: &MockServer) -> Arc<dyn ReflectionApi> {
    Arc::new(
        HttpReflectionClient::with_base_url(api_config(), server.uri())
            .expect("Failed to create client"),
    )
}

fn reflection_json(id: &str, date: &str) -> serde_json::Value {
    json!({
        "id": id,
        "reflectionDate": date,
        "daySummary": "Calm",
        "socialMediaTime": "20 minutes",
        "truthfulnessKindness": "Kind to a colleague",
        "consciousActions": "Paused before replying",
        "overthinkingStress": "Deadline",
        "gratitudeExpression": "Thanked my sister",
        "proudMoment": "Finished the report"
    })
}

fn analysis_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "reflectionId": "r-1",
        "analysisText": "You stayed present.\n\nPatterns:\n- patience\n- honesty",
        "recommendations": "Try:\n1. Walk\n1. Stretch",
        "motivationalMessage": "Proud of you."
    })
}

fn draft() -> ReflectionDraft {
    let mut draft = ReflectionDraft::default();
    for prompt in Prompt::ALL {
        draft.set(prompt, "something honest");
    }
    draft
}

// ===========================================================================
// TEST 1: submit -> poll -> analysis rendered
// ===========================================================================
#[tokio::test]
async fn test_submission_polls_until_analysis_arrives() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reflections/today"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "exists": false })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/reflections"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "reflection": reflection_json("r-1", "2026-03-14T21:00:00Z")
        })))
        .expect(1)
        .mount(&server)
        .await;

    // One null for the initial load, two for the first poll attempts.
    Mock::given(method("GET"))
        .and(path("/analysis/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "analysis": null })))
        .up_to_n_times(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/analysis/latest"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "analysis": analysis_json("a-1") })),
        )
        .mount(&server)
        .await;

    let dashboard = DashboardSession::new(client(&server), fast_poller());
    dashboard.load().await;
    assert!(dashboard.state().can_start_reflection());
    assert!(dashboard.state().latest_analysis.is_none());

    let created = dashboard.submit(&draft()).await.expect("submit should succeed");
    assert_eq!(created.id, "r-1");
    assert!(dashboard.state().analysis_loading());

    let done = dashboard.wait_for_analysis().await;
    assert_eq!(done.poll.attempts(), 3);
    assert!(matches!(done.poll, PollState::Found { .. }));

    let analysis = done.latest_analysis.expect("analysis should be set");
    let rendered = sections(&analysis);
    assert_eq!(rendered.len(), 3);
    assert_eq!(rendered[0].kind, InsightKind::KeyInsights);
    assert_eq!(rendered[0].blocks.len(), 2);

    let steps: Vec<(usize, &str)> = rendered[1].blocks[0].numbered_items().collect();
    assert_eq!(steps, vec![(1, "Walk"), (2, "Stretch")]);
}

// ===========================================================================
// TEST 2: backend keeps failing -> one request per attempt, cycle exhausts quietly
// ===========================================================================
#[tokio::test]
async fn test_polling_errors_exhaust_without_surfacing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reflections"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "reflection": reflection_json("r-1", "2026-03-14T21:00:00Z")
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/analysis/latest"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "queue down" })))
        .expect(4)
        .mount(&server)
        .await;

    let config = PollerConfig {
        max_attempts: 3,
        ..fast_poller()
    };
    let dashboard = DashboardSession::new(client(&server), config);

    dashboard.submit(&draft()).await.expect("submit should succeed");
    let done = dashboard.wait_for_analysis().await;

    assert_eq!(done.poll, PollState::Exhausted { attempts: 4 });
    let requests = server.received_requests().await.unwrap_or_default();
    let polls = requests
        .iter()
        .filter(|r| r.url.path() == "/analysis/latest")
        .count();
    assert_eq!(polls, 4);
    assert!(done.latest_analysis.is_none());
    assert!(done.today_reflection_exists);
}

// ===========================================================================
// TEST 3: history list + detail + progress
// ===========================================================================
#[tokio::test]
async fn test_history_detail_and_progress() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reflections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reflections": [
                reflection_json("r-2", "2026-03-15T21:00:00Z"),
                reflection_json("r-1", "2026-03-14T21:00:00Z")
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/analysis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analyses": [analysis_json("a-1")]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/analysis/reflection/r-2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "not found" })))
        .mount(&server)
        .await;

    let api = client(&server);

    let reflections = recent_reflections(api.as_ref(), 30).await.unwrap();
    assert_eq!(reflections.len(), 2);
    assert_eq!(reflections[0].id, "r-2");

    let detail = reflection_detail(api.as_ref(), reflections[0].clone()).await;
    assert!(detail.analysis.is_none());
    assert_eq!(detail.answers()[6].1, "Finished the report");

    let progress = load_progress(api.as_ref(), 30).await.unwrap();
    assert_eq!(progress.total_reflections, 2);
    assert_eq!(progress.insights_received, 1);
    let labels: Vec<&str> = progress.activity.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["Mar 14", "Mar 15"]);
}
