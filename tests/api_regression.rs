//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the /api/v1/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use carbonwatch::analytics::AnalyticsEngine;
use carbonwatch::api::{create_app, AppState};
use carbonwatch::config::AnalyticsConfig;
use carbonwatch::service::AnalyticsService;
use carbonwatch::storage::InMemoryStore;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_app() -> Router {
    let service = AnalyticsService::new(
        AnalyticsEngine::new(Arc::new(AnalyticsConfig::default())),
        Arc::new(InMemoryStore::new()),
    );
    create_app(AppState::new(service))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register_plant(app: &Router, id: &str) {
    let (status, _) = send(
        app,
        "POST",
        "/api/v1/plants",
        Some(json!({
            "id": id,
            "name": "Ridgeback Station",
            "plantType": "coal",
            "capacityMW": 600.0,
            "efficiencyBaseline": 36.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

/// Twelve daily samples ending one hour ago, CO2 climbing 100 kg per day.
async fn post_daily_emissions(app: &Router, plant_id: &str) {
    let now = Utc::now();
    for day in 0..12_i64 {
        let ts = now - Duration::hours(1) - Duration::days(11 - day);
        #[allow(clippy::cast_precision_loss)]
        let co2 = 400_000.0 + 100.0 * day as f64;
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/emissions",
            Some(json!({
                "plantId": plant_id,
                "timestamp": ts.to_rfc3339(),
                "emissions": { "co2": { "value": co2, "unit": "kg" } },
                "powerGeneration": { "value": 500.0, "unit": "MWh" },
                "efficiency": { "overall": 37.0 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "ingest failed: {body}");
    }
}

// ============================================================================
// Health and envelope
// ============================================================================

#[tokio::test]
async fn health_reports_storage_backend() {
    let app = create_test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["storage"], "InMemory");
    assert_eq!(body["meta"]["version"], "1");
}

#[tokio::test]
async fn unknown_plant_is_not_found_envelope() {
    let app = create_test_app();
    let (status, body) = send(&app, "GET", "/api/v1/plants/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn malformed_body_is_bad_request_envelope() {
    let app = create_test_app();
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/plants")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn emission_for_unregistered_plant_rejected() {
    let app = create_test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/emissions",
        Some(json!({
            "plantId": "nowhere",
            "timestamp": Utc::now().to_rfc3339(),
            "emissions": { "co2": { "value": 10.0 } },
            "powerGeneration": { "value": 1.0, "unit": "MWh" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn negative_emission_rejected() {
    let app = create_test_app();
    register_plant(&app, "p-neg").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/emissions",
        Some(json!({
            "plantId": "p-neg",
            "timestamp": Utc::now().to_rfc3339(),
            "emissions": { "co2": { "value": -10.0 } },
            "powerGeneration": { "value": 1.0, "unit": "MWh" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// ============================================================================
// Analytics
// ============================================================================

#[tokio::test]
async fn dashboard_aggregates_window() {
    let app = create_test_app();
    register_plant(&app, "p1").await;
    post_daily_emissions(&app, "p1").await;

    let (status, body) = send(&app, "GET", "/api/v1/analytics/dashboard?plant_id=p1&period=30d", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["emissions"]["count"], 12);
    let total_co2 = data["emissions"]["totalCo2"].as_f64().unwrap();
    assert!((total_co2 - 4_806_600.0).abs() < 1e-6);
    assert_eq!(data["timeSeries"].as_array().unwrap().len(), 12);
    assert_eq!(data["plant"]["id"], "p1");
    // 400_000 kg over 500 MWh
    let intensity = data["emissions"]["avgCarbonIntensity"].as_f64().unwrap();
    assert!(intensity > 800.0 && intensity < 803.0);
}

#[tokio::test]
async fn dashboard_for_empty_plant_is_zeroed() {
    let app = create_test_app();
    register_plant(&app, "quiet").await;
    let (status, body) = send(&app, "GET", "/api/v1/analytics/dashboard?plant_id=quiet", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["emissions"]["count"], 0);
    assert!(body["data"]["timeSeries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn trends_detect_rise_and_forecast() {
    let app = create_test_app();
    register_plant(&app, "p2").await;
    post_daily_emissions(&app, "p2").await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/analytics/trends?plant_id=p2&metric=co2&forecast_days=7",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["historical"].as_array().unwrap().len(), 12);
    assert_eq!(data["forecast"]["points"].as_array().unwrap().len(), 7);
    assert!(data["forecast"].get("fallback").is_none());

    let first = data["forecast"]["points"][0]["value"].as_f64().unwrap();
    let last = data["forecast"]["points"][6]["value"].as_f64().unwrap();
    assert!(last > first, "rising series should forecast upward");
}

#[tokio::test]
async fn trends_with_sparse_history_flag_insufficient_data() {
    let app = create_test_app();
    register_plant(&app, "p3").await;
    let (status, body) = send(&app, "GET", "/api/v1/analytics/trends?plant_id=p3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["forecast"]["fallback"], "insufficient_data");
    assert!(body["data"]["forecast"]["points"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bad_metric_is_bad_request() {
    let app = create_test_app();
    register_plant(&app, "p4").await;
    let (status, _) = send(&app, "GET", "/api/v1/analytics/trends?plant_id=p4&metric=sulfur", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cost_benefit_requires_a_subject() {
    let app = create_test_app();
    let (status, _) = send(&app, "GET", "/api/v1/analytics/cost-benefit", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comparative_and_cost_reduction_endpoints_answer() {
    let app = create_test_app();
    register_plant(&app, "p5").await;
    post_daily_emissions(&app, "p5").await;

    for uri in [
        "/api/v1/analytics/comparative?plant_id=p5",
        "/api/v1/recommendations?plant_id=p5",
        "/api/v1/cost-reduction/analysis?plant_id=p5&period=7d",
        "/api/v1/cost-reduction/fuel?plant_id=p5",
        "/api/v1/cost-reduction/maintenance?plant_id=p5",
        "/api/v1/cost-reduction/carbon-tax?plant_id=p5",
        "/api/v1/emissions/latest?plant_id=p5",
        "/api/v1/emissions/analytics?plant_id=p5",
        "/api/v1/emissions?plant_id=p5&limit=5",
    ] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "GET {uri}: {body}");
    }
}

#[tokio::test]
async fn emissions_list_pages_newest_first() {
    let app = create_test_app();
    register_plant(&app, "p6").await;
    post_daily_emissions(&app, "p6").await;

    let (status, body) = send(&app, "GET", "/api/v1/emissions?plant_id=p6&page=2&limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["current"], 2);
    assert_eq!(pagination["pages"], 3);
    assert_eq!(pagination["total"], 12);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 5);

    let (status, _) = send(&app, "GET", "/api/v1/emissions?plant_id=p6&limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Optimization lifecycle
// ============================================================================

async fn create_optimization(app: &Router, plant_id: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/optimizations",
        Some(json!({
            "plantId": plant_id,
            "optimizationType": "efficiency_improvement",
            "title": "Turbine blade upgrade",
            "improvements": { "costSavings": { "annual": 25_000.0 } },
            "implementation": { "cost": { "total": 100_000.0 } },
            "priority": "high",
            "confidence": 80
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "proposed");
    let payback = body["data"]["roi"]["paybackPeriod"].as_f64().unwrap();
    assert!((payback - 4.0).abs() < 1e-9);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn set_status(app: &Router, id: &str, status: &str) -> (StatusCode, Value) {
    send(
        app,
        "PATCH",
        &format!("/api/v1/optimizations/{id}/status"),
        Some(json!({ "status": status })),
    )
    .await
}

#[tokio::test]
async fn optimization_walks_full_lifecycle() {
    let app = create_test_app();
    register_plant(&app, "p7").await;
    let id = create_optimization(&app, "p7").await;

    for next in ["under_review", "approved", "in_progress", "completed"] {
        let (status, body) = set_status(&app, &id, next).await;
        assert_eq!(status, StatusCode::OK, "to {next}: {body}");
        assert_eq!(body["data"]["status"], next);
    }

    let (status, body) = set_status(&app, &id, "rejected").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    let (status, body) = send(&app, "GET", &format!("/api/v1/optimizations/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
}

#[tokio::test]
async fn skipping_lifecycle_steps_is_rejected() {
    let app = create_test_app();
    register_plant(&app, "p8").await;
    let id = create_optimization(&app, "p8").await;

    let (status, body) = set_status(&app, &id, "completed").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    // Proposed may jump straight to approved
    let (status, _) = set_status(&app, &id, "approved").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn optimization_summary_counts_window() {
    let app = create_test_app();
    register_plant(&app, "p9").await;
    let first = create_optimization(&app, "p9").await;
    create_optimization(&app, "p9").await;
    for next in ["approved", "in_progress", "completed"] {
        set_status(&app, &first, next).await;
    }

    let (status, body) = send(&app, "GET", "/api/v1/optimizations/summary?plant_id=p9", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["summary"]["total"], 2);
    assert_eq!(body["data"]["summary"]["implemented"], 1);

    let (status, body) = send(&app, "GET", "/api/v1/optimizations?plant_id=p9&status=completed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn proposals_are_not_persisted() {
    let app = create_test_app();
    register_plant(&app, "p10").await;
    post_daily_emissions(&app, "p10").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/optimizations/proposals",
        Some(json!({ "plantId": "p10" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, listed) = send(&app, "GET", "/api/v1/optimizations?plant_id=p10", None).await;
    assert_eq!(listed["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn created_optimization_recomputes_supplied_roi() {
    let app = create_test_app();
    register_plant(&app, "p11").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/optimizations",
        Some(json!({
            "plantId": "p11",
            "optimizationType": "cost_reduction",
            "title": "Paper savings",
            "implementation": { "cost": { "total": 100_000.0 } },
            "roi": { "paybackPeriod": 1.0, "benefitCostRatio": 5.0 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"]["roi"]["paybackPeriod"].is_null());
    assert_eq!(body["data"]["roi"]["benefitCostRatio"], 0.0);

    let id = body["data"]["id"].as_str().unwrap();
    let (status, body) = send(&app, "GET", &format!("/api/v1/analytics/cost-benefit?optimization_id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["paybackPeriod"].is_null());
    assert_eq!(
        body["data"]["recommendation"],
        "Not recommended - Poor ROI or long payback period"
    );
}

#[tokio::test]
async fn negative_savings_rejected() {
    let app = create_test_app();
    register_plant(&app, "p12").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/optimizations",
        Some(json!({
            "plantId": "p12",
            "optimizationType": "cost_reduction",
            "title": "Loss maker",
            "improvements": { "costSavings": { "annual": -5_000.0 } }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
