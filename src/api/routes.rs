//! API route definitions
//!
//! - /api/v1/analytics/* - dashboard, trends, benchmarks, cost-benefit
//! - /api/v1/emissions/* - ingestion, listing, latest sample, window analytics
//! - /api/v1/plants - plant registry
//! - /api/v1/recommendations - rule-based recommendations
//! - /api/v1/cost-reduction/* - breakdown, opportunities, fuel, maintenance, carbon tax
//! - /api/v1/optimizations/* - tracking, lifecycle, summary, proposals

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{self, AppState};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/analytics/dashboard", get(handlers::get_dashboard))
        .route("/analytics/trends", get(handlers::get_trends))
        .route("/analytics/comparative", get(handlers::get_comparative))
        .route("/analytics/cost-benefit", get(handlers::get_cost_benefit))
        .route(
            "/emissions",
            get(handlers::list_emissions).post(handlers::create_emission),
        )
        .route("/emissions/latest", get(handlers::latest_emission))
        .route("/emissions/analytics", get(handlers::emissions_analytics))
        .route("/plants", post(handlers::create_plant))
        .route("/plants/:id", get(handlers::get_plant))
        .route("/recommendations", get(handlers::get_recommendations))
        .route("/cost-reduction/analysis", get(handlers::cost_analysis))
        .route("/cost-reduction/opportunities", get(handlers::opportunities))
        .route("/cost-reduction/fuel", get(handlers::fuel_analysis))
        .route("/cost-reduction/maintenance", get(handlers::maintenance_analysis))
        .route("/cost-reduction/carbon-tax", get(handlers::carbon_tax))
        .route(
            "/optimizations",
            get(handlers::list_optimizations).post(handlers::create_optimization),
        )
        // static segments before the :id capture
        .route("/optimizations/summary", get(handlers::optimization_summary))
        .route("/optimizations/proposals", post(handlers::propose_optimizations))
        .route("/optimizations/:id", get(handlers::get_optimization))
        .route(
            "/optimizations/:id/status",
            patch(handlers::update_optimization_status),
        )
        .with_state(state)
}

pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsEngine;
    use crate::config::AnalyticsConfig;
    use crate::service::AnalyticsService;
    use crate::storage::InMemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        AppState::new(AnalyticsService::new(
            AnalyticsEngine::new(Arc::new(AnalyticsConfig::default())),
            Arc::new(InMemoryStore::new()),
        ))
    }

    async fn status_of(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(status_of(health_routes(create_test_state()), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_plant_id_is_bad_request() {
        let app = api_routes(create_test_state());
        assert_eq!(status_of(app, "/analytics/dashboard").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_plant_is_not_found() {
        let app = api_routes(create_test_state());
        assert_eq!(
            status_of(app, "/analytics/comparative?plant_id=ghost").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_summary_route_not_captured_by_id() {
        let app = api_routes(create_test_state());
        assert_eq!(
            status_of(app, "/optimizations/summary?plant_id=p1").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_opportunities_static() {
        let app = api_routes(create_test_state());
        assert_eq!(
            status_of(app, "/cost-reduction/opportunities?category=fuel&priority=high").await,
            StatusCode::OK
        );
    }
}
