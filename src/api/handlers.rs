//! API route handlers
//!
//! Handlers parse query strings and bodies, call the service, and wrap the
//! result in the envelope. Parsing failures surface as `400` envelopes rather
//! than axum's plain-text rejections.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::envelope::ApiResponse;
use crate::analytics::cost_reduction::OpportunityCategory;
use crate::analytics::SeriesMetric;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::service::{AnalyticsService, OptimizationFilter};
use crate::storage::RecordQuery;
use crate::types::{
    EmissionRecord, OptimizationRecommendation, OptimizationStatus, OptimizationType, PeriodWindow,
    Plant, Priority,
};

const DEFAULT_EMISSIONS_PAGE_SIZE: usize = 50;
const DEFAULT_OPTIMIZATIONS_PAGE_SIZE: usize = 20;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub service: AnalyticsService,
}

impl AppState {
    pub fn new(service: AnalyticsService) -> Self {
        Self { service }
    }
}

// ============================================================================
// Parameter parsing
// ============================================================================

fn required<'a>(value: Option<&'a str>, name: &str) -> AnalyticsResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AnalyticsError::InvalidInput(format!("{name} is required")))
}

fn parse_opt<T>(value: Option<&str>, name: &str) -> AnalyticsResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| AnalyticsError::InvalidInput(format!("{name}: {e}")))
        })
        .transpose()
}

/// Enum parameters share their JSON spelling.
fn parse_enum<T: serde::de::DeserializeOwned>(value: Option<&str>, name: &str) -> AnalyticsResult<Option<T>> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            serde_json::from_value(serde_json::Value::String(v.to_string()))
                .map_err(|_| AnalyticsError::InvalidInput(format!("{name}: unknown value '{v}'")))
        })
        .transpose()
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AnalyticsResult<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| AnalyticsError::InvalidInput(e.body_text()))
}

fn respond<T: Serialize>(result: AnalyticsResult<T>) -> Response {
    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => e.into_response(),
    }
}

fn respond_created<T: Serialize>(result: AnalyticsResult<T>) -> Response {
    match result {
        Ok(data) => ApiResponse::created(data),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Query strings
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PlantPeriodQuery {
    pub plant_id: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlantQuery {
    pub plant_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendsQuery {
    pub plant_id: Option<String>,
    pub metric: Option<String>,
    pub forecast_days: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CostBenefitQuery {
    pub plant_id: Option<String>,
    pub optimization_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmissionsQuery {
    pub plant_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpportunityQuery {
    pub category: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptimizationListQuery {
    pub plant_id: Option<String>,
    #[serde(rename = "type")]
    pub optimization_type: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OptimizationStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    #[serde(alias = "plant_id")]
    pub plant_id: String,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub async fn health(State(state): State<AppState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        storage: state.service.backend_name(),
        timestamp: Utc::now(),
    })
}

// ============================================================================
// Analytics
// ============================================================================

pub async fn get_dashboard(State(state): State<AppState>, Query(q): Query<PlantPeriodQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            let period = PeriodWindow::parse(q.period.as_deref());
            state.service.dashboard(plant_id, period, Utc::now()).await
        }
        .await,
    )
}

pub async fn get_trends(State(state): State<AppState>, Query(q): Query<TrendsQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            let metric: SeriesMetric = parse_opt(q.metric.as_deref(), "metric")?.unwrap_or_default();
            let days: Option<u32> = parse_opt(q.forecast_days.as_deref(), "forecast_days")?;
            state.service.trends(plant_id, metric, days).await
        }
        .await,
    )
}

pub async fn get_comparative(State(state): State<AppState>, Query(q): Query<PlantQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            state.service.comparative(plant_id).await
        }
        .await,
    )
}

pub async fn get_cost_benefit(State(state): State<AppState>, Query(q): Query<CostBenefitQuery>) -> Response {
    respond(
        state
            .service
            .cost_benefit(q.plant_id.as_deref(), q.optimization_id.as_deref())
            .await,
    )
}

pub async fn get_recommendations(State(state): State<AppState>, Query(q): Query<PlantQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            state.service.recommendations(plant_id, Utc::now()).await
        }
        .await,
    )
}

// ============================================================================
// Emissions and plants
// ============================================================================

pub async fn list_emissions(State(state): State<AppState>, Query(q): Query<EmissionsQuery>) -> Response {
    respond(
        async {
            let query = RecordQuery {
                plant_id: q.plant_id.clone().filter(|p| !p.trim().is_empty()),
                start: parse_opt::<DateTime<Utc>>(q.start.as_deref(), "start")?,
                end: parse_opt::<DateTime<Utc>>(q.end.as_deref(), "end")?,
            };
            let page: usize = parse_opt(q.page.as_deref(), "page")?.unwrap_or(1);
            let limit: usize = parse_opt(q.limit.as_deref(), "limit")?.unwrap_or(DEFAULT_EMISSIONS_PAGE_SIZE);
            state.service.list_emissions(query, page, limit).await
        }
        .await,
    )
}

pub async fn latest_emission(State(state): State<AppState>, Query(q): Query<PlantQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            state.service.latest_emission(plant_id).await
        }
        .await,
    )
}

pub async fn emissions_analytics(State(state): State<AppState>, Query(q): Query<EmissionsQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            let start: Option<DateTime<Utc>> = parse_opt(q.start.as_deref(), "start")?;
            let end: Option<DateTime<Utc>> = parse_opt(q.end.as_deref(), "end")?;
            state.service.emissions_analytics(plant_id, start, end).await
        }
        .await,
    )
}

pub async fn create_emission(
    State(state): State<AppState>,
    payload: Result<Json<EmissionRecord>, JsonRejection>,
) -> Response {
    respond_created(
        async {
            let record = body(payload)?;
            state.service.ingest_record(record).await
        }
        .await,
    )
}

pub async fn create_plant(
    State(state): State<AppState>,
    payload: Result<Json<Plant>, JsonRejection>,
) -> Response {
    respond_created(async { state.service.create_plant(body(payload)?).await }.await)
}

pub async fn get_plant(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    respond(state.service.get_plant(&id).await)
}

// ============================================================================
// Cost reduction
// ============================================================================

pub async fn cost_analysis(State(state): State<AppState>, Query(q): Query<PlantPeriodQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            let period = PeriodWindow::parse(q.period.as_deref());
            state.service.cost_analysis(plant_id, period, Utc::now()).await
        }
        .await,
    )
}

pub async fn opportunities(State(state): State<AppState>, Query(q): Query<OpportunityQuery>) -> Response {
    respond(
        async {
            let category: Option<OpportunityCategory> = parse_opt(q.category.as_deref(), "category")?;
            let priority: Option<Priority> = parse_enum(q.priority.as_deref(), "priority")?;
            Ok::<_, AnalyticsError>(state.service.opportunities(category, priority))
        }
        .await,
    )
}

pub async fn fuel_analysis(State(state): State<AppState>, Query(q): Query<PlantQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            state.service.fuel_analysis(plant_id).await
        }
        .await,
    )
}

pub async fn maintenance_analysis(State(state): State<AppState>, Query(q): Query<PlantQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            state.service.maintenance_analysis(plant_id, Utc::now()).await
        }
        .await,
    )
}

pub async fn carbon_tax(State(state): State<AppState>, Query(q): Query<PlantQuery>) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            state.service.carbon_tax(plant_id).await
        }
        .await,
    )
}

// ============================================================================
// Optimizations
// ============================================================================

pub async fn list_optimizations(
    State(state): State<AppState>,
    Query(q): Query<OptimizationListQuery>,
) -> Response {
    respond(
        async {
            let filter = OptimizationFilter {
                plant_id: q.plant_id.clone().filter(|p| !p.trim().is_empty()),
                optimization_type: parse_enum::<OptimizationType>(q.optimization_type.as_deref(), "type")?,
                status: parse_opt::<OptimizationStatus>(q.status.as_deref(), "status")?,
                priority: parse_enum(q.priority.as_deref(), "priority")?,
            };
            let page: usize = parse_opt(q.page.as_deref(), "page")?.unwrap_or(1);
            let limit: usize = parse_opt(q.limit.as_deref(), "limit")?.unwrap_or(DEFAULT_OPTIMIZATIONS_PAGE_SIZE);
            state.service.list_optimizations(&filter, page, limit).await
        }
        .await,
    )
}

pub async fn create_optimization(
    State(state): State<AppState>,
    payload: Result<Json<OptimizationRecommendation>, JsonRejection>,
) -> Response {
    respond_created(
        async {
            let opt = body(payload)?;
            state.service.create_optimization(opt, Utc::now()).await
        }
        .await,
    )
}

pub async fn get_optimization(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    respond(state.service.get_optimization(&id).await)
}

pub async fn update_optimization_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusChange>, JsonRejection>,
) -> Response {
    respond(
        async {
            let change = body(payload)?;
            state.service.update_status(&id, change.status).await
        }
        .await,
    )
}

pub async fn optimization_summary(
    State(state): State<AppState>,
    Query(q): Query<PlantPeriodQuery>,
) -> Response {
    respond(
        async {
            let plant_id = required(q.plant_id.as_deref(), "plant_id")?;
            let period = PeriodWindow::parse(q.period.as_deref());
            state.service.optimization_summary(plant_id, period, Utc::now()).await
        }
        .await,
    )
}

pub async fn propose_optimizations(
    State(state): State<AppState>,
    payload: Result<Json<ProposalRequest>, JsonRejection>,
) -> Response {
    respond(
        async {
            let request = body(payload)?;
            state.service.propose_optimizations(&request.plant_id, Utc::now()).await
        }
        .await,
    )
}
