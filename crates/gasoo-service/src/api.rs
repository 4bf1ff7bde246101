//! REST API endpoints for the gasoo-service.
//!
//! # Concurrency and Lock Acquisition
//!
//! - **`state.store`** (Mutex): Held for exactly one store call.
//! - **`state.config`** (RwLock): Read-only from handlers.
//! - **`state.valve`** (RwLock): Write lock only while switching the valve.
//! - **`state.simulator.stats`** (RwLock): Cloned by the detailed health check.
//!
//! ## Lock Ordering
//!
//! When multiple locks are needed, acquire in this order:
//! 1. `config`
//! 2. `store`
//! 3. `simulator.stats`
//! 4. `valve`
//!
//! ## Error Handling
//!
//! All endpoints return structured JSON errors via [`AppError`]. Invalid
//! payloads return HTTP 400; store failures return HTTP 500.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, info, warn};

use gasoo_store::DEFAULT_LIST_LIMIT;
use gasoo_types::{NewReading, Reading, ValidationError, ValveState};

use crate::config::StorageBackend;
use crate::state::{AppState, SimulatorStats, ValveStatus};

/// Largest number of readings a single listing returns.
pub const MAX_LIST_LIMIT: u32 = 30;

/// Body of the plain-text liveness check.
pub const LIVENESS_MESSAGE: &str = "Gasoo API is running";

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(liveness))
        // Health and status
        .route("/api/health", get(health))
        .route("/api/health/detailed", get(health_detailed))
        // Readings
        .route("/api/readings", get(list_readings).post(create_reading))
        .route("/api/readings/latest", get(latest_reading))
        // Remote valve
        .route("/api/valve", get(get_valve).put(set_valve))
}

/// Plain-text liveness check.
async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Detailed health check response with diagnostics.
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Store health status
    pub store: StoreHealth,
    /// Simulator health status
    pub simulator: SimulatorHealth,
    /// Current valve position
    pub valve: ValveStatus,
}

/// Store health information.
#[derive(Debug, Serialize)]
pub struct StoreHealth {
    /// Whether the store answered
    pub ok: bool,
    /// Configured backend
    pub backend: StorageBackend,
    /// Number of stored readings
    pub reading_count: Option<u64>,
    /// Error message if the store is not ok
    pub error: Option<String>,
}

/// Simulator health information.
#[derive(Debug, Serialize)]
pub struct SimulatorHealth {
    pub enabled: bool,
    pub running: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    pub interval_secs: u64,
    pub stats: SimulatorStats,
}

/// Detailed health check endpoint.
///
/// Reports `unhealthy` when the store cannot be counted and `degraded` when
/// the simulator is enabled but not running.
async fn health_detailed(State(state): State<Arc<AppState>>) -> Json<DetailedHealthResponse> {
    let (backend, simulation) = {
        let config = state.config.read().await;
        (config.storage.backend, config.simulation.clone())
    };

    let store = {
        let store = state.store.lock().await;
        match store.count() {
            Ok(count) => StoreHealth {
                ok: true,
                backend,
                reading_count: Some(count),
                error: None,
            },
            Err(e) => StoreHealth {
                ok: false,
                backend,
                reading_count: None,
                error: Some(e.to_string()),
            },
        }
    };

    let simulator = SimulatorHealth {
        enabled: simulation.enabled,
        running: state.simulator.is_running(),
        started_at: state.simulator.started_at(),
        interval_secs: simulation.interval_secs,
        stats: state.simulator.stats.read().await.clone(),
    };

    let valve = *state.valve.read().await;

    let status = if !store.ok {
        "unhealthy"
    } else if simulator.enabled && !simulator.running {
        "degraded"
    } else {
        "ok"
    };

    Json(DetailedHealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        store,
        simulator,
        valve,
    })
}

// ==========================================================================
// Reading Endpoints
// ==========================================================================

/// Query parameters for the reading listing.
#[derive(Debug, Deserialize, Default)]
pub struct ReadingsQuery {
    pub limit: Option<u32>,
}

impl ReadingsQuery {
    /// The limit to query with: the requested one, capped at [`MAX_LIST_LIMIT`].
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
    }
}

/// Most recent readings, newest first.
async fn list_readings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadingsQuery>,
) -> Result<Json<Vec<Reading>>, AppError> {
    let limit = params.effective_limit();
    let readings = state.store.lock().await.list(limit)?;
    Ok(Json(readings))
}

/// The newest reading, or `null` when nothing is stored.
async fn latest_reading(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<Reading>>, AppError> {
    let reading = state.store.lock().await.latest()?;
    Ok(Json(reading))
}

/// Store a new reading stamped with the current time.
///
/// # Errors
///
/// - [`AppError::BadRequest`] for bodies that are not a JSON object with a numeric `level`
/// - [`AppError::Validation`] for a missing or out-of-range `level`
/// - [`AppError::Store`] if the store fails
async fn create_reading(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewReading>, JsonRejection>,
) -> Result<(StatusCode, Json<Reading>), AppError> {
    let Json(payload) = payload?;
    let level = payload.validate()?;

    let reading = state.store.lock().await.insert(level)?;
    info!("Stored reading {} (level={:.1}%)", reading.id, reading.level);

    Ok((StatusCode::CREATED, Json(reading)))
}

// ==========================================================================
// Valve Endpoints
// ==========================================================================

/// Request to switch the valve.
#[derive(Debug, Clone, Deserialize)]
pub struct ValveRequest {
    pub state: ValveState,
    /// Must be `true` to close the valve.
    #[serde(default)]
    pub confirm: bool,
}

/// Current valve position.
async fn get_valve(State(state): State<Arc<AppState>>) -> Json<ValveStatus> {
    Json(*state.valve.read().await)
}

/// Open or close the valve.
///
/// Opening takes effect immediately. Closing shuts off the supply, so it is
/// refused unless the request carries `"confirm": true`.
async fn set_valve(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValveRequest>, JsonRejection>,
) -> Result<Json<ValveStatus>, AppError> {
    let Json(request) = payload?;

    if request.state == ValveState::Closed && !request.confirm {
        return Err(AppError::BadRequest(
            "Closing the valve requires \"confirm\": true".to_string(),
        ));
    }

    let mut valve = state.valve.write().await;
    if valve.set(request.state) {
        info!("Valve switched {}", request.state);
    }

    Ok(Json(*valve))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Validation(ValidationError),
    Store(gasoo_store::Error),
}

impl From<gasoo_store::Error> for AppError {
    fn from(e: gasoo_store::Error) -> Self {
        match e {
            gasoo_store::Error::Validation(v) => AppError::Validation(v),
            other => AppError::Store(other),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::Validation(e) => {
                warn!("Rejected reading: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Store(e) => {
                error!("Store failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
