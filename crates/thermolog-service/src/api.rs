//! REST API endpoints for the thermolog service.
//!
//! # Concurrency and Lock Acquisition
//!
//! All async handlers that access shared state acquire locks in a
//! consistent order:
//!
//! - **`state.config`** (cache): read first when a handler needs the
//!   runtime configuration for a query.
//! - **`state.store`** (Mutex): acquired for database operations. Held
//!   briefly during queries; never across sensor reads or waits.
//!
//! # Error Handling
//!
//! All endpoints return structured JSON errors via [`AppError`], shaped
//! as `{ "success": false, "message": ... }`. Malformed dates and week
//! labels return 400, missing data 404, sensor unavailability 503, and
//! storage failures 500.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::parse_owned;
use tracing::{info, warn};

use thermolog_types::{AppConfig, Reading};

use crate::poller::Poller;
use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Health
        .route("/api/health", get(health))
        // Sensor data
        .route("/api/sensor/all", get(get_all_readings))
        .route("/api/sensor/monthly/{year}/{month}", get(get_monthly))
        .route("/api/sensor/weekly/{week}", get(get_weekly))
        .route("/api/sensor/daily/{day}/{month}/{year}", get(get_daily))
        .route("/api/sensor/range/{start}/{end}", get(get_range))
        .route("/api/sensor/current", get(get_current))
        // Data extent
        .route("/api/daterange", get(get_date_range))
        .route("/api/daterange/weeks", get(get_week_range))
        .route("/api/daterange/months", get(get_month_range))
        // Statistics
        .route("/api/statistics", get(get_statistics))
        // Error log
        .route("/api/logs", get(get_logs).delete(delete_all_logs))
        .route("/api/logs/{timestamp}", delete(delete_logs_by_timestamp))
        // Runtime configuration
        .route("/api/config", get(get_config).put(update_config))
        // Database download
        .route("/api/dump", get(dump_database))
        // Poller control
        .route("/api/poller/start", post(poller_start))
        .route("/api/poller/stop", post(poller_stop))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub poller_running: bool,
    /// When the poller was last started, if it ever was.
    #[serde(with = "time::serde::rfc3339::option")]
    pub poller_started_at: Option<OffsetDateTime>,
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        poller_running: state.poller.is_running(),
        poller_started_at: state.poller.started_at(),
    })
}

/// Result of a state-changing action, mirrored in every mutation
/// response.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

// ==========================================================================
// Sensor data
// ==========================================================================

/// Daily averages over the full stored history.
async fn get_all_readings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.lock().await;
    let readings = store.all_readings()?;
    Ok(Json(readings))
}

/// Daily averages for one calendar month.
async fn get_monthly(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u8)>,
) -> Result<impl IntoResponse, AppError> {
    let cfg = state.config.current().await;
    let store = state.store.lock().await;
    let readings = store.readings_for_month(year, month, &cfg)?;
    Ok(Json(readings))
}

/// One ISO week of daily averages, gap-filled to 7 buckets.
async fn get_weekly(
    State(state): State<Arc<AppState>>,
    Path(week): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cfg = state.config.current().await;
    let store = state.store.lock().await;
    let series = store.readings_for_week(&week, &cfg)?;
    Ok(Json(series))
}

/// Every reading of one calendar day at full resolution.
async fn get_daily(
    State(state): State<Arc<AppState>>,
    Path((day, month, year)): Path<(u8, u8, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let cfg = state.config.current().await;
    let store = state.store.lock().await;
    let readings = store.readings_for_date(day, month, year, &cfg)?;
    Ok(Json(readings))
}

/// Daily averages over an inclusive date range.
async fn get_range(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let cfg = state.config.current().await;
    let store = state.store.lock().await;
    let readings = store.readings_for_range(&start, &end, &cfg)?;
    Ok(Json(readings))
}

/// Out-of-band live read straight from the sensor, bypassing the store.
async fn get_current(State(state): State<Arc<AppState>>) -> Result<Json<Reading>, AppError> {
    let Some(sensor) = state.sensor.as_ref() else {
        return Err(AppError::SensorUnavailable(
            "no sensor available on this platform".to_string(),
        ));
    };

    match sensor.read().await {
        Ok(Some(reading)) => Ok(Json(reading)),
        Ok(None) => Err(AppError::SensorUnavailable(
            "sensor produced no reading".to_string(),
        )),
        Err(e) => Err(AppError::SensorUnavailable(e.to_string())),
    }
}

// ==========================================================================
// Data extent
// ==========================================================================

/// First and last stored dates.
async fn get_date_range(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let cfg = state.config.current().await;
    let store = state.store.lock().await;
    Ok(Json(store.date_range(&cfg)?))
}

/// The stored extent as ISO week labels.
async fn get_week_range(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let cfg = state.config.current().await;
    let store = state.store.lock().await;
    Ok(Json(store.week_range(&cfg)?))
}

/// The stored extent as month labels.
async fn get_month_range(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let cfg = state.config.current().await;
    let store = state.store.lock().await;
    Ok(Json(store.month_range(&cfg)?))
}

// ==========================================================================
// Statistics
// ==========================================================================

/// Whole-history aggregate statistics.
async fn get_statistics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.statistics()?))
}

// ==========================================================================
// Error log
// ==========================================================================

/// All log entries, ascending by timestamp.
async fn get_logs(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.all_logs()?))
}

/// Delete the whole error log.
async fn delete_all_logs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActionResponse>, AppError> {
    let store = state.store.lock().await;
    let deleted = store.delete_all_logs()?;
    Ok(Json(ActionResponse {
        success: true,
        message: format!("Deleted {} log entries", deleted),
    }))
}

/// Delete every log entry with an exact timestamp match. Deleting
/// nothing is still a success.
async fn delete_logs_by_timestamp(
    State(state): State<Arc<AppState>>,
    Path(timestamp): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let store = state.store.lock().await;
    let deleted = store.delete_logs_by_timestamp(&timestamp)?;
    Ok(Json(ActionResponse {
        success: true,
        message: format!("Deleted {} log entries", deleted),
    }))
}

// ==========================================================================
// Runtime configuration
// ==========================================================================

/// The current runtime configuration, read from the cache.
async fn get_config(State(state): State<Arc<AppState>>) -> Json<AppConfig> {
    Json(state.config.current().await)
}

/// Replace the runtime configuration.
///
/// Ordering matters: the row is persisted and the cache reloaded first,
/// then the poller is restarted (or stopped) so it picks up the new
/// interval and sensor flag, and only then is the change signal fired
/// for any other subscriber.
#[axum::debug_handler]
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(new_config): Json<AppConfig>,
) -> Result<Json<ActionResponse>, AppError> {
    {
        let mut store = state.store.lock().await;
        state.config.update(&mut store, &new_config).await?;
    }
    info!(
        "Configuration updated: interval {}s, use_sensor {}",
        new_config.sensor_interval, new_config.use_sensor
    );

    let poller = Poller::new(Arc::clone(&state));
    if new_config.use_sensor {
        poller.stop().await;
        poller.start().await;
    } else {
        poller.stop().await;
    }

    state.config.signal_changed();

    Ok(Json(ActionResponse {
        success: true,
        message: "Configuration updated".to_string(),
    }))
}

// ==========================================================================
// Database download
// ==========================================================================

/// Attachment filename timestamp layout for the database dump.
const DUMP_STAMP_FORMAT: &str = "[day][month][year][hour][minute][second]";

/// Download the raw SQLite database file.
///
/// The store stays open, but under WAL mode recent commits live in the
/// `-wal` sidecar, so the log is checkpointed into the main file before
/// it is read; otherwise the download would miss everything since the
/// last checkpoint.
async fn dump_database(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    {
        let store = state.store.lock().await;
        store.checkpoint()?;
    }

    let bytes = tokio::fs::read(&state.db_path)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read database file: {}", e)))?;

    let stamp_fmt = parse_owned::<2>(DUMP_STAMP_FORMAT)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let stamp = OffsetDateTime::now_utc()
        .format(&stamp_fmt)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"thermolog-{}.db\"", stamp),
        ),
    ];

    Ok((headers, bytes))
}

// ==========================================================================
// Poller control
// ==========================================================================

/// Start the background poller. No-op when already running or no sensor
/// exists.
async fn poller_start(State(state): State<Arc<AppState>>) -> Json<ActionResponse> {
    let poller = Poller::new(Arc::clone(&state));
    let started = poller.start().await;
    Json(ActionResponse {
        success: true,
        message: if started {
            "Poller started".to_string()
        } else {
            "Poller already running or unavailable".to_string()
        },
    })
}

/// Stop the background poller. No-op when not running.
async fn poller_stop(State(state): State<Arc<AppState>>) -> Json<ActionResponse> {
    let poller = Poller::new(Arc::clone(&state));
    let stopped = poller.stop().await;
    Json(ActionResponse {
        success: true,
        message: if stopped {
            "Poller stopped".to_string()
        } else {
            "Poller not running".to_string()
        },
    })
}

// ==========================================================================
// Errors
// ==========================================================================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    SensorUnavailable(String),
    Store(thermolog_store::Error),
    Internal(String),
}

impl From<thermolog_store::Error> for AppError {
    fn from(e: thermolog_store::Error) -> Self {
        use thermolog_store::Error;
        match e {
            Error::InvalidDateFormat(_) | Error::InvalidWeekLabel(_) => {
                AppError::BadRequest(e.to_string())
            }
            Error::NoData => AppError::NotFound(e.to_string()),
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::SensorUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Store(e) => {
                warn!("Storage error in handler: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "success": false,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use thermolog_sensor::{MockSensor, Sensor};
    use thermolog_store::Store;

    use crate::config::Config;

    async fn create_test_state() -> Arc<AppState> {
        create_test_state_with_sensor(None).await
    }

    async fn create_test_state_with_sensor(sensor: Option<Arc<dyn Sensor>>) -> Arc<AppState> {
        let store = Store::open_in_memory().unwrap();
        let state = AppState::new(store, PathBuf::from(":memory:"), Config::default(), sensor);
        {
            let store = state.store.lock().await;
            state.config.initialize(&store).await.unwrap();
        }
        state
    }

    async fn response_body(response: axum::response::Response) -> String {
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = create_test_state().await;
        let app = router().with_state(state);

        let response = get(app, "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["poller_running"], false);
        assert_eq!(json["poller_started_at"], serde_json::Value::Null);
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn test_all_readings_averages_per_day() {
        let state = create_test_state().await;
        {
            let store = state.store.lock().await;
            store.insert_reading(20.0, 50.0, "2024-01-01", "08:00:00").unwrap();
            store.insert_reading(22.0, 52.0, "2024-01-01", "20:00:00").unwrap();
        }
        let app = router().with_state(state);

        let response = get(app, "/api/sensor/all").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["date"], "2024-01-01");
        assert_eq!(rows[0]["temperature"], 21.0);
    }

    #[tokio::test]
    async fn test_weekly_shape_is_seven_buckets() {
        let state = create_test_state().await;
        {
            let store = state.store.lock().await;
            // Tuesday of ISO week 2024-W10.
            store.insert_reading(21.0, 48.0, "2024-03-05", "12:00:00").unwrap();
        }
        let app = router().with_state(state);

        let response = get(app, "/api/sensor/weekly/2024-W10").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["labels"].as_array().unwrap().len(), 7);
        assert_eq!(json["labels"][0], "Monday");
        assert_eq!(json["temperatures"][0], serde_json::Value::Null);
        assert_eq!(json["temperatures"][1], 21.0);
    }

    #[tokio::test]
    async fn test_weekly_invalid_label_is_bad_request() {
        let state = create_test_state().await;
        let app = router().with_state(state);

        let response = get(app, "/api/sensor/weekly/garbage").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_range_with_bad_bound_is_bad_request() {
        let state = create_test_state().await;
        let app = router().with_state(state);

        let response = get(app, "/api/sensor/range/01.05.2024/2024-01-09").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_daily_full_resolution() {
        let state = create_test_state().await;
        {
            let store = state.store.lock().await;
            store.insert_reading(20.0, 44.0, "2024-03-05", "06:15:00").unwrap();
            store.insert_reading(21.0, 45.0, "2024-03-05", "18:30:00").unwrap();
        }
        let app = router().with_state(state);

        let response = get(app, "/api/sensor/daily/5/3/2024").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["time"], "06:15:00");
    }

    #[tokio::test]
    async fn test_statistics_empty_store_is_not_found() {
        let state = create_test_state().await;
        let app = router().with_state(state);

        let response = get(app, "/api/statistics").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_statistics_with_data() {
        let state = create_test_state().await;
        {
            let store = state.store.lock().await;
            store.insert_reading(10.0, 40.0, "2024-01-01", "08:00:00").unwrap();
            store.insert_reading(20.0, 60.0, "2024-01-02", "08:00:00").unwrap();
        }
        let app = router().with_state(state);

        let response = get(app, "/api/statistics").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["total_entries"], 2);
        assert_eq!(json["avg_temperature"], 15.0);
        assert_eq!(json["min_temperature"]["date"], "2024-01-01");
    }

    #[tokio::test]
    async fn test_daterange_empty_store_is_now_twice() {
        let state = create_test_state().await;
        let app = router().with_state(state);

        let response = get(app, "/api/daterange").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["first"], json["last"]);
    }

    #[tokio::test]
    async fn test_current_without_sensor_is_unavailable() {
        let state = create_test_state().await;
        let app = router().with_state(state);

        let response = get(app, "/api/sensor/current").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_current_reads_sensor_out_of_band() {
        let sensor: Arc<dyn Sensor> = Arc::new(MockSensor::steady(23.5, 41.0));
        let state = create_test_state_with_sensor(Some(sensor)).await;
        let app = router().with_state(Arc::clone(&state));

        let response = get(app, "/api/sensor/current").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["temperature"], 23.5);

        // Nothing was persisted by the live read.
        let store = state.store.lock().await;
        assert!(store.all_readings().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logs_round_trip_and_delete() {
        let state = create_test_state().await;
        {
            let store = state.store.lock().await;
            store.append_log("read failed", "2024-01-01 08:00:00").unwrap();
        }

        let app = router().with_state(Arc::clone(&state));
        let response = get(app, "/api/logs").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);

        let app = router().with_state(Arc::clone(&state));
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/logs/2024-01-01%2008:00:00")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["message"].as_str().unwrap().contains("1"));
    }

    #[tokio::test]
    async fn test_delete_all_logs_empty_is_success() {
        let state = create_test_state().await;
        let app = router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/logs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_get_config_returns_defaults() {
        let state = create_test_state().await;
        let app = router().with_state(state);

        let response = get(app, "/api/config").await;
        assert_eq!(response.status(), StatusCode::OK);

        let cfg: AppConfig =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[tokio::test]
    async fn test_put_config_persists_and_updates_cache() {
        let state = create_test_state().await;

        let mut new_config = AppConfig::default();
        new_config.sensor_interval = 30;
        new_config.use_sensor = false;

        let app = router().with_state(Arc::clone(&state));
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/config")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&new_config).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["success"], true);

        // Cache and storage both reflect the write.
        assert_eq!(state.config.current().await, new_config);
        let store = state.store.lock().await;
        assert_eq!(store.load_config().unwrap(), new_config);
    }

    #[tokio::test]
    async fn test_put_config_fires_change_signal() {
        let state = create_test_state().await;
        let rx = state.config.subscribe_changes();

        let new_config = AppConfig::default();
        let app = router().with_state(Arc::clone(&state));
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/config")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&new_config).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_dump_streams_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        let store = Store::open(&db_path).unwrap();
        store.insert_reading(20.0, 50.0, "2024-01-01", "12:00:00").unwrap();

        let state = AppState::new(store, db_path, Config::default(), None);
        {
            let store = state.store.lock().await;
            state.config.initialize(&store).await.unwrap();
        }
        let app = router().with_state(state);

        let response = get(app, "/api/dump").await;
        assert_eq!(response.status(), StatusCode::OK);

        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("thermolog-"));
        assert!(disposition.ends_with(".db\""));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        // SQLite main files start with a fixed magic string.
        assert!(body.starts_with(b"SQLite format 3\0"));

        // The download is a usable standalone database containing the
        // data committed before the request, not a stale pre-WAL file.
        let restored_path = dir.path().join("restored.db");
        std::fs::write(&restored_path, &body).unwrap();
        let restored = Store::open(&restored_path).unwrap();
        assert_eq!(restored.all_readings().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_poller_start_without_sensor() {
        let state = create_test_state().await;
        let app = router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/poller/start")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert!(json["message"].as_str().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn test_poller_start_and_stop_round_trip() {
        let sensor: Arc<dyn Sensor> = Arc::new(MockSensor::steady(21.0, 50.0));
        let state = create_test_state_with_sensor(Some(sensor)).await;

        let app = router().with_state(Arc::clone(&state));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/poller/start")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.poller.is_running());

        // Health reports the start time while the poller runs.
        let app = router().with_state(Arc::clone(&state));
        let response = get(app, "/api/health").await;
        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["poller_running"], true);
        assert!(json["poller_started_at"].is_string());

        let app = router().with_state(Arc::clone(&state));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/poller/stop")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!state.poller.is_running());
    }
}
