//! HTTP screening server.
//!
//! Exposes the screening pipeline as `POST /scan`: a JSON body with optional
//! sensor arrays and manifests, answered with the scan report. Omitted
//! channels fall back to the historical defaults (100 nominal containers).
//! The audit ledger and policy table live in shared state for the process
//! lifetime; a fresh classifier fit still happens on every call, which is the
//! pipeline's documented behavior, not an accident of the server.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use quayscan_core::{ScanReport, Screener, SensorFrame};

/// Shared server state.
struct AppState {
    screener: Mutex<Screener>,
}

/// `POST /scan` request body. Every channel is optional; supplied channels
/// must agree in length.
#[derive(Debug, Deserialize)]
struct ScanBody {
    mag_data: Option<Vec<f64>>,
    grav_data: Option<Vec<f64>>,
    labels: Option<Vec<u8>>,
    locations: Option<Vec<[f64; 2]>>,
    manifests: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    audits: u64,
}

const DEFAULT_CONTAINERS: usize = 100;

impl ScanBody {
    /// Resolve the body into a frame, filling defaults for omitted channels.
    fn into_frame(self) -> Result<SensorFrame, String> {
        let n = self
            .mag_data
            .as_ref()
            .map(Vec::len)
            .or(self.grav_data.as_ref().map(Vec::len))
            .or(self.labels.as_ref().map(Vec::len))
            .or(self.locations.as_ref().map(Vec::len))
            .or(self.manifests.as_ref().map(Vec::len))
            .unwrap_or(DEFAULT_CONTAINERS);
        if n == 0 {
            return Err("supplied channels are empty".to_string());
        }

        let frame = SensorFrame {
            mag: self.mag_data.unwrap_or_else(|| vec![1e-9; n]),
            grav: self.grav_data.unwrap_or_else(|| vec![5e-5; n]),
            labels: self.labels.unwrap_or_else(|| vec![0; n]),
            locations: self.locations.unwrap_or_else(|| vec![[0.1, 0.1]; n]),
            manifests: self
                .manifests
                .unwrap_or_else(|| vec!["cargo: electronics 50kg".to_string(); n]),
        };

        for (name, len) in [
            ("mag_data", frame.mag.len()),
            ("grav_data", frame.grav.len()),
            ("labels", frame.labels.len()),
            ("locations", frame.locations.len()),
            ("manifests", frame.manifests.len()),
        ] {
            if len != n {
                return Err(format!("{name} length {len} != frame length {n}"));
            }
        }
        Ok(frame)
    }
}

async fn handle_scan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScanBody>,
) -> Result<Json<ScanReport>, (StatusCode, Json<ErrorResponse>)> {
    let frame = body.into_frame().map_err(|error| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error }),
        )
    })?;

    let mut screener = state.screener.lock().await;
    match screener.screen(&frame) {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            log::error!("scan failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

async fn handle_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ErrorResponse>)> {
    let screener = state.screener.lock().await;
    match screener.store().count() {
        Ok(audits) => Ok(Json(HealthResponse {
            status: "healthy".to_string(),
            audits,
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

async fn handle_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Quayscan Server",
        "version": quayscan_core::VERSION,
        "endpoints": {
            "/": "This API index",
            "/scan": {
                "method": "POST",
                "description": "Run one screening pass",
                "body": {
                    "mag_data": "Optional array of magnetometer readings",
                    "grav_data": "Optional array of gravimeter readings",
                    "labels": "Optional array of 0/1 inspection labels",
                    "locations": "Optional array of [lat, lon] pairs",
                    "manifests": "Optional array of manifest strings",
                }
            },
            "/health": "Ledger health check",
        },
        "examples": {
            "defaults": "curl -X POST -H 'Content-Type: application/json' -d '{}' /scan",
        }
    }))
}

/// Build the axum router.
fn build_router(screener: Screener) -> Router {
    let state = Arc::new(AppState {
        screener: Mutex::new(screener),
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/scan", post(handle_scan))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the HTTP screening server.
pub async fn run_server(screener: Screener, host: &str, port: u16) {
    let app = build_router(screener);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> ScanBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_body_fills_defaults() {
        let frame = body("{}").into_frame().unwrap();
        assert_eq!(frame.mag.len(), DEFAULT_CONTAINERS);
        assert_eq!(frame.manifests.len(), DEFAULT_CONTAINERS);
    }

    #[test]
    fn partial_body_sizes_from_supplied_channel() {
        let frame = body(r#"{"mag_data": [1e-9, 2e-9, 3e-9]}"#).into_frame().unwrap();
        assert_eq!(frame.mag.len(), 3);
        assert_eq!(frame.grav.len(), 3);
        assert_eq!(frame.labels, vec![0, 0, 0]);
    }

    #[test]
    fn mismatched_channels_are_rejected() {
        let err = body(r#"{"mag_data": [1e-9, 2e-9], "grav_data": [5e-5]}"#)
            .into_frame()
            .unwrap_err();
        assert!(err.contains("grav_data"));
    }

    #[test]
    fn empty_channel_is_rejected() {
        assert!(body(r#"{"mag_data": []}"#).into_frame().is_err());
    }
}
