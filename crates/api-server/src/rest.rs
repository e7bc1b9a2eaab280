//! REST API handlers for offer sampling, feedback, and stats endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use offer_bandit::BanditEngine;
use offer_core::config::BanditConfig;
use offer_core::error::OfferError;
use offer_core::types::{ClickId, FeedbackOutcome, OfferId, OfferStatsSnapshot, Recommendation, Strategy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Maximum number of candidate offers per sample request.
const MAX_OFFER_IDS: usize = 1000;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BanditEngine>,
    pub defaults: BanditConfig,
    pub node_id: String,
    pub start_time: Instant,
}

/// Strategy token accepted by the sample endpoint. Defaults to UCB.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Ucb,
    Thompson,
}

#[derive(Debug, Deserialize)]
pub struct SampleRequest {
    pub offer_ids: Vec<OfferId>,
    #[serde(default)]
    pub strategy: StrategyKind,
    /// UCB exploration constant; falls back to the configured default.
    pub exploration_c: Option<f64>,
    /// Thompson Beta prior shapes; fall back to the configured defaults.
    pub prior_a: Option<f64>,
    pub prior_b: Option<f64>,
    /// Caller-supplied click id; generated when omitted.
    pub click_id: Option<ClickId>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub click_id: ClickId,
    pub converted: bool,
    pub reward: f64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub status: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: OfferError) -> ApiError {
    let (status, code) = match &err {
        OfferError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        OfferError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        OfferError::InvalidFeedback(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_feedback"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
}

/// POST /v1/sample — select an offer from the eligible set.
pub async fn handle_sample(
    State(state): State<AppState>,
    Json(request): Json<SampleRequest>,
) -> Result<Json<Recommendation>, ApiError> {
    if request.offer_ids.len() > MAX_OFFER_IDS {
        warn!(count = request.offer_ids.len(), "Sample request exceeds offer limit");
        metrics::counter!("api.validation_errors").increment(1);
        return Err(error_response(OfferError::InvalidRequest(format!(
            "at most {MAX_OFFER_IDS} offer_ids per request"
        ))));
    }

    let strategy = match request.strategy {
        StrategyKind::Ucb => Strategy::Ucb {
            exploration_c: request
                .exploration_c
                .unwrap_or(state.defaults.exploration_c),
        },
        StrategyKind::Thompson => Strategy::Thompson {
            prior_a: request.prior_a.unwrap_or(state.defaults.prior_a),
            prior_b: request.prior_b.unwrap_or(state.defaults.prior_b),
        },
    };

    match state
        .engine
        .sample(&request.offer_ids, strategy, request.click_id)
    {
        Ok(recommendation) => {
            metrics::counter!("api.samples_served").increment(1);
            Ok(Json(recommendation))
        }
        Err(e) => {
            warn!(error = %e, "Sample request failed");
            metrics::counter!("api.validation_errors").increment(1);
            Err(error_response(e))
        }
    }
}

/// PUT /v1/feedback — resolve a click and apply its outcome.
pub async fn handle_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackOutcome>, ApiError> {
    match state
        .engine
        .record_feedback(request.click_id, request.converted, request.reward)
    {
        Ok(outcome) => {
            if outcome.is_conversion {
                metrics::counter!("api.conversions_recorded").increment(1);
            }
            Ok(Json(outcome))
        }
        Err(e) => {
            warn!(click_id = %request.click_id, error = %e, "Feedback rejected");
            metrics::counter!("api.feedback_errors").increment(1);
            Err(error_response(e))
        }
    }
}

/// GET /v1/offers/{offer_id}/stats — read-only stats snapshot.
pub async fn handle_stats(
    State(state): State<AppState>,
    Path(offer_id): Path<OfferId>,
) -> Result<Json<OfferStatsSnapshot>, ApiError> {
    state
        .engine
        .get_stats(offer_id)
        .map(Json)
        .map_err(|e| {
            metrics::counter!("api.stats_not_found").increment(1);
            error_response(e)
        })
}

/// POST /v1/admin/reset — clear all stats and pending clicks.
pub async fn handle_reset(State(state): State<AppState>) -> Json<ResetResponse> {
    state.engine.reset();
    Json(ResetResponse {
        status: "reset".to_string(),
    })
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe for Kubernetes.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.start_time.elapsed().as_secs() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — Liveness probe for Kubernetes.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_token_parsing() {
        let body = r#"{"offer_ids":[1,2],"strategy":"thompson","prior_a":2.0}"#;
        let req: SampleRequest = serde_json::from_str(body).unwrap();
        assert!(matches!(req.strategy, StrategyKind::Thompson));
        assert_eq!(req.prior_a, Some(2.0));
        assert!(req.prior_b.is_none());

        // Unknown tokens are rejected at the boundary.
        let bad = r#"{"offer_ids":[1],"strategy":"egreedy"}"#;
        assert!(serde_json::from_str::<SampleRequest>(bad).is_err());
    }

    #[test]
    fn test_strategy_defaults_to_ucb() {
        let req: SampleRequest = serde_json::from_str(r#"{"offer_ids":[1]}"#).unwrap();
        assert!(matches!(req.strategy, StrategyKind::Ucb));
        assert!(req.click_id.is_none());
    }

    #[test]
    fn test_error_status_mapping() {
        let (status, _) = error_response(OfferError::InvalidRequest("x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = error_response(OfferError::NotFound("x".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = error_response(OfferError::InvalidFeedback("x".into()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = error_response(OfferError::Config("x".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
