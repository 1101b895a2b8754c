use crate::core::scorer::Scorer;
use crate::domain::model::PassengerAttributes;
use crate::utils::error::{ErrorCategory, Result, SurvivalError};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const SCORE_ROUTE: &str = "/api/titanic";
pub const HEALTH_ROUTE: &str = "/health";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalProbabilityResponse {
    pub survival_probability: f64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<Scorer>,
}

/// 建立路由：單一評分端點 + 健康檢查，CORS 只允許設定的來源
pub fn router(scorer: Arc<Scorer>, allowed_origin: &str) -> Result<Router> {
    let origin =
        HeaderValue::from_str(allowed_origin).map_err(|e| SurvivalError::InvalidConfigValueError {
            field: "server.allowed_origin".to_string(),
            value: allowed_origin.to_string(),
            reason: e.to_string(),
        })?;

    let cors = CorsLayer::new()
        .allow_origin([origin])
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route(HEALTH_ROUTE, get(health))
        .route(SCORE_ROUTE, post(derive_score))
        .with_state(AppState { scorer })
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

async fn health() -> &'static str {
    "ok"
}

async fn derive_score(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PassengerAttributes>, JsonRejection>,
) -> Response {
    let attrs = match payload {
        Ok(Json(attrs)) => attrs,
        Err(rejection) => return rejection_response(rejection),
    };

    match state.scorer.derive_survival_probability(&attrs).await {
        Ok(probability) => Json(SurvivalProbabilityResponse {
            survival_probability: probability.value(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// 請求內容無法解析時，同樣回傳 `{"error": ...}` 格式
fn rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let message = rejection.body_text();
    tracing::warn!("⚠️ Request body rejected ({}): {}", status, message);

    (status, Json(ErrorBody { error: message })).into_response()
}

pub fn status_for(err: &SurvivalError) -> StatusCode {
    match err.category() {
        ErrorCategory::Request => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Model => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCategory::Inference | ErrorCategory::Configuration | ErrorCategory::System => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for SurvivalError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        } else {
            tracing::warn!("⚠️ Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.user_friendly_message(),
        };
        (status, Json(body)).into_response()
    }
}
