//! Shared state, error mapping and the health endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::accounts::AccountService;
use crate::api::auth::JwtConfig;
use crate::error::PanelError;
use crate::events::EventManager;
use crate::i18n::LanguageIndexer;
use crate::limits::ValidationReport;
use crate::messages::PageMessages;

/// Shared application state
pub struct AppState {
    pub accounts: AccountService,
    pub languages: LanguageIndexer,
    pub events: Arc<EventManager>,
    pub jwt_config: JwtConfig,
    /// Advertised to the JS password generator
    pub password_length: usize,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        let status = match &self {
            PanelError::BadRequest(_) | PanelError::Catalog(_) => StatusCode::BAD_REQUEST,
            PanelError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PanelError::Forbidden(_) => StatusCode::FORBIDDEN,
            PanelError::NotFound(_) => StatusCode::NOT_FOUND,
            PanelError::Io(_) | PanelError::Config(_) | PanelError::Database(_) | PanelError::Json(_) => {
                error!("Request failed: {}", self);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiError::new("Internal server error")),
                )
                    .into_response();
            }
        };

        (status, Json(ApiError::new(&self.to_string()))).into_response()
    }
}

/// Body of a `422` response
#[derive(Debug, Serialize)]
pub struct ValidationFailure {
    pub messages: PageMessages,
    pub failed_fields: Vec<&'static str>,
}

impl From<ValidationReport> for ValidationFailure {
    fn from(report: ValidationReport) -> Self {
        let mut messages = PageMessages::new();
        report.write_messages(&mut messages);
        Self {
            messages,
            failed_fields: report.failed_fields().to_vec(),
        }
    }
}

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, PanelError>;

/// Shared state handle used by every handler
pub type SharedState = Arc<AppState>;

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
