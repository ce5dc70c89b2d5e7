//! API Server - HTTP server for the panel's JSON API

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::accounts::Principal;
use crate::api::handlers::{self, ApiError, AppState, SharedState};
use crate::api::{accounts, languages};

/// API Server configuration
pub struct ApiServer {
    state: SharedState,
    addr: String,
}

impl ApiServer {
    pub fn new(state: AppState, addr: String) -> Self {
        Self {
            state: Arc::new(state),
            addr,
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Start the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let router = self.router();

        info!("Starting API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

/// Routes over the given state
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public_routes = Router::new().route("/health", get(handlers::health));

    // Protected routes (auth required, role checked per operation)
    let protected_routes = Router::new()
        .route(
            "/api/admin/resellers/:id/limits",
            get(accounts::get_reseller_limits).put(accounts::update_reseller_limits),
        )
        .route(
            "/api/reseller/clients/:domain_id/limits",
            get(accounts::get_client_limits).put(accounts::update_client_limits),
        )
        .route("/api/languages", get(languages::list_languages))
        .route("/api/admin/languages/rebuild", post(languages::rebuild_index))
        .route("/api/admin/languages/default", put(languages::set_default_language))
        .route("/api/i18n/js", get(languages::get_js_translations))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Authentication middleware - validates the bearer token
async fn auth_middleware(
    State(state): State<SharedState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            warn!("Missing or invalid Authorization header");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiError::new("Missing or invalid Authorization header")),
            )
                .into_response();
        }
    };

    match state.jwt_config.validate_token(token) {
        Ok(claims) => match claims.principal() {
            Some(principal) => {
                req.extensions_mut().insert(principal);
                next.run(req).await
            }
            None => {
                warn!("Token subject is not a user id: {}", claims.sub);
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ApiError::new("Invalid or expired token")),
                )
                    .into_response()
            }
        },
        Err(e) => {
            warn!("Invalid JWT token: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiError::new("Invalid or expired token")),
            )
                .into_response()
        }
    }
}

/// Extract the authenticated principal (for handlers)
#[axum::async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(ApiError::new("Not authenticated")),
            ))
    }
}
