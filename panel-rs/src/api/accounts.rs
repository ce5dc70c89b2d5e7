//! Limit edit endpoints

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::accounts::{EditOutcome, LimitDiff, LimitsForm, Principal};
use crate::api::handlers::{ApiResult, SharedState, ValidationFailure};
use crate::messages::PageMessages;

#[derive(Debug, Serialize)]
struct Applied {
    changes: Vec<LimitDiff>,
    messages: PageMessages,
}

fn outcome_response(outcome: EditOutcome, success: &str) -> Response {
    match outcome {
        EditOutcome::Applied { changes } => {
            let mut messages = PageMessages::new();
            messages.success(success);
            Json(Applied { changes, messages }).into_response()
        }
        EditOutcome::Rejected { report } => ValidationFailure::from(report).into_response(),
    }
}

/// GET /api/admin/resellers/:id/limits
pub async fn get_reseller_limits(
    State(state): State<SharedState>,
    principal: Principal,
    Path(reseller_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let ctx = state.accounts.reseller_context(&principal, reseller_id).await?;
    Ok(Json(ctx))
}

/// PUT /api/admin/resellers/:id/limits
pub async fn update_reseller_limits(
    State(state): State<SharedState>,
    principal: Principal,
    Path(reseller_id): Path<i64>,
    Json(form): Json<LimitsForm>,
) -> ApiResult<Response> {
    let outcome = state
        .accounts
        .edit_reseller_limits(&principal, reseller_id, &form)
        .await?;
    Ok(outcome_response(outcome, "Reseller account successfully updated."))
}

/// GET /api/reseller/clients/:domain_id/limits
pub async fn get_client_limits(
    State(state): State<SharedState>,
    principal: Principal,
    Path(domain_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let ctx = state.accounts.client_context(&principal, domain_id).await?;
    Ok(Json(ctx))
}

/// PUT /api/reseller/clients/:domain_id/limits
pub async fn update_client_limits(
    State(state): State<SharedState>,
    principal: Principal,
    Path(domain_id): Path<i64>,
    Json(form): Json<LimitsForm>,
) -> ApiResult<Response> {
    let outcome = state
        .accounts
        .edit_client_limits(&principal, domain_id, &form)
        .await?;
    Ok(outcome_response(outcome, "Domain successfully updated."))
}
