use axum::extract::{Json, Query, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::IntoParams;

use family_health_domain::entities::{BillSummary, InsurancePolicy, Prescription};

use crate::api::extract::UserId;
use crate::api::AppState;
use crate::entities::ErrorResponse;

/// Default look-ahead for expiring policies
const DEFAULT_EXPIRY_WINDOW_DAYS: u32 = 30;

/// Query parameters for expiring insurance policies
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpiringQuery {
    /// Look-ahead window in days (default: 30, max: 365)
    pub days: Option<u32>,
}

/// Prescriptions active today
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/active",
    params(("x-user-id" = String, Header, description = "Calling user")),
    responses(
        (status = 200, description = "Active prescriptions", body = [Prescription]),
        (status = 400, description = "Missing user header", body = ErrorResponse),
    ),
    tag = "medical"
)]
#[instrument(skip(state))]
pub async fn get_active_prescriptions(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<Vec<Prescription>>, ErrorResponse> {
    let today = Utc::now().date_naive();
    let active = state.medical.active_prescriptions(user.as_str(), today).await?;
    Ok(Json(active))
}

/// Insurance policies expiring soon
#[utoipa::path(
    get,
    path = "/api/v1/insurance-policies/expiring",
    params(("x-user-id" = String, Header, description = "Calling user"), ExpiringQuery),
    responses(
        (status = 200, description = "Policies expiring within the window, soonest first", body = [InsurancePolicy]),
        (status = 400, description = "Invalid window", body = ErrorResponse),
    ),
    tag = "medical"
)]
#[instrument(skip(state))]
pub async fn get_expiring_policies(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<Vec<InsurancePolicy>>, ErrorResponse> {
    let days = query.days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);
    if days > 365 {
        return Err(ErrorResponse::bad_request("days cannot exceed 365"));
    }

    let today = Utc::now().date_naive();
    let policies = state.medical.expiring_policies(user.as_str(), days, today).await?;
    info!("{} policies expiring within {} days", policies.len(), days);
    Ok(Json(policies))
}

/// Totals over the caller's medical bills
#[utoipa::path(
    get,
    path = "/api/v1/medical-bills/summary",
    params(("x-user-id" = String, Header, description = "Calling user")),
    responses(
        (status = 200, description = "Bill totals", body = BillSummary),
        (status = 400, description = "Missing user header", body = ErrorResponse),
    ),
    tag = "medical"
)]
#[instrument(skip(state))]
pub async fn get_bill_summary(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<BillSummary>, ErrorResponse> {
    let today = Utc::now().date_naive();
    Ok(Json(state.medical.bill_summary(user.as_str(), today).await?))
}
