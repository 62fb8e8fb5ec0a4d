use axum::extract::{Json, Query, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use family_health_domain::entities::{VitalSummary, VitalType};

use crate::api::extract::UserId;
use crate::api::AppState;
use crate::entities::ErrorResponse;

/// Query parameters for a vital summary
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VitalSummaryQuery {
    /// Vital type to summarize
    pub vital_type: VitalType,

    /// Analysis period in days (default: 30, max: 365)
    pub days: Option<u32>,

    /// Only readings of this family member
    pub family_member_id: Option<String>,
}

/// Statistics for one vital type over a timeframe
#[utoipa::path(
    get,
    path = "/api/v1/vitals/summary",
    params(("x-user-id" = String, Header, description = "Calling user"), VitalSummaryQuery),
    responses(
        (status = 200, description = "Vital summary", body = VitalSummary),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 422, description = "No readings in the timeframe", body = ErrorResponse),
    ),
    tag = "wellness"
)]
#[instrument(skip(state))]
pub async fn get_vital_summary(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<VitalSummaryQuery>,
) -> Result<Json<VitalSummary>, ErrorResponse> {
    let days = query.days.unwrap_or(30);
    if days == 0 || days > 365 {
        return Err(ErrorResponse::bad_request("days must be between 1 and 365"));
    }

    let summary = state
        .wellness
        .summary(user.as_str(), query.vital_type, days, query.family_member_id.as_deref(), Utc::now())
        .await?;
    Ok(Json(summary))
}
