use axum::extract::{Json, State};
use chrono::Utc;
use tracing::instrument;

use family_health_domain::entities::{CyclePrediction, PregnancyStatus};

use crate::api::extract::UserId;
use crate::api::AppState;
use crate::entities::ErrorResponse;

/// Status of the caller's current pregnancy
#[utoipa::path(
    get,
    path = "/api/v1/pregnancy-profiles/current/status",
    params(("x-user-id" = String, Header, description = "Calling user")),
    responses(
        (status = 200, description = "Gestational age, trimester and due date countdown", body = PregnancyStatus),
        (status = 404, description = "No active pregnancy profile", body = ErrorResponse),
    ),
    tag = "womens_health"
)]
#[instrument(skip(state))]
pub async fn get_current_pregnancy_status(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<PregnancyStatus>, ErrorResponse> {
    let today = Utc::now().date_naive();
    Ok(Json(state.pregnancy.current_status(user.as_str(), today).await?))
}

/// Next period and fertile window predicted from the caller's history
#[utoipa::path(
    get,
    path = "/api/v1/menstrual-cycles/prediction",
    params(("x-user-id" = String, Header, description = "Calling user")),
    responses(
        (status = 200, description = "Cycle prediction", body = CyclePrediction),
        (status = 422, description = "No cycles logged yet", body = ErrorResponse),
    ),
    tag = "womens_health"
)]
#[instrument(skip(state))]
pub async fn get_cycle_prediction(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<CyclePrediction>, ErrorResponse> {
    let today = Utc::now().date_naive();
    Ok(Json(state.cycles.prediction(user.as_str(), today).await?))
}
