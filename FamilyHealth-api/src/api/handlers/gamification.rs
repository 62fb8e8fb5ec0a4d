use axum::extract::{Json, State};
use tracing::instrument;

use family_health_domain::entities::{Badge, GamificationProfile};
use family_health_domain::services::gamification::BADGES;

use crate::api::extract::UserId;
use crate::api::AppState;
use crate::entities::ErrorResponse;

/// Points, level, streaks and badges of the caller
#[utoipa::path(
    get,
    path = "/api/v1/gamification/profile",
    params(("x-user-id" = String, Header, description = "Calling user")),
    responses(
        (status = 200, description = "Gamification profile", body = GamificationProfile),
        (status = 400, description = "Missing user header", body = ErrorResponse),
    ),
    tag = "gamification"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<GamificationProfile>, ErrorResponse> {
    Ok(Json(state.gamification.profile(user.as_str()).await?))
}

/// The badge catalog
#[utoipa::path(
    get,
    path = "/api/v1/gamification/badges",
    responses((status = 200, description = "Every badge and how to earn it", body = [Badge])),
    tag = "gamification"
)]
pub async fn list_badges() -> Json<&'static [Badge]> {
    Json(BADGES)
}
