use axum::extract::{Json, Path, Query, State};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::IntoParams;

use family_health_domain::entities::{
    AdministerVaccinationRequest, DailyBabySummary, VaccinationSchedule, VaccinationStatusEntry,
};

use crate::api::extract::UserId;
use crate::api::handlers::records::MemberFilter;
use crate::api::AppState;
use crate::entities::ErrorResponse;

/// Query parameters for a baby's daily summary
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Day to summarize (default: today)
    pub date: Option<NaiveDate>,
}

/// Every scheduled vaccine dose with its status today
#[utoipa::path(
    get,
    path = "/api/v1/vaccinations/status",
    params(("x-user-id" = String, Header, description = "Calling user"), MemberFilter),
    responses(
        (status = 200, description = "Doses with status", body = [VaccinationStatusEntry]),
        (status = 400, description = "Missing user header", body = ErrorResponse),
    ),
    tag = "baby_care"
)]
#[instrument(skip(state))]
pub async fn get_vaccination_statuses(
    State(state): State<AppState>,
    user: UserId,
    Query(filter): Query<MemberFilter>,
) -> Result<Json<Vec<VaccinationStatusEntry>>, ErrorResponse> {
    let today = Utc::now().date_naive();
    let statuses = state
        .baby_care
        .vaccination_statuses(user.as_str(), filter.family_member_id.as_deref(), today)
        .await?;
    Ok(Json(statuses))
}

/// Record that a scheduled dose was given
#[utoipa::path(
    post,
    path = "/api/v1/vaccinations/{id}/administer",
    params(
        ("x-user-id" = String, Header, description = "Calling user"),
        ("id" = String, Path, description = "Vaccination schedule ID"),
    ),
    request_body(content = AdministerVaccinationRequest, description = "Optional; defaults to today"),
    responses(
        (status = 200, description = "Dose recorded", body = VaccinationSchedule),
        (status = 400, description = "Dose already administered", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse),
    ),
    tag = "baby_care"
)]
#[instrument(skip(state, request))]
pub async fn administer_vaccination(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
    request: Option<Json<AdministerVaccinationRequest>>,
) -> Result<Json<VaccinationSchedule>, ErrorResponse> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let today = Utc::now().date_naive();

    let schedule = state
        .baby_care
        .administer_vaccination(user.as_str(), &id, request, today)
        .await?;
    info!("Vaccination {} administered", id);
    Ok(Json(schedule))
}

/// Feeding and sleep totals for one baby on one day
#[utoipa::path(
    get,
    path = "/api/v1/babies/{member_id}/summary",
    params(
        ("x-user-id" = String, Header, description = "Calling user"),
        ("member_id" = String, Path, description = "Family member ID of the baby"),
        SummaryQuery,
    ),
    responses(
        (status = 200, description = "Daily summary", body = DailyBabySummary),
        (status = 404, description = "Family member not found", body = ErrorResponse),
    ),
    tag = "baby_care"
)]
#[instrument(skip(state))]
pub async fn get_baby_summary(
    State(state): State<AppState>,
    user: UserId,
    Path(member_id): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<DailyBabySummary>, ErrorResponse> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = state.baby_care.daily_summary(user.as_str(), &member_id, date).await?;
    Ok(Json(summary))
}
