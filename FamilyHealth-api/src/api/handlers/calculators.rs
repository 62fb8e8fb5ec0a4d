//! Date calculators that need no stored data.

use axum::extract::{Json, Query};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;
use validator::Validate;

use family_health_domain::entities::{CycleFertilityEstimate, PregnancyStatus};
use family_health_domain::services::cycle::{fertility_estimate, DEFAULT_CYCLE_LENGTH};
use family_health_domain::services::errors::validation_message;
use family_health_domain::services::pregnancy::{due_date_from_lmp, pregnancy_status};

use crate::entities::ErrorResponse;

/// Query parameters for the pregnancy calculator
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PregnancyCalculatorQuery {
    /// First day of the last menstrual period
    pub lmp: NaiveDate,
}

/// Query parameters for the fertility calculator
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FertilityCalculatorQuery {
    /// First day of the last period
    pub last_period: NaiveDate,

    /// Average cycle length in days (default: 28)
    #[validate(range(min = 21, max = 45, message = "Cycle length must be between 21 and 45 days"))]
    pub cycle_length: Option<u32>,
}

/// Due date, gestational age and trimester from an LMP
#[utoipa::path(
    get,
    path = "/api/v1/calculators/pregnancy",
    params(PregnancyCalculatorQuery),
    responses(
        (status = 200, description = "Pregnancy status as of today", body = PregnancyStatus),
        (status = 400, description = "LMP is in the future", body = ErrorResponse),
    ),
    tag = "calculators"
)]
#[instrument]
pub async fn pregnancy_calculator(
    Query(query): Query<PregnancyCalculatorQuery>,
) -> Result<Json<PregnancyStatus>, ErrorResponse> {
    let today = Utc::now().date_naive();
    let due_date = due_date_from_lmp(query.lmp)?;
    let status = pregnancy_status(query.lmp, due_date, today)?;
    Ok(Json(status))
}

/// Next period, ovulation and fertile window from the last period
#[utoipa::path(
    get,
    path = "/api/v1/calculators/fertility",
    params(FertilityCalculatorQuery),
    responses(
        (status = 200, description = "Fertility estimate", body = CycleFertilityEstimate),
        (status = 400, description = "Invalid cycle length or date out of range", body = ErrorResponse),
    ),
    tag = "calculators"
)]
#[instrument]
pub async fn fertility_calculator(
    Query(query): Query<FertilityCalculatorQuery>,
) -> Result<Json<CycleFertilityEstimate>, ErrorResponse> {
    query
        .validate()
        .map_err(|errors| ErrorResponse::validation_error(validation_message(&errors)))?;

    let cycle_length = query.cycle_length.unwrap_or(DEFAULT_CYCLE_LENGTH);
    let estimate = fertility_estimate(query.last_period, cycle_length)?;
    Ok(Json(estimate))
}
