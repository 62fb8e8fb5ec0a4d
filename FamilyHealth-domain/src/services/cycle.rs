//! Menstrual cycle tracking and fertility window estimation.

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use family_health_data::models::MenstrualCycleRow;
use family_health_data::store::TableClient;

use crate::entities::conversions;
use crate::entities::{
    Activity, CreateMenstrualCycleRequest, CycleFertilityEstimate, CyclePhase, CyclePrediction,
    MenstrualCycle,
};
use super::errors::{offset_date, ServiceError};
use super::gamification::GamificationServiceTrait;
use super::records::{DomainRecord, RecordService};

/// Cycle length assumed without usable history
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;

/// Period length assumed without usable history
pub const DEFAULT_PERIOD_LENGTH: u32 = 5;

/// Days between ovulation and the next period
pub const LUTEAL_PHASE_DAYS: i64 = 14;

/// Gaps between period starts outside this range are treated as missed logs
const PLAUSIBLE_CYCLE_DAYS: RangeInclusive<i64> = 21..=45;

fn rounded_mean(values: &[u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    Some((sum as f64 / values.len() as f64).round() as u32)
}

/// Average cycle length in days.
///
/// Uses gaps between consecutive period starts that fall within 21..=45
/// days; without any, the mean of recorded cycle lengths; else 28.
pub fn average_cycle_length(cycles: &[MenstrualCycle]) -> u32 {
    let mut starts: Vec<NaiveDate> = cycles.iter().map(|c| c.start_date).collect();
    starts.sort();
    starts.dedup();

    let gaps: Vec<u32> = starts
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .filter(|gap| PLAUSIBLE_CYCLE_DAYS.contains(gap))
        .map(|gap| gap as u32)
        .collect();

    if let Some(mean) = rounded_mean(&gaps) {
        return mean;
    }

    let recorded: Vec<u32> = cycles
        .iter()
        .filter_map(|c| c.cycle_length)
        .filter(|length| *length > 0)
        .collect();

    rounded_mean(&recorded).unwrap_or(DEFAULT_CYCLE_LENGTH)
}

/// Average number of bleeding days, or 5 without any completed period
pub fn average_period_length(cycles: &[MenstrualCycle]) -> u32 {
    let lengths: Vec<u32> = cycles.iter().filter_map(MenstrualCycle::period_length).collect();
    rounded_mean(&lengths).unwrap_or(DEFAULT_PERIOD_LENGTH)
}

/// First day of the next period
pub fn predict_next_period(last_start: NaiveDate, cycle_length: u32) -> Result<NaiveDate, ServiceError> {
    offset_date(last_start, i64::from(cycle_length))
}

/// Ovulation day, 14 days before the next period
pub fn ovulation_date(next_period: NaiveDate) -> Result<NaiveDate, ServiceError> {
    offset_date(next_period, -LUTEAL_PHASE_DAYS)
}

/// The six fertile days: five before ovulation through the day after
pub fn fertile_window(ovulation: NaiveDate) -> Result<(NaiveDate, NaiveDate), ServiceError> {
    Ok((offset_date(ovulation, -5)?, offset_date(ovulation, 1)?))
}

/// 1-based day of the cycle that started on `last_start`
pub fn cycle_day(last_start: NaiveDate, date: NaiveDate) -> Option<u32> {
    let elapsed = (date - last_start).num_days();
    (elapsed >= 0).then(|| elapsed as u32 + 1)
}

/// Phase of the cycle on a given cycle day
pub fn cycle_phase(day: u32, cycle_length: u32, period_length: u32) -> CyclePhase {
    let ovulation_day = i64::from(cycle_length.saturating_sub(13).max(1));
    let day_number = i64::from(day);

    if day <= period_length {
        CyclePhase::Menstrual
    } else if (day_number - ovulation_day).abs() <= 1 {
        CyclePhase::Ovulation
    } else if day_number < ovulation_day {
        CyclePhase::Follicular
    } else {
        CyclePhase::Luteal
    }
}

/// Next period, ovulation and fertile window for one cycle
pub fn fertility_estimate(last_start: NaiveDate, cycle_length: u32) -> Result<CycleFertilityEstimate, ServiceError> {
    let next_period = predict_next_period(last_start, cycle_length)?;
    let ovulation = ovulation_date(next_period)?;
    let (window_start, window_end) = fertile_window(ovulation)?;

    Ok(CycleFertilityEstimate {
        last_period_start: last_start,
        cycle_length,
        next_period_date: next_period,
        ovulation_date: ovulation,
        fertile_window_start: window_start,
        fertile_window_end: window_end,
    })
}

/// Predict the next cycle from history as of `today`
pub fn predict(cycles: &[MenstrualCycle], today: NaiveDate) -> Result<CyclePrediction, ServiceError> {
    let last_start = cycles
        .iter()
        .map(|c| c.start_date)
        .max()
        .ok_or_else(|| ServiceError::InsufficientData("No menstrual cycles logged".to_string()))?;

    let cycle_length = average_cycle_length(cycles);
    let period_length = average_period_length(cycles);
    let estimate = fertility_estimate(last_start, cycle_length)?;
    let current_cycle_day = cycle_day(last_start, today);

    debug!(
        "Predicting from {} cycle(s): length {} period {}",
        cycles.len(),
        cycle_length,
        period_length
    );

    Ok(CyclePrediction {
        cycles_analyzed: cycles.len(),
        average_cycle_length: cycle_length,
        average_period_length: period_length,
        days_until_next_period: (estimate.next_period_date - today).num_days(),
        estimate,
        current_cycle_day,
        current_phase: current_cycle_day.map(|day| cycle_phase(day, cycle_length, period_length)),
    })
}

impl DomainRecord for MenstrualCycle {
    type Row = MenstrualCycleRow;
    type Create = CreateMenstrualCycleRequest;

    const LABEL: &'static str = "Menstrual cycle";
    const ACTIVITY: Option<Activity> = Some(Activity::CycleLogged);
    const ORDER_BY: Option<(&'static str, bool)> = Some(("start_date", true));

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: MenstrualCycleRow) -> Result<Self, String> {
        conversions::convert_to_domain_menstrual_cycle(row)
    }

    fn to_row(&self) -> MenstrualCycleRow {
        conversions::convert_to_data_menstrual_cycle(self)
    }

    fn from_request(user_id: &str, request: CreateMenstrualCycleRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        Ok(MenstrualCycle {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
            cycle_length: request.cycle_length,
            flow_intensity: request.flow_intensity,
            symptoms: request.symptoms,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }

    fn check(&self) -> Result<(), ServiceError> {
        match self.end_date {
            Some(end) if end < self.start_date => Err(ServiceError::Validation(
                "Period end cannot be before its start".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Menstrual cycle logs and predictions
#[derive(Debug, Clone)]
pub struct CycleService {
    pub cycles: RecordService<MenstrualCycle>,
}

impl CycleService {
    /// Create the service over a table client
    pub fn new(client: Arc<dyn TableClient>, gamification: Arc<dyn GamificationServiceTrait>) -> Self {
        Self {
            cycles: RecordService::new(client).with_gamification(gamification),
        }
    }

    /// Prediction from the user's full cycle history
    pub async fn prediction(&self, user_id: &str, today: NaiveDate) -> Result<CyclePrediction, ServiceError> {
        let cycles = self.cycles.list(user_id, None).await?;
        predict(&cycles, today)
    }
}
