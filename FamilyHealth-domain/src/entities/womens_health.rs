use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// A tracked pregnancy, anchored on the last menstrual period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PregnancyProfile {
    pub id: String,
    pub user_id: String,
    /// First day of the last menstrual period
    pub lmp_date: NaiveDate,
    pub due_date: NaiveDate,
    pub conception_date: Option<NaiveDate>,
    pub is_active: bool,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for starting pregnancy tracking.
///
/// At least one of `lmp_date`, `due_date` or `conception_date` is required;
/// the others are derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreatePregnancyProfileRequest {
    #[serde(default)]
    pub lmp_date: Option<NaiveDate>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub conception_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

string_enum! {
    /// Trimester of a pregnancy
    pub enum Trimester {
        First => "first",
        Second => "second",
        Third => "third",
    }
}

/// Time elapsed since the last menstrual period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct GestationalAge {
    pub weeks: u32,
    pub days: u32,
    pub total_days: u32,
}

/// Snapshot of a pregnancy on a given day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PregnancyStatus {
    /// Absent when computed without a stored profile
    pub profile_id: Option<String>,
    pub lmp_date: NaiveDate,
    pub due_date: NaiveDate,
    pub gestational_age: GestationalAge,
    pub trimester: Trimester,
    /// Negative once the due date has passed
    pub days_until_due: i64,
    pub progress_percent: f64,
    pub size_comparison: Option<String>,
}

string_enum! {
    /// Menstrual flow
    pub enum FlowIntensity {
        Spotting => "spotting",
        Light => "light",
        Medium => "medium",
        Heavy => "heavy",
    }
}

/// One logged menstrual cycle, starting on the first day of bleeding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MenstrualCycle {
    pub id: String,
    pub user_id: String,
    pub start_date: NaiveDate,
    /// Last day of bleeding
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 120, message = "Cycle length must be between 1 and 120 days"))]
    pub cycle_length: Option<u32>,
    pub flow_intensity: Option<FlowIntensity>,
    pub symptoms: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenstrualCycle {
    /// Days of bleeding, counting both ends
    pub fn period_length(&self) -> Option<u32> {
        self.end_date
            .filter(|end| *end >= self.start_date)
            .map(|end| ((end - self.start_date).num_days() + 1) as u32)
    }
}

/// Request payload for logging a period
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMenstrualCycleRequest {
    pub start_date: NaiveDate,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(range(min = 1, max = 120, message = "Cycle length must be between 1 and 120 days"))]
    pub cycle_length: Option<u32>,

    #[serde(default)]
    pub flow_intensity: Option<FlowIntensity>,

    #[serde(default)]
    pub symptoms: Vec<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

string_enum! {
    /// Phase of the menstrual cycle
    pub enum CyclePhase {
        Menstrual => "menstrual",
        Follicular => "follicular",
        Ovulation => "ovulation",
        Luteal => "luteal",
    }
}

/// Fertility estimate derived from a period start and cycle length
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CycleFertilityEstimate {
    pub last_period_start: NaiveDate,
    pub cycle_length: u32,
    pub next_period_date: NaiveDate,
    pub ovulation_date: NaiveDate,
    pub fertile_window_start: NaiveDate,
    pub fertile_window_end: NaiveDate,
}

/// Prediction built from a user's cycle history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CyclePrediction {
    pub cycles_analyzed: usize,
    pub average_cycle_length: u32,
    pub average_period_length: u32,
    pub estimate: CycleFertilityEstimate,
    /// Absent when the most recent period starts after the reference date
    pub current_cycle_day: Option<u32>,
    pub current_phase: Option<CyclePhase>,
    /// Negative when the predicted period is late
    pub days_until_next_period: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_length_counts_both_ends() {
        let cycle = MenstrualCycle {
            id: "c".to_string(),
            user_id: "u".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            cycle_length: None,
            flow_intensity: Some(FlowIntensity::Medium),
            symptoms: vec![],
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(cycle.period_length(), Some(5));

        let open = MenstrualCycle { end_date: None, ..cycle };
        assert_eq!(open.period_length(), None);
    }
}
