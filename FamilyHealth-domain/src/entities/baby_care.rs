use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

string_enum! {
    /// How a baby was fed
    pub enum FeedingType {
        Breast => "breast",
        Bottle => "bottle",
        Solid => "solid",
    }
}

string_enum! {
    /// Breast used for a breast feeding
    pub enum BreastSide {
        Left => "left",
        Right => "right",
        Both => "both",
    }
}

/// A single feeding session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct FeedingLog {
    pub id: String,
    pub user_id: String,
    /// The baby
    #[validate(length(min = 1, message = "Family member is required"))]
    pub family_member_id: String,
    pub feeding_type: FeedingType,
    pub started_at: DateTime<Utc>,
    #[validate(range(max = 600, message = "Duration cannot exceed 600 minutes"))]
    pub duration_minutes: Option<u32>,
    #[validate(range(min = 0.0, max = 2000.0, message = "Amount must be between 0 and 2000 ml"))]
    pub amount_ml: Option<f64>,
    pub side: Option<BreastSide>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for logging a feeding
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateFeedingLogRequest {
    #[validate(length(min = 1, message = "Family member is required"))]
    pub family_member_id: String,

    pub feeding_type: FeedingType,

    /// Defaults to now
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(range(max = 600, message = "Duration cannot exceed 600 minutes"))]
    pub duration_minutes: Option<u32>,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 2000.0, message = "Amount must be between 0 and 2000 ml"))]
    pub amount_ml: Option<f64>,

    #[serde(default)]
    pub side: Option<BreastSide>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// A sleep session; open while `ended_at` is absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SleepLog {
    pub id: String,
    pub user_id: String,
    #[validate(length(min = 1, message = "Family member is required"))]
    pub family_member_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub quality: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SleepLog {
    /// Length of a completed session in minutes
    pub fn duration_minutes(&self) -> Option<i64> {
        self.ended_at
            .filter(|end| *end >= self.started_at)
            .map(|end| (end - self.started_at).num_minutes())
    }
}

/// Request payload for logging sleep
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateSleepLogRequest {
    #[validate(length(min = 1, message = "Family member is required"))]
    pub family_member_id: String,

    pub started_at: DateTime<Utc>,

    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub quality: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// A scheduled vaccine dose for a child
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct VaccinationSchedule {
    pub id: String,
    pub user_id: String,
    #[validate(length(min = 1, message = "Family member is required"))]
    pub family_member_id: String,
    #[validate(length(min = 1, max = 200, message = "Vaccine name must be between 1 and 200 characters"))]
    pub vaccine_name: String,
    #[validate(range(min = 1, max = 10, message = "Dose number must be between 1 and 10"))]
    pub dose_number: u32,
    pub scheduled_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub skipped: bool,
    pub provider: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Days ahead of the scheduled date a dose counts as due soon
pub const DUE_SOON_DAYS: i64 = 14;

string_enum! {
    /// Where a vaccine dose stands
    pub enum VaccinationStatus {
        Completed => "completed",
        Skipped => "skipped",
        Overdue => "overdue",
        DueSoon => "due_soon",
        Upcoming => "upcoming",
    }
}

impl VaccinationSchedule {
    /// Status of the dose as of a date
    pub fn status_on(&self, today: NaiveDate) -> VaccinationStatus {
        if self.administered_date.is_some() {
            return VaccinationStatus::Completed;
        }
        if self.skipped {
            return VaccinationStatus::Skipped;
        }

        let days_until = (self.scheduled_date - today).num_days();
        if days_until < 0 {
            VaccinationStatus::Overdue
        } else if days_until <= DUE_SOON_DAYS {
            VaccinationStatus::DueSoon
        } else {
            VaccinationStatus::Upcoming
        }
    }
}

/// Request payload for scheduling a vaccine dose
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateVaccinationRequest {
    #[validate(length(min = 1, message = "Family member is required"))]
    pub family_member_id: String,

    #[validate(length(min = 1, max = 200, message = "Vaccine name must be between 1 and 200 characters"))]
    pub vaccine_name: String,

    #[serde(default)]
    #[validate(range(min = 1, max = 10, message = "Dose number must be between 1 and 10"))]
    pub dose_number: Option<u32>,

    pub scheduled_date: NaiveDate,

    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Request payload for recording that a dose was given
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AdministerVaccinationRequest {
    /// Defaults to today
    #[serde(default)]
    pub administered_date: Option<NaiveDate>,

    #[serde(default)]
    pub provider: Option<String>,
}

/// A vaccine dose with its status on a date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct VaccinationStatusEntry {
    pub schedule: VaccinationSchedule,
    pub status: VaccinationStatus,
}

/// Feeding and sleep totals for one baby on one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DailyBabySummary {
    pub family_member_id: String,
    pub date: NaiveDate,
    pub age_in_weeks: Option<u32>,
    pub age_in_months: Option<u32>,
    pub feeding_count: usize,
    pub total_feeding_minutes: u32,
    pub total_feeding_ml: f64,
    pub sleep_sessions: usize,
    pub total_sleep_minutes: i64,
}
