use serde::{Deserialize, Serialize};

use crate::repository::schema::{FEEDING_LOGS, SLEEP_LOGS, VACCINATION_SCHEDULES};
use super::table_record;

/// Storage model for a feeding session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedingLogRow {
    pub id: String,
    pub user_id: String,

    /// Baby the feeding belongs to (legacy column: `baby_id`)
    pub family_member_id: String,

    /// One of `breast`, `bottle`, `solid` (legacy column: `feed_type`)
    pub feeding_type: String,

    /// RFC 3339 start time (legacy column: `start_time`)
    pub started_at: String,

    #[serde(default)]
    pub duration_minutes: Option<u32>,

    /// Legacy column: `quantity_ml`
    #[serde(default)]
    pub amount_ml: Option<f64>,

    /// Breast side for breast feeding
    #[serde(default)]
    pub side: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(FeedingLogRow, FEEDING_LOGS);

/// Storage model for a sleep session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SleepLogRow {
    pub id: String,
    pub user_id: String,

    /// Legacy column: `baby_id`
    pub family_member_id: String,

    /// Legacy column: `start_time`
    pub started_at: String,

    /// Absent while the baby is still asleep (legacy column: `end_time`)
    #[serde(default)]
    pub ended_at: Option<String>,

    #[serde(default)]
    pub quality: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(SleepLogRow, SLEEP_LOGS);

/// Storage model for a scheduled vaccine dose
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VaccinationScheduleRow {
    pub id: String,
    pub user_id: String,

    /// Legacy column: `child_id`
    pub family_member_id: String,

    /// Legacy column: `vaccine`
    pub vaccine_name: String,

    #[serde(default = "default_dose")]
    pub dose_number: u32,

    /// Legacy column: `due_date`
    pub scheduled_date: String,

    /// Legacy column: `given_date`
    #[serde(default)]
    pub administered_date: Option<String>,

    #[serde(default)]
    pub skipped: bool,

    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

fn default_dose() -> u32 {
    1
}

table_record!(VaccinationScheduleRow, VACCINATION_SCHEDULES);
