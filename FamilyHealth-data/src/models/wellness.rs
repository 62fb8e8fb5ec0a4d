use serde::{Deserialize, Serialize};

use crate::repository::schema::VITAL_LOGS;
use super::table_record;

/// Storage model for a wellness vital measurement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalLogRow {
    pub id: String,
    pub user_id: String,

    /// Legacy column: `member_id`
    #[serde(default)]
    pub family_member_id: Option<String>,

    /// Vital kind such as `heart_rate` (legacy column: `type`)
    pub vital_type: String,

    /// Primary value; systolic for blood pressure (legacy column: `reading`)
    pub value: f64,

    /// Secondary value; diastolic for blood pressure
    #[serde(default)]
    pub secondary_value: Option<f64>,

    pub unit: String,

    /// RFC 3339 time of measurement (legacy column: `measured_at`)
    pub recorded_at: String,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(VitalLogRow, VITAL_LOGS);
