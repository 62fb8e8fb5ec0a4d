use serde::{Deserialize, Serialize};

use crate::repository::schema::{MENSTRUAL_CYCLES, PREGNANCY_PROFILES};
use super::table_record;

/// Storage model for a pregnancy profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PregnancyProfileRow {
    pub id: String,
    pub user_id: String,

    /// First day of the last menstrual period (legacy column: `last_period_date`)
    pub lmp_date: String,

    /// Estimated due date (legacy column: `expected_due_date`)
    #[serde(default)]
    pub due_date: Option<String>,

    #[serde(default)]
    pub conception_date: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

fn default_true() -> bool {
    true
}

table_record!(PregnancyProfileRow, PREGNANCY_PROFILES);

/// Storage model for one logged menstrual cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenstrualCycleRow {
    pub id: String,
    pub user_id: String,

    /// First day of bleeding (legacy column: `period_start`)
    pub start_date: String,

    /// Last day of bleeding (legacy column: `period_end`)
    #[serde(default)]
    pub end_date: Option<String>,

    /// Cycle length in days as recorded by the user
    #[serde(default)]
    pub cycle_length: Option<u32>,

    /// Legacy column: `flow`
    #[serde(default)]
    pub flow_intensity: Option<String>,

    #[serde(default)]
    pub symptoms: Vec<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(MenstrualCycleRow, MENSTRUAL_CYCLES);
