use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

string_enum! {
    /// Kind of wellness measurement
    pub enum VitalType {
        Weight => "weight",
        HeartRate => "heart_rate",
        /// `value` is systolic, `secondary_value` diastolic
        BloodPressure => "blood_pressure",
        Temperature => "temperature",
        BloodGlucose => "blood_glucose",
        OxygenSaturation => "oxygen_saturation",
        Steps => "steps",
        SleepHours => "sleep_hours",
        WaterIntake => "water_intake",
    }
}

impl VitalType {
    /// Unit used when a log does not name one
    pub fn default_unit(&self) -> &'static str {
        match self {
            VitalType::Weight => "kg",
            VitalType::HeartRate => "bpm",
            VitalType::BloodPressure => "mmHg",
            VitalType::Temperature => "°C",
            VitalType::BloodGlucose => "mg/dL",
            VitalType::OxygenSaturation => "%",
            VitalType::Steps => "steps",
            VitalType::SleepHours => "hours",
            VitalType::WaterIntake => "ml",
        }
    }
}

string_enum! {
    /// Blood pressure category based on measurements
    pub enum BloodPressureCategory {
        /// systolic < 120 and diastolic < 80
        Normal => "normal",
        /// systolic 120-129 and diastolic < 80
        Elevated => "elevated",
        /// systolic 130-139 or diastolic 80-89
        Hypertension1 => "hypertension_stage1",
        /// systolic >= 140 or diastolic >= 90
        Hypertension2 => "hypertension_stage2",
        /// systolic >= 180 or diastolic >= 120
        HypertensiveCrisis => "hypertensive_crisis",
    }
}

/// A single vital measurement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct VitalLog {
    pub id: String,
    pub user_id: String,
    pub family_member_id: Option<String>,
    pub vital_type: VitalType,
    #[validate(range(min = 0.0, message = "Value cannot be negative"))]
    pub value: f64,
    #[validate(range(min = 0.0, message = "Secondary value cannot be negative"))]
    pub secondary_value: Option<f64>,
    pub unit: String,
    pub recorded_at: DateTime<Utc>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for logging a vital
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateVitalLogRequest {
    #[serde(default)]
    pub family_member_id: Option<String>,

    pub vital_type: VitalType,

    #[validate(range(min = 0.0, message = "Value cannot be negative"))]
    pub value: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Secondary value cannot be negative"))]
    pub secondary_value: Option<f64>,

    /// Defaults to the vital type's unit
    #[serde(default)]
    pub unit: Option<String>,

    /// Defaults to now
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// Statistics for one vital type over a timeframe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct VitalSummary {
    pub vital_type: VitalType,
    pub period_days: u32,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    /// Average diastolic for blood pressure
    pub secondary_average: Option<f64>,
    pub latest_value: f64,
    pub latest_secondary_value: Option<f64>,
    pub latest_recorded_at: DateTime<Utc>,
    pub unit: String,
    /// Category of the average reading, blood pressure only
    pub blood_pressure_category: Option<BloodPressureCategory>,
    pub generated_at: DateTime<Utc>,
}
