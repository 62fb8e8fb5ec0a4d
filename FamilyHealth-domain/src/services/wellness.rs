//! Vital sign logs and summaries.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use family_health_data::models::VitalLogRow;
use family_health_data::store::TableClient;

use crate::entities::conversions;
use crate::entities::{Activity, BloodPressureCategory, CreateVitalLogRequest, VitalLog, VitalSummary, VitalType};
use super::errors::ServiceError;
use super::gamification::GamificationServiceTrait;
use super::records::{DomainRecord, RecordService};

/// Categorize blood pressure based on measurements
pub fn categorize_blood_pressure(systolic: f64, diastolic: f64) -> BloodPressureCategory {
    if systolic >= 180.0 || diastolic >= 120.0 {
        BloodPressureCategory::HypertensiveCrisis
    } else if systolic >= 140.0 || diastolic >= 90.0 {
        BloodPressureCategory::Hypertension2
    } else if systolic >= 130.0 || diastolic >= 80.0 {
        BloodPressureCategory::Hypertension1
    } else if systolic >= 120.0 {
        BloodPressureCategory::Elevated
    } else {
        BloodPressureCategory::Normal
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(round2(values.iter().sum::<f64>() / values.len() as f64))
    }
}

/// Summarize readings of one vital type.
///
/// `logs` may hold any mix of types; only `vital_type` readings are used.
pub fn summarize_vitals(logs: &[VitalLog], vital_type: VitalType, period_days: u32, now: DateTime<Utc>) -> Result<VitalSummary, ServiceError> {
    let readings: Vec<&VitalLog> = logs.iter().filter(|log| log.vital_type == vital_type).collect();

    let latest = readings
        .iter()
        .max_by_key(|log| log.recorded_at)
        .ok_or_else(|| ServiceError::InsufficientData(format!(
            "No {} readings in the last {} days",
            vital_type, period_days
        )))?;

    let values: Vec<f64> = readings.iter().map(|log| log.value).collect();
    let secondary: Vec<f64> = readings.iter().filter_map(|log| log.secondary_value).collect();

    let average = mean(&values).unwrap_or_default();
    let secondary_average = mean(&secondary);

    let blood_pressure_category = match (vital_type, secondary_average) {
        (VitalType::BloodPressure, Some(diastolic)) => Some(categorize_blood_pressure(average, diastolic)),
        _ => None,
    };

    Ok(VitalSummary {
        vital_type,
        period_days,
        count: readings.len(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        average,
        secondary_average,
        latest_value: latest.value,
        latest_secondary_value: latest.secondary_value,
        latest_recorded_at: latest.recorded_at,
        unit: latest.unit.clone(),
        blood_pressure_category,
        generated_at: now,
    })
}

impl DomainRecord for VitalLog {
    type Row = VitalLogRow;
    type Create = CreateVitalLogRequest;

    const LABEL: &'static str = "Vital log";
    const ACTIVITY: Option<Activity> = Some(Activity::VitalLogged);
    const ORDER_BY: Option<(&'static str, bool)> = Some(("recorded_at", true));

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: VitalLogRow) -> Result<Self, String> {
        conversions::convert_to_domain_vital_log(row)
    }

    fn to_row(&self) -> VitalLogRow {
        conversions::convert_to_data_vital_log(self)
    }

    fn from_request(user_id: &str, request: CreateVitalLogRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        let unit = request
            .unit
            .filter(|unit| !unit.trim().is_empty())
            .unwrap_or_else(|| request.vital_type.default_unit().to_string());

        Ok(VitalLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            family_member_id: request.family_member_id,
            vital_type: request.vital_type,
            value: request.value,
            secondary_value: request.secondary_value,
            unit,
            recorded_at: request.recorded_at.unwrap_or(now),
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.vital_type != VitalType::BloodPressure {
            return Ok(());
        }

        match self.secondary_value {
            None => Err(ServiceError::Validation(
                "Blood pressure needs a diastolic reading".to_string(),
            )),
            Some(diastolic) if self.value <= diastolic => Err(ServiceError::Validation(
                "Systolic pressure must be greater than diastolic pressure".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}

/// Vital logs and their summaries
#[derive(Debug, Clone)]
pub struct WellnessService {
    pub vitals: RecordService<VitalLog>,
}

impl WellnessService {
    /// Create the service over a table client
    pub fn new(client: Arc<dyn TableClient>, gamification: Arc<dyn GamificationServiceTrait>) -> Self {
        Self {
            vitals: RecordService::new(client).with_gamification(gamification),
        }
    }

    /// Summary of one vital type over the last `days` days
    pub async fn summary(
        &self,
        user_id: &str,
        vital_type: VitalType,
        days: u32,
        family_member_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<VitalSummary, ServiceError> {
        let since = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let logs: Vec<VitalLog> = self.vitals
            .list(user_id, family_member_id)
            .await?
            .into_iter()
            .filter(|log| log.recorded_at >= since && log.recorded_at <= now)
            .collect();

        debug!("Summarizing {} vital log(s) since {}", logs.len(), since);
        summarize_vitals(&logs, vital_type, days, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use family_health_data::store::InMemoryTableClient;
    use crate::testing::MockGamificationService;

    #[test]
    fn test_bp_category_normal() {
        assert_eq!(categorize_blood_pressure(110.0, 75.0), BloodPressureCategory::Normal);
    }

    #[test]
    fn test_bp_category_elevated() {
        assert_eq!(categorize_blood_pressure(125.0, 75.0), BloodPressureCategory::Elevated);
    }

    #[test]
    fn test_bp_category_hypertension1() {
        // Systolic in range
        assert_eq!(categorize_blood_pressure(135.0, 75.0), BloodPressureCategory::Hypertension1);
        // Diastolic in range
        assert_eq!(categorize_blood_pressure(120.0, 85.0), BloodPressureCategory::Hypertension1);
    }

    #[test]
    fn test_bp_category_hypertension2() {
        assert_eq!(categorize_blood_pressure(145.0, 75.0), BloodPressureCategory::Hypertension2);
        assert_eq!(categorize_blood_pressure(120.0, 95.0), BloodPressureCategory::Hypertension2);
    }

    #[test]
    fn test_bp_category_crisis() {
        assert_eq!(categorize_blood_pressure(185.0, 75.0), BloodPressureCategory::HypertensiveCrisis);
        assert_eq!(categorize_blood_pressure(120.0, 125.0), BloodPressureCategory::HypertensiveCrisis);
    }

    fn service() -> WellnessService {
        WellnessService::new(Arc::new(InMemoryTableClient::new()), Arc::new(MockGamificationService::new()))
    }

    fn reading(vital_type: VitalType, value: f64, secondary: Option<f64>, hours_ago: i64) -> CreateVitalLogRequest {
        CreateVitalLogRequest {
            family_member_id: None,
            vital_type,
            value,
            secondary_value: secondary,
            unit: None,
            recorded_at: Some(Utc::now() - Duration::hours(hours_ago)),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_default_unit_applied() {
        let log = service()
            .vitals
            .create("u1", reading(VitalType::HeartRate, 72.0, None, 1))
            .await
            .unwrap();
        assert_eq!(log.unit, "bpm");
    }

    #[tokio::test]
    async fn test_blood_pressure_validation() {
        let service = service();

        let missing = service.vitals.create("u1", reading(VitalType::BloodPressure, 120.0, None, 1)).await;
        assert!(matches!(missing, Err(ServiceError::Validation(_))));

        let inverted = service.vitals.create("u1", reading(VitalType::BloodPressure, 80.0, Some(120.0), 1)).await;
        assert!(matches!(inverted, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_blood_pressure_summary() {
        let service = service();
        for (systolic, diastolic, hours_ago) in [(128.0, 78.0, 30), (132.0, 82.0, 2), (130.0, 80.0, 400)] {
            service
                .vitals
                .create("u1", reading(VitalType::BloodPressure, systolic, Some(diastolic), hours_ago))
                .await
                .unwrap();
        }
        service.vitals.create("u1", reading(VitalType::Weight, 70.0, None, 1)).await.unwrap();

        let summary = service
            .summary("u1", VitalType::BloodPressure, 7, None, Utc::now())
            .await
            .unwrap();

        // The 400-hour-old reading is outside the week
        assert_eq!(summary.count, 2);
        assert_eq!(summary.min, 128.0);
        assert_eq!(summary.max, 132.0);
        assert_eq!(summary.average, 130.0);
        assert_eq!(summary.secondary_average, Some(80.0));
        assert_eq!(summary.latest_value, 132.0);
        assert_eq!(summary.unit, "mmHg");
        assert_eq!(summary.blood_pressure_category, Some(BloodPressureCategory::Hypertension1));
    }

    #[tokio::test]
    async fn test_summary_without_readings() {
        let result = service()
            .summary("u1", VitalType::Steps, 30, None, Utc::now())
            .await;
        assert!(matches!(result, Err(ServiceError::InsufficientData(_))));
    }
}
