//! Pregnancy date math and profile tracking.
//!
//! All dates are calendar days. A pregnancy is 280 days from the first day
//! of the last menstrual period (LMP), or 266 days from conception.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use family_health_data::models::PregnancyProfileRow;
use family_health_data::store::{Row, TableClient};

use crate::entities::conversions;
use crate::entities::{
    Activity, CreatePregnancyProfileRequest, GestationalAge, PregnancyProfile, PregnancyStatus, Trimester,
};
use super::errors::{offset_date, ServiceError};
use super::gamification::GamificationServiceTrait;
use super::records::{DomainRecord, RecordService};

/// Days from LMP to the estimated due date
pub const PREGNANCY_DAYS_FROM_LMP: i64 = 280;

/// Days from conception to the estimated due date
pub const PREGNANCY_DAYS_FROM_CONCEPTION: i64 = 266;

/// Size of the baby by gestational week, from week 4
const SIZE_COMPARISONS: &[(u32, &str)] = &[
    (4, "poppy seed"),
    (5, "sesame seed"),
    (6, "lentil"),
    (7, "blueberry"),
    (8, "raspberry"),
    (9, "cherry"),
    (10, "strawberry"),
    (11, "lime"),
    (12, "plum"),
    (13, "peach"),
    (14, "lemon"),
    (15, "apple"),
    (16, "avocado"),
    (17, "pear"),
    (18, "bell pepper"),
    (19, "mango"),
    (20, "banana"),
    (21, "carrot"),
    (22, "papaya"),
    (23, "grapefruit"),
    (24, "cantaloupe"),
    (25, "cauliflower"),
    (26, "lettuce"),
    (27, "cabbage"),
    (28, "eggplant"),
    (29, "butternut squash"),
    (30, "cucumber"),
    (31, "coconut"),
    (32, "jicama"),
    (33, "pineapple"),
    (34, "honeydew melon"),
    (35, "spaghetti squash"),
    (36, "romaine lettuce"),
    (37, "swiss chard"),
    (38, "leek"),
    (39, "mini watermelon"),
    (40, "pumpkin"),
];

/// Estimated due date from the last menstrual period
pub fn due_date_from_lmp(lmp: NaiveDate) -> Result<NaiveDate, ServiceError> {
    offset_date(lmp, PREGNANCY_DAYS_FROM_LMP)
}

/// Estimated due date from the conception date
pub fn due_date_from_conception(conception: NaiveDate) -> Result<NaiveDate, ServiceError> {
    offset_date(conception, PREGNANCY_DAYS_FROM_CONCEPTION)
}

/// Last menstrual period implied by a due date
pub fn lmp_from_due_date(due: NaiveDate) -> Result<NaiveDate, ServiceError> {
    offset_date(due, -PREGNANCY_DAYS_FROM_LMP)
}

/// Weeks and days since the LMP; an error when `today` precedes it
pub fn gestational_age(lmp: NaiveDate, today: NaiveDate) -> Result<GestationalAge, ServiceError> {
    let total_days = (today - lmp).num_days();
    if total_days < 0 {
        return Err(ServiceError::Validation(format!(
            "Date {} is before the last menstrual period {}",
            today, lmp
        )));
    }

    let total_days = total_days as u32;
    Ok(GestationalAge {
        weeks: total_days / 7,
        days: total_days % 7,
        total_days,
    })
}

/// Trimester for a gestational week
pub fn trimester(week: u32) -> Trimester {
    match week {
        0..=13 => Trimester::First,
        14..=27 => Trimester::Second,
        _ => Trimester::Third,
    }
}

/// Days left until the due date, negative once it has passed
pub fn days_until_due(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// Share of the 280-day pregnancy elapsed, capped at 100 and rounded to one decimal
pub fn progress_percent(total_days: u32) -> f64 {
    let percent = (f64::from(total_days) / PREGNANCY_DAYS_FROM_LMP as f64 * 100.0).min(100.0);
    (percent * 10.0).round() / 10.0
}

/// Fruit-size comparison for a gestational week; none before week 4
pub fn size_comparison(week: u32) -> Option<&'static str> {
    let week = week.min(40);
    SIZE_COMPARISONS
        .iter()
        .find(|(w, _)| *w == week)
        .map(|(_, size)| *size)
}

/// Snapshot of a pregnancy anchored on `lmp` as of `today`
pub fn pregnancy_status(lmp: NaiveDate, due: NaiveDate, today: NaiveDate) -> Result<PregnancyStatus, ServiceError> {
    let age = gestational_age(lmp, today)?;

    Ok(PregnancyStatus {
        profile_id: None,
        lmp_date: lmp,
        due_date: due,
        gestational_age: age,
        trimester: trimester(age.weeks),
        days_until_due: days_until_due(due, today),
        progress_percent: progress_percent(age.total_days),
        size_comparison: size_comparison(age.weeks).map(String::from),
    })
}

impl DomainRecord for PregnancyProfile {
    type Row = PregnancyProfileRow;
    type Create = CreatePregnancyProfileRequest;

    const LABEL: &'static str = "Pregnancy profile";
    const ACTIVITY: Option<Activity> = Some(Activity::PregnancyStarted);
    const ORDER_BY: Option<(&'static str, bool)> = Some(("lmp_date", true));

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: PregnancyProfileRow) -> Result<Self, String> {
        conversions::convert_to_domain_pregnancy_profile(row)
    }

    fn to_row(&self) -> PregnancyProfileRow {
        conversions::convert_to_data_pregnancy_profile(self)
    }

    fn from_request(user_id: &str, request: CreatePregnancyProfileRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        let due_date = match (request.due_date, request.lmp_date, request.conception_date) {
            (Some(due), _, _) => due,
            (None, Some(lmp), _) => due_date_from_lmp(lmp)?,
            (None, None, Some(conception)) => due_date_from_conception(conception)?,
            (None, None, None) => {
                return Err(ServiceError::Validation(
                    "One of lmp_date, due_date or conception_date is required".to_string(),
                ));
            },
        };
        let lmp_date = match request.lmp_date {
            Some(lmp) => lmp,
            None => lmp_from_due_date(due_date)?,
        };

        Ok(PregnancyProfile {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            lmp_date,
            due_date,
            conception_date: request.conception_date,
            is_active: true,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.due_date <= self.lmp_date {
            return Err(ServiceError::Validation("Due date must be after the last menstrual period".to_string()));
        }
        Ok(())
    }

    fn after_patch(&mut self, patch: &Row) -> Result<(), ServiceError> {
        // A new LMP without an explicit due date moves the due date with it
        if patch.contains_key("lmp_date") && !patch.contains_key("due_date") {
            self.due_date = due_date_from_lmp(self.lmp_date)?;
        }
        Ok(())
    }
}

/// Pregnancy profiles and their status
#[derive(Debug, Clone)]
pub struct PregnancyService {
    pub profiles: RecordService<PregnancyProfile>,
}

impl PregnancyService {
    /// Create the service over a table client
    pub fn new(client: Arc<dyn TableClient>, gamification: Arc<dyn GamificationServiceTrait>) -> Self {
        Self {
            profiles: RecordService::new(client).with_gamification(gamification),
        }
    }

    /// The active profile with the most recent LMP
    pub async fn current_profile(&self, user_id: &str) -> Result<PregnancyProfile, ServiceError> {
        self.profiles
            .list(user_id, None)
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .max_by_key(|p| p.lmp_date)
            .ok_or_else(|| ServiceError::NotFound("No active pregnancy profile".to_string()))
    }

    /// Status of the current profile as of `today`
    pub async fn current_status(&self, user_id: &str, today: NaiveDate) -> Result<PregnancyStatus, ServiceError> {
        let profile = self.current_profile(user_id).await?;
        debug!("Computing pregnancy status for profile {}", profile.id);
        status_for_profile(&profile, today)
    }
}

/// Status of a stored profile as of `today`
pub fn status_for_profile(profile: &PregnancyProfile, today: NaiveDate) -> Result<PregnancyStatus, ServiceError> {
    let mut status = pregnancy_status(profile.lmp_date, profile.due_date, today)?;
    status.profile_id = Some(profile.id.clone());
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    use family_health_data::store::InMemoryTableClient;
    use serde_json::json;
    use crate::testing::MockGamificationService;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> PregnancyService {
        PregnancyService::new(Arc::new(InMemoryTableClient::new()), Arc::new(MockGamificationService::new()))
    }

    fn request(lmp: Option<NaiveDate>, due: Option<NaiveDate>, conception: Option<NaiveDate>) -> CreatePregnancyProfileRequest {
        CreatePregnancyProfileRequest {
            lmp_date: lmp,
            due_date: due,
            conception_date: conception,
            notes: None,
        }
    }

    #[test]
    fn test_due_date_is_lmp_plus_280_days() {
        let lmp = date(2024, 1, 1);
        assert_eq!(due_date_from_lmp(lmp).unwrap(), date(2024, 10, 7));
        assert_eq!(lmp_from_due_date(due_date_from_lmp(lmp).unwrap()).unwrap(), lmp);
        assert_eq!(due_date_from_conception(date(2024, 1, 15)).unwrap(), date(2024, 10, 7));
    }

    #[test]
    fn test_due_date_at_calendar_edges_is_rejected() {
        assert!(matches!(due_date_from_lmp(NaiveDate::MAX), Err(ServiceError::Validation(_))));
        assert!(matches!(due_date_from_conception(NaiveDate::MAX), Err(ServiceError::Validation(_))));
        assert!(matches!(lmp_from_due_date(NaiveDate::MIN), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_gestational_age() {
        let lmp = date(2024, 1, 1);
        let age = gestational_age(lmp, date(2024, 3, 1)).unwrap();
        assert_eq!(age.total_days, 60);
        assert_eq!(age.weeks, 8);
        assert_eq!(age.days, 4);

        assert!(gestational_age(lmp, date(2023, 12, 31)).is_err());
        assert_eq!(gestational_age(lmp, lmp).unwrap().total_days, 0);
    }

    #[test]
    fn test_trimester_boundaries() {
        assert_eq!(trimester(0), Trimester::First);
        assert_eq!(trimester(13), Trimester::First);
        assert_eq!(trimester(14), Trimester::Second);
        assert_eq!(trimester(27), Trimester::Second);
        assert_eq!(trimester(28), Trimester::Third);
        assert_eq!(trimester(42), Trimester::Third);
    }

    #[test]
    fn test_progress_is_capped() {
        assert_eq!(progress_percent(0), 0.0);
        assert_eq!(progress_percent(140), 50.0);
        assert_eq!(progress_percent(300), 100.0);
    }

    #[test]
    fn test_size_comparison() {
        assert_eq!(size_comparison(3), None);
        assert_eq!(size_comparison(4), Some("poppy seed"));
        assert_eq!(size_comparison(20), Some("banana"));
        assert_eq!(size_comparison(43), Some("pumpkin"));
    }

    #[test]
    fn test_pregnancy_status() {
        let lmp = date(2024, 1, 1);
        let status = pregnancy_status(lmp, due_date_from_lmp(lmp).unwrap(), date(2024, 5, 20)).unwrap();
        assert_eq!(status.gestational_age.weeks, 20);
        assert_eq!(status.trimester, Trimester::Second);
        assert_eq!(status.days_until_due, 140);
        assert_eq!(status.size_comparison.as_deref(), Some("banana"));
    }

    #[tokio::test]
    async fn test_create_fills_missing_dates() {
        let service = service();

        let from_lmp = service.profiles.create("u1", request(Some(date(2024, 1, 1)), None, None)).await.unwrap();
        assert_eq!(from_lmp.due_date, date(2024, 10, 7));

        let from_due = service.profiles.create("u1", request(None, Some(date(2024, 10, 7)), None)).await.unwrap();
        assert_eq!(from_due.lmp_date, date(2024, 1, 1));

        let missing = service.profiles.create("u1", request(None, None, None)).await;
        assert!(matches!(missing, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_current_profile_is_latest_active() {
        let service = service();
        service.profiles.create("u1", request(Some(date(2022, 1, 1)), None, None)).await.unwrap();
        let latest = service.profiles.create("u1", request(Some(date(2024, 2, 1)), None, None)).await.unwrap();
        let inactive = service.profiles.create("u1", request(Some(date(2024, 3, 1)), None, None)).await.unwrap();

        let patch = json!({ "is_active": false }).as_object().cloned().unwrap();
        service.profiles.update("u1", &inactive.id, patch).await.unwrap();

        let current = service.current_profile("u1").await.unwrap();
        assert_eq!(current.id, latest.id);

        let status = service.current_status("u1", date(2024, 3, 1)).await.unwrap();
        assert_eq!(status.profile_id.as_deref(), Some(latest.id.as_str()));
        assert_eq!(status.gestational_age.total_days, 29);
    }

    #[tokio::test]
    async fn test_no_profile_is_not_found() {
        let result = service().current_status("nobody", date(2024, 1, 1)).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_patching_lmp_moves_due_date() {
        let service = service();
        let profile = service.profiles.create("u1", request(Some(date(2024, 1, 1)), None, None)).await.unwrap();

        let patch = json!({ "lmp_date": "2024-01-08" }).as_object().cloned().unwrap();
        let updated = service.profiles.update("u1", &profile.id, patch).await.unwrap();
        assert_eq!(updated.due_date, date(2024, 10, 14));
    }

    #[tokio::test]
    async fn test_patching_lmp_to_last_calendar_day_is_rejected() {
        let service = service();
        let profile = service.profiles.create("u1", request(Some(date(2024, 1, 1)), None, None)).await.unwrap();

        let patch = json!({ "lmp_date": NaiveDate::MAX.to_string() }).as_object().cloned().unwrap();
        let result = service.profiles.update("u1", &profile.id, patch).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let unchanged = service.profiles.get("u1", &profile.id).await.unwrap();
        assert_eq!(unchanged.lmp_date, date(2024, 1, 1));
    }

    #[tokio::test]
    async fn test_create_from_last_calendar_day_is_rejected() {
        let result = service().profiles.create("u1", request(Some(NaiveDate::MAX), None, None)).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
