//! Feeding, sleep and vaccination tracking for babies.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use family_health_data::models::{FeedingLogRow, SleepLogRow, VaccinationScheduleRow};
use family_health_data::store::TableClient;

use crate::entities::conversions;
use crate::entities::{
    Activity, AdministerVaccinationRequest, CreateFeedingLogRequest, CreateSleepLogRequest,
    CreateVaccinationRequest, DailyBabySummary, FamilyMember, FeedingLog, SleepLog,
    VaccinationSchedule, VaccinationStatusEntry,
};
use super::errors::ServiceError;
use super::gamification::GamificationServiceTrait;
use super::records::{DomainRecord, RecordService};

/// Completed weeks of age on a date
pub fn age_in_weeks(date_of_birth: NaiveDate, on: NaiveDate) -> u32 {
    let days = (on - date_of_birth).num_days();
    if days <= 0 { 0 } else { (days / 7) as u32 }
}

/// Completed calendar months of age on a date
pub fn age_in_months(date_of_birth: NaiveDate, on: NaiveDate) -> u32 {
    if on <= date_of_birth {
        return 0;
    }

    let mut months = (on.year() - date_of_birth.year()) * 12 + on.month() as i32 - date_of_birth.month() as i32;
    if on.day() < date_of_birth.day() {
        months -= 1;
    }
    months.max(0) as u32
}

impl DomainRecord for FeedingLog {
    type Row = FeedingLogRow;
    type Create = CreateFeedingLogRequest;

    const LABEL: &'static str = "Feeding log";
    const ACTIVITY: Option<Activity> = Some(Activity::FeedingLogged);
    const ORDER_BY: Option<(&'static str, bool)> = Some(("started_at", true));

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: FeedingLogRow) -> Result<Self, String> {
        conversions::convert_to_domain_feeding_log(row)
    }

    fn to_row(&self) -> FeedingLogRow {
        conversions::convert_to_data_feeding_log(self)
    }

    fn from_request(user_id: &str, request: CreateFeedingLogRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        Ok(FeedingLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            family_member_id: request.family_member_id,
            feeding_type: request.feeding_type,
            started_at: request.started_at.unwrap_or(now),
            duration_minutes: request.duration_minutes,
            amount_ml: request.amount_ml,
            side: request.side,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }
}

impl DomainRecord for SleepLog {
    type Row = SleepLogRow;
    type Create = CreateSleepLogRequest;

    const LABEL: &'static str = "Sleep log";
    const ACTIVITY: Option<Activity> = Some(Activity::SleepLogged);
    const ORDER_BY: Option<(&'static str, bool)> = Some(("started_at", true));

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: SleepLogRow) -> Result<Self, String> {
        conversions::convert_to_domain_sleep_log(row)
    }

    fn to_row(&self) -> SleepLogRow {
        conversions::convert_to_data_sleep_log(self)
    }

    fn from_request(user_id: &str, request: CreateSleepLogRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        Ok(SleepLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            family_member_id: request.family_member_id,
            started_at: request.started_at,
            ended_at: request.ended_at,
            quality: request.quality,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }

    fn check(&self) -> Result<(), ServiceError> {
        match self.ended_at {
            Some(end) if end < self.started_at => Err(ServiceError::Validation(
                "Sleep cannot end before it starts".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl DomainRecord for VaccinationSchedule {
    type Row = VaccinationScheduleRow;
    type Create = CreateVaccinationRequest;

    const LABEL: &'static str = "Vaccination";
    const ACTIVITY: Option<Activity> = Some(Activity::VaccinationScheduled);
    const ORDER_BY: Option<(&'static str, bool)> = Some(("scheduled_date", false));

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: VaccinationScheduleRow) -> Result<Self, String> {
        conversions::convert_to_domain_vaccination(row)
    }

    fn to_row(&self) -> VaccinationScheduleRow {
        conversions::convert_to_data_vaccination(self)
    }

    fn from_request(user_id: &str, request: CreateVaccinationRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        Ok(VaccinationSchedule {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            family_member_id: request.family_member_id,
            vaccine_name: request.vaccine_name.trim().to_string(),
            dose_number: request.dose_number.unwrap_or(1),
            scheduled_date: request.scheduled_date,
            administered_date: None,
            skipped: false,
            provider: request.provider,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Baby care logs and the summaries built from them
#[derive(Debug, Clone)]
pub struct BabyCareService {
    pub feedings: RecordService<FeedingLog>,
    pub sleeps: RecordService<SleepLog>,
    pub vaccinations: RecordService<VaccinationSchedule>,
    members: RecordService<FamilyMember>,
}

impl BabyCareService {
    /// Create the service over a table client
    pub fn new(client: Arc<dyn TableClient>, gamification: Arc<dyn GamificationServiceTrait>) -> Self {
        Self {
            feedings: RecordService::new(client.clone()).with_gamification(gamification.clone()),
            sleeps: RecordService::new(client.clone()).with_gamification(gamification.clone()),
            vaccinations: RecordService::new(client.clone()).with_gamification(gamification),
            members: RecordService::new(client),
        }
    }

    /// Feeding and sleep totals for one baby on one day.
    ///
    /// Only sleep sessions that start on the date and have ended are counted.
    pub async fn daily_summary(&self, user_id: &str, family_member_id: &str, date: NaiveDate) -> Result<DailyBabySummary, ServiceError> {
        let baby = self.members.get(user_id, family_member_id).await?;

        let feedings: Vec<FeedingLog> = self.feedings
            .list(user_id, Some(family_member_id))
            .await?
            .into_iter()
            .filter(|log| log.started_at.date_naive() == date)
            .collect();

        let sleep_minutes: Vec<i64> = self.sleeps
            .list(user_id, Some(family_member_id))
            .await?
            .iter()
            .filter(|log| log.started_at.date_naive() == date)
            .filter_map(SleepLog::duration_minutes)
            .collect();

        Ok(DailyBabySummary {
            family_member_id: family_member_id.to_string(),
            date,
            age_in_weeks: baby.date_of_birth.map(|dob| age_in_weeks(dob, date)),
            age_in_months: baby.date_of_birth.map(|dob| age_in_months(dob, date)),
            feeding_count: feedings.len(),
            total_feeding_minutes: feedings.iter().filter_map(|log| log.duration_minutes).sum(),
            total_feeding_ml: feedings.iter().filter_map(|log| log.amount_ml).sum(),
            sleep_sessions: sleep_minutes.len(),
            total_sleep_minutes: sleep_minutes.iter().sum(),
        })
    }

    /// Every scheduled dose with its status as of `today`
    pub async fn vaccination_statuses(&self, user_id: &str, family_member_id: Option<&str>, today: NaiveDate) -> Result<Vec<VaccinationStatusEntry>, ServiceError> {
        let schedules = self.vaccinations.list(user_id, family_member_id).await?;

        Ok(schedules
            .into_iter()
            .map(|schedule| {
                let status = schedule.status_on(today);
                VaccinationStatusEntry { schedule, status }
            })
            .collect())
    }

    /// Mark a dose as given
    pub async fn administer_vaccination(&self, user_id: &str, id: &str, request: AdministerVaccinationRequest, today: NaiveDate) -> Result<VaccinationSchedule, ServiceError> {
        let mut schedule = self.vaccinations.get(user_id, id).await?;
        if schedule.administered_date.is_some() {
            return Err(ServiceError::Validation(format!(
                "{} dose {} was already administered",
                schedule.vaccine_name, schedule.dose_number
            )));
        }

        schedule.administered_date = Some(request.administered_date.unwrap_or(today));
        schedule.skipped = false;
        if request.provider.is_some() {
            schedule.provider = request.provider;
        }

        let saved = self.vaccinations.save(schedule).await?;
        info!("Recorded {} dose {} as administered", saved.vaccine_name, saved.dose_number);
        self.vaccinations.award(user_id, Activity::VaccinationRecorded).await;

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use family_health_data::store::InMemoryTableClient;

    use crate::entities::{CreateFamilyMemberRequest, FeedingType, Relationship, VaccinationStatus};
    use crate::testing::MockGamificationService;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    struct Fixture {
        service: BabyCareService,
        gamification: Arc<MockGamificationService>,
        baby_id: String,
    }

    async fn fixture() -> Fixture {
        let client: Arc<dyn TableClient> = Arc::new(InMemoryTableClient::new());
        let gamification = Arc::new(MockGamificationService::new());
        let service = BabyCareService::new(client.clone(), gamification.clone());

        let members: RecordService<FamilyMember> = RecordService::new(client);
        let baby = members
            .create("u1", CreateFamilyMemberRequest {
                full_name: "Baby".to_string(),
                relationship: Relationship::Child,
                date_of_birth: Some(date(2024, 1, 15)),
                gender: None,
                blood_type: None,
                allergies: vec![],
                chronic_conditions: vec![],
                emergency_contact: None,
            })
            .await
            .unwrap();

        Fixture { service, gamification, baby_id: baby.id }
    }

    fn feeding(baby: &str, started_at: DateTime<Utc>, minutes: Option<u32>, ml: Option<f64>) -> CreateFeedingLogRequest {
        CreateFeedingLogRequest {
            family_member_id: baby.to_string(),
            feeding_type: if ml.is_some() { FeedingType::Bottle } else { FeedingType::Breast },
            started_at: Some(started_at),
            duration_minutes: minutes,
            amount_ml: ml,
            side: None,
            notes: None,
        }
    }

    fn sleep(baby: &str, started_at: DateTime<Utc>, ended_at: Option<DateTime<Utc>>) -> CreateSleepLogRequest {
        CreateSleepLogRequest {
            family_member_id: baby.to_string(),
            started_at,
            ended_at,
            quality: None,
            notes: None,
        }
    }

    #[test]
    fn test_age_helpers() {
        let dob = date(2024, 1, 31);
        assert_eq!(age_in_weeks(dob, date(2024, 1, 31)), 0);
        assert_eq!(age_in_weeks(dob, date(2024, 2, 14)), 2);
        assert_eq!(age_in_months(dob, date(2024, 2, 29)), 0);
        assert_eq!(age_in_months(dob, date(2024, 3, 31)), 2);
        assert_eq!(age_in_months(dob, date(2023, 12, 1)), 0);
    }

    #[tokio::test]
    async fn test_daily_summary_totals() {
        let f = fixture().await;
        let baby = f.baby_id.as_str();

        f.service.feedings.create("u1", feeding(baby, at(2024, 3, 1, 6), Some(20), None)).await.unwrap();
        f.service.feedings.create("u1", feeding(baby, at(2024, 3, 1, 10), Some(10), Some(120.0))).await.unwrap();
        f.service.feedings.create("u1", feeding(baby, at(2024, 3, 2, 6), Some(15), None)).await.unwrap();

        f.service.sleeps.create("u1", sleep(baby, at(2024, 3, 1, 12), Some(at(2024, 3, 1, 14)))).await.unwrap();
        // Still asleep, not counted
        f.service.sleeps.create("u1", sleep(baby, at(2024, 3, 1, 20), None)).await.unwrap();

        let summary = f.service.daily_summary("u1", baby, date(2024, 3, 1)).await.unwrap();
        assert_eq!(summary.feeding_count, 2);
        assert_eq!(summary.total_feeding_minutes, 30);
        assert_eq!(summary.total_feeding_ml, 120.0);
        assert_eq!(summary.sleep_sessions, 1);
        assert_eq!(summary.total_sleep_minutes, 120);
        assert_eq!(summary.age_in_weeks, Some(6));
        assert_eq!(summary.age_in_months, Some(1));
    }

    #[tokio::test]
    async fn test_daily_summary_unknown_baby() {
        let f = fixture().await;
        let result = f.service.daily_summary("u2", &f.baby_id, date(2024, 3, 1)).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sleep_must_end_after_start() {
        let f = fixture().await;
        let result = f.service
            .sleeps
            .create("u1", sleep(&f.baby_id, at(2024, 3, 1, 12), Some(at(2024, 3, 1, 11))))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_administer_vaccination() {
        let f = fixture().await;
        let scheduled = f.service
            .vaccinations
            .create("u1", CreateVaccinationRequest {
                family_member_id: f.baby_id.clone(),
                vaccine_name: "DTaP".to_string(),
                dose_number: None,
                scheduled_date: date(2024, 3, 15),
                provider: None,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(scheduled.dose_number, 1);

        let today = date(2024, 3, 10);
        let statuses = f.service.vaccination_statuses("u1", Some(&f.baby_id), today).await.unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].status, VaccinationStatus::DueSoon);

        let given = f.service
            .administer_vaccination("u1", &scheduled.id, AdministerVaccinationRequest {
                administered_date: None,
                provider: Some("City Clinic".to_string()),
            }, today)
            .await
            .unwrap();
        assert_eq!(given.administered_date, Some(today));
        assert_eq!(given.provider.as_deref(), Some("City Clinic"));
        assert_eq!(given.status_on(today), VaccinationStatus::Completed);

        let again = f.service
            .administer_vaccination("u1", &scheduled.id, AdministerVaccinationRequest::default(), today)
            .await;
        assert!(matches!(again, Err(ServiceError::Validation(_))));

        assert_eq!(
            f.gamification.recorded(),
            vec![Activity::VaccinationScheduled, Activity::VaccinationRecorded]
        );
    }
}
