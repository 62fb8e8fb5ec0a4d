use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use family_health_data::models::{InsurancePolicyRow, MedicalBillRow, MedicalDocumentRow, PrescriptionRow};
use family_health_data::store::TableClient;

use crate::entities::conversions;
use crate::entities::{
    Activity, BillStatus, BillSummary, CreateInsurancePolicyRequest, CreateMedicalBillRequest,
    CreateMedicalDocumentRequest, CreatePrescriptionRequest, InsurancePolicy, MedicalBill,
    MedicalDocument, Prescription,
};
use super::errors::ServiceError;
use super::gamification::GamificationServiceTrait;
use super::records::{DomainRecord, RecordService};

impl DomainRecord for Prescription {
    type Row = PrescriptionRow;
    type Create = CreatePrescriptionRequest;

    const LABEL: &'static str = "Prescription";
    const ACTIVITY: Option<Activity> = Some(Activity::PrescriptionAdded);
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

    fn from_row(row: PrescriptionRow) -> Result<Self, String> {
        conversions::convert_to_domain_prescription(row)
    }

    fn to_row(&self) -> PrescriptionRow {
        conversions::convert_to_data_prescription(self)
    }

    fn from_request(user_id: &str, request: CreatePrescriptionRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        Ok(Prescription {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            family_member_id: request.family_member_id,
            medication_name: request.medication_name.trim().to_string(),
            dosage: request.dosage,
            frequency: request.frequency,
            prescribing_doctor: request.prescribing_doctor,
            start_date: request.start_date,
            end_date: request.end_date,
            refills_remaining: request.refills_remaining,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }

    fn check(&self) -> Result<(), ServiceError> {
        match self.end_date {
            Some(end) if end < self.start_date => Err(ServiceError::Validation(
                "End date cannot be before the start date".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl DomainRecord for InsurancePolicy {
    type Row = InsurancePolicyRow;
    type Create = CreateInsurancePolicyRequest;

    const LABEL: &'static str = "Insurance policy";
    const ACTIVITY: Option<Activity> = Some(Activity::InsuranceAdded);

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: InsurancePolicyRow) -> Result<Self, String> {
        conversions::convert_to_domain_insurance_policy(row)
    }

    fn to_row(&self) -> InsurancePolicyRow {
        conversions::convert_to_data_insurance_policy(self)
    }

    fn from_request(user_id: &str, request: CreateInsurancePolicyRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        Ok(InsurancePolicy {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            family_member_id: request.family_member_id,
            provider_name: request.provider_name.trim().to_string(),
            policy_number: request.policy_number.trim().to_string(),
            policy_type: request.policy_type,
            coverage_amount: request.coverage_amount,
            premium_amount: request.premium_amount,
            start_date: request.start_date,
            expiry_date: request.expiry_date,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }

    fn check(&self) -> Result<(), ServiceError> {
        match (self.start_date, self.expiry_date) {
            (Some(start), Some(expiry)) if expiry < start => Err(ServiceError::Validation(
                "Expiry date cannot be before the start date".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl DomainRecord for MedicalBill {
    type Row = MedicalBillRow;
    type Create = CreateMedicalBillRequest;

    const LABEL: &'static str = "Medical bill";
    const ACTIVITY: Option<Activity> = Some(Activity::BillLogged);
    const ORDER_BY: Option<(&'static str, bool)> = Some(("bill_date", true));

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: MedicalBillRow) -> Result<Self, String> {
        conversions::convert_to_domain_medical_bill(row)
    }

    fn to_row(&self) -> MedicalBillRow {
        conversions::convert_to_data_medical_bill(self)
    }

    fn from_request(user_id: &str, request: CreateMedicalBillRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        Ok(MedicalBill {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            family_member_id: request.family_member_id,
            provider_name: request.provider_name.trim().to_string(),
            description: request.description,
            amount: request.amount,
            bill_date: request.bill_date,
            due_date: request.due_date,
            status: request.status.unwrap_or(BillStatus::Pending),
            insurance_policy_id: request.insurance_policy_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn check(&self) -> Result<(), ServiceError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ServiceError::Validation("Amount cannot be negative".to_string()));
        }
        Ok(())
    }
}

impl DomainRecord for MedicalDocument {
    type Row = MedicalDocumentRow;
    type Create = CreateMedicalDocumentRequest;

    const LABEL: &'static str = "Medical document";
    const ACTIVITY: Option<Activity> = Some(Activity::DocumentUploaded);

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: MedicalDocumentRow) -> Result<Self, String> {
        conversions::convert_to_domain_medical_document(row)
    }

    fn to_row(&self) -> MedicalDocumentRow {
        conversions::convert_to_data_medical_document(self)
    }

    fn from_request(user_id: &str, request: CreateMedicalDocumentRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        Ok(MedicalDocument {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            family_member_id: request.family_member_id,
            title: request.title.trim().to_string(),
            document_type: request.document_type,
            file_url: request.file_url,
            document_date: request.document_date,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Prescriptions, insurance policies, bills and documents
#[derive(Debug, Clone)]
pub struct MedicalRecordsService {
    pub prescriptions: RecordService<Prescription>,
    pub insurance_policies: RecordService<InsurancePolicy>,
    pub bills: RecordService<MedicalBill>,
    pub documents: RecordService<MedicalDocument>,
}

impl MedicalRecordsService {
    /// Create the service over a table client
    pub fn new(client: Arc<dyn TableClient>, gamification: Arc<dyn GamificationServiceTrait>) -> Self {
        Self {
            prescriptions: RecordService::new(client.clone()).with_gamification(gamification.clone()),
            insurance_policies: RecordService::new(client.clone()).with_gamification(gamification.clone()),
            bills: RecordService::new(client.clone()).with_gamification(gamification.clone()),
            documents: RecordService::new(client).with_gamification(gamification),
        }
    }

    /// Prescriptions whose course covers `today`
    pub async fn active_prescriptions(&self, user_id: &str, today: NaiveDate) -> Result<Vec<Prescription>, ServiceError> {
        let prescriptions = self.prescriptions.list(user_id, None).await?;
        let active: Vec<Prescription> = prescriptions
            .into_iter()
            .filter(|p| p.is_active_on(today))
            .collect();

        debug!("{} active prescription(s) on {}", active.len(), today);
        Ok(active)
    }

    /// Policies expiring within `days` of `today`, soonest first
    pub async fn expiring_policies(&self, user_id: &str, days: u32, today: NaiveDate) -> Result<Vec<InsurancePolicy>, ServiceError> {
        let mut expiring: Vec<InsurancePolicy> = self.insurance_policies
            .list(user_id, None)
            .await?
            .into_iter()
            .filter(|p| p.expires_within(days, today))
            .collect();

        expiring.sort_by_key(|p| p.expiry_date);
        Ok(expiring)
    }

    /// Totals over every bill of the user
    pub async fn bill_summary(&self, user_id: &str, today: NaiveDate) -> Result<BillSummary, ServiceError> {
        let bills = self.bills.list(user_id, None).await?;
        Ok(BillSummary::from_bills(&bills, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use family_health_data::store::InMemoryTableClient;
    use crate::testing::MockGamificationService;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> (MedicalRecordsService, Arc<MockGamificationService>) {
        let gamification = Arc::new(MockGamificationService::new());
        let service = MedicalRecordsService::new(Arc::new(InMemoryTableClient::new()), gamification.clone());
        (service, gamification)
    }

    fn prescription(name: &str, start: NaiveDate, end: Option<NaiveDate>) -> CreatePrescriptionRequest {
        CreatePrescriptionRequest {
            family_member_id: None,
            medication_name: name.to_string(),
            dosage: Some("5mg".to_string()),
            frequency: None,
            prescribing_doctor: None,
            start_date: start,
            end_date: end,
            refills_remaining: None,
            notes: None,
        }
    }

    fn policy(number: &str, expiry: Option<NaiveDate>) -> CreateInsurancePolicyRequest {
        CreateInsurancePolicyRequest {
            family_member_id: None,
            provider_name: "Acme Health".to_string(),
            policy_number: number.to_string(),
            policy_type: "health".to_string(),
            coverage_amount: None,
            premium_amount: None,
            start_date: None,
            expiry_date: expiry,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_active_prescriptions() {
        let (service, gamification) = service();
        let today = date(2024, 6, 1);

        service.prescriptions.create("u1", prescription("Current", date(2024, 5, 1), None)).await.unwrap();
        service.prescriptions.create("u1", prescription("Finished", date(2024, 1, 1), Some(date(2024, 2, 1)))).await.unwrap();
        service.prescriptions.create("u1", prescription("Future", date(2024, 7, 1), None)).await.unwrap();

        let active = service.active_prescriptions("u1", today).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].medication_name, "Current");
        assert_eq!(gamification.recorded(), vec![Activity::PrescriptionAdded; 3]);
    }

    #[tokio::test]
    async fn test_prescription_end_before_start_rejected() {
        let (service, gamification) = service();
        let result = service.prescriptions
            .create("u1", prescription("Bad", date(2024, 5, 1), Some(date(2024, 4, 1))))
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert!(gamification.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_expiring_policies_sorted() {
        let (service, _) = service();
        let today = date(2024, 6, 1);

        service.insurance_policies.create("u1", policy("late", Some(date(2024, 6, 20)))).await.unwrap();
        service.insurance_policies.create("u1", policy("soon", Some(date(2024, 6, 5)))).await.unwrap();
        service.insurance_policies.create("u1", policy("far", Some(date(2025, 1, 1)))).await.unwrap();
        service.insurance_policies.create("u1", policy("lapsed", Some(date(2024, 5, 1)))).await.unwrap();
        service.insurance_policies.create("u1", policy("none", None)).await.unwrap();

        let expiring = service.expiring_policies("u1", 30, today).await.unwrap();
        let numbers: Vec<&str> = expiring.iter().map(|p| p.policy_number.as_str()).collect();
        assert_eq!(numbers, vec!["soon", "late"]);
    }

    #[tokio::test]
    async fn test_bill_summary_uses_effective_status() {
        let (service, _) = service();
        let today = date(2024, 6, 1);

        for (amount, status, due) in [
            (80.0, Some(BillStatus::Paid), None),
            (40.0, None, Some(date(2024, 5, 1))),
            (10.0, None, Some(date(2024, 7, 1))),
        ] {
            let request = CreateMedicalBillRequest {
                family_member_id: None,
                provider_name: "City Hospital".to_string(),
                description: None,
                amount,
                bill_date: date(2024, 4, 1),
                due_date: due,
                status,
                insurance_policy_id: None,
            };
            service.bills.create("u1", request).await.unwrap();
        }

        let summary = service.bill_summary("u1", today).await.unwrap();
        assert_eq!(summary.total_billed, 130.0);
        assert_eq!(summary.total_paid, 80.0);
        assert_eq!(summary.total_outstanding, 50.0);
        assert_eq!(summary.overdue_count, 1);
    }

    #[tokio::test]
    async fn test_gamification_failure_does_not_fail_create() {
        let gamification = Arc::new(MockGamificationService::new().with_failure());
        let service = MedicalRecordsService::new(Arc::new(InMemoryTableClient::new()), gamification);

        let request = CreateMedicalDocumentRequest {
            family_member_id: None,
            title: "Blood work".to_string(),
            document_type: crate::entities::DocumentType::LabReport,
            file_url: Some("https://files.example/lab.pdf".to_string()),
            document_date: None,
            notes: None,
        };

        let document = service.documents.create("u1", request).await.unwrap();
        assert_eq!(document.title, "Blood work");
    }

    #[tokio::test]
    async fn test_clearing_legacy_expiry_date() {
        let client = Arc::new(InMemoryTableClient::new());
        let legacy = serde_json::json!({
            "id": "old-policy",
            "user_id": "u1",
            "provider": "Acme Health",
            "policy_no": "P-7",
            "policy_type": "health",
            "end_date": "2024-06-15",
        });
        client.insert("insurance_policies", legacy.as_object().cloned().unwrap()).await.unwrap();
        let service = MedicalRecordsService::new(client, Arc::new(MockGamificationService::new()));

        let before = service.insurance_policies.get("u1", "old-policy").await.unwrap();
        assert_eq!(before.expiry_date, Some(date(2024, 6, 15)));

        let patch = serde_json::json!({ "expiry_date": null }).as_object().cloned().unwrap();
        let updated = service.insurance_policies.update("u1", "old-policy", patch).await.unwrap();
        assert_eq!(updated.expiry_date, None);

        let after = service.insurance_policies.get("u1", "old-policy").await.unwrap();
        assert_eq!(after.expiry_date, None);
        assert_eq!(after.policy_number, "P-7");
    }
}
