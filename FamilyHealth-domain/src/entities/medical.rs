use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// A course of medication prescribed to the user or a family member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Prescription {
    pub id: String,
    pub user_id: String,
    pub family_member_id: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Medication name must be between 1 and 200 characters"))]
    pub medication_name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub prescribing_doctor: Option<String>,
    pub start_date: NaiveDate,
    /// Open-ended when absent
    pub end_date: Option<NaiveDate>,
    #[validate(range(max = 99, message = "Refills cannot exceed 99"))]
    pub refills_remaining: Option<u32>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prescription {
    /// Whether the course covers a date
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| end >= date)
    }
}

/// Request payload for adding a prescription
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreatePrescriptionRequest {
    #[serde(default)]
    pub family_member_id: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Medication name must be between 1 and 200 characters"))]
    pub medication_name: String,

    #[serde(default)]
    pub dosage: Option<String>,

    #[serde(default)]
    pub frequency: Option<String>,

    #[serde(default)]
    pub prescribing_doctor: Option<String>,

    pub start_date: NaiveDate,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(range(max = 99, message = "Refills cannot exceed 99"))]
    pub refills_remaining: Option<u32>,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// A health insurance policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct InsurancePolicy {
    pub id: String,
    pub user_id: String,
    pub family_member_id: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Provider name must be between 1 and 200 characters"))]
    pub provider_name: String,
    #[validate(length(min = 1, max = 100, message = "Policy number must be between 1 and 100 characters"))]
    pub policy_number: String,
    pub policy_type: String,
    #[validate(range(min = 0.0, message = "Coverage amount cannot be negative"))]
    pub coverage_amount: Option<f64>,
    #[validate(range(min = 0.0, message = "Premium amount cannot be negative"))]
    pub premium_amount: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsurancePolicy {
    /// Whether the policy expires between `today` and `today + days`, inclusive
    pub fn expires_within(&self, days: u32, today: NaiveDate) -> bool {
        match self.expiry_date {
            Some(expiry) => {
                let horizon = today.checked_add_days(Days::new(u64::from(days)));
                expiry >= today && horizon.map_or(true, |limit| expiry <= limit)
            },
            None => false,
        }
    }

    /// Whether the policy has already lapsed
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.map_or(false, |expiry| expiry < today)
    }
}

/// Request payload for adding an insurance policy
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateInsurancePolicyRequest {
    #[serde(default)]
    pub family_member_id: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Provider name must be between 1 and 200 characters"))]
    pub provider_name: String,

    #[validate(length(min = 1, max = 100, message = "Policy number must be between 1 and 100 characters"))]
    pub policy_number: String,

    #[serde(default = "default_policy_type")]
    pub policy_type: String,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Coverage amount cannot be negative"))]
    pub coverage_amount: Option<f64>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Premium amount cannot be negative"))]
    pub premium_amount: Option<f64>,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,

    #[serde(default)]
    pub notes: Option<String>,
}

fn default_policy_type() -> String {
    "health".to_string()
}

string_enum! {
    /// Payment state of a medical bill
    pub enum BillStatus {
        Pending => "pending",
        Paid => "paid",
        /// Submitted to insurance
        Claimed => "claimed",
        Overdue => "overdue",
    }
}

/// A bill from a healthcare provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MedicalBill {
    pub id: String,
    pub user_id: String,
    pub family_member_id: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Provider name must be between 1 and 200 characters"))]
    pub provider_name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub amount: f64,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: BillStatus,
    pub insurance_policy_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MedicalBill {
    /// Status as of a date: a pending bill past its due date is overdue
    pub fn effective_status(&self, today: NaiveDate) -> BillStatus {
        match (self.status, self.due_date) {
            (BillStatus::Pending, Some(due)) if due < today => BillStatus::Overdue,
            (status, _) => status,
        }
    }
}

/// Request payload for logging a medical bill
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMedicalBillRequest {
    #[serde(default)]
    pub family_member_id: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Provider name must be between 1 and 200 characters"))]
    pub provider_name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub amount: f64,

    pub bill_date: NaiveDate,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: Option<BillStatus>,

    #[serde(default)]
    pub insurance_policy_id: Option<String>,
}

/// Totals over a user's bills
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BillSummary {
    pub bill_count: usize,
    pub total_billed: f64,
    pub total_paid: f64,
    /// Amount submitted to insurance and not yet settled by the user
    pub total_claimed: f64,
    /// Pending plus overdue
    pub total_outstanding: f64,
    pub overdue_count: usize,
}

impl BillSummary {
    /// Summarize bills using their status as of `today`
    pub fn from_bills(bills: &[MedicalBill], today: NaiveDate) -> Self {
        bills.iter().fold(Self::default(), |mut summary, bill| {
            summary.bill_count += 1;
            summary.total_billed += bill.amount;
            match bill.effective_status(today) {
                BillStatus::Paid => summary.total_paid += bill.amount,
                BillStatus::Claimed => summary.total_claimed += bill.amount,
                BillStatus::Pending => summary.total_outstanding += bill.amount,
                BillStatus::Overdue => {
                    summary.total_outstanding += bill.amount;
                    summary.overdue_count += 1;
                },
            }
            summary
        })
    }
}

string_enum! {
    /// Kind of a stored medical document
    pub enum DocumentType {
        LabReport => "lab_report",
        Prescription => "prescription",
        Imaging => "imaging",
        DischargeSummary => "discharge_summary",
        Insurance => "insurance",
        Vaccination => "vaccination",
        Other => "other",
    }
}

/// Metadata of a medical document; the file itself lives at `file_url`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MedicalDocument {
    pub id: String,
    pub user_id: String,
    pub family_member_id: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    pub document_type: DocumentType,
    #[validate(length(max = 2048, message = "File URL cannot exceed 2048 characters"))]
    pub file_url: Option<String>,
    pub document_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for registering a medical document
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMedicalDocumentRequest {
    #[serde(default)]
    pub family_member_id: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    pub document_type: DocumentType,

    #[serde(default)]
    #[validate(length(max = 2048, message = "File URL cannot exceed 2048 characters"))]
    pub file_url: Option<String>,

    #[serde(default)]
    pub document_date: Option<NaiveDate>,

    #[serde(default)]
    pub notes: Option<String>,
}
