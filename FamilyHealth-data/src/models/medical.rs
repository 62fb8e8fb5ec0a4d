use serde::{Deserialize, Serialize};

use crate::repository::schema::{INSURANCE_POLICIES, MEDICAL_BILLS, MEDICAL_DOCUMENTS, PRESCRIPTIONS};
use super::table_record;

/// Storage model for a prescription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionRow {
    pub id: String,
    pub user_id: String,

    /// Family member the prescription is for (legacy column: `member_id`)
    #[serde(default)]
    pub family_member_id: Option<String>,

    /// Legacy column: `medicine_name`
    pub medication_name: String,

    /// Legacy column: `dose`
    #[serde(default)]
    pub dosage: Option<String>,

    #[serde(default)]
    pub frequency: Option<String>,

    /// Legacy column: `doctor_name`
    #[serde(default)]
    pub prescribing_doctor: Option<String>,

    /// First day of the course, `YYYY-MM-DD`
    pub start_date: String,

    /// Last day of the course, open-ended when absent
    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default)]
    pub refills_remaining: Option<u32>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(PrescriptionRow, PRESCRIPTIONS);

/// Storage model for an insurance policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsurancePolicyRow {
    pub id: String,
    pub user_id: String,

    #[serde(default)]
    pub family_member_id: Option<String>,

    /// Legacy column: `provider`
    pub provider_name: String,

    /// Legacy column: `policy_no`
    pub policy_number: String,

    pub policy_type: String,

    #[serde(default)]
    pub coverage_amount: Option<f64>,

    #[serde(default)]
    pub premium_amount: Option<f64>,

    #[serde(default)]
    pub start_date: Option<String>,

    /// Legacy column: `end_date`
    #[serde(default)]
    pub expiry_date: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(InsurancePolicyRow, INSURANCE_POLICIES);

/// Storage model for a medical bill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalBillRow {
    pub id: String,
    pub user_id: String,

    #[serde(default)]
    pub family_member_id: Option<String>,

    /// Legacy column: `hospital_name`
    pub provider_name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Legacy column: `bill_amount`
    pub amount: f64,

    pub bill_date: String,

    #[serde(default)]
    pub due_date: Option<String>,

    /// One of `pending`, `paid`, `claimed`, `overdue`
    pub status: String,

    #[serde(default)]
    pub insurance_policy_id: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(MedicalBillRow, MEDICAL_BILLS);

/// Storage model for medical document metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalDocumentRow {
    pub id: String,
    pub user_id: String,

    #[serde(default)]
    pub family_member_id: Option<String>,

    /// Legacy column: `name`
    pub title: String,

    /// Legacy column: `doc_type`
    pub document_type: String,

    /// Legacy column: `file_path`
    #[serde(default)]
    pub file_url: Option<String>,

    #[serde(default)]
    pub document_date: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(MedicalDocumentRow, MEDICAL_DOCUMENTS);
