//! Conversion functions between domain entities and data models.
//!
//! Functions follow the pattern `convert_to_[target_layer]_[model_name]`.
//! Rows keep dates and enums as strings; converting to the domain rejects
//! unknown enum values and malformed dates with a descriptive message.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use family_health_data::models::{
    ActivityStreakRow, EarnedBadgeRow, FamilyMemberRow, FeedingLogRow, InsurancePolicyRow,
    MedicalBillRow, MedicalDocumentRow, MenstrualCycleRow, PregnancyProfileRow, PrescriptionRow,
    SleepLogRow, UserPointsRow, VaccinationScheduleRow, VitalLogRow,
};

use super::{
    ActivityStreak, EarnedBadge, FamilyMember, FeedingLog, InsurancePolicy, MedicalBill,
    MedicalDocument, MenstrualCycle, PregnancyProfile, Prescription, SleepLog, UserPoints,
    VaccinationSchedule, VitalLog,
};
use crate::services::pregnancy::due_date_from_lmp;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar date, accepting a full timestamp as well
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| format!("Invalid date for {}: {}", field, value))
}

/// Parse an optional calendar date; empty strings count as absent
pub fn parse_optional_date(field: &str, value: &Option<String>) -> Result<Option<NaiveDate>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(field, value).map(Some),
    }
}

/// Parse an instant: RFC 3339, a naive timestamp taken as UTC, or a date at midnight
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("Invalid timestamp for {}: {}", field, value))
}

/// Parse an optional instant; empty strings count as absent
pub fn parse_optional_timestamp(field: &str, value: &Option<String>) -> Result<Option<DateTime<Utc>>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(field, value).map(Some),
    }
}

/// Parse a bookkeeping timestamp; rows missing one read as the Unix epoch
fn parse_audit_timestamp(field: &str, value: &str) -> DateTime<Utc> {
    parse_timestamp(field, value).unwrap_or_else(|_| {
        debug!("Row has no usable {}, defaulting to epoch", field);
        DateTime::<Utc>::default()
    })
}

/// Parse a stored enum value
pub fn parse_enum<T: FromStr<Err = String>>(field: &str, value: &str) -> Result<T, String> {
    value.parse::<T>().map_err(|e| format!("Invalid {}: {}", field, e))
}

fn parse_optional_enum<T: FromStr<Err = String>>(field: &str, value: &Option<String>) -> Result<Option<T>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_enum(field, value).map(Some),
    }
}

/// Format a calendar date for storage
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format an instant for storage
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}

/// Convert from data model to domain entity for a family member
pub fn convert_to_domain_family_member(row: FamilyMemberRow) -> Result<FamilyMember, String> {
    Ok(FamilyMember {
        relationship: parse_enum("relationship", &row.relationship)?,
        date_of_birth: parse_optional_date("date_of_birth", &row.date_of_birth)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        full_name: row.full_name,
        gender: row.gender,
        blood_type: row.blood_type,
        allergies: row.allergies,
        chronic_conditions: row.chronic_conditions,
        emergency_contact: row.emergency_contact,
    })
}

/// Convert from domain entity to data model for a family member
pub fn convert_to_data_family_member(member: &FamilyMember) -> FamilyMemberRow {
    FamilyMemberRow {
        id: member.id.clone(),
        user_id: member.user_id.clone(),
        full_name: member.full_name.clone(),
        relationship: member.relationship.to_string(),
        date_of_birth: member.date_of_birth.map(format_date),
        gender: member.gender.clone(),
        blood_type: member.blood_type.clone(),
        allergies: member.allergies.clone(),
        chronic_conditions: member.chronic_conditions.clone(),
        emergency_contact: member.emergency_contact.clone(),
        created_at: format_timestamp(member.created_at),
        updated_at: format_timestamp(member.updated_at),
    }
}

/// Convert from data model to domain entity for a prescription
pub fn convert_to_domain_prescription(row: PrescriptionRow) -> Result<Prescription, String> {
    Ok(Prescription {
        start_date: parse_date("start_date", &row.start_date)?,
        end_date: parse_optional_date("end_date", &row.end_date)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        family_member_id: row.family_member_id,
        medication_name: row.medication_name,
        dosage: row.dosage,
        frequency: row.frequency,
        prescribing_doctor: row.prescribing_doctor,
        refills_remaining: row.refills_remaining,
        notes: row.notes,
    })
}

/// Convert from domain entity to data model for a prescription
pub fn convert_to_data_prescription(prescription: &Prescription) -> PrescriptionRow {
    PrescriptionRow {
        id: prescription.id.clone(),
        user_id: prescription.user_id.clone(),
        family_member_id: prescription.family_member_id.clone(),
        medication_name: prescription.medication_name.clone(),
        dosage: prescription.dosage.clone(),
        frequency: prescription.frequency.clone(),
        prescribing_doctor: prescription.prescribing_doctor.clone(),
        start_date: format_date(prescription.start_date),
        end_date: prescription.end_date.map(format_date),
        refills_remaining: prescription.refills_remaining,
        notes: prescription.notes.clone(),
        created_at: format_timestamp(prescription.created_at),
        updated_at: format_timestamp(prescription.updated_at),
    }
}

/// Convert from data model to domain entity for an insurance policy
pub fn convert_to_domain_insurance_policy(row: InsurancePolicyRow) -> Result<InsurancePolicy, String> {
    Ok(InsurancePolicy {
        start_date: parse_optional_date("start_date", &row.start_date)?,
        expiry_date: parse_optional_date("expiry_date", &row.expiry_date)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        family_member_id: row.family_member_id,
        provider_name: row.provider_name,
        policy_number: row.policy_number,
        policy_type: row.policy_type,
        coverage_amount: row.coverage_amount,
        premium_amount: row.premium_amount,
        notes: row.notes,
    })
}

/// Convert from domain entity to data model for an insurance policy
pub fn convert_to_data_insurance_policy(policy: &InsurancePolicy) -> InsurancePolicyRow {
    InsurancePolicyRow {
        id: policy.id.clone(),
        user_id: policy.user_id.clone(),
        family_member_id: policy.family_member_id.clone(),
        provider_name: policy.provider_name.clone(),
        policy_number: policy.policy_number.clone(),
        policy_type: policy.policy_type.clone(),
        coverage_amount: policy.coverage_amount,
        premium_amount: policy.premium_amount,
        start_date: policy.start_date.map(format_date),
        expiry_date: policy.expiry_date.map(format_date),
        notes: policy.notes.clone(),
        created_at: format_timestamp(policy.created_at),
        updated_at: format_timestamp(policy.updated_at),
    }
}

/// Convert from data model to domain entity for a medical bill
pub fn convert_to_domain_medical_bill(row: MedicalBillRow) -> Result<MedicalBill, String> {
    Ok(MedicalBill {
        bill_date: parse_date("bill_date", &row.bill_date)?,
        due_date: parse_optional_date("due_date", &row.due_date)?,
        status: parse_enum("status", &row.status)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        family_member_id: row.family_member_id,
        provider_name: row.provider_name,
        description: row.description,
        amount: row.amount,
        insurance_policy_id: row.insurance_policy_id,
    })
}

/// Convert from domain entity to data model for a medical bill
pub fn convert_to_data_medical_bill(bill: &MedicalBill) -> MedicalBillRow {
    MedicalBillRow {
        id: bill.id.clone(),
        user_id: bill.user_id.clone(),
        family_member_id: bill.family_member_id.clone(),
        provider_name: bill.provider_name.clone(),
        description: bill.description.clone(),
        amount: bill.amount,
        bill_date: format_date(bill.bill_date),
        due_date: bill.due_date.map(format_date),
        status: bill.status.to_string(),
        insurance_policy_id: bill.insurance_policy_id.clone(),
        created_at: format_timestamp(bill.created_at),
        updated_at: format_timestamp(bill.updated_at),
    }
}

/// Convert from data model to domain entity for a medical document
pub fn convert_to_domain_medical_document(row: MedicalDocumentRow) -> Result<MedicalDocument, String> {
    Ok(MedicalDocument {
        document_type: parse_enum("document_type", &row.document_type)?,
        document_date: parse_optional_date("document_date", &row.document_date)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        family_member_id: row.family_member_id,
        title: row.title,
        file_url: row.file_url,
        notes: row.notes,
    })
}

/// Convert from domain entity to data model for a medical document
pub fn convert_to_data_medical_document(document: &MedicalDocument) -> MedicalDocumentRow {
    MedicalDocumentRow {
        id: document.id.clone(),
        user_id: document.user_id.clone(),
        family_member_id: document.family_member_id.clone(),
        title: document.title.clone(),
        document_type: document.document_type.to_string(),
        file_url: document.file_url.clone(),
        document_date: document.document_date.map(format_date),
        notes: document.notes.clone(),
        created_at: format_timestamp(document.created_at),
        updated_at: format_timestamp(document.updated_at),
    }
}

/// Convert from data model to domain entity for a pregnancy profile.
///
/// Rows written without a due date get one derived from the LMP.
pub fn convert_to_domain_pregnancy_profile(row: PregnancyProfileRow) -> Result<PregnancyProfile, String> {
    let lmp_date = parse_date("lmp_date", &row.lmp_date)?;
    let due_date = match parse_optional_date("due_date", &row.due_date)? {
        Some(due) => due,
        None => due_date_from_lmp(lmp_date).map_err(|e| e.to_string())?,
    };

    Ok(PregnancyProfile {
        lmp_date,
        due_date,
        conception_date: parse_optional_date("conception_date", &row.conception_date)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        is_active: row.is_active,
        notes: row.notes,
    })
}

/// Convert from domain entity to data model for a pregnancy profile
pub fn convert_to_data_pregnancy_profile(profile: &PregnancyProfile) -> PregnancyProfileRow {
    PregnancyProfileRow {
        id: profile.id.clone(),
        user_id: profile.user_id.clone(),
        lmp_date: format_date(profile.lmp_date),
        due_date: Some(format_date(profile.due_date)),
        conception_date: profile.conception_date.map(format_date),
        is_active: profile.is_active,
        notes: profile.notes.clone(),
        created_at: format_timestamp(profile.created_at),
        updated_at: format_timestamp(profile.updated_at),
    }
}

/// Convert from data model to domain entity for a menstrual cycle
pub fn convert_to_domain_menstrual_cycle(row: MenstrualCycleRow) -> Result<MenstrualCycle, String> {
    Ok(MenstrualCycle {
        start_date: parse_date("start_date", &row.start_date)?,
        end_date: parse_optional_date("end_date", &row.end_date)?,
        flow_intensity: parse_optional_enum("flow_intensity", &row.flow_intensity)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        cycle_length: row.cycle_length,
        symptoms: row.symptoms,
        notes: row.notes,
    })
}

/// Convert from domain entity to data model for a menstrual cycle
pub fn convert_to_data_menstrual_cycle(cycle: &MenstrualCycle) -> MenstrualCycleRow {
    MenstrualCycleRow {
        id: cycle.id.clone(),
        user_id: cycle.user_id.clone(),
        start_date: format_date(cycle.start_date),
        end_date: cycle.end_date.map(format_date),
        cycle_length: cycle.cycle_length,
        flow_intensity: cycle.flow_intensity.map(|f| f.to_string()),
        symptoms: cycle.symptoms.clone(),
        notes: cycle.notes.clone(),
        created_at: format_timestamp(cycle.created_at),
        updated_at: format_timestamp(cycle.updated_at),
    }
}

/// Convert from data model to domain entity for a vaccination schedule
pub fn convert_to_domain_vaccination(row: VaccinationScheduleRow) -> Result<VaccinationSchedule, String> {
    Ok(VaccinationSchedule {
        scheduled_date: parse_date("scheduled_date", &row.scheduled_date)?,
        administered_date: parse_optional_date("administered_date", &row.administered_date)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        family_member_id: row.family_member_id,
        vaccine_name: row.vaccine_name,
        dose_number: row.dose_number,
        skipped: row.skipped,
        provider: row.provider,
        notes: row.notes,
    })
}

/// Convert from domain entity to data model for a vaccination schedule
pub fn convert_to_data_vaccination(schedule: &VaccinationSchedule) -> VaccinationScheduleRow {
    VaccinationScheduleRow {
        id: schedule.id.clone(),
        user_id: schedule.user_id.clone(),
        family_member_id: schedule.family_member_id.clone(),
        vaccine_name: schedule.vaccine_name.clone(),
        dose_number: schedule.dose_number,
        scheduled_date: format_date(schedule.scheduled_date),
        administered_date: schedule.administered_date.map(format_date),
        skipped: schedule.skipped,
        provider: schedule.provider.clone(),
        notes: schedule.notes.clone(),
        created_at: format_timestamp(schedule.created_at),
        updated_at: format_timestamp(schedule.updated_at),
    }
}

/// Convert from data model to domain entity for a feeding log
pub fn convert_to_domain_feeding_log(row: FeedingLogRow) -> Result<FeedingLog, String> {
    Ok(FeedingLog {
        feeding_type: parse_enum("feeding_type", &row.feeding_type)?,
        started_at: parse_timestamp("started_at", &row.started_at)?,
        side: parse_optional_enum("side", &row.side)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        family_member_id: row.family_member_id,
        duration_minutes: row.duration_minutes,
        amount_ml: row.amount_ml,
        notes: row.notes,
    })
}

/// Convert from domain entity to data model for a feeding log
pub fn convert_to_data_feeding_log(log: &FeedingLog) -> FeedingLogRow {
    FeedingLogRow {
        id: log.id.clone(),
        user_id: log.user_id.clone(),
        family_member_id: log.family_member_id.clone(),
        feeding_type: log.feeding_type.to_string(),
        started_at: format_timestamp(log.started_at),
        duration_minutes: log.duration_minutes,
        amount_ml: log.amount_ml,
        side: log.side.map(|s| s.to_string()),
        notes: log.notes.clone(),
        created_at: format_timestamp(log.created_at),
        updated_at: format_timestamp(log.updated_at),
    }
}

/// Convert from data model to domain entity for a sleep log
pub fn convert_to_domain_sleep_log(row: SleepLogRow) -> Result<SleepLog, String> {
    Ok(SleepLog {
        started_at: parse_timestamp("started_at", &row.started_at)?,
        ended_at: parse_optional_timestamp("ended_at", &row.ended_at)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        family_member_id: row.family_member_id,
        quality: row.quality,
        notes: row.notes,
    })
}

/// Convert from domain entity to data model for a sleep log
pub fn convert_to_data_sleep_log(log: &SleepLog) -> SleepLogRow {
    SleepLogRow {
        id: log.id.clone(),
        user_id: log.user_id.clone(),
        family_member_id: log.family_member_id.clone(),
        started_at: format_timestamp(log.started_at),
        ended_at: log.ended_at.map(format_timestamp),
        quality: log.quality.clone(),
        notes: log.notes.clone(),
        created_at: format_timestamp(log.created_at),
        updated_at: format_timestamp(log.updated_at),
    }
}

/// Convert from data model to domain entity for a vital log
pub fn convert_to_domain_vital_log(row: VitalLogRow) -> Result<VitalLog, String> {
    Ok(VitalLog {
        vital_type: parse_enum("vital_type", &row.vital_type)?,
        recorded_at: parse_timestamp("recorded_at", &row.recorded_at)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        family_member_id: row.family_member_id,
        value: row.value,
        secondary_value: row.secondary_value,
        unit: row.unit,
        notes: row.notes,
    })
}

/// Convert from domain entity to data model for a vital log
pub fn convert_to_data_vital_log(log: &VitalLog) -> VitalLogRow {
    VitalLogRow {
        id: log.id.clone(),
        user_id: log.user_id.clone(),
        family_member_id: log.family_member_id.clone(),
        vital_type: log.vital_type.to_string(),
        value: log.value,
        secondary_value: log.secondary_value,
        unit: log.unit.clone(),
        recorded_at: format_timestamp(log.recorded_at),
        notes: log.notes.clone(),
        created_at: format_timestamp(log.created_at),
        updated_at: format_timestamp(log.updated_at),
    }
}

/// Convert from data model to domain entity for a points balance
pub fn convert_to_domain_user_points(row: UserPointsRow) -> UserPoints {
    UserPoints {
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        total_points: row.total_points,
        level: row.level,
        activity_counts: row.activity_counts,
    }
}

/// Convert from domain entity to data model for a points balance
pub fn convert_to_data_user_points(points: &UserPoints) -> UserPointsRow {
    UserPointsRow {
        id: points.id.clone(),
        user_id: points.user_id.clone(),
        total_points: points.total_points,
        level: points.level,
        activity_counts: points.activity_counts.clone(),
        created_at: format_timestamp(points.created_at),
        updated_at: format_timestamp(points.updated_at),
    }
}

/// Convert from data model to domain entity for an earned badge
pub fn convert_to_domain_earned_badge(row: EarnedBadgeRow) -> Result<EarnedBadge, String> {
    Ok(EarnedBadge {
        earned_at: parse_timestamp("earned_at", &row.earned_at)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        badge_id: row.badge_id,
    })
}

/// Convert from domain entity to data model for an earned badge
pub fn convert_to_data_earned_badge(badge: &EarnedBadge) -> EarnedBadgeRow {
    EarnedBadgeRow {
        id: badge.id.clone(),
        user_id: badge.user_id.clone(),
        badge_id: badge.badge_id.clone(),
        earned_at: format_timestamp(badge.earned_at),
        created_at: format_timestamp(badge.created_at),
        updated_at: format_timestamp(badge.updated_at),
    }
}

/// Convert from data model to domain entity for an activity streak
pub fn convert_to_domain_activity_streak(row: ActivityStreakRow) -> Result<ActivityStreak, String> {
    Ok(ActivityStreak {
        activity_type: parse_enum("activity_type", &row.activity_type)?,
        last_activity_date: parse_optional_date("last_activity_date", &row.last_activity_date)?,
        created_at: parse_audit_timestamp("created_at", &row.created_at),
        updated_at: parse_audit_timestamp("updated_at", &row.updated_at),
        id: row.id,
        user_id: row.user_id,
        current_streak: row.current_streak,
        longest_streak: row.longest_streak,
    })
}

/// Convert from domain entity to data model for an activity streak
pub fn convert_to_data_activity_streak(streak: &ActivityStreak) -> ActivityStreakRow {
    ActivityStreakRow {
        id: streak.id.clone(),
        user_id: streak.user_id.clone(),
        activity_type: streak.activity_type.to_string(),
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
        last_activity_date: streak.last_activity_date.map(format_date),
        created_at: format_timestamp(streak.created_at),
        updated_at: format_timestamp(streak.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BillStatus, Relationship, VitalType};

    fn member_row() -> FamilyMemberRow {
        FamilyMemberRow {
            id: "m1".to_string(),
            user_id: "u1".to_string(),
            full_name: "Ada Lovelace".to_string(),
            relationship: "Child".to_string(),
            date_of_birth: Some("2020-02-29".to_string()),
            gender: None,
            blood_type: Some("O+".to_string()),
            allergies: vec!["peanuts".to_string()],
            chronic_conditions: vec![],
            emergency_contact: None,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-02T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_convert_family_member_both_ways() {
        let member = convert_to_domain_family_member(member_row()).unwrap();
        assert_eq!(member.relationship, Relationship::Child);
        assert_eq!(member.date_of_birth, NaiveDate::from_ymd_opt(2020, 2, 29));

        let row = convert_to_data_family_member(&member);
        assert_eq!(row.relationship, "child");
        assert_eq!(row.date_of_birth.as_deref(), Some("2020-02-29"));
        assert_eq!(row.allergies, vec!["peanuts".to_string()]);
    }

    #[test]
    fn test_unknown_enum_rejected() {
        let row = FamilyMemberRow { relationship: "neighbour".to_string(), ..member_row() };
        let err = convert_to_domain_family_member(row).unwrap_err();
        assert!(err.contains("relationship"));
    }

    #[test]
    fn test_malformed_date_rejected() {
        let row = FamilyMemberRow { date_of_birth: Some("29/02/2020".to_string()), ..member_row() };
        let err = convert_to_domain_family_member(row).unwrap_err();
        assert!(err.contains("date_of_birth"));
    }

    #[test]
    fn test_empty_optional_date_is_absent() {
        let row = FamilyMemberRow { date_of_birth: Some(String::new()), ..member_row() };
        let member = convert_to_domain_family_member(row).unwrap();
        assert_eq!(member.date_of_birth, None);
    }

    #[test]
    fn test_missing_audit_timestamp_defaults() {
        let row = FamilyMemberRow { created_at: String::new(), ..member_row() };
        let member = convert_to_domain_family_member(row).unwrap();
        assert_eq!(member.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("t", "2024-03-01T08:30:00Z").unwrap();
        let naive = parse_timestamp("t", "2024-03-01T08:30:00").unwrap();
        assert_eq!(rfc, naive);

        let midnight = parse_timestamp("t", "2024-03-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        assert!(parse_timestamp("t", "yesterday").is_err());
    }

    #[test]
    fn test_pregnancy_due_date_filled_from_lmp() {
        let row = PregnancyProfileRow {
            id: "p".to_string(),
            user_id: "u".to_string(),
            lmp_date: "2024-01-01".to_string(),
            due_date: None,
            conception_date: None,
            is_active: true,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        };

        let profile = convert_to_domain_pregnancy_profile(row).unwrap();
        assert_eq!(profile.due_date, NaiveDate::from_ymd_opt(2024, 10, 7).unwrap());
    }

    #[test]
    fn test_bill_and_vital_enums() {
        let bill = MedicalBillRow {
            id: "b".to_string(),
            user_id: "u".to_string(),
            family_member_id: None,
            provider_name: "Clinic".to_string(),
            description: None,
            amount: 12.5,
            bill_date: "2024-01-01".to_string(),
            due_date: None,
            status: "PAID".to_string(),
            insurance_policy_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(convert_to_domain_medical_bill(bill).unwrap().status, BillStatus::Paid);

        let vital = VitalLogRow {
            id: "v".to_string(),
            user_id: "u".to_string(),
            family_member_id: None,
            vital_type: "heart_rate".to_string(),
            value: 64.0,
            secondary_value: None,
            unit: "bpm".to_string(),
            recorded_at: "2024-01-01T07:00:00Z".to_string(),
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let log = convert_to_domain_vital_log(vital).unwrap();
        assert_eq!(log.vital_type, VitalType::HeartRate);
        assert_eq!(convert_to_data_vital_log(&log).vital_type, "heart_rate");
    }
}
