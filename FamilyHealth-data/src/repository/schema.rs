//! Table schemas and legacy column translation.
//!
//! Rows written by older clients used different column names. Reads accept
//! both spellings and normalize to the current one; writes only ever use the
//! current names.

use serde_json::Value;

use crate::store::Row;

/// Name of a table plus its `(legacy, current)` column renames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name in the store
    pub name: &'static str,
    /// Legacy column name paired with the column that replaced it
    pub legacy_fields: &'static [(&'static str, &'static str)],
}

impl TableSchema {
    /// Current name for a column, translating legacy spellings
    pub fn current_name<'a>(&self, column: &'a str) -> &'a str {
        match self.legacy_fields.iter().find(|(legacy, _)| *legacy == column) {
            Some((_, current)) => *current,
            None => column,
        }
    }

    /// Rewrite legacy columns of a row to their current names.
    ///
    /// When both spellings are present the current column wins and the
    /// legacy one is dropped, even if the current value is null.
    pub fn normalize_row(&self, mut row: Row) -> Row {
        for (legacy, current) in self.legacy_fields {
            if let Some(value) = row.remove(*legacy) {
                if !row.contains_key(*current) {
                    row.insert((*current).to_string(), value);
                }
            }
        }
        row
    }

    /// Null out the legacy spelling of every current column a write sets,
    /// so stale legacy values cannot resurface on the next read
    pub fn clear_legacy_columns(&self, row: &mut Row) {
        for (legacy, current) in self.legacy_fields {
            if row.contains_key(*current) {
                row.insert((*legacy).to_string(), Value::Null);
            }
        }
    }
}

pub const FAMILY_MEMBERS: TableSchema = TableSchema {
    name: "family_members",
    legacy_fields: &[
        ("name", "full_name"),
        ("relation", "relationship"),
        ("dob", "date_of_birth"),
        ("blood_group", "blood_type"),
    ],
};

pub const PRESCRIPTIONS: TableSchema = TableSchema {
    name: "prescriptions",
    legacy_fields: &[
        ("medicine_name", "medication_name"),
        ("dose", "dosage"),
        ("doctor_name", "prescribing_doctor"),
        ("member_id", "family_member_id"),
    ],
};

pub const INSURANCE_POLICIES: TableSchema = TableSchema {
    name: "insurance_policies",
    legacy_fields: &[
        ("provider", "provider_name"),
        ("policy_no", "policy_number"),
        ("end_date", "expiry_date"),
        ("member_id", "family_member_id"),
    ],
};

pub const MEDICAL_BILLS: TableSchema = TableSchema {
    name: "medical_bills",
    legacy_fields: &[
        ("hospital_name", "provider_name"),
        ("bill_amount", "amount"),
        ("member_id", "family_member_id"),
    ],
};

pub const MEDICAL_DOCUMENTS: TableSchema = TableSchema {
    name: "medical_documents",
    legacy_fields: &[
        ("name", "title"),
        ("doc_type", "document_type"),
        ("file_path", "file_url"),
        ("member_id", "family_member_id"),
    ],
};

pub const PREGNANCY_PROFILES: TableSchema = TableSchema {
    name: "pregnancy_profiles",
    legacy_fields: &[
        ("last_period_date", "lmp_date"),
        ("expected_due_date", "due_date"),
    ],
};

pub const MENSTRUAL_CYCLES: TableSchema = TableSchema {
    name: "menstrual_cycles",
    legacy_fields: &[
        ("period_start", "start_date"),
        ("period_end", "end_date"),
        ("flow", "flow_intensity"),
    ],
};

pub const VACCINATION_SCHEDULES: TableSchema = TableSchema {
    name: "vaccination_schedules",
    legacy_fields: &[
        ("vaccine", "vaccine_name"),
        ("due_date", "scheduled_date"),
        ("given_date", "administered_date"),
        ("child_id", "family_member_id"),
    ],
};

pub const FEEDING_LOGS: TableSchema = TableSchema {
    name: "feeding_logs",
    legacy_fields: &[
        ("baby_id", "family_member_id"),
        ("feed_type", "feeding_type"),
        ("start_time", "started_at"),
        ("quantity_ml", "amount_ml"),
    ],
};

pub const SLEEP_LOGS: TableSchema = TableSchema {
    name: "sleep_logs",
    legacy_fields: &[
        ("baby_id", "family_member_id"),
        ("start_time", "started_at"),
        ("end_time", "ended_at"),
    ],
};

pub const VITAL_LOGS: TableSchema = TableSchema {
    name: "vital_logs",
    legacy_fields: &[
        ("type", "vital_type"),
        ("reading", "value"),
        ("measured_at", "recorded_at"),
        ("member_id", "family_member_id"),
    ],
};

pub const USER_POINTS: TableSchema = TableSchema {
    name: "user_points",
    legacy_fields: &[("points", "total_points")],
};

pub const EARNED_BADGES: TableSchema = TableSchema {
    name: "earned_badges",
    legacy_fields: &[
        ("badge_key", "badge_id"),
        ("unlocked_at", "earned_at"),
    ],
};

pub const ACTIVITY_STREAKS: TableSchema = TableSchema {
    name: "activity_streaks",
    legacy_fields: &[
        ("streak_type", "activity_type"),
        ("streak_count", "current_streak"),
        ("best_streak", "longest_streak"),
        ("last_date", "last_activity_date"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_row_renames_legacy_columns() {
        let row = json!({ "id": "1", "medicine_name": "Amoxicillin", "dose": "500mg" })
            .as_object()
            .cloned()
            .unwrap();

        let normalized = PRESCRIPTIONS.normalize_row(row);
        assert_eq!(normalized["medication_name"], json!("Amoxicillin"));
        assert_eq!(normalized["dosage"], json!("500mg"));
        assert!(!normalized.contains_key("medicine_name"));
        assert!(!normalized.contains_key("dose"));
    }

    #[test]
    fn test_normalize_row_prefers_current_column() {
        let row = json!({ "name": "Old", "full_name": "New" })
            .as_object()
            .cloned()
            .unwrap();

        let normalized = FAMILY_MEMBERS.normalize_row(row);
        assert_eq!(normalized["full_name"], json!("New"));
        assert!(!normalized.contains_key("name"));
    }

    #[test]
    fn test_normalize_row_keeps_cleared_current_column() {
        let row = json!({ "id": "1", "end_date": "2024-06-01", "expiry_date": null })
            .as_object()
            .cloned()
            .unwrap();

        let normalized = INSURANCE_POLICIES.normalize_row(row);
        assert_eq!(normalized["expiry_date"], Value::Null);
        assert!(!normalized.contains_key("end_date"));
    }

    #[test]
    fn test_clear_legacy_columns_only_for_written_columns() {
        let mut row = json!({ "id": "1", "expiry_date": null, "provider_name": "Acme" })
            .as_object()
            .cloned()
            .unwrap();

        INSURANCE_POLICIES.clear_legacy_columns(&mut row);
        assert_eq!(row["end_date"], Value::Null);
        assert_eq!(row["provider"], Value::Null);
        assert!(!row.contains_key("policy_no"));
        assert!(!row.contains_key("member_id"));
    }

    #[test]
    fn test_current_name() {
        assert_eq!(VITAL_LOGS.current_name("type"), "vital_type");
        assert_eq!(VITAL_LOGS.current_name("user_id"), "user_id");
    }
}
