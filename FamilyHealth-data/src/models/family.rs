use serde::{Deserialize, Serialize};

use crate::repository::schema::FAMILY_MEMBERS;
use super::table_record;

/// Storage model for a family member profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyMemberRow {
    /// Unique identifier
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Display name (legacy column: `name`)
    pub full_name: String,

    /// Relationship to the user (legacy column: `relation`)
    pub relationship: String,

    /// Date of birth, `YYYY-MM-DD` (legacy column: `dob`)
    #[serde(default)]
    pub date_of_birth: Option<String>,

    #[serde(default)]
    pub gender: Option<String>,

    /// Blood type such as `O+` (legacy column: `blood_group`)
    #[serde(default)]
    pub blood_type: Option<String>,

    #[serde(default)]
    pub allergies: Vec<String>,

    #[serde(default)]
    pub chronic_conditions: Vec<String>,

    #[serde(default)]
    pub emergency_contact: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(FamilyMemberRow, FAMILY_MEMBERS);
