use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

string_enum! {
    /// How a family member relates to the account holder
    pub enum Relationship {
        SelfMember => "self",
        Spouse => "spouse",
        Child => "child",
        Parent => "parent",
        Sibling => "sibling",
        Grandparent => "grandparent",
        Other => "other",
    }
}

/// A person whose health records the user manages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct FamilyMember {
    pub id: String,
    pub user_id: String,
    #[validate(length(min = 1, max = 200, message = "Full name must be between 1 and 200 characters"))]
    pub full_name: String,
    pub relationship: Relationship,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    #[validate(length(max = 10, message = "Blood type cannot exceed 10 characters"))]
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub emergency_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FamilyMember {
    /// Age in whole years on a date; `None` without a date of birth
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        self.date_of_birth.map(|dob| age_in_years(dob, date))
    }
}

/// Whole years between a birth date and a date.
///
/// A birthday not yet reached in the year of `on` does not count. Dates
/// before the birth date give zero.
pub fn age_in_years(date_of_birth: NaiveDate, on: NaiveDate) -> u32 {
    if on <= date_of_birth {
        return 0;
    }

    let mut years = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Request payload for adding a family member
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateFamilyMemberRequest {
    #[validate(length(min = 1, max = 200, message = "Full name must be between 1 and 200 characters"))]
    pub full_name: String,

    pub relationship: Relationship,

    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10, message = "Blood type cannot exceed 10 characters"))]
    pub blood_type: Option<String>,

    #[serde(default)]
    pub allergies: Vec<String>,

    #[serde(default)]
    pub chronic_conditions: Vec<String>,

    #[serde(default)]
    pub emergency_contact: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let dob = date(1990, 6, 15);
        assert_eq!(age_in_years(dob, date(2024, 6, 14)), 33);
        assert_eq!(age_in_years(dob, date(2024, 6, 15)), 34);
        assert_eq!(age_in_years(dob, date(2024, 12, 1)), 34);
    }

    #[test]
    fn test_age_before_birth_is_zero() {
        assert_eq!(age_in_years(date(2024, 1, 1), date(2023, 1, 1)), 0);
    }

    #[test]
    fn test_relationship_parsing() {
        assert_eq!("Self".parse::<Relationship>().unwrap(), Relationship::SelfMember);
        assert_eq!("child".parse::<Relationship>().unwrap(), Relationship::Child);
        assert!("cousin".parse::<Relationship>().is_err());
        assert_eq!(serde_json::to_string(&Relationship::Grandparent).unwrap(), "\"grandparent\"");
    }
}
