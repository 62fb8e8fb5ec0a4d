// Storage models: one row shape per table, using the current column names.
// Dates are kept as ISO 8601 strings exactly as they are stored.

/// Implement `TableRecord` for a row type with an `id: String` field
macro_rules! table_record {
    ($row:ty, $schema:expr) => {
        impl $crate::repository::TableRecord for $row {
            const SCHEMA: $crate::repository::TableSchema = $schema;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}
pub(crate) use table_record;

pub mod family;
pub mod medical;
pub mod womens_health;
pub mod baby_care;
pub mod wellness;
pub mod gamification;

pub use family::FamilyMemberRow;
pub use medical::{InsurancePolicyRow, MedicalBillRow, MedicalDocumentRow, PrescriptionRow};
pub use womens_health::{MenstrualCycleRow, PregnancyProfileRow};
pub use baby_care::{FeedingLogRow, SleepLogRow, VaccinationScheduleRow};
pub use wellness::VitalLogRow;
pub use gamification::{ActivityStreakRow, EarnedBadgeRow, UserPointsRow};
