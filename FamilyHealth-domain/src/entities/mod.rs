// Domain entities and value objects

/// Declare a closed set of lowercase string values stored in rows and JSON.
///
/// Generates `as_str`, `Display` and a case-insensitive `FromStr` that
/// rejects unknown values.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every value, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stored string form
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("Unknown {} value: {}", stringify!($name), other)),
                }
            }
        }
    };
}

pub mod family;
pub mod medical;
pub mod womens_health;
pub mod baby_care;
pub mod wellness;
pub mod gamification;
pub mod conversions;

// Re-export common types for easier imports
pub use family::{CreateFamilyMemberRequest, FamilyMember, Relationship};
pub use medical::{
    BillStatus, BillSummary, CreateInsurancePolicyRequest, CreateMedicalBillRequest,
    CreateMedicalDocumentRequest, CreatePrescriptionRequest, DocumentType, InsurancePolicy,
    MedicalBill, MedicalDocument, Prescription,
};
pub use womens_health::{
    CreateMenstrualCycleRequest, CreatePregnancyProfileRequest, CycleFertilityEstimate, CyclePhase,
    CyclePrediction, FlowIntensity, GestationalAge, MenstrualCycle, PregnancyProfile, PregnancyStatus,
    Trimester,
};
pub use baby_care::{
    AdministerVaccinationRequest, BreastSide, CreateFeedingLogRequest, CreateSleepLogRequest,
    CreateVaccinationRequest, DailyBabySummary, FeedingLog, FeedingType, SleepLog,
    VaccinationSchedule, VaccinationStatus, VaccinationStatusEntry,
};
pub use wellness::{BloodPressureCategory, CreateVitalLogRequest, VitalLog, VitalSummary, VitalType};
pub use gamification::{
    Activity, ActivityOutcome, ActivityStreak, Badge, BadgeCriterion, EarnedBadge, EarnedBadgeView,
    GamificationProfile, UserPoints,
};
