use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

string_enum! {
    /// A user action that earns points
    pub enum Activity {
        FamilyMemberAdded => "family_member_added",
        PrescriptionAdded => "prescription_added",
        InsuranceAdded => "insurance_added",
        BillLogged => "bill_logged",
        DocumentUploaded => "document_uploaded",
        PregnancyStarted => "pregnancy_started",
        CycleLogged => "cycle_logged",
        VaccinationScheduled => "vaccination_scheduled",
        VaccinationRecorded => "vaccination_recorded",
        FeedingLogged => "feeding_logged",
        SleepLogged => "sleep_logged",
        VitalLogged => "vital_logged",
    }
}

/// A user's points balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserPoints {
    pub id: String,
    pub user_id: String,
    pub total_points: u32,
    pub level: u32,
    /// Times each activity was recorded, keyed by activity name
    pub activity_counts: BTreeMap<String, u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPoints {
    /// Number of times an activity was recorded
    pub fn count_of(&self, activity: Activity) -> u32 {
        self.activity_counts.get(activity.as_str()).copied().unwrap_or(0)
    }
}

/// A badge a user has unlocked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct EarnedBadge {
    pub id: String,
    pub user_id: String,
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Consecutive days on which an activity was recorded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ActivityStreak {
    pub id: String,
    pub user_id: String,
    pub activity_type: Activity,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Condition that unlocks a badge
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeCriterion {
    /// Total points reach a threshold
    TotalPoints { points: u32 },
    /// The streak of the recorded activity reaches a length
    Streak { days: u32 },
    /// An activity was recorded a number of times
    ActivityCount { activity: Activity, count: u32 },
}

/// Entry of the badge catalog
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub criterion: BadgeCriterion,
}

/// An earned badge joined with its catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct EarnedBadgeView {
    pub badge_id: String,
    pub name: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

/// Result of recording one activity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ActivityOutcome {
    pub activity: Activity,
    pub points_awarded: u32,
    pub total_points: u32,
    pub level: u32,
    pub leveled_up: bool,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub new_badges: Vec<EarnedBadgeView>,
}

/// Everything the gamification screen shows for a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct GamificationProfile {
    pub user_id: String,
    pub total_points: u32,
    pub level: u32,
    /// Absent at the top level
    pub points_to_next_level: Option<u32>,
    pub activity_counts: BTreeMap<String, u32>,
    pub streaks: Vec<ActivityStreak>,
    pub badges: Vec<EarnedBadgeView>,
}
