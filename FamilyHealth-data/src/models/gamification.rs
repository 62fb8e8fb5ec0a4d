use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::repository::schema::{ACTIVITY_STREAKS, EARNED_BADGES, USER_POINTS};
use super::table_record;

/// Storage model for a user's points balance and activity counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPointsRow {
    pub id: String,
    pub user_id: String,

    /// Legacy column: `points`
    #[serde(default)]
    pub total_points: u32,

    #[serde(default = "default_level")]
    pub level: u32,

    /// Number of times each activity was recorded
    #[serde(default)]
    pub activity_counts: BTreeMap<String, u32>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

fn default_level() -> u32 {
    1
}

table_record!(UserPointsRow, USER_POINTS);

/// Storage model for a badge a user has unlocked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarnedBadgeRow {
    pub id: String,
    pub user_id: String,

    /// Key into the badge table (legacy column: `badge_key`)
    pub badge_id: String,

    /// Legacy column: `unlocked_at`
    pub earned_at: String,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(EarnedBadgeRow, EARNED_BADGES);

/// Storage model for a consecutive-day activity streak
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityStreakRow {
    pub id: String,
    pub user_id: String,

    /// Legacy column: `streak_type`
    pub activity_type: String,

    /// Legacy column: `streak_count`
    #[serde(default)]
    pub current_streak: u32,

    /// Legacy column: `best_streak`
    #[serde(default)]
    pub longest_streak: u32,

    /// `YYYY-MM-DD` of the last recorded day (legacy column: `last_date`)
    #[serde(default)]
    pub last_activity_date: Option<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

table_record!(ActivityStreakRow, ACTIVITY_STREAKS);
