//! Points, levels, streaks and badges.
//!
//! Every tracked action records an [`Activity`]. Recording reads the user's
//! points row, adds the activity's points, advances the activity streak and
//! unlocks any badges whose criteria are now met. Writes are plain
//! read-modify-write without a transaction; concurrent updates for the same
//! user may lose points (last write wins).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use tracing::{debug, info};
use uuid::Uuid;

use family_health_data::models::{ActivityStreakRow, EarnedBadgeRow, UserPointsRow};
use family_health_data::repository::TableRepository;
use family_health_data::store::{default_table_client, Query, TableClient};

use crate::entities::conversions;
use crate::entities::{
    Activity, ActivityOutcome, ActivityStreak, Badge, BadgeCriterion, EarnedBadge, EarnedBadgeView,
    GamificationProfile, UserPoints,
};
use super::errors::{map_repo_error, ServiceError};

/// Trait for gamification operations
#[async_trait]
pub trait GamificationServiceTrait: Send + Sync {
    /// Award points for an activity done on `date`
    async fn record_activity(&self, user_id: &str, activity: Activity, date: NaiveDate) -> Result<ActivityOutcome, ServiceError>;

    /// Points, level, streaks and badges of a user
    async fn profile(&self, user_id: &str) -> Result<GamificationProfile, ServiceError>;
}

/// Points earned for one activity
pub fn points_for(activity: Activity) -> u32 {
    match activity {
        Activity::FamilyMemberAdded => 20,
        Activity::PrescriptionAdded => 10,
        Activity::InsuranceAdded => 15,
        Activity::BillLogged => 10,
        Activity::DocumentUploaded => 10,
        Activity::PregnancyStarted => 25,
        Activity::CycleLogged => 10,
        Activity::VaccinationScheduled => 5,
        Activity::VaccinationRecorded => 20,
        Activity::FeedingLogged => 5,
        Activity::SleepLogged => 5,
        Activity::VitalLogged => 5,
    }
}

/// Total points needed to reach each level, starting at level 1
pub const LEVEL_THRESHOLDS: [u32; 10] = [0, 100, 250, 500, 1000, 2000, 3500, 5000, 7500, 10000];

/// Level for a points total
pub fn level_for(total_points: u32) -> u32 {
    LEVEL_THRESHOLDS
        .iter()
        .take_while(|threshold| total_points >= **threshold)
        .count()
        .max(1) as u32
}

/// Points still needed for the next level; `None` at the top level
pub fn points_to_next_level(total_points: u32) -> Option<u32> {
    LEVEL_THRESHOLDS
        .get(level_for(total_points) as usize)
        .map(|next| next - total_points)
}

/// Advance a streak for activity on `date`.
///
/// Same day leaves it unchanged, the next day extends it, a gap restarts it
/// at 1 and a date before the last recorded one is ignored.
pub fn advance_streak(streak: &mut ActivityStreak, date: NaiveDate) {
    match streak.last_activity_date {
        Some(last) if date <= last => return,
        Some(last) if (date - last).num_days() == 1 => streak.current_streak += 1,
        _ => streak.current_streak = 1,
    }

    streak.last_activity_date = Some(date);
    streak.longest_streak = streak.longest_streak.max(streak.current_streak);
}

/// Badge catalog, evaluated in order
pub const BADGES: &[Badge] = &[
    Badge {
        id: "first_steps",
        name: "First Steps",
        description: "Earn your first 10 points",
        criterion: BadgeCriterion::TotalPoints { points: 10 },
    },
    Badge {
        id: "century",
        name: "Century",
        description: "Reach 100 points",
        criterion: BadgeCriterion::TotalPoints { points: 100 },
    },
    Badge {
        id: "dedicated",
        name: "Dedicated",
        description: "Reach 500 points",
        criterion: BadgeCriterion::TotalPoints { points: 500 },
    },
    Badge {
        id: "health_champion",
        name: "Health Champion",
        description: "Reach 1000 points",
        criterion: BadgeCriterion::TotalPoints { points: 1000 },
    },
    Badge {
        id: "week_warrior",
        name: "Week Warrior",
        description: "Keep any activity going for 7 days in a row",
        criterion: BadgeCriterion::Streak { days: 7 },
    },
    Badge {
        id: "month_master",
        name: "Month Master",
        description: "Keep any activity going for 30 days in a row",
        criterion: BadgeCriterion::Streak { days: 30 },
    },
    Badge {
        id: "family_circle",
        name: "Family Circle",
        description: "Add three family members",
        criterion: BadgeCriterion::ActivityCount { activity: Activity::FamilyMemberAdded, count: 3 },
    },
    Badge {
        id: "vital_tracker",
        name: "Vital Tracker",
        description: "Log ten vital readings",
        criterion: BadgeCriterion::ActivityCount { activity: Activity::VitalLogged, count: 10 },
    },
    Badge {
        id: "cycle_aware",
        name: "Cycle Aware",
        description: "Log three menstrual cycles",
        criterion: BadgeCriterion::ActivityCount { activity: Activity::CycleLogged, count: 3 },
    },
    Badge {
        id: "vaccine_guardian",
        name: "Vaccine Guardian",
        description: "Record five vaccinations",
        criterion: BadgeCriterion::ActivityCount { activity: Activity::VaccinationRecorded, count: 5 },
    },
    Badge {
        id: "night_watch",
        name: "Night Watch",
        description: "Log ten sleep sessions",
        criterion: BadgeCriterion::ActivityCount { activity: Activity::SleepLogged, count: 10 },
    },
    Badge {
        id: "well_fed",
        name: "Well Fed",
        description: "Log 25 feedings",
        criterion: BadgeCriterion::ActivityCount { activity: Activity::FeedingLogged, count: 25 },
    },
    Badge {
        id: "organized",
        name: "Organized",
        description: "Upload five medical documents",
        criterion: BadgeCriterion::ActivityCount { activity: Activity::DocumentUploaded, count: 5 },
    },
];

static BADGE_INDEX: Lazy<HashMap<&'static str, &'static Badge>> =
    Lazy::new(|| BADGES.iter().map(|badge| (badge.id, badge)).collect());

/// Catalog entry for a badge id
pub fn find_badge(id: &str) -> Option<&'static Badge> {
    BADGE_INDEX.get(id).copied()
}

/// Whether a badge criterion holds after recording an activity
pub fn criterion_met(criterion: &BadgeCriterion, points: &UserPoints, streak: &ActivityStreak) -> bool {
    match criterion {
        BadgeCriterion::TotalPoints { points: threshold } => points.total_points >= *threshold,
        BadgeCriterion::Streak { days } => streak.current_streak >= *days,
        BadgeCriterion::ActivityCount { activity, count } => points.count_of(*activity) >= *count,
    }
}

/// Join an earned badge with its catalog entry
pub fn badge_view(earned: &EarnedBadge) -> EarnedBadgeView {
    let (name, description) = match find_badge(&earned.badge_id) {
        Some(badge) => (badge.name.to_string(), badge.description.to_string()),
        None => (earned.badge_id.clone(), String::new()),
    };

    EarnedBadgeView {
        badge_id: earned.badge_id.clone(),
        name,
        description,
        earned_at: earned.earned_at,
    }
}

/// Gamification over the points, streak and badge tables
#[derive(Debug, Clone)]
pub struct GamificationService {
    points: TableRepository<UserPointsRow>,
    streaks: TableRepository<ActivityStreakRow>,
    badges: TableRepository<EarnedBadgeRow>,
}

impl GamificationService {
    /// Create the service over a table client
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self {
            points: TableRepository::new(client.clone()),
            streaks: TableRepository::new(client.clone()),
            badges: TableRepository::new(client),
        }
    }

    /// The stored points row, if the user has earned anything yet
    async fn load_points(&self, user_id: &str) -> Result<Option<UserPoints>, ServiceError> {
        let rows = self.points
            .list(Query::new().eq("user_id", user_id).limit(1))
            .await
            .map_err(map_repo_error)?;

        Ok(rows.into_iter().next().map(conversions::convert_to_domain_user_points))
    }

    async fn load_streak(&self, user_id: &str, activity: Activity) -> Result<Option<ActivityStreak>, ServiceError> {
        let rows = self.streaks
            .list(Query::new().eq("user_id", user_id).eq("activity_type", activity.as_str()).limit(1))
            .await
            .map_err(map_repo_error)?;

        rows.into_iter()
            .next()
            .map(conversions::convert_to_domain_activity_streak)
            .transpose()
            .map_err(ServiceError::Validation)
    }

    async fn load_streaks(&self, user_id: &str) -> Result<Vec<ActivityStreak>, ServiceError> {
        let rows = self.streaks
            .list(Query::new().eq("user_id", user_id))
            .await
            .map_err(map_repo_error)?;

        rows.into_iter()
            .map(conversions::convert_to_domain_activity_streak)
            .collect::<Result<_, _>>()
            .map_err(ServiceError::Validation)
    }

    async fn load_badges(&self, user_id: &str) -> Result<Vec<EarnedBadge>, ServiceError> {
        let rows = self.badges
            .list(Query::new().eq("user_id", user_id).order_by("earned_at", false))
            .await
            .map_err(map_repo_error)?;

        rows.into_iter()
            .map(conversions::convert_to_domain_earned_badge)
            .collect::<Result<_, _>>()
            .map_err(ServiceError::Validation)
    }

    fn new_points(user_id: &str, now: DateTime<Utc>) -> UserPoints {
        UserPoints {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            total_points: 0,
            level: 1,
            activity_counts: Default::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn new_streak(user_id: &str, activity: Activity, now: DateTime<Utc>) -> ActivityStreak {
        ActivityStreak {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            activity_type: activity,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn store_points(&self, points: &UserPoints, exists: bool) -> Result<(), ServiceError> {
        let row = conversions::convert_to_data_user_points(points);
        if exists {
            self.points.save(&row).await.map_err(map_repo_error)?;
        } else {
            self.points.create(row).await.map_err(map_repo_error)?;
        }
        Ok(())
    }

    async fn store_streak(&self, streak: &ActivityStreak, exists: bool) -> Result<(), ServiceError> {
        let row = conversions::convert_to_data_activity_streak(streak);
        if exists {
            self.streaks.save(&row).await.map_err(map_repo_error)?;
        } else {
            self.streaks.create(row).await.map_err(map_repo_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl GamificationServiceTrait for GamificationService {
    async fn record_activity(&self, user_id: &str, activity: Activity, date: NaiveDate) -> Result<ActivityOutcome, ServiceError> {
        let now = Utc::now();

        let stored_points = self.load_points(user_id).await?;
        let points_exist = stored_points.is_some();
        let mut points = stored_points.unwrap_or_else(|| Self::new_points(user_id, now));

        let awarded = points_for(activity);
        let previous_level = level_for(points.total_points);
        points.total_points = points.total_points.saturating_add(awarded);
        points.level = level_for(points.total_points);
        *points.activity_counts.entry(activity.as_str().to_string()).or_insert(0) += 1;
        points.updated_at = now;
        self.store_points(&points, points_exist).await?;

        let stored_streak = self.load_streak(user_id, activity).await?;
        let streak_exists = stored_streak.is_some();
        let mut streak = stored_streak.unwrap_or_else(|| Self::new_streak(user_id, activity, now));
        advance_streak(&mut streak, date);
        streak.updated_at = now;
        self.store_streak(&streak, streak_exists).await?;

        let earned: HashSet<String> = self.load_badges(user_id)
            .await?
            .into_iter()
            .map(|badge| badge.badge_id)
            .collect();

        let mut new_badges = Vec::new();
        for badge in BADGES {
            if earned.contains(badge.id) || !criterion_met(&badge.criterion, &points, &streak) {
                continue;
            }

            let record = EarnedBadge {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                badge_id: badge.id.to_string(),
                earned_at: now,
                created_at: now,
                updated_at: now,
            };
            self.badges
                .create(conversions::convert_to_data_earned_badge(&record))
                .await
                .map_err(map_repo_error)?;
            info!("User earned the {} badge", badge.id);
            new_badges.push(badge_view(&record));
        }

        debug!(
            "Recorded {} for {} points; total {}",
            activity, awarded, points.total_points
        );

        Ok(ActivityOutcome {
            activity,
            points_awarded: awarded,
            total_points: points.total_points,
            level: points.level,
            leveled_up: points.level > previous_level,
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
            new_badges,
        })
    }

    async fn profile(&self, user_id: &str) -> Result<GamificationProfile, ServiceError> {
        let (points, streaks, badges) = futures::try_join!(
            self.load_points(user_id),
            self.load_streaks(user_id),
            self.load_badges(user_id),
        )?;

        let points = points.unwrap_or_else(|| Self::new_points(user_id, Utc::now()));

        Ok(GamificationProfile {
            user_id: user_id.to_string(),
            total_points: points.total_points,
            level: level_for(points.total_points),
            points_to_next_level: points_to_next_level(points.total_points),
            activity_counts: points.activity_counts,
            streaks,
            badges: badges.iter().map(badge_view).collect(),
        })
    }
}

/// Create a gamification service over the process default table client
pub fn create_default_gamification_service() -> Arc<dyn GamificationServiceTrait> {
    Arc::new(GamificationService::new(default_table_client()))
}
