//! Generic CRUD service shared by every feature module.
//!
//! Each feature entity implements [`DomainRecord`] to say which row model
//! backs it, how requests become records, and which activity (if any) a new
//! record earns. [`RecordService`] then provides user-scoped list, get,
//! create, patch and delete on top of a [`TableRepository`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use validator::Validate;

use family_health_data::repository::{TableRecord, TableRepository};
use family_health_data::store::{Query, Row, TableClient};

use crate::entities::Activity;
use super::errors::{map_repo_error, validation_message, ServiceError};
use super::gamification::GamificationServiceTrait;

/// Columns a patch may never change
const PROTECTED_COLUMNS: &[&str] = &["id", "user_id", "created_at", "updated_at"];

/// A domain entity persisted as one row of a table
pub trait DomainRecord: Serialize + Validate + Clone + Send + Sync + 'static {
    /// Row model backing the entity
    type Row: TableRecord;

    /// Request payload that creates the entity
    type Create: Validate + Send + 'static;

    /// Human-readable name used in messages
    const LABEL: &'static str;

    /// Activity awarded when a record is created
    const ACTIVITY: Option<Activity> = None;

    /// Default list ordering as `(column, descending)`
    const ORDER_BY: Option<(&'static str, bool)> = None;

    fn id(&self) -> &str;

    fn user_id(&self) -> &str;

    fn set_updated_at(&mut self, now: DateTime<Utc>);

    /// Convert a stored row, rejecting unknown enum values and bad dates
    fn from_row(row: Self::Row) -> Result<Self, String>;

    fn to_row(&self) -> Self::Row;

    /// Build a new record owned by `user_id`; the request is already validated
    fn from_request(user_id: &str, request: Self::Create, now: DateTime<Utc>) -> Result<Self, ServiceError>;

    /// Cross-field checks run before every write, after the field rules
    fn check(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Recompute derived fields after a patch was merged in
    fn after_patch(&mut self, _patch: &Row) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// User-scoped CRUD over one entity type
pub struct RecordService<E: DomainRecord> {
    repository: TableRepository<E::Row>,
    gamification: Option<Arc<dyn GamificationServiceTrait>>,
}

impl<E: DomainRecord> Clone for RecordService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            gamification: self.gamification.clone(),
        }
    }
}

impl<E: DomainRecord> std::fmt::Debug for RecordService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordService")
            .field("label", &E::LABEL)
            .field("gamification", &self.gamification.is_some())
            .finish()
    }
}

impl<E: DomainRecord> RecordService<E> {
    /// Create a service over a table client
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self {
            repository: TableRepository::new(client),
            gamification: None,
        }
    }

    /// Award points through a gamification service when records are created
    pub fn with_gamification(mut self, gamification: Arc<dyn GamificationServiceTrait>) -> Self {
        self.gamification = Some(gamification);
        self
    }

    fn convert(row: E::Row) -> Result<E, ServiceError> {
        E::from_row(row).map_err(ServiceError::Validation)
    }

    /// Field rules and cross-field checks, applied to every record written
    fn verify(record: &E) -> Result<(), ServiceError> {
        record
            .validate()
            .map_err(|errors| ServiceError::Validation(validation_message(&errors)))?;
        record.check()
    }

    fn not_found(id: &str) -> ServiceError {
        ServiceError::NotFound(format!("{} with ID {} not found", E::LABEL, id))
    }

    /// List a user's records, optionally for one family member.
    ///
    /// Rows that no longer convert are skipped with a warning.
    pub async fn list(&self, user_id: &str, family_member_id: Option<&str>) -> Result<Vec<E>, ServiceError> {
        let mut query = Query::new().eq("user_id", user_id);
        if let Some(member) = family_member_id {
            query = query.eq("family_member_id", member);
        }
        if let Some((column, descending)) = E::ORDER_BY {
            query = query.order_by(column, descending);
        }

        let rows = self.repository.list(query).await.map_err(map_repo_error)?;
        let records = rows
            .into_iter()
            .filter_map(|row| match E::from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable {} row: {}", E::LABEL, e);
                    None
                },
            })
            .collect();

        Ok(records)
    }

    /// Fetch one record owned by the user
    pub async fn get(&self, user_id: &str, id: &str) -> Result<E, ServiceError> {
        let row = self.repository
            .get_by_id(id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Self::not_found(id))?;

        let record = Self::convert(row)?;
        if record.user_id() != user_id {
            debug!("{} {} requested by a user who does not own it", E::LABEL, id);
            return Err(Self::not_found(id));
        }

        Ok(record)
    }

    /// Validate a request and store the new record
    pub async fn create(&self, user_id: &str, request: E::Create) -> Result<E, ServiceError> {
        request
            .validate()
            .map_err(|errors| ServiceError::Validation(validation_message(&errors)))?;

        let record = E::from_request(user_id, request, Utc::now())?;
        Self::verify(&record)?;

        let row = self.repository
            .create(record.to_row())
            .await
            .map_err(map_repo_error)?;
        let created = Self::convert(row)?;
        info!("Created {} with ID: {}", E::LABEL, created.id());

        if let Some(activity) = E::ACTIVITY {
            self.award(user_id, activity).await;
        }

        Ok(created)
    }

    /// Merge a partial update into a record.
    ///
    /// Legacy column names in the patch are translated; `id`, `user_id` and
    /// the bookkeeping timestamps are ignored.
    pub async fn update(&self, user_id: &str, id: &str, patch: Row) -> Result<E, ServiceError> {
        let existing = self.get(user_id, id).await?;
        let patch = <E::Row as TableRecord>::SCHEMA.normalize_row(patch);

        let mut merged = match serde_json::to_value(existing.to_row()) {
            Ok(Value::Object(row)) => row,
            Ok(_) | Err(_) => {
                return Err(ServiceError::Repository(format!("{} could not be serialized", E::LABEL)));
            },
        };
        for (column, value) in patch.iter() {
            if !PROTECTED_COLUMNS.contains(&column.as_str()) {
                merged.insert(column.clone(), value.clone());
            }
        }

        let row: E::Row = serde_json::from_value(Value::Object(merged))
            .map_err(|e| ServiceError::Validation(format!("Invalid {} update: {}", E::LABEL, e)))?;
        let mut record = Self::convert(row)?;
        record.after_patch(&patch)?;

        self.save(record).await
    }

    /// Write back a whole record after checking it
    pub async fn save(&self, mut record: E) -> Result<E, ServiceError> {
        record.set_updated_at(Utc::now());
        Self::verify(&record)?;

        let row = self.repository
            .save(&record.to_row())
            .await
            .map_err(map_repo_error)?;
        debug!("Saved {} with ID: {}", E::LABEL, record.id());
        Self::convert(row)
    }

    /// Delete a record owned by the user
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), ServiceError> {
        self.get(user_id, id).await?;

        let removed = self.repository.delete(id).await.map_err(map_repo_error)?;
        if !removed {
            return Err(Self::not_found(id));
        }

        info!("Deleted {} with ID: {}", E::LABEL, id);
        Ok(())
    }

    /// Record an activity; failures are logged and never reach the caller
    pub(crate) async fn award(&self, user_id: &str, activity: Activity) {
        let Some(gamification) = &self.gamification else {
            return;
        };

        if let Err(e) = gamification.record_activity(user_id, activity, Utc::now().date_naive()).await {
            warn!("Failed to record {} activity: {}", activity, e);
        }
    }
}
