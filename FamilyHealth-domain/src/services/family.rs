use chrono::{DateTime, Utc};
use uuid::Uuid;

use family_health_data::models::FamilyMemberRow;

use crate::entities::conversions;
use crate::entities::{Activity, CreateFamilyMemberRequest, FamilyMember};
use super::errors::ServiceError;
use super::records::{DomainRecord, RecordService};

/// Family member profiles
pub type FamilyService = RecordService<FamilyMember>;

impl DomainRecord for FamilyMember {
    type Row = FamilyMemberRow;
    type Create = CreateFamilyMemberRequest;

    const LABEL: &'static str = "Family member";
    const ACTIVITY: Option<Activity> = Some(Activity::FamilyMemberAdded);
    const ORDER_BY: Option<(&'static str, bool)> = Some(("full_name", false));

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn from_row(row: FamilyMemberRow) -> Result<Self, String> {
        conversions::convert_to_domain_family_member(row)
    }

    fn to_row(&self) -> FamilyMemberRow {
        conversions::convert_to_data_family_member(self)
    }

    fn from_request(user_id: &str, request: CreateFamilyMemberRequest, now: DateTime<Utc>) -> Result<Self, ServiceError> {
        Ok(FamilyMember {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            full_name: request.full_name.trim().to_string(),
            relationship: request.relationship,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            blood_type: request.blood_type,
            allergies: request.allergies,
            chronic_conditions: request.chronic_conditions,
            emergency_contact: request.emergency_contact,
            created_at: now,
            updated_at: now,
        })
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.full_name.trim().is_empty() {
            return Err(ServiceError::Validation("Full name cannot be empty".to_string()));
        }
        if let Some(dob) = self.date_of_birth {
            if dob > Utc::now().date_naive() {
                return Err(ServiceError::Validation("Date of birth cannot be in the future".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use serde_json::json;

    use family_health_data::store::{InMemoryTableClient, Row};
    use crate::entities::Relationship;

    fn request(name: &str) -> CreateFamilyMemberRequest {
        CreateFamilyMemberRequest {
            full_name: name.to_string(),
            relationship: Relationship::Child,
            date_of_birth: NaiveDate::from_ymd_opt(2019, 4, 2),
            gender: None,
            blood_type: None,
            allergies: vec![],
            chronic_conditions: vec![],
            emergency_contact: None,
        }
    }

    fn service() -> FamilyService {
        FamilyService::new(Arc::new(InMemoryTableClient::new()))
    }

    #[tokio::test]
    async fn test_create_list_and_scope_by_user() {
        let service = service();
        service.create("u1", request("Zoe")).await.unwrap();
        service.create("u1", request("Adam")).await.unwrap();
        service.create("u2", request("Other")).await.unwrap();

        let members = service.list("u1", None).await.unwrap();
        let names: Vec<&str> = members.iter().map(|m| m.full_name.as_str()).collect();
        assert_eq!(names, vec!["Adam", "Zoe"]);
    }

    #[tokio::test]
    async fn test_other_users_record_is_not_found() {
        let service = service();
        let member = service.create("u1", request("Zoe")).await.unwrap();

        let result = service.get("u2", &member.id).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        let result = service.delete("u2", &member.id).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_name() {
        let result = service().create("u1", request("")).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_patch_updates_fields_and_keeps_owner() {
        let service = service();
        let member = service.create("u1", request("Zoe")).await.unwrap();

        let patch: Row = json!({
            "full_name": "Zoe Smith",
            "relation": "spouse",
            "user_id": "intruder",
        })
        .as_object()
        .cloned()
        .unwrap();

        let updated = service.update("u1", &member.id, patch).await.unwrap();
        assert_eq!(updated.full_name, "Zoe Smith");
        assert_eq!(updated.relationship, Relationship::Spouse);
        assert_eq!(updated.user_id, "u1");
        assert_eq!(updated.created_at, member.created_at);
    }

    #[tokio::test]
    async fn test_patch_with_unknown_enum_is_rejected() {
        let service = service();
        let member = service.create("u1", request("Zoe")).await.unwrap();

        let patch: Row = json!({ "relationship": "neighbour" }).as_object().cloned().unwrap();
        let result = service.update("u1", &member.id, patch).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let service = service();
        let member = service.create("u1", request("Zoe")).await.unwrap();

        service.delete("u1", &member.id).await.unwrap();
        assert!(matches!(service.get("u1", &member.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_repository_error() {
        let service = FamilyService::new(Arc::new(crate::testing::FailingTableClient::new()));

        let listed = service.list("u1", None).await;
        assert!(matches!(listed, Err(ServiceError::Repository(_))));

        let created = service.create("u1", request("Ava")).await;
        assert!(matches!(created, Err(ServiceError::Repository(_))));
    }
}
