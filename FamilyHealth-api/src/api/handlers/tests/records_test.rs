#[cfg(test)]
mod records_tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::handlers::tests::{send, test_app};

    #[tokio::test]
    async fn test_missing_user_header_is_rejected() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/api/v1/family-members", None, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
        assert_eq!(body["message"], "Missing X-User-Id header");
    }

    #[tokio::test]
    async fn test_family_member_lifecycle() {
        let app = test_app();

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/family-members",
            Some("u1"),
            Some(json!({
                "full_name": "Asha Rao",
                "relationship": "child",
                "date_of_birth": "2023-06-01",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["user_id"], "u1");
        assert_eq!(created["relationship"], "child");
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/family-members/{}", id);

        let (status, listed) = send(&app, Method::GET, "/api/v1/family-members", Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some("u1"),
            Some(json!({ "blood_type": "O+" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["blood_type"], "O+");
        assert_eq!(updated["full_name"], "Asha Rao");

        let (status, fetched) = send(&app, Method::GET, &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["blood_type"], "O+");

        let (status, body) = send(&app, Method::DELETE, &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, body) = send(&app, Method::GET, &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_records_are_scoped_to_their_owner() {
        let app = test_app();

        let (_, created) = send(
            &app,
            Method::POST,
            "/api/v1/prescriptions",
            Some("u1"),
            Some(json!({ "medication_name": "Amoxicillin", "start_date": "2024-01-01" })),
        )
        .await;
        let uri = format!("/api/v1/prescriptions/{}", created["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::GET, &uri, Some("u2"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &uri, Some("u2"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = send(&app, Method::GET, "/api/v1/prescriptions", Some("u2"), None).await;
        assert!(listed.as_array().unwrap().is_empty());

        let (status, _) = send(&app, Method::GET, &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_request_is_validation_error() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/family-members",
            Some("u1"),
            Some(json!({ "full_name": "", "relationship": "spouse" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_list_filters_by_family_member() {
        let app = test_app();

        for (member, vital) in [("m1", 72.0), ("m1", 75.0), ("m2", 80.0)] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/v1/vitals",
                Some("u1"),
                Some(json!({ "family_member_id": member, "vital_type": "heart_rate", "value": vital })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, all) = send(&app, Method::GET, "/api/v1/vitals", Some("u1"), None).await;
        assert_eq!(all.as_array().unwrap().len(), 3);

        let (_, m1) = send(&app, Method::GET, "/api/v1/vitals?family_member_id=m1", Some("u1"), None).await;
        assert_eq!(m1.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_updates_enforce_field_rules() {
        let app = test_app();

        let cases = [
            (
                "/api/v1/menstrual-cycles",
                json!({ "start_date": "2024-01-01" }),
                json!({ "cycle_length": 4_000_000_000u32 }),
                "cycle_length",
            ),
            (
                "/api/v1/menstrual-cycles",
                json!({ "start_date": "2024-02-01" }),
                json!({ "cycle_length": 0 }),
                "cycle_length",
            ),
            (
                "/api/v1/feeding-logs",
                json!({ "family_member_id": "baby", "feeding_type": "bottle" }),
                json!({ "amount_ml": -5.0 }),
                "amount_ml",
            ),
            (
                "/api/v1/feeding-logs",
                json!({ "family_member_id": "baby", "feeding_type": "breast" }),
                json!({ "duration_minutes": 601 }),
                "duration_minutes",
            ),
            (
                "/api/v1/vaccinations",
                json!({ "family_member_id": "baby", "vaccine_name": "MMR", "scheduled_date": "2024-06-01" }),
                json!({ "dose_number": 0 }),
                "dose_number",
            ),
            (
                "/api/v1/vaccinations",
                json!({ "family_member_id": "baby", "vaccine_name": "DTaP", "scheduled_date": "2024-06-01" }),
                json!({ "vaccine_name": "" }),
                "vaccine_name",
            ),
            (
                "/api/v1/family-members",
                json!({ "full_name": "Asha Rao", "relationship": "child" }),
                json!({ "full_name": "" }),
                "full_name",
            ),
            (
                "/api/v1/medical-bills",
                json!({ "provider_name": "Clinic", "amount": 120.0, "bill_date": "2024-03-01" }),
                json!({ "amount": -1.0 }),
                "amount",
            ),
            (
                "/api/v1/vitals",
                json!({ "vital_type": "weight", "value": 70.0 }),
                json!({ "value": -70.0 }),
                "value",
            ),
        ];

        for (collection, create_body, patch, field) in cases {
            let (status, created) = send(&app, Method::POST, collection, Some("u1"), Some(create_body)).await;
            assert_eq!(status, StatusCode::CREATED, "creating at {}: {}", collection, created);
            let uri = format!("{}/{}", collection, created["id"].as_str().unwrap());

            let (status, body) = send(&app, Method::PUT, &uri, Some("u1"), Some(patch)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "updating {} at {}", field, collection);
            assert_eq!(body["error"], "validation_error");
            assert!(body["message"].as_str().unwrap().contains(field), "{}", body);

            let (_, stored) = send(&app, Method::GET, &uri, Some("u1"), None).await;
            assert_eq!(stored, created, "{} changed after a rejected update", uri);
        }
    }
}
