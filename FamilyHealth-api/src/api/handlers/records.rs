//! CRUD handlers shared by every record collection.
//!
//! Each collection mounts the same five handlers over its own
//! [`RecordService`] via [`record_routes`].

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info};
use utoipa::IntoParams;

use family_health_domain::services::{DomainRecord, RecordService};
use family_health_domain::store::Row;

use crate::api::extract::UserId;
use crate::entities::ErrorResponse;

/// Optional filter for collection listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberFilter {
    /// Only records of this family member
    pub family_member_id: Option<String>,
}

/// List the caller's records
pub async fn list_records<E: DomainRecord>(
    State(service): State<RecordService<E>>,
    user: UserId,
    Query(filter): Query<MemberFilter>,
) -> Result<Json<Vec<E>>, ErrorResponse> {
    debug!("Listing {} records", E::LABEL);
    let records = service
        .list(user.as_str(), filter.family_member_id.as_deref())
        .await?;
    Ok(Json(records))
}

/// Create a record from the request body
pub async fn create_record<E>(
    State(service): State<RecordService<E>>,
    user: UserId,
    Json(request): Json<E::Create>,
) -> Result<impl IntoResponse, ErrorResponse>
where
    E: DomainRecord,
    E::Create: DeserializeOwned,
{
    let record = service.create(user.as_str(), request).await?;
    info!("{} created with ID: {}", E::LABEL, record.id());
    Ok((StatusCode::CREATED, Json(record)))
}

/// Fetch one record
pub async fn get_record<E: DomainRecord>(
    State(service): State<RecordService<E>>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<E>, ErrorResponse> {
    Ok(Json(service.get(user.as_str(), &id).await?))
}

/// Merge a partial JSON object into a record
pub async fn update_record<E: DomainRecord>(
    State(service): State<RecordService<E>>,
    user: UserId,
    Path(id): Path<String>,
    Json(patch): Json<Row>,
) -> Result<Json<E>, ErrorResponse> {
    let record = service.update(user.as_str(), &id, patch).await?;
    info!("{} updated with ID: {}", E::LABEL, id);
    Ok(Json(record))
}

/// Delete a record
pub async fn delete_record<E: DomainRecord>(
    State(service): State<RecordService<E>>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    service.delete(user.as_str(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Collection and item routes for one record type under `base`
pub fn record_routes<E>(base: &str, service: RecordService<E>) -> Router
where
    E: DomainRecord,
    E::Create: DeserializeOwned,
{
    Router::new()
        .route(base, get(list_records::<E>).post(create_record::<E>))
        .route(
            &format!("{}/:id", base),
            get(get_record::<E>).put(update_record::<E>).delete(delete_record::<E>),
        )
        .with_state(service)
}
