use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::store::{default_table_client, Filter, Query, Row, TableClient};
use super::errors::RepositoryError;
use super::schema::TableSchema;

/// A row model stored in one table of the store
pub trait TableRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table name and legacy column map
    const SCHEMA: TableSchema;

    /// Primary key of the record
    fn id(&self) -> &str;
}

/// Generic repository for one table.
///
/// Each operation issues a single request to the table client and maps rows
/// to and from the model, translating legacy column names on the way in.
pub struct TableRepository<M> {
    client: Arc<dyn TableClient>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for TableRepository<M> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _model: PhantomData,
        }
    }
}

impl<M> std::fmt::Debug for TableRepository<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRepository")
            .field("client", &self.client)
            .finish()
    }
}

impl<M: TableRecord> TableRepository<M> {
    /// Create a repository over a table client
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self {
            client,
            _model: PhantomData,
        }
    }

    /// Create a repository over the process default client
    pub fn with_default_client() -> Self {
        Self::new(default_table_client())
    }

    fn table(&self) -> &'static str {
        M::SCHEMA.name
    }

    /// Whether rows may still carry this column under a legacy name
    fn has_legacy_alias(column: &str) -> bool {
        M::SCHEMA.legacy_fields.iter().any(|(_, current)| *current == column)
    }

    fn to_row(record: &M) -> Result<Row, RepositoryError> {
        match serde_json::to_value(record)? {
            Value::Object(row) => Ok(row),
            other => Err(RepositoryError::Validation(format!(
                "{} record did not serialize to an object: {}",
                M::SCHEMA.name, other
            ))),
        }
    }

    fn from_row(row: Row) -> Result<M, RepositoryError> {
        let row = M::SCHEMA.normalize_row(row);
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    /// Insert a new record
    pub async fn create(&self, record: M) -> Result<M, RepositoryError> {
        debug!("Creating {} record: {}", self.table(), record.id());
        let row = self.client.insert(self.table(), Self::to_row(&record)?).await?;
        Self::from_row(row)
    }

    /// Fetch a record by id
    pub async fn get_by_id(&self, id: &str) -> Result<Option<M>, RepositoryError> {
        let rows = self.client
            .select(self.table(), &Query::new().eq("id", id).limit(1))
            .await?;

        rows.into_iter().next().map(Self::from_row).transpose()
    }

    /// List records matching a query.
    ///
    /// Filters and ordering on columns that have a legacy spelling are
    /// applied after normalization so that legacy rows are matched too.
    pub async fn list(&self, query: Query) -> Result<Vec<M>, RepositoryError> {
        let (post_filters, store_filters): (Vec<Filter>, Vec<Filter>) = query
            .filters
            .into_iter()
            .partition(|f| Self::has_legacy_alias(&f.column));

        let post_order = query
            .order_by
            .as_ref()
            .map_or(false, |o| Self::has_legacy_alias(&o.column));
        let needs_post_processing = !post_filters.is_empty() || post_order;

        let store_query = Query {
            filters: store_filters,
            order_by: if post_order { None } else { query.order_by.clone() },
            limit: if needs_post_processing { None } else { query.limit },
        };

        let rows = self.client.select(self.table(), &store_query).await?;
        let mut rows: Vec<Row> = rows
            .into_iter()
            .map(|row| M::SCHEMA.normalize_row(row))
            .filter(|row| post_filters.iter().all(|f| f.matches(row)))
            .collect();

        if post_order {
            if let Some(order) = &query.order_by {
                rows.sort_by(|a, b| {
                    let cmp = crate::store::compare_on(a, b, &order.column);
                    if order.descending { cmp.reverse() } else { cmp }
                });
            }
        }
        if needs_post_processing {
            if let Some(limit) = query.limit {
                rows.truncate(limit);
            }
        }

        rows.into_iter().map(Self::from_row).collect()
    }

    /// List every record owned by a user
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<M>, RepositoryError> {
        self.list(Query::new().eq("user_id", user_id)).await
    }

    /// Merge a partial row into a record; `None` when the id does not exist
    pub async fn update(&self, id: &str, mut patch: Row) -> Result<Option<M>, RepositoryError> {
        debug!("Updating {} record: {}", self.table(), id);
        M::SCHEMA.clear_legacy_columns(&mut patch);
        let rows = self.client
            .update(self.table(), &[Filter::eq("id", id)], patch)
            .await?;

        rows.into_iter().next().map(Self::from_row).transpose()
    }

    /// Write back a whole record, replacing every stored column
    pub async fn save(&self, record: &M) -> Result<M, RepositoryError> {
        let patch = Self::to_row(record)?;
        self.update(record.id(), patch)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("{} {}", self.table(), record.id())))
    }

    /// Delete a record by id; returns whether a row was removed
    pub async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        debug!("Deleting {} record: {}", self.table(), id);
        let removed = self.client
            .delete(self.table(), &[Filter::eq("id", id)])
            .await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::schema;
    use crate::store::InMemoryTableClient;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Note {
        id: String,
        user_id: String,
        medication_name: String,
        #[serde(default)]
        family_member_id: Option<String>,
    }

    impl TableRecord for Note {
        const SCHEMA: TableSchema = schema::PRESCRIPTIONS;

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, member: Option<&str>) -> Note {
        Note {
            id: id.to_string(),
            user_id: "u1".to_string(),
            medication_name: format!("med-{}", id),
            family_member_id: member.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let client = Arc::new(InMemoryTableClient::new());
        let repo: TableRepository<Note> = TableRepository::new(client);

        let created = repo.create(note("a", None)).await.unwrap();
        assert_eq!(created.id, "a");

        let fetched = repo.get_by_id("a").await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let mut patch = Row::new();
        patch.insert("medication_name".to_string(), json!("Ibuprofen"));
        let updated = repo.update("a", patch).await.unwrap().unwrap();
        assert_eq!(updated.medication_name, "Ibuprofen");

        assert!(repo.delete("a").await.unwrap());
        assert!(!repo.delete("a").await.unwrap());
        assert!(repo.get_by_id("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_legacy_rows() {
        let client = Arc::new(InMemoryTableClient::new());
        let legacy = json!({
            "id": "legacy",
            "user_id": "u1",
            "medicine_name": "Metformin",
            "member_id": "m1",
        });
        client
            .insert("prescriptions", legacy.as_object().cloned().unwrap())
            .await
            .unwrap();

        let repo: TableRepository<Note> = TableRepository::new(client);
        let fetched = repo.get_by_id("legacy").await.unwrap().unwrap();
        assert_eq!(fetched.medication_name, "Metformin");
        assert_eq!(fetched.family_member_id.as_deref(), Some("m1"));

        // Filtering on the current column name still matches the legacy row
        let by_member = repo
            .list(Query::new().eq("user_id", "u1").eq("family_member_id", "m1"))
            .await
            .unwrap();
        assert_eq!(by_member.len(), 1);
    }

    #[tokio::test]
    async fn test_clearing_a_legacy_backed_column_sticks() {
        let client = Arc::new(InMemoryTableClient::new());
        let legacy = json!({
            "id": "legacy",
            "user_id": "u1",
            "medicine_name": "Metformin",
            "member_id": "m1",
        });
        client
            .insert("prescriptions", legacy.as_object().cloned().unwrap())
            .await
            .unwrap();

        let repo: TableRepository<Note> = TableRepository::new(client.clone());
        let mut record = repo.get_by_id("legacy").await.unwrap().unwrap();
        record.family_member_id = None;
        let saved = repo.save(&record).await.unwrap();
        assert_eq!(saved.family_member_id, None);

        let fetched = repo.get_by_id("legacy").await.unwrap().unwrap();
        assert_eq!(fetched.family_member_id, None);
        assert_eq!(fetched.medication_name, "Metformin");

        let raw = client
            .select("prescriptions", &Query::new().eq("id", "legacy"))
            .await
            .unwrap();
        assert_eq!(raw[0]["member_id"], Value::Null);
    }

    #[tokio::test]
    async fn test_save_missing_record_is_not_found() {
        let repo: TableRepository<Note> = TableRepository::new(Arc::new(InMemoryTableClient::new()));
        let result = repo.save(&note("ghost", None)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}
