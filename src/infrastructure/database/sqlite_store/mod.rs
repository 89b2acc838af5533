use super::ConnectionPool;
use crate::application::ports::document_store::{
    validate_field_name, BatchOperation, CollectionQuery, DocumentStore, FieldValue,
    SortDirection, WriteBatch,
};
use crate::domain::value_objects::DocumentPath;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

mod mapper;
mod queries;

use mapper::{json_path, map_document_row};
use queries::{
    DELETE_DOCUMENT, FILTER_FIELD_EQUALS, INCREMENT_DOCUMENT_FIELD, ORDER_BY_FIELD,
    SELECT_COLLECTION, SELECT_DOCUMENT, SET_DOCUMENT_FIELD, UPSERT_DOCUMENT,
};

/// Document store persisted as JSON rows in SQLite; one transaction per batch.
pub struct SqliteDocumentStore {
    pool: ConnectionPool,
}

impl SqliteDocumentStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub async fn initialize(&self) -> Result<(), AppError> {
        self.pool.migrate().await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<bool, AppError> {
        let result = sqlx::query("SELECT 1")
            .fetch_one(self.pool.get_pool())
            .await;
        Ok(result.is_ok())
    }

    async fn apply_operation(
        tx: &mut Transaction<'_, Sqlite>,
        operation: &BatchOperation,
        now: i64,
    ) -> Result<(), AppError> {
        match operation {
            BatchOperation::Create { path, data } => {
                sqlx::query(UPSERT_DOCUMENT)
                    .bind(path.as_str())
                    .bind(path.parent().as_str())
                    .bind(serde_json::to_string(data)?)
                    .bind(now)
                    .execute(&mut **tx)
                    .await?;
            }
            BatchOperation::Update { path, fields } => {
                for (field, value) in fields {
                    validate_field_name(field)?;
                    let result = match value {
                        FieldValue::Set(value) => {
                            sqlx::query(SET_DOCUMENT_FIELD)
                                .bind(json_path(field))
                                .bind(serde_json::to_string(value)?)
                                .bind(now)
                                .bind(path.as_str())
                                .execute(&mut **tx)
                                .await?
                        }
                        FieldValue::Increment(amount) => {
                            sqlx::query(INCREMENT_DOCUMENT_FIELD)
                                .bind(json_path(field))
                                .bind(*amount)
                                .bind(now)
                                .bind(path.as_str())
                                .execute(&mut **tx)
                                .await?
                        }
                    };
                    if result.rows_affected() == 0 {
                        return Err(AppError::StoreCommit(format!(
                            "No document to update: {path}"
                        )));
                    }
                }
            }
            BatchOperation::Delete { path } => {
                sqlx::query(DELETE_DOCUMENT)
                    .bind(path.as_str())
                    .execute(&mut **tx)
                    .await?;
            }
        }
        Ok(())
    }

    async fn commit_operations(&self, batch: &WriteBatch) -> Result<(), AppError> {
        let now = Utc::now().timestamp_millis();
        let mut tx = self.pool.get_pool().begin().await?;

        for operation in batch.operations() {
            // Dropping `tx` on error rolls back every earlier operation.
            Self::apply_operation(&mut tx, operation, now).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        debug!(operations = batch.len(), "committing batch");
        self.commit_operations(&batch).await.map_err(AppError::commit)
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>, AppError> {
        let row = sqlx::query(SELECT_DOCUMENT)
            .bind(path.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(map_document_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, query: &CollectionQuery) -> Result<Vec<Value>, AppError> {
        let mut sql = SELECT_COLLECTION.to_string();
        if let Some((field, _)) = &query.filter {
            validate_field_name(field)?;
            sql.push_str(FILTER_FIELD_EQUALS);
        }
        if let Some((field, direction)) = &query.order_by {
            validate_field_name(field)?;
            sql.push_str(ORDER_BY_FIELD);
            sql.push_str(match direction {
                SortDirection::Ascending => " ASC",
                SortDirection::Descending => " DESC",
            });
        }

        let mut statement = sqlx::query(&sql).bind(query.collection.as_str());
        if let Some((field, expected)) = &query.filter {
            statement = statement
                .bind(json_path(field))
                .bind(serde_json::to_string(expected)?);
        }
        if let Some((field, _)) = &query.order_by {
            statement = statement.bind(json_path(field));
        }

        let rows = statement.fetch_all(self.pool.get_pool()).await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            documents.push(map_document_row(&row)?);
        }

        Ok(documents)
    }
}
