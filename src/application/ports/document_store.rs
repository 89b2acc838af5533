use crate::domain::value_objects::{CollectionPath, DocumentPath};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Value written to one field by a batched update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Set(Value),
    /// Added to the stored number (missing field counts as 0).
    Increment(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOperation {
    Create {
        path: DocumentPath,
        data: Value,
    },
    Update {
        path: DocumentPath,
        fields: BTreeMap<String, FieldValue>,
    },
    Delete {
        path: DocumentPath,
    },
}

impl BatchOperation {
    pub fn path(&self) -> &DocumentPath {
        match self {
            BatchOperation::Create { path, .. }
            | BatchOperation::Update { path, .. }
            | BatchOperation::Delete { path } => path,
        }
    }
}

/// Ordered set of writes committed all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    operations: Vec<BatchOperation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the whole document, replacing any previous content.
    pub fn create(&mut self, path: DocumentPath, data: Value) -> &mut Self {
        self.operations.push(BatchOperation::Create { path, data });
        self
    }

    /// Touches the listed fields of an existing document.
    pub fn update<I, K>(&mut self, path: DocumentPath, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        self.operations.push(BatchOperation::Update { path, fields });
        self
    }

    pub fn delete(&mut self, path: DocumentPath) -> &mut Self {
        self.operations.push(BatchOperation::Delete { path });
        self
    }

    pub fn operations(&self) -> &[BatchOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<BatchOperation> {
        self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Read of one collection, optionally filtered on a field and ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionQuery {
    pub collection: CollectionPath,
    pub filter: Option<(String, Value)>,
    pub order_by: Option<(String, SortDirection)>,
}

impl CollectionQuery {
    pub fn all(collection: CollectionPath) -> Self {
        Self {
            collection,
            filter: None,
            order_by: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }
}

/// Field names usable in updates, filters and ordering.
pub fn validate_field_name(field: &str) -> Result<(), AppError> {
    if !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("Invalid field name: {field:?}")))
    }
}

/// Remote authoritative document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn begin_batch(&self) -> WriteBatch {
        WriteBatch::new()
    }

    /// Applies every operation of the batch or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError>;

    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>, AppError>;

    async fn list(&self, query: &CollectionQuery) -> Result<Vec<Value>, AppError>;
}
