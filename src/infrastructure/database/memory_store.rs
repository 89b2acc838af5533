use crate::application::ports::document_store::{
    validate_field_name, BatchOperation, CollectionQuery, DocumentStore, FieldValue,
    SortDirection, WriteBatch,
};
use crate::domain::value_objects::DocumentPath;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{watch, Mutex};

/// In-process document store with the same batch semantics as the remote one.
///
/// Used by tests and local runs; supports failure injection and pausing reads.
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<DocumentPath, Value>>,
    commit_failure: Mutex<Option<String>>,
    read_failure: Mutex<Option<String>>,
    reads_paused: watch::Sender<bool>,
    commits: AtomicU64,
    reads: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (reads_paused, _) = watch::channel(false);
        Self {
            documents: Mutex::new(BTreeMap::new()),
            commit_failure: Mutex::new(None),
            read_failure: Mutex::new(None),
            reads_paused,
            commits: AtomicU64::new(0),
            reads: AtomicU64::new(0),
        }
    }

    pub async fn put(&self, path: DocumentPath, data: Value) {
        self.documents.lock().await.insert(path, data);
    }

    pub async fn document(&self, path: &DocumentPath) -> Option<Value> {
        self.documents.lock().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.lock().await.is_empty()
    }

    /// Every commit fails with `message` until cleared with `None`.
    pub async fn set_commit_failure(&self, message: Option<&str>) {
        *self.commit_failure.lock().await = message.map(str::to_string);
    }

    /// Every collection read fails with `message` until cleared with `None`.
    pub async fn set_read_failure(&self, message: Option<&str>) {
        *self.read_failure.lock().await = message.map(str::to_string);
    }

    /// Holds collection reads until [`Self::resume_reads`].
    pub fn pause_reads(&self) {
        self.reads_paused.send_replace(true);
    }

    pub fn resume_reads(&self) {
        self.reads_paused.send_replace(false);
    }

    /// Successfully committed batches.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Collection reads started, including failed ones.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn apply_operation(
        documents: &mut BTreeMap<DocumentPath, Value>,
        operation: BatchOperation,
    ) -> Result<(), AppError> {
        match operation {
            BatchOperation::Create { path, data } => {
                documents.insert(path, data);
            }
            BatchOperation::Update { path, fields } => {
                let document = documents
                    .get_mut(&path)
                    .ok_or_else(|| AppError::StoreCommit(format!("No document to update: {path}")))?;
                let object = document.as_object_mut().ok_or_else(|| {
                    AppError::StoreCommit(format!("Document is not an object: {path}"))
                })?;
                apply_fields(object, fields)?;
            }
            BatchOperation::Delete { path } => {
                documents.remove(&path);
            }
        }
        Ok(())
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_fields(
    object: &mut Map<String, Value>,
    fields: BTreeMap<String, FieldValue>,
) -> Result<(), AppError> {
    for (field, value) in fields {
        validate_field_name(&field)?;
        match value {
            FieldValue::Set(value) => {
                object.insert(field, value);
            }
            FieldValue::Increment(amount) => {
                let current = object.get(&field).and_then(Value::as_i64).unwrap_or(0);
                object.insert(field, Value::from(current + amount));
            }
        }
    }
    Ok(())
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None, Some(_)) => CmpOrdering::Less,
        (Some(_), None) => CmpOrdering::Greater,
        _ => CmpOrdering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        // Lets other in-flight actions run between building and committing a batch.
        tokio::task::yield_now().await;

        if let Some(message) = self.commit_failure.lock().await.clone() {
            return Err(AppError::StoreCommit(message));
        }

        let mut documents = self.documents.lock().await;
        let mut staged = documents.clone();
        for operation in batch.into_operations() {
            Self::apply_operation(&mut staged, operation)?;
        }
        *documents = staged;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>, AppError> {
        Ok(self.documents.lock().await.get(path).cloned())
    }

    async fn list(&self, query: &CollectionQuery) -> Result<Vec<Value>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut gate = self.reads_paused.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = gate.wait_for(|paused| !*paused).await;

        if let Some(message) = self.read_failure.lock().await.clone() {
            return Err(AppError::Database(message));
        }

        if let Some((field, _)) = &query.filter {
            validate_field_name(field)?;
        }
        if let Some((field, _)) = &query.order_by {
            validate_field_name(field)?;
        }

        let documents = self.documents.lock().await;
        let mut results: Vec<Value> = documents
            .iter()
            .filter(|(path, _)| path.parent() == query.collection)
            .filter(|(_, data)| match &query.filter {
                Some((field, expected)) => data.get(field) == Some(expected),
                None => true,
            })
            .map(|(_, data)| data.clone())
            .collect();

        if let Some((field, direction)) = &query.order_by {
            results.sort_by(|a, b| {
                let ordering = compare_values(a.get(field), b.get(field));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::CollectionPath;
    use serde_json::json;

    fn post_path(id: &str) -> DocumentPath {
        DocumentPath::post(id).unwrap()
    }

    #[tokio::test]
    async fn test_commit_applies_all_operations() {
        let store = MemoryDocumentStore::new();
        store.put(post_path("p1"), json!({ "voteStatus": 5 })).await;

        let mut batch = store.begin_batch();
        batch
            .create(post_path("p2"), json!({ "voteStatus": 0 }))
            .update(post_path("p1"), [("voteStatus", FieldValue::Increment(-2))]);
        store.commit(batch).await.unwrap();

        assert_eq!(store.document(&post_path("p1")).await.unwrap()["voteStatus"], 3);
        assert!(store.document(&post_path("p2")).await.is_some());
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_update_of_missing_document_rejects_whole_batch() {
        let store = MemoryDocumentStore::new();

        let mut batch = store.begin_batch();
        batch
            .create(post_path("p2"), json!({}))
            .update(post_path("missing"), [("voteStatus", FieldValue::Increment(1))]);
        let result = store.commit(batch).await;

        assert!(matches!(result, Err(AppError::StoreCommit(_))));
        assert!(store.is_empty().await);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_increment_missing_field_starts_at_zero() {
        let store = MemoryDocumentStore::new();
        let path = DocumentPath::community("rust").unwrap();
        store.put(path.clone(), json!({ "id": "rust" })).await;

        let mut batch = store.begin_batch();
        batch.update(path.clone(), [("numberOfMembers", FieldValue::Increment(1))]);
        store.commit(batch).await.unwrap();

        assert_eq!(store.document(&path).await.unwrap()["numberOfMembers"], 1);
    }

    #[tokio::test]
    async fn test_injected_commit_failure() {
        let store = MemoryDocumentStore::new();
        store.set_commit_failure(Some("permission denied")).await;

        let mut batch = store.begin_batch();
        batch.create(post_path("p1"), json!({}));
        let err = store.commit(batch).await.unwrap_err();

        assert_eq!(err, AppError::StoreCommit("permission denied".to_string()));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let store = MemoryDocumentStore::new();
        store
            .put(post_path("a"), json!({ "communityId": "rust", "createdAt": 1 }))
            .await;
        store
            .put(post_path("b"), json!({ "communityId": "go", "createdAt": 2 }))
            .await;
        store
            .put(post_path("c"), json!({ "communityId": "rust", "createdAt": 3 }))
            .await;
        store
            .put(
                DocumentPath::parse("users/u1/postVotes/v1").unwrap(),
                json!({ "communityId": "rust" }),
            )
            .await;

        let query = CollectionQuery::all(CollectionPath::root("posts").unwrap())
            .where_eq("communityId", "rust")
            .order_by("createdAt", SortDirection::Descending);
        let results = store.list(&query).await.unwrap();

        let created: Vec<i64> = results
            .iter()
            .map(|doc| doc["createdAt"].as_i64().unwrap())
            .collect();
        assert_eq!(created, vec![3, 1]);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_and_pause() {
        let store = std::sync::Arc::new(MemoryDocumentStore::new());
        let query = CollectionQuery::all(CollectionPath::root("posts").unwrap());

        store.set_read_failure(Some("offline")).await;
        assert!(matches!(
            store.list(&query).await,
            Err(AppError::Database(_))
        ));
        store.set_read_failure(None).await;

        store.pause_reads();
        let pending = {
            let store = std::sync::Arc::clone(&store);
            let query = query.clone();
            tokio::spawn(async move { store.list(&query).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        store.resume_reads();
        assert!(pending.await.unwrap().unwrap().is_empty());
    }
}
