use std::{collections::HashMap, path::PathBuf, sync::Arc};

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;

/// A schema-less employee record: whatever fields the client posted.
pub type Record = serde_json::Map<String, Value>;

/// JSON file-backed employee collection.
///
/// Holds the authoritative in-memory map and rewrites the whole document on
/// every mutation, before the caller sees a result. The write lock is held
/// across the mutate-then-persist sequence, so concurrent mutations cannot
/// interleave their read-modify-write cycles.
#[derive(Clone)]
pub struct EmployeeStore {
    inner: Arc<RwLock<HashMap<String, Record>>>,
    file_path: PathBuf,
}

impl EmployeeStore {
    /// Load the persisted document fully into memory.
    ///
    /// A missing or malformed document is a startup precondition failure:
    /// the process must not serve without its collection.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        let bytes = fs::read(&file_path).await.map_err(|e| {
            ServiceError::Storage(format!("cannot read {}: {e}", file_path.display()))
        })?;
        let map: HashMap<String, Record> = serde_json::from_slice(&bytes).map_err(|e| {
            ServiceError::Storage(format!("malformed document {}: {e}", file_path.display()))
        })?;
        debug!(path = %file_path.display(), records = map.len(), "employee store loaded");
        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    /// Serialize the whole map, pretty-printed with 4-space indentation, to a
    /// sibling temp file, then rename it over the document. A crash mid-write
    /// leaves the previous document intact.
    async fn save(&self, map: &HashMap<String, Record>) -> Result<(), ServiceError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = Serializer::with_formatter(&mut buf, formatter);
        map.serialize(&mut ser)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, &buf)
            .await
            .map_err(|e| ServiceError::Storage(format!("cannot write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::Storage(format!("cannot replace {}: {e}", self.file_path.display())))?;
        Ok(())
    }

    /// Snapshot of the full collection.
    pub async fn list(&self) -> HashMap<String, Record> {
        let map = self.inner.read().await;
        map.clone()
    }

    /// Get a record by id.
    pub async fn get(&self, id: &str) -> Option<Record> {
        let map = self.inner.read().await;
        map.get(id).cloned()
    }

    /// Get one field of a record, distinguishing a missing id from a record
    /// that simply lacks the field.
    pub async fn get_field(&self, id: &str, field: &str) -> Result<Value, ServiceError> {
        let map = self.inner.read().await;
        let record = map.get(id).ok_or_else(ServiceError::id_not_found)?;
        record
            .get(field)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("{field} is not set for this ID")))
    }

    /// Insert all given entries and persist once.
    ///
    /// Every supplied id must be absent; if any is already present the call
    /// fails with `AlreadyExists` and applies nothing.
    pub async fn create(&self, entries: HashMap<String, Record>) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        for id in entries.keys() {
            if map.contains_key(id) {
                return Err(ServiceError::id_exists());
            }
        }
        map.extend(entries);
        self.save(&map).await
    }

    /// Merge the given fields into an existing record and persist; fields not
    /// named in `fields` are left untouched.
    pub async fn update(&self, id: &str, fields: Record) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        let record = map.get_mut(id).ok_or_else(ServiceError::id_not_found)?;
        for (key, value) in fields {
            record.insert(key, value);
        }
        self.save(&map).await
    }

    /// Remove an existing record and persist.
    pub async fn remove(&self, id: &str) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        if map.remove(id).is_none() {
            return Err(ServiceError::id_not_found());
        }
        self.save(&map).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: Value) -> Record {
        fields.as_object().expect("object literal").clone()
    }

    async fn seeded_store(seed: Value) -> (Arc<EmployeeStore>, PathBuf) {
        let path = std::env::temp_dir().join(format!("emp_store_{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, serde_json::to_vec(&seed).expect("seed json"))
            .await
            .expect("write seed");
        let store = EmployeeStore::open(&path).await.expect("open store");
        (store, path)
    }

    #[tokio::test]
    async fn open_fails_on_missing_document() {
        let path = std::env::temp_dir().join(format!("emp_missing_{}.json", uuid::Uuid::new_v4()));
        let err = EmployeeStore::open(&path).await.err().expect("must fail");
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[tokio::test]
    async fn open_fails_on_malformed_document() {
        let path = std::env::temp_dir().join(format!("emp_bad_{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, b"{not json").await.expect("write");
        let err = EmployeeStore::open(&path).await.err().expect("must fail");
        assert!(matches!(err, ServiceError::Storage(_)));
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn load_reflects_seed() {
        let (store, path) =
            seeded_store(json!({"1": {"firstName": "Viney", "lastName": "Khaneja"}})).await;
        let all = store.list().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all["1"]["firstName"], json!("Viney"));
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn create_then_get_and_persist() {
        let (store, path) = seeded_store(json!({})).await;
        let mut entries = HashMap::new();
        entries.insert("2".to_string(), record(json!({"firstName": "Asha"})));
        store.create(entries).await.expect("create");

        assert_eq!(store.get("2").await.expect("present")["firstName"], json!("Asha"));

        // reopen from disk: the mutation was persisted before create returned
        let reloaded = EmployeeStore::open(&path).await.expect("reopen");
        assert_eq!(reloaded.get("2").await.expect("present")["firstName"], json!("Asha"));
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn create_existing_id_applies_nothing() {
        let (store, path) = seeded_store(json!({"1": {"firstName": "Viney"}})).await;
        let mut entries = HashMap::new();
        entries.insert("9".to_string(), record(json!({"firstName": "New"})));
        entries.insert("1".to_string(), record(json!({"firstName": "Clobber"})));
        let err = store.create(entries).await.err().expect("must fail");
        assert!(matches!(err, ServiceError::AlreadyExists(_)));

        // neither the colliding id nor the fresh one was applied
        assert_eq!(store.get("1").await.expect("kept")["firstName"], json!("Viney"));
        assert!(store.get("9").await.is_none());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn multi_id_create_applies_all() {
        let (store, path) = seeded_store(json!({})).await;
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), record(json!({"firstName": "A"})));
        entries.insert("b".to_string(), record(json!({"firstName": "B"})));
        store.create(entries).await.expect("create");
        assert!(store.get("a").await.is_some());
        assert!(store.get("b").await.is_some());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let (store, path) =
            seeded_store(json!({"1": {"firstName": "Viney", "lastName": "Khaneja"}})).await;
        store
            .update("1", record(json!({"lastName": "K"})))
            .await
            .expect("update");
        let rec = store.get("1").await.expect("present");
        assert_eq!(rec["firstName"], json!("Viney"));
        assert_eq!(rec["lastName"], json!("K"));
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn update_missing_id_creates_nothing() {
        let (store, path) = seeded_store(json!({})).await;
        let err = store
            .update("ghost", record(json!({"lastName": "X"})))
            .await
            .err()
            .expect("must fail");
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(store.get("ghost").await.is_none());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn remove_then_gone_from_disk() {
        let (store, path) = seeded_store(json!({"1": {"firstName": "Viney"}})).await;
        store.remove("1").await.expect("remove");
        assert!(store.get("1").await.is_none());

        let reloaded = EmployeeStore::open(&path).await.expect("reopen");
        assert!(reloaded.get("1").await.is_none());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn remove_missing_id_errors() {
        let (store, path) = seeded_store(json!({})).await;
        let err = store.remove("ghost").await.err().expect("must fail");
        assert!(matches!(err, ServiceError::NotFound(_)));
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn get_field_distinguishes_missing_id_and_field() {
        let (store, path) = seeded_store(json!({"1": {"lastName": "Khaneja"}})).await;
        let err = store.get_field("2", "firstName").await.err().expect("missing id");
        assert_eq!(err.description(), "ID is not valid, Please enter correct ID");
        let err = store.get_field("1", "firstName").await.err().expect("missing field");
        assert_eq!(err.description(), "firstName is not set for this ID");
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn persisted_document_is_four_space_indented() {
        let (store, path) = seeded_store(json!({})).await;
        let mut entries = HashMap::new();
        entries.insert("1".to_string(), record(json!({"firstName": "Viney"})));
        store.create(entries).await.expect("create");

        let text = fs::read_to_string(&path).await.expect("read back");
        assert!(text.contains("\n    \"1\""), "expected 4-space indent, got: {text}");
        let _ = fs::remove_file(&path).await;
    }
}
