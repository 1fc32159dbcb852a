//! In-memory [`ObjectStore`].
//!
//! Behaves like an S3 bucket (flat keys, delimiter listings, atomic PUTs) so
//! the remote backend can be exercised without a network. Puts can be made
//! to fail for keys containing a pattern, to test commit failures.

use super::remote::{ObjectListing, ObjectStore, StoreError};
use crate::cancel::CancelToken;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    content_type: String,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    failing_puts: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store an object directly, bypassing the backend.
    pub fn insert(&self, key: &str, body: Vec<u8>) {
        self.objects().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: super::content_type(key).to_string(),
            },
        );
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects().contains_key(key)
    }

    pub fn body_of(&self, key: &str) -> Option<Vec<u8>> {
        self.objects().get(key).map(|o| o.body.clone())
    }

    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects().get(key).map(|o| o.content_type.clone())
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    /// Make every later PUT whose key contains `pattern` fail.
    pub fn fail_puts_matching(&self, pattern: &str) {
        self.failing_puts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(pattern.to_string());
    }

    fn put_should_fail(&self, key: &str) -> bool {
        self.failing_puts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|pattern| key.contains(pattern.as_str()))
    }
}

impl ObjectStore for MemoryStore {
    fn list(&self, prefix: &str, cancel: &CancelToken) -> Result<ObjectListing, StoreError> {
        cancel.check().map_err(|_| StoreError::Cancelled)?;
        let mut prefixes = BTreeSet::new();
        let mut objects = Vec::new();
        for key in self.objects().keys() {
            let Some(rest) = key.strip_prefix(prefix) else {
                continue;
            };
            match rest.find('/') {
                Some(idx) => {
                    prefixes.insert(format!("{prefix}{}", &rest[..=idx]));
                }
                None => objects.push(key.clone()),
            }
        }
        Ok(ObjectListing {
            prefixes: prefixes.into_iter().collect(),
            objects,
        })
    }

    fn get(&self, key: &str, cancel: &CancelToken) -> Result<Vec<u8>, StoreError> {
        cancel.check().map_err(|_| StoreError::Cancelled)?;
        self.objects()
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        cancel: &CancelToken,
    ) -> Result<(), StoreError> {
        cancel.check().map_err(|_| StoreError::Cancelled)?;
        if self.put_should_fail(key) {
            return Err(StoreError::Request(
                format!("injected upload failure for {key}").into(),
            ));
        }
        self.objects().insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}
