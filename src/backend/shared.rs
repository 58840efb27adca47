//! The generic record store shared by the embedded KV backend (§4.5) and the
//! in-memory backend (§4.6): both replace the relational backend's RLS with
//! in-application tenant/user filtering over a common envelope format, so
//! only the byte-level storage (`ByteStore`) differs between the two.

use crate::error::{RepositoryError, RepositoryResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// The minimal byte-oriented storage contract both backends implement:
/// `sled::Tree` for the embedded backend, `InMemoryByteStore` for tests.
pub trait ByteStore: Send + Sync {
    fn get(&self, key: &[u8]) -> RepositoryResult<Option<Vec<u8>>>;
    fn insert(&self, key: &[u8], value: Vec<u8>) -> RepositoryResult<()>;
    fn remove(&self, key: &[u8]) -> RepositoryResult<Option<Vec<u8>>>;
    fn iter_values(&self) -> RepositoryResult<Vec<Vec<u8>>>;
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    tenant_id: Option<Uuid>,
    owner_user_id: Option<Uuid>,
    value: T,
}

fn envelope_matches<T>(envelope: &Envelope<T>, tenant_id: Option<Uuid>, owner_user_id: Option<Uuid>) -> bool {
    if let Some(t) = tenant_id
        && envelope.tenant_id != Some(t)
    {
        return false;
    }
    if let Some(u) = owner_user_id
        && envelope.owner_user_id != Some(u)
    {
        return false;
    }
    true
}

/// One table's worth of records, keyed by entity id. `tenant_id` is `None`
/// for tables that are not tenant-scoped (e.g. `Tenant` itself); passing
/// `None` as a filter at read time means "no restriction on this axis" —
/// the shape the service/bypass registry uses.
pub struct RecordStore<S: ByteStore> {
    store: S,
}

impl<S: ByteStore> RecordStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn put<T: Serialize>(
        &self,
        id: Uuid,
        tenant_id: Option<Uuid>,
        owner_user_id: Option<Uuid>,
        value: &T,
    ) -> RepositoryResult<()> {
        let envelope = Envelope {
            tenant_id,
            owner_user_id,
            value,
        };
        let bytes = serde_json::to_vec(&envelope)?;
        self.store.insert(id.as_bytes(), bytes)
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        id: Uuid,
        tenant_id: Option<Uuid>,
        owner_user_id: Option<Uuid>,
    ) -> RepositoryResult<T> {
        let bytes = self.store.get(id.as_bytes())?.ok_or(RepositoryError::NotFound)?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        if !envelope_matches(&envelope, tenant_id, owner_user_id) {
            return Err(RepositoryError::NotFound);
        }
        Ok(envelope.value)
    }

    pub fn list<T: DeserializeOwned>(
        &self,
        tenant_id: Option<Uuid>,
        owner_user_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<T>> {
        let mut out = Vec::new();
        for bytes in self.store.iter_values()? {
            let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
            if envelope_matches(&envelope, tenant_id, owner_user_id) {
                out.push(envelope.value);
            }
        }
        Ok(out)
    }

    /// Like `list`, but keeps only records a predicate accepts — the shape
    /// relationship queries (`get_areas`, `search_by_name`, ...) build on.
    pub fn list_filtered<T: DeserializeOwned>(
        &self,
        tenant_id: Option<Uuid>,
        owner_user_id: Option<Uuid>,
        predicate: impl Fn(&T) -> bool,
    ) -> RepositoryResult<Vec<T>> {
        Ok(self
            .list(tenant_id, owner_user_id)?
            .into_iter()
            .filter(predicate)
            .collect())
    }

    pub fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.store.remove(id.as_bytes())?;
        Ok(())
    }

    pub fn count(&self, tenant_id: Option<Uuid>, owner_user_id: Option<Uuid>) -> RepositoryResult<u64> {
        let mut count = 0u64;
        for bytes in self.store.iter_values()? {
            let envelope: Envelope<serde_json::Value> = serde_json::from_slice(&bytes)?;
            if envelope_matches(&envelope, tenant_id, owner_user_id) {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// The in-memory `ByteStore` (§4.6): a plain `HashMap` behind an `RwLock`,
/// sharing `RecordStore`'s record format with the embedded backend so tests
/// exercise the exact same filtering logic a real deployment would.
#[derive(Default)]
pub struct InMemoryByteStore {
    data: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryByteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<T>(_: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Internal("in-memory store lock poisoned".to_string())
}

impl ByteStore for InMemoryByteStore {
    fn get(&self, key: &[u8]) -> RepositoryResult<Option<Vec<u8>>> {
        Ok(self.data.read().map_err(lock_err)?.get(key).cloned())
    }

    fn insert(&self, key: &[u8], value: Vec<u8>) -> RepositoryResult<()> {
        self.data.write().map_err(lock_err)?.insert(key.to_vec(), value);
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> RepositoryResult<Option<Vec<u8>>> {
        Ok(self.data.write().map_err(lock_err)?.remove(key))
    }

    fn iter_values(&self) -> RepositoryResult<Vec<Vec<u8>>> {
        Ok(self.data.read().map_err(lock_err)?.values().cloned().collect())
    }
}

impl ByteStore for sled::Tree {
    fn get(&self, key: &[u8]) -> RepositoryResult<Option<Vec<u8>>> {
        Ok(sled::Tree::get(self, key)?.map(|v| v.to_vec()))
    }

    fn insert(&self, key: &[u8], value: Vec<u8>) -> RepositoryResult<()> {
        sled::Tree::insert(self, key, value)?;
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> RepositoryResult<Option<Vec<u8>>> {
        Ok(sled::Tree::remove(self, key)?.map(|v| v.to_vec()))
    }

    fn iter_values(&self) -> RepositoryResult<Vec<Vec<u8>>> {
        let mut out = Vec::new();
        for item in sled::Tree::iter(self) {
            let (_, v) = item?;
            out.push(v.to_vec());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    struct Widget {
        name: String,
    }

    #[test]
    fn put_get_round_trips_through_the_envelope() {
        let store = RecordStore::new(InMemoryByteStore::new());
        let id = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        store
            .put(id, Some(tenant), Some(user), &Widget { name: "a".to_string() })
            .unwrap();
        let got: Widget = store.get(id, Some(tenant), Some(user)).unwrap();
        assert_eq!(got.name, "a");
    }

    #[test]
    fn get_across_tenants_is_not_found() {
        let store = RecordStore::new(InMemoryByteStore::new());
        let id = Uuid::new_v4();
        store
            .put(id, Some(Uuid::new_v4()), Some(Uuid::new_v4()), &Widget { name: "a".to_string() })
            .unwrap();
        let result: RepositoryResult<Widget> = store.get(id, Some(Uuid::new_v4()), None);
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn list_filters_by_owner() {
        let store = RecordStore::new(InMemoryByteStore::new());
        let tenant = Uuid::new_v4();
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        store
            .put(Uuid::new_v4(), Some(tenant), Some(mine), &Widget { name: "mine".to_string() })
            .unwrap();
        store
            .put(Uuid::new_v4(), Some(tenant), Some(theirs), &Widget { name: "theirs".to_string() })
            .unwrap();
        let visible: Vec<Widget> = store.list(Some(tenant), Some(mine)).unwrap();
        assert_eq!(visible, vec![Widget { name: "mine".to_string() }]);
    }
}
