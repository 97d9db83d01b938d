//! Contact storage and persistence.
//!
//! Records are held in a concurrent map for lock-free reads. Mutations are
//! serialized by a write lock and, when a data file is configured, written
//! through to disk as a full JSON snapshot before the call returns. A failed
//! write rolls the in-memory change back.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::contacts::model::{Contact, ContactId};
use crate::contacts::validation::ValidContact;
use crate::observability::metrics;

/// Persistence failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Gagal menyimpan data kontak: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data kontak tidak dapat dibaca: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// On-disk layout. `next_id` is stored so ids are never reused after a
/// restart, even when the highest id was deleted.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    next_id: ContactId,
    contacts: Vec<Contact>,
}

/// Thread-safe contact store with optional JSON file persistence.
pub struct ContactStore {
    inner: DashMap<ContactId, Contact>,
    next_id: AtomicU64,
    write_lock: Mutex<()>,
    persistence_path: Option<PathBuf>,
}

impl ContactStore {
    /// Create an empty, memory-only store.
    pub fn in_memory() -> Self {
        Self {
            inner: DashMap::new(),
            next_id: AtomicU64::new(1),
            write_lock: Mutex::new(()),
            persistence_path: None,
        }
    }

    /// Open a store backed by `path`, loading the existing snapshot if there is one.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let mut store = Self::in_memory();
        store.persistence_path = Some(path.to_path_buf());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let snapshot: Snapshot = serde_json::from_reader(reader)?;

            let max_id = snapshot.contacts.iter().map(|c| c.id).max().unwrap_or(0);
            store
                .next_id
                .store(snapshot.next_id.max(max_id + 1), Ordering::SeqCst);
            for contact in snapshot.contacts {
                store.inner.insert(contact.id, contact);
            }
            tracing::info!(
                path = %path.display(),
                contacts = store.inner.len(),
                "Loaded contacts from data file"
            );
        } else {
            tracing::info!(path = %path.display(), "No data file yet, starting empty");
        }

        metrics::record_store_size(store.inner.len());
        Ok(store)
    }

    /// Insert a validated contact and return its new id.
    pub fn insert(&self, contact: ValidContact) -> Result<ContactId, StorageError> {
        let _guard = self.lock_writes();

        let id = self.next_id.load(Ordering::SeqCst);
        let (nama, telepon, email) = contact.into_parts();
        self.inner.insert(
            id,
            Contact {
                id,
                nama,
                telepon,
                email,
            },
        );
        self.next_id.store(id + 1, Ordering::SeqCst);

        if let Err(e) = self.persist() {
            self.inner.remove(&id);
            self.next_id.store(id, Ordering::SeqCst);
            return Err(e);
        }

        metrics::record_store_size(self.inner.len());
        Ok(id)
    }

    /// Case-insensitive substring search on `nama`, ordered by id.
    ///
    /// A missing or blank term returns every contact.
    pub fn search(&self, term: Option<&str>) -> Vec<Contact> {
        let needle = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let mut found: Vec<Contact> = self
            .inner
            .iter()
            .filter(|r| match &needle {
                Some(n) => r.value().nama.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .map(|r| r.value().clone())
            .collect();
        found.sort_by_key(|c| c.id);
        found
    }

    /// Overwrite the fields of contact `id`. Returns `false` if it does not exist.
    pub fn update(&self, id: ContactId, contact: ValidContact) -> Result<bool, StorageError> {
        let _guard = self.lock_writes();

        let previous = {
            let Some(mut entry) = self.inner.get_mut(&id) else {
                return Ok(false);
            };
            let (nama, telepon, email) = contact.into_parts();
            std::mem::replace(
                entry.value_mut(),
                Contact {
                    id,
                    nama,
                    telepon,
                    email,
                },
            )
        };

        if let Err(e) = self.persist() {
            self.inner.insert(id, previous);
            return Err(e);
        }
        Ok(true)
    }

    /// Remove contact `id`. Returns `false` if it does not exist.
    pub fn delete(&self, id: ContactId) -> Result<bool, StorageError> {
        let _guard = self.lock_writes();

        let Some((_, removed)) = self.inner.remove(&id) else {
            return Ok(false);
        };

        if let Err(e) = self.persist() {
            self.inner.insert(id, removed);
            return Err(e);
        }

        metrics::record_store_size(self.inner.len());
        Ok(true)
    }

    /// Insert `contacts` only if the store is empty. Returns how many were added.
    pub fn seed(
        &self,
        contacts: impl IntoIterator<Item = ValidContact>,
    ) -> Result<usize, StorageError> {
        if !self.is_empty() {
            return Ok(0);
        }
        let mut added = 0;
        for contact in contacts {
            self.insert(contact)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn get(&self, id: ContactId) -> Option<Contact> {
        self.inner.get(&id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write the full snapshot to a temp file, then rename it over the data file.
    /// Callers must hold the write lock.
    fn persist(&self) -> Result<(), StorageError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        let mut contacts: Vec<Contact> = self.inner.iter().map(|r| r.value().clone()).collect();
        contacts.sort_by_key(|c| c.id);
        let snapshot = Snapshot {
            next_id: self.next_id.load(Ordering::SeqCst),
            contacts,
        };

        let tmp_path = temp_path_for(path);
        let result = (|| -> Result<(), StorageError> {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, &snapshot)?;
            writer.flush()?;
            fs::rename(&tmp_path, path)?;
            Ok(())
        })();

        if let Err(e) = &result {
            tracing::error!(path = %path.display(), error = %e, "Failed to persist contacts");
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "contacts.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::model::ContactDraft;
    use crate::contacts::validation::validate;

    fn valid(nama: &str, telepon: &str, email: &str) -> ValidContact {
        validate(&ContactDraft::new(nama, telepon, email)).unwrap()
    }

    #[test]
    fn test_insert_and_search() {
        let store = ContactStore::in_memory();
        let a = store.insert(valid("Andi Wijaya", "0811", "andi@gmail.com")).unwrap();
        let b = store.insert(valid("Budi", "0822", "budi@gmail.com")).unwrap();
        assert_eq!((a, b), (1, 2));

        let found = store.search(Some("andi"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nama, "Andi Wijaya");
        assert_eq!(found[0].telepon, "0811");

        assert_eq!(store.search(Some("WIJAYA"))[0].id, a);
        assert!(store.search(Some("Xyz")).is_empty());
    }

    #[test]
    fn test_blank_search_returns_all_in_id_order() {
        let store = ContactStore::in_memory();
        for name in ["Citra", "Andi", "Budi"] {
            store.insert(valid(name, "08", "x@gmail.com")).unwrap();
        }
        let ids: Vec<_> = store.search(None).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.search(Some("")).len(), 3);
        assert_eq!(store.search(Some("   ")).len(), 3);
    }

    #[test]
    fn test_update_and_delete() {
        let store = ContactStore::in_memory();
        let id = store.insert(valid("Lama", "0811", "lama@gmail.com")).unwrap();

        assert!(store.update(id, valid("Baru", "0899", "baru@gmail.com")).unwrap());
        let updated = store.get(id).unwrap();
        assert_eq!(updated.nama, "Baru");
        assert_eq!(updated.email, "baru@gmail.com");
        assert!(store.search(Some("Lama")).is_empty());

        assert!(!store.update(999, valid("X", "1", "x@gmail.com")).unwrap());

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_not_reused() {
        let store = ContactStore::in_memory();
        let first = store.insert(valid("A", "1", "a@gmail.com")).unwrap();
        store.delete(first).unwrap();
        let second = store.insert(valid("B", "2", "b@gmail.com")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("contacts.json");

        let store = ContactStore::open(&path).unwrap();
        let keep = store.insert(valid("Andi", "0811", "andi@gmail.com")).unwrap();
        let gone = store.insert(valid("Budi", "0822", "budi@gmail.com")).unwrap();
        store.delete(gone).unwrap();
        drop(store);

        let reopened = ContactStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(keep).unwrap().nama, "Andi");

        let next = reopened.insert(valid("Citra", "0833", "citra@gmail.com")).unwrap();
        assert!(next > gone, "id {} must not reuse deleted id {}", next, gone);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let path = data_dir.join("contacts.json");

        let store = ContactStore::open(&path).unwrap();
        let id = store.insert(valid("Andi", "0811", "andi@gmail.com")).unwrap();

        fs::remove_dir_all(&data_dir).unwrap();

        let err = store.insert(valid("Budi", "0822", "budi@gmail.com")).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(store.len(), 1);

        assert!(store.update(id, valid("Ganti", "0899", "g@gmail.com")).is_err());
        assert_eq!(store.get(id).unwrap().nama, "Andi");

        assert!(store.delete(id).is_err());
        assert!(store.get(id).is_some());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(ContactStore::open(&path), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_seed_only_when_empty() {
        let store = ContactStore::in_memory();
        assert_eq!(store.seed(vec![valid("Andi", "0811", "andi@gmail.com")]).unwrap(), 1);
        assert_eq!(store.seed(vec![valid("Budi", "0822", "budi@gmail.com")]).unwrap(), 0);
        assert_eq!(store.len(), 1);
    }
}
