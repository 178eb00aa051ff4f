//! In-process host collaborators.

use std::collections::BTreeMap;
use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::{HostError, LocalFiles, LocalReader, NewUser, UserRecord, UserStore};

/// User store backed by a concurrent map keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<String, UserRecord>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, HostError> {
        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, HostError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(HostError::UserExists(user.email)),
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    id: Uuid::new_v4().simple().to_string(),
                    email: user.email,
                    email_visibility: user.email_visibility,
                    verified: user.verified,
                    fields: BTreeMap::new(),
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn save(&self, user: &UserRecord) -> Result<(), HostError> {
        match self.users.get_mut(&user.email) {
            Some(mut existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(HostError::UserNotFound(user.email.clone())),
        }
    }
}

/// Local file storage held in memory, keyed by relative path.
#[derive(Debug, Default)]
pub struct InMemoryFiles {
    files: DashMap<String, Bytes>,
}

impl InMemoryFiles {
    /// Creates an empty file set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `content` at `path`.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<Bytes>) {
        self.files.insert(path.into(), content.into());
    }
}

#[async_trait]
impl LocalFiles for InMemoryFiles {
    async fn open(&self, path: &str) -> Result<LocalReader, HostError> {
        let content = self
            .files
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| HostError::FileNotFound(path.to_string()))?;
        Ok(Box::new(Cursor::new(content)))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            email_visibility: true,
            verified: true,
        }
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let store = InMemoryUserStore::new();
        let created = store.create(new_user("u@example.com")).await.expect("create");

        let found = store
            .find_by_email("u@example.com")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found, created);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = InMemoryUserStore::new();
        store.create(new_user("u@example.com")).await.expect("create");

        let err = store.create(new_user("u@example.com")).await.unwrap_err();
        assert!(matches!(err, HostError::UserExists(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_save_updates_fields() {
        let store = InMemoryUserStore::new();
        let mut user = store.create(new_user("u@example.com")).await.expect("create");
        user.set("nickname", "u");
        store.save(&user).await.expect("save");

        let found = store
            .find_by_email("u@example.com")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.get("nickname"), Some("u"));
    }

    #[tokio::test]
    async fn test_in_memory_files_open() {
        let files = InMemoryFiles::new();
        files.insert("pages/r1/a.txt", "hello");

        let mut reader = files.open("pages/r1/a.txt").await.expect("open");
        let mut content = String::new();
        reader.read_to_string(&mut content).await.expect("read");
        assert_eq!(content, "hello");

        assert!(matches!(
            files.open("pages/r1/missing.txt").await,
            Err(HostError::FileNotFound(_))
        ));
    }
}
