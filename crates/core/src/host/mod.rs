//! Host application boundary.
//!
//! The content-management host owns records, users, and local files. This
//! module names the slice of it the integrations touch: record and user
//! shapes, plus the collaborator traits the host implements.

mod fs;
mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

pub use fs::DirectoryFiles;
pub use memory::{InMemoryFiles, InMemoryUserStore};

/// Errors raised by host collaborators.
#[derive(Debug, Error)]
pub enum HostError {
    /// Local file does not exist.
    #[error("local file not found: {0}")]
    FileNotFound(String),

    /// Local path escapes the storage root or is otherwise unusable.
    #[error("invalid local path: {0}")]
    InvalidPath(String),

    /// Local I/O failure.
    #[error("local io error: {0}")]
    Io(#[from] std::io::Error),

    /// A user with the same email already exists.
    #[error("user already exists: {0}")]
    UserExists(String),

    /// User record does not exist.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Any other user store failure.
    #[error("user store error: {0}")]
    UserStore(String),
}

/// Readable handle to a local file.
pub type LocalReader = Box<dyn AsyncRead + Send + Unpin>;

/// The host's local file storage, the default path for record files.
#[async_trait]
pub trait LocalFiles: Send + Sync {
    /// Opens the file at `path`, relative to the host's storage root.
    async fn open(&self, path: &str) -> Result<LocalReader, HostError>;
}

/// The host's local user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, HostError>;

    /// Creates a new user. Fails with `UserExists` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord, HostError>;

    /// Persists changes to an existing user.
    async fn save(&self, user: &UserRecord) -> Result<(), HostError>;
}

/// A file-typed field on a record and the file names it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileField {
    /// Field name.
    pub name: String,
    /// Stored file names; empty entries are ignored.
    pub files: Vec<String>,
}

/// A host record, reduced to what file mirroring needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Owning collection name.
    pub collection: String,
    /// Record identifier.
    pub id: String,
    /// File-typed fields.
    pub file_fields: Vec<FileField>,
}

impl Record {
    /// Creates a record without file fields.
    #[must_use]
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            file_fields: Vec::new(),
        }
    }

    /// Adds a file-typed field.
    #[must_use]
    pub fn with_files<I, S>(mut self, field: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_fields.push(FileField {
            name: field.into(),
            files: files.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Directory of this record's files in local storage.
    #[must_use]
    pub fn base_files_path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }

    /// Local path of one of this record's files.
    #[must_use]
    pub fn local_path(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.base_files_path())
    }

    /// Every non-empty file name across all file fields.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.file_fields
            .iter()
            .flat_map(|field| field.files.iter())
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// A local user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Record identifier.
    pub id: String,
    /// Unique email.
    pub email: String,
    /// Whether the email is visible to other users.
    pub email_visibility: bool,
    /// Whether the email is verified.
    pub verified: bool,
    /// Opaque string fields.
    pub fields: BTreeMap<String, String>,
}

impl UserRecord {
    /// Sets an opaque field.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Reads an opaque field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// Input for creating a local user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique email.
    pub email: String,
    /// Whether the email is visible to other users.
    pub email_visibility: bool,
    /// Whether the email is verified.
    pub verified: bool,
}
