//! Event payloads passed to hook handlers.

use std::fmt;

use bytes::Bytes;

use crate::host::{Record, UserRecord};
use crate::mail::Message;

/// A record lifecycle event.
#[derive(Debug, Clone)]
pub struct RecordEvent {
    /// Affected record.
    pub record: Record,
}

impl RecordEvent {
    /// Creates the event.
    #[must_use]
    pub const fn new(record: Record) -> Self {
        Self { record }
    }
}

/// Content served in place of the host's local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedFile {
    /// File content.
    pub body: Bytes,
    /// MIME type.
    pub content_type: &'static str,
}

/// A record file is about to be served.
#[derive(Debug, Clone)]
pub struct FileDownloadEvent {
    /// Owning record.
    pub record: Record,
    /// Name of the requested file.
    pub served_name: String,
    /// Set by a handler that served the file.
    pub served: Option<ServedFile>,
}

impl FileDownloadEvent {
    /// Creates the event.
    #[must_use]
    pub fn new(record: Record, served_name: impl Into<String>) -> Self {
        Self {
            record,
            served_name: served_name.into(),
            served: None,
        }
    }
}

/// An email is about to be sent.
#[derive(Debug, Clone)]
pub struct MailEvent {
    /// Message to send.
    pub message: Message,
}

impl MailEvent {
    /// Creates the event.
    #[must_use]
    pub const fn new(message: Message) -> Self {
        Self { message }
    }
}

/// A password authentication was requested.
#[derive(Clone)]
pub struct AuthEvent {
    /// Auth collection name.
    pub collection: String,
    /// Submitted identity (email).
    pub identity: String,
    /// Submitted password.
    pub password: String,
    /// Authenticated user, set by a handler that handled the request.
    pub record: Option<UserRecord>,
}

impl AuthEvent {
    /// Creates the event.
    #[must_use]
    pub fn new(
        collection: impl Into<String>,
        identity: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            identity: identity.into(),
            password: password.into(),
            record: None,
        }
    }
}

impl fmt::Debug for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthEvent")
            .field("collection", &self.collection)
            .field("identity", &self.identity)
            .field("password", &"***")
            .field("record", &self.record)
            .finish()
    }
}
