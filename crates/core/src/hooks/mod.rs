//! Host lifecycle hook table.
//!
//! Each [`HookKind`] owns an ordered list of handlers. Triggering a hook
//! runs its handlers in registration order:
//!
//! 1. [`HookOutcome::PassThrough`] moves on to the next handler
//! 2. [`HookOutcome::Handled`] stops and tells the host to skip its default
//! 3. [`HookOutcome::Fatal`] stops and fails the host request
//!
//! When every handler passes, the host runs its own default behavior.
//!
//! ```rust,ignore
//! let mut registry = HookRegistry::new();
//! registry.mail_send.bind(DeliverMail::new(transport));
//!
//! let mut event = MailEvent::new(message);
//! if registry.mail_send.trigger(&mut event).await.is_pass_through() {
//!     local_mailer.send(&event.message).await?;
//! }
//! ```

mod events;


use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub use events::{AuthEvent, FileDownloadEvent, MailEvent, RecordEvent, ServedFile};

/// Lifecycle points the integrations attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// A record was created.
    RecordCreated,
    /// A record was deleted.
    RecordDeleted,
    /// A record file is about to be served.
    FileDownloadRequested,
    /// An email is about to be sent.
    MailSendRequested,
    /// A password authentication was requested.
    AuthRequested,
}

impl HookKind {
    /// Every hook kind.
    pub const ALL: [Self; 5] = [
        Self::RecordCreated,
        Self::RecordDeleted,
        Self::FileDownloadRequested,
        Self::MailSendRequested,
        Self::AuthRequested,
    ];

    /// Stable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RecordCreated => "record_created",
            Self::RecordDeleted => "record_deleted",
            Self::FileDownloadRequested => "file_download_requested",
            Self::MailSendRequested => "mail_send_requested",
            Self::AuthRequested => "auth_requested",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure that must stop the host request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{handler} failed: {reason}")]
pub struct HookError {
    /// Handler that failed.
    pub handler: &'static str,
    /// Cause.
    pub reason: String,
}

impl HookError {
    /// Creates a hook error.
    #[must_use]
    pub fn new(handler: &'static str, reason: impl Into<String>) -> Self {
        Self {
            handler,
            reason: reason.into(),
        }
    }
}

/// Result of one handler, or of a whole hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// The event was fully handled; skip the host default.
    Handled,
    /// Not handled here; continue with the next handler or the host default.
    PassThrough,
    /// Stop and fail the request.
    Fatal(HookError),
}

impl HookOutcome {
    /// Whether the host should run its default behavior.
    #[must_use]
    pub const fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough)
    }

    /// Whether the event was handled.
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Behavior bound to a hook.
#[async_trait]
pub trait HookHandler<E>: Send + Sync {
    /// Handler name used in logs.
    fn name(&self) -> &'static str;

    /// Handles the event, optionally mutating it.
    async fn handle(&self, event: &mut E) -> HookOutcome;
}

/// Ordered handler list for one hook kind.
pub struct Hook<E> {
    kind: HookKind,
    handlers: Vec<Arc<dyn HookHandler<E>>>,
}

impl<E: Send> Hook<E> {
    /// Creates an empty hook.
    #[must_use]
    pub fn new(kind: HookKind) -> Self {
        Self {
            kind,
            handlers: Vec::new(),
        }
    }

    /// Appends a handler; handlers run in the order they are bound.
    pub fn bind(&mut self, handler: impl HookHandler<E> + 'static) {
        debug!(hook = %self.kind, handler = handler.name(), "Handler bound");
        self.handlers.push(Arc::new(handler));
    }

    /// Hook kind.
    #[must_use]
    pub const fn kind(&self) -> HookKind {
        self.kind
    }

    /// Number of bound handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the handlers until one handles the event or fails.
    pub async fn trigger(&self, event: &mut E) -> HookOutcome {
        for handler in &self.handlers {
            match handler.handle(event).await {
                HookOutcome::PassThrough => {}
                outcome => {
                    debug!(hook = %self.kind, handler = handler.name(), ?outcome, "Hook stopped");
                    return outcome;
                }
            }
        }
        HookOutcome::PassThrough
    }
}

impl<E> fmt::Debug for Hook<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("kind", &self.kind)
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}

/// One hook per lifecycle point.
#[derive(Debug)]
pub struct HookRegistry {
    /// Record created.
    pub record_created: Hook<RecordEvent>,
    /// Record deleted.
    pub record_deleted: Hook<RecordEvent>,
    /// File download requested.
    pub file_download: Hook<FileDownloadEvent>,
    /// Mail send requested.
    pub mail_send: Hook<MailEvent>,
    /// Authentication requested.
    pub auth: Hook<AuthEvent>,
}

impl HookRegistry {
    /// Creates a registry with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            record_created: Hook::new(HookKind::RecordCreated),
            record_deleted: Hook::new(HookKind::RecordDeleted),
            file_download: Hook::new(HookKind::FileDownloadRequested),
            mail_send: Hook::new(HookKind::MailSendRequested),
            auth: Hook::new(HookKind::AuthRequested),
        }
    }

    /// Number of handlers bound to `kind`.
    #[must_use]
    pub fn handler_count(&self, kind: HookKind) -> usize {
        match kind {
            HookKind::RecordCreated => self.record_created.len(),
            HookKind::RecordDeleted => self.record_deleted.len(),
            HookKind::FileDownloadRequested => self.file_download.len(),
            HookKind::MailSendRequested => self.mail_send.len(),
            HookKind::AuthRequested => self.auth.len(),
        }
    }

    /// The (kind → handler count) table.
    #[must_use]
    pub fn handler_counts(&self) -> BTreeMap<HookKind, usize> {
        HookKind::ALL
            .into_iter()
            .map(|kind| (kind, self.handler_count(kind)))
            .collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
