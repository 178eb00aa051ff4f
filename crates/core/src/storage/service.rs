//! Object storage adapter implementation using Apache OpenDAL.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use skyhook_shared::StorageSettings;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use super::error::StorageError;
use super::mime::content_type_for;

/// Per-call deadlines for remote storage operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageTimeouts {
    /// Reads and metadata calls.
    pub read: Duration,
    /// Single-object writes, deletes, and copies.
    pub write: Duration,
    /// Streamed uploads.
    pub stream: Duration,
}

impl StorageTimeouts {
    /// Default read deadline: 10 seconds.
    pub const DEFAULT_READ: Duration = Duration::from_secs(10);
    /// Default write deadline: 30 seconds.
    pub const DEFAULT_WRITE: Duration = Duration::from_secs(30);
    /// Default streamed upload deadline: 5 minutes.
    pub const DEFAULT_STREAM: Duration = Duration::from_secs(300);
}

impl Default for StorageTimeouts {
    fn default() -> Self {
        Self {
            read: Self::DEFAULT_READ,
            write: Self::DEFAULT_WRITE,
            stream: Self::DEFAULT_STREAM,
        }
    }
}

/// Uniform put/get/delete/exists/copy/public-URL operations over a remote
/// key space.
///
/// Cloning is cheap; the underlying operator is a shared, thread-safe client.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    operator: Operator,
    bucket: String,
    public_base_url: String,
    timeouts: StorageTimeouts,
}

impl ObjectStorage {
    /// Create an S3-backed adapter from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the S3 operator cannot be initialized.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let operator = Self::create_operator(settings)?;
        Ok(Self::with_operator(
            operator,
            settings.bucket.clone(),
            settings.public_base_url(),
        ))
    }

    /// Create an adapter over an existing operator.
    #[must_use]
    pub fn with_operator(
        operator: Operator,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            operator,
            bucket: bucket.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            timeouts: StorageTimeouts::default(),
        }
    }

    /// Override the per-call deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: StorageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Create OpenDAL S3 operator from settings.
    fn create_operator(settings: &StorageSettings) -> Result<Operator, StorageError> {
        let endpoint = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", settings.region));

        let mut builder = services::S3::default()
            .bucket(&settings.bucket)
            .region(&settings.region)
            .endpoint(&endpoint);

        // Incomplete pairs defer to the environment/profile credential chain.
        if settings.credentials.is_complete() {
            builder = builder
                .access_key_id(&settings.credentials.access_key_id)
                .secret_access_key(&settings.credentials.secret_access_key);
        }

        Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish()
            .pipe(Ok)
    }

    /// Write `data` at `key` in a single remote call.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or remote failure.
    pub async fn put(&self, data: impl Into<Bytes>, key: &str) -> Result<(), StorageError> {
        let data = data.into();
        let size = data.len();
        deadline("put", key, self.timeouts.write, self.write(key, data)).await?;
        debug!(key = %key, size, "Object stored");
        Ok(())
    }

    /// Drain `reader` and write its content at `key` in a single remote call.
    ///
    /// Returns the number of bytes stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, on timeout, or on
    /// remote failure.
    pub async fn put_stream<R>(&self, mut reader: R, key: &str) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let upload = async {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).await?;
            let size = buf.len() as u64;
            self.write(key, Bytes::from(buf)).await?;
            Ok::<_, StorageError>(size)
        };

        let size = deadline("put_stream", key, self.timeouts.stream, upload).await?;
        debug!(key = %key, size, "Object streamed");
        Ok(size)
    }

    /// Read the object at `key`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the object does not exist, or an error on
    /// timeout or remote failure.
    pub async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let read = async {
            match self.operator.read(key).await {
                Ok(buffer) => Ok(buffer.to_bytes()),
                Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(key)),
                Err(e) => Err(StorageError::from(e)),
            }
        };
        deadline("get", key, self.timeouts.read, read).await
    }

    /// Delete the object at `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or remote failure.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let delete = async {
            match self.operator.delete(key).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::from(e)),
            }
        };
        deadline("delete", key, self.timeouts.write, delete).await?;
        debug!(key = %key, "Object deleted");
        Ok(())
    }

    /// Check whether an object exists at `key`.
    ///
    /// A "not found" answer is `Ok(false)`; any other failure is an error,
    /// so callers can tell "absent" from "could not check".
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or remote failure.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let stat = async {
            match self.operator.stat(key).await {
                Ok(_) => Ok(true),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(StorageError::from(e)),
            }
        };
        deadline("exists", key, self.timeouts.read, stat).await
    }

    /// Server-side copy from `source_key` to `dest_key`.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or remote failure.
    pub async fn copy(&self, source_key: &str, dest_key: &str) -> Result<(), StorageError> {
        let copy = async {
            self.operator
                .copy(source_key, dest_key)
                .await
                .map_err(StorageError::from)
        };
        deadline("copy", source_key, self.timeouts.write, copy).await?;
        debug!(from = %source_key, to = %dest_key, "Object copied");
        Ok(())
    }

    /// Public URL of `key`. Pure string composition, no remote call.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get the per-call deadlines.
    #[must_use]
    pub fn timeouts(&self) -> StorageTimeouts {
        self.timeouts
    }

    async fn write(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        let content_type = content_type_for(key);

        if self.operator.info().full_capability().write_with_content_type {
            self.operator
                .write_with(key, data)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(key, data).await?;
        }

        Ok(())
    }
}

async fn deadline<T, F>(
    operation: &'static str,
    key: &str,
    after: Duration,
    fut: F,
) -> Result<T, StorageError>
where
    F: Future<Output = Result<T, StorageError>>,
{
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| StorageError::Timeout {
            operation,
            key: key.to_string(),
            after,
        })?
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}
