//! Object storage adapter built on Apache OpenDAL.
//!
//! Record files are mirrored to a remote bucket under their
//! [`StorageKey`](skyhook_shared::StorageKey). Every network call carries its
//! own deadline and surfaces failures to the caller; nothing is retried here.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ObjectStorage                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ put / put_stream   (write deadline / stream deadline)           │
//! │ get / exists       (read deadline)                              │
//! │ delete / copy      (write deadline)                             │
//! │ public_url         (pure, no network)                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                 Apache OpenDAL Operator (S3)                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod mime;
mod service;


pub use error::StorageError;
pub use mime::{DEFAULT_CONTENT_TYPE, content_type_for};
pub use service::{ObjectStorage, StorageTimeouts};
