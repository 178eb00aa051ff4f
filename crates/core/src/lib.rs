//! Core integration logic for Skyhook.
//!
//! Optional cloud capabilities attach to a content-management host's
//! lifecycle hooks. Each capability is configured, constructed, and bound
//! independently, and every failure degrades to the host's local default.
//!
//! # Modules
//!
//! - `host` - Records, users, and the collaborator traits the host implements
//! - `hooks` - Lifecycle hook table with tri-state handler outcomes
//! - `storage` - Object storage adapter (OpenDAL, S3)
//! - `mail` - Transactional mail adapter (SES v2)
//! - `identity` - Identity provider bridge (Cognito)
//! - `orchestrator` - Capability states, adapter construction, hook binding

mod aws;

pub mod hooks;
pub mod host;
pub mod identity;
pub mod mail;
pub mod orchestrator;
pub mod storage;
