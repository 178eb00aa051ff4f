//! Integration orchestrator.
//!
//! Resolves each capability to a [`CapabilityState`] once at startup,
//! constructs adapters through an [`AdapterFactory`], and binds hook
//! handlers for the capabilities that came up. A capability that is
//! disabled, misconfigured, or fails to construct leaves the host on its
//! local default path.

mod bindings;
mod capability;
mod factory;
mod setup;

#[cfg(test)]
mod tests;

pub use bindings::{
    AuthenticateUsers, DeliverMail, MirrorRecordFiles, PurgeRecordFiles, ServeFromStorage,
    USERS_COLLECTION,
};
pub use capability::{CapabilityState, CapabilityStatus, StateLabel};
pub use factory::{AdapterFactory, AwsAdapterFactory};
pub use setup::{HostContext, Integrations, SetupOptions};
