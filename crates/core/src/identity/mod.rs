//! Identity provider bridge.
//!
//! [`IdentityBridge`] authenticates username/password pairs against a remote
//! [`IdentityProvider`] and mirrors successful sign-ins onto the host's
//! local user records. [`CognitoIdentityProvider`] is the Amazon Cognito
//! implementation. The bridge keeps no session state between calls.

mod bridge;
mod cognito;
mod error;
mod provider;
mod secret_hash;


pub use bridge::{
    ACCESS_TOKEN_FIELD, ID_TOKEN_FIELD, IdentityBridge, IdentityTimeouts, REFRESH_TOKEN_FIELD,
};
pub use cognito::CognitoIdentityProvider;
pub use error::IdentityError;
pub use provider::{AuthResult, IdentityProvider, IdentityUser, UserInfo};
pub use secret_hash::secret_hash;

#[cfg(test)]
pub use provider::MockIdentityProvider;
