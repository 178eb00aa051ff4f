//! Identity provider seam and its value types.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use super::error::IdentityError;

/// Tokens returned by a successful password exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthResult {
    /// Access token.
    pub access_token: String,
    /// Refresh token, when the provider issued one.
    pub refresh_token: Option<String>,
    /// Identity token, when the provider issued one.
    pub id_token: Option<String>,
    /// Access token lifetime in seconds.
    pub expires_in: i32,
}

impl fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResult")
            .field("access_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("id_token", &self.id_token.as_ref().map(|_| "***"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Remote profile resolved from an access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    /// Remote username.
    pub username: String,
    /// Profile attributes by name.
    pub attributes: BTreeMap<String, String>,
}

impl UserInfo {
    /// Reads one attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The `email` attribute.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.attribute("email")
    }
}

/// A user as listed by the provider's administrative API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityUser {
    /// Remote username.
    pub username: String,
    /// Account status, e.g. `CONFIRMED`.
    pub status: Option<String>,
    /// Whether the account is enabled.
    pub enabled: bool,
    /// Profile attributes by name.
    pub attributes: BTreeMap<String, String>,
}

/// Remote identity provider calls the bridge relies on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Username/password exchange.
    async fn initiate_password_auth(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResult, IdentityError>;

    /// Resolves an access token to its profile.
    async fn get_user(&self, access_token: &str) -> Result<UserInfo, IdentityError>;

    /// Lists up to `limit` users of the pool.
    async fn list_users(&self, limit: i32) -> Result<Vec<IdentityUser>, IdentityError>;

    /// Creates a user with a temporary password, without a welcome message.
    async fn admin_create_user(
        &self,
        username: &str,
        temporary_password: &str,
        attributes: Vec<(String, String)>,
    ) -> Result<(), IdentityError>;

    /// Sets a permanent password.
    async fn admin_set_password(&self, username: &str, password: &str)
    -> Result<(), IdentityError>;
}
