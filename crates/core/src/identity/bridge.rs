//! Identity bridge: remote sign-in mapped onto local user records.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use skyhook_shared::IdentitySettings;
use tracing::{debug, info};

use super::cognito::CognitoIdentityProvider;
use super::error::IdentityError;
use super::provider::{AuthResult, IdentityProvider, IdentityUser, UserInfo};
use crate::host::{HostError, NewUser, UserRecord, UserStore};

/// Local user field holding the access token.
pub const ACCESS_TOKEN_FIELD: &str = "cognitoAccessToken";
/// Local user field holding the refresh token.
pub const REFRESH_TOKEN_FIELD: &str = "cognitoRefreshToken";
/// Local user field holding the identity token.
pub const ID_TOKEN_FIELD: &str = "cognitoIdToken";

/// Per-call deadlines for identity operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityTimeouts {
    /// Password exchange.
    pub authenticate: Duration,
    /// Token introspection.
    pub introspect: Duration,
    /// Administrative calls, per step.
    pub admin: Duration,
}

impl Default for IdentityTimeouts {
    fn default() -> Self {
        Self {
            authenticate: Duration::from_secs(30),
            introspect: Duration::from_secs(10),
            admin: Duration::from_secs(30),
        }
    }
}

/// Identity adapter handle.
#[derive(Clone)]
pub struct IdentityBridge {
    provider: Arc<dyn IdentityProvider>,
    timeouts: IdentityTimeouts,
}

impl IdentityBridge {
    /// Largest page the provider accepts for `list_users`.
    pub const MAX_LIST_LIMIT: i32 = 60;
    /// Page size used when the caller has no preference.
    pub const DEFAULT_LIST_LIMIT: i32 = Self::MAX_LIST_LIMIT;

    /// Builds a Cognito-backed bridge.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the settings are unusable.
    pub async fn from_settings(settings: &IdentitySettings) -> Result<Self, IdentityError> {
        let provider = CognitoIdentityProvider::from_settings(settings).await?;
        Ok(Self::new(Arc::new(provider)))
    }

    /// Builds a bridge over any provider.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            timeouts: IdentityTimeouts::default(),
        }
    }

    /// Overrides the per-call deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: IdentityTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Password exchange against the provider.
    ///
    /// # Errors
    ///
    /// Returns `Timeout`, a remote error, or `ChallengeRequired`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResult, IdentityError> {
        deadline(
            "authenticate",
            self.timeouts.authenticate,
            self.provider.initiate_password_auth(username, password),
        )
        .await
    }

    /// Resolves an access token to the remote profile.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` or a remote error for invalid tokens.
    pub async fn introspect(&self, access_token: &str) -> Result<UserInfo, IdentityError> {
        deadline(
            "introspect",
            self.timeouts.introspect,
            self.provider.get_user(access_token),
        )
        .await
    }

    /// Whether `access_token` resolves to a profile.
    pub async fn verify_token(&self, access_token: &str) -> bool {
        match self.introspect(access_token).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Token rejected");
                false
            }
        }
    }

    /// Lists pool users. `limit` is clamped to `1..=MAX_LIST_LIMIT`.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` or a remote error.
    pub async fn list_users(&self, limit: i32) -> Result<Vec<IdentityUser>, IdentityError> {
        let limit = limit.clamp(1, Self::MAX_LIST_LIMIT);
        deadline(
            "list_users",
            self.timeouts.admin,
            self.provider.list_users(limit),
        )
        .await
    }

    /// Provisions a remote user whose password is immediately permanent.
    ///
    /// The user is created with `password` as a temporary password and no
    /// welcome message, then the password is made permanent. If the second
    /// step fails the remote user stays in place and the failure is reported
    /// as `PasswordNotPersisted`.
    ///
    /// # Errors
    ///
    /// Returns the first step's error, or `PasswordNotPersisted`.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<(), IdentityError> {
        let mut remote_attributes = vec![
            ("email".to_string(), email.to_string()),
            ("email_verified".to_string(), "true".to_string()),
        ];
        remote_attributes.extend(
            attributes
                .iter()
                .filter(|(name, _)| !matches!(name.as_str(), "email" | "email_verified"))
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        deadline(
            "admin_create_user",
            self.timeouts.admin,
            self.provider
                .admin_create_user(email, password, remote_attributes),
        )
        .await?;

        deadline(
            "admin_set_password",
            self.timeouts.admin,
            self.provider.admin_set_password(email, password),
        )
        .await
        .map_err(|e| IdentityError::PasswordNotPersisted {
            username: email.to_string(),
            reason: e.to_string(),
        })?;

        info!(email = %email, "Remote user provisioned");
        Ok(())
    }

    /// Signs `identity` in remotely and mirrors the result locally.
    ///
    /// The local user is found by email or created as verified with a
    /// visible email, then the three tokens are stored on it. Nothing local
    /// is touched unless the remote exchange succeeds.
    ///
    /// # Errors
    ///
    /// Remote failures are returned as-is; host store failures after a
    /// successful exchange are returned as `Host`.
    pub async fn sign_in(
        &self,
        users: &dyn UserStore,
        identity: &str,
        password: &str,
    ) -> Result<UserRecord, IdentityError> {
        let tokens = self.authenticate(identity, password).await?;

        let mut record = find_or_create(users, identity).await?;
        record.set(ACCESS_TOKEN_FIELD, tokens.access_token);
        if let Some(refresh_token) = tokens.refresh_token {
            record.set(REFRESH_TOKEN_FIELD, refresh_token);
        }
        if let Some(id_token) = tokens.id_token {
            record.set(ID_TOKEN_FIELD, id_token);
        }
        users.save(&record).await?;

        debug!(identity = %identity, user_id = %record.id, "Remote sign-in mirrored");
        Ok(record)
    }
}

impl fmt::Debug for IdentityBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityBridge")
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

async fn find_or_create(users: &dyn UserStore, email: &str) -> Result<UserRecord, HostError> {
    if let Some(existing) = users.find_by_email(email).await? {
        return Ok(existing);
    }

    let created = users
        .create(NewUser {
            email: email.to_string(),
            email_visibility: true,
            verified: true,
        })
        .await;

    match created {
        Ok(record) => {
            info!(email = %email, "Local user created from remote identity");
            Ok(record)
        }
        // Lost a race with a concurrent sign-in for the same email.
        Err(HostError::UserExists(_)) => users
            .find_by_email(email)
            .await?
            .ok_or_else(|| HostError::UserNotFound(email.to_string())),
        Err(e) => Err(e),
    }
}

async fn deadline<T, F>(operation: &'static str, after: Duration, fut: F) -> Result<T, IdentityError>
where
    F: Future<Output = Result<T, IdentityError>>,
{
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| IdentityError::Timeout { operation, after })?
}
