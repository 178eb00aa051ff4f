//! Amazon Cognito user pool client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::Client;
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType, MessageActionType};
use skyhook_shared::IdentitySettings;

use super::error::IdentityError;
use super::provider::{AuthResult, IdentityProvider, IdentityUser, UserInfo};
use super::secret_hash::secret_hash;
use crate::aws::load_sdk_config;

/// Cognito implementation of [`IdentityProvider`].
#[derive(Clone)]
pub struct CognitoIdentityProvider {
    client: Client,
    user_pool_id: String,
    client_id: String,
    client_secret: Option<String>,
}

impl CognitoIdentityProvider {
    /// Builds a client for the configured pool.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the pool or client id is missing.
    pub async fn from_settings(settings: &IdentitySettings) -> Result<Self, IdentityError> {
        settings
            .validate()
            .map_err(|e| IdentityError::Configuration(e.to_string()))?;

        let config = load_sdk_config(&settings.region, &settings.credentials).await;
        Ok(Self {
            client: Client::new(&config),
            user_pool_id: settings.user_pool_id.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
        })
    }

    /// User pool identifier.
    #[must_use]
    pub fn user_pool_id(&self) -> &str {
        &self.user_pool_id
    }
}

impl std::fmt::Debug for CognitoIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CognitoIdentityProvider")
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field("has_client_secret", &self.client_secret.is_some())
            .finish_non_exhaustive()
    }
}

fn attributes_map(attributes: &[AttributeType]) -> BTreeMap<String, String> {
    attributes
        .iter()
        .map(|attr| {
            (
                attr.name().to_string(),
                attr.value().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn initiate_password_auth(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResult, IdentityError> {
        let mut request = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password);

        if let Some(secret) = &self.client_secret {
            request = request.auth_parameters(
                "SECRET_HASH",
                secret_hash(username, &self.client_id, secret)?,
            );
        }

        let output = request.send().await.map_err(|e| {
            IdentityError::remote("initiate_auth", DisplayErrorContext(&e).to_string())
        })?;

        let Some(result) = output.authentication_result() else {
            let challenge = output
                .challenge_name()
                .map(|name| name.as_str().to_string())
                .unwrap_or_default();
            return Err(IdentityError::ChallengeRequired(challenge));
        };

        let access_token = result
            .access_token()
            .ok_or(IdentityError::MissingToken)?
            .to_string();

        Ok(AuthResult {
            access_token,
            refresh_token: result.refresh_token().map(str::to_string),
            id_token: result.id_token().map(str::to_string),
            expires_in: result.expires_in(),
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<UserInfo, IdentityError> {
        let output = self
            .client
            .get_user()
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::remote("get_user", DisplayErrorContext(&e).to_string()))?;

        Ok(UserInfo {
            username: output.username().to_string(),
            attributes: attributes_map(output.user_attributes()),
        })
    }

    async fn list_users(&self, limit: i32) -> Result<Vec<IdentityUser>, IdentityError> {
        let output = self
            .client
            .list_users()
            .user_pool_id(&self.user_pool_id)
            .limit(limit)
            .send()
            .await
            .map_err(|e| {
                IdentityError::remote("list_users", DisplayErrorContext(&e).to_string())
            })?;

        Ok(output
            .users()
            .iter()
            .map(|user| IdentityUser {
                username: user.username().unwrap_or_default().to_string(),
                status: user.user_status().map(|s| s.as_str().to_string()),
                enabled: user.enabled(),
                attributes: attributes_map(user.attributes()),
            })
            .collect())
    }

    async fn admin_create_user(
        &self,
        username: &str,
        temporary_password: &str,
        attributes: Vec<(String, String)>,
    ) -> Result<(), IdentityError> {
        let attributes = attributes
            .into_iter()
            .map(|(name, value)| {
                AttributeType::builder()
                    .name(name)
                    .value(value)
                    .build()
                    .map_err(|e| IdentityError::remote("admin_create_user", e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .admin_create_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .set_user_attributes(Some(attributes))
            .temporary_password(temporary_password)
            .message_action(MessageActionType::Suppress)
            .send()
            .await
            .map_err(|e| {
                IdentityError::remote("admin_create_user", DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }

    async fn admin_set_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        self.client
            .admin_set_user_password()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .password(password)
            .permanent(true)
            .send()
            .await
            .map_err(|e| {
                IdentityError::remote(
                    "admin_set_user_password",
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(())
    }
}
