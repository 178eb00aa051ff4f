//! Shared AWS SDK configuration loading.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sesv2::config::Credentials as StaticCredentials;
use skyhook_shared::Credentials;
use tracing::debug;

/// Provider name reported by statically configured credentials.
const STATIC_PROVIDER: &str = "skyhook-static";

/// Load an SDK configuration for `region`.
///
/// A complete credential pair is used as-is; otherwise the SDK's default
/// credential chain (environment, profile, instance role) applies.
pub(crate) async fn load_sdk_config(region: &str, credentials: &Credentials) -> SdkConfig {
    let mut config_builder =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

    if credentials.is_complete() {
        config_builder = config_builder.credentials_provider(StaticCredentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            STATIC_PROVIDER,
        ));
    } else {
        debug!(region = %region, "Using default AWS credential chain");
    }

    config_builder.load().await
}
