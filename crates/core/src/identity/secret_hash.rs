//! App client `SECRET_HASH` derivation.

use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::IdentityError;

type HmacSha256 = Hmac<Sha256>;

/// `base64(HMAC-SHA256(client_secret, username + client_id))`.
///
/// # Errors
///
/// Returns `Configuration` if the secret cannot key the MAC.
pub fn secret_hash(
    username: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, IdentityError> {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .map_err(|e| IdentityError::Configuration(e.to_string()))?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}
