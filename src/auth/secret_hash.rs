//! Keyed secret hash for Cognito password flows.
//!
//! App clients configured with a secret must prove possession of it on every
//! password call: `HMAC-SHA-256(key = client_secret, msg = username +
//! client_id)`, base64-encoded.

use base64::Engine as _;
use hmac::Mac;
use hmac::KeyInit;
use sha2::Sha256;

/// Compute the secret hash for `username` under the given app client.
///
/// Deterministic: the same inputs always produce the same digest. The digest
/// is bound to the username and client, not to any session.
#[must_use]
pub fn secret_hash(username: &str, client_id: &str, client_secret: &str) -> String {
    let mut mac = hmac::Hmac::<Sha256>::new_from_slice(client_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());

    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}
