//! JWKS retrieval and caching for the user pool's signing keys.
//!
//! The key set is fetched from the pool's well-known URL and kept for a
//! configurable TTL. An unknown `kid` triggers a single forced refresh so a
//! rotated key is picked up without re-fetching on every failed lookup.

use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use parking_lot::RwLock;
use tracing::debug;

use super::verifier::AuthError;

/// Cached JWKS entry.
struct CachedJwks {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Key store for one user pool — fetches and caches the published JWKS.
pub struct JwksCache {
    http: reqwest::Client,
    url: String,
    ttl: Duration,
    cached: RwLock<Option<CachedJwks>>,
}

impl JwksCache {
    /// Create a cache for the key set published at `url`.
    #[must_use]
    pub fn new(url: String, ttl: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            url,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Return the cached key set, or fetch it if stale or absent.
    ///
    /// With `force_refresh` the cache is bypassed regardless of TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Jwks`] if the fetch fails; the previous cache
    /// entry is left untouched in that case.
    pub async fn get(&self, force_refresh: bool) -> Result<JwkSet, AuthError> {
        if !force_refresh {
            let cached = self.cached.read();
            if let Some(entry) = cached.as_ref() {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(entry.keys.clone());
                }
            }
        }

        debug!(url = %self.url, "Fetching JWKS");
        let jwks: JwkSet = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        *self.cached.write() = Some(CachedJwks {
            keys: jwks.clone(),
            fetched_at: Instant::now(),
        });

        Ok(jwks)
    }
}
