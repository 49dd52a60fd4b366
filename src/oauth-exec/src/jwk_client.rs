// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::Result;
use crate::errors::Error;
use jsonwebtoken::{Algorithm, DecodingKey, jwk::JwkSet};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

pub(crate) const IAP_JWK_URL: &str = "https://www.gstatic.com/iap/verify/public_key-jwk";
pub(crate) const OAUTH2_JWK_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
struct CacheEntry {
    key: DecodingKey,
    expires_at: Instant,
}

/// Fetches the issuer's JSON Web Key Set and caches the decoded keys.
#[derive(Clone)]
pub(crate) struct JwkClient {
    client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>, // KeyID -> Key
    ttl: Duration,
}

impl std::fmt::Debug for JwkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwkClient")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwkClient {
    pub(crate) fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    fn with_ttl(ttl: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the key identified by `key_id`, fetching the key set on a
    /// cache miss.
    pub(crate) async fn get_or_load_key(
        &self,
        key_id: &str,
        alg: Algorithm,
        jwks_url: Option<&str>,
    ) -> Result<DecodingKey> {
        if let Some(entry) = self.cache.read().await.get(key_id) {
            if entry.expires_at > Instant::now() {
                tracing::debug!(key_id, "using cached signing key");
                return Ok(entry.key.clone());
            }
        }

        let jwks_url = resolve_jwks_url(alg, jwks_url)?;
        let jwk_set = self.fetch_keys(jwks_url).await?;
        let jwk = jwk_set.find(key_id).ok_or_else(|| {
            Error::token_invalid(format!("no signing key matches the `kid` header `{key_id}`"))
        })?;
        let key = DecodingKey::from_jwk(jwk).map_err(Error::key_retrieval)?;

        let entry = CacheEntry {
            key: key.clone(),
            expires_at: Instant::now() + self.ttl,
        };
        self.cache.write().await.insert(key_id.to_string(), entry);

        Ok(key)
    }

    async fn fetch_keys(&self, jwks_url: &str) -> Result<JwkSet> {
        tracing::debug!(jwks_url, "fetching signing keys");
        let response = self
            .client
            .get(jwks_url)
            .send()
            .await
            .map_err(Error::key_retrieval)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::key_retrieval(format!(
                "fetching the JWK set from {jwks_url} returned HTTP status {status}"
            )));
        }

        let jwk_set: JwkSet = response.json().await.map_err(Error::key_retrieval)?;
        tracing::debug!(jwks_url, keys = jwk_set.keys.len(), "fetched signing keys");
        Ok(jwk_set)
    }
}

/// The key set URL for tokens signed with `alg`.
///
/// Google signs ID tokens with `RS256`, Identity-Aware Proxy signs its
/// assertions with `ES256`. An explicit URL overrides both.
pub(crate) fn resolve_jwks_url(alg: Algorithm, jwks_url: Option<&str>) -> Result<&str> {
    if let Some(jwks_url) = jwks_url {
        return Ok(jwks_url);
    }
    match alg {
        Algorithm::RS256 => Ok(OAUTH2_JWK_URL),
        Algorithm::ES256 => Ok(IAP_JWK_URL),
        _ => Err(Error::token_invalid(format!(
            "unexpected signing algorithm: expected either RS256 or ES256: found {alg:?}"
        ))),
    }
}
