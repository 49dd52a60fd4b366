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

//! Verify [OIDC ID tokens] issued by Google.
//!
//! [Verifier] checks the token signature against the issuer's JSON Web Key
//! Set (JWKS), and validates the registered claims: expiry, not-before,
//! audience, and issuer.
//!
//! ## Example: Verifying an ID token
//!
//! ```no_run
//! # use google_oauth_exec::verifier::{Builder, VerifyIdToken};
//! # async fn sample(token: &str) -> google_oauth_exec::Result<()> {
//! let verifier = Builder::new().build();
//! let claims = verifier.verify(token, "my-client-id.apps.googleusercontent.com").await?;
//! println!("Hello: {:?}", claims["email"]);
//! # Ok(())
//! # }
//! ```
//!
//! [OIDC ID Tokens]: https://cloud.google.com/docs/authentication/token-types#identity-tokens

use crate::Result;
use crate::errors::Error;
use crate::jwk_client::JwkClient;
use jsonwebtoken::{Algorithm, Validation};
use std::future::Future;
use std::time::Duration;

/// Represents the claims in an ID token.
pub use serde_json::Map;
/// Represents a claim value in an ID token.
pub use serde_json::Value;

/// The claim set of a verified ID token.
pub type Claims = Map<String, Value>;

const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(10);
/// The largest clock skew a [Verifier] accepts.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(3600);
const GOOGLE_ISSUERS: &[&str] = &["https://accounts.google.com", "accounts.google.com"];
const IAP_ISSUERS: &[&str] = &["https://cloud.google.com/iap"];

/// A component that can verify ID tokens.
///
/// The validation facade only talks to the verifier through this trait. Tests
/// implement it to replace the network-dependent [Verifier].
pub trait VerifyIdToken: std::fmt::Debug {
    /// Verifies `token` is addressed to `audience` and returns its claims.
    fn verify(&self, token: &str, audience: &str) -> impl Future<Output = Result<Claims>> + Send;
}

/// Builder is used to construct a [Verifier] of ID tokens.
#[derive(Debug, Default)]
pub struct Builder {
    email: Option<String>,
    jwks_url: Option<String>,
    clock_skew: Option<Duration>,
}

impl Builder {
    /// Creates a builder with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The email address expected in the ID token.
    ///
    /// If provided, the verifier checks that the `email` claim matches this
    /// value and that the `email_verified` claim is `true`.
    ///
    /// # Example
    ///
    /// ```
    /// # use google_oauth_exec::verifier::Builder;
    /// let verifier = Builder::new()
    ///     .with_email("user@example.com")
    ///     .build();
    /// ```
    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The URL of the JSON Web Key Set (JWKS) with the keys used to verify
    /// the token signature.
    ///
    /// If not provided, the Google OAuth2 certificates are used for `RS256`
    /// tokens, and the Identity-Aware Proxy keys for `ES256` tokens.
    pub fn with_jwks_url<S: Into<String>>(mut self, jwks_url: S) -> Self {
        self.jwks_url = Some(jwks_url.into());
        self
    }

    /// The acceptable clock skew when verifying the token's timestamps.
    ///
    /// The default value is 10 seconds. The skew is applied in whole seconds,
    /// any fractional part is ignored. Values above [MAX_CLOCK_SKEW] are
    /// reduced to that maximum.
    ///
    /// # Example
    ///
    /// ```
    /// # use google_oauth_exec::verifier::Builder;
    /// # use std::time::Duration;
    /// let verifier = Builder::new()
    ///     .with_clock_skew(Duration::from_secs(60))
    ///     .build();
    /// ```
    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = Some(clock_skew.min(MAX_CLOCK_SKEW));
        self
    }

    /// Returns a [Verifier] instance with the configured settings.
    pub fn build(self) -> Verifier {
        Verifier {
            jwk_client: JwkClient::new(),
            email: self.email,
            jwks_url: self.jwks_url,
            clock_skew: self.clock_skew.unwrap_or(DEFAULT_CLOCK_SKEW),
        }
    }
}

/// Verifier is used to verify Google-issued OIDC ID tokens.
#[derive(Debug)]
pub struct Verifier {
    jwk_client: JwkClient,
    email: Option<String>,
    jwks_url: Option<String>,
    clock_skew: Duration,
}

impl Verifier {
    /// Verifies the ID token and returns its claims.
    ///
    /// The claims are returned exactly as they appear in the token payload.
    #[tracing::instrument(level = "debug", skip(self, token))]
    pub async fn verify(&self, token: &str, audience: &str) -> Result<Claims> {
        let header = jsonwebtoken::decode_header(token).map_err(Error::token_invalid)?;
        let key_id = header
            .kid
            .as_deref()
            .ok_or_else(|| Error::token_invalid("the `kid` header is missing"))?;
        let issuers = trusted_issuers(header.alg)?;
        tracing::debug!(key_id, alg = ?header.alg, "decoded ID token header");

        let key = self
            .jwk_client
            .get_or_load_key(key_id, header.alg, self.jwks_url.as_deref())
            .await?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = self.clock_skew.as_secs();
        validation.validate_nbf = true;
        validation.set_audience(&[audience]);
        validation.set_issuer(issuers);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        let claims = jsonwebtoken::decode::<Claims>(token, &key, &validation)
            .map_err(Error::from_jwt)?
            .claims;
        check_audience(&claims, audience)?;

        if let Some(email) = &self.email {
            check_email(&claims, email)?;
        }

        Ok(claims)
    }
}

impl VerifyIdToken for Verifier {
    fn verify(&self, token: &str, audience: &str) -> impl Future<Output = Result<Claims>> + Send {
        Verifier::verify(self, token, audience)
    }
}

fn trusted_issuers(alg: Algorithm) -> Result<&'static [&'static str]> {
    match alg {
        Algorithm::RS256 => Ok(GOOGLE_ISSUERS),
        Algorithm::ES256 => Ok(IAP_ISSUERS),
        _ => Err(Error::token_invalid(format!(
            "unexpected signing algorithm: expected either RS256 or ES256: found {alg:?}"
        ))),
    }
}

// `jsonwebtoken` accepts an `aud` array containing the audience, Google ID
// tokens carry a single string.
fn check_audience(claims: &Claims, audience: &str) -> Result<()> {
    match claims.get("aud") {
        Some(Value::String(aud)) if aud == audience => Ok(()),
        Some(Value::String(aud)) => Err(Error::audience_mismatch(format!(
            "expected `{audience}`, but found `{aud}`"
        ))),
        Some(aud) => Err(Error::audience_mismatch(format!(
            "the `aud` claim must be a single string, found `{aud}`"
        ))),
        None => Err(Error::audience_mismatch("the `aud` claim is missing")),
    }
}

fn check_email(claims: &Claims, email: &str) -> Result<()> {
    let email_verified = claims
        .get("email_verified")
        .and_then(Value::as_bool)
        .ok_or_else(|| Error::invalid_claim("email_verified", "email_verified claim is missing"))?;
    if !email_verified {
        return Err(Error::invalid_claim(
            "email_verified",
            "email_verified claim value is `false`",
        ));
    }
    let token_email = claims
        .get("email")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_claim("email", "email claim is missing"))?;
    if email != token_email {
        return Err(Error::invalid_claim(
            "email",
            format!("expected `{email}`, but found `{token_email}`"),
        ));
    }
    Ok(())
}
