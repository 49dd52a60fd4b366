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

//! The validation facade.

use crate::Result;
use crate::errors::Error;
use crate::verifier::{Claims, VerifyIdToken};
use std::time::Duration;
use tokio::time::timeout as tokio_timeout;

/// The default bound on the verification call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validates `token` for `audience` and returns its claims.
///
/// Empty (or blank) inputs are rejected before the verifier is called, so no
/// network request is made for them. The verifier runs at most `timeout`,
/// after that the validation fails with a timeout error. Nothing is retried.
///
/// # Example
/// ```no_run
/// # use google_oauth_exec::validate::{validate, DEFAULT_TIMEOUT};
/// # use google_oauth_exec::verifier::Builder;
/// # async fn sample(token: &str) -> google_oauth_exec::Result<()> {
/// let verifier = Builder::new().build();
/// let claims = validate(&verifier, token, "my-client-id", DEFAULT_TIMEOUT).await?;
/// println!("subject: {:?}", claims["sub"]);
/// # Ok(())
/// # }
/// ```
pub async fn validate<V>(
    verifier: &V,
    token: &str,
    audience: &str,
    timeout: Duration,
) -> Result<Claims>
where
    V: VerifyIdToken,
{
    if token.trim().is_empty() {
        return Err(Error::missing_input("token"));
    }
    if audience.trim().is_empty() {
        return Err(Error::missing_input("audience"));
    }

    tracing::debug!(audience, ?timeout, "validating ID token");
    let claims = tokio_timeout(timeout, verifier.verify(token, audience))
        .await
        .map_err(|_| Error::timeout(timeout))??;
    tracing::info!(audience, claims = claims.len(), "ID token validated");
    Ok(claims)
}
