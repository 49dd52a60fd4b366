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

//! Errors produced while validating an ID token.

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for ID token validation.
///
/// Every failure is fatal to the invocation. Use the `is_*()` predicates to
/// classify the failure, or [Error::exit_code] to obtain the process exit
/// status for it.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// A required input was absent or empty.
    pub fn is_missing_input(&self) -> bool {
        matches!(self.0, ErrorKind::MissingInput(_))
    }

    /// A configuration value is outside its accepted range.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self.0, ErrorKind::InvalidConfiguration(_))
    }

    /// The token is malformed, its signature does not verify, or it cannot be
    /// matched to a signing key.
    pub fn is_token_invalid(&self) -> bool {
        matches!(self.0, ErrorKind::TokenInvalid(_))
    }

    /// The token's validity window has passed.
    pub fn is_token_expired(&self) -> bool {
        matches!(self.0, ErrorKind::TokenExpired(_))
    }

    /// The token is not addressed to the expected audience.
    pub fn is_audience_mismatch(&self) -> bool {
        matches!(self.0, ErrorKind::AudienceMismatch(_))
    }

    /// The token was not issued by a trusted Google issuer.
    pub fn is_issuer_untrusted(&self) -> bool {
        matches!(self.0, ErrorKind::IssuerUntrusted(_))
    }

    /// A configured claim expectation, such as the email, was not met.
    pub fn is_invalid_claim(&self) -> bool {
        matches!(self.0, ErrorKind::InvalidClaim(_, _))
    }

    /// The issuer's signing keys could not be fetched or decoded.
    pub fn is_key_retrieval(&self) -> bool {
        matches!(self.0, ErrorKind::KeyRetrieval(_))
    }

    /// The verification did not complete in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self.0, ErrorKind::Timeout(_))
    }

    /// The claim set could not be serialized or written.
    pub fn is_serialization(&self) -> bool {
        matches!(self.0, ErrorKind::Serialization(_))
    }

    /// The process exit status for this error.
    ///
    /// * `1`: the token was rejected.
    /// * `2`: the inputs are missing or unusable.
    /// * `3`: the signing keys were unavailable, or the verification timed out.
    /// * `4`: the claims could not be written.
    pub fn exit_code(&self) -> u8 {
        match &self.0 {
            ErrorKind::TokenInvalid(_)
            | ErrorKind::TokenExpired(_)
            | ErrorKind::AudienceMismatch(_)
            | ErrorKind::IssuerUntrusted(_)
            | ErrorKind::InvalidClaim(_, _) => 1,
            ErrorKind::MissingInput(_) | ErrorKind::InvalidConfiguration(_) => 2,
            ErrorKind::KeyRetrieval(_) | ErrorKind::Timeout(_) => 3,
            ErrorKind::Serialization(_) => 4,
        }
    }

    pub(crate) fn missing_input<S: Into<String>>(name: S) -> Error {
        Error(ErrorKind::MissingInput(name.into()))
    }

    pub(crate) fn invalid_configuration<S: Into<String>>(message: S) -> Error {
        Error(ErrorKind::InvalidConfiguration(message.into()))
    }

    pub(crate) fn token_invalid<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::TokenInvalid(source.into()))
    }

    pub(crate) fn token_expired<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::TokenExpired(source.into()))
    }

    pub(crate) fn audience_mismatch<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::AudienceMismatch(source.into()))
    }

    pub(crate) fn issuer_untrusted<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::IssuerUntrusted(source.into()))
    }

    pub(crate) fn invalid_claim<S: Into<String>, T>(claim: S, source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::InvalidClaim(claim.into(), source.into()))
    }

    pub(crate) fn key_retrieval<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::KeyRetrieval(source.into()))
    }

    pub(crate) fn timeout(after: Duration) -> Error {
        Error(ErrorKind::Timeout(after))
    }

    pub(crate) fn serialization<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::Serialization(source.into()))
    }

    /// Classifies a `jsonwebtoken` validation failure.
    pub(crate) fn from_jwt(e: jsonwebtoken::errors::Error) -> Error {
        use jsonwebtoken::errors::ErrorKind as JwtKind;
        let classify: fn(jsonwebtoken::errors::Error) -> Error = match e.kind() {
            JwtKind::ExpiredSignature => Error::token_expired,
            JwtKind::InvalidAudience => Error::audience_mismatch,
            JwtKind::InvalidIssuer => Error::issuer_untrusted,
            JwtKind::MissingRequiredClaim(claim) if claim == "aud" => Error::audience_mismatch,
            JwtKind::MissingRequiredClaim(claim) if claim == "iss" => Error::issuer_untrusted,
            _ => Error::token_invalid,
        };
        classify(e)
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("missing required input: {0} is not set or is empty")]
    MissingInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("the ID token is invalid: {0}")]
    TokenInvalid(#[source] BoxError),
    #[error("the ID token has expired: {0}")]
    TokenExpired(#[source] BoxError),
    #[error("the ID token audience does not match the client id: {0}")]
    AudienceMismatch(#[source] BoxError),
    #[error("the ID token issuer is not trusted: {0}")]
    IssuerUntrusted(#[source] BoxError),
    #[error("the ID token `{0}` claim is invalid: {1}")]
    InvalidClaim(String, #[source] BoxError),
    #[error("cannot retrieve the issuer signing keys: {0}")]
    KeyRetrieval(#[source] BoxError),
    #[error("the ID token verification did not complete within {0:?}")]
    Timeout(Duration),
    #[error("cannot serialize the ID token claims: {0}")]
    Serialization(#[source] BoxError),
}
