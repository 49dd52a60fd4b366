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

//! Validate Google-issued OIDC ID tokens and report their claims.
//!
//! This crate backs the `google-oauth-exec` executable. The executable reads
//! an ID token and the expected audience (the OAuth client id) from the
//! environment, verifies the token against Google's published signing keys,
//! and prints the token claims as a single line of JSON.
//!
//! The pieces are usable on their own:
//! * [validate::validate] is the entry point, it rejects empty inputs and
//!   bounds the verification with a timeout.
//! * [verifier::Verifier] performs the signature and claim checks.
//! * [output::write_claims] produces the single-line output.
//!
//! [Authentication methods at Google] describes the terminology used here,
//! such as [ID tokens] and audiences.
//!
//! [Authentication methods at Google]: https://cloud.google.com/docs/authentication
//! [ID tokens]: https://cloud.google.com/docs/authentication/token-types#identity-tokens

pub mod args;
pub mod errors;
pub mod output;
pub mod validate;
pub mod verifier;

pub(crate) mod jwk_client;

/// A `Result` alias where the `Err` case is `google_oauth_exec::errors::Error`.
pub type Result<T> = std::result::Result<T, crate::errors::Error>;
