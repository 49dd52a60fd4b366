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

//! Configuration for the `google-oauth-exec` executable.
//!
//! Every option can be set with a command-line flag or with its environment
//! variable. The token and client id are usually provided through the
//! environment.

use crate::Result;
use crate::errors::Error;
use crate::verifier::{Builder, MAX_CLOCK_SKEW, Verifier};
use clap::Parser;
use humantime::parse_duration;
use std::time::Duration;

pub const TOKEN_ENV: &str = "GOOGLE_OAUTH_EXEC_INPUT_TOKEN";
pub const CLIENT_ID_ENV: &str = "GOOGLE_OAUTH_EXEC_CLIENT_ID";
pub const JWKS_URL_ENV: &str = "GOOGLE_OAUTH_EXEC_JWKS_URL";
pub const EMAIL_ENV: &str = "GOOGLE_OAUTH_EXEC_EMAIL";
pub const CLOCK_SKEW_ENV: &str = "GOOGLE_OAUTH_EXEC_CLOCK_SKEW";
pub const TIMEOUT_ENV: &str = "GOOGLE_OAUTH_EXEC_TIMEOUT";
pub const LOG_LEVEL_ENV: &str = "GOOGLE_OAUTH_EXEC_LOG_LEVEL";

const DESCRIPTION: &str = concat!(
    "Validates a Google-issued OIDC ID token and prints its claims as one line of JSON.",
    " The token signature is verified with Google's published keys, and the token must",
    " be unexpired, issued by Google, and addressed to the client id.",
    " On failure nothing is printed on stdout and the exit status is non-zero."
);

/// Configuration options for the executable.
#[derive(Clone, Parser)]
#[command(version, about, long_about = DESCRIPTION)]
pub struct Args {
    /// The ID token to validate.
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// The expected audience, that is, the OAuth client id.
    #[arg(long, env = CLIENT_ID_ENV)]
    pub client_id: Option<String>,

    /// Fetch the signing keys from this JWK set URL instead of Google's.
    #[arg(long, env = JWKS_URL_ENV)]
    pub jwks_url: Option<String>,

    /// Require a verified `email` claim with this value.
    #[arg(long, env = EMAIL_ENV)]
    pub email: Option<String>,

    /// The acceptable clock skew when checking the token timestamps.
    ///
    /// Must be a whole number of seconds, at most one hour.
    #[arg(long, env = CLOCK_SKEW_ENV, value_parser = parse_duration, default_value = "10s")]
    pub clock_skew: Duration,

    /// The maximum time spent verifying the token, including fetching keys.
    #[arg(long, env = TIMEOUT_ENV, value_parser = parse_duration, default_value = "30s")]
    pub timeout: Duration,

    /// The verbosity of the diagnostics written to stderr.
    #[arg(long, env = LOG_LEVEL_ENV, default_value_t = tracing::Level::WARN)]
    pub log_level: tracing::Level,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("token", &self.token.as_ref().map(|_| "[censored]"))
            .field("client_id", &self.client_id)
            .field("jwks_url", &self.jwks_url)
            .field("email", &self.email)
            .field("clock_skew", &self.clock_skew)
            .field("timeout", &self.timeout)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Args {
    /// The token to validate.
    pub fn token(&self) -> Result<&str> {
        required(self.token.as_deref(), TOKEN_ENV)
    }

    /// The expected audience.
    pub fn client_id(&self) -> Result<&str> {
        required(self.client_id.as_deref(), CLIENT_ID_ENV)
    }

    /// Validates the arguments after parsing.
    ///
    /// Runs before any network access, so missing inputs never trigger a key
    /// fetch.
    pub fn validate(&self) -> Result<()> {
        self.token()?;
        self.client_id()?;
        if self.clock_skew > MAX_CLOCK_SKEW {
            return Err(Error::invalid_configuration(format!(
                "{CLOCK_SKEW_ENV} must be at most {MAX_CLOCK_SKEW:?}, got {:?}",
                self.clock_skew
            )));
        }
        if self.clock_skew.subsec_nanos() != 0 {
            return Err(Error::invalid_configuration(format!(
                "{CLOCK_SKEW_ENV} must be a whole number of seconds, got {:?}",
                self.clock_skew
            )));
        }
        Ok(())
    }

    /// Creates the [Verifier] described by these arguments.
    pub fn verifier(&self) -> Verifier {
        let builder = Builder::new().with_clock_skew(self.clock_skew);
        let builder = match &self.jwks_url {
            Some(url) => builder.with_jwks_url(url),
            None => builder,
        };
        let builder = match &self.email {
            Some(email) => builder.with_email(email),
            None => builder,
        };
        builder.build()
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::missing_input(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoped_env::ScopedEnv;
    use serial_test::serial;
    use test_case::test_case;

    type TestResult = anyhow::Result<()>;

    #[test]
    #[serial]
    fn from_flags() -> TestResult {
        let args = Args::try_parse_from([
            "program",
            "--token=a.b.c",
            "--client-id=client-abc",
            "--clock-skew=1m",
            "--timeout=5s",
            "--log-level=debug",
        ])?;
        args.validate()?;
        assert_eq!(args.token()?, "a.b.c");
        assert_eq!(args.client_id()?, "client-abc");
        assert_eq!(args.clock_skew, Duration::from_secs(60));
        assert_eq!(args.timeout, Duration::from_secs(5));
        assert_eq!(args.log_level, tracing::Level::DEBUG);
        assert!(args.jwks_url.is_none(), "{args:?}");
        assert!(args.email.is_none(), "{args:?}");
        Ok(())
    }

    #[test]
    #[serial]
    fn from_env() -> TestResult {
        let _token = ScopedEnv::set(TOKEN_ENV, "a.b.c");
        let _client_id = ScopedEnv::set(CLIENT_ID_ENV, "client-abc");
        let _jwks_url = ScopedEnv::set(JWKS_URL_ENV, "http://localhost:8080/certs");
        let _email = ScopedEnv::set(EMAIL_ENV, "test@example.com");
        let _timeout = ScopedEnv::set(TIMEOUT_ENV, "250ms");
        let args = Args::try_parse_from(["program"])?;
        args.validate()?;
        assert_eq!(args.token()?, "a.b.c");
        assert_eq!(args.client_id()?, "client-abc");
        assert_eq!(args.jwks_url.as_deref(), Some("http://localhost:8080/certs"));
        assert_eq!(args.email.as_deref(), Some("test@example.com"));
        assert_eq!(args.timeout, Duration::from_millis(250));
        Ok(())
    }

    #[test]
    #[serial]
    fn defaults() -> TestResult {
        let args = Args::try_parse_from(["program", "--token=a.b.c", "--client-id=client-abc"])?;
        assert_eq!(args.clock_skew, Duration::from_secs(10));
        assert_eq!(args.timeout, Duration::from_secs(30));
        assert_eq!(args.log_level, tracing::Level::WARN);
        Ok(())
    }

    #[test_case(&["program", "--client-id=client-abc"], TOKEN_ENV)]
    #[test_case(&["program", "--token=", "--client-id=client-abc"], TOKEN_ENV)]
    #[test_case(&["program", "--token=a.b.c"], CLIENT_ID_ENV)]
    #[test_case(&["program", "--token=a.b.c", "--client-id= "], CLIENT_ID_ENV)]
    #[serial]
    fn missing_input(input: &[&str], name: &str) -> TestResult {
        let args = Args::try_parse_from(input)?;
        let err = args.validate().expect_err("validation should fail");
        assert!(err.is_missing_input(), "{err:?}");
        assert!(err.to_string().contains(name), "{err}");
        Ok(())
    }

    #[test_case("2h"; "too large")]
    #[test_case("100years"; "overflows the clock")]
    #[test_case("500ms"; "sub-second")]
    #[test_case("1s 500ms"; "fractional")]
    #[serial]
    fn invalid_clock_skew(input: &str) -> TestResult {
        let clock_skew = format!("--clock-skew={input}");
        let args = Args::try_parse_from([
            "program",
            "--token=a.b.c",
            "--client-id=client-abc",
            clock_skew.as_str(),
        ])?;
        let err = args.validate().expect_err("validation should fail");
        assert!(err.is_invalid_configuration(), "{err:?}");
        assert_eq!(err.exit_code(), 2, "{err:?}");
        assert!(err.to_string().contains(CLOCK_SKEW_ENV), "{err}");
        Ok(())
    }

    #[test_case("0s")]
    #[test_case("1h")]
    #[test_case("90s")]
    #[serial]
    fn valid_clock_skew(input: &str) -> TestResult {
        let clock_skew = format!("--clock-skew={input}");
        let args = Args::try_parse_from([
            "program",
            "--token=a.b.c",
            "--client-id=client-abc",
            clock_skew.as_str(),
        ])?;
        args.validate()?;
        Ok(())
    }

    #[test]
    #[serial]
    fn debug_hides_token() -> TestResult {
        let args = Args::try_parse_from(["program", "--token=secret.token.value"])?;
        let got = format!("{args:?}");
        assert!(!got.contains("secret.token.value"), "{got}");
        assert!(got.contains("[censored]"), "{got}");
        Ok(())
    }
}
