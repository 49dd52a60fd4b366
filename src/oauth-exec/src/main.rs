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

//! Validate the ID token in `GOOGLE_OAUTH_EXEC_INPUT_TOKEN` for the client id
//! in `GOOGLE_OAUTH_EXEC_CLIENT_ID`, and print its claims.

use clap::Parser;
use google_oauth_exec::args::Args;
use google_oauth_exec::{Result, output, validate};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    enable_tracing(&args);
    tracing::debug!("Configuration: {args:?}");

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("ID token validation failed: {e:?}");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    args.validate()?;
    let verifier = args.verifier();
    let claims =
        validate::validate(&verifier, args.token()?, args.client_id()?, args.timeout).await?;
    output::write_claims(std::io::stdout().lock(), &claims)
}

fn enable_tracing(args: &Args) {
    let subscriber = tracing_subscriber::fmt()
        .with_level(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(args.log_level)
        .finish();

    // Only fails if a global subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
