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
use crate::verifier::Claims;
use std::io::Write;

/// Writes `claims` to `writer` as one line of compact JSON.
///
/// Keys are written in sorted order, so the same claims always produce the
/// same line. The line is serialized before anything is written: on error,
/// `writer` receives no partial output.
pub fn write_claims<W: Write>(mut writer: W, claims: &Claims) -> Result<()> {
    let line = serde_json::to_string(claims).map_err(Error::serialization)?;
    writeln!(writer, "{line}").map_err(Error::serialization)?;
    writer.flush().map_err(Error::serialization)
}
