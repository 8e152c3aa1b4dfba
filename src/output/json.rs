//! JSON output formatting
//!
//! Every JSON result is wrapped as `{ "data": ..., "meta": {...} }` so scripts
//! can rely on one envelope regardless of the command.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Envelope written for `--format json`
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub data: Value,
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// When the output was produced, RFC 3339 UTC
    pub timestamp: String,

    /// teamrate version
    pub version: String,

    /// Number of items when `data` is a list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl JsonOutput {
    pub fn new(data: Value) -> Self {
        let count = data.as_array().map(Vec::len);
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                version: env!("CARGO_PKG_VERSION").to_string(),
                count,
            },
        }
    }
}

/// Wrap `data` in the envelope and pretty-print it
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    let output = JsonOutput::new(serde_json::to_value(data)?);
    serde_json::to_string_pretty(&output)
}
