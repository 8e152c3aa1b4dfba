//! Logo argument handling
//!
//! A logo is either a URL, stored as given, or a local image inlined into the
//! team record as a base64 `data:` URI.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result, TeamError};

/// Largest logo file accepted
pub const MAX_LOGO_BYTES: u64 = 5 * 1024 * 1024;

/// MIME type for a supported image extension
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn is_url(value: &str) -> bool {
    ["http://", "https://", "data:"]
        .iter()
        .any(|prefix| value.starts_with(prefix))
}

/// Turn a `--logo` argument into the value stored on the team.
pub fn resolve_logo(value: &str) -> Result<String> {
    let value = value.trim();
    if is_url(value) {
        return Ok(value.to_string());
    }

    let path = Path::new(value);
    let mime = mime_for(path).ok_or_else(|| {
        TeamError::InvalidInput(format!(
            "Unsupported logo file {} (use png, jpg, gif, svg or webp)",
            path.display()
        ))
    })?;

    let size = std::fs::metadata(path)
        .map_err(|e| Error::Other(format!("Cannot read logo {}: {}", path.display(), e)))?
        .len();
    if size > MAX_LOGO_BYTES {
        return Err(TeamError::InvalidInput(format!(
            "Logo file is {:.1} MB; the limit is 5 MB",
            size as f64 / (1024.0 * 1024.0)
        ))
        .into());
    }

    let bytes = std::fs::read(path)
        .map_err(|e| Error::Other(format!("Cannot read logo {}: {}", path.display(), e)))?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
