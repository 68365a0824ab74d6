use thiserror::Error;

/// Why one distribution or one index file could not be scanned.
///
/// None of these abort the whole run, they are collected next to the results.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    #[error("Failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },
    #[error("download({url}): unexpected HTTP status code: got {status}, want 200")]
    UnexpectedStatus { url: String, status: u16 },
    #[error("Release manifest not found for distribution {dist}")]
    ManifestNotFound { dist: String },
    #[error("Mirror returned internal error {status} for release manifest of {dist}")]
    MirrorInternal { dist: String, status: u16 },
    #[error("Malformed release manifest for distribution {dist}: {reason}")]
    ManifestParse { dist: String, reason: String },
    #[error("Failed to decompress {url}: {reason}")]
    Decompression { url: String, reason: String },
    #[error("Checksum mismatch for {url}. Mirror may be syncing, try again later.")]
    ChecksumMismatch { url: String },
    #[error("Malformed package index {url}: {reason}")]
    IndexParse { url: String, reason: String },
    #[error("Cannot build URL from {base} and {path}")]
    UrlConstruction { base: String, path: String },
    #[error("Cancelled while fetching {url}")]
    Cancelled { url: String },
    #[error("Worker for {what} crashed: {reason}")]
    Crashed { what: String, reason: String },
}

impl FetchError {
    pub fn transport(url: &str, e: impl std::fmt::Display) -> Self {
        FetchError::Transport {
            url: url.to_owned(),
            reason: e.to_string(),
        }
    }

    pub fn crashed(what: &str, e: impl std::fmt::Display) -> Self {
        FetchError::Crashed {
            what: what.to_owned(),
            reason: e.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled { .. })
    }
}
