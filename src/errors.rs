use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline errors. Per-URL conditions (a bad URL, a failed fetch)
/// are absorbed at the stage that sees them and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file exists but does not parse as the expected JSON shape.
    #[error("failed to parse JSON from {}: {source}", path.display())]
    InputJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An existing preview output file parses as neither a URL->preview
    /// mapping nor the known output array shape.
    #[error("cache file {} is neither a preview mapping nor a preview array", path.display())]
    CacheCorrupt { path: PathBuf },

    /// The generator ran to completion but produced zero usable previews.
    #[error("no valid previews generated")]
    NoValidPreviews,

    /// The configured ignore pattern does not compile.
    #[error("failed to compile ignore pattern {pattern:?}: {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Per-URL failure from a previewer. Recovered locally by the generator:
/// logged, the item skipped, the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("{0}")]
    Other(String),
}
