// Re-export modules
pub mod config;
pub mod dedup;
pub mod errors;
pub mod import;
pub mod normalize;
pub mod previews;
pub mod records;
pub mod utils;
pub mod validate;

// Re-export commonly used types for convenience
pub use config::PipelineConfig;
pub use errors::{Error, FetchError, Result};
pub use previews::{HttpPreviewer, LinkPreviewer};
pub use records::{Preview, PreviewOutput, UrlRecord};
pub use validate::ValidationResult;
