use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "link-builder")]
#[command(about = "Extracts, validates, and enriches URLs from a chat export")]
#[command(version)]
pub struct Args {
    /// Path to the chat export JSON document
    #[arg(long, default_value = "import/export.json")]
    pub import_input: PathBuf,

    /// Path for the filtered URL list
    #[arg(long, default_value = "dist/urls.json")]
    pub import_output: PathBuf,

    /// Path to the URL list to generate previews for
    #[arg(long, default_value = "dist/urls.json")]
    pub preview_input: PathBuf,

    /// Path for the generated previews
    #[arg(long, default_value = "dist/previews.json")]
    pub preview_output: PathBuf,

    /// Generate link previews instead of importing URLs
    #[arg(long, default_value_t = false)]
    pub generate_previews: bool,

    /// Issue HEAD requests to check URL liveness during validation
    #[arg(long, default_value_t = false)]
    pub validate_head: bool,

    /// Number of concurrent validator workers
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Regex for URLs to exclude from validation (overrides IMPORT_IGNORE)
    #[arg(long)]
    pub ignore: Option<String>,

    /// Optional JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
