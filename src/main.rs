use clap::Parser;
use link_builder::errors::Result;
use link_builder::{HttpPreviewer, PipelineConfig, import, previews};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    ::log::info!("Starting the URL processor");

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = run(&args, &config).await;

    if let Err(e) = result {
        ::log::error!("Run failed: {}", e);
        std::process::exit(1);
    }

    ::log::info!("URL processor completed successfully");
}

/// Assembles the pipeline configuration: config file values first, then
/// the IMPORT_IGNORE environment variable, then command-line flags.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    config.apply_env();
    if let Some(pattern) = &args.ignore {
        config.ignore_pattern = Some(pattern.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }
    config.validate_head |= args.validate_head;
    Ok(config)
}

async fn run(args: &Args, config: &PipelineConfig) -> Result<()> {
    if args.generate_previews {
        let mut previewer = HttpPreviewer::new();
        previews::generate_link_previews(&args.preview_input, &args.preview_output, &mut previewer)
            .await?;
    } else {
        import::process_import(&args.import_input, &args.import_output, config).await?;
    }
    Ok(())
}
