//! The `lister generate` command: photos in, listing draft out.

use clap::Args;
use lister_core::{Config, ListingGenerator, OutputWriter};
use std::path::PathBuf;

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Product image files (only the first few are sent to the model)
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Free-text description of the item to supplement the photos
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Write the draft to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON draft
    #[arg(long)]
    pub pretty: bool,

    /// API key for the configured provider (overrides config and env)
    #[arg(long, env = "LISTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config: Config) -> anyhow::Result<()> {
    // Credential resolution happens here, before any file or network I/O
    let generator = ListingGenerator::from_config(&config, args.api_key.as_deref())?;

    tracing::info!(
        "Generating listing draft from {} image(s) via {}",
        args.images.len(),
        config.llm.provider
    );

    let draft = generator
        .generate_listing(&args.images, &args.description)
        .await?;

    if !draft.is_complete() {
        tracing::warn!("Some fields are degraded; inspect the draft before submitting");
    }

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let mut writer = OutputWriter::new(file, args.pretty);
            writer.write(&draft)?;
            writer.flush()?;
            tracing::info!("Draft written to {}", path.display());
        }
        None => {
            let mut writer = OutputWriter::new(std::io::stdout().lock(), args.pretty);
            writer.write(&draft)?;
            writer.flush()?;
        }
    }

    Ok(())
}
