//! Pictor CLI: run the upload pipeline against the configured store.
//!
//! Configuration comes from the environment (or `.env`): STORAGE_BACKEND,
//! S3_BUCKET / S3_REGION or LOCAL_STORAGE_PATH / LOCAL_STORAGE_BASE_URL,
//! IMAGE_SIZES, SCRATCH_DIR and friends.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pictor_cli::{build_metadata, default_hash, extension_of, init_tracing, mime_for_extension};
use pictor_core::{AssetDescriptor, Config};
use pictor_processing::{MediaProvider, UploadOptions};
use serde::Serialize;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pictor", about = "Media asset upload pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and all of its size variants
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
        /// Asset hash (defaults to the file stem plus a random suffix)
        #[arg(long)]
        hash: Option<String>,
        /// Key prefix for every variant
        #[arg(long)]
        custom_path: Option<String>,
        /// Comma-separated subset of configured sizes
        #[arg(long, value_delimiter = ',')]
        sizes: Vec<String>,
        /// Content type (guessed from the extension otherwise)
        #[arg(long)]
        mime: Option<String>,
        /// Abort the upload after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Delete every variant of a stored asset
    Delete {
        /// Asset hash
        #[arg(long)]
        hash: String,
        /// Extension including the leading dot
        #[arg(long)]
        ext: String,
        /// Content type
        #[arg(long, default_value = "application/octet-stream")]
        mime: String,
        /// Provider metadata returned by `upload`, as JSON
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Print the keys an asset maps to without touching storage
    Plan {
        /// Asset hash
        #[arg(long)]
        hash: String,
        /// Extension including the leading dot
        #[arg(long)]
        ext: String,
        /// Key prefix for every variant
        #[arg(long)]
        custom_path: Option<String>,
        /// Comma-separated subset of configured sizes
        #[arg(long, value_delimiter = ',')]
        sizes: Vec<String>,
    },
}

#[derive(Serialize)]
struct UploadOutput<'a> {
    hash: &'a str,
    url: Option<&'a str>,
    formats: &'a std::collections::BTreeMap<String, String>,
    provider_metadata: Option<&'a serde_json::Value>,
    variants: &'a [pictor_processing::StoredVariant],
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Load configuration")?;

    match cli.command {
        Commands::Upload {
            file,
            hash,
            custom_path,
            sizes,
            mime,
            timeout_secs,
        } => {
            let ext = extension_of(&file);
            let hash = hash.unwrap_or_else(|| default_hash(&file));
            let mime = mime.unwrap_or_else(|| mime_for_extension(&ext).to_string());
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let handle = tokio::fs::File::open(&file)
                .await
                .with_context(|| format!("Open {}", file.display()))?;

            let mut descriptor = AssetDescriptor::new(hash, ext, mime)
                .with_name(name)
                .with_stream(handle);
            if let Some(raw) = build_metadata(custom_path.as_deref(), &sizes) {
                descriptor = descriptor.with_path(raw);
            }

            let provider = MediaProvider::from_config(config)
                .await
                .context("Initialize pipeline")?;
            let options = UploadOptions {
                deadline: timeout_secs.map(Duration::from_secs),
            };
            let report = provider
                .upload_stream(&mut descriptor, options)
                .await
                .context("Upload failed")?;

            tracing::info!(hash = %descriptor.hash, variants = report.variants.len(), "Done");
            print_json(&UploadOutput {
                hash: &descriptor.hash,
                url: descriptor.url.as_deref(),
                formats: &descriptor.formats,
                provider_metadata: descriptor.provider_metadata.as_ref(),
                variants: &report.variants,
            })?;
        }
        Commands::Delete {
            hash,
            ext,
            mime,
            metadata,
        } => {
            let mut descriptor = AssetDescriptor::new(hash, ext, mime);
            if let Some(raw) = metadata {
                let value: serde_json::Value =
                    serde_json::from_str(&raw).context("Parse --metadata as JSON")?;
                descriptor = descriptor.with_provider_metadata(value);
            }

            let provider = MediaProvider::from_config(config)
                .await
                .context("Initialize pipeline")?;
            let report = provider.delete(&descriptor).await.context("Delete failed")?;
            print_json(&report)?;
            if !report.is_complete() {
                anyhow::bail!("{} key(s) could not be deleted", report.failed().count());
            }
        }
        Commands::Plan {
            hash,
            ext,
            custom_path,
            sizes,
        } => {
            let mime = mime_for_extension(&ext);
            let mut descriptor = AssetDescriptor::new(hash, ext, mime);
            if let Some(raw) = build_metadata(custom_path.as_deref(), &sizes) {
                descriptor = descriptor.with_path(raw);
            }

            config.validate_pipeline().context("Invalid configuration")?;
            let plan = pictor_processing::plan_variants(
                &descriptor,
                pictor_processing::validate_descriptor(&descriptor, false)?,
                config.image_sizes(),
                &pictor_core::Customization::from_raw(descriptor.path.as_deref()),
                config.size_selection(),
            );
            print_json(&plan)?;
        }
    }

    Ok(())
}
