//! Tile Publish - CI entry point
//!
//! The `tile-publish` command publishes the tile in a directory to the
//! registry unless its version is already there, optionally gating the upload
//! on a `tessl skill review` of every skill it contains.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tessl_registry::{GithubEnvOidc, RegistryClient, RegistryConfig, DEFAULT_API_URL};
use tile_ci::{
    PublishOutcome, PublishPipeline, ReviewSettings, TesslReviewer, DEFAULT_REVIEWER,
    INSTALL_SCRIPT,
};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "tile-publish")]
#[command(author = "Tessl Labs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Publish a tile to the Tessl registry", long_about = None)]
struct Cli {
    /// Tile directory containing tile.json
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Registry API token
    #[arg(long, env = "TESSL_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Registry base URL
    #[arg(long, env = "TESSL_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Review every skill before publishing and fail below the threshold
    #[arg(long, env = "TESSL_REVIEW")]
    review: bool,

    /// Minimum passing review score, 0-100
    #[arg(long, env = "TESSL_REVIEW_THRESHOLD")]
    review_threshold: Option<String>,

    /// Let the reviewer rewrite skills to improve their score
    #[arg(long)]
    optimize: bool,

    /// Optimisation rounds, 1-10
    #[arg(long, env = "TESSL_MAX_ITERATIONS")]
    max_iterations: Option<String>,

    /// Reviewer executable
    #[arg(long, default_value = DEFAULT_REVIEWER)]
    reviewer: String,

    /// Do not install the reviewer CLI when it is missing
    #[arg(long)]
    skip_install: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn api_token(&self) -> Result<&str> {
        match self.api_token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => bail!("TESSL_API_TOKEN environment variable is required"),
        }
    }

    fn review_settings(&self) -> Result<ReviewSettings> {
        Ok(ReviewSettings::from_inputs(
            self.review_threshold.as_deref(),
            self.optimize,
            self.max_iterations.as_deref(),
        )?)
    }

    /// The reviewer installs itself on first use unless `--skip-install`.
    fn reviewer(&self, settings: ReviewSettings) -> TesslReviewer {
        let reviewer = TesslReviewer::with_tool(&self.reviewer, settings);
        if self.skip_install {
            reviewer
        } else {
            reviewer.with_install(INSTALL_SCRIPT)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tile_core::init_tracing(cli.json, level);

    // Validate inputs before touching the network
    let api_token = cli.api_token()?;
    let settings = cli.review_settings()?;

    let registry = RegistryClient::new(RegistryConfig::new(&cli.api_url).with_token(api_token))?;
    let mut pipeline = PublishPipeline::new(Arc::new(registry), Arc::new(GithubEnvOidc), api_token);

    if cli.review {
        pipeline = pipeline.with_reviewer(Arc::new(cli.reviewer(settings)));
    }

    let outcome = pipeline.run(&cli.path).await?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &PublishOutcome) {
    match outcome {
        PublishOutcome::AlreadyPublished { tile, version } => {
            println!("Version {} of {} is already published, skipping", version, tile);
        }
        PublishOutcome::Published {
            tile,
            version,
            archive_bytes,
            archive_digest,
            reviews,
        } => {
            println!("Published {}@{}", tile, version);
            println!("Archive: {} bytes (sha256 {})", archive_bytes, archive_digest);
            if !reviews.is_empty() {
                println!("Reviewed {} skill(s)", reviews.len());
            }
        }
    }
}
