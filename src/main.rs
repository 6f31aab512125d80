use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use steergen::cli::{self, Cli, Commands};
use steergen::clients::{FalClient, GoodfireClient, SupabaseClient};
use steergen::config::Config;
use steergen::features::FeatureManager;
use steergen::pipeline::{self, GenerateParams};
use steergen::storage::StorageManager;

/// One ANSI layer on stderr and one plain layer appending to `app.log`.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("app.log")
        .context("opening app.log failed")?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(level),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file))
                .with_filter(level),
        )
        .init();
    Ok(())
}

fn usage_error(err: &steergen::error::ValidationError) -> ! {
    eprintln!("{} {err}", style("usage error:").red().bold());
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    let parsed = Cli::parse();

    match parsed.command {
        Commands::Generate {
            concept,
            feature,
            variations,
            min_strength,
            max_strength,
            feature_index,
            verbose,
        } => {
            if let Err(err) = cli::validate_sweep(min_strength, max_strength, variations)
                .and_then(|()| cli::validate_feature_index(feature_index))
            {
                usage_error(&err);
            }
            init_logging(verbose)?;

            let config = Config::load()?;
            let goodfire = GoodfireClient::new(&config.goodfire_base_url, &config.goodfire_api_key);
            let fal = FalClient::new(&config.fal_base_url, &config.fal_key);
            let supabase = SupabaseClient::new(&config.supabase_url, &config.supabase_service_key);

            let features = FeatureManager::new(&goodfire, &supabase);
            let storage = StorageManager::new(&supabase);

            let params = GenerateParams {
                concept,
                feature_input: feature,
                variations,
                min_strength,
                max_strength,
                feature_index,
                verbose,
            };
            pipeline::run_generate(&goodfire, &fal, &features, &storage, &params).await
        }

        Commands::ListFeatures {
            feature_input,
            verbose,
        } => {
            init_logging(verbose)?;

            let config = Config::load()?;
            let goodfire = GoodfireClient::new(&config.goodfire_base_url, &config.goodfire_api_key);
            let supabase = SupabaseClient::new(&config.supabase_url, &config.supabase_service_key);

            let features = FeatureManager::new(&goodfire, &supabase);
            pipeline::run_list_features(&features, &feature_input, verbose).await
        }
    }
}
