//! post-metadata CLI
//!
//! Applies the changeset in `<OUTPUT_DIR>/changeset.json` to the dataset of
//! the given integration.
//!
//! Usage:
//!   post-metadata                       # everything from the environment
//!   post-metadata --integration-id ID   # flags override the environment

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metadata_client::HttpClient;
use post_metadata::config::{self, ProcessorConfig};
use post_metadata::{ApplySummary, MetadataPostProcessor};

#[derive(Parser, Debug)]
#[command(name = "post-metadata")]
#[command(about = "Apply a metadata changeset to a dataset")]
struct Args {
    /// Integration that started this run
    #[arg(long, env = config::INTEGRATION_ID)]
    integration_id: String,

    /// Input directory of the integration
    #[arg(long, env = config::INPUT_DIR)]
    input_dir: PathBuf,

    /// Output directory holding changeset.json
    #[arg(long, env = config::OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Session token sent as a bearer token
    #[arg(long, env = config::SESSION_TOKEN, hide_env_values = true)]
    session_token: String,

    /// Metadata service host
    #[arg(long, env = config::API_HOST)]
    api_host: String,

    /// Host of the integration service
    #[arg(long, env = config::API2_HOST)]
    api2_host: String,

    /// Request timeout in seconds
    #[arg(long, env = config::HTTP_TIMEOUT_SECS, default_value = "30", value_parser = config::parse_timeout)]
    http_timeout_secs: std::time::Duration,
}

impl Args {
    fn into_config(self) -> Result<ProcessorConfig, config::ConfigError> {
        let config = ProcessorConfig {
            integration_id: self.integration_id,
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            session_token: self.session_token,
            api_host: self.api_host,
            api2_host: self.api2_host,
            http_timeout: self.http_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "post_metadata=info,metadata_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            tracing::info!(
                models_created = summary.models_created,
                models_deleted = summary.models_deleted,
                records_created = summary.records_created,
                records_updated = summary.records_updated,
                records_deleted = summary.records_deleted,
                link_schemas_created = summary.link_schemas_created,
                link_instances_created = summary.link_instances_created,
                link_instances_deleted = summary.link_instances_deleted,
                proxy_schema_created = summary.proxy_schema_created,
                proxy_instances_created = summary.proxy_instances_created,
                proxy_instances_deleted = summary.proxy_instances_deleted,
                "post-metadata finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ApplySummary> {
    let config = args.into_config().context("invalid configuration")?;
    tracing::info!(
        integration_id = %config.integration_id,
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        api_host = %config.api_host,
        "starting post-metadata"
    );

    let client =
        HttpClient::new(config.client_config()).context("failed to build metadata client")?;
    let processor = MetadataPostProcessor::new(Arc::new(client));

    processor
        .run(&config)
        .await
        .with_context(|| format!("failed to apply {}", config.changeset_path().display()))
}
