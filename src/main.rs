//! s3-secrets-enum
//!
//! Prints the caller identity of an AWS profile, downloads a bucket and dumps
//! readable Secrets Manager secrets.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use s3_secrets_enum::aws::AwsClients;
use s3_secrets_enum::cli::Args;
use s3_secrets_enum::console::Console;
use s3_secrets_enum::{runner, Services};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for the report
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Starting s3-secrets-enum v{}", env!("CARGO_PKG_VERSION"));

    let config = args.into_config();
    let clients = AwsClients::connect(&config.session_config()).await;
    let mut console = Console::stdout(config.color);

    let summary = runner::run(Services::from_clients(&clients), &config, &mut console)
        .await
        .with_context(|| format!("enumeration with profile '{}' aborted", config.profile))?;

    if !summary.is_clean() {
        anyhow::bail!("{} phase(s) failed", summary.failures.len());
    }

    Ok(())
}
