//! Command line arguments

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::runner::RunConfig;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// AWS CLI profile name
    #[arg(long, value_parser = non_empty)]
    pub profile: String,

    /// S3 bucket to download (e.g. hl-data-download)
    #[arg(long, value_parser = non_empty)]
    pub bucket: String,

    /// Directory to create the bucket folder in (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the profile's region
    #[arg(long)]
    pub region: Option<String>,

    /// Custom endpoint, e.g. LocalStack or MinIO
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Keep running later phases after a phase fails
    #[arg(long)]
    pub keep_going: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// More log output on stderr (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            profile: self.profile,
            bucket: self.bucket,
            output_dir: self.output_dir.unwrap_or_default(),
            region: self.region,
            endpoint_url: self.endpoint_url,
            keep_going: self.keep_going,
            color: !self.no_color,
        }
    }

    /// Default tracing filter when RUST_LOG is not set
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

fn non_empty(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("value must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}
