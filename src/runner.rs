//! Runs identity, download and secrets phases in sequence

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use crate::aws::{AwsClients, CallerIdentity, IdentityApi, ObjectStoreApi, SecretsApi, SessionConfig};
use crate::console::{Console, Marker, PHASE_RULE};
use crate::error::{EnumError, Result};
use crate::phases::{self, DownloadReport, SecretsReport};

/// Everything one run needs
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub profile: String,
    pub bucket: String,
    /// Directory the `<bucket>/` tree is created in; empty means the working directory
    pub output_dir: PathBuf,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    /// Report a failed phase and carry on with the next one
    pub keep_going: bool,
    pub color: bool,
}

impl RunConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            profile: self.profile.clone(),
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }
}

/// The service handles each phase talks to
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub identity: &'a dyn IdentityApi,
    pub objects: &'a dyn ObjectStoreApi,
    pub secrets: &'a dyn SecretsApi,
}

impl<'a> Services<'a> {
    pub fn from_clients(clients: &'a AwsClients) -> Self {
        Self {
            identity: clients,
            objects: clients,
            secrets: clients,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Identity,
    Download,
    Secrets,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Identity => "identity",
            Phase::Download => "bucket download",
            Phase::Secrets => "secrets enumeration",
        };
        f.write_str(name)
    }
}

/// A phase that failed while `keep_going` was set
#[derive(Debug)]
pub struct PhaseFailure {
    pub phase: Phase,
    pub error: EnumError,
}

/// Results of a completed run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub identity: Option<CallerIdentity>,
    pub download: Option<DownloadReport>,
    pub secrets: Option<SecretsReport>,
    pub failures: Vec<PhaseFailure>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Execute the three phases in order.
///
/// Without `keep_going` the first fatal error is returned and later phases
/// never run. With it, the error is printed, recorded in the summary and the
/// next phase starts. Report write errors always abort.
pub async fn run<W: Write>(
    services: Services<'_>,
    config: &RunConfig,
    console: &mut Console<W>,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    let identity = phases::report_identity(services.identity, console).await;
    summary.identity = settle(Phase::Identity, identity, config, console, &mut summary.failures)?;

    console.rule(PHASE_RULE)?;
    let download = phases::download_bucket(
        services.objects,
        &config.bucket,
        &config.output_dir,
        console,
    )
    .await;
    summary.download = settle(Phase::Download, download, config, console, &mut summary.failures)?;

    console.rule(PHASE_RULE)?;
    let secrets = phases::enumerate_secrets(services.secrets, console).await;
    summary.secrets = settle(Phase::Secrets, secrets, config, console, &mut summary.failures)?;

    console.flush()?;
    Ok(summary)
}

fn settle<T, W: Write>(
    phase: Phase,
    result: Result<T>,
    config: &RunConfig,
    console: &mut Console<W>,
    failures: &mut Vec<PhaseFailure>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error @ EnumError::Output(_)) => Err(error),
        Err(error) if config.keep_going => {
            tracing::warn!("{} phase failed: {}", phase, error);
            console.marked(Marker::Failure, format!("{} phase failed: {}", phase, error))?;
            failures.push(PhaseFailure { phase, error });
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
