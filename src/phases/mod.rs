//! The three enumeration phases, in the order the runner executes them

pub mod download;
pub mod identity;
pub mod secrets;

pub use download::{download_bucket, DownloadReport, DownloadedFile};
pub use identity::report_identity;
pub use secrets::{enumerate_secrets, SecretOutcome, SecretResult, SecretsReport};
