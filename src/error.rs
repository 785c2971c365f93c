//! Error types for the enumeration run

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while enumerating an account.
///
/// Everything except [`EnumError::GetSecret`] is fatal for the phase that
/// raised it. Secret value fetch failures are caught by the secrets phase and
/// reported per secret.
#[derive(Debug, Error)]
pub enum EnumError {
    #[error("sts:GetCallerIdentity failed: {0}")]
    Identity(String),

    #[error("failed to list objects in bucket '{bucket}': {message}")]
    ListObjects { bucket: String, message: String },

    #[error("failed to download s3://{bucket}/{key}: {message}")]
    Download {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list secrets: {0}")]
    ListSecrets(String),

    #[error("{message}")]
    GetSecret { secret_id: String, message: String },

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl EnumError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EnumError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EnumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_secret_displays_bare_message() {
        let err = EnumError::GetSecret {
            secret_id: "prod/db".to_string(),
            message: "AccessDeniedException: not authorized".to_string(),
        };
        assert_eq!(err.to_string(), "AccessDeniedException: not authorized");
    }

    #[test]
    fn test_download_error_names_object() {
        let err = EnumError::Download {
            bucket: "data".to_string(),
            key: "a/b.txt".to_string(),
            message: "NoSuchKey".to_string(),
        };
        assert_eq!(err.to_string(), "failed to download s3://data/a/b.txt: NoSuchKey");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = EnumError::io(
            "out/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("out/x"));
    }
}
