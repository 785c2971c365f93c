//! AWS data types returned by the service seams

use aws_sdk_s3::primitives::DateTime as SdkDateTime;
use chrono::{DateTime, Utc};

/// Result of sts:GetCallerIdentity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub account: String,
    pub arn: String,
}

/// One entry of a ListObjectsV2 listing
#[derive(Debug, Clone)]
pub struct BucketObject {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl BucketObject {
    /// Create an object descriptor with only a key and size
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
        }
    }

    /// Zero-byte "folder" placeholders created by the console end in `/`
    pub fn is_folder_marker(&self) -> bool {
        self.key.ends_with('/')
    }

    /// Get a human-readable size string
    pub fn size_string(&self) -> String {
        human_size(self.size)
    }
}

/// Format a byte count with binary units
pub fn human_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if size >= TB {
        format!("{:.2} TB", size as f64 / TB as f64)
    } else if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

/// Metadata from a ListSecrets entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretDescriptor {
    pub name: String,
    pub arn: String,
    pub description: Option<String>,
}

impl SecretDescriptor {
    pub fn new(name: impl Into<String>, arn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arn: arn.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Current value of a secret as returned by GetSecretValue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    Text(String),
    /// Only `SecretBinary` is set; holds the payload length
    Binary(usize),
    Empty,
}

impl SecretValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SecretValue::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    pub fn with_next(items: Vec<T>, token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(token.into()),
        }
    }
}

/// Convert an SDK timestamp into chrono
pub(crate) fn to_chrono(d: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(d.secs(), d.subsec_nanos())
}
