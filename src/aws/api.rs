//! Service seams used by the enumeration phases
//!
//! Each trait covers the calls one phase makes. [`crate::aws::AwsClients`]
//! implements all three against the real SDK clients; tests use the
//! generated `Mock*` types.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use mockall::automock;

use crate::aws::types::{BucketObject, CallerIdentity, Page, SecretDescriptor, SecretValue};
use crate::error::Result;

/// Caller identity lookup (STS)
#[automock]
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn caller_identity(&self) -> Result<CallerIdentity>;
}

/// Bucket listing and object download (S3)
#[automock]
#[async_trait]
pub trait ObjectStoreApi: Send + Sync {
    /// Fetch one ListObjectsV2 page, continuing from `continuation_token`
    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<Page<BucketObject>>;

    /// Open the body of an object for streaming
    async fn object_body(&self, bucket: &str, key: &str) -> Result<ByteStream>;
}

/// Secret listing and value retrieval (Secrets Manager)
#[automock]
#[async_trait]
pub trait SecretsApi: Send + Sync {
    /// Fetch one ListSecrets page, continuing from `next_token`
    async fn list_secrets_page(&self, next_token: Option<String>) -> Result<Page<SecretDescriptor>>;

    async fn secret_value(&self, secret_id: &str) -> Result<SecretValue>;
}
