//! AWS access layer
//!
//! - [`session::AwsClients`] - STS, S3 and Secrets Manager clients for one profile
//! - [`api`] - the service seams the phases are written against
//! - [`profiles::ProfileCatalog`] - shared config file inspection
//! - [`types`] - identity, object and secret descriptors

pub mod api;
pub mod profiles;
pub mod session;
pub mod types;

pub use api::{IdentityApi, ObjectStoreApi, SecretsApi};
pub use profiles::{ProfileCatalog, ProfileKind, ProfileStatus};
pub use session::{AwsClients, SessionConfig};
pub use types::{BucketObject, CallerIdentity, Page, SecretDescriptor, SecretValue};
