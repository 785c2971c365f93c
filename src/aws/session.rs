//! Client bundle for a single credential session

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::primitives::ByteStream;

use crate::aws::api::{IdentityApi, ObjectStoreApi, SecretsApi};
use crate::aws::profiles::{ProfileCatalog, ProfileStatus};
use crate::aws::types::{
    to_chrono, BucketObject, CallerIdentity, Page, SecretDescriptor, SecretValue,
};
use crate::error::{EnumError, Result};

/// Region used when neither the profile nor the command line names one
pub const FALLBACK_REGION: &str = "us-east-1";

/// How to build the session
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub profile: String,
    pub region: Option<String>,
    /// Custom endpoint (LocalStack, MinIO); S3 switches to path-style addressing
    pub endpoint_url: Option<String>,
}

/// STS, S3 and Secrets Manager clients sharing one credential session
#[derive(Debug, Clone)]
pub struct AwsClients {
    sts: aws_sdk_sts::Client,
    s3: aws_sdk_s3::Client,
    secrets: aws_sdk_secretsmanager::Client,
    region: String,
}

impl AwsClients {
    /// Resolve the named profile and create the clients
    pub async fn connect(config: &SessionConfig) -> Self {
        preflight_profile(&config.profile);

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).profile_name(&config.profile);

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let mut sdk_config = loader.load().await;
        if sdk_config.region().is_none() {
            tracing::warn!(
                "Profile '{}' has no region configured, falling back to {}",
                config.profile,
                FALLBACK_REGION
            );
            sdk_config = sdk_config
                .into_builder()
                .region(Region::new(FALLBACK_REGION))
                .build();
        }

        let clients = Self::from_sdk_config(&sdk_config, config.endpoint_url.is_some());
        tracing::info!(
            "Session ready: profile={}, region={}",
            config.profile,
            clients.region()
        );
        clients
    }

    /// Build the clients from an already loaded SDK config
    pub fn from_sdk_config(sdk_config: &SdkConfig, force_path_style: bool) -> Self {
        let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(force_path_style)
            .build();

        Self {
            sts: aws_sdk_sts::Client::new(sdk_config),
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            secrets: aws_sdk_secretsmanager::Client::new(sdk_config),
            region: sdk_config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_else(|| FALLBACK_REGION.to_string()),
        }
    }

    /// Get the resolved region
    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Inspect the shared config files so a typo'd or broken profile is visible
/// before the first call fails. The SDK stays the authority on credentials.
fn preflight_profile(profile: &str) {
    let catalog = match ProfileCatalog::load() {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Could not read AWS shared config files: {}", e);
            return;
        }
    };

    match describe_profile(&catalog, profile) {
        Ok(summary) => tracing::info!("{}", summary),
        Err(problem) => tracing::warn!("{}", problem),
    }
}

/// One-line account of a profile; `Err` when it is missing or misconfigured
fn describe_profile(catalog: &ProfileCatalog, profile: &str) -> std::result::Result<String, String> {
    match catalog.status(profile) {
        ProfileStatus::Missing => {
            let known = catalog.names();
            Err(format!(
                "Profile '{}' not found in ~/.aws/config or ~/.aws/credentials (known profiles: {})",
                profile,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            ))
        }
        ProfileStatus::Invalid { kind, reason } => Err(format!(
            "Profile '{}' ({}) looks misconfigured: {}",
            profile,
            kind.as_str(),
            reason
        )),
        ProfileStatus::Ok { kind } => {
            let region = catalog
                .get(profile)
                .and_then(|entry| entry.region.as_deref())
                .unwrap_or("not set");
            Ok(format!(
                "Using profile '{}' ({}, region {})",
                profile,
                kind.as_str(),
                region
            ))
        }
    }
}

#[async_trait]
impl IdentityApi for AwsClients {
    async fn caller_identity(&self) -> Result<CallerIdentity> {
        let out = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| {
                EnumError::Identity(aws_sdk_sts::error::DisplayErrorContext(&e).to_string())
            })?;

        Ok(CallerIdentity {
            user_id: out.user_id().unwrap_or_default().to_string(),
            account: out.account().unwrap_or_default().to_string(),
            arn: out.arn().unwrap_or_default().to_string(),
        })
    }
}

#[async_trait]
impl ObjectStoreApi for AwsClients {
    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<Page<BucketObject>> {
        let response = self
            .s3
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| EnumError::ListObjects {
                bucket: bucket.to_string(),
                message: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;

        let items = response
            .contents()
            .iter()
            .map(|obj| BucketObject {
                key: obj.key().unwrap_or_default().to_string(),
                size: obj.size().unwrap_or(0).max(0) as u64,
                last_modified: obj.last_modified().and_then(to_chrono),
            })
            .collect();

        Ok(Page {
            items,
            next_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn object_body(&self, bucket: &str, key: &str) -> Result<ByteStream> {
        let response = self
            .s3
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| EnumError::Download {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;

        Ok(response.body)
    }
}

#[async_trait]
impl SecretsApi for AwsClients {
    async fn list_secrets_page(&self, next_token: Option<String>) -> Result<Page<SecretDescriptor>> {
        let response = self
            .secrets
            .list_secrets()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| {
                EnumError::ListSecrets(
                    aws_sdk_secretsmanager::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        let items = response
            .secret_list()
            .iter()
            .map(|entry| SecretDescriptor {
                name: entry.name().unwrap_or_default().to_string(),
                arn: entry.arn().unwrap_or_default().to_string(),
                description: entry.description().map(|s| s.to_string()),
            })
            .collect();

        Ok(Page {
            items,
            next_token: response.next_token().map(|s| s.to_string()),
        })
    }

    async fn secret_value(&self, secret_id: &str) -> Result<SecretValue> {
        let out = self
            .secrets
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| EnumError::GetSecret {
                secret_id: secret_id.to_string(),
                message: aws_sdk_secretsmanager::error::DisplayErrorContext(&e).to_string(),
            })?;

        let value = if let Some(text) = out.secret_string() {
            SecretValue::Text(text.to_string())
        } else if let Some(blob) = out.secret_binary() {
            SecretValue::Binary(blob.as_ref().len())
        } else {
            SecretValue::Empty
        };

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ini::Ini;
    use std::fs;
    use tempfile::TempDir;

    fn catalog(config: &str, credentials: &str) -> ProfileCatalog {
        ProfileCatalog::from_ini(
            &Ini::load_from_str_noescape(config).unwrap(),
            &Ini::load_from_str_noescape(credentials).unwrap(),
        )
    }

    #[test]
    fn test_describe_profile_includes_region() {
        let c = catalog(
            "[profile prod]\nregion = eu-west-2\n",
            "[prod]\naws_access_key_id = AKIA\naws_secret_access_key = s\n",
        );
        assert_eq!(
            describe_profile(&c, "prod").unwrap(),
            "Using profile 'prod' (static credentials, region eu-west-2)"
        );
    }

    #[test]
    fn test_describe_missing_profile_lists_known() {
        let c = catalog(
            "[profile alpha]\nregion = us-west-2\n",
            "[default]\naws_access_key_id = AKIA\naws_secret_access_key = s\n",
        );
        let problem = describe_profile(&c, "prdo").unwrap_err();
        assert!(problem.contains("Profile 'prdo' not found"));
        assert!(problem.ends_with("(known profiles: default, alpha)"));
    }

    #[tokio::test]
    async fn test_region_fallback_and_override() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config");
        let credentials_path = dir.path().join("credentials");
        fs::write(&config_path, "[profile noregion]\noutput = json\n").unwrap();
        fs::write(
            &credentials_path,
            "[noregion]\naws_access_key_id = AKIAEXAMPLE\naws_secret_access_key = secret\n",
        )
        .unwrap();

        std::env::set_var("AWS_CONFIG_FILE", &config_path);
        std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", &credentials_path);
        std::env::set_var("AWS_EC2_METADATA_DISABLED", "true");
        std::env::remove_var("AWS_REGION");
        std::env::remove_var("AWS_DEFAULT_REGION");
        std::env::remove_var("AWS_PROFILE");

        let session = SessionConfig {
            profile: "noregion".to_string(),
            ..Default::default()
        };
        let clients = AwsClients::connect(&session).await;
        assert_eq!(clients.region(), FALLBACK_REGION);

        let session = SessionConfig {
            profile: "noregion".to_string(),
            region: Some("ap-southeast-2".to_string()),
            ..Default::default()
        };
        let clients = AwsClients::connect(&session).await;
        assert_eq!(clients.region(), "ap-southeast-2");
    }
}
