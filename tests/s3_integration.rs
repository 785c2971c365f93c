//! Integration tests for the bucket download phase using MinIO via testcontainers
//!
//! These tests require Docker to be running and use the testcontainers crate
//! to spin up a MinIO instance as a real S3 endpoint.
//!
//! Run with: cargo test --test s3_integration
//!
//! Note: Tests are skipped if Docker is not available.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use std::time::Duration;
use tempfile::TempDir;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::minio::MinIO;

use s3_secrets_enum::aws::{AwsClients, ObjectStoreApi};
use s3_secrets_enum::console::Console;
use s3_secrets_enum::phases::download_bucket;
use s3_secrets_enum::EnumError;

/// MinIO default credentials
const MINIO_ACCESS_KEY: &str = "minioadmin";
const MINIO_SECRET_KEY: &str = "minioadmin";

/// Test helper to check if Docker is available
fn docker_available() -> bool {
    std::process::Command::new("docker")
        .arg("info")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Start MinIO and return the container with an SDK config pointing at it
async fn start_minio() -> (ContainerAsync<MinIO>, SdkConfig) {
    let container = MinIO::default()
        .with_env_var("MINIO_ROOT_USER", MINIO_ACCESS_KEY)
        .with_env_var("MINIO_ROOT_PASSWORD", MINIO_SECRET_KEY)
        .start()
        .await
        .expect("Failed to start MinIO container");

    let host = container.get_host().await.expect("Failed to get container host");
    let port = container
        .get_host_port_ipv4(9000)
        .await
        .expect("Failed to get MinIO port");
    let endpoint = format!("http://{}:{}", host, port);

    // Wait for MinIO to be ready
    tokio::time::sleep(Duration::from_secs(2)).await;

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .endpoint_url(endpoint)
        .credentials_provider(Credentials::new(
            MINIO_ACCESS_KEY,
            MINIO_SECRET_KEY,
            None,
            None,
            "minio",
        ))
        .load()
        .await;

    (container, config)
}

/// Raw path-style client used to seed buckets
fn seed_client(config: &SdkConfig) -> aws_sdk_s3::Client {
    let s3_config = aws_sdk_s3::config::Builder::from(config)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}

async fn seed(client: &aws_sdk_s3::Client, bucket: &str, objects: &[(&str, &[u8])]) {
    client
        .create_bucket()
        .bucket(bucket)
        .send()
        .await
        .expect("Failed to create bucket");

    for (key, data) in objects {
        client
            .put_object()
            .bucket(bucket)
            .key(*key)
            .body(data.to_vec().into())
            .send()
            .await
            .expect("Failed to put object");
    }
}

#[tokio::test]
async fn test_download_bucket_mirrors_objects() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, config) = start_minio().await;
    let seed_client = seed_client(&config);
    let large: Vec<u8> = (0..512 * 1024).map(|i| (i % 251) as u8).collect();
    seed(
        &seed_client,
        "example-bucket",
        &[
            ("a.txt", b"alpha".as_slice()),
            ("sub/b.txt", b"bravo".as_slice()),
            ("deep/nested/dir/blob.bin", large.as_slice()),
        ],
    )
    .await;

    let clients = AwsClients::from_sdk_config(&config, true);
    let dir = TempDir::new().unwrap();
    let mut console = Console::new(Vec::new(), false);

    let report = download_bucket(&clients, "example-bucket", dir.path(), &mut console)
        .await
        .expect("Download failed");

    assert_eq!(report.files.len(), 3);
    let root = dir.path().join("example-bucket");
    assert_eq!(std::fs::read(root.join("a.txt")).unwrap(), b"alpha");
    assert_eq!(std::fs::read(root.join("sub/b.txt")).unwrap(), b"bravo");
    assert_eq!(std::fs::read(root.join("deep/nested/dir/blob.bin")).unwrap(), large);

    let out = String::from_utf8(console.into_inner()).unwrap();
    assert!(out.contains("Found 3 file(s) in bucket: 'example-bucket'"));
}

#[tokio::test]
async fn test_empty_bucket_lists_nothing() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, config) = start_minio().await;
    seed(&seed_client(&config), "empty-bucket", &[]).await;

    let clients = AwsClients::from_sdk_config(&config, true);
    let page = clients
        .list_objects_page("empty-bucket", None)
        .await
        .expect("Failed to list objects");
    assert!(page.items.is_empty());
    assert!(page.next_token.is_none());

    let dir = TempDir::new().unwrap();
    let mut console = Console::new(Vec::new(), false);
    download_bucket(&clients, "empty-bucket", dir.path(), &mut console)
        .await
        .expect("Download failed");
    assert!(!dir.path().join("empty-bucket").exists());
}

#[tokio::test]
async fn test_missing_bucket_is_listing_error() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, config) = start_minio().await;
    let clients = AwsClients::from_sdk_config(&config, true);

    let err = clients
        .list_objects_page("no-such-bucket", None)
        .await
        .unwrap_err();

    match err {
        EnumError::ListObjects { bucket, message } => {
            assert_eq!(bucket, "no-such-bucket");
            assert!(message.contains("NoSuchBucket"), "unexpected message: {}", message);
        }
        other => panic!("expected ListObjects error, got {:?}", other),
    }
}
