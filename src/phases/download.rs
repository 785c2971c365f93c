//! Bucket mirror
//!
//! Lists every object in a bucket (following continuation tokens) and streams
//! each one to `<output_dir>/<bucket>/<key>`, creating directories as needed.
//! Keys that would resolve outside the bucket directory are skipped.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use aws_sdk_s3::primitives::ByteStream;
use tokio::io::AsyncWriteExt;

use crate::aws::{BucketObject, ObjectStoreApi};
use crate::console::{Console, Marker};
use crate::error::{EnumError, Result};

/// A file written to disk
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub key: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// What the download phase did
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub bucket: String,
    /// `<output_dir>/<bucket>`
    pub root: PathBuf,
    pub listed: usize,
    pub files: Vec<DownloadedFile>,
    pub folders: usize,
    /// Keys refused because they would escape `root`
    pub skipped: Vec<String>,
}

impl DownloadReport {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

/// List every object in the bucket, one page at a time
pub async fn list_all_objects(api: &dyn ObjectStoreApi, bucket: &str) -> Result<Vec<BucketObject>> {
    let mut objects = Vec::new();
    let mut token = None;

    loop {
        let page = api.list_objects_page(bucket, token.take()).await?;
        tracing::debug!(
            "Listed {} object(s) from {} (more: {})",
            page.items.len(),
            bucket,
            page.next_token.is_some()
        );
        objects.extend(page.items);

        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    Ok(objects)
}

/// `key` with empty and `.` segments dropped, or `None` if the key is empty,
/// absolute or climbs out with `..`
pub fn normalized_key(key: &str) -> Option<String> {
    if key.starts_with('/') {
        return None;
    }

    let mut parts = Vec::new();
    for part in key.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        let mut components = Path::new(part).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => parts.push(part),
            _ => return None,
        }
    }

    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Mirror every object of `bucket` under `output_dir`
pub async fn download_bucket<W: Write>(
    api: &dyn ObjectStoreApi,
    bucket: &str,
    output_dir: &Path,
    console: &mut Console<W>,
) -> Result<DownloadReport> {
    console.heading("S3 Bucket Download")?;

    let objects = list_all_objects(api, bucket).await?;
    let mut report = DownloadReport {
        bucket: bucket.to_string(),
        root: output_dir.join(bucket),
        listed: objects.len(),
        ..Default::default()
    };

    if objects.is_empty() {
        console.marked(Marker::Notice, format!("No files found in bucket: {}", bucket))?;
        return Ok(report);
    }

    let count = console.bold(objects.len());
    console.marked(
        Marker::Info,
        format!("Found {} file(s) in bucket: '{}'", count, bucket),
    )?;
    console.blank()?;

    let total = objects.len();
    for (index, object) in objects.iter().enumerate() {
        let Some(relative) = normalized_key(&object.key) else {
            tracing::debug!("Skipping object with unsafe key {:?}", object.key);
            console.marked(
                Marker::Failure,
                format!("Skipping unsafe object key: {:?}", object.key),
            )?;
            report.skipped.push(object.key.clone());
            continue;
        };
        if relative != object.key.trim_end_matches('/') {
            tracing::debug!("Object key {:?} stored as {:?}", object.key, relative);
        }
        let path = relative
            .split('/')
            .fold(report.root.clone(), |path, part| path.join(part));

        if object.is_folder_marker() {
            tokio::fs::create_dir_all(&path)
                .await
                .map_err(|e| EnumError::io(&path, e))?;
            report.folders += 1;
            continue;
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EnumError::io(parent, e))?;
        }

        let bytes = write_object(api, bucket, &object.key, &path).await?;
        tracing::debug!(
            "[{}/{}] {} -> {:?} ({}, modified {})",
            index + 1,
            total,
            object.key,
            path,
            object.size_string(),
            object
                .last_modified
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string())
        );

        report.files.push(DownloadedFile {
            key: object.key.clone(),
            path,
            bytes,
        });
    }

    tracing::info!(
        "Downloaded {} file(s), {} byte(s) from {}",
        report.files.len(),
        report.total_bytes(),
        bucket
    );
    if report.skipped.is_empty() {
        console.marked(
            Marker::Success,
            format!(
                "Created directory '{}' and downloaded all files inside!",
                report.root.display()
            ),
        )?;
    } else {
        console.marked(
            Marker::Notice,
            format!(
                "Downloaded {} of {} object(s) into '{}'; skipped {} unsafe key(s)",
                report.files.len(),
                report.listed,
                report.root.display(),
                report.skipped.len()
            ),
        )?;
    }

    Ok(report)
}

/// Stream one object body into `path`; the file is closed on return and
/// removed again if the body cannot be written in full
async fn write_object(
    api: &dyn ObjectStoreApi,
    bucket: &str,
    key: &str,
    path: &Path,
) -> Result<u64> {
    let body = api.object_body(bucket, key).await?;
    let file = tokio::fs::File::create(path)
        .await
        .map_err(|e| EnumError::io(path, e))?;

    match stream_body(body, file, bucket, key, path).await {
        Ok(written) => Ok(written),
        Err(err) => {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::debug!("Could not remove partial file {:?}: {}", path, e);
            }
            Err(err)
        }
    }
}

async fn stream_body(
    mut body: ByteStream,
    mut file: tokio::fs::File,
    bucket: &str,
    key: &str,
    path: &Path,
) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = body.try_next().await.map_err(|e| EnumError::Download {
        bucket: bucket.to_string(),
        key: key.to_string(),
        message: e.to_string(),
    })? {
        file.write_all(&chunk)
            .await
            .map_err(|e| EnumError::io(path, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| EnumError::io(path, e))?;
    Ok(written)
}
