//! Object store port and the S3 adapter.

use crate::object::ObjectRef;
use crate::verdict::{ScanVerdict, SCAN_STATUS_TAG_KEY};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::types::{Tag, Tagging};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Store-facing port: metadata, content and tag writes for one object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Object size in bytes, from metadata only (no content transfer).
    async fn object_size(&self, object: &ObjectRef) -> Result<i64>;

    /// Stream the object's bytes to `dest`. Returns only after the full
    /// stream has been flushed to local storage.
    async fn download(&self, object: &ObjectRef, dest: &Path) -> Result<()>;

    /// Write the verdict tag set onto the object's metadata.
    async fn put_scan_tag(&self, object: &ObjectRef, verdict: ScanVerdict) -> Result<()>;
}

/// S3-backed store adapter.
pub struct S3ObjectStore {
    client: s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn object_size(&self, object: &ObjectRef) -> Result<i64> {
        let head = self
            .client
            .head_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .with_context(|| format!("HeadObject failed for {object}"))?;
        head.content_length()
            .with_context(|| format!("HeadObject returned no content length for {object}"))
    }

    async fn download(&self, object: &ObjectRef, dest: &Path) -> Result<()> {
        debug!("downloading {} to {}", object, dest.display());
        let resp = self
            .client
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .with_context(|| format!("GetObject failed for {object}"))?;

        let mut reader = resp.body.into_async_read();
        let file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("failed to create staging file {}", dest.display()))?;
        let mut writer = tokio::io::BufWriter::new(file);
        tokio::io::copy(&mut reader, &mut writer)
            .await
            .with_context(|| format!("stream from {object} aborted"))?;
        writer
            .flush()
            .await
            .with_context(|| format!("failed to flush staging file {}", dest.display()))?;
        debug!("finished downloading {}", object);
        Ok(())
    }

    async fn put_scan_tag(&self, object: &ObjectRef, verdict: ScanVerdict) -> Result<()> {
        let tag = Tag::builder()
            .key(SCAN_STATUS_TAG_KEY)
            .value(verdict.as_str())
            .build()
            .context("failed to build verdict tag")?;
        let tagging = Tagging::builder()
            .tag_set(tag)
            .build()
            .context("failed to build verdict tag set")?;
        self.client
            .put_object_tagging()
            .bucket(&object.bucket)
            .key(&object.key)
            .tagging(tagging)
            .send()
            .await
            .with_context(|| format!("PutObjectTagging failed for {object}"))?;
        Ok(())
    }
}
