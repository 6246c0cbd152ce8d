//! Signature snapshot refresh.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Signature-repository port: make a current local snapshot available before
/// a scan. Must be idempotent; the snapshot is reused across invocations in
/// the same execution environment and may be absent on cold start.
#[async_trait]
pub trait SignatureSource: Send + Sync {
    /// Ensure local signatures are current; returns the snapshot directory.
    async fn ensure_signatures(&self) -> Result<PathBuf>;
}

/// Syncs scanner signature files from an S3 prefix into a local directory.
///
/// A file already present with a matching size is left alone. Downloads go to
/// a dotted temp name in the destination directory and are renamed into
/// place, so a concurrent reader never observes a partial snapshot.
pub struct S3SignatureSource {
    client: s3::Client,
    bucket: String,
    prefix: String,
    local_dir: PathBuf,
}

impl S3SignatureSource {
    pub fn new(
        client: s3::Client,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        local_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
            local_dir: local_dir.into(),
        }
    }

    /// Returns whether the key contributed a snapshot file (freshly
    /// downloaded or verified current). Directory placeholder objects carry
    /// no signature data and report `false`.
    async fn sync_one(&self, key: &str, remote_size: Option<i64>) -> Result<bool> {
        let Some(name) = snapshot_file_name(key) else {
            return Ok(false);
        };

        let dest = self.local_dir.join(name);
        if let (Some(remote), Ok(meta)) = (remote_size, tokio::fs::metadata(&dest).await) {
            if meta.len() as i64 == remote {
                debug!("signature file {} is current, skipping", name);
                return Ok(true);
            }
        }

        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("failed to fetch signature object {key}"))?;

        let tmp = self.local_dir.join(format!(".{name}.partial"));
        let mut reader = resp.body.into_async_read();
        let file = tokio::fs::File::create(&tmp)
            .await
            .with_context(|| format!("failed to create {}", tmp.display()))?;
        let mut writer = tokio::io::BufWriter::new(file);
        tokio::io::copy(&mut reader, &mut writer)
            .await
            .with_context(|| format!("transfer of signature object {key} aborted"))?;
        writer.flush().await.context("failed to flush signature file")?;

        // Same-directory rename: readers see either the old file or the new
        // one, never a partial write.
        tokio::fs::rename(&tmp, &dest)
            .await
            .with_context(|| format!("failed to move signature file {name} into place"))?;
        info!("refreshed signature file {}", name);
        Ok(true)
    }
}

#[async_trait]
impl SignatureSource for S3SignatureSource {
    async fn ensure_signatures(&self) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.local_dir)
            .await
            .with_context(|| {
                format!("failed to create signature directory {}", self.local_dir.display())
            })?;

        let mut synced = 0usize;
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&self.prefix)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.with_context(|| {
                format!(
                    "failed to list signature objects under s3://{}/{}",
                    self.bucket, self.prefix
                )
            })?;
            for item in page.contents() {
                let Some(key) = item.key() else { continue };
                if self.sync_one(key, item.size()).await? {
                    synced += 1;
                }
            }
        }

        if synced == 0 {
            bail!(
                "no signature objects found under s3://{}/{}",
                self.bucket,
                self.prefix
            );
        }
        Ok(self.local_dir.clone())
    }
}

/// Local file name for a signature object; `None` for prefix placeholders.
fn snapshot_file_name(key: &str) -> Option<&str> {
    match key.rsplit('/').next().unwrap_or(key) {
        "" => None,
        name => Some(name),
    }
}
