//! Scan orchestration.
//!
//! One invocation walks a single linear sequence:
//! size check -> {skip | signature sync -> fetch -> scan} -> tag -> notify.
//! The verdict is the sole artifact carried between stages. Tag and notify
//! are best-effort and each independently fault-isolated; a failure there is
//! logged and never alters the returned verdict.

use crate::error::PipelineError;
use crate::notify::Notifier;
use crate::object::ObjectRef;
use crate::scanner::Scanner;
use crate::signatures::SignatureSource;
use crate::staging::StagingDir;
use crate::store::ObjectStore;
use crate::verdict::ScanVerdict;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Pipeline configuration (plain data).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Largest object size eligible for scanning, in bytes.
    pub max_object_bytes: i64,
    /// Root under which per-invocation staging directories are created.
    pub scratch_root: PathBuf,
}

/// Scan orchestrator. One call to [`Pipeline::run`] handles exactly one
/// object; collaborators are injected at construction so tests can substitute
/// fakes for the store, signature source, scanner and notifier.
pub struct Pipeline {
    config: PipelineConfig,
    store: Arc<dyn ObjectStore>,
    signatures: Arc<dyn SignatureSource>,
    scanner: Arc<dyn Scanner>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ObjectStore>,
        signatures: Arc<dyn SignatureSource>,
        scanner: Arc<dyn Scanner>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            store,
            signatures,
            scanner,
            notifier,
        }
    }

    /// Run the gated sequence for one object and return its verdict.
    ///
    /// A failure inside signature sync, fetch or scan produces
    /// `ScanVerdict::Error` and still reaches the tag/notify stages, so
    /// downstream systems learn about the failure instead of being left
    /// silent. A metadata failure in the size check aborts before any side
    /// effect and is returned to the caller.
    pub async fn run(&self, object: &ObjectRef) -> Result<ScanVerdict, PipelineError> {
        let started = Utc::now();
        info!("scan started for {} at {}", object, started.to_rfc3339());

        let verdict = match self.gated_scan(object).await {
            Ok(verdict) => verdict,
            Err(err) if err.failed_before_scan() => {
                error!("{err:#}");
                return Err(err);
            }
            Err(err) => {
                error!("{err:#}");
                ScanVerdict::Error
            }
        };

        self.apply_tag(object, verdict).await;
        self.send_notice(object).await;

        let finished = Utc::now();
        info!(
            "scan finished for {} at {} ({} ms): {}",
            object,
            finished.to_rfc3339(),
            (finished - started).num_milliseconds(),
            verdict
        );
        Ok(verdict)
    }

    /// The verdict-producing portion of the sequence.
    async fn gated_scan(&self, object: &ObjectRef) -> Result<ScanVerdict, PipelineError> {
        let size = self
            .store
            .object_size(object)
            .await
            .map_err(|source| PipelineError::MetadataUnavailable {
                object: object.clone(),
                source,
            })?;

        if size > self.config.max_object_bytes {
            info!(
                "{} is {} bytes, over the {} byte ceiling; skipping scan",
                object, size, self.config.max_object_bytes
            );
            return Ok(ScanVerdict::SkippedTooLarge);
        }

        let signature_dir = self
            .signatures
            .ensure_signatures()
            .await
            .map_err(|source| PipelineError::SignatureSyncFailed { source })?;

        let staging = StagingDir::new(&self.config.scratch_root).map_err(|source| {
            PipelineError::FetchFailed {
                object: object.clone(),
                source,
            }
        })?;
        let target = staging.file_for(object);
        self.store
            .download(object, &target)
            .await
            .map_err(|source| PipelineError::FetchFailed {
                object: object.clone(),
                source,
            })?;

        let outcome = self
            .scanner
            .scan(&target, &signature_dir)
            .await
            .map_err(|source| PipelineError::ScanInvocationFailed {
                object: object.clone(),
                source,
            })?;

        // `staging` drops here; the scratch directory is removed on every
        // exit path, including the error returns above.
        Ok(outcome.into())
    }

    /// Best-effort: a tagging failure never alters the verdict.
    async fn apply_tag(&self, object: &ObjectRef, verdict: ScanVerdict) {
        match self.store.put_scan_tag(object, verdict).await {
            Ok(()) => info!("tagged {} with status {}", object, verdict),
            Err(err) => warn!("failed to tag {}: {err:#}", object),
        }
    }

    /// Best-effort: a delivery failure never alters the verdict and never
    /// escapes the invocation.
    async fn send_notice(&self, object: &ObjectRef) {
        match self.notifier.notify(object).await {
            Ok(()) => info!("completion notice delivered for {}", object),
            Err(err) => warn!("failed to deliver completion notice for {}: {err:#}", object),
        }
    }
}
