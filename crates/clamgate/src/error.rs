//! Pipeline error taxonomy.
//!
//! All four variants are fatal to the scan path and yield an `ERROR` verdict,
//! except `MetadataUnavailable`, which fires before any side effect and
//! aborts the whole invocation. Tagging and notification failures are not in
//! this taxonomy: they stay inside the orchestrator, logged and swallowed.

use crate::object::ObjectRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Object size could not be determined (missing object, permissions,
    /// transient store error). Not retried; aborts before tag/notify.
    #[error("metadata unavailable for {object}: {source}")]
    MetadataUnavailable {
        object: ObjectRef,
        #[source]
        source: anyhow::Error,
    },

    /// Signature transfer failed. Scanning never proceeds against a
    /// stale-or-absent snapshot with a presumed-clean fallback.
    #[error("signature sync failed: {source}")]
    SignatureSyncFailed {
        #[source]
        source: anyhow::Error,
    },

    /// Streaming the object to local scratch failed.
    #[error("fetch failed for {object}: {source}")]
    FetchFailed {
        object: ObjectRef,
        #[source]
        source: anyhow::Error,
    },

    /// The scanner subprocess could not be run or reported an invocation
    /// error (as opposed to a clean/infected classification).
    #[error("scanner invocation failed for {object}: {source}")]
    ScanInvocationFailed {
        object: ObjectRef,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// Failures raised before the size gate resolves never reach the
    /// best-effort tag/notify stages.
    pub fn failed_before_scan(&self) -> bool {
        matches!(self, PipelineError::MetadataUnavailable { .. })
    }
}
