//! clamgate - event-triggered object scanning pipeline.
//!
//! When an object lands in a bucket, the pipeline fetches it, screens it with
//! an external signature-based scanner, writes the verdict back as an object
//! tag, and notifies a downstream service. Each invocation handles exactly
//! one object; there is no queueing and no retry inside the pipeline.
//!
//! Every external collaborator sits behind a port so the orchestrator can be
//! driven with fakes in tests:
//! - [`store::ObjectStore`] - metadata, content and tag writes
//! - [`signatures::SignatureSource`] - local signature snapshot refresh
//! - [`scanner::Scanner`] - the scan engine itself
//! - [`notify::Notifier`] - downstream completion notices

pub mod config;
pub mod error;
pub mod notify;
pub mod object;
pub mod pipeline;
pub mod scanner;
pub mod signatures;
pub mod staging;
pub mod store;
pub mod verdict;

pub use config::{Args, DEFAULT_MAX_OBJECT_BYTES};
pub use error::PipelineError;
pub use notify::{HttpNotifier, Notifier};
pub use object::ObjectRef;
pub use pipeline::{Pipeline, PipelineConfig};
pub use scanner::{ClamScanner, ScanOutcome, Scanner};
pub use signatures::{S3SignatureSource, SignatureSource};
pub use staging::StagingDir;
pub use store::{ObjectStore, S3ObjectStore};
pub use verdict::{ScanVerdict, SCAN_STATUS_TAG_KEY};
