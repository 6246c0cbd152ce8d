//! Pipeline configuration.
//!
//! All settings are static: parsed once at process start from flags or their
//! environment fallbacks.

use clap::Parser;
use std::path::PathBuf;

/// Largest object eligible for scanning (500 MB), matching the local storage
/// cap of the hosting execution environment.
pub const DEFAULT_MAX_OBJECT_BYTES: i64 = 524_288_000;

#[derive(Parser, Debug)]
#[command(
    name = "clamgate",
    about = "Scan a newly landed store object, tag it with the verdict, notify downstream"
)]
pub struct Args {
    /// S3 event notification JSON file ("-" reads stdin)
    #[arg(long, conflicts_with_all = ["bucket", "key"])]
    pub event_file: Option<PathBuf>,

    /// Bucket of the object to scan (direct mode, bypasses the event payload)
    #[arg(long, requires = "key")]
    pub bucket: Option<String>,

    /// Key of the object to scan (direct mode)
    #[arg(long, requires = "bucket")]
    pub key: Option<String>,

    /// Largest object size eligible for scanning, in bytes
    #[arg(long, env = "MAX_OBJECT_BYTES", default_value_t = DEFAULT_MAX_OBJECT_BYTES)]
    pub max_object_bytes: i64,

    /// Bucket holding the scanner signature files
    #[arg(long, env = "SIGNATURE_BUCKET")]
    pub signature_bucket: String,

    /// Key prefix of the signature files inside the signature bucket
    #[arg(long, env = "SIGNATURE_PREFIX", default_value = "")]
    pub signature_prefix: String,

    /// Local directory the signature snapshot is synced into
    #[arg(long, env = "SIGNATURE_DIR", default_value = "/tmp/clamav_defs")]
    pub signature_dir: PathBuf,

    /// Root directory for per-invocation staging directories
    /// (defaults to the system temp directory)
    #[arg(long, env = "SCRATCH_ROOT")]
    pub scratch_root: Option<PathBuf>,

    /// Base URL of the downstream service notified on completion
    #[arg(long, env = "NOTIFY_ENDPOINT")]
    pub notify_endpoint: String,

    /// Path to the clamscan binary
    #[arg(long, env = "CLAMSCAN_PATH", default_value = "clamscan")]
    pub clamscan_path: PathBuf,

    /// Widen console logging to debug
    #[arg(long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).expect("argv should parse")
    }

    #[test]
    fn defaults_are_applied() {
        let args = parse(&[
            "clamgate",
            "--bucket",
            "uploads",
            "--key",
            "a.txt",
            "--signature-bucket",
            "defs",
            "--notify-endpoint",
            "https://api.example.com",
        ]);
        assert_eq!(args.max_object_bytes, DEFAULT_MAX_OBJECT_BYTES);
        assert_eq!(args.signature_dir, PathBuf::from("/tmp/clamav_defs"));
        assert_eq!(args.clamscan_path, PathBuf::from("clamscan"));
        assert!(args.scratch_root.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn direct_mode_requires_both_bucket_and_key() {
        let result = Args::try_parse_from([
            "clamgate",
            "--bucket",
            "uploads",
            "--signature-bucket",
            "defs",
            "--notify-endpoint",
            "https://api.example.com",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn event_file_conflicts_with_direct_mode() {
        let result = Args::try_parse_from([
            "clamgate",
            "--event-file",
            "event.json",
            "--bucket",
            "uploads",
            "--key",
            "a.txt",
            "--signature-bucket",
            "defs",
            "--notify-endpoint",
            "https://api.example.com",
        ]);
        assert!(result.is_err());
    }
}
