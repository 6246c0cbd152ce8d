//! clamgate binary.
//!
//! Usage:
//!     clamgate --event-file event.json --signature-bucket defs \
//!         --notify-endpoint https://api.example.com
//!     clamgate --bucket uploads --key incoming/report.pdf \
//!         --signature-bucket defs --notify-endpoint https://api.example.com

use anyhow::{bail, Context, Result};
use clamgate::config::Args;
use clamgate::notify::HttpNotifier;
use clamgate::object::ObjectRef;
use clamgate::pipeline::{Pipeline, PipelineConfig};
use clamgate::scanner::ClamScanner;
use clamgate::signatures::S3SignatureSource;
use clamgate::store::S3ObjectStore;
use clamgate::verdict::ScanVerdict;
use clap::Parser;
use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    clamgate_logging::init_logging(clamgate_logging::LogConfig {
        verbose: args.verbose,
    })?;

    let object = resolve_object(&args)?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);

    let config = PipelineConfig {
        max_object_bytes: args.max_object_bytes,
        scratch_root: args.scratch_root.clone().unwrap_or_else(std::env::temp_dir),
    };

    let pipeline = Pipeline::new(
        config,
        Arc::new(S3ObjectStore::new(s3_client.clone())),
        Arc::new(S3SignatureSource::new(
            s3_client,
            args.signature_bucket.clone(),
            args.signature_prefix.clone(),
            args.signature_dir.clone(),
        )),
        Arc::new(ClamScanner::new(args.clamscan_path.clone())),
        Arc::new(HttpNotifier::new(args.notify_endpoint.clone())?),
    );

    // A failure before the scan path (metadata unavailable) is already
    // logged by the pipeline; signal it the same way as an ERROR verdict.
    let verdict = match pipeline.run(&object).await {
        Ok(verdict) => verdict,
        Err(_) => ScanVerdict::Error,
    };
    Ok(ExitCode::from(exit_status_for(verdict)))
}

fn resolve_object(args: &Args) -> Result<ObjectRef> {
    if let (Some(bucket), Some(key)) = (&args.bucket, &args.key) {
        return Ok(ObjectRef::new(bucket, key));
    }
    let Some(event_file) = &args.event_file else {
        bail!("either --event-file or --bucket/--key must be given");
    };
    let payload = if event_file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(event_file)
            .with_context(|| format!("failed to read event file {}", event_file.display()))?
    };
    ObjectRef::from_event_json(&payload)
}

/// Host success/failure signal: clean and skipped objects exit 0, an
/// infected object exits 1, scan-path errors exit 2.
fn exit_status_for(verdict: ScanVerdict) -> u8 {
    match verdict {
        ScanVerdict::Clean | ScanVerdict::SkippedTooLarge => 0,
        ScanVerdict::Infected => 1,
        ScanVerdict::Error => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infected_and_error_verdicts_signal_failure() {
        assert_eq!(exit_status_for(ScanVerdict::Clean), 0);
        assert_eq!(exit_status_for(ScanVerdict::SkippedTooLarge), 0);
        assert_eq!(exit_status_for(ScanVerdict::Infected), 1);
        assert_eq!(exit_status_for(ScanVerdict::Error), 2);
    }

    #[test]
    fn direct_mode_builds_the_object_ref() {
        let args = Args::try_parse_from([
            "clamgate",
            "--bucket",
            "uploads",
            "--key",
            "a.txt",
            "--signature-bucket",
            "defs",
            "--notify-endpoint",
            "https://api.example.com",
        ])
        .unwrap();
        let object = resolve_object(&args).unwrap();
        assert_eq!(object, ObjectRef::new("uploads", "a.txt"));
    }

    #[test]
    fn missing_object_selector_is_an_error() {
        let args = Args::try_parse_from([
            "clamgate",
            "--signature-bucket",
            "defs",
            "--notify-endpoint",
            "https://api.example.com",
        ])
        .unwrap();
        assert!(resolve_object(&args).is_err());
    }
}
