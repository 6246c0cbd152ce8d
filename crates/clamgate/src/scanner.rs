//! Scan engine port and the clamscan adapter.

use crate::verdict::ScanVerdict;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Two-valued result of a scanner run. Skip and error outcomes are decided by
/// the orchestrator, never by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Clean,
    Infected,
}

impl From<ScanOutcome> for ScanVerdict {
    fn from(outcome: ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Clean => ScanVerdict::Clean,
            ScanOutcome::Infected => ScanVerdict::Infected,
        }
    }
}

/// Scan engine port.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Scan `target` against the signature snapshot at `signatures`.
    ///
    /// An `Err` means the invocation itself failed, not that the file is
    /// infected. No retry; the orchestrator maps it to an `ERROR` verdict.
    async fn scan(&self, target: &Path, signatures: &Path) -> Result<ScanOutcome>;
}

/// Runs clamscan as a subprocess against a staged file.
///
/// Exit code convention:
/// - 0: no virus found
/// - 1: virus found
/// - anything else (including signal termination): invocation error
pub struct ClamScanner {
    binary: PathBuf,
}

impl ClamScanner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl Scanner for ClamScanner {
    async fn scan(&self, target: &Path, signatures: &Path) -> Result<ScanOutcome> {
        debug!("running {} on {}", self.binary.display(), target.display());
        let output = Command::new(&self.binary)
            .arg("-v")
            .arg("-a")
            .arg("--stdout")
            .arg("-d")
            .arg(signatures)
            .arg(target)
            .output()
            .await
            .with_context(|| format!("failed to spawn {}", self.binary.display()))?;

        match output.status.code() {
            Some(code) => classify_exit_code(code, &String::from_utf8_lossy(&output.stderr)),
            None => bail!("scanner terminated by signal"),
        }
    }
}

fn classify_exit_code(code: i32, stderr: &str) -> Result<ScanOutcome> {
    match code {
        0 => Ok(ScanOutcome::Clean),
        1 => Ok(ScanOutcome::Infected),
        _ => bail!("scanner exited with code {}: {}", code, truncate_stderr(stderr)),
    }
}

fn truncate_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        return "<no stderr>".to_string();
    }
    if stderr.len() > 500 {
        // stderr is lossy-decoded and may contain multibyte characters;
        // never cut inside one.
        let mut end = 500;
        while !stderr.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &stderr[..end])
    } else {
        stderr.to_string()
    }
}
