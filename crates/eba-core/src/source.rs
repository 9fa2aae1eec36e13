//! Access to SLO metadata through the `sloctl` binary.
//!
//! Commands used:
//!   sloctl config get-contexts      → `[ctx-a, ctx-b]`
//!   sloctl config use-context <ctx>
//!   sloctl get slos -A -o json      → JSON array of SLO objects

use crate::error::{EbaError, Result};
use crate::types::Slo;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where SLO metadata comes from. The interactive flow only talks to this
/// trait, so tests can hand it canned data.
pub trait SloSource {
    fn list_contexts(&self) -> Result<Vec<String>>;
    fn use_context(&self, context: &str) -> Result<()>;
    fn fetch_slos(&self) -> Result<Vec<Slo>>;
}

// ---------------------------------------------------------------------------
// sloctl
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Sloctl {
    bin: PathBuf,
}

impl Sloctl {
    /// Resolve the binary: an explicit path (or bare name) first, then `sloctl`
    /// on `PATH`.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        let wanted = explicit.unwrap_or(Path::new("sloctl"));
        let bin = which::which(wanted).map_err(|_| EbaError::SloctlNotInstalled)?;
        tracing::debug!(bin = %bin.display(), "using sloctl");
        Ok(Self { bin })
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Run `sloctl <args>` and return its stdout, failing on a non-zero exit.
    fn exec(&self, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        tracing::debug!(%command, "running sloctl");
        let output = Command::new(&self.bin).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EbaError::SloctlNotInstalled
            } else {
                EbaError::SloctlFailed {
                    command: command.clone(),
                    stderr: e.to_string(),
                }
            }
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(EbaError::SloctlFailed { command, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Like [`Sloctl::exec`] but empty output is an error.
    fn query(&self, args: &[&str]) -> Result<String> {
        let stdout = self.exec(args)?;
        if stdout.is_empty() {
            return Err(EbaError::SloctlEmptyOutput(args.join(" ")));
        }
        Ok(stdout)
    }
}

impl SloSource for Sloctl {
    fn list_contexts(&self) -> Result<Vec<String>> {
        let raw = self.query(&["config", "get-contexts"])?;
        let contexts = parse_contexts(&raw);
        if contexts.is_empty() {
            return Err(EbaError::NoContexts);
        }
        Ok(contexts)
    }

    fn use_context(&self, context: &str) -> Result<()> {
        self.exec(&["config", "use-context", context])?;
        Ok(())
    }

    fn fetch_slos(&self) -> Result<Vec<Slo>> {
        let raw = self.query(&["get", "slos", "-A", "-o", "json"])?;
        let slos = parse_slos(&raw)?;
        tracing::info!(count = slos.len(), "fetched SLOs");
        Ok(slos)
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

/// Parse `sloctl config get-contexts` output: `[a, b, c]`.
/// Also tolerates one context per line.
pub fn parse_contexts(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split([',', '\n'])
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct RawSlo {
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    spec: RawSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    name: Option<String>,
    project: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSpec {
    service: Option<String>,
}

/// Parse `sloctl get slos -o json`. Entries without a name or project can't
/// be targeted by an adjustment and are skipped.
pub fn parse_slos(raw: &str) -> Result<Vec<Slo>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| EbaError::InvalidSloData(e.to_string()))?;
    if !value.is_array() {
        return Err(EbaError::InvalidSloData(
            "expected a JSON array of SLOs".to_string(),
        ));
    }
    let entries: Vec<RawSlo> =
        serde_json::from_value(value).map_err(|e| EbaError::InvalidSloData(e.to_string()))?;

    let mut slos = Vec::with_capacity(entries.len());
    for entry in entries {
        let (Some(name), Some(project)) = (entry.metadata.name, entry.metadata.project) else {
            tracing::warn!("skipping SLO without metadata.name or metadata.project");
            continue;
        };
        slos.push(Slo {
            name,
            project,
            service: entry.spec.service.unwrap_or_default(),
            display_name: entry.metadata.display_name.filter(|d| !d.trim().is_empty()),
        });
    }
    Ok(slos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
