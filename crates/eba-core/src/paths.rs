use crate::error::{EbaError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const EBA_DIR: &str = "ebafiles";
pub const TEMPLATES_DIR: &str = "templates";
pub const BLANK_TEMPLATE: &str = "blank_do_not_delete.yml";
pub const CONFIG_FILE: &str = "config.yaml";
pub const RUN_DIR_PREFIX: &str = "run-";

/// Nobl9 object names are RFC 1123 labels.
pub const MAX_NAME_LEN: usize = 63;

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn templates_dir(root: &Path) -> PathBuf {
    root.join(TEMPLATES_DIR)
}

pub fn blank_template_path(root: &Path) -> PathBuf {
    templates_dir(root).join(BLANK_TEMPLATE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Directory stem for a run started at `at`, e.g. `run-20260704093000`.
pub fn run_dir_stem(at: DateTime<Utc>) -> String {
    format!("{RUN_DIR_PREFIX}{}", at.format("%Y%m%d%H%M%S"))
}

/// `base` for the first batch, `base-<index>` afterwards.
pub fn suffixed(base: &str, index: usize) -> String {
    if index <= 1 {
        base.to_string()
    } else {
        format!("{base}-{index}")
    }
}

// ---------------------------------------------------------------------------
// Name derivation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9]([a-z0-9\-]*[a-z0-9])?$").unwrap())
}

/// Derive a Nobl9 object name from a display name.
///
/// Lower-cases, maps spaces and underscores to `-`, drops everything else that
/// is not ASCII alphanumeric, collapses dash runs and trims dashes at both ends.
pub fn slugify(display_name: &str) -> String {
    let mut out = String::with_capacity(display_name.len());
    for c in display_name.chars() {
        let mapped = match c {
            ' ' | '_' | '-' => Some('-'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        };
        match mapped {
            Some('-') if out.is_empty() || out.ends_with('-') => {}
            Some(m) => out.push(m),
            None => {}
        }
    }
    out.trim_end_matches('-').to_string()
}

fn suffix_room(max_index: usize) -> usize {
    if max_index <= 1 {
        0
    } else {
        suffixed("", max_index).len()
    }
}

/// Truncate `base` so that `base-<max_index>` still fits [`MAX_NAME_LEN`].
pub fn fit_name(base: &str, max_index: usize) -> String {
    let limit = MAX_NAME_LEN.saturating_sub(suffix_room(max_index));
    let cut: String = base.chars().take(limit).collect();
    cut.trim_end_matches('-').to_string()
}

/// Same as [`fit_name`] for display names, counted in characters.
pub fn fit_display_name(display_name: &str, max_index: usize) -> String {
    let limit = MAX_NAME_LEN.saturating_sub(suffix_room(max_index));
    if display_name.chars().count() <= limit {
        return display_name.to_string();
    }
    let cut: String = display_name.chars().take(limit).collect();
    cut.trim_end().to_string()
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || !name_re().is_match(name) {
        return Err(EbaError::InvalidField {
            field: "name",
            reason: format!(
                "'{name}' must be lowercase alphanumeric with inner hyphens, at most {MAX_NAME_LEN} characters"
            ),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
