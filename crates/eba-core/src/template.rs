//! BudgetAdjustment templates.
//!
//! A template is plain YAML text with `{{placeholder}}` markers. Values are
//! substituted per line:
//! - inline values are emitted as YAML scalars (quoted when needed),
//! - `{{description}}` becomes a literal block scalar and must end its line,
//! - `{{slos}}` must sit alone on its line and expands to a sequence of
//!   `name`/`project` mappings at that line's indentation,
//! - a line whose placeholder has no value (`{{rrule}}` for one-time events)
//!   is dropped.

use crate::error::{EbaError, Result};
use crate::types::{format_timestamp, AdjustmentRecord, Slo};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const PLACEHOLDERS: &[&str] = &[
    "name",
    "display_name",
    "description",
    "first_event_start",
    "duration",
    "rrule",
    "slos",
];

const REQUIRED: &[&str] = &["name", "slos"];

pub const BLANK_TEMPLATE: &str = r#"## https://docs.nobl9.com/yaml-guide/#budgetadjustment
## https://docs.nobl9.com/features/budget-adjustments/
## https://icalendar.org/rrule-tool.html

apiVersion: n9/v1alpha
kind: BudgetAdjustment
metadata:
  name: {{name}}
  displayName: {{display_name}}
spec:
  description: {{description}}
  firstEventStart: {{first_event_start}}
  duration: {{duration}}
  rrule: {{rrule}}
  filters:
    slos:
      {{slos}}
"#;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_]+)\s*\}\}").unwrap())
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
}

/// Everything one generated document needs.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    pub name: &'a str,
    pub display_name: &'a str,
    pub record: &'a AdjustmentRecord,
    pub slos: &'a [Slo],
}

enum Value {
    Inline(String),
    Block(String),
    Absent,
}

impl Template {
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let source = source.into();
        let invalid = |reason: String| EbaError::InvalidTemplate {
            name: name.clone(),
            reason,
        };

        let mut found = Vec::new();
        for line in source.lines() {
            for caps in placeholder_re().captures_iter(line) {
                let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                if !PLACEHOLDERS.contains(&key) {
                    return Err(invalid(format!("unknown placeholder '{{{{{key}}}}}'")));
                }
                let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                if key == "slos" && line.trim() != whole {
                    return Err(invalid("{{slos}} must be alone on its line".to_string()));
                }
                if key == "description" && !line.trim_end().ends_with(whole) {
                    return Err(invalid(
                        "{{description}} must be the last thing on its line".to_string(),
                    ));
                }
                found.push(key.to_string());
            }
        }
        for required in REQUIRED {
            if !found.iter().any(|k| k == required) {
                return Err(invalid(format!("missing {{{{{required}}}}} placeholder")));
            }
        }
        Ok(Self { name, source })
    }

    /// The built-in template written to `templates/blank_do_not_delete.yml`.
    pub fn blank() -> Self {
        Self {
            name: crate::paths::BLANK_TEMPLATE.to_string(),
            source: BLANK_TEMPLATE.to_string(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let source = std::fs::read_to_string(path)?;
        Self::parse(name, source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, fields: &Fields<'_>) -> Result<String> {
        let values = values(fields)?;
        let mut out = String::with_capacity(self.source.len() + fields.slos.len() * 64);

        for line in self.source.lines() {
            if is_alone(line, "slos") {
                let indent = " ".repeat(leading_spaces(line));
                for slo in fields.slos {
                    out.push_str(&format!("{indent}- name: {}\n", scalar(&slo.name)?));
                    out.push_str(&format!("{indent}  project: {}\n", scalar(&slo.project)?));
                }
                continue;
            }

            let mut absent = false;
            let mut tail: Vec<String> = Vec::new();
            let rendered = placeholder_re().replace_all(line, |caps: &Captures<'_>| {
                match values.get(&caps[1]) {
                    Some(Value::Inline(s)) => s.clone(),
                    Some(Value::Block(text)) => {
                        let (header, body) = block_scalar(text, key_column(line));
                        tail = body;
                        header
                    }
                    Some(Value::Absent) | None => {
                        absent = true;
                        String::new()
                    }
                }
            });
            if absent {
                continue;
            }
            out.push_str(&rendered);
            out.push('\n');
            for body_line in tail {
                out.push_str(&body_line);
                out.push('\n');
            }
        }
        Ok(out)
    }
}

fn values(fields: &Fields<'_>) -> Result<HashMap<&'static str, Value>> {
    let schedule = &fields.record.schedule;
    let mut map = HashMap::new();
    map.insert("name", Value::Inline(scalar(fields.name)?));
    map.insert("display_name", Value::Inline(scalar(fields.display_name)?));
    map.insert(
        "description",
        Value::Block(fields.record.description.clone()),
    );
    map.insert(
        "first_event_start",
        Value::Inline(format_timestamp(schedule.start())),
    );
    map.insert("duration", Value::Inline(scalar(schedule.duration())?));
    map.insert(
        "rrule",
        match schedule.rrule() {
            Some(rule) => Value::Inline(scalar(rule)?),
            None => Value::Absent,
        },
    );
    Ok(map)
}

fn is_alone(line: &str, key: &str) -> bool {
    placeholder_re()
        .captures(line.trim())
        .filter(|c| c.get(0).map(|m| m.as_str()) == Some(line.trim()))
        .is_some_and(|c| &c[1] == key)
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Column at which the mapping key on `line` starts; `- key:` counts the dash.
fn key_column(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '-']).len()
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// A single-line YAML scalar, quoted only when the plain form would be
/// misread (`yes`, `: `, leading `*`, …).
pub fn scalar(value: &str) -> Result<String> {
    Ok(serde_yaml::to_string(value)?.trim_end_matches('\n').to_string())
}

/// Render `text` as a literal block scalar for a key starting at
/// `key_col`. Returns the header (`|`, `|-`, `|+`, optionally with an
/// indentation indicator) and the indented body lines.
pub fn block_scalar(text: &str, key_col: usize) -> (String, Vec<String>) {
    if text.is_empty() {
        return ("\"\"".to_string(), Vec::new());
    }
    let (body, chomp) = match text.strip_suffix('\n') {
        None => (text, "-"),
        Some(rest) if rest.is_empty() || rest.ends_with('\n') => (rest, "+"),
        Some(rest) => (rest, ""),
    };

    let lines: Vec<&str> = body.split(['\n', '\u{2028}', '\u{2029}']).collect();
    let spaced_leading_blank = lines
        .iter()
        .take_while(|l| l.trim().is_empty())
        .any(|l| !l.is_empty());
    let indented_first = lines
        .iter()
        .find(|l| !l.trim().is_empty())
        .is_some_and(|l| l.starts_with([' ', '\t']));
    let indicator = if spaced_leading_blank || indented_first {
        "2"
    } else {
        ""
    };

    let pad = " ".repeat(key_col + 2);
    let body = lines
        .iter()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{pad}{l}")
            }
        })
        .collect();
    (format!("|{indicator}{chomp}"), body)
}

// ---------------------------------------------------------------------------
// Template directory
// ---------------------------------------------------------------------------

/// `*.yml` / `*.yaml` files in `dir`, sorted by file name.
pub fn list_templates(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
