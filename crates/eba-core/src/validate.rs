//! Pure validators for prompt answers.
//!
//! Every function maps raw user text to a validated value or a human-readable
//! reason. None of them touch the terminal, so the prompt loop can re-ask on
//! `Err` and tests can call them directly.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::paths::{self, MAX_NAME_LEN};

/// Nobl9 rejects longer descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 1050;

// ---------------------------------------------------------------------------
// Display name / description
// ---------------------------------------------------------------------------

pub fn display_name(raw: &str) -> Result<String, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("displayName cannot be empty".into());
    }
    if value.contains('#') {
        return Err("'#' characters are not allowed in displayName".into());
    }
    if value.chars().any(char::is_control) {
        return Err("displayName cannot contain control characters".into());
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(format!(
            "displayName must be at most {MAX_NAME_LEN} characters"
        ));
    }
    if paths::slugify(value).is_empty() {
        return Err("displayName needs at least one letter or digit to derive a name".into());
    }
    Ok(value.to_string())
}

/// Normalize line endings and make sure the text can live inside a YAML
/// literal block scalar. CRLF, CR and the Unicode line and paragraph
/// separators (which YAML parsers treat as breaks) all become LF. Leading
/// and trailing blank lines are dropped; everything in between is kept
/// verbatim.
pub fn description(raw: &str) -> Result<String, String> {
    let text = raw
        .replace("\r\n", "\n")
        .replace(['\r', '\u{2028}', '\u{2029}'], "\n");
    if let Some((line, c)) = text
        .lines()
        .enumerate()
        .find_map(|(i, l)| l.chars().find(|c| !yaml_printable(*c)).map(|c| (i + 1, c)))
    {
        return Err(format!(
            "description line {line} contains a control character (U+{:04X})",
            c as u32
        ));
    }
    let trimmed = trim_blank_lines(&text);
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        ));
    }
    Ok(trimmed)
}

fn yaml_printable(c: char) -> bool {
    if c == '\t' {
        return true;
    }
    !c.is_control() && c != '\u{FEFF}' && c != '\u{FFFE}' && c != '\u{FFFF}'
}

fn trim_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(a), Some(b)) => lines[a..=b].join("\n"),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Schedule fields
// ---------------------------------------------------------------------------

/// Accepts RFC 3339 (`2026-07-04T09:30:00Z`, offsets are converted to UTC)
/// or a naive `YYYY-MM-DDThh:mm[:ss]` / `YYYY-MM-DD hh:mm[:ss]` read as UTC.
/// Sub-second precision is dropped.
pub fn timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("start time cannot be empty".into());
    }
    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            [
                "%Y-%m-%dT%H:%M:%S",
                "%Y-%m-%dT%H:%M",
                "%Y-%m-%d %H:%M:%S",
                "%Y-%m-%d %H:%M",
            ]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|naive| naive.and_utc())
            .ok_or(())
        })
        .map_err(|_| format!("'{value}' is not a timestamp like 2026-07-04T09:30:00Z"))?;
    Ok(parsed.with_nanosecond(0).unwrap_or(parsed))
}

static DURATION_RE: OnceLock<Regex> = OnceLock::new();

fn duration_re() -> &'static Regex {
    DURATION_RE.get_or_init(|| Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$").unwrap())
}

/// Go-style duration (`1h`, `90m`, `1h30m`, `3600s`) with minute precision.
/// Returns the canonical form, e.g. `90m` → `1h30m`.
pub fn duration(raw: &str) -> Result<String, String> {
    let value = raw.trim().to_ascii_lowercase();
    let invalid = || format!("'{}' is not a duration like 1h, 30m or 1h30m", raw.trim());
    if value.is_empty() {
        return Err("duration cannot be empty".into());
    }
    let caps = duration_re().captures(&value).ok_or_else(invalid)?;
    let part = |i: usize| -> Result<u64, String> {
        caps.get(i)
            .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
            .unwrap_or(Ok(0))
    };
    let (h, m, s) = (part(1)?, part(2)?, part(3)?);
    let seconds = h
        .checked_mul(3600)
        .and_then(|x| x.checked_add(m.checked_mul(60)?))
        .and_then(|x| x.checked_add(s))
        .ok_or_else(invalid)?;
    if seconds == 0 {
        return Err("duration must be at least 1m".into());
    }
    if seconds % 60 != 0 {
        return Err("duration must be a whole number of minutes".into());
    }
    let minutes = seconds / 60;
    Ok(match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    })
}

// ---------------------------------------------------------------------------
// RRULE
// ---------------------------------------------------------------------------

const FREQUENCIES: &[&str] = &["MINUTELY", "HOURLY", "DAILY", "WEEKLY", "MONTHLY", "YEARLY"];
const WEEKDAYS: &[&str] = &["MO", "TU", "WE", "TH", "FR", "SA", "SU"];

static BYDAY_RE: OnceLock<Regex> = OnceLock::new();
static UNTIL_RE: OnceLock<Regex> = OnceLock::new();

fn byday_re() -> &'static Regex {
    BYDAY_RE.get_or_init(|| Regex::new(r"^([+-]?)(\d{1,2})?(MO|TU|WE|TH|FR|SA|SU)$").unwrap())
}

fn until_re() -> &'static Regex {
    UNTIL_RE.get_or_init(|| Regex::new(r"^\d{8}(T\d{6}Z?)?$").unwrap())
}

/// Validate an iCalendar (RFC 5545) recurrence rule such as
/// `FREQ=MONTHLY;INTERVAL=1;BYDAY=1TU`. A leading `RRULE:` is stripped and the
/// rule is upper-cased; the normalized rule is returned.
pub fn rrule(raw: &str) -> Result<String, String> {
    let upper = raw.trim().to_ascii_uppercase();
    let value = upper
        .strip_prefix("RRULE:")
        .unwrap_or(&upper)
        .trim_end_matches(';')
        .to_string();
    if value.is_empty() {
        return Err("recurrence rule cannot be empty".into());
    }

    let mut seen = HashSet::new();
    for part in value.split(';') {
        let (key, val) = part
            .split_once('=')
            .ok_or_else(|| format!("'{part}' is not KEY=VALUE"))?;
        if val.is_empty() {
            return Err(format!("{key} has no value"));
        }
        if !seen.insert(key.to_string()) {
            return Err(format!("{key} appears more than once"));
        }
        match key {
            "FREQ" => {
                if !FREQUENCIES.contains(&val) {
                    return Err(format!(
                        "FREQ must be one of {}",
                        FREQUENCIES.join(", ")
                    ));
                }
            }
            "INTERVAL" | "COUNT" => {
                positive(key, val)?;
            }
            "UNTIL" => {
                if !until_re().is_match(val) {
                    return Err("UNTIL must look like 20261231T235959Z".into());
                }
            }
            "WKST" => {
                if !WEEKDAYS.contains(&val) {
                    return Err(format!("WKST must be one of {}", WEEKDAYS.join(", ")));
                }
            }
            "BYDAY" => {
                for day in val.split(',') {
                    let caps = byday_re()
                        .captures(day)
                        .ok_or_else(|| format!("'{day}' is not a BYDAY value like TU or 1TU"))?;
                    if let Some(n) = caps.get(2) {
                        let n: i64 = n.as_str().parse().map_err(|_| day.to_string())?;
                        if !(1..=53).contains(&n) {
                            return Err(format!("BYDAY ordinal in '{day}' must be 1..53"));
                        }
                    } else if !caps[1].is_empty() {
                        return Err(format!("BYDAY '{day}' has a sign but no ordinal"));
                    }
                }
            }
            "BYMONTHDAY" => signed_list(key, val, 1, 31)?,
            "BYYEARDAY" => signed_list(key, val, 1, 366)?,
            "BYWEEKNO" => signed_list(key, val, 1, 53)?,
            "BYSETPOS" => signed_list(key, val, 1, 366)?,
            "BYMONTH" => unsigned_list(key, val, 1, 12)?,
            "BYHOUR" => unsigned_list(key, val, 0, 23)?,
            "BYMINUTE" => unsigned_list(key, val, 0, 59)?,
            "BYSECOND" => unsigned_list(key, val, 0, 60)?,
            other => return Err(format!("unknown RRULE part '{other}'")),
        }
    }

    if !seen.contains("FREQ") {
        return Err("FREQ is required (e.g. FREQ=WEEKLY)".into());
    }
    if seen.contains("COUNT") && seen.contains("UNTIL") {
        return Err("COUNT and UNTIL cannot both be set".into());
    }
    Ok(value)
}

fn positive(key: &str, val: &str) -> Result<(), String> {
    match val.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(()),
        _ => Err(format!("{key} must be a positive integer")),
    }
}

fn unsigned_list(key: &str, val: &str, min: i64, max: i64) -> Result<(), String> {
    for item in val.split(',') {
        let ok = !item.starts_with(['+', '-'])
            && item
                .parse::<i64>()
                .map(|n| (min..=max).contains(&n))
                .unwrap_or(false);
        if !ok {
            return Err(format!("{key} values must be in {min}..{max}, got '{item}'"));
        }
    }
    Ok(())
}

fn signed_list(key: &str, val: &str, min: i64, max: i64) -> Result<(), String> {
    for item in val.split(',') {
        let ok = item
            .parse::<i64>()
            .map(|n| (min..=max).contains(&n.abs()))
            .unwrap_or(false);
        if !ok {
            return Err(format!(
                "{key} values must be in ±{min}..{max}, got '{item}'"
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
