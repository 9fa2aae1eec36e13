use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EbaError, Result};

// ---------------------------------------------------------------------------
// Slo
// ---------------------------------------------------------------------------

/// An SLO as reported by `sloctl get slos`. Identity is `(project, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slo {
    pub name: String,
    pub project: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Slo {
    pub fn new(
        name: impl Into<String>,
        project: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            project: project.into(),
            service: service.into(),
            display_name: None,
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.project, &self.name)
    }

    /// Menu label: display name when present, with the identifier alongside.
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(d) if d != &self.name => format!("{d} ({}/{})", self.project, self.name),
            _ => format!("{}/{}", self.project, self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Scope / Selection
// ---------------------------------------------------------------------------

/// How a selection was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Project(String),
    Service { project: String, service: String },
    Custom,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Project(p) => write!(f, "project {p}"),
            Scope::Service { project, service } => write!(f, "service {service} ({project})"),
            Scope::Custom => f.write_str("custom selection"),
        }
    }
}

/// A non-empty, duplicate-free, ordered list of SLOs.
#[derive(Debug, Clone)]
pub struct Selection {
    scope: Scope,
    slos: Vec<Slo>,
}

impl Selection {
    /// Build a selection, dropping repeated `(project, name)` pairs while
    /// keeping the first occurrence in place.
    pub fn new(scope: Scope, slos: impl IntoIterator<Item = Slo>) -> Result<Self> {
        let mut out: Vec<Slo> = Vec::new();
        for slo in slos {
            if !out.iter().any(|s| s.key() == slo.key()) {
                out.push(slo);
            }
        }
        if out.is_empty() {
            return Err(EbaError::EmptySelection);
        }
        Ok(Self { scope, slos: out })
    }

    /// Like [`Selection::new`] but ordered by `(project, name)`.
    pub fn sorted(scope: Scope, slos: impl IntoIterator<Item = Slo>) -> Result<Self> {
        let mut selection = Self::new(scope, slos)?;
        selection
            .slos
            .sort_by(|a, b| a.project.cmp(&b.project).then_with(|| a.name.cmp(&b.name)));
        Ok(selection)
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn slos(&self) -> &[Slo] {
        &self.slos
    }

    pub fn len(&self) -> usize {
        self.slos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slos.is_empty()
    }
}

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    OneTime,
    Recurring,
}

impl EventType {
    pub fn all() -> &'static [EventType] {
        &[EventType::OneTime, EventType::Recurring]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::OneTime => "one-time",
            EventType::Recurring => "recurring",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = EbaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-time" | "onetime" | "one_time" | "once" => Ok(EventType::OneTime),
            "recurring" | "recurrent" => Ok(EventType::Recurring),
            other => Err(EbaError::InvalidField {
                field: "event type",
                reason: format!("'{other}' is neither one-time nor recurring"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule / AdjustmentRecord
// ---------------------------------------------------------------------------

/// When an adjustment applies. The recurrence rule only exists for
/// recurring events, so a one-time record cannot carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    OneTime {
        start: DateTime<Utc>,
        duration: String,
    },
    Recurring {
        start: DateTime<Utc>,
        duration: String,
        rrule: String,
    },
}

impl Schedule {
    pub fn event_type(&self) -> EventType {
        match self {
            Schedule::OneTime { .. } => EventType::OneTime,
            Schedule::Recurring { .. } => EventType::Recurring,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        match self {
            Schedule::OneTime { start, .. } | Schedule::Recurring { start, .. } => *start,
        }
    }

    pub fn duration(&self) -> &str {
        match self {
            Schedule::OneTime { duration, .. } | Schedule::Recurring { duration, .. } => duration,
        }
    }

    pub fn rrule(&self) -> Option<&str> {
        match self {
            Schedule::OneTime { .. } => None,
            Schedule::Recurring { rrule, .. } => Some(rrule),
        }
    }
}

/// The fields shared by every file generated in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentRecord {
    pub display_name: String,
    pub description: String,
    pub schedule: Schedule,
}

/// Format a timestamp the way Nobl9 expects `firstEventStart`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slo(project: &str, name: &str) -> Slo {
        Slo::new(name, project, "svc")
    }

    #[test]
    fn selection_rejects_empty() {
        let err = Selection::new(Scope::Custom, Vec::new()).unwrap_err();
        assert!(matches!(err, EbaError::EmptySelection));
    }

    #[test]
    fn selection_drops_duplicates_keeping_first() {
        let sel = Selection::new(
            Scope::Custom,
            vec![slo("p", "b"), slo("p", "a"), slo("p", "b"), slo("q", "b")],
        )
        .unwrap();
        let keys: Vec<_> = sel.slos().iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![("p", "b"), ("p", "a"), ("q", "b")]);
    }

    #[test]
    fn sorted_selection_orders_by_project_then_name() {
        let sel = Selection::sorted(
            Scope::Project("p".into()),
            vec![slo("q", "a"), slo("p", "z"), slo("p", "c")],
        )
        .unwrap();
        let keys: Vec<_> = sel.slos().iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![("p", "c"), ("p", "z"), ("q", "a")]);
    }

    #[test]
    fn event_type_parses_aliases() {
        assert_eq!("One-Time".parse::<EventType>().unwrap(), EventType::OneTime);
        assert_eq!("recurring".parse::<EventType>().unwrap(), EventType::Recurring);
        assert!("weekly".parse::<EventType>().is_err());
    }

    #[test]
    fn one_time_schedule_has_no_rrule() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let schedule = Schedule::OneTime {
            start,
            duration: "1h".into(),
        };
        assert_eq!(schedule.event_type(), EventType::OneTime);
        assert!(schedule.rrule().is_none());
        assert_eq!(format_timestamp(schedule.start()), "2026-01-01T00:00:00Z");
    }

    #[test]
    fn slo_label_prefers_display_name() {
        let mut s = slo("prod", "api-latency");
        assert_eq!(s.label(), "prod/api-latency");
        s.display_name = Some("API latency".into());
        assert_eq!(s.label(), "API latency (prod/api-latency)");
    }
}
