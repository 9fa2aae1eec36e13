use crate::prompt::Prompter;
use eba_core::template::Template;
use eba_core::types::{AdjustmentRecord, EventType, Schedule};
use eba_core::{validate, workspace};
use std::io::{BufRead, Write};
use std::path::Path;

/// Ask for the fields shared by every file of the run. The recurrence rule
/// is only asked for recurring events.
pub fn collect<R: BufRead, W: Write>(p: &mut Prompter<R, W>) -> anyhow::Result<AdjustmentRecord> {
    p.heading("Budget adjustment details")?;
    let display_name = p.ask("Display name", validate::display_name)?;
    p.hint("Markdown is allowed in the description.")?;
    let description = p.ask_multiline("Description", validate::description)?;

    let kinds: Vec<String> = EventType::all().iter().map(|k| k.to_string()).collect();
    let event_type = EventType::all()[p.choose("Event type", &kinds)?];

    p.hint("Times are UTC, e.g. 2026-08-01T02:00:00Z")?;
    let start = p.ask("First event start", validate::timestamp)?;
    let duration = p.ask("Duration (e.g. 1h30m)", validate::duration)?;

    let schedule = match event_type {
        EventType::OneTime => Schedule::OneTime { start, duration },
        EventType::Recurring => {
            p.hint("iCalendar rule, e.g. FREQ=WEEKLY;BYDAY=SA or FREQ=MONTHLY;BYDAY=1TU")?;
            let rrule = p.ask("Recurrence rule", validate::rrule)?;
            Schedule::Recurring {
                start,
                duration,
                rrule,
            }
        }
    };

    Ok(AdjustmentRecord {
        display_name,
        description,
        schedule,
    })
}

/// Choose among the usable templates under `root/templates`; a single
/// template is taken without asking.
pub fn choose_template<R: BufRead, W: Write>(
    root: &Path,
    p: &mut Prompter<R, W>,
) -> anyhow::Result<Template> {
    let mut templates = workspace::templates(root)?;
    if templates.len() == 1 {
        return Ok(templates.remove(0));
    }
    let names: Vec<String> = templates.iter().map(|t| t.name().to_string()).collect();
    let idx = p.choose("Select a template", &names)?;
    Ok(templates.swap_remove(idx))
}
