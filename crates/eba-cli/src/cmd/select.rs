use crate::prompt::Prompter;
use eba_core::catalog::{Catalog, Group};
use eba_core::types::Selection;
use std::io::{BufRead, Write};

const MENU: &[(&str, &str)] = &[
    ("1", "List projects"),
    ("2", "List services"),
    ("3", "Pick SLOs individually"),
    ("x", "Exit"),
];

/// Show the main menu until the user builds a selection. `None` means exit.
pub fn run<R: BufRead, W: Write>(
    catalog: &Catalog,
    p: &mut Prompter<R, W>,
) -> anyhow::Result<Option<Selection>> {
    loop {
        let selection = match p.menu("What would you like to do?", MENU)?.as_str() {
            "1" => pick_group(&catalog.projects(), "Select a project", p)?,
            "2" => {
                let services = catalog.services();
                if services.is_empty() {
                    p.hint("None of the SLOs in this context belong to a service.")?;
                    continue;
                }
                pick_group(&services, "Select a service", p)?
            }
            "3" => {
                let labels: Vec<String> = catalog.slos().iter().map(|s| s.label()).collect();
                let picked = p.multi_select("Select SLOs", &labels)?;
                catalog.pick(&picked)?
            }
            _ => return Ok(None),
        };
        p.success(&format!(
            "Selected {} SLO{} from {}",
            selection.len(),
            if selection.len() == 1 { "" } else { "s" },
            selection.scope()
        ))?;
        return Ok(Some(selection));
    }
}

fn pick_group<R: BufRead, W: Write>(
    groups: &[Group],
    title: &str,
    p: &mut Prompter<R, W>,
) -> anyhow::Result<Selection> {
    let labels: Vec<String> = groups
        .iter()
        .map(|g| format!("{} ({} SLOs)", g.label(), g.slos.len()))
        .collect();
    let idx = p.choose(title, &labels)?;
    Ok(groups[idx].to_selection()?)
}
