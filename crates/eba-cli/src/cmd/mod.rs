pub mod adjust;
pub mod context;
pub mod select;

use crate::output;
use crate::prompt::Prompter;
use anyhow::{bail, Context};
use chrono::Utc;
use eba_core::batch;
use eba_core::catalog::Catalog;
use eba_core::source::SloSource;
use eba_core::workspace;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Resolved run settings: flags and env vars layered over `config.yaml`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub context: Option<String>,
    pub batch_size: usize,
    pub extension: String,
}

/// The interactive session: set up the working directory, pick a context,
/// fetch SLOs once, then loop over select → describe → write until the user
/// exits.
pub fn run<S, R, W>(settings: &Settings, source: &S, p: &mut Prompter<R, W>) -> anyhow::Result<()>
where
    S: SloSource + ?Sized,
    R: BufRead,
    W: Write,
{
    let init = workspace::init(&settings.root)
        .with_context(|| format!("failed to prepare {}", settings.root.display()))?;
    p.heading("Nobl9 error budget adjustments")?;
    if init.created_root {
        p.hint(&format!(
            "Created {} for templates and generated files.",
            settings.root.display()
        ))?;
    }

    context::select(source, settings.context.as_deref(), p)?;

    let catalog = Catalog::new(source.fetch_slos().context("failed to fetch SLOs")?);
    if catalog.is_empty() {
        bail!("no SLOs found in this context");
    }
    p.say(&format!("Found {} SLOs.", catalog.slos().len()))?;

    while let Some(selection) = select::run(&catalog, p)? {
        let record = adjust::collect(p)?;
        let template = adjust::choose_template(&settings.root, p)?;
        let result = batch::generate(
            &settings.root,
            Utc::now(),
            &template,
            &record,
            &selection,
            settings.batch_size,
            &settings.extension,
        )
        .context("failed to write budget adjustments")?;
        let style = p.style();
        output::write_summary(p.out(), style, &result)?;
    }

    p.say("Bye.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Style;
    use eba_core::types::Slo;
    use eba_core::EbaError;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    struct FakeSource {
        contexts: Vec<String>,
        slos: Vec<Slo>,
        fail_fetch: bool,
        switched: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn new(slos: Vec<Slo>) -> Self {
            Self {
                contexts: vec!["staging-org".into(), "prod-org".into()],
                slos,
                fail_fetch: false,
                switched: RefCell::new(Vec::new()),
            }
        }
    }

    impl SloSource for FakeSource {
        fn list_contexts(&self) -> eba_core::Result<Vec<String>> {
            Ok(self.contexts.clone())
        }

        fn use_context(&self, context: &str) -> eba_core::Result<()> {
            self.switched.borrow_mut().push(context.to_string());
            Ok(())
        }

        fn fetch_slos(&self) -> eba_core::Result<Vec<Slo>> {
            if self.fail_fetch {
                return Err(EbaError::SloctlFailed {
                    command: "get slos -A -o json".into(),
                    stderr: "unauthorized".into(),
                });
            }
            Ok(self.slos.clone())
        }
    }

    fn slos() -> Vec<Slo> {
        let mut slos: Vec<Slo> = (0..31)
            .rev()
            .map(|i| Slo::new(format!("slo-{i:02}"), "prod", "api"))
            .collect();
        slos.push(Slo::new("web-latency", "staging", "web"));
        slos.push(Slo::new("web-errors", "staging", "web"));
        slos
    }

    fn settings(root: &Path, context: Option<&str>) -> Settings {
        Settings {
            root: root.to_path_buf(),
            context: context.map(str::to_string),
            batch_size: 30,
            extension: "yml".into(),
        }
    }

    fn session(
        settings: &Settings,
        source: &FakeSource,
        script: &str,
    ) -> (anyhow::Result<()>, String) {
        let mut p = Prompter::new(
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
            Style::plain(),
        );
        let result = run(settings, source, &mut p);
        (result, String::from_utf8(p.into_output()).unwrap())
    }

    fn run_dirs(root: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)
            .unwrap()
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with("run-"))
            })
            .collect();
        dirs.sort();
        dirs
    }

    fn load(path: &Path) -> serde_yaml::Value {
        serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn project_selection_one_time_event() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("ebafiles");
        let source = FakeSource::new(slos());
        let script = "2\n1\n1\nPatch Window\nMonthly patching.\n\n- api\n.\n1\n2026-08-01T02:00:00Z\n2h\nx\n";
        let (result, out) = session(&settings(&root, None), &source, script);
        result.unwrap();

        assert_eq!(*source.switched.borrow(), vec!["prod-org".to_string()]);
        assert!(out.contains("Using context 'prod-org'"));
        assert!(out.contains("[1] prod (31 SLOs)"));
        assert!(out.contains("Selected 31 SLOs from project prod"));
        assert!(!out.contains("Recurrence rule"));
        assert!(out.contains("sloctl apply -f"));

        let runs = run_dirs(&root);
        assert_eq!(runs.len(), 1);
        let first = load(&runs[0].join("patch-window.yml"));
        let second = load(&runs[0].join("patch-window-2.yml"));
        assert_eq!(first["spec"]["filters"]["slos"].as_sequence().unwrap().len(), 30);
        assert_eq!(first["spec"]["filters"]["slos"][0]["name"], "slo-00");
        assert_eq!(second["spec"]["filters"]["slos"].as_sequence().unwrap().len(), 1);
        assert_eq!(second["spec"]["filters"]["slos"][0]["name"], "slo-30");
        assert_eq!(second["metadata"]["displayName"], "Patch Window-2");
        assert_eq!(first["spec"]["description"], "Monthly patching.\n\n- api");
        assert_eq!(first["spec"]["firstEventStart"], "2026-08-01T02:00:00Z");
        assert!(first["spec"].get("rrule").is_none());
    }

    #[test]
    fn custom_pick_recurring_with_reprompts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let source = FakeSource::new(slos());
        let script = [
            "3",
            "33,32",
            "",
            "DB #1",
            "DB Upgrade",
            "Upgrade: postgres 16",
            ".",
            "2",
            "yesterday",
            "2026-09-05 22:00",
            "ninety",
            "90m",
            "FREQ=FORTNIGHTLY",
            "rrule:freq=weekly;byday=sa",
            "x",
        ]
        .join("\n");
        let (result, out) = session(&settings(&root, Some("staging-org")), &source, &script);
        result.unwrap();

        assert!(!out.contains("Select a context"));
        assert_eq!(*source.switched.borrow(), vec!["staging-org".to_string()]);
        assert!(out.contains("✗ displayName cannot be empty"));
        assert!(out.contains("'#' characters are not allowed"));
        assert!(out.matches("✗ ").count() >= 5);

        let runs = run_dirs(&root);
        assert_eq!(runs.len(), 1);
        let doc = load(&runs[0].join("db-upgrade.yml"));
        let slos = doc["spec"]["filters"]["slos"].as_sequence().unwrap();
        assert_eq!(slos[0]["name"], "web-errors");
        assert_eq!(slos[1]["name"], "web-latency");
        assert_eq!(doc["spec"]["duration"], "1h30m");
        assert_eq!(doc["spec"]["rrule"], "FREQ=WEEKLY;BYDAY=SA");
        assert_eq!(doc["spec"]["firstEventStart"], "2026-09-05T22:00:00Z");
        assert_eq!(doc["spec"]["description"], "Upgrade: postgres 16");
    }

    #[test]
    fn menu_loops_until_exit() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let source = FakeSource::new(slos());
        let one = "2\n1\nWeb Freeze\nfreeze\n.\n1\n2026-08-01T00:00:00Z\n1h\n";
        let script = format!("1\n{one}{one}x\n");
        let (result, _) = session(&settings(&root, None), &source, &script);
        result.unwrap();
        assert_eq!(run_dirs(&root).len(), 2);
    }

    #[test]
    fn unknown_preset_context_is_rejected() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::new(slos());
        let (result, _) = session(&settings(dir.path(), Some("nope")), &source, "");
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EbaError>(),
            Some(EbaError::UnknownContext(_))
        ));
        assert!(source.switched.borrow().is_empty());
    }

    #[test]
    fn fetch_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut source = FakeSource::new(slos());
        source.fail_fetch = true;
        let (result, _) = session(&settings(dir.path(), None), &source, "1\n");
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("unauthorized"));
        assert!(run_dirs(dir.path()).is_empty());
    }

    #[test]
    fn end_of_input_mid_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::new(slos());
        let (result, _) = session(&settings(dir.path(), None), &source, "1\n1\n1\nHalf Done\n");
        assert!(result.unwrap_err().to_string().contains("input closed"));
        assert!(run_dirs(dir.path()).is_empty());
    }

    #[test]
    fn several_templates_are_offered() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        workspace::init(&root).unwrap();
        std::fs::write(
            eba_core::paths::templates_dir(&root).join("a_minimal.yaml"),
            "kind: BudgetAdjustment\nmetadata:\n  name: {{name}}\nspec:\n  filters:\n    slos:\n      {{slos}}\n",
        )
        .unwrap();
        let source = FakeSource::new(slos());
        let script = "1\n2\n2\nMinimal\nx\n.\n1\n2026-08-01T00:00:00Z\n1h\n1\nx\n";
        let (result, out) = session(&settings(&root, None), &source, script);
        result.unwrap();
        assert!(out.contains("[1] a_minimal.yaml"));
        assert!(out.contains("[2] blank_do_not_delete.yml"));

        let runs = run_dirs(&root);
        let text = std::fs::read_to_string(runs[0].join("minimal.yml")).unwrap();
        assert!(!text.contains("displayName"));
        let doc: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(doc["metadata"]["name"], "minimal");
        assert_eq!(doc["spec"]["filters"]["slos"][0]["project"], "staging");
    }
}
