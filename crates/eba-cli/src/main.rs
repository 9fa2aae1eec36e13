use anyhow::{bail, Context};
use clap::Parser;
use eba_cli::cmd::{self, Settings};
use eba_cli::prompt::Prompter;
use eba_core::config::{EbaConfig, WarnLevel};
use eba_core::paths;
use eba_core::source::Sloctl;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "eba",
    about = "Generate Nobl9 error budget adjustment YAML from your SLOs",
    version
)]
struct Cli {
    /// Working directory for templates and generated files
    #[arg(long, env = "EBA_DIR", default_value = paths::EBA_DIR)]
    dir: PathBuf,

    /// Path to the sloctl binary (default: config.yaml, then PATH)
    #[arg(long, env = "EBA_SLOCTL")]
    sloctl: Option<PathBuf>,

    /// Use this sloctl context instead of asking
    #[arg(long)]
    context: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = EbaConfig::load(&cli.dir)
        .with_context(|| format!("failed to load {}", paths::config_path(&cli.dir).display()))?;

    let warnings = config.validate();
    for w in &warnings {
        match w.level {
            WarnLevel::Warning => tracing::warn!("config: {}", w.message),
            WarnLevel::Error => eprintln!("config error: {}", w.message),
        }
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        bail!("invalid {}", paths::config_path(&cli.dir).display());
    }

    let sloctl = Sloctl::locate(cli.sloctl.as_deref().or(config.sloctl.as_deref()))?;

    let settings = Settings {
        root: cli.dir,
        context: cli.context,
        batch_size: config.batch_size,
        extension: config.output_extension,
    };
    let mut prompter = Prompter::stdio();
    cmd::run(&settings, &sloctl, &mut prompter)
}
