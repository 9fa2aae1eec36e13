use crate::prompt::Prompter;
use anyhow::Context;
use eba_core::source::SloSource;
use eba_core::EbaError;
use std::io::{BufRead, Write};

/// Pick a sloctl context (or take `preset`) and make it the active one.
pub fn select<S, R, W>(
    source: &S,
    preset: Option<&str>,
    p: &mut Prompter<R, W>,
) -> anyhow::Result<String>
where
    S: SloSource + ?Sized,
    R: BufRead,
    W: Write,
{
    let contexts = source
        .list_contexts()
        .context("failed to list sloctl contexts")?;

    let chosen = match preset {
        Some(name) => {
            if !contexts.iter().any(|c| c == name) {
                return Err(EbaError::UnknownContext(name.to_string()).into());
            }
            name.to_string()
        }
        None => {
            let idx = p.choose("Select a context", &contexts)?;
            contexts[idx].clone()
        }
    };

    source
        .use_context(&chosen)
        .with_context(|| format!("failed to switch to context '{chosen}'"))?;
    tracing::debug!(context = %chosen, "context switched");
    p.success(&format!("Using context '{chosen}'"))?;
    Ok(chosen)
}
