use eba_core::batch::Output;
use owo_colors::OwoColorize;
use std::io::{IsTerminal, Write};
use std::path::Path;

/// Terminal palette. Colors are only emitted when stdout is a terminal and
/// `NO_COLOR` is unset, so piped output and tests see plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    color: bool,
}

impl Style {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn detect() -> Self {
        Self {
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn heading(self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn key(self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn hint(self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn error(self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }
}

pub fn write_table<W: Write>(
    out: &mut W,
    headers: &[&str],
    rows: &[Vec<String>],
) -> std::io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    writeln!(out, "{}", header_row.join("  ").trim_end())?;

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    writeln!(out, "{}", sep.join("  "))?;

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        writeln!(out, "{}", cells.join("  ").trim_end())?;
    }
    Ok(())
}

/// Summary printed after a run: one row per file, totals, and how to apply.
pub fn write_summary<W: Write>(out: &mut W, style: Style, result: &Output) -> std::io::Result<()> {
    let dir = absolute(&result.dir);
    let rows: Vec<Vec<String>> = result
        .files
        .iter()
        .map(|file| {
            let name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            vec![name, file.slos.to_string()]
        })
        .collect();

    writeln!(out)?;
    writeln!(out, "{}", style.success("Budget adjustments written"))?;
    write_table(out, &["FILE", "SLOS"], &rows)?;
    writeln!(out)?;
    writeln!(out, "Files created: {}", result.files.len())?;
    writeln!(out, "Total SLOs:    {}", result.total_slos)?;
    writeln!(out, "Folder:        {}", dir.display())?;
    writeln!(
        out,
        "{}",
        style.hint(&format!(
            "Review the files, then apply them with: sloctl apply -f {}",
            dir.display()
        ))
    )?;
    Ok(())
}

fn absolute(path: &Path) -> std::path::PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
