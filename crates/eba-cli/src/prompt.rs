//! Line-oriented terminal prompts.
//!
//! `Prompter` is generic over its input and output so the whole interactive
//! flow can be scripted in tests with `Cursor` and `Vec<u8>`. Every question
//! takes a pure validator; a rejected answer is reported and asked again.
//! End of input while waiting for an answer aborts with an error.

use crate::output::Style;
use anyhow::bail;
use std::io::{self, BufRead, Write};

/// Line that ends a multi-line answer.
pub const END_OF_TEXT: &str = ".";

pub struct Prompter<R, W> {
    input: R,
    out: W,
    style: Style,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), Style::detect())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W, style: Style) -> Self {
        Self { input, out, style }
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    pub fn heading(&mut self, text: &str) -> io::Result<()> {
        let styled = self.style.heading(text);
        writeln!(self.out)?;
        writeln!(self.out, "{styled}")
    }

    pub fn hint(&mut self, text: &str) -> io::Result<()> {
        let styled = self.style.hint(text);
        writeln!(self.out, "{styled}")
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        let styled = self.style.success(text);
        writeln!(self.out, "{styled}")
    }

    pub fn reject(&mut self, reason: &str) -> io::Result<()> {
        let styled = self.style.error(&format!("✗ {reason}"));
        writeln!(self.out, "{styled}")
    }

    /// One line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn ask_raw(&mut self, label: &str) -> anyhow::Result<String> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;
        match self.read_line()? {
            Some(line) => Ok(line),
            None => bail!("input closed while waiting for {}", label.to_lowercase()),
        }
    }

    /// Ask until `validate` accepts the answer.
    pub fn ask<T>(
        &mut self,
        label: &str,
        validate: impl Fn(&str) -> Result<T, String>,
    ) -> anyhow::Result<T> {
        loop {
            let answer = self.ask_raw(label)?;
            match validate(&answer) {
                Ok(value) => return Ok(value),
                Err(reason) => self.reject(&reason)?,
            }
        }
    }

    /// Multi-line answer ending with a line holding only `.`, or end of input
    /// once at least one line was entered. The whole text is validated and
    /// asked again on rejection.
    pub fn ask_multiline<T>(
        &mut self,
        label: &str,
        validate: impl Fn(&str) -> Result<T, String>,
    ) -> anyhow::Result<T> {
        loop {
            let hint = format!("{label} (finish with a line containing only '{END_OF_TEXT}'):");
            writeln!(self.out, "{hint}")?;
            self.out.flush()?;

            let mut lines: Vec<String> = Vec::new();
            let mut closed = false;
            loop {
                match self.read_line()? {
                    Some(line) if line.trim_end() == END_OF_TEXT => break,
                    Some(line) => lines.push(line),
                    None => {
                        closed = true;
                        break;
                    }
                }
            }
            if closed && lines.is_empty() {
                bail!("input closed while waiting for {}", label.to_lowercase());
            }
            match validate(&lines.join("\n")) {
                Ok(value) => return Ok(value),
                Err(reason) if !closed => self.reject(&reason)?,
                Err(reason) => bail!("{reason}"),
            }
        }
    }

    /// Numbered single choice; returns the 0-based index.
    pub fn choose(&mut self, title: &str, items: &[String]) -> anyhow::Result<usize> {
        if items.is_empty() {
            bail!("nothing to choose from for {}", title.to_lowercase());
        }
        self.heading(title)?;
        for (i, item) in items.iter().enumerate() {
            let key = self.style.key(&format!("[{}]", i + 1));
            writeln!(self.out, "  {key} {item}")?;
        }
        let len = items.len();
        self.ask("Enter number", |raw| parse_choice(raw, len))
    }

    /// Keyed menu such as `[1] List projects` / `[x] Exit`; returns the key.
    pub fn menu(&mut self, title: &str, entries: &[(&str, &str)]) -> anyhow::Result<String> {
        self.heading(title)?;
        for (key, label) in entries {
            let key = self.style.key(&format!("[{key}]"));
            writeln!(self.out, "  {key} {label}")?;
        }
        self.ask("Choose an option", |raw| {
            let wanted = raw.trim();
            entries
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(wanted))
                .map(|(key, _)| key.to_string())
                .ok_or_else(|| format!("'{wanted}' is not one of the listed options"))
        })
    }

    /// Numbered multi choice: `1,3,5-7`. Returns 0-based indices in the
    /// order entered.
    pub fn multi_select(&mut self, title: &str, items: &[String]) -> anyhow::Result<Vec<usize>> {
        if items.is_empty() {
            bail!("nothing to choose from for {}", title.to_lowercase());
        }
        self.heading(title)?;
        for (i, item) in items.iter().enumerate() {
            let key = self.style.key(&format!("[{}]", i + 1));
            writeln!(self.out, "  {key} {item}")?;
        }
        self.hint("Enter numbers separated by commas; ranges like 4-9 are allowed.")?;
        let len = items.len();
        self.ask("Enter numbers", |raw| parse_indices(raw, len))
    }
}

// ---------------------------------------------------------------------------
// Answer parsing
// ---------------------------------------------------------------------------

/// A 1-based menu number to a 0-based index.
pub fn parse_choice(raw: &str, len: usize) -> Result<usize, String> {
    let value = raw.trim();
    match value.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(format!("enter a number between 1 and {len}")),
    }
}

/// `1,3,5-7` to 0-based indices, first occurrence kept.
pub fn parse_indices(raw: &str, len: usize) -> Result<Vec<usize>, String> {
    let mut out: Vec<usize> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (lo, hi) = match part.split_once('-') {
            Some((a, b)) => (parse_choice(a, len)?, parse_choice(b, len)?),
            None => {
                let n = parse_choice(part, len)?;
                (n, n)
            }
        };
        if lo > hi {
            return Err(format!("range '{part}' runs backwards"));
        }
        for i in lo..=hi {
            if !out.contains(&i) {
                out.push(i);
            }
        }
    }
    if out.is_empty() {
        return Err("select at least one entry".into());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), Style::plain())
    }

    fn transcript(p: Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.into_output()).unwrap()
    }

    #[test]
    fn ask_reprompts_until_valid() {
        let mut p = prompter("\nabc\n42\n");
        let n: u32 = p
            .ask("Count", |raw| {
                raw.trim().parse::<u32>().map_err(|_| "not a number".to_string())
            })
            .unwrap();
        assert_eq!(n, 42);
        let text = transcript(p);
        assert_eq!(text.matches("Count: ").count(), 3);
        assert_eq!(text.matches("✗ not a number").count(), 2);
    }

    #[test]
    fn ask_fails_at_end_of_input() {
        let mut p = prompter("bad\n");
        let err = p
            .ask("Display name", |_| Err::<(), _>("nope".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }

    #[test]
    fn crlf_is_stripped() {
        let mut p = prompter("hello\r\n");
        let v = p.ask("Greeting", |raw| Ok::<_, String>(raw.to_string())).unwrap();
        assert_eq!(v, "hello");
    }

    #[test]
    fn multiline_stops_at_dot() {
        let mut p = prompter("# Window\n\n- db: upgrade\n.\nnext\n");
        let text = p
            .ask_multiline("Description", |raw| Ok::<_, String>(raw.to_string()))
            .unwrap();
        assert_eq!(text, "# Window\n\n- db: upgrade");
        let rest = p.ask("Next", |raw| Ok::<_, String>(raw.to_string())).unwrap();
        assert_eq!(rest, "next");
    }

    #[test]
    fn multiline_accepts_end_of_input_after_text() {
        let mut p = prompter("only line");
        let text = p
            .ask_multiline("Description", |raw| Ok::<_, String>(raw.to_string()))
            .unwrap();
        assert_eq!(text, "only line");
    }

    #[test]
    fn multiline_reprompts_on_rejection() {
        let mut p = prompter("bad\n.\ngood\n.\n");
        let text = p
            .ask_multiline("Description", |raw| {
                if raw == "bad" {
                    Err("too bad".to_string())
                } else {
                    Ok(raw.to_string())
                }
            })
            .unwrap();
        assert_eq!(text, "good");
        assert!(transcript(p).contains("✗ too bad"));
    }

    #[test]
    fn multiline_empty_input_is_an_error() {
        let mut p = prompter("");
        assert!(p
            .ask_multiline("Description", |raw| Ok::<_, String>(raw.to_string()))
            .is_err());
    }

    #[test]
    fn choose_lists_numbered_items() {
        let mut p = prompter("0\n3\n2\n");
        let items = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(p.choose("Select a context", &items).unwrap(), 1);
        let text = transcript(p);
        assert!(text.contains("[1] alpha"));
        assert!(text.contains("[2] beta"));
        assert_eq!(text.matches("enter a number between 1 and 2").count(), 2);
    }

    #[test]
    fn menu_matches_keys_case_insensitively() {
        let mut p = prompter("9\nX\n");
        let key = p
            .menu("Main menu", &[("1", "List projects"), ("x", "Exit")])
            .unwrap();
        assert_eq!(key, "x");
        assert!(transcript(p).contains("'9' is not one of the listed options"));
    }

    #[test]
    fn indices_with_ranges_and_repeats() {
        assert_eq!(parse_indices("1, 3-5,3", 6).unwrap(), vec![0, 2, 3, 4]);
        assert_eq!(parse_indices("6-6", 6).unwrap(), vec![5]);
        assert!(parse_indices("", 6).is_err());
        assert!(parse_indices("7", 6).is_err());
        assert!(parse_indices("5-2", 6).is_err());
        assert!(parse_indices("a", 6).is_err());
    }
}
