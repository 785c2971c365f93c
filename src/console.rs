//! Human-facing report written to stdout

use crossterm::style::Stylize;
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

/// Width of the separator between phases
pub const PHASE_RULE: usize = 80;
/// Width of the separator between secrets
pub const ITEM_RULE: usize = 40;

/// Status prefix printed in front of a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `[i]` for bucket summaries
    Info,
    /// `[i]` for secret metadata
    Detail,
    /// `[+]`
    Success,
    /// `[~]`
    Notice,
    /// `[!]`
    Failure,
}

impl Marker {
    fn text(self) -> &'static str {
        match self {
            Marker::Info | Marker::Detail => "[i]",
            Marker::Success => "[+]",
            Marker::Notice => "[~]",
            Marker::Failure => "[!]",
        }
    }
}

/// Line-oriented report writer with optional ANSI colors
pub struct Console<W: Write> {
    out: W,
    color: bool,
}

impl Console<io::Stdout> {
    /// Console on stdout; colors only when stdout is a terminal and `color` is set
    pub fn stdout(color: bool) -> Self {
        let out = io::stdout();
        let color = color && out.is_terminal();
        Self { out, color }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Phase title followed by an empty line
    pub fn heading(&mut self, title: &str) -> io::Result<()> {
        self.line(title)?;
        self.blank()
    }

    pub fn rule(&mut self, width: usize) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(width))
    }

    pub fn marked(&mut self, marker: Marker, text: impl Display) -> io::Result<()> {
        if !self.color {
            return writeln!(self.out, "{} {}", marker.text(), text);
        }

        let styled = match marker {
            Marker::Info => marker.text().cyan(),
            Marker::Detail => marker.text().blue(),
            Marker::Success => marker.text().green(),
            Marker::Notice => marker.text().yellow(),
            Marker::Failure => marker.text().red(),
        };
        writeln!(self.out, "{} {}", styled, text)
    }

    /// Emphasize a fragment inside a line
    pub fn bold(&self, text: impl Display) -> String {
        if self.color {
            format!("{}", text.to_string().bold())
        } else {
            text.to_string()
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Console<Vec<u8>>) -> io::Result<()>, color: bool) -> String {
        let mut console = Console::new(Vec::new(), color);
        f(&mut console).unwrap();
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn test_plain_markers() {
        let out = render(
            |c| {
                c.marked(Marker::Success, "done")?;
                c.marked(Marker::Notice, "nothing")?;
                c.marked(Marker::Failure, "broke")
            },
            false,
        );
        assert_eq!(out, "[+] done\n[~] nothing\n[!] broke\n");
    }

    #[test]
    fn test_heading_and_rule() {
        let out = render(
            |c| {
                c.rule(ITEM_RULE)?;
                c.heading("S3 Bucket Download")
            },
            false,
        );
        assert_eq!(out, format!("{}\nS3 Bucket Download\n\n", "-".repeat(40)));
    }

    #[test]
    fn test_bold_is_plain_without_color() {
        let console = Console::new(Vec::new(), false);
        assert_eq!(console.bold(3), "3");
    }

    #[test]
    fn test_color_output() {
        // crossterm drops colors when NO_COLOR is set
        if std::env::var("NO_COLOR").is_ok_and(|v| !v.is_empty()) {
            return;
        }

        let expected = [
            (Marker::Info, "\u{1b}[38;5;14m[i]"),
            (Marker::Detail, "\u{1b}[38;5;12m[i]"),
            (Marker::Success, "\u{1b}[38;5;10m[+]"),
            (Marker::Notice, "\u{1b}[38;5;11m[~]"),
            (Marker::Failure, "\u{1b}[38;5;9m[!]"),
        ];
        for (marker, prefix) in expected {
            let out = render(|c| c.marked(marker, "hello"), true);
            assert!(out.starts_with(prefix), "{:?} rendered as {:?}", marker, out);
            assert!(out.ends_with(" hello\n"));
        }

        let console = Console::new(Vec::new(), true);
        assert!(console.bold("name").contains("\u{1b}[1m"));
    }
}
