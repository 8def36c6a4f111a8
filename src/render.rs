//! Line rendering: the only place that writes bytes to the terminal.

use std::borrow::Cow;
use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    queue,
    style::{PrintStyledContent, Stylize},
    terminal::{self, Clear, ClearType},
};
use unicode_width::UnicodeWidthChar;

use crate::Outcome;

/// Output surface used by a spinner.
///
/// Everything except [`finish_line`] and [`line_break`] rewrites the current
/// line in place.
///
/// [`finish_line`]: LineRenderer::finish_line
/// [`line_break`]: LineRenderer::line_break
pub trait LineRenderer: Send {
    /// Overwrite the current line from column 0 without a trailing newline.
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// Erase whatever is visible on the current line.
    fn blank_line(&mut self) -> io::Result<()>;

    fn hide_cursor(&mut self) -> io::Result<()>;

    fn show_cursor(&mut self) -> io::Result<()>;

    /// Leave the current line as it is and move to the next one.
    fn line_break(&mut self) -> io::Result<()>;

    /// Write the closing line of a run, colored by outcome, then a newline.
    fn finish_line(&mut self, outcome: Outcome, text: &str) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy)]
enum Width {
    /// Query the terminal on every frame.
    Measured,
    Fixed(usize),
}

/// Renders through crossterm onto any writer, stdout by default.
///
/// When the writer is not a terminal, cursor and clear-line escapes are
/// skipped; blanking falls back to overwriting the last frame with spaces.
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    is_terminal: bool,
    width: Width,
    last_width: usize,
}

impl TerminalRenderer<Stdout> {
    pub fn stdout(is_terminal: bool) -> Self {
        Self::new(io::stdout(), is_terminal)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub const fn new(out: W, is_terminal: bool) -> Self {
        Self {
            out,
            is_terminal,
            width: Width::Measured,
            last_width: 0,
        }
    }

    /// Use a fixed column count instead of asking the terminal.
    #[must_use]
    pub const fn with_columns(mut self, columns: usize) -> Self {
        self.width = Width::Fixed(columns);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn columns(&self) -> Option<usize> {
        match self.width {
            Width::Fixed(columns) => Some(columns),
            Width::Measured if self.is_terminal => match terminal::size() {
                Ok((columns, _)) => Some(usize::from(columns)),
                Err(err) => {
                    tracing::debug!(%err, "terminal size unavailable, not truncating");
                    None
                }
            },
            Width::Measured => None,
        }
    }
}

impl<W: Write + Send> LineRenderer for TerminalRenderer<W> {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        let text = match self.columns() {
            // Keep the last column free so the cursor never wraps.
            Some(columns) => fit_to_width(text, columns.saturating_sub(1)),
            None => Cow::Borrowed(text),
        };
        write!(self.out, "\r{text}")?;
        self.last_width = display_width(&text);
        self.out.flush()
    }

    fn blank_line(&mut self) -> io::Result<()> {
        if self.is_terminal {
            queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        } else {
            write!(self.out, "\r{}\r", " ".repeat(self.last_width))?;
        }
        self.last_width = 0;
        self.out.flush()
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        if self.is_terminal {
            queue!(self.out, Hide)?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        if self.is_terminal {
            queue!(self.out, Show)?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn line_break(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.last_width = 0;
        self.out.flush()
    }

    fn finish_line(&mut self, outcome: Outcome, text: &str) -> io::Result<()> {
        write!(self.out, "\r")?;
        if self.is_terminal {
            let styled = match outcome {
                Outcome::Success => text.green(),
                Outcome::Error => text.red(),
            };
            queue!(self.out, PrintStyledContent(styled))?;
        } else {
            write!(self.out, "{text}")?;
        }
        writeln!(self.out)?;
        self.last_width = 0;
        self.out.flush()
    }
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Cut `text` down to at most `columns` display columns.
fn fit_to_width(text: &str, columns: usize) -> Cow<'_, str> {
    let mut used = 0;
    for (idx, c) in text.char_indices() {
        used += c.width().unwrap_or(0);
        if used > columns {
            return Cow::Owned(text[..idx].to_string());
        }
    }
    Cow::Borrowed(text)
}
