//! Text formatting for the console's 16×2 character display, and the trait through which lines reach it.

use std::io::{self, Write};

/// Number of character columns on the display.
pub const COLUMNS: usize = 16;

/// Number of lines on the display.
pub const ROWS: usize = 2;

/// The full contents of the display, top line first.
pub type Lines = [String; ROWS];

/// Lays out a line with optional navigation arrows.
///
/// The first two columns always belong to the left arrow (`"< "`), even when it isn't shown. When a right arrow is
/// requested, the text is padded so that `" >"` lands in the last two columns. Text that doesn't fit is truncated,
/// never wrapped.
pub fn format_arrows(text: &str, left: bool, right: bool) -> String {
    let mut width = COLUMNS - 2;
    if right {
        width -= 2;
    }

    let text: String = text.chars().take(width).collect();
    let prefix = if left { "< " } else { "  " };
    if right {
        // only pad when there is a right arrow, otherwise trailing spaces are left to `fit_line`
        format!("{prefix}{text:width$} >")
    } else {
        format!("{prefix}{text}")
    }
}

/// Truncates or pads a line to exactly [`COLUMNS`] characters.
pub fn fit_line(text: &str) -> String {
    let text: String = text.chars().take(COLUMNS).collect();
    format!("{text:COLUMNS$}")
}

/// A device which shows lines of text.
///
/// Write failures are transport faults; they are returned to the caller rather than retried.
pub trait TextDisplay {
    /// Writes one line, which the implementation fits to the display width.
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// Writes every line of a screen, top to bottom.
    fn show(&mut self, lines: &Lines) -> io::Result<()> {
        for line in lines {
            self.write_line(line)?;
        }
        Ok(())
    }

    /// Clears the display by writing empty lines.
    fn blank(&mut self) -> io::Result<()> {
        for _ in 0..ROWS {
            self.write_line("")?;
        }
        Ok(())
    }
}

/// A [`TextDisplay`] for character display units driven over a byte stream, such as a serial line.
///
/// Each line is fitted to [`COLUMNS`] characters, terminated with `\n`, and written as UTF-8. The unit scrolls on
/// its own, so writing [`ROWS`] lines replaces whatever was shown before.
pub struct CharacterDisplay<W> {
    writer: W,
}

impl<W: Write> CharacterDisplay<W> {
    /// Wraps a writer connected to the display unit.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> TextDisplay for CharacterDisplay<W> {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        let mut line = fit_line(text);
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }
}
