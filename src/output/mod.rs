//! User-facing output for lem.
//!
//! Status lines go to an [`Output`] owned by the loaded configuration rather
//! than to a process-wide printer, so callers (and tests) choose the sink and
//! whether it is colored. Diagnostics go through `tracing` instead.

mod table;

use colored::{ColoredString, Colorize};
use std::io::{self, IsTerminal, Write};

pub use table::render_entries;

/// Destination for status lines.
pub struct Output {
    /// Underlying sink
    writer: Box<dyn Write + Send>,
    /// Whether to emit ANSI colors
    colorize: bool,
}

impl Output {
    /// Creates an output over any writer.
    pub fn new(writer: impl Write + Send + 'static, colorize: bool) -> Self {
        Self {
            writer: Box::new(writer),
            colorize,
        }
    }

    /// Uncolored output, convenient for capturing in tests.
    pub fn plain(writer: impl Write + Send + 'static) -> Self {
        Self::new(writer, false)
    }

    /// Standard output, colored when it is a terminal.
    #[must_use]
    pub fn stdout() -> Self {
        let colorize = io::stdout().is_terminal();
        Self::new(io::stdout(), colorize)
    }

    /// Output that discards everything.
    #[must_use]
    pub fn sink() -> Self {
        Self::plain(io::sink())
    }

    /// Whether this output emits colors.
    #[must_use]
    pub const fn is_colored(&self) -> bool {
        self.colorize
    }

    /// Turns colors on or off.
    pub fn set_colorize(&mut self, colorize: bool) {
        self.colorize = colorize;
    }

    /// Applies `style` when coloring is enabled.
    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.colorize {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Writes a raw line. Output is best-effort: a closed pipe must not turn
    /// a successful distribution into a failure.
    pub fn line(&mut self, text: &str) {
        let _ = writeln!(self.writer, "{text}");
    }

    /// Writes raw text without adding a newline.
    pub fn raw(&mut self, text: &str) {
        let _ = self.writer.write_all(text.as_bytes());
        let _ = self.writer.flush();
    }

    /// `label: subject -> target` with the label and arrow dimmed.
    pub fn transfer(&mut self, label: &str, subject: &str, target: &str) {
        let line = self.format_transfer(label, subject, target);
        self.line(&line);
    }

    /// Formats a transfer line without writing it, so callers can sort.
    #[must_use]
    pub fn format_transfer(&self, label: &str, subject: &str, target: &str) -> String {
        format!(
            "{} {subject} {} {target}",
            self.paint(&format!("{label}:"), |s| s.bright_black()),
            self.paint("->", |s| s.bright_black()),
        )
    }

    /// Highlighted notice, e.g. `switched: prod`.
    pub fn notice(&mut self, text: &str) {
        let line = self.paint(text, |s| s.bright_cyan());
        self.line(&line);
    }

    /// Success message in green.
    pub fn success(&mut self, text: &str) {
        let line = self.paint(text, |s| s.bright_green());
        self.line(&line);
    }

    /// Warning in bold yellow.
    pub fn warning(&mut self, text: &str) {
        let line = self.paint(text, |s| s.yellow().bold());
        self.line(&line);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("colorize", &self.colorize)
            .finish_non_exhaustive()
    }
}

/// Shared in-memory buffer usable as an [`Output`] sink and read back later.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        let guard = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        String::from_utf8_lossy(&guard).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
