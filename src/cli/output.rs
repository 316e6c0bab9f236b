//! Colored terminal output for the release command

use std::io::{self, Write};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.quiet)
    }
}

/// Leading marker of a line and how it is colored
struct Marker {
    symbol: &'static str,
    color: Color,
    bold: bool,
    /// Color the message text as well as the marker
    tint_message: bool,
}

impl Marker {
    const INFO: Marker = Marker::plain("ℹ", Color::Cyan, false);
    const SUCCESS: Marker = Marker::plain("✓", Color::Green, true);
    const WARN: Marker = Marker::tinted("⚠", Color::Yellow, true);
    const ERROR: Marker = Marker::tinted("✗", Color::Red, true);
    const HINT: Marker = Marker::plain("    →", Color::Yellow, false);

    const fn plain(symbol: &'static str, color: Color, bold: bool) -> Self {
        Self {
            symbol,
            color,
            bold,
            tint_message: false,
        }
    }

    const fn tinted(symbol: &'static str, color: Color, bold: bool) -> Self {
        Self {
            symbol,
            color,
            bold,
            tint_message: true,
        }
    }

    fn render(&self, buffer: &mut Buffer, message: &str) -> io::Result<()> {
        buffer.set_color(ColorSpec::new().set_fg(Some(self.color)).set_bold(self.bold))?;
        write!(buffer, "{}", self.symbol)?;
        buffer.reset()?;
        if self.tint_message {
            buffer.set_color(ColorSpec::new().set_fg(Some(self.color)))?;
        }
        writeln!(buffer, " {}", message)?;
        buffer.reset()
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(quiet: bool) -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            quiet,
        }
    }

    /// Print an info message (normal output)
    pub fn info(&self, message: &str) -> io::Result<()> {
        self.to_stdout(|buffer| Marker::INFO.render(buffer, message))
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.to_stdout(|buffer| Marker::SUCCESS.render(buffer, message))
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        self.to_stdout(|buffer| Marker::WARN.render(buffer, message))
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        self.to_stdout(|buffer| {
            buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
            writeln!(buffer, "═══ {} ═══", title)?;
            buffer.reset()
        })
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.to_stdout(|buffer| writeln!(buffer, "    {}", message))
    }

    /// Print an error message to stderr (always shown)
    pub fn error(&self, message: &str) {
        Self::to_stderr(&Marker::ERROR, message);
    }

    /// Print a recovery hint below an error (always shown, on stderr)
    pub fn hint(&self, message: &str) {
        Self::to_stderr(&Marker::HINT, message);
    }

    fn to_stdout(&self, write: impl FnOnce(&mut Buffer) -> io::Result<()>) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.stdout.buffer();
        write(&mut buffer)?;
        self.stdout.print(&buffer)
    }

    fn to_stderr(marker: &Marker, message: &str) {
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = stderr.buffer();
        if marker.render(&mut buffer, message).is_err() || stderr.print(&buffer).is_err() {
            // stderr unusable
            println!("{} {}", marker.symbol, message);
        }
    }
}
