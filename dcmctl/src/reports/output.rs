//! Styled output sink for reporters.

use colored::Colorize;

/// Style tag attached to a piece of report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Plain,
    Create,
    Alter,
    Drop,
    Unknown,
    Domain,
    Status,
    Inserted,
    Removed,
    Pass,
    Fail,
    Bold,
}

/// Text plus its style, the unit reporters hand to summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledText {
    pub text: String,
    pub style: Style,
}

impl StyledText {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::Plain)
    }
}

/// Append-ordered styled terminal stream.
///
/// Reporters say *what* to print; implementations decide how styles render.
pub trait Output {
    fn styled(&mut self, text: &str, style: Style);

    fn plain(&mut self, text: &str) {
        self.styled(text, Style::Plain);
    }
}

/// Writes to stdout with ANSI colors.
#[derive(Debug, Default)]
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Output for TerminalOutput {
    fn styled(&mut self, text: &str, style: Style) {
        match style {
            Style::Plain | Style::Status => print!("{text}"),
            Style::Create | Style::Inserted | Style::Pass => print!("{}", text.green()),
            Style::Alter => print!("{}", text.yellow()),
            Style::Drop | Style::Removed | Style::Fail => print!("{}", text.red()),
            Style::Domain => print!("{}", text.cyan()),
            Style::Unknown => print!("{}", text.dimmed()),
            Style::Bold => print!("{}", text.bold()),
        }
    }
}

/// Captures plain text; report tests assert against the buffer contents.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct PlainBuffer {
    buffer: String,
}

#[cfg(test)]
impl PlainBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
impl Output for PlainBuffer {
    fn styled(&mut self, text: &str, _style: Style) {
        self.buffer.push_str(text);
    }
}
