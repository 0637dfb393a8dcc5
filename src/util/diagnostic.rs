//! User-friendly diagnostic messages.
//!
//! Every fatal error reaching the entry point is rendered through
//! [`Diagnostic`]: the message, the related path, context lines and
//! suggested fixes.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no state file is found.
    pub const NO_STATE: &str = "Run `depbuild init` to create a fresh builder state";

    /// Suggestion when a download or extraction fails.
    pub const FETCH_FAILED: &str = "Check your network connection and that `tar`/`7z` are installed";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for a terminal, rustc style:
    ///
    /// ```text
    /// error: prefix directory /w/date-3.0.0/prefix already exists
    ///   --> /w/date-3.0.0/prefix
    ///    = note: code: depbuild::dirs::exists
    /// help: remove the stale directory or pass an explicit --prefix/--build-dir
    /// ```
    pub fn format(&self, color: bool) -> String {
        use std::fmt::Write;

        let paint = |code: &str, text: &str| {
            if color {
                format!("\x1b[{}m{}\x1b[0m", code, text)
            } else {
                text.to_string()
            }
        };
        let head = match self.severity {
            Severity::Error => paint("1;31", "error"),
            Severity::Warning => paint("1;33", "warning"),
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", head, self.message);
        if let Some(path) = &self.location {
            let _ = writeln!(out, "  --> {}", path.display());
        }
        for note in &self.context {
            let _ = writeln!(out, "   = note: {}", note);
        }
        for suggestion in &self.suggestions {
            let _ = writeln!(out, "{}: {}", paint("1;32", "help"), suggestion);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("Exit code 2 while executing \"make install\"")
            .with_context("while building `cyrus-sasl`")
            .with_suggestion("Install gdbm development headers")
            .with_suggestion("Run again with --verbose");

        let output = diag.format(false);
        assert!(output.contains("error: Exit code 2"));
        assert!(output.contains("   = note: while building `cyrus-sasl`"));
        assert!(output.contains("help: Install gdbm development headers\nhelp: Run again with --verbose"));
    }

    #[test]
    fn test_warning_keeps_message() {
        let diag = Diagnostic::warning("source directory not found");
        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.format(false).starts_with("warning: source directory not found"));
    }
}
