//! The error type: message, optional code, captured trace, cause chain.

use crate::trace::{StackTrace, MAX_FRAMES};
use std::fmt;

// Frames to hop so a capture starts at the constructor's caller rather
// than inside the capture machinery. Best-effort; inlining can shift it.
const CAPTURE_SKIP: usize = 4;

/// An immutable diagnostic record for a single failure.
///
/// An `Error` carries:
/// - `message`: human-readable description, required and non-empty
/// - `code`: optional application-defined integer
/// - `trace`: the stack captured when the error was constructed
/// - `cause`: optional prior `Error`, owned, forming a singly-linked chain
///
/// Errors are constructed at the point a failure is detected and are
/// immutable afterwards. Wrapping an error in another never touches the
/// inner link, so provenance always points at the original failure site.
///
/// # Example
///
/// ```rust
/// use restrace::Error;
///
/// let inner = Error::new("file not found").with_code(404);
/// let outer = Error::wrap("failed to load config", inner);
///
/// assert_eq!(outer.message(), "failed to load config");
/// assert_eq!(outer.cause().map(|e| e.code()), Some(Some(404)));
/// ```
pub struct Error {
    message: String,
    code: Option<i32>,
    trace: StackTrace,
    cause: Option<Box<Error>>,
}

impl Error {
    /// Create a new error with the given message, capturing the current
    /// stack.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if the message is empty.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        debug_assert!(!message.is_empty(), "error message must be non-empty");
        Self {
            message,
            code: None,
            trace: StackTrace::capture(CAPTURE_SKIP),
            cause: None,
        }
    }

    /// Create a new error that wraps `cause`, capturing a fresh stack at
    /// this call site. The cause is taken by value and owned by the new
    /// error; its own trace and chain are preserved unchanged.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if the message is empty.
    pub fn wrap(message: impl Into<String>, cause: Error) -> Self {
        let message = message.into();
        debug_assert!(!message.is_empty(), "error message must be non-empty");
        Self {
            message,
            code: None,
            trace: StackTrace::capture(CAPTURE_SKIP),
            cause: Some(Box::new(cause)),
        }
    }

    /// Absorb a foreign error as the cause chain of a new error.
    ///
    /// The foreign chain (via [`anyhow::Error::chain`]) becomes native
    /// links, innermost last. Only the new outer error captures a stack —
    /// the foreign links' true capture sites are unknowable, so they carry
    /// empty traces.
    pub fn from_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        let source = source.into();
        let mut cause: Option<Box<Error>> = None;
        for link in source.chain().rev() {
            cause = Some(Box::new(Error {
                message: link.to_string(),
                code: None,
                trace: StackTrace::empty(),
                cause,
            }));
        }
        Self {
            message: message.into(),
            code: None,
            trace: StackTrace::capture(CAPTURE_SKIP),
            cause,
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the application-defined code, if one was set.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Get the stack trace captured when this error was constructed.
    pub fn trace(&self) -> &StackTrace {
        &self.trace
    }

    /// Get the wrapped cause, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// Iterate over the chain, outermost (this error) first.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Number of links in the chain, including this error. An error
    /// produced by n nested [`Error::wrap`] calls has chain length n + 1.
    pub fn chain_len(&self) -> usize {
        self.chain().count()
    }

    // =========================================================================
    // Builders (chainable)
    // =========================================================================

    /// Set the application-defined code.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render the full chain as multi-line diagnostic text.
    ///
    /// Format, per link:
    ///
    /// ```text
    /// <message> (code <code>)                  code line only if set
    ///     at <symbol> (<file>:<line>)          fully resolved frame
    ///     at <symbol> (0x<addr>)               no source location
    ///     at 0x<addr>                          unresolved frame
    ///     (stack truncated at 64 frames)       only if capture truncated
    /// caused by: <next link, same layout>
    /// ```
    ///
    /// The output begins with the outermost message and contains exactly
    /// one `caused by: ` separator per wrapped link. It is deterministic
    /// for identical messages, codes, and frame content; raw addresses are
    /// rendered verbatim and may differ between runs.
    pub fn to_text(&self) -> String {
        format!("{:?}", self)
    }

    fn render_chain(&self, out: &mut impl fmt::Write) -> fmt::Result {
        for (depth, link) in self.chain().enumerate() {
            if depth > 0 {
                write!(out, "caused by: ")?;
            }
            write!(out, "{}", link.message)?;
            if let Some(code) = link.code {
                write!(out, " (code {})", code)?;
            }
            writeln!(out)?;
            for frame in link.trace.frames() {
                writeln!(out, "    {}", frame)?;
            }
            if link.trace.truncated() {
                writeln!(out, "    (stack truncated at {} frames)", MAX_FRAMES)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Display - compact, single-line format for logs
// =============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, link) in self.chain().enumerate() {
            if depth > 0 {
                write!(f, ": ")?;
            }
            write!(f, "{}", link.message)?;
            if let Some(code) = link.code {
                write!(f, " (code {})", code)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Debug - verbose, multi-line chain rendering with stack traces
// =============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render_chain(f)
    }
}

// =============================================================================
// std::error::Error implementation
// =============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// =============================================================================
// Convenient From implementations (be careful not to leak raw errors!)
// =============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = err.raw_os_error();
        let mut error = Error::new(err.to_string());
        error.code = code;
        error
    }
}

/// Iterator over an error chain, outermost first.
pub struct Chain<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<&'a Error> {
        let current = self.next?;
        self.next = current.cause();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caused_by_count(text: &str) -> usize {
        text.lines().filter(|l| l.starts_with("caused by: ")).count()
    }

    #[test]
    fn test_error_creation() {
        let err = Error::new("disk error");
        assert_eq!(err.message(), "disk error");
        assert_eq!(err.code(), None);
        assert!(err.cause().is_none());
        assert_eq!(err.chain_len(), 1);
    }

    #[test]
    fn test_error_with_code() {
        let err = Error::new("file not found").with_code(404);
        assert_eq!(err.code(), Some(404));
    }

    #[test]
    fn test_capture_happens_at_construction() {
        let err = Error::new("boom");
        assert!(!err.trace().is_empty());
    }

    #[test]
    fn test_wrap_preserves_cause() {
        let inner = Error::new("connection refused").with_code(111);
        let inner_rendered = inner.to_text();

        let outer = Error::wrap("failed to reach server", inner);
        let cause = outer.cause().unwrap();
        assert_eq!(cause.message(), "connection refused");
        assert_eq!(cause.code(), Some(111));
        assert_eq!(cause.to_text(), inner_rendered);
    }

    #[test]
    fn test_wrap_captures_outer_trace() {
        let inner = Error::new("inner");
        let inner_ips: Vec<usize> = inner.trace().frames().iter().map(|f| f.ip()).collect();

        let outer = Error::wrap("outer", inner);
        assert!(!outer.trace().is_empty());
        // Different construction sites leave different return addresses
        // somewhere in the walk.
        let outer_ips: Vec<usize> = outer.trace().frames().iter().map(|f| f.ip()).collect();
        assert_ne!(outer_ips, inner_ips);
    }

    #[test]
    fn test_chain_depth_matches_wrap_count() {
        let mut err = Error::new("root");
        for depth in 1..=5 {
            err = Error::wrap(format!("layer {}", depth), err);
            assert_eq!(err.chain_len(), depth + 1);
        }

        let text = err.to_text();
        assert_eq!(caused_by_count(&text), 5);
    }

    #[test]
    fn test_chain_order_is_outermost_first() {
        let err = Error::wrap("outer", Error::wrap("middle", Error::new("root")));
        let messages: Vec<&str> = err.chain().map(|e| e.message()).collect();
        assert_eq!(messages, ["outer", "middle", "root"]);
    }

    #[test]
    fn test_to_text_begins_with_message_and_code() {
        let err = Error::new("file not found").with_code(404);
        let text = err.to_text();
        assert!(text.starts_with("file not found (code 404)"));
        // At least one frame line under the message.
        assert!(text.lines().any(|l| l.starts_with("    at ")));
    }

    #[test]
    fn test_to_text_renders_each_link() {
        let err = Error::wrap(
            "failed to load config",
            Error::new("file not found").with_code(404),
        );
        let text = err.to_text();
        assert!(text.starts_with("failed to load config"));
        assert!(text.contains("caused by: file not found (code 404)"));
        assert_eq!(caused_by_count(&text), 1);
    }

    #[test]
    fn test_display_is_compact_chain() {
        let err = Error::wrap(
            "failed to load config",
            Error::new("file not found").with_code(404),
        );
        assert_eq!(
            err.to_string(),
            "failed to load config: file not found (code 404)"
        );
        assert!(!err.to_string().contains('\n'));
    }

    #[test]
    fn test_source_walks_the_chain() {
        use std::error::Error as _;

        let err = Error::wrap("outer", Error::new("root"));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "root");
        assert!(source.source().is_none());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::from_raw_os_error(2);
        let message = io_err.to_string();

        let err: Error = io_err.into();
        assert_eq!(err.message(), message);
        assert_eq!(err.code(), Some(2));
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_from_source_converts_foreign_chain() {
        let root = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let foreign = anyhow::Error::new(root).context("reading settings");

        let err = Error::from_source("startup failed", foreign);
        let messages: Vec<&str> = err.chain().map(|e| e.message()).collect();
        assert_eq!(messages, ["startup failed", "reading settings", "no such file"]);

        // Only the conversion site has a trace.
        assert!(!err.trace().is_empty());
        assert!(err.cause().unwrap().trace().is_empty());
    }
}
