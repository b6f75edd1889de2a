//! Bounded stack capture for error construction sites.

use std::fmt;

/// Maximum number of frames recorded per capture. Deeper stacks are
/// truncated and the trace is flagged accordingly.
pub const MAX_FRAMES: usize = 64;

/// One entry in a captured stack trace.
///
/// Symbol resolution is best-effort: a frame whose symbol information is
/// unavailable still appears, with an empty name and its raw instruction
/// pointer for offline symbolization.
#[derive(Debug, Clone)]
pub struct Frame {
    symbol: String,
    file: Option<String>,
    line: Option<u32>,
    ip: usize,
}

impl Frame {
    /// The demangled symbol name, or an empty string if unresolvable.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Source file path, if debug info was available.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Source line number, if debug info was available.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Raw instruction pointer of this frame.
    pub fn ip(&self) -> usize {
        self.ip
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbol.is_empty() {
            return write!(f, "at {:#x}", self.ip);
        }
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "at {} ({}:{})", self.symbol, file, line),
            _ => write!(f, "at {} ({:#x})", self.symbol, self.ip),
        }
    }
}

/// An ordered sequence of [`Frame`]s captured at a single point in time.
///
/// Frames are ordered innermost-first: the failure site is `frames()[0]`,
/// matching the ordering of debuggers and backtrace tools. A trace is
/// immutable once captured.
#[derive(Debug, Clone, Default)]
pub struct StackTrace {
    frames: Vec<Frame>,
    truncated: bool,
}

impl StackTrace {
    /// Walk the current stack, skipping `skip` frames from the top of the
    /// walk, and record up to [`MAX_FRAMES`] frames.
    ///
    /// Capture never fails. A `skip` deeper than the actual stack yields an
    /// empty trace; frames without symbol information are kept with their
    /// raw address. The frame buffer is preallocated before walking so the
    /// walk itself performs no growth.
    pub fn capture(skip: usize) -> Self {
        let mut frames = Vec::with_capacity(MAX_FRAMES);
        let mut truncated = false;
        let mut skipped = 0usize;

        backtrace::trace(|frame| {
            if skipped < skip {
                skipped += 1;
                return true;
            }
            if frames.len() == MAX_FRAMES {
                truncated = true;
                return false;
            }

            let ip = frame.ip() as usize;
            let mut symbol = String::new();
            let mut file = None;
            let mut line = None;
            backtrace::resolve_frame(frame, |resolved| {
                // Inlined callees can produce several symbols per frame;
                // keep the first (innermost) one.
                if symbol.is_empty() {
                    if let Some(name) = resolved.name() {
                        symbol = name.to_string();
                    }
                }
                if file.is_none() {
                    file = resolved.filename().map(|p| p.display().to_string());
                }
                if line.is_none() {
                    line = resolved.lineno();
                }
            });

            frames.push(Frame {
                symbol,
                file,
                line,
                ip,
            });
            true
        });

        Self { frames, truncated }
    }

    /// A trace with no frames, for error links that never had a capture
    /// site (e.g. links converted from foreign errors).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The captured frames, innermost-first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of captured frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the trace holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether the walk hit [`MAX_FRAMES`] and dropped deeper frames.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_frames() {
        let trace = StackTrace::capture(0);
        assert!(!trace.is_empty());
        assert_eq!(trace.len(), trace.frames().len());
    }

    #[test]
    fn test_capture_skip_reduces_depth() {
        let full = StackTrace::capture(0);
        let skipped = StackTrace::capture(2);
        assert!(skipped.len() <= full.len());
    }

    #[test]
    fn test_capture_past_stack_bottom_is_empty() {
        let trace = StackTrace::capture(10_000);
        assert!(trace.is_empty());
        assert_eq!(trace.len(), 0);
        assert!(!trace.truncated());
    }

    #[test]
    fn test_capture_bounded() {
        fn recurse(depth: usize) -> StackTrace {
            if depth == 0 {
                StackTrace::capture(0)
            } else {
                // Prevent tail-call collapse of the recursion.
                let trace = recurse(depth - 1);
                assert!(trace.len() <= MAX_FRAMES);
                trace
            }
        }

        let trace = recurse(MAX_FRAMES + 16);
        assert_eq!(trace.len(), MAX_FRAMES);
        assert!(trace.truncated());
    }

    #[test]
    fn test_empty_trace() {
        let trace = StackTrace::empty();
        assert!(trace.is_empty());
        assert!(!trace.truncated());
    }

    #[test]
    fn test_frame_display_fallback() {
        let frame = Frame {
            symbol: String::new(),
            file: None,
            line: None,
            ip: 0xdeadbeef,
        };
        assert_eq!(frame.to_string(), "at 0xdeadbeef");

        let frame = Frame {
            symbol: "restrace::trace::tests::demo".to_string(),
            file: Some("src/trace.rs".to_string()),
            line: Some(42),
            ip: 0x1000,
        };
        assert_eq!(
            frame.to_string(),
            "at restrace::trace::tests::demo (src/trace.rs:42)"
        );
    }
}
