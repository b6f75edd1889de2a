//! The result alias and the context-wrapping extension traits.
//!
//! `Result<T>` is the standard library result specialized to [`Error`]. All
//! of the usual combinators apply: `map` and `and_then` pass an `Err`
//! through untouched (no re-capture, the chain keeps pointing at the
//! original failure site), `or_else` and `unwrap_or` are the explicit
//! recovery paths, and `unwrap`/`unwrap_err` on the wrong variant panic
//! with the rendered diagnostic.
//!
//! What the std type cannot do on its own is add context without losing
//! provenance; [`ResultExt`] supplies that.

use crate::error::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Context-wrapping extensions for [`Result`].
///
/// On the error path these wrap the held [`Error`] as the cause of a new
/// one, capturing a fresh stack at the wrap site. The inner error is moved,
/// never copied or altered.
///
/// # Example
///
/// ```rust
/// use restrace::{Error, Result, ResultExt};
///
/// fn read_port() -> Result<u16> {
///     Err(Error::new("missing key 'port'"))
/// }
///
/// fn load_config() -> Result<u16> {
///     read_port().context("failed to load config")
/// }
///
/// let err = load_config().unwrap_err();
/// assert_eq!(err.message(), "failed to load config");
/// assert_eq!(err.cause().unwrap().message(), "missing key 'port'");
/// ```
pub trait ResultExt<T> {
    /// Wrap the error, if any, with a higher-level message.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Like [`ResultExt::context`], but the message is built only on the
    /// error path.
    fn with_context<S, F>(self, message: F) -> Result<T>
    where
        S: Into<String>,
        F: FnOnce() -> S;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|cause| Error::wrap(message, cause))
    }

    fn with_context<S, F>(self, message: F) -> Result<T>
    where
        S: Into<String>,
        F: FnOnce() -> S,
    {
        self.map_err(|cause| Error::wrap(message(), cause))
    }
}

/// Extension for turning an absent [`Option`] value into an [`Error`].
pub trait OptionExt<T> {
    /// `Some(v)` becomes `Ok(v)`; `None` becomes a fresh error with the
    /// given message, captured at this call site.
    fn ok_or_error(self, message: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_error(self, message: impl Into<String>) -> Result<T> {
        match self {
            Some(value) => Ok(value),
            None => Err(Error::new(message)),
        }
    }
}
