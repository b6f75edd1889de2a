//! # restrace
//!
//! A compromise between error codes and exceptions: fallible operations
//! return result values carrying detailed error messages and stack traces.
//!
//! ## Design Philosophy
//!
//! - **StackTrace**: capture the call stack at the failure site, bounded
//!   and best-effort, never a new failure source
//! - **Error**: an immutable record — message, optional code, trace, and
//!   an owned cause chain that mirrors the call stack
//! - **Result**: the standard sum type specialized to [`Error`], so `?`,
//!   `#[must_use]`, and exhaustive matching all apply
//! - **Context**: each layer wraps the failure it received instead of
//!   replacing it; provenance is never lost
//!
//! ## Usage
//!
//! ```rust
//! use restrace::{Error, Result, ResultExt};
//!
//! fn read_settings(path: &str) -> Result<String> {
//!     Err(Error::new(format!("no such file: {path}")).with_code(404))
//! }
//!
//! fn startup() -> Result<String> {
//!     read_settings("settings.toml").context("startup failed")
//! }
//!
//! let err = startup().unwrap_err();
//! assert_eq!(err.chain_len(), 2);
//! println!("{}", err.to_text());
//! ```
//!
//! ## Principles
//!
//! - Failures are values: no unwinding, every fallible call returns
//!   `Result<T, Error>` and the caller handles or forwards it
//! - An error is constructed exactly where the failure is detected, so its
//!   trace points at the true origin
//! - Wrapping takes ownership of the cause and never alters it
//! - External errors enter the chain via [`Error::from_source`], never by
//!   leaking raw types

mod error;
mod macros;
mod result;
mod trace;

pub use error::{Chain, Error};
pub use result::{OptionExt, Result, ResultExt};
pub use trace::{Frame, StackTrace, MAX_FRAMES};
