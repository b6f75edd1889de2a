//! Macros for error creation and propagation.

/// Create an [`Error`](crate::Error) with format arguments, capturing the
/// stack at the expansion site. An optional `code = ...` prefix sets the
/// error code.
///
/// ```rust
/// use restrace::err;
///
/// let plain = err!("connection to {} refused", "10.0.0.1");
/// let coded = err!(code = 404, "no such file: {}", "a.txt");
/// assert_eq!(coded.code(), Some(404));
/// ```
#[macro_export]
macro_rules! err {
    (code = $code:expr, $($arg:tt)+) => {
        $crate::Error::new(format!($($arg)+)).with_code($code)
    };
    ($($arg:tt)+) => {
        $crate::Error::new(format!($($arg)+))
    };
}

/// Return early with an [`Error`](crate::Error) built by [`err!`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)+) => {
        return Err($crate::err!($($arg)+))
    };
}

/// Return early with an [`Error`](crate::Error) unless the condition holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::bail!($($arg)+);
        }
    };
}
