//! Conditional logging macros.
//!
//! With the `tracing` feature, `debug!`, `trace!` and `warn!` are the `tracing`
//! macros. Without it they expand to nothing, so recoverable conditions still
//! reach callers through the recorded [`Warning`](crate::errors::Warning)s.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, trace, warn};
