//! Request-level configuration.
//!
//! - [`CallOptions`]: per-call headers and timeout override
//! - [`RetryPolicy`]: retry behavior with exponential backoff

mod options;
mod retry;

pub use options::CallOptions;
pub use retry::{ExponentialBackoff, RetryPolicy, defaults};
