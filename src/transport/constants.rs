//! Constants for the transport module (timeouts, retry schedule).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large record bodies).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default minimum wait between retry attempts.
pub const DEFAULT_MIN_WAIT: Duration = Duration::from_secs(10);

/// Default maximum wait between retry attempts.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

/// Maximum jitter added to retry delays.
pub const MAX_JITTER: Duration = Duration::from_millis(500);
