//! Transport settings.

use std::time::Duration;

/// Settings for [`HyperClient`](crate::HyperClient).
///
/// Only the wait for the response head is bounded. Once a spec has picked
/// its leaf the body is read without a deadline, so a streamed or downloaded
/// body can take as long as it needs.
///
/// ```
/// use std::time::Duration;
/// use decant::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_head_timeout(Duration::from_secs(5))
///     .with_idle_per_host(4);
/// assert_eq!(config.connect_timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Time allowed from sending the request to receiving the status line
    /// and headers.
    pub head_timeout: Duration,
    /// Time allowed to open the TCP connection.
    pub connect_timeout: Duration,
    /// Idle pooled connections kept per host.
    pub idle_per_host: usize,
    /// How long an idle pooled connection is kept.
    pub idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            head_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            idle_per_host: 32,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Replace [`head_timeout`](Self::head_timeout).
    #[must_use]
    pub const fn with_head_timeout(mut self, timeout: Duration) -> Self {
        self.head_timeout = timeout;
        self
    }

    /// Replace [`connect_timeout`](Self::connect_timeout).
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Replace [`idle_per_host`](Self::idle_per_host).
    #[must_use]
    pub const fn with_idle_per_host(mut self, count: usize) -> Self {
        self.idle_per_host = count;
        self
    }

    /// Replace [`idle_timeout`](Self::idle_timeout).
    #[must_use]
    pub const fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}
