use std::time::Duration;

/// Contains the configuration needed to establish a session with the
/// simulation server.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Scheme and host of the simulation server
    pub host: String,
    /// Port the server's REST API listens on
    pub port: u16,
    /// Determines whether staged changes are sent to the server as soon
    /// as they are made. When false, changes accumulate locally until an
    /// explicit commit call
    pub autocommit: bool,
    /// Optional per-request timeout. None means the transport's own
    /// default applies
    pub request_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1".to_string(),
            port: 2132,
            autocommit: true,
            request_timeout: None,
        }
    }
}
