mod error;
mod http;

pub use error::TransportError;
pub use http::HttpTransport;

use serde_json::Value;

/// Blocking request/response channel to the simulation server.
///
/// The session owns exactly one transport and funnels every fetch and
/// commit through it. Implementations must return the decoded JSON body
/// for any 2xx response and an error for everything else.
pub trait Transport {
    /// Fetches the resource at `path`, relative to the API root.
    fn get(&mut self, path: &str) -> Result<Value, TransportError>;
    /// Sends `body` to the resource at `path` and returns the server's answer.
    fn put(&mut self, path: &str, body: &Value) -> Result<Value, TransportError>;
}
