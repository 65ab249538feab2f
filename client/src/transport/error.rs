use thiserror::Error;

/// Errors raised while exchanging requests with the simulation server.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    /// The request never produced a response (connection refused, timeout).
    #[error("request to '{path}' failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code.
    #[error("request to '{path}' returned status {status}")]
    Status { path: String, status: u16 },

    /// The response body was not valid JSON.
    #[error("response from '{path}' was not valid json: {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}
