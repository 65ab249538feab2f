use reqwest::blocking::Client;
use serde_json::Value;

use crate::session_config::SessionConfig;

use super::{Transport, TransportError};

/// HTTP transport backed by a single reused blocking client.
///
/// Connection pooling lives inside the client, so sequential fetches
/// against the same server reuse one socket.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &SessionConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| TransportError::ClientBuild { source })?;

        Ok(Self {
            client,
            base_url: format!("{}:{}/api", config.host, config.port),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn get(&mut self, path: &str) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .map_err(|source| TransportError::Request {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().map_err(|source| TransportError::InvalidJson {
            path: path.to_string(),
            source,
        })
    }

    fn put(&mut self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .map_err(|source| TransportError::Request {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().map_err(|source| TransportError::InvalidJson {
            path: path.to_string(),
            source,
        })
    }
}
