use thiserror::Error;

use crate::{transport::TransportError, world::WorldError};

/// Top-level error type for session operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A PUT was acknowledged with a body other than the endpoint's
    /// expected answer. A protocol violation; local state is not rolled
    /// back.
    #[error("unexpected answer from '{endpoint}': {response}")]
    UnexpectedAnswer {
        endpoint: &'static str,
        response: String,
    },

    /// A response body did not match the endpoint's wire schema.
    #[error("failed to decode response from '{endpoint}': {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Entity-layer failure: invalid mutation, identity resolution, or
    /// a wiring defect.
    #[error(transparent)]
    World(#[from] WorldError),

    /// Transport-layer failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
