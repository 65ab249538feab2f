//! An esi-remote client mirrors a remote simulation server's save
//! files, active scenario, and operator actors as a local entity graph,
//! tracks field-level edits as pending payloads per entity, and batches
//! them into the server's REST API.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod transport;
pub mod world;

mod error;
mod session;
mod session_config;

pub use error::ClientError;
pub use session::RemoteSession;
pub use session_config::SessionConfig;
pub use transport::{HttpTransport, Transport, TransportError};
pub use world::{
    Action, ActiveScenario, CommitSink, Entity, EntityList, EnumField, OperatorActor, Property,
    PropertyArray, PropertyEnum, PropertyType, PropertyValue, Save, Tracked, WorldError,
};
