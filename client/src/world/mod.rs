mod action;
mod active_scenario;
mod delegate;
mod entity;
mod entity_list;
mod error;
mod operator_actor;
mod pending;
mod property;
mod property_array;
mod property_enum;
mod reconcile;
mod save;

pub use action::{Action, ActionRecord};
pub use active_scenario::{ActiveScenario, ActiveScenarioRecord};
pub use delegate::{CommitDelegate, CommitSink};
pub use entity::{Entity, Tracked};
pub use entity_list::EntityList;
pub use error::WorldError;
pub use operator_actor::{OperatorActor, OperatorActorRecord, OperatorActorsEnvelope};
pub use pending::PendingChanges;
pub use property::{Property, PropertyRecord, PropertyType, PropertyValue};
pub use property_array::{PropertyArray, PropertyArrayRecord};
pub use property_enum::{EnumField, EnumFieldRecord, PropertyEnum, PropertyEnumRecord};
pub use reconcile::reconcile;
pub use save::{Save, SaveRecord};
