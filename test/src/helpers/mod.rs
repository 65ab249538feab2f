pub mod mock_transport;

pub use fixtures::{
    action_json, active_json, actor_json, actor_updated_answer, actors_envelope, connect,
    enum_field_json, property_enum_json, property_json, save_json, save_loaded_answer,
};
pub use mock_transport::MockTransport;
