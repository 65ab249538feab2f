use thiserror::Error;

/// Errors raised by the entity layer: invalid mutations, identity
/// resolution failures, and wiring defects.
#[derive(Error, Debug)]
pub enum WorldError {
    /// An enum property was assigned a value outside its declared value
    /// set. Raised before anything is staged.
    #[error("value '{value}' is not a member of enum property '{enum_name}'")]
    ValueNotInSet { enum_name: String, value: String },

    /// After reconciling an enum property's value set, the incoming
    /// current value's id matched none of the reconciled members.
    #[error("enum property '{enum_name}' declares current value id {enum_field_id}, which is not in its value set")]
    UnknownCurrentValue {
        enum_name: String,
        enum_field_id: i64,
    },

    /// A property was assigned a value that cannot coerce to the
    /// property's declared type. Raised before anything is staged.
    #[error("property '{property}' expects a {expected} value, got {got}")]
    InvalidValueType {
        property: String,
        expected: &'static str,
        got: &'static str,
    },

    /// A property's wire value does not decode as its declared type.
    #[error("property '{property}' carries a malformed {type_tag} value: {raw}")]
    MalformedValue {
        property: String,
        type_tag: &'static str,
        raw: String,
    },

    /// A property record declared a type tag outside the supported set.
    #[error("unknown property type tag '{type_tag}'")]
    UnknownPropertyType { type_tag: String },

    /// The server sent property arrays, which this client does not
    /// implement. Fatal at parse time so the unhandled data shape
    /// surfaces immediately instead of being silently dropped.
    #[error("server sent {count} property array(s), which are unsupported")]
    PropertyArraysUnsupported { count: usize },

    /// An entity's commit delegate was invoked before its owner bound
    /// it. Always a wiring defect in the layer above.
    #[error("commit delegate of {entity} is unbound")]
    UnboundDelegate { entity: &'static str },
}
