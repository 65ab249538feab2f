use std::{cell::RefCell, rc::Rc};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ClientError;

use super::{
    delegate::{CommitDelegate, CommitSink},
    entity::{Entity, Tracked},
    error::WorldError,
    pending::PendingChanges,
};

/// Wire shape of one property inside an operator actor record.
///
/// The `value` field carries the runtime value as a JSON-encoded string
/// whose shape is declared by the `type` tag.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyRecord {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: String,
    pub min_value: f64,
    pub max_value: f64,
    pub step_size: f64,
}

/// The four value shapes a property may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyType {
    Bool,
    String,
    Int,
    Float,
}

impl PropertyType {
    fn from_tag(tag: &str) -> Result<Self, WorldError> {
        match tag {
            "bool" => Ok(Self::Bool),
            "string" => Ok(Self::String),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            _ => Err(WorldError::UnknownPropertyType {
                type_tag: tag.to_string(),
            }),
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
        }
    }

    /// Coerces an incoming value to this type.
    ///
    /// int accepts int and float (truncated); float accepts float and
    /// int; bool and string accept only themselves. Anything else is an
    /// invalid mutation, raised before staging.
    fn coerce(&self, property: &str, value: PropertyValue) -> Result<PropertyValue, WorldError> {
        let got = value.type_name();
        match (self, value) {
            (Self::Bool, PropertyValue::Bool(b)) => Ok(PropertyValue::Bool(b)),
            (Self::String, PropertyValue::String(s)) => Ok(PropertyValue::String(s)),
            (Self::Int, PropertyValue::Int(i)) => Ok(PropertyValue::Int(i)),
            (Self::Int, PropertyValue::Float(f)) if f.is_finite() => {
                Ok(PropertyValue::Int(f as i64))
            }
            (Self::Float, PropertyValue::Float(f)) if f.is_finite() => {
                Ok(PropertyValue::Float(f))
            }
            (Self::Float, PropertyValue::Int(i)) => Ok(PropertyValue::Float(i as f64)),
            _ => Err(WorldError::InvalidValueType {
                property: property.to_string(),
                expected: self.as_tag(),
                got,
            }),
        }
    }

    /// Decodes a wire value string into a typed value.
    fn decode(&self, property: &str, raw: &str) -> Result<PropertyValue, WorldError> {
        let malformed = || WorldError::MalformedValue {
            property: property.to_string(),
            type_tag: self.as_tag(),
            raw: raw.to_string(),
        };
        let parsed: Value = serde_json::from_str(raw).map_err(|_| malformed())?;
        match self {
            Self::Bool => parsed.as_bool().map(PropertyValue::Bool).ok_or_else(malformed),
            Self::String => match parsed {
                Value::String(s) => Ok(PropertyValue::String(s)),
                _ => Err(malformed()),
            },
            Self::Int => parsed
                .as_i64()
                .or_else(|| parsed.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .map(PropertyValue::Int)
                .ok_or_else(malformed),
            Self::Float => parsed
                .as_f64()
                .filter(|f| f.is_finite())
                .map(PropertyValue::Float)
                .ok_or_else(malformed),
        }
    }
}

/// A typed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    String(String),
    Int(i64),
    Float(f64),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
        }
    }

    /// Encodes the value back into the wire's JSON-encoded string form.
    fn wire_encoded(&self) -> String {
        match self {
            Self::Bool(true) => "true".to_string(),
            Self::Bool(false) => "false".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => {
                let mut s = f.to_string();
                if !s.contains('.') && !s.contains('e') {
                    s.push_str(".0");
                }
                s
            }
            Self::String(s) => Value::String(s.clone()).to_string(),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[derive(Debug)]
struct PropertyState {
    display_name: String,
    name: String,
    value_type: PropertyType,
    value: PropertyValue,
    min_value: f64,
    max_value: f64,
    step_size: f64,
    pending: PendingChanges,
    delegate: CommitDelegate,
}

/// A single typed property of an operator actor, identified by name.
///
/// The runtime value always matches the declared type tag; assignment
/// coerces through the tag's converter or fails before staging.
#[derive(Clone, Debug)]
pub struct Property {
    state: Rc<RefCell<PropertyState>>,
}

impl Property {
    /// Whether two handles share the same underlying property.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.state, &b.state)
    }

    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    pub fn display_name(&self) -> String {
        self.state.borrow().display_name.clone()
    }

    pub fn value_type(&self) -> PropertyType {
        self.state.borrow().value_type
    }

    pub fn value(&self) -> PropertyValue {
        self.state.borrow().value.clone()
    }

    pub fn min_value(&self) -> f64 {
        self.state.borrow().min_value
    }

    pub fn max_value(&self) -> f64 {
        self.state.borrow().max_value
    }

    pub fn step_size(&self) -> f64 {
        self.state.borrow().step_size
    }

    /// Assigns a new value, staging it for commit.
    ///
    /// The value is coerced to the declared type first; a failed
    /// coercion leaves both the value and the pending payload
    /// untouched. A successful assignment commits through the owning
    /// actor.
    pub fn set_value(&self, value: impl Into<PropertyValue>) -> Result<(), ClientError> {
        let delegate = {
            let mut state = self.state.borrow_mut();
            let coerced = state.value_type.coerce(&state.name, value.into())?;
            let encoded = coerced.wire_encoded();
            let name = state.name.clone();
            state.value = coerced;
            state.pending.stage("value", Value::String(encoded));
            state.pending.stage("name", Value::String(name));
            state.delegate.clone()
        };
        delegate.commit("Property", false)
    }
}

impl Entity for Property {
    type Record = PropertyRecord;

    fn parse(record: PropertyRecord) -> Result<Self, WorldError> {
        let value_type = PropertyType::from_tag(&record.value_type)?;
        let value = value_type.decode(&record.name, &record.value)?;
        Ok(Self {
            state: Rc::new(RefCell::new(PropertyState {
                display_name: record.display_name,
                name: record.name,
                value_type,
                value,
                min_value: record.min_value,
                max_value: record.max_value,
                step_size: record.step_size,
                pending: PendingChanges::new(),
                delegate: CommitDelegate::default(),
            })),
        })
    }

    fn update_in_place(&self, record: PropertyRecord) -> Result<(), WorldError> {
        let value_type = PropertyType::from_tag(&record.value_type)?;
        let value = value_type.decode(&record.name, &record.value)?;
        let mut state = self.state.borrow_mut();
        state.pending.clear();
        state.display_name = record.display_name;
        state.name = record.name;
        state.value_type = value_type;
        state.value = value;
        state.min_value = record.min_value;
        state.max_value = record.max_value;
        state.step_size = record.step_size;
        Ok(())
    }
}

impl Tracked for Property {
    fn pending_changes(&self) -> Map<String, Value> {
        self.state.borrow().pending.to_map()
    }

    fn has_pending_changes(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }

    fn clear_pending_changes(&self) {
        self.state.borrow_mut().pending.clear();
    }

    fn bind_delegate(&self, sink: Rc<dyn CommitSink>) {
        self.state.borrow_mut().delegate.bind(sink);
    }
}
