//! Static schema definitions and the validation engine behind them.
//!
//! Each lifecycle variant (full record, create input, patch input, query
//! properties) is an explicit [`Schema`]: a field list plus the subset of
//! fields that must be present. Candidates are raw `serde_json` objects as
//! handed over by the surrounding framework; validation runs to completion
//! before any resolution starts.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ValidationError;

/// Primitive type a persisted field is allowed to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Opaque identifier, carried as a string.
    Id,
    Str,
    /// Integer, e.g. an epoch-millis timestamp.
    Int,
}

impl FieldKind {
    pub(crate) fn expected(self) -> &'static str {
        match self {
            FieldKind::Id => "id",
            FieldKind::Str => "string",
            FieldKind::Int => "integer",
        }
    }

    pub(crate) fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::Id | FieldKind::Str => value.is_string(),
            FieldKind::Int => value.is_i64() || value.is_u64(),
        }
    }
}

/// One named field of a schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// An explicit schema: the allowed fields and the required subset.
///
/// Schemas are immutable statics defined next to the record types they
/// describe; nothing mutates them after startup.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldDef],
    pub required: &'static [&'static str],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn allows(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Validate a candidate object: unknown fields are rejected, required
    /// fields must be present, present values must match their field's kind.
    pub fn validate(&self, data: &Map<String, Value>) -> Result<(), ValidationError> {
        for key in data.keys() {
            if !self.allows(key) {
                warn!(field = %key, "rejecting unknown field");
                return Err(ValidationError::UnknownField(key.clone()));
            }
        }

        for name in self.required.iter().copied() {
            match data.get(name) {
                Some(value) if !value.is_null() => {}
                _ => {
                    warn!(field = %name, "rejecting missing required field");
                    return Err(ValidationError::MissingField(name));
                }
            }
        }

        for field in self.fields {
            if let Some(value) = data.get(field.name) {
                if value.is_null() {
                    continue;
                }
                if !field.kind.matches(value) {
                    warn!(field = %field.name, expected = field.kind.expected(), "rejecting wrong type");
                    return Err(ValidationError::InvalidType {
                        field: field.name.to_string(),
                        expected: field.kind.expected(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Validate a candidate that may not even be an object yet.
    pub fn validate_value<'a>(
        &self,
        value: &'a Value,
    ) -> Result<&'a Map<String, Value>, ValidationError> {
        let data = value.as_object().ok_or(ValidationError::NotAnObject)?;
        self.validate(data)?;
        Ok(data)
    }
}
