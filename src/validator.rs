//! Argument validation and normalization
//!
//! Recursively checks a caller-supplied argument tree against a resolved
//! field schema: required keys must be present, declared defaults are
//! injected for omitted keys, and repeatable fields are validated item by
//! item against their declared occurrence bounds. Validation fails fast,
//! producing no partial body, and returns the normalized tree ready
//! for serialization.
//!
//! The argument tree is a [`serde_json::Value`]: an object is a keyed
//! mapping, an array an ordered sequence, everything else a scalar. Keys
//! the schema does not declare pass through untouched.

use serde_json::{Map, Value};

use crate::builtins;
use crate::error::{Error, Result};
use crate::resolver::{FieldSchema, FieldSpec};

/// Name reported as the enclosing field for top-level errors
const ROOT_CONTEXT: &str = "root";

/// Recursive argument validator
#[derive(Debug, Clone, Default)]
pub struct Validator {
    scalar_checks: bool,
}

impl Validator {
    /// Create a validator with scalar leaves passed through as-is
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict mode: scalar leaves are additionally checked against
    /// the lexical space of the built-in type the schema names
    pub fn with_scalar_checks(mut self, enabled: bool) -> Self {
        self.scalar_checks = enabled;
        self
    }

    /// Validate and normalize an argument tree against a schema
    pub fn validate(&self, schema: &FieldSchema, arguments: Value) -> Result<Value> {
        self.validate_value(schema, arguments, ROOT_CONTEXT)
    }

    fn validate_value(&self, schema: &FieldSchema, value: Value, context: &str) -> Result<Value> {
        match schema {
            FieldSchema::Scalar(marker) => self.validate_scalar(marker, value, context),
            FieldSchema::Fields(fields) => self.validate_fields(fields, value, context),
        }
    }

    fn validate_scalar(&self, marker: &str, value: Value, context: &str) -> Result<Value> {
        if matches!(value, Value::Object(_) | Value::Array(_)) {
            return Err(Error::ArgumentType {
                field: context.to_string(),
                expected: "scalar".to_string(),
                actual: shape_of(&value).to_string(),
            });
        }
        if self.scalar_checks {
            let text = scalar_text(&value);
            if builtins::check(marker, &text) != Some(true) {
                return Err(Error::ScalarFormat {
                    field: context.to_string(),
                    type_name: marker.to_string(),
                    value: text,
                });
            }
        }
        Ok(value)
    }

    fn validate_fields(
        &self,
        fields: &indexmap::IndexMap<String, FieldSpec>,
        value: Value,
        context: &str,
    ) -> Result<Value> {
        let Value::Object(mut map) = value else {
            return Err(Error::ArgumentType {
                field: context.to_string(),
                expected: "mapping".to_string(),
                actual: shape_of(&value).to_string(),
            });
        };

        for (name, spec) in fields {
            if spec.is_repeatable() {
                self.validate_repeatable(name, spec, &mut map, context)?;
                continue;
            }

            if !map.contains_key(name) {
                if let Some(default) = spec.default_value() {
                    map.insert(name.clone(), Value::String(default.to_string()));
                }
            }
            match map.get(name).cloned() {
                Some(nested) => {
                    let validated = self.validate_value(&spec.content, nested, name)?;
                    map.insert(name.clone(), validated);
                }
                None if spec.is_optional() => {}
                None => {
                    return Err(Error::MissingField {
                        field: name.clone(),
                        parent: context.to_string(),
                        provided: map.keys().cloned().collect(),
                    });
                }
            }
        }

        Ok(Value::Object(map))
    }

    /// Repeatable field: the caller's value must be an ordered sequence,
    /// every item validates against the nested schema, and the item count
    /// must fall within the declared numeric bounds. An absent key counts
    /// as zero items; its presence is still required once the bounds pass.
    fn validate_repeatable(
        &self,
        name: &str,
        spec: &FieldSpec,
        map: &mut Map<String, Value>,
        context: &str,
    ) -> Result<()> {
        let min = spec.min_occurs();
        let max = spec.max_occurs();

        let count = match map.get(name) {
            None => 0,
            Some(Value::Array(items)) => {
                let mut validated = Vec::with_capacity(items.len());
                for item in items.clone() {
                    validated.push(self.validate_value(&spec.content, item, name)?);
                }
                let count = validated.len();
                map.insert(name.to_string(), Value::Array(validated));
                count
            }
            Some(other) => {
                return Err(Error::ArgumentType {
                    field: name.to_string(),
                    expected: "sequence".to_string(),
                    actual: shape_of(other).to_string(),
                });
            }
        };

        if let Some(lo) = min {
            if (count as u64) < lo {
                return Err(Error::OccursRange {
                    field: name.to_string(),
                    parent: context.to_string(),
                    min,
                    max,
                    actual: count,
                });
            }
        }
        if let Some(hi) = max {
            if (count as u64) > hi {
                return Err(Error::OccursRange {
                    field: name.to_string(),
                    parent: context.to_string(),
                    min,
                    max,
                    actual: count,
                });
            }
        }
        if !map.contains_key(name) {
            return Err(Error::MissingField {
                field: name.to_string(),
                parent: context.to_string(),
                provided: map.keys().cloned().collect(),
            });
        }
        Ok(())
    }
}

/// Render a scalar JSON value as element text
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "mapping",
        Value::Array(_) => "sequence",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}
