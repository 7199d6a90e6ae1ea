//! Structural checks against the launch and parameter-config JSON schemas
//!
//! Both schemas (Draft 2020-12) ship inside the binary. YAML values are
//! converted to JSON before checking; YAML tags are dropped.

use crate::error::{Result, ValidateError};
use jsonschema::Validator;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

const LAUNCH_SCHEMA: &str = include_str!("../schemas/launch.schema.json");
const CONFIG_SCHEMA: &str = include_str!("../schemas/config.schema.json");

/// Which schema a document is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaId {
    Launch,
    Config,
}

impl SchemaId {
    /// Name used as the prefix of violation messages
    pub fn name(self) -> &'static str {
        match self {
            SchemaId::Launch => "launch-schema",
            SchemaId::Config => "config-schema",
        }
    }
}

/// Checks a document against a schema, returning one message per violation
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, document: &YamlValue, schema: SchemaId) -> Vec<String>;
}

/// Validator compiled from the embedded schemas
pub struct BuiltinSchemas {
    launch: Validator,
    config: Validator,
}

impl BuiltinSchemas {
    pub fn new() -> Result<Self> {
        Ok(Self {
            launch: compile(SchemaId::Launch, LAUNCH_SCHEMA)?,
            config: compile(SchemaId::Config, CONFIG_SCHEMA)?,
        })
    }

    fn validator(&self, schema: SchemaId) -> &Validator {
        match schema {
            SchemaId::Launch => &self.launch,
            SchemaId::Config => &self.config,
        }
    }
}

fn compile(schema: SchemaId, source: &str) -> Result<Validator> {
    let build_error = |reason: String| ValidateError::SchemaBuild {
        schema: schema.name(),
        reason,
    };

    let value: JsonValue = serde_json::from_str(source).map_err(|e| build_error(e.to_string()))?;
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.build(&value).map_err(|e| build_error(e.to_string()))
}

impl SchemaValidator for BuiltinSchemas {
    fn validate(&self, document: &YamlValue, schema: SchemaId) -> Vec<String> {
        let instance = match yaml_to_json_value(document) {
            Ok(instance) => instance,
            Err(reason) => {
                return vec![format!("{} validation error: {}", schema.name(), reason)];
            }
        };

        self.validator(schema)
            .iter_errors(&instance)
            .map(|e| {
                let at = e.instance_path.to_string();
                let at = if at.is_empty() { "/".to_string() } else { at };
                format!("{} validation error: {} (at {})", schema.name(), e, at)
            })
            .collect()
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`
pub fn yaml_to_json_value(yaml: &YamlValue) -> std::result::Result<JsonValue, String> {
    match yaml {
        YamlValue::Null => Ok(JsonValue::Null),
        YamlValue::Bool(b) => Ok(JsonValue::Bool(*b)),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(JsonValue::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(JsonValue::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(JsonValue::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        YamlValue::String(s) => Ok(JsonValue::String(s.clone())),
        YamlValue::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        YamlValue::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    YamlValue::String(s) => s.clone(),
                    YamlValue::Number(n) => n.to_string(),
                    YamlValue::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(JsonValue::Object(object))
        }
        YamlValue::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
