//! Node action implementation

use super::{condition_of, string_field};
use crate::condition::Condition;
use serde_yaml::{Mapping, Value};

/// Keys of a node mapping that get dedicated handling
const NODE_KEYS: &[&str] = &[
    "pkg", "exec", "name", "namespace", "param", "remap", "if", "unless",
];

/// Node action representing a ROS 2 node
#[derive(Debug, Clone)]
pub struct NodeAction {
    pub package: Option<String>,
    pub executable: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    /// `param:` entries with their index in the list
    pub params: Vec<(usize, ParamEntry)>,
    pub remaps: Vec<(usize, Remap)>,
    /// Remaining keys (`args`, `ros_args`, `env`, `output`, ...)
    pub extra: Vec<(String, Value)>,
    pub condition: Condition,
}

/// A `node.param[]` entry: either a bare parameter-file path or a mapping
#[derive(Debug, Clone, PartialEq)]
pub enum ParamEntry {
    StringRef(String),
    ParamObject(Mapping),
}

impl ParamEntry {
    fn from_yaml(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ParamEntry::StringRef(s.clone())),
            Value::Mapping(map) => Some(ParamEntry::ParamObject(map.clone())),
            _ => None,
        }
    }

    /// Parameter file this entry points at, if any
    pub fn file_reference(&self) -> Option<&str> {
        match self {
            ParamEntry::StringRef(path) => Some(path),
            ParamEntry::ParamObject(map) => map.get("from").and_then(Value::as_str),
        }
    }
}

/// `remap: {from, to}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remap {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl NodeAction {
    pub fn from_mapping(map: &Mapping) -> Self {
        let params = indexed(map, "param", ParamEntry::from_yaml);
        let remaps = indexed(map, "remap", |value| {
            value.as_mapping().map(|remap| Remap {
                from: string_field(remap, "from"),
                to: string_field(remap, "to"),
            })
        });

        let extra = map
            .iter()
            .filter_map(|(key, value)| {
                let key = key.as_str()?;
                (!NODE_KEYS.contains(&key)).then(|| (key.to_string(), value.clone()))
            })
            .collect();

        Self {
            package: string_field(map, "pkg"),
            executable: string_field(map, "exec"),
            name: string_field(map, "name"),
            namespace: string_field(map, "namespace"),
            params,
            remaps,
            extra,
            condition: condition_of(map),
        }
    }
}

fn indexed<T>(map: &Mapping, key: &str, parse: impl Fn(&Value) -> Option<T>) -> Vec<(usize, T)> {
    map.get(key)
        .and_then(Value::as_sequence)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| parse(item).map(|entry| (idx, entry)))
                .collect()
        })
        .unwrap_or_default()
}
