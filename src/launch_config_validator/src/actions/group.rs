//! Group action implementation

use super::{condition_of, parse_action_list, string_field, LaunchAction};
use crate::condition::Condition;
use serde_yaml::Mapping;

/// Group action for scoping namespaces and variables
#[derive(Debug, Clone)]
pub struct GroupAction {
    pub namespace: Option<String>,
    pub actions: Vec<(usize, LaunchAction)>,
    pub condition: Condition,
}

impl GroupAction {
    pub fn from_mapping(map: &Mapping) -> Self {
        Self {
            namespace: string_field(map, "namespace").or_else(|| string_field(map, "ns")),
            actions: map.get("actions").map(parse_action_list).unwrap_or_default(),
            condition: condition_of(map),
        }
    }
}

/// `push-ros-namespace: {namespace}` inside a group
#[derive(Debug, Clone)]
pub struct PushNamespaceAction {
    pub namespace: Option<String>,
    pub condition: Condition,
}

impl PushNamespaceAction {
    pub fn from_mapping(map: &Mapping) -> Self {
        Self {
            namespace: string_field(map, "namespace"),
            condition: condition_of(map),
        }
    }
}
