//! Typed view of YAML launch actions
//!
//! Parsing here is lenient: anything malformed is left to the launch schema,
//! the walker only needs the fields that carry substitutions and references.

pub mod arg;
pub mod group;
pub mod include;
pub mod node;

pub use arg::{ArgAction, LetAction};
pub use group::{GroupAction, PushNamespaceAction};
pub use include::IncludeAction;
pub use node::{NodeAction, ParamEntry, Remap};

use crate::condition::Condition;
use serde_yaml::{Mapping, Value};

/// One entry of a `launch:` (or `group.actions`) sequence
#[derive(Debug, Clone)]
pub enum LaunchAction {
    Arg(ArgAction),
    Let(LetAction),
    Node(NodeAction),
    Include(IncludeAction),
    Group(GroupAction),
    PushNamespace(PushNamespaceAction),
    Other(OtherAction),
}

/// Action kind without dedicated handling; its strings are still resolved
#[derive(Debug, Clone)]
pub struct OtherAction {
    pub kind: String,
    pub body: Value,
    pub condition: Condition,
}

impl LaunchAction {
    /// Build an action from a single-key mapping like `{node: {...}}`
    pub fn from_yaml(item: &Value) -> Option<Self> {
        let map = item.as_mapping()?;
        if map.len() != 1 {
            return None;
        }
        let (key, body) = map.iter().next()?;
        let kind = key.as_str()?;

        let action = match (kind, body.as_mapping()) {
            ("arg", Some(body)) => LaunchAction::Arg(ArgAction::from_mapping(body)),
            ("let", Some(body)) => LaunchAction::Let(LetAction::from_mapping(body)),
            ("node", Some(body)) => LaunchAction::Node(NodeAction::from_mapping(body)),
            ("include", Some(body)) => LaunchAction::Include(IncludeAction::from_mapping(body)),
            ("group", Some(body)) => LaunchAction::Group(GroupAction::from_mapping(body)),
            ("push-ros-namespace" | "push_ros_namespace", Some(body)) => {
                LaunchAction::PushNamespace(PushNamespaceAction::from_mapping(body))
            }
            _ => LaunchAction::Other(OtherAction {
                kind: kind.to_string(),
                condition: body.as_mapping().map(condition_of).unwrap_or_default(),
                body: body.clone(),
            }),
        };
        Some(action)
    }

    pub fn type_name(&self) -> &str {
        match self {
            LaunchAction::Arg(_) => "arg",
            LaunchAction::Let(_) => "let",
            LaunchAction::Node(_) => "node",
            LaunchAction::Include(_) => "include",
            LaunchAction::Group(_) => "group",
            LaunchAction::PushNamespace(_) => "push-ros-namespace",
            LaunchAction::Other(other) => &other.kind,
        }
    }

    pub fn condition(&self) -> &Condition {
        match self {
            LaunchAction::Arg(a) => &a.condition,
            LaunchAction::Let(l) => &l.condition,
            LaunchAction::Node(n) => &n.condition,
            LaunchAction::Include(i) => &i.condition,
            LaunchAction::Group(g) => &g.condition,
            LaunchAction::PushNamespace(p) => &p.condition,
            LaunchAction::Other(o) => &o.condition,
        }
    }
}

/// Actions of a launch document, paired with their index in `launch:`
pub fn launch_actions(document: &Value) -> Vec<(usize, LaunchAction)> {
    document
        .get("launch")
        .map(parse_action_list)
        .unwrap_or_default()
}

pub(crate) fn parse_action_list(list: &Value) -> Vec<(usize, LaunchAction)> {
    list.as_sequence()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| LaunchAction::from_yaml(item).map(|a| (idx, a)))
                .collect()
        })
        .unwrap_or_default()
}

/// Scalar as string; YAML lets `default: 5` or `if: true` be non-strings
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}

pub(crate) fn string_field(map: &Mapping, key: &str) -> Option<String> {
    map.get(key).and_then(scalar_string)
}

pub(crate) fn condition_of(map: &Mapping) -> Condition {
    Condition {
        if_expr: string_field(map, "if"),
        unless_expr: string_field(map, "unless"),
    }
}
