//! `arg` and `let` actions

use super::{condition_of, string_field};
use crate::condition::Condition;
use serde_yaml::Mapping;

/// Launch argument declaration: `arg: {name, default?}`
#[derive(Debug, Clone)]
pub struct ArgAction {
    pub name: Option<String>,
    pub default: Option<String>,
    pub condition: Condition,
}

impl ArgAction {
    pub fn from_mapping(map: &Mapping) -> Self {
        Self {
            name: string_field(map, "name"),
            default: string_field(map, "default"),
            condition: condition_of(map),
        }
    }
}

/// Variable assignment: `let: {name, value}`
#[derive(Debug, Clone)]
pub struct LetAction {
    pub name: Option<String>,
    pub value: Option<String>,
    pub condition: Condition,
}

impl LetAction {
    pub fn from_mapping(map: &Mapping) -> Self {
        Self {
            name: string_field(map, "name"),
            value: string_field(map, "value"),
            condition: condition_of(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(s: &str) -> Mapping {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_arg() {
        let arg = ArgAction::from_mapping(&mapping("{name: file_path}"));
        assert_eq!(arg.name.as_deref(), Some("file_path"));
        assert!(arg.default.is_none());
    }

    #[test]
    fn test_parse_arg_with_numeric_default() {
        let arg = ArgAction::from_mapping(&mapping("{name: rate, default: 10, description: Hz}"));
        assert_eq!(arg.default.as_deref(), Some("10"));
    }

    #[test]
    fn test_parse_let() {
        let let_action = LetAction::from_mapping(&mapping("{name: cfg, value: '$(dirname)/a.yaml'}"));
        assert_eq!(let_action.name.as_deref(), Some("cfg"));
        assert_eq!(let_action.value.as_deref(), Some("$(dirname)/a.yaml"));
    }
}
