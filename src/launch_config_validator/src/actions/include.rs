//! Include action implementation

use super::{condition_of, scalar_string, string_field};
use crate::condition::Condition;
use serde_yaml::{Mapping, Value};

/// Include action representing a nested launch file
#[derive(Debug, Clone)]
pub struct IncludeAction {
    pub file: Option<String>,
    /// Args as Vec to preserve order (later args can reference earlier ones)
    pub args: Vec<(String, String)>,
    pub condition: Condition,
}

impl IncludeAction {
    pub fn from_mapping(map: &Mapping) -> Self {
        let args = map
            .get("arg")
            .and_then(Value::as_sequence)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_mapping)
                    .filter_map(|arg| {
                        let name = string_field(arg, "name")?;
                        let value = arg.get("value").and_then(scalar_string)?;
                        Some((name, value))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            file: string_field(map, "file"),
            args,
            condition: condition_of(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_include_with_args() {
        let map: Mapping = serde_yaml::from_str(
            r#"
file: "$(find-pkg-share demo)/launch/child.launch.yaml"
arg:
  - {name: param1, value: value1}
  - {name: rate, value: 5}
  - {name: no_value}
"#,
        )
        .unwrap();
        let include = IncludeAction::from_mapping(&map);

        assert_eq!(
            include.file.as_deref(),
            Some("$(find-pkg-share demo)/launch/child.launch.yaml")
        );
        assert_eq!(
            include.args,
            vec![
                ("param1".to_string(), "value1".to_string()),
                ("rate".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_include_without_file() {
        let map: Mapping = serde_yaml::from_str("{if: $(var enabled)}").unwrap();
        let include = IncludeAction::from_mapping(&map);
        assert!(include.file.is_none());
        assert_eq!(include.condition.if_expr.as_deref(), Some("$(var enabled)"));
    }
}
