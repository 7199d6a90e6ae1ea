//! Strict YAML loading

use crate::error::LoadError;
use serde_yaml::Value;
use std::path::Path;

/// Read and parse a YAML document, rejecting duplicate mapping keys
pub fn load_yaml(path: &Path) -> Result<Value, LoadError> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

/// Parse YAML text. Empty documents (blank, comments only, or `null`) are errors.
pub fn parse_yaml(content: &str) -> Result<Value, LoadError> {
    if is_blank(content) {
        return Err(LoadError::Empty);
    }

    match serde_yaml::from_str::<Value>(content) {
        Ok(Value::Null) => Err(LoadError::Empty),
        Ok(value) => Ok(value),
        Err(e) => {
            let message = e.to_string();
            // serde_yaml's mapping visitor reports "duplicate entry with key ..."
            if message.contains("duplicate entry") {
                Err(LoadError::DuplicateKey(message))
            } else {
                Err(LoadError::Syntax(message))
            }
        }
    }
}

fn is_blank(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}
