//! Path checks inside parameter-config documents

use super::{launch::relative_to, string_values, ReferenceWalker};
use crate::{
    diagnostic::{Diagnostic, DiagnosticKind},
    document::{document_key, DocumentRecord},
    error::SubstitutionError,
    substitution::{resolve_str, Resolved, VariableScope},
    suggest::suggestion_suffix,
};

impl ReferenceWalker<'_> {
    /// Every path-like string in a param config must point at an existing file
    pub(super) fn check_config(&self, record: &DocumentRecord) -> Vec<Diagnostic> {
        let Some(content) = record.content() else {
            return Vec::new();
        };
        let path = record.path();
        let scope = VariableScope::for_file(&document_key(path));

        let mut strings = Vec::new();
        string_values(content, "", &mut strings);

        let mut diagnostics = Vec::new();
        for (location, value) in strings {
            if !looks_like_path(&value) {
                continue;
            }

            let resolved = match resolve_str(&value, &self.context(&scope)) {
                Ok(Resolved::Known(resolved)) => resolved,
                Ok(Resolved::Unknown) => continue,
                // filled in by whoever launches with this file
                Err(SubstitutionError::UndefinedVariable(name)) => {
                    log::debug!("{}: '$(var {})' left to the launching context", location, name);
                    continue;
                }
                Err(e) => {
                    diagnostics.push(Diagnostic::error(path, e.kind(), e.to_string()).at(location));
                    continue;
                }
            };

            let target = relative_to(path, &resolved);
            if !target.is_file() {
                let message = format!(
                    "Referenced file does not exist: {}{}",
                    target.display(),
                    suggestion_suffix(&target)
                );
                diagnostics.push(
                    Diagnostic::error(path, DiagnosticKind::MissingReferencedFile, message)
                        .at(location),
                );
            }
        }
        diagnostics
    }
}

/// Strings that name a file: a package lookup or a YAML file name
fn looks_like_path(value: &str) -> bool {
    value.contains("$(find-pkg-share") || value.ends_with(".yaml") || value.ends_with(".yml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_path() {
        assert!(looks_like_path("$(find-pkg-share demo)/maps/map"));
        assert!(looks_like_path("maps/floor.yaml"));
        assert!(looks_like_path("x.yml"));
        assert!(!looks_like_path("base_link"));
        assert!(!looks_like_path("yaml"));
    }
}
