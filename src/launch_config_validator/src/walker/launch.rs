//! Walking the action tree of one launch document

use super::{is_yaml_path, join_location, string_values, DocumentRef, ReferenceWalker};
use crate::{
    actions::{
        launch_actions, ArgAction, GroupAction, IncludeAction, LaunchAction, LetAction,
        NodeAction, OtherAction, ParamEntry,
    },
    captures::NodeCapture,
    diagnostic::DiagnosticKind,
    document::ReferenceField,
    substitution::{
        contains_substitution, scope::compose_resolved, Resolved, VariableScope,
    },
    suggest::suggestion_suffix,
};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

impl ReferenceWalker<'_> {
    pub(super) fn walk_document(
        &mut self,
        document: &DocumentRef,
        content: &Value,
        mut scope: VariableScope,
    ) {
        let actions = launch_actions(content);
        self.walk_actions(document, &actions, &mut scope, "launch");
    }

    fn walk_actions(
        &mut self,
        document: &DocumentRef,
        actions: &[(usize, LaunchAction)],
        scope: &mut VariableScope,
        base: &str,
    ) {
        for (idx, action) in actions {
            let location = format!("{}[{}].{}", base, idx, action.type_name());

            let admitted = action.condition().admits(&self.context(scope));
            match admitted {
                Ok(true) => {}
                Ok(false) => {
                    log::debug!("Skipping {} due to condition", location);
                    continue;
                }
                Err(e) => {
                    self.report(document, e.kind(), e.to_string(), &location);
                    continue;
                }
            }

            match action {
                LaunchAction::Arg(arg) => self.walk_arg(document, arg, scope, &location),
                LaunchAction::Let(let_action) => {
                    self.walk_let(document, let_action, scope, &location)
                }
                LaunchAction::Node(node) => self.walk_node(document, node, scope, &location),
                LaunchAction::Include(include) => {
                    self.walk_include(document, include, scope, &location)
                }
                LaunchAction::Group(group) => self.walk_group(document, group, scope, &location),
                LaunchAction::PushNamespace(push) => {
                    let namespace = self.resolve_optional(
                        document,
                        scope,
                        push.namespace.as_deref(),
                        &join_location(&location, "namespace"),
                    );
                    if let Some(namespace) = namespace {
                        scope.push_namespace(&namespace);
                    }
                }
                LaunchAction::Other(other) => self.walk_other(document, other, scope, &location),
            }
        }
    }

    /// `arg` declares only if no caller bound it; a missing default is a required argument
    fn walk_arg(
        &mut self,
        document: &DocumentRef,
        arg: &ArgAction,
        scope: &mut VariableScope,
        location: &str,
    ) {
        let Some(name) = &arg.name else {
            return;
        };
        let value = match &arg.default {
            Some(default) => self
                .resolve_field(document, scope, default, &join_location(location, "default"))
                .unwrap_or(Resolved::Unknown),
            None => Resolved::Unknown,
        };
        scope.declare_arg(name, value);
    }

    fn walk_let(
        &mut self,
        document: &DocumentRef,
        let_action: &LetAction,
        scope: &mut VariableScope,
        location: &str,
    ) {
        let Some(name) = &let_action.name else {
            return;
        };
        let value = match &let_action.value {
            Some(value) => self
                .resolve_field(document, scope, value, &join_location(location, "value"))
                .unwrap_or(Resolved::Unknown),
            None => Resolved::Unknown,
        };
        scope.declare(name.clone(), value);
    }

    fn walk_group(
        &mut self,
        document: &DocumentRef,
        group: &GroupAction,
        scope: &VariableScope,
        location: &str,
    ) {
        let mut child = scope.child();
        let namespace = self.resolve_optional(
            document,
            scope,
            group.namespace.as_deref(),
            &join_location(location, "namespace"),
        );
        if let Some(namespace) = namespace {
            child.push_namespace(&namespace);
        }
        self.walk_actions(
            document,
            &group.actions,
            &mut child,
            &join_location(location, "actions"),
        );
    }

    fn walk_node(
        &mut self,
        document: &DocumentRef,
        node: &NodeAction,
        scope: &VariableScope,
        location: &str,
    ) {
        let field = |walker: &mut Self, value: Option<&str>, key: &str| {
            walker
                .resolve_optional(document, scope, value, &join_location(location, key))
                .and_then(Resolved::into_known)
        };
        let package = field(self, node.package.as_deref(), "pkg");
        let executable = field(self, node.executable.as_deref(), "exec");
        let name = field(self, node.name.as_deref(), "name");
        let own_namespace = self.resolve_optional(
            document,
            scope,
            node.namespace.as_deref(),
            &join_location(location, "namespace"),
        );

        let mut params_files = Vec::new();
        for (idx, entry) in &node.params {
            let entry_location = format!("{}.param[{}]", location, idx);
            match entry {
                ParamEntry::StringRef(expression) => {
                    if let Some(path) = self.param_reference(document, scope, expression, &entry_location)
                    {
                        params_files.push(path.display().to_string());
                    }
                }
                ParamEntry::ParamObject(map) => {
                    if let Some(expression) = entry.file_reference() {
                        let from_location = join_location(&entry_location, "from");
                        if let Some(path) =
                            self.param_reference(document, scope, expression, &from_location)
                        {
                            params_files.push(path.display().to_string());
                        }
                    }
                    let rest: serde_yaml::Mapping = map
                        .iter()
                        .filter(|(key, _)| key.as_str() != Some("from"))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    self.resolve_tree(document, scope, &Value::Mapping(rest), &entry_location);
                }
            }
        }

        let mut remappings = Vec::new();
        for (idx, remap) in &node.remaps {
            let remap_location = format!("{}.remap[{}]", location, idx);
            let end = |walker: &mut Self, value: Option<&str>, key: &str| {
                walker
                    .resolve_optional(document, scope, value, &join_location(&remap_location, key))
                    .and_then(Resolved::into_known)
            };
            let from = end(self, remap.from.as_deref(), "from");
            let to = end(self, remap.to.as_deref(), "to");
            if let (Some(from), Some(to)) = (from, to) {
                remappings.push((from, to));
            }
        }

        for (key, value) in &node.extra {
            self.resolve_tree(document, scope, value, &join_location(location, key));
        }

        let namespace = match own_namespace {
            Some(own) => compose_resolved(&scope.current_namespace(), &own),
            None => scope.current_namespace(),
        };

        let capture = NodeCapture {
            document: document.path.clone(),
            package,
            executable,
            name,
            namespace: namespace.into_known(),
            params_files,
            remappings,
        };
        self.nodes.push((self.current_walk, capture));
    }

    fn walk_include(
        &mut self,
        document: &DocumentRef,
        include: &IncludeAction,
        scope: &VariableScope,
        location: &str,
    ) {
        // Arg values are resolved in the including scope
        let mut seed = scope.child();
        for (name, value) in &include.args {
            let arg_location = format!("{}.arg.{}", location, name);
            let resolved = self
                .resolve_field(document, scope, value, &arg_location)
                .unwrap_or(Resolved::Unknown);
            seed.declare(name.clone(), resolved);
        }

        let Some(expression) = &include.file else {
            return;
        };
        let file_location = join_location(location, "file");
        let Some(target) = self.check_reference(
            document,
            scope,
            expression,
            ReferenceField::IncludeFile,
            &file_location,
        ) else {
            return;
        };

        if !is_yaml_path(&target) {
            log::debug!("Include target {} is not YAML, not walked", target.display());
            return;
        }
        let (key, _) = self.register_discovered(&target);
        if self.is_launch(&key) {
            log::info!("Including YAML launch file: {}", target.display());
            self.enqueue_include(key, seed);
        } else {
            log::debug!("Include target {} is not a launch document", target.display());
        }
    }

    /// Unknown action kinds still have their strings resolved
    fn walk_other(
        &mut self,
        document: &DocumentRef,
        other: &OtherAction,
        scope: &VariableScope,
        location: &str,
    ) {
        log::debug!("No dedicated handling for action '{}'", other.kind);
        match &other.body {
            Value::Mapping(map) => {
                for (key, value) in map {
                    // guards were already resolved
                    if matches!(key.as_str(), Some("if" | "unless")) {
                        continue;
                    }
                    if let Some(key) = key.as_str() {
                        self.resolve_tree(document, scope, value, &join_location(location, key));
                    }
                }
            }
            body => self.resolve_tree(document, scope, body, location),
        }
    }

    /// A `param` file reference: must exist, YAML targets become param configs
    fn param_reference(
        &mut self,
        document: &DocumentRef,
        scope: &VariableScope,
        expression: &str,
        location: &str,
    ) -> Option<PathBuf> {
        let target = self.check_reference(
            document,
            scope,
            expression,
            ReferenceField::ParamFrom,
            location,
        )?;

        if is_yaml_path(&target) {
            let (key, is_new) = self.register_discovered(&target);
            self.registry.mark_param_reference(&key);
            // launch files passed as parameters are still checked on their own
            if is_new && self.is_launch(&key) {
                let scope = self.root_scope(&key);
                let document = DocumentRef {
                    key,
                    path: target.clone(),
                };
                self.enqueue_root(document, scope);
            }
        }
        Some(target)
    }

    /// Resolve a file reference and check the target exists.
    ///
    /// Returns the target path only when it resolved and exists.
    fn check_reference(
        &mut self,
        document: &DocumentRef,
        scope: &VariableScope,
        expression: &str,
        field: ReferenceField,
        location: &str,
    ) -> Option<PathBuf> {
        let resolved = self.resolve_field(document, scope, expression, location)?;
        let Resolved::Known(resolved) = resolved else {
            log::debug!("{}: '{}' only known at launch time", location, expression);
            return None;
        };

        let target = relative_to(&document.path, &resolved);
        if target.is_file() {
            log::debug!("{}: {} -> {}", location, field, target.display());
            return Some(target);
        }

        let message = match field {
            ReferenceField::IncludeFile => {
                format!("Included launch file does not exist: {}", target.display())
            }
            ReferenceField::ParamFrom => {
                format!("Parameter file does not exist: {}", target.display())
            }
        };
        let message = message + &suggestion_suffix(&target);
        self.report(
            document,
            DiagnosticKind::MissingReferencedFile,
            message,
            location,
        );
        None
    }

    fn resolve_optional(
        &mut self,
        document: &DocumentRef,
        scope: &VariableScope,
        value: Option<&str>,
        location: &str,
    ) -> Option<Resolved> {
        value.and_then(|value| self.resolve_field(document, scope, value, location))
    }

    /// Resolve every string below `value` for syntax and variable errors
    fn resolve_tree(
        &mut self,
        document: &DocumentRef,
        scope: &VariableScope,
        value: &Value,
        location: &str,
    ) {
        let mut strings = Vec::new();
        string_values(value, location, &mut strings);
        for (location, value) in strings {
            if contains_substitution(&value) {
                self.resolve_field(document, scope, &value, &location);
            }
        }
    }
}

/// Resolved reference path, relative ones against the referencing document
pub(super) fn relative_to(document: &Path, resolved: &str) -> PathBuf {
    let path = PathBuf::from(resolved);
    if path.is_absolute() {
        return path;
    }
    document
        .parent()
        .map(|dir| dir.join(&path))
        .unwrap_or(path)
}
