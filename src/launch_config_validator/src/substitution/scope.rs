//! Variable scope for launch arguments and lets

use super::types::Resolved;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Bindings visible to the actions of one document
///
/// Groups and includes work on a [`child`](VariableScope::child) copy, so
/// writes made inside them never reach the enclosing scope.
#[derive(Debug, Clone)]
pub struct VariableScope {
    bindings: HashMap<String, Resolved>,
    current_file: Option<PathBuf>,
    namespace_stack: Vec<Resolved>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            current_file: None,
            namespace_stack: vec![Resolved::Known("/".to_string())],
        }
    }

    /// Scope for a document, with no bindings yet
    pub fn for_file(path: &Path) -> Self {
        let mut scope = Self::new();
        scope.set_current_file(path.to_path_buf());
        scope
    }

    /// Nested scope inheriting every current binding
    pub fn child(&self) -> Self {
        self.clone()
    }

    pub fn set_current_file(&mut self, path: PathBuf) {
        self.current_file = Some(path);
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_file.as_deref().and_then(Path::parent)
    }

    /// Declare an `arg`. A binding supplied by a caller (CLI or
    /// `include.arg`) is kept; returns whether the default was applied.
    pub fn declare_arg(&mut self, name: &str, default: Resolved) -> bool {
        if self.bindings.contains_key(name) {
            log::trace!("arg '{}' already bound by caller", name);
            return false;
        }
        self.bindings.insert(name.to_string(), default);
        true
    }

    /// Bind a `let` or caller-supplied value, overwriting any previous one
    pub fn declare(&mut self, name: impl Into<String>, value: Resolved) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Resolved> {
        self.bindings.get(name)
    }

    /// Bindings and current namespace in a stable textual form, used to
    /// tell apart walks of one document under different callers
    pub fn signature(&self) -> String {
        let mut bindings: Vec<_> = self.bindings.iter().collect();
        bindings.sort_by(|a, b| a.0.cmp(b.0));
        format!("{:?} ns={:?}", bindings, self.current_namespace())
    }

    /// Push a namespace; absolute ones replace the current namespace
    pub fn push_namespace(&mut self, namespace: &Resolved) {
        let composed = compose_resolved(&self.current_namespace(), namespace);
        self.namespace_stack.push(composed);
    }

    /// Effective namespace, `Unknown` if any relative part is only known at launch time
    pub fn current_namespace(&self) -> Resolved {
        self.namespace_stack
            .last()
            .cloned()
            .unwrap_or_else(|| Resolved::Known("/".to_string()))
    }
}

impl Default for VariableScope {
    fn default() -> Self {
        Self::new()
    }
}

/// [`compose_namespace`] over possibly-unknown values
pub fn compose_resolved(base: &Resolved, namespace: &Resolved) -> Resolved {
    match (base, namespace) {
        (Resolved::Known(base), Resolved::Known(ns)) => {
            Resolved::Known(compose_namespace(base, ns))
        }
        // an absolute namespace does not depend on the base
        (Resolved::Unknown, Resolved::Known(ns)) if ns.trim().starts_with('/') => {
            Resolved::Known(compose_namespace("/", ns))
        }
        _ => Resolved::Unknown,
    }
}

/// Combine a base namespace with a (possibly relative) namespace
pub fn compose_namespace(base: &str, namespace: &str) -> String {
    let trimmed = namespace.trim();
    if trimmed.is_empty() {
        return base.to_string();
    }

    let is_absolute = trimmed.starts_with('/');
    let normalized = trimmed.trim_matches('/');
    if normalized.is_empty() {
        // "/" alone
        return if is_absolute {
            "/".to_string()
        } else {
            base.to_string()
        };
    }

    if is_absolute {
        format!("/{}", normalized)
    } else if base == "/" {
        format!("/{}", normalized)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(s: &str) -> Resolved {
        Resolved::Known(s.to_string())
    }

    #[test]
    fn test_new_scope() {
        let scope = VariableScope::new();
        assert!(scope.lookup("any").is_none());
        assert_eq!(scope.current_namespace(), known("/"));
    }

    #[test]
    fn test_arg_does_not_override_caller() {
        let mut scope = VariableScope::new();
        scope.declare("ns", known("/from_caller"));
        assert!(!scope.declare_arg("ns", known("/default")));
        assert_eq!(scope.lookup("ns"), Some(&known("/from_caller")));
    }

    #[test]
    fn test_signature_ignores_insertion_order() {
        let mut a = VariableScope::new();
        a.declare("x", known("1"));
        a.declare("y", Resolved::Unknown);
        let mut b = VariableScope::new();
        b.declare("y", Resolved::Unknown);
        b.declare("x", known("1"));
        assert_eq!(a.signature(), b.signature());

        b.declare("x", known("2"));
        assert_ne!(a.signature(), b.signature());

        let mut c = a.child();
        c.push_namespace(&known("robot"));
        assert_ne!(a.signature(), c.signature());
    }

    #[test]
    fn test_let_overwrites() {
        let mut scope = VariableScope::new();
        scope.declare_arg("x", known("1"));
        scope.declare("x", known("2"));
        assert_eq!(scope.lookup("x"), Some(&known("2")));
    }

    #[test]
    fn test_child_inherits_and_shadows_without_leaking() {
        let mut parent = VariableScope::new();
        parent.declare("a", known("outer"));

        let mut child = parent.child();
        assert_eq!(child.lookup("a"), Some(&known("outer")));
        child.declare("a", known("inner"));
        child.declare("b", known("only_child"));

        assert_eq!(child.lookup("a"), Some(&known("inner")));
        assert_eq!(parent.lookup("a"), Some(&known("outer")));
        assert!(parent.lookup("b").is_none());
    }

    #[test]
    fn test_current_dir() {
        let scope = VariableScope::for_file(Path::new("/pkg/launch/main.launch.yaml"));
        assert_eq!(scope.current_dir(), Some(Path::new("/pkg/launch")));
    }

    #[test]
    fn test_namespaces() {
        let mut scope = VariableScope::new();
        scope.push_namespace(&known("robot1"));
        assert_eq!(scope.current_namespace(), known("/robot1"));

        let mut inner = scope.child();
        inner.push_namespace(&known("sensors/"));
        assert_eq!(inner.current_namespace(), known("/robot1/sensors"));

        inner.push_namespace(&known("/other"));
        assert_eq!(inner.current_namespace(), known("/other"));

        assert_eq!(scope.current_namespace(), known("/robot1"));
    }

    #[test]
    fn test_unknown_namespaces() {
        let mut scope = VariableScope::new();
        scope.push_namespace(&Resolved::Unknown);
        assert!(scope.current_namespace().is_unknown());

        scope.push_namespace(&known("relative"));
        assert!(scope.current_namespace().is_unknown());

        scope.push_namespace(&known("/absolute"));
        assert_eq!(scope.current_namespace(), known("/absolute"));
    }

    #[test]
    fn test_compose_namespace() {
        assert_eq!(compose_namespace("/", ""), "/");
        assert_eq!(compose_namespace("/a", "/"), "/");
        assert_eq!(compose_namespace("/a", "b"), "/a/b");
        assert_eq!(compose_namespace("/", "/a/"), "/a");
    }
}
