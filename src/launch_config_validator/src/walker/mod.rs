//! Reference graph walker
//!
//! A run has three phases:
//!
//! 1. Root candidates are read, parsed and classified from content alone.
//!    They are independent, so this happens in parallel.
//! 2. Launch documents are walked one at a time from a work queue. Walking
//!    resolves every substitution, checks referenced files, registers newly
//!    reached YAML files and upgrades `param[].from` targets. An included
//!    document is walked again for every distinct scope it is included with.
//! 3. Every registered document is validated in registration order. All
//!    upgrades have happened by now, so schema selection sees final kinds.
//!
//! Each walk belongs to the tree of the root walk it descends from. A root
//! document that some other tree includes gets its values from that include,
//! so the findings and nodes of its own tree are dropped before reporting.

mod config;
mod launch;

use crate::{
    captures::NodeCapture,
    diagnostic::{Diagnostic, DiagnosticKind, Report},
    document::{document_key, DocumentKind, DocumentRecord, DocumentRegistry},
    provider::PackageProvider,
    schema::{SchemaId, SchemaValidator},
    substitution::{resolve_str, ResolveContext, Resolved, VariableScope},
};
use rayon::prelude::*;
use std::{
    collections::{HashMap, HashSet, VecDeque},
    path::{Path, PathBuf},
};

/// Run configuration, passed explicitly into [`ReferenceWalker`]
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Relaxed mode: missing packages and missing referenced files are not errors
    pub isolated: bool,
    /// `key:=value` launch arguments bound in every root launch document
    pub launch_args: Vec<(String, String)>,
}

/// Document currently being walked
#[derive(Debug, Clone)]
struct DocumentRef {
    key: PathBuf,
    path: PathBuf,
}

/// Launch document waiting to be walked, with the scope it starts in
struct PendingWalk {
    walk: usize,
    document: DocumentRef,
    scope: VariableScope,
}

/// One walk of one launch document
#[derive(Debug)]
struct WalkRecord {
    key: PathBuf,
    /// Id of the root walk this walk descends from (its own id for roots)
    tree: usize,
}

/// Bound on walks of one document inside one tree, for includes whose
/// arguments never settle
const MAX_WALKS_PER_DOCUMENT: usize = 8;

pub struct ReferenceWalker<'a> {
    provider: &'a dyn PackageProvider,
    schemas: &'a dyn SchemaValidator,
    options: ValidateOptions,
    registry: DocumentRegistry,
    /// Findings of the launch walks, per document key, tagged with the walk
    findings: HashMap<PathBuf, Vec<(usize, Diagnostic)>>,
    nodes: Vec<(usize, NodeCapture)>,
    queue: VecDeque<PendingWalk>,
    walks: Vec<WalkRecord>,
    /// `(tree, document key, scope signature)` of every queued walk
    walked: HashSet<(usize, PathBuf, String)>,
    current_walk: usize,
}

impl<'a> ReferenceWalker<'a> {
    pub fn new(
        provider: &'a dyn PackageProvider,
        schemas: &'a dyn SchemaValidator,
        options: ValidateOptions,
    ) -> Self {
        Self {
            provider,
            schemas,
            options,
            registry: DocumentRegistry::new(),
            findings: HashMap::new(),
            nodes: Vec::new(),
            queue: VecDeque::new(),
            walks: Vec::new(),
            walked: HashSet::new(),
            current_walk: 0,
        }
    }

    /// Validate `roots` and everything they reference
    pub fn run(self, roots: &[PathBuf]) -> Report {
        self.run_with_registry(roots).0
    }

    /// Like [`run`](Self::run), also returning the final document registry
    pub fn run_with_registry(mut self, roots: &[PathBuf]) -> (Report, DocumentRegistry) {
        self.register_roots(roots);
        self.walk_queue();
        let report = self.validate_all();
        (report, self.registry)
    }

    fn register_roots(&mut self, roots: &[PathBuf]) {
        let mut roots: Vec<(PathBuf, PathBuf)> = roots
            .iter()
            .map(|path| (document_key(path), path.clone()))
            .collect();
        roots.sort();
        roots.dedup_by(|a, b| a.0 == b.0);

        log::debug!("Loading {} root documents in parallel", roots.len());
        let loaded: Vec<(PathBuf, PathBuf, DocumentRecord)> = roots
            .into_par_iter()
            .map(|(key, path)| {
                let record = DocumentRecord::load(&path);
                (key, path, record)
            })
            .collect();

        for (key, path, record) in loaded {
            let is_launch = record.kind() == DocumentKind::Launch;
            if self.registry.insert(key.clone(), record) && is_launch {
                let scope = self.root_scope(&key);
                self.enqueue_root(DocumentRef { key, path }, scope);
            }
        }
    }

    /// Scope a root launch document starts in: launch arguments only
    fn root_scope(&self, key: &Path) -> VariableScope {
        let mut scope = VariableScope::for_file(key);
        for (name, value) in &self.options.launch_args {
            scope.declare(name.clone(), Resolved::Known(value.clone()));
        }
        scope
    }

    /// Start a new tree with `document` as its root walk
    fn enqueue_root(&mut self, document: DocumentRef, scope: VariableScope) {
        let walk = self.walks.len();
        self.walks.push(WalkRecord {
            key: document.key.clone(),
            tree: walk,
        });
        self.walked
            .insert((walk, document.key.clone(), scope.signature()));
        log::debug!("Queued root launch document {}", document.path.display());
        self.queue.push_back(PendingWalk {
            walk,
            document,
            scope,
        });
    }

    /// Queue an included launch document in the tree of the current walk.
    ///
    /// A document already walked in this tree with the same bindings is not
    /// walked again, which also ends include cycles.
    fn enqueue_include(&mut self, key: PathBuf, mut seed: VariableScope) {
        let Some(path) = self.registry.get(&key).map(|r| r.path().to_path_buf()) else {
            return;
        };
        seed.set_current_file(key.clone());

        let tree = self.walks[self.current_walk].tree;
        if !self.walked.insert((tree, key.clone(), seed.signature())) {
            log::debug!("{} already walked with these bindings", path.display());
            return;
        }
        let in_tree = self
            .walks
            .iter()
            .filter(|w| w.tree == tree && w.key == key)
            .count();
        if in_tree >= MAX_WALKS_PER_DOCUMENT {
            log::warn!(
                "{} included with {} different argument sets, not walking it again",
                path.display(),
                in_tree
            );
            return;
        }

        let walk = self.walks.len();
        self.walks.push(WalkRecord {
            key: key.clone(),
            tree,
        });
        log::debug!("Queued included launch document {}", path.display());
        self.queue.push_back(PendingWalk {
            walk,
            document: DocumentRef { key, path },
            scope: seed,
        });
    }

    /// Register a YAML file reached through a reference.
    ///
    /// Returns the registry key and whether the file was new to the run.
    fn register_discovered(&mut self, path: &Path) -> (PathBuf, bool) {
        let key = document_key(path);
        if self.registry.contains(&key) {
            return (key, false);
        }

        let record = DocumentRecord::load(path);
        log::debug!("Discovered {} ({})", path.display(), record.kind());
        self.registry.insert(key.clone(), record);
        (key, true)
    }

    fn is_launch(&self, key: &Path) -> bool {
        self.registry
            .get(key)
            .is_some_and(|record| record.kind() == DocumentKind::Launch)
    }

    fn walk_queue(&mut self) {
        while let Some(PendingWalk {
            walk,
            document,
            scope,
        }) = self.queue.pop_front()
        {
            let Some(content) = self.registry.get(&document.key).and_then(DocumentRecord::content)
            else {
                continue;
            };
            let content = content.clone();
            self.current_walk = walk;
            log::debug!("Walking {} (walk {})", document.path.display(), walk);
            self.walk_document(&document, &content, scope);
        }
    }

    /// Resolution context for `scope`, honouring relaxed mode
    fn context<'s>(&self, scope: &'s VariableScope) -> ResolveContext<'s>
    where
        'a: 's,
    {
        ResolveContext {
            scope,
            provider: self.provider,
            relaxed: self.options.isolated,
        }
    }

    /// Resolve `value`, reporting a failure against `document`
    fn resolve_field(
        &mut self,
        document: &DocumentRef,
        scope: &VariableScope,
        value: &str,
        location: &str,
    ) -> Option<Resolved> {
        let result = resolve_str(value, &self.context(scope));
        match result {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                log::debug!("{}: cannot resolve '{}': {}", location, value, e);
                self.report(document, e.kind(), e.to_string(), location);
                None
            }
        }
    }

    fn report(
        &mut self,
        document: &DocumentRef,
        kind: DiagnosticKind,
        message: String,
        location: &str,
    ) {
        let diagnostic = Diagnostic::error(&document.path, kind, message).at(location);
        self.findings
            .entry(document.key.clone())
            .or_default()
            .push((self.current_walk, diagnostic));
    }

    /// Walks whose findings and nodes are reported.
    ///
    /// Root trees are decided in key order. A tree is dropped when its root
    /// document is included by a tree that is not itself dropped, so in an
    /// include cycle of roots the last one in key order survives and covers
    /// the others.
    fn kept_walks(&self) -> HashSet<usize> {
        let mut roots: Vec<usize> = (0..self.walks.len())
            .filter(|&id| self.walks[id].tree == id)
            .collect();
        roots.sort_by(|a, b| self.walks[*a].key.cmp(&self.walks[*b].key));

        let mut dropped = HashSet::new();
        for root in roots {
            let key = &self.walks[root].key;
            let included = self.walks.iter().enumerate().any(|(id, walk)| {
                walk.tree != id
                    && walk.tree != root
                    && &walk.key == key
                    && !dropped.contains(&walk.tree)
            });
            if included {
                log::debug!(
                    "{} is included by another launch file, its standalone walk is not reported",
                    key.display()
                );
                dropped.insert(root);
            }
        }

        (0..self.walks.len())
            .filter(|id| !dropped.contains(&self.walks[*id].tree))
            .collect()
    }

    fn validate_all(&mut self) -> Report {
        let kept = self.kept_walks();
        let mut diagnostics = Vec::new();

        for key in self.registry.keys() {
            let Some(record) = self.registry.get(key) else {
                continue;
            };
            let path = record.path();

            if let Some(err) = record.load_error() {
                diagnostics.push(Diagnostic::error(path, err.kind(), err.to_string()));
                continue;
            }

            if record.is_conflicted() {
                diagnostics.push(Diagnostic::error(
                    path,
                    DiagnosticKind::ClassificationConflict,
                    "Document has both a top-level 'launch' key and a 'ros__parameters' block; \
                     it cannot be both a launch file and a parameter file",
                ));
            }

            if let Some(content) = record.content() {
                let schema = match record.kind() {
                    DocumentKind::Launch => Some(SchemaId::Launch),
                    DocumentKind::ParamConfig => Some(SchemaId::Config),
                    DocumentKind::Unclassified => None,
                };
                match schema {
                    Some(schema) => diagnostics.extend(
                        self.schemas
                            .validate(content, schema)
                            .into_iter()
                            .map(|msg| Diagnostic::error(path, DiagnosticKind::SchemaViolation, msg)),
                    ),
                    None => log::debug!("{} is unclassified, not schema-checked", path.display()),
                }
            }

            if let Some(findings) = self.findings.get(key) {
                // one document walked under several scopes repeats findings
                let mut seen: Vec<&Diagnostic> = Vec::new();
                for (walk, diagnostic) in findings {
                    if kept.contains(walk) && !seen.contains(&diagnostic) {
                        seen.push(diagnostic);
                        diagnostics.push(diagnostic.clone());
                    }
                }
            }

            if record.kind() == DocumentKind::ParamConfig {
                diagnostics.extend(self.check_config(record));
            }
        }

        let mut report = Report::new(diagnostics, self.options.isolated);
        report.nodes = std::mem::take(&mut self.nodes)
            .into_iter()
            .filter(|(walk, _)| kept.contains(walk))
            .map(|(_, node)| node)
            .collect();
        report.documents = self.registry.keys().len();
        report
    }
}

/// `base.key`, or just `key` at the document root
fn join_location(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", base, key)
    }
}

/// Every string scalar under `value`, with its location
fn string_values(value: &serde_yaml::Value, location: &str, out: &mut Vec<(String, String)>) {
    use serde_yaml::Value;

    match value {
        Value::String(s) => out.push((location.to_string(), s.clone())),
        Value::Sequence(items) => {
            for (idx, item) in items.iter().enumerate() {
                string_values(item, &format!("{}[{}]", location, idx), out);
            }
        }
        Value::Mapping(map) => {
            for (key, item) in map {
                let key = match key {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => continue,
                };
                string_values(item, &join_location(location, &key), out);
            }
        }
        Value::Tagged(tagged) => string_values(&tagged.value, location, out),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Target is a YAML document that joins the run
fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}
