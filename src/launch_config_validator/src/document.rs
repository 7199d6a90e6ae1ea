//! Document records, classification, and the document registry

use crate::{error::LoadError, loader};
use serde_yaml::Value;
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

const ROS_PARAMETERS_KEY: &str = "ros__parameters";

/// What a YAML document is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Launch,
    ParamConfig,
    Unclassified,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Launch => f.write_str("launch"),
            DocumentKind::ParamConfig => f.write_str("param-config"),
            DocumentKind::Unclassified => f.write_str("unclassified"),
        }
    }
}

/// Document has both a top-level `launch:` and a `ros__parameters` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationConflict;

/// Classify a document from its own content
pub fn classify(content: &Value) -> Result<DocumentKind, ClassificationConflict> {
    let Some(map) = content.as_mapping() else {
        return Ok(DocumentKind::Unclassified);
    };

    let is_launch = map.contains_key("launch");
    let has_params = map.iter().any(|(key, value)| {
        key.as_str() == Some(ROS_PARAMETERS_KEY)
            || (key.as_str() != Some("launch") && contains_ros_parameters(value))
    });

    match (is_launch, has_params) {
        (true, true) => Err(ClassificationConflict),
        (true, false) => Ok(DocumentKind::Launch),
        (false, true) => Ok(DocumentKind::ParamConfig),
        (false, false) => Ok(DocumentKind::Unclassified),
    }
}

/// Any mapping below `value` has a `ros__parameters` key
fn contains_ros_parameters(value: &Value) -> bool {
    match value {
        Value::Mapping(map) => map.iter().any(|(key, value)| {
            key.as_str() == Some(ROS_PARAMETERS_KEY) || contains_ros_parameters(value)
        }),
        Value::Sequence(items) => items.iter().any(contains_ros_parameters),
        Value::Tagged(tagged) => contains_ros_parameters(&tagged.value),
        _ => false,
    }
}

/// Field a reference was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceField {
    IncludeFile,
    ParamFrom,
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceField::IncludeFile => f.write_str("include.file"),
            ReferenceField::ParamFrom => f.write_str("param.from"),
        }
    }
}

/// One candidate YAML file and what is known about it
#[derive(Debug)]
pub struct DocumentRecord {
    path: PathBuf,
    content: Result<Value, LoadError>,
    kind: DocumentKind,
    conflict: bool,
    upgraded: bool,
}

impl DocumentRecord {
    /// Read, parse and classify a file
    pub fn load(path: &Path) -> Self {
        Self::from_result(path, loader::load_yaml(path))
    }

    /// Parse and classify in-memory YAML text
    pub fn from_content(path: &Path, raw: &str) -> Self {
        Self::from_result(path, loader::parse_yaml(raw))
    }

    fn from_result(path: &Path, content: Result<Value, LoadError>) -> Self {
        let (kind, conflict) = match &content {
            Ok(value) => match classify(value) {
                Ok(kind) => (kind, false),
                Err(ClassificationConflict) => (DocumentKind::Unclassified, true),
            },
            Err(_) => (DocumentKind::Unclassified, false),
        };
        log::debug!("Classified {} as {}", path.display(), kind);

        Self {
            path: path.to_path_buf(),
            content,
            kind,
            conflict,
            upgraded: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> Option<&Value> {
        self.content.as_ref().ok()
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.content.as_ref().err()
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn is_conflicted(&self) -> bool {
        self.conflict
    }

    /// Whether the `ParamConfig` kind came from an inbound `param[].from`
    pub fn was_upgraded(&self) -> bool {
        self.upgraded
    }

    /// The only mutation of `kind`: `Unclassified -> ParamConfig`, at most once
    fn upgrade_to_param_config(&mut self) -> bool {
        if self.kind != DocumentKind::Unclassified
            || self.conflict
            || self.upgraded
            || self.content.is_err()
        {
            return false;
        }
        self.kind = DocumentKind::ParamConfig;
        self.upgraded = true;
        true
    }
}

/// Canonical registry key for a path
pub fn document_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Append-only set of documents keyed by canonical path, in discovery order
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    order: Vec<PathBuf>,
    records: HashMap<PathBuf, DocumentRecord>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.records.contains_key(key)
    }

    /// Register a document; returns false if the key is already present
    pub fn insert(&mut self, key: PathBuf, record: DocumentRecord) -> bool {
        if self.records.contains_key(&key) {
            return false;
        }
        self.order.push(key.clone());
        self.records.insert(key, record);
        true
    }

    pub fn get(&self, key: &Path) -> Option<&DocumentRecord> {
        self.records.get(key)
    }

    /// Note that a launch document references `key` via `param[].from`
    ///
    /// Returns true if this upgraded the document to `ParamConfig`.
    pub fn mark_param_reference(&mut self, key: &Path) -> bool {
        let upgraded = self
            .records
            .get_mut(key)
            .is_some_and(DocumentRecord::upgrade_to_param_config);
        if upgraded {
            log::debug!("Upgraded {} to param-config (referenced)", key.display());
        }
        upgraded
    }

    /// Keys in discovery order
    pub fn keys(&self) -> &[PathBuf] {
        &self.order
    }
}
