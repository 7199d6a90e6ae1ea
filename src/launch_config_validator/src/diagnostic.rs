//! Diagnostics and the aggregated run report

use crate::captures::NodeCapture;
use serde::Serialize;
use std::{
    collections::BTreeSet,
    fmt,
    path::{Path, PathBuf},
};

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Malformed substitution expression
    SyntaxError,
    /// Unknown substitution kind or undeclared variable
    UnsupportedSubstitution,
    PackageNotFound,
    EnvVarMissing,
    MissingReferencedFile,
    SchemaViolation,
    /// Document matches both the launch and the parameter-config shape
    ClassificationConflict,
    DuplicateKey,
    YamlSyntax,
    EmptyDocument,
    Io,
}

impl DiagnosticKind {
    /// Whether relaxed ("isolated") mode drops diagnostics of this kind.
    ///
    /// Only package lookups and file existence depend on the host
    /// installation, so these two are the only mode-sensitive categories.
    pub fn suppressed_when_isolated(self) -> bool {
        matches!(
            self,
            DiagnosticKind::PackageNotFound | DiagnosticKind::MissingReferencedFile
        )
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::SyntaxError => "syntax-error",
            DiagnosticKind::UnsupportedSubstitution => "unsupported-substitution",
            DiagnosticKind::PackageNotFound => "package-not-found",
            DiagnosticKind::EnvVarMissing => "env-var-missing",
            DiagnosticKind::MissingReferencedFile => "missing-referenced-file",
            DiagnosticKind::SchemaViolation => "schema-violation",
            DiagnosticKind::ClassificationConflict => "classification-conflict",
            DiagnosticKind::DuplicateKey => "duplicate-key",
            DiagnosticKind::YamlSyntax => "yaml-syntax",
            DiagnosticKind::EmptyDocument => "empty-document",
            DiagnosticKind::Io => "io",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single finding attached to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    /// Where in the document, e.g. `launch[2].node.param[0].from`
    pub location: Option<String>,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(path: &Path, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            location: None,
            kind,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.path.display(),
            self.severity,
            self.message
        )?;
        if let Some(location) = &self.location {
            write!(f, " [{}]", location)?;
        }
        Ok(())
    }
}

/// Outcome of a validation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Diagnostics left after relaxed-mode suppression, in traversal order
    pub diagnostics: Vec<Diagnostic>,
    /// Number of diagnostics dropped by relaxed mode
    pub suppressed: usize,
    /// Nodes seen while walking launch documents
    pub nodes: Vec<NodeCapture>,
    /// Number of documents registered during the run
    pub documents: usize,
}

impl Report {
    /// Build a report, dropping mode-sensitive diagnostics when `isolated` is set
    pub fn new(diagnostics: Vec<Diagnostic>, isolated: bool) -> Self {
        let total = diagnostics.len();
        let diagnostics: Vec<Diagnostic> = if isolated {
            diagnostics
                .into_iter()
                .filter(|d| {
                    let drop = d.kind.suppressed_when_isolated();
                    if drop {
                        log::debug!("Suppressed in isolated mode: {}", d);
                    }
                    !drop
                })
                .collect()
        } else {
            diagnostics
        };

        Self {
            suppressed: total - diagnostics.len(),
            diagnostics,
            nodes: Vec::new(),
            documents: 0,
        }
    }

    pub fn passed(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    /// Documents with at least one error
    pub fn error_files(&self) -> BTreeSet<PathBuf> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.path.clone())
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
