//! Error types for the launch_config_validator

use crate::diagnostic::DiagnosticKind;
use thiserror::Error;

/// Errors that abort a run before any document is processed
#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to build schema '{schema}': {reason}")]
    SchemaBuild { schema: &'static str, reason: String },

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Failure to turn a file into a YAML value
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML syntax error: {0}")]
    Syntax(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("YAML file is empty")]
    Empty,
}

impl LoadError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            LoadError::Io(_) => DiagnosticKind::Io,
            LoadError::Syntax(_) => DiagnosticKind::YamlSyntax,
            LoadError::DuplicateKey(_) => DiagnosticKind::DuplicateKey,
            LoadError::Empty => DiagnosticKind::EmptyDocument,
        }
    }
}

/// Failure to parse or resolve a substitution expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionError {
    #[error("Invalid substitution syntax: {0}")]
    Syntax(String),

    #[error("Unsupported substitution: '$({0} ...)'")]
    UnknownSubstitution(String),

    #[error("Undefined variable: '{0}'. Did you forget to declare it with arg or let?")]
    UndefinedVariable(String),

    #[error(
        "Undefined environment variable: '{0}'. Set it or give $(env) a default value."
    )]
    UndefinedEnvVar(String),

    #[error("Package '{0}' not found. Ensure the package is installed and sourced.")]
    PackageNotFound(String),
}

impl SubstitutionError {
    /// Diagnostic category this failure is reported under
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            SubstitutionError::Syntax(_) => DiagnosticKind::SyntaxError,
            SubstitutionError::UnknownSubstitution(_) | SubstitutionError::UndefinedVariable(_) => {
                DiagnosticKind::UnsupportedSubstitution
            }
            SubstitutionError::UndefinedEnvVar(_) => DiagnosticKind::EnvVarMissing,
            SubstitutionError::PackageNotFound(_) => DiagnosticKind::PackageNotFound,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidateError>;
