//! launch_config_validator library
//!
//! Validates trees of ROS 2 YAML launch files and parameter files: resolves
//! `$(...)` substitutions, classifies documents, follows `include.file` and
//! `node.param[]` references, and checks both kinds against their schemas.

pub mod actions;
pub mod captures;
pub mod collect;
pub mod condition;
pub mod diagnostic;
pub mod document;
pub mod error;
pub mod loader;
pub mod provider;
pub mod schema;
pub mod substitution;
pub mod suggest;
pub mod walker;

pub use diagnostic::{Diagnostic, DiagnosticKind, Report, Severity};
pub use document::{DocumentKind, DocumentRegistry};
pub use error::{LoadError, Result, SubstitutionError, ValidateError};
pub use provider::{AmentIndexProvider, PackageProvider, StaticProvider};
pub use schema::{BuiltinSchemas, SchemaId, SchemaValidator};
pub use walker::{ReferenceWalker, ValidateOptions};

use std::path::PathBuf;

/// Validate files and directories against the sourced ROS installation
///
/// Directories are expanded with [`collect::collect_files`]. Packages are
/// looked up through `AMENT_PREFIX_PATH`.
pub fn validate_files(paths: &[PathBuf], options: &ValidateOptions) -> Result<Report> {
    let provider = AmentIndexProvider::from_env();
    let schemas = BuiltinSchemas::new()?;
    validate_files_with(paths, options, &provider, &schemas)
}

/// Validate files and directories with an explicit provider and schema validator
pub fn validate_files_with(
    paths: &[PathBuf],
    options: &ValidateOptions,
    provider: &dyn PackageProvider,
    schemas: &dyn SchemaValidator,
) -> Result<Report> {
    let files = collect::collect_files(paths)?;
    if files.is_empty() {
        log::info!("No YAML files found.");
        return Ok(Report::default());
    }

    log::info!("Validating {} YAML files", files.len());
    let report = ReferenceWalker::new(provider, schemas, options.clone()).run(&files);
    log::info!(
        "Checked {} documents: {} errors, {} suppressed",
        report.documents,
        report.diagnostics.len(),
        report.suppressed
    );
    Ok(report)
}
