//! Capture types for nodes seen while walking launch documents
//!
//! Every field is already resolved. A field is `None` when it is absent from
//! the document or only known at launch time.

use serde::Serialize;
use std::path::PathBuf;

/// Captured node data from a `node` action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeCapture {
    /// Launch document declaring the node
    pub document: PathBuf,
    pub package: Option<String>,
    pub executable: Option<String>,
    pub name: Option<String>,
    /// Fully composed namespace (group namespaces plus the node's own)
    pub namespace: Option<String>,
    pub params_files: Vec<String>,
    pub remappings: Vec<(String, String)>,
}
