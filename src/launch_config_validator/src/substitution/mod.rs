//! Substitution module

pub mod parser;
pub mod scope;
pub mod types;

pub use parser::{contains_substitution, parse_substitutions};
pub use scope::VariableScope;
pub use types::{resolve_str, resolve_substitutions, ResolveContext, Resolved, Substitution};
