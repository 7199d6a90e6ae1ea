//! Condition evaluation for if/unless keys

use crate::{
    error::SubstitutionError,
    substitution::{resolve_str, ResolveContext, Resolved},
};

/// `if` / `unless` guards attached to an action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    pub if_expr: Option<String>,
    pub unless_expr: Option<String>,
}

impl Condition {
    /// Decide whether the guarded action is considered at all.
    ///
    /// A guard whose value is only known at launch time admits the action,
    /// so everything it references is still checked.
    pub fn admits(&self, ctx: &ResolveContext) -> Result<bool, SubstitutionError> {
        if let Some(expr) = &self.if_expr {
            if evaluate_condition(expr, ctx)? == Some(false) {
                return Ok(false);
            }
        }

        if let Some(expr) = &self.unless_expr {
            if evaluate_condition(expr, ctx)? == Some(true) {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Evaluate a condition string (may contain substitutions)
fn evaluate_condition(
    condition: &str,
    ctx: &ResolveContext,
) -> Result<Option<bool>, SubstitutionError> {
    Ok(match resolve_str(condition, ctx)? {
        Resolved::Known(value) => Some(is_truthy(&value)),
        Resolved::Unknown => None,
    })
}

/// Determine if a string value is "truthy"
pub(crate) fn is_truthy(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    matches!(
        normalized.as_str(),
        "true" | "1" | "yes" | "y" | "on" | "enabled"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{provider::StaticProvider, substitution::VariableScope};

    fn guard(if_expr: Option<&str>, unless_expr: Option<&str>) -> Condition {
        Condition {
            if_expr: if_expr.map(str::to_string),
            unless_expr: unless_expr.map(str::to_string),
        }
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("true"));
        assert!(is_truthy("True"));
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("  on  "));
        assert!(is_truthy("enabled"));

        assert!(!is_truthy("false"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
        assert!(!is_truthy("random"));
    }

    #[test]
    fn test_admits() {
        let mut scope = VariableScope::new();
        scope.declare("use_sim", Resolved::Known("true".to_string()));
        scope.declare("debug", Resolved::Known("false".to_string()));
        scope.declare("required", Resolved::Unknown);
        let provider = StaticProvider::new();
        let ctx = ResolveContext {
            scope: &scope,
            provider: &provider,
            relaxed: false,
        };

        assert!(Condition::default().admits(&ctx).unwrap());
        assert!(guard(Some("$(var use_sim)"), None).admits(&ctx).unwrap());
        assert!(!guard(Some("$(var debug)"), None).admits(&ctx).unwrap());
        assert!(!guard(None, Some("$(var use_sim)")).admits(&ctx).unwrap());
        assert!(guard(None, Some("$(var debug)")).admits(&ctx).unwrap());
        assert!(guard(Some("$(var required)"), None).admits(&ctx).unwrap());
    }

    #[test]
    fn test_unresolvable_guard_is_an_error() {
        let scope = VariableScope::new();
        let provider = StaticProvider::new();
        let ctx = ResolveContext {
            scope: &scope,
            provider: &provider,
            relaxed: true,
        };

        let err = guard(Some("$(var missing)"), None).admits(&ctx).unwrap_err();
        assert_eq!(err, SubstitutionError::UndefinedVariable("missing".to_string()));
    }
}
