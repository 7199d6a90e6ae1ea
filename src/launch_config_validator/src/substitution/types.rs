//! Substitution types

use crate::{
    error::SubstitutionError,
    provider::PackageProvider,
    substitution::{parser::parse_substitutions, scope::VariableScope},
};

/// Substitution enum representing the supported `$(kind ...)` forms
///
/// Arguments are themselves substitution sequences, so `$(var $(env X))`
/// nests naturally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// Plain text (no substitution)
    Text(String),
    /// $(find-pkg-share package)
    FindPackageShare(Vec<Substitution>),
    /// $(find-pkg-prefix package)
    FindPackagePrefix(Vec<Substitution>),
    /// $(var name)
    LaunchConfiguration(Vec<Substitution>),
    /// $(env NAME [default])
    EnvironmentVariable {
        name: Vec<Substitution>,
        default: Option<Vec<Substitution>>,
    },
    /// $(dirname)
    Dirname,
    /// $(command 'cmd' ['mode']) - payload is never executed
    Command(Vec<Substitution>),
    /// $(eval 'expr') - payload is never evaluated
    Eval(Vec<Substitution>),
    /// $(anon name)
    Anon(Vec<Substitution>),
}

/// Value produced by resolving a substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Known(String),
    /// Value exists at launch time but cannot be determined statically.
    /// Anything derived from it skips existence checks.
    Unknown,
}

impl Resolved {
    pub fn into_known(self) -> Option<String> {
        match self {
            Resolved::Known(s) => Some(s),
            Resolved::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Resolved::Unknown)
    }

    fn append(&mut self, other: Resolved) {
        if let (Resolved::Known(acc), Resolved::Known(s)) = (&mut *self, &other) {
            acc.push_str(s);
            return;
        }
        *self = Resolved::Unknown;
    }
}

/// Everything a substitution may consult while resolving
pub struct ResolveContext<'a> {
    pub scope: &'a VariableScope,
    pub provider: &'a dyn PackageProvider,
    /// Relaxed ("isolated") mode: unknown packages resolve to [`Resolved::Unknown`]
    pub relaxed: bool,
}

impl Substitution {
    /// Resolve substitution to a value
    pub fn resolve(&self, ctx: &ResolveContext) -> Result<Resolved, SubstitutionError> {
        match self {
            Substitution::Text(s) => Ok(Resolved::Known(s.clone())),
            Substitution::FindPackageShare(package) => {
                resolve_package(package, ctx, |name| ctx.provider.resolve_share(name))
            }
            Substitution::FindPackagePrefix(package) => {
                resolve_package(package, ctx, |name| ctx.provider.resolve_prefix(name))
            }
            Substitution::LaunchConfiguration(name) => {
                let Resolved::Known(name) = resolve_substitutions(name, ctx)? else {
                    return Ok(Resolved::Unknown);
                };
                ctx.scope
                    .lookup(&name)
                    .cloned()
                    .ok_or(SubstitutionError::UndefinedVariable(name))
            }
            Substitution::EnvironmentVariable { name, default } => {
                let Resolved::Known(name) = resolve_substitutions(name, ctx)? else {
                    return Ok(Resolved::Unknown);
                };
                match (ctx.provider.get_env(&name), default) {
                    (Some(value), _) => Ok(Resolved::Known(value)),
                    (None, Some(default)) => resolve_substitutions(default, ctx),
                    (None, None) => Err(SubstitutionError::UndefinedEnvVar(name)),
                }
            }
            Substitution::Dirname => Ok(ctx
                .scope
                .current_dir()
                .map(|dir| Resolved::Known(dir.display().to_string()))
                .unwrap_or(Resolved::Unknown)),
            Substitution::Command(payload) | Substitution::Eval(payload) => {
                // Nested substitutions must resolve; the result stays opaque.
                resolve_substitutions(payload, ctx)?;
                Ok(Resolved::Unknown)
            }
            Substitution::Anon(name) => Ok(match resolve_substitutions(name, ctx)? {
                Resolved::Known(name) => Resolved::Known(format!("_anon_{}", name)),
                Resolved::Unknown => Resolved::Unknown,
            }),
        }
    }
}

fn resolve_package(
    package: &[Substitution],
    ctx: &ResolveContext,
    lookup: impl Fn(&str) -> Option<std::path::PathBuf>,
) -> Result<Resolved, SubstitutionError> {
    let Resolved::Known(name) = resolve_substitutions(package, ctx)? else {
        return Ok(Resolved::Unknown);
    };
    match lookup(&name) {
        Some(path) => Ok(Resolved::Known(path.display().to_string())),
        None if ctx.relaxed => {
            log::debug!("Package '{}' not found, treated as unknown", name);
            Ok(Resolved::Unknown)
        }
        None => Err(SubstitutionError::PackageNotFound(name)),
    }
}

/// Resolve list of substitutions to a single value
pub fn resolve_substitutions(
    subs: &[Substitution],
    ctx: &ResolveContext,
) -> Result<Resolved, SubstitutionError> {
    let mut result = Resolved::Known(String::new());
    for sub in subs {
        result.append(sub.resolve(ctx)?);
    }
    Ok(result)
}

/// Parse and resolve a raw string value
pub fn resolve_str(input: &str, ctx: &ResolveContext) -> Result<Resolved, SubstitutionError> {
    let subs = parse_substitutions(input)?;
    resolve_substitutions(&subs, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use std::path::Path;

    fn ctx<'a>(scope: &'a VariableScope, provider: &'a StaticProvider) -> ResolveContext<'a> {
        ResolveContext {
            scope,
            provider,
            relaxed: false,
        }
    }

    fn text(s: &str) -> Vec<Substitution> {
        vec![Substitution::Text(s.to_string())]
    }

    #[test]
    fn test_text_substitution() {
        let scope = VariableScope::new();
        let provider = StaticProvider::new();
        assert_eq!(
            resolve_str("hello", &ctx(&scope, &provider)).unwrap(),
            Resolved::Known("hello".to_string())
        );
    }

    #[test]
    fn test_launch_configuration() {
        let mut scope = VariableScope::new();
        scope.declare("my_var", Resolved::Known("value123".to_string()));
        let provider = StaticProvider::new();
        let sub = Substitution::LaunchConfiguration(text("my_var"));
        assert_eq!(
            sub.resolve(&ctx(&scope, &provider)).unwrap(),
            Resolved::Known("value123".to_string())
        );
    }

    #[test]
    fn test_undefined_variable() {
        let scope = VariableScope::new();
        let provider = StaticProvider::new();
        let sub = Substitution::LaunchConfiguration(text("undefined"));
        assert_eq!(
            sub.resolve(&ctx(&scope, &provider)),
            Err(SubstitutionError::UndefinedVariable("undefined".to_string()))
        );
    }

    #[test]
    fn test_env_default_used_only_when_missing() {
        let scope = VariableScope::new();
        let provider = StaticProvider::new().with_env("SET_VAR", "from_env");
        let c = ctx(&scope, &provider);

        assert_eq!(
            resolve_str("$(env SET_VAR fallback)", &c).unwrap(),
            Resolved::Known("from_env".to_string())
        );
        assert_eq!(
            resolve_str("$(env UNSET_VAR fallback)", &c).unwrap(),
            Resolved::Known("fallback".to_string())
        );
        assert_eq!(
            resolve_str("$(env UNSET_VAR)", &c),
            Err(SubstitutionError::UndefinedEnvVar("UNSET_VAR".to_string()))
        );
    }

    #[test]
    fn test_find_pkg_share_and_prefix() {
        let scope = VariableScope::new();
        let provider = StaticProvider::new().with_package("demo", "/ws/install/demo");
        let c = ctx(&scope, &provider);

        assert_eq!(
            resolve_str("$(find-pkg-share demo)/launch/a.yaml", &c).unwrap(),
            Resolved::Known("/ws/install/demo/share/demo/launch/a.yaml".to_string())
        );
        assert_eq!(
            resolve_str("$(find-pkg-prefix demo)", &c).unwrap(),
            Resolved::Known("/ws/install/demo".to_string())
        );
        assert_eq!(
            resolve_str("$(find-pkg-share missing_pkg)/x.yaml", &c),
            Err(SubstitutionError::PackageNotFound("missing_pkg".to_string()))
        );
    }

    #[test]
    fn test_relaxed_package_is_unknown() {
        let scope = VariableScope::new();
        let provider = StaticProvider::new();
        let c = ResolveContext {
            scope: &scope,
            provider: &provider,
            relaxed: true,
        };
        assert_eq!(
            resolve_str("$(find-pkg-share missing_pkg)/x.yaml", &c).unwrap(),
            Resolved::Unknown
        );
        // relaxed mode never hides undeclared variables
        assert!(resolve_str("$(find-pkg-share $(var pkg))", &c).is_err());
    }

    #[test]
    fn test_dirname() {
        let scope = VariableScope::for_file(Path::new("/pkg/launch/main.launch.yaml"));
        let provider = StaticProvider::new();
        assert_eq!(
            resolve_str("$(dirname)/cfg.yaml", &ctx(&scope, &provider)).unwrap(),
            Resolved::Known("/pkg/launch/cfg.yaml".to_string())
        );
    }

    #[test]
    fn test_command_is_opaque_but_checks_nested() {
        let scope = VariableScope::for_file(Path::new("/pkg/launch/main.launch.yaml"));
        let provider = StaticProvider::new();
        let c = ctx(&scope, &provider);

        assert_eq!(
            resolve_str("$(command 'xacro $(dirname)/robot.xacro')", &c).unwrap(),
            Resolved::Unknown
        );
        assert!(resolve_str("$(command 'cat $(var undeclared)')", &c).is_err());
        assert_eq!(
            resolve_str("$(eval '1 + 2')", &c).unwrap(),
            Resolved::Unknown
        );
    }

    #[test]
    fn test_anon_is_deterministic() {
        let scope = VariableScope::new();
        let provider = StaticProvider::new();
        let c = ctx(&scope, &provider);
        let first = resolve_str("$(anon talker)", &c).unwrap();
        assert_eq!(first, resolve_str("$(anon talker)", &c).unwrap());
        assert_eq!(first, Resolved::Known("_anon_talker".to_string()));
    }

    #[test]
    fn test_unknown_propagates_through_concatenation() {
        let mut scope = VariableScope::new();
        scope.declare("required", Resolved::Unknown);
        let provider = StaticProvider::new();
        assert_eq!(
            resolve_str("prefix/$(var required)/suffix", &ctx(&scope, &provider)).unwrap(),
            Resolved::Unknown
        );
    }
}
