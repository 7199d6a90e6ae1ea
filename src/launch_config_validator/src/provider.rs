//! Package and environment lookup
//!
//! The resolver never touches the host directly: `$(find-pkg-*)` and
//! `$(env)` go through a [`PackageProvider`], so tests and isolated CI runs
//! can substitute their own view of the installation.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Capability the resolver uses for package and environment lookups
pub trait PackageProvider: Send + Sync {
    /// `<prefix>/share/<package>` of an installed package
    fn resolve_share(&self, package: &str) -> Option<PathBuf>;

    /// Install prefix of an installed package
    fn resolve_prefix(&self, package: &str) -> Option<PathBuf>;

    fn get_env(&self, name: &str) -> Option<String>;
}

/// Provider backed by the ament resource index of the sourced workspace
#[derive(Debug, Clone)]
pub struct AmentIndexProvider {
    prefixes: Vec<PathBuf>,
}

impl AmentIndexProvider {
    /// Read install prefixes from `AMENT_PREFIX_PATH`, then `/opt/ros/$ROS_DISTRO`
    pub fn from_env() -> Self {
        let mut prefixes: Vec<PathBuf> = std::env::var("AMENT_PREFIX_PATH")
            .map(|value| {
                value
                    .split(':')
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default();

        if let Ok(distro) = std::env::var("ROS_DISTRO") {
            let system = PathBuf::from("/opt/ros").join(distro);
            if !prefixes.contains(&system) {
                prefixes.push(system);
            }
        }

        log::debug!("Package prefixes: {:?}", prefixes);
        Self { prefixes }
    }

    pub fn with_prefixes(prefixes: Vec<PathBuf>) -> Self {
        Self { prefixes }
    }

    fn find_prefix(&self, package: &str) -> Option<&Path> {
        self.prefixes
            .iter()
            .find(|prefix| {
                prefix
                    .join("share/ament_index/resource_index/packages")
                    .join(package)
                    .is_file()
                    || prefix.join("share").join(package).is_dir()
            })
            .map(PathBuf::as_path)
    }
}

impl PackageProvider for AmentIndexProvider {
    fn resolve_share(&self, package: &str) -> Option<PathBuf> {
        self.find_prefix(package)
            .map(|prefix| prefix.join("share").join(package))
    }

    fn resolve_prefix(&self, package: &str) -> Option<PathBuf> {
        self.find_prefix(package).map(Path::to_path_buf)
    }

    fn get_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory provider with a fixed package table and environment
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    packages: HashMap<String, PathBuf>,
    env: HashMap<String, String>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `package` as installed under `prefix`
    pub fn with_package(mut self, package: impl Into<String>, prefix: impl Into<PathBuf>) -> Self {
        self.packages.insert(package.into(), prefix.into());
        self
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }
}

impl PackageProvider for StaticProvider {
    fn resolve_share(&self, package: &str) -> Option<PathBuf> {
        self.packages
            .get(package)
            .map(|prefix| prefix.join("share").join(package))
    }

    fn resolve_prefix(&self, package: &str) -> Option<PathBuf> {
        self.packages.get(package).cloned()
    }

    fn get_env(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ament_index_marker() {
        let dir = TempDir::new().unwrap();
        let index = dir
            .path()
            .join("share/ament_index/resource_index/packages");
        std::fs::create_dir_all(&index).unwrap();
        std::fs::write(index.join("demo_pkg"), "").unwrap();

        let provider = AmentIndexProvider::with_prefixes(vec![dir.path().to_path_buf()]);
        assert_eq!(
            provider.resolve_share("demo_pkg"),
            Some(dir.path().join("share/demo_pkg"))
        );
        assert_eq!(
            provider.resolve_prefix("demo_pkg"),
            Some(dir.path().to_path_buf())
        );
        assert!(provider.resolve_share("other_pkg").is_none());
    }

    #[test]
    fn test_ament_share_dir_fallback() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("share/plain_pkg")).unwrap();

        let provider = AmentIndexProvider::with_prefixes(vec![dir.path().to_path_buf()]);
        assert!(provider.resolve_share("plain_pkg").is_some());
    }

    #[test]
    fn test_static_provider() {
        let provider = StaticProvider::new()
            .with_package("demo", "/ws/install/demo")
            .with_env("ROBOT", "athena");

        assert_eq!(
            provider.resolve_share("demo"),
            Some(PathBuf::from("/ws/install/demo/share/demo"))
        );
        assert_eq!(
            provider.resolve_prefix("demo"),
            Some(PathBuf::from("/ws/install/demo"))
        );
        assert_eq!(provider.get_env("ROBOT"), Some("athena".to_string()));
        assert!(provider.get_env("MISSING").is_none());
    }
}
