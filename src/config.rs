//! Process environment the host prepares before any window is created.

use crate::constants::{DEFAULT_STORAGE_PATH, DEFAULT_XDG_RUNTIME_DIR};
use log::debug;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    storage_path: PathBuf,
    wayland: bool,
    assignments: Vec<(&'static str, String)>,
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Compute the configuration from `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let mut assignments = Vec::new();

        let wayland = get("DISPLAY").is_none();
        if wayland {
            for (key, value) in [
                ("EGL_PLATFORM", "wayland"),
                ("QT_QPA_PLATFORM", "wayland"),
                ("XDG_RUNTIME_DIR", DEFAULT_XDG_RUNTIME_DIR),
                ("QT_IM_MODULE", "Maliit"),
            ] {
                if get(key).is_none() {
                    assignments.push((key, value.to_string()));
                }
            }
            assignments.push(("QT_WAYLAND_DISABLE_WINDOWDECORATION", "1".to_string()));
        }

        let storage_path = PathBuf::from(
            get("PERSISTENT_STORAGE_PATH").unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string()),
        );

        for (key, dir) in [("XDG_DATA_HOME", "data"), ("XDG_CACHE_HOME", "cache")] {
            if get(key).is_none() {
                assignments.push((key, storage_path.join(dir).display().to_string()));
            }
        }

        Self {
            storage_path,
            wayland,
            assignments,
        }
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// True when no X display is available and the host runs on wayland.
    pub fn wayland(&self) -> bool {
        self.wayland
    }

    /// Variables `apply` will set, in order.
    pub fn assignments(&self) -> &[(&'static str, String)] {
        &self.assignments
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Export the computed variables into the process environment.
    ///
    /// Must run before any other thread is spawned.
    pub fn apply(&self) {
        for (key, value) in &self.assignments {
            debug!("Setting {key}={value}");
            std::env::set_var(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> HostConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        HostConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_display() {
        let config = config(&[]);

        assert!(config.wayland());
        assert_eq!(config.storage_path(), Path::new(DEFAULT_STORAGE_PATH));
        assert_eq!(config.get("EGL_PLATFORM"), Some("wayland"));
        assert_eq!(config.get("QT_QPA_PLATFORM"), Some("wayland"));
        assert_eq!(config.get("XDG_RUNTIME_DIR"), Some("/tmp/luna-session"));
        assert_eq!(config.get("QT_IM_MODULE"), Some("Maliit"));
        assert_eq!(config.get("QT_WAYLAND_DISABLE_WINDOWDECORATION"), Some("1"));
        assert_eq!(
            config.get("XDG_DATA_HOME"),
            Some("/media/cryptofs/.sysmgr/data")
        );
        assert_eq!(
            config.get("XDG_CACHE_HOME"),
            Some("/media/cryptofs/.sysmgr/cache")
        );
    }

    #[test]
    fn test_existing_wayland_values_are_kept() {
        let config = config(&[
            ("XDG_RUNTIME_DIR", "/run/user/1000"),
            ("QT_IM_MODULE", "qtvirtualkeyboard"),
        ]);

        assert_eq!(config.get("XDG_RUNTIME_DIR"), None);
        assert_eq!(config.get("QT_IM_MODULE"), None);
        assert_eq!(config.get("QT_WAYLAND_DISABLE_WINDOWDECORATION"), Some("1"));
    }

    #[test]
    fn test_x11_display_skips_wayland_setup() {
        let config = config(&[("DISPLAY", ":0")]);

        assert!(!config.wayland());
        assert_eq!(config.get("EGL_PLATFORM"), None);
        assert_eq!(config.get("QT_WAYLAND_DISABLE_WINDOWDECORATION"), None);
        assert_eq!(config.assignments().len(), 2);
    }

    #[test]
    fn test_storage_path_override() {
        let config = config(&[
            ("DISPLAY", ":0"),
            ("PERSISTENT_STORAGE_PATH", "/var/luna"),
            ("XDG_CACHE_HOME", "/tmp/cache"),
        ]);

        assert_eq!(config.storage_path(), Path::new("/var/luna"));
        assert_eq!(config.get("XDG_DATA_HOME"), Some("/var/luna/data"));
        assert_eq!(config.get("XDG_CACHE_HOME"), None);
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = config(&[("DISPLAY", ""), ("PERSISTENT_STORAGE_PATH", "")]);

        assert!(config.wayland());
        assert_eq!(config.storage_path(), Path::new(DEFAULT_STORAGE_PATH));
    }
}
