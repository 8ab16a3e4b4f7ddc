//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::role::Role;
use crate::core::Project;
use crate::engine::units::DEFAULT_KERF_MARGIN;

/// Workshop configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new entities
    pub author: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Role of whoever runs the CLI (controls price visibility)
    pub role: Option<Role>,

    /// Saw kerf in cm for new cut parts
    pub kerf_margin: Option<f64>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/pws/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_file(&global_path);
        }

        // 2. Project config (.pws/config.yaml)
        if let Some(project) = project {
            config.merge_file(&project.pws_dir().join("config.yaml"));
        }

        // 3. Environment variables
        config.merge_env(|key| std::env::var(key).ok());

        config
    }

    fn merge_file(&mut self, path: &std::path::Path) {
        if !path.exists() {
            return;
        }
        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_yml::from_str::<Config>(&s).map_err(|e| e.to_string()))
        {
            Ok(other) => self.merge(other),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config"),
        }
    }

    fn merge_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(author) = var("PWS_AUTHOR") {
            self.author = Some(author);
        }
        if let Some(role) = var("PWS_ROLE").and_then(|r| r.parse().ok()) {
            self.role = Some(role);
        }
        if let Some(kerf) = var("PWS_KERF_MARGIN").and_then(|k| k.parse().ok()) {
            self.kerf_margin = Some(kerf);
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pws")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.role.is_some() {
            self.role = other.role;
        }
        if other.kerf_margin.is_some() {
            self.kerf_margin = other.kerf_margin;
        }
    }

    /// Get the author name, falling back to the login name
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Role, defaulting to admin
    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    /// Kerf for new cut parts; unusable values fall back to the default
    pub fn kerf_margin(&self) -> f64 {
        match self.kerf_margin {
            Some(k) if k.is_finite() && k >= 0.0 => k,
            _ => DEFAULT_KERF_MARGIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_config_overrides_defaults() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(
            project.pws_dir().join("config.yaml"),
            "author: Rosa\nrole: encargado\nkerf_margin: 0.3\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.merge_file(&project.pws_dir().join("config.yaml"));

        assert_eq!(config.author(), "Rosa");
        assert_eq!(config.role(), Role::Encargado);
        assert_eq!(config.kerf_margin(), 0.3);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            author: Some("file".to_string()),
            role: Some(Role::Admin),
            ..Config::default()
        };
        config.merge_env(|key| match key {
            "PWS_ROLE" => Some("encargado".to_string()),
            "PWS_KERF_MARGIN" => Some("not-a-number".to_string()),
            _ => None,
        });

        assert_eq!(config.author(), "file");
        assert_eq!(config.role(), Role::Encargado);
        assert_eq!(config.kerf_margin(), DEFAULT_KERF_MARGIN);
    }

    #[test]
    fn test_negative_kerf_falls_back() {
        let config = Config {
            kerf_margin: Some(-1.0),
            ..Config::default()
        };
        assert_eq!(config.kerf_margin(), DEFAULT_KERF_MARGIN);
    }
}
