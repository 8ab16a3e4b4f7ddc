//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".pws";

/// Extension every entity file carries
pub const ENTITY_EXT: &str = ".pws.yaml";

/// Represents a workshop project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .pws/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Use an explicit root, or discover one from the current directory
    pub fn open(root: Option<&Path>) -> Result<Self, ProjectError> {
        match root {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::write_skeleton(root)
    }

    /// Force initialization even if .pws/ exists
    ///
    /// Rewrites the default config; entity files are left untouched.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_skeleton(root)
    }

    fn write_skeleton(root: PathBuf) -> Result<Self, ProjectError> {
        let pws_dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&pws_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(pws_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        for prefix in EntityPrefix::all() {
            std::fs::create_dir_all(root.join(Self::entity_directory(*prefix)))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Pallet Workshop project configuration

# Default author for new entities (can be overridden by global config)
# author: ""

# Who is using this checkout: admin sees prices, encargado does not
# role: admin

# Saw kerf in cm applied to new cut parts
# kerf_margin: 0.5

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .pws configuration directory
    pub fn pws_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Get the path for an entity file
    pub fn entity_path(&self, id: &EntityId) -> PathBuf {
        self.root
            .join(Self::entity_directory(id.prefix()))
            .join(format!("{}{}", id, ENTITY_EXT))
    }

    /// Get the directory for a given entity prefix
    pub fn entity_directory(prefix: EntityPrefix) -> &'static str {
        match prefix {
            EntityPrefix::Raw => "inventory/raw",
            EntityPrefix::Part => "inventory/parts",
            EntityPrefix::Prot => "catalog/prototypes",
            EntityPrefix::Ord => "sales/orders",
            EntityPrefix::Rcv => "purchasing/receipts",
        }
    }

    /// Iterate all entity files of a given prefix type
    pub fn iter_entity_files(&self, prefix: EntityPrefix) -> impl Iterator<Item = PathBuf> {
        let dir = self.root.join(Self::entity_directory(prefix));
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(ENTITY_EXT))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a workshop project (searched from {searched_from:?}). Run 'pws init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("workshop project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.pws_dir().join("config.yaml").exists());
        assert!(project.root().join("inventory/raw").is_dir());
        assert!(project.root().join("inventory/parts").is_dir());
        assert!(project.root().join("catalog/prototypes").is_dir());
        assert!(project.root().join("sales/orders").is_dir());
        assert!(project.root().join("purchasing/receipts").is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
        assert!(Project::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_project_discover_finds_pws_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_pws_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_entity_path_uses_prefix_directory() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = EntityId::new(EntityPrefix::Prot);

        let path = project.entity_path(&id);
        assert!(path.starts_with(project.root().join("catalog/prototypes")));
        assert!(path.to_string_lossy().ends_with(".pws.yaml"));
    }
}
