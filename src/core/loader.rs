//! Entity loading utilities
//!
//! Generic helpers for reading every entity of one type from a project,
//! keeping track of files that failed to parse so `validate` can report them.

use std::path::{Path, PathBuf};

use crate::core::entity::Entity;
use crate::core::project::{Project, ENTITY_EXT};
use crate::yaml::{parse_yaml_file, YamlError};

/// Entities of one type plus the files that could not be read
#[derive(Debug)]
pub struct Loaded<T> {
    pub entities: Vec<T>,
    pub failures: Vec<(PathBuf, YamlError)>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Load all entities of type T from the project
///
/// Files that fail to parse are collected in `failures` instead of aborting.
pub fn load_all<T: Entity>(project: &Project) -> Loaded<T> {
    let mut loaded = Loaded::default();

    for path in project.iter_entity_files(T::PREFIX) {
        match parse_yaml_file::<T>(&path) {
            Ok(entity) => loaded.entities.push(entity),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entity file");
                loaded.failures.push((path, e));
            }
        }
    }

    // Stable order regardless of directory iteration order
    loaded
        .entities
        .sort_by(|a, b| a.id().to_string().cmp(&b.id().to_string()));
    loaded
}

/// Find an entity file by ID in a directory (supports partial matching)
///
/// Returns every file whose stem starts with or contains `id`.
pub fn find_entity_files(dir: &Path, id: &str) -> Vec<PathBuf> {
    let needle = id.to_uppercase();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.to_string_lossy().ends_with(ENTITY_EXT))
        .filter(|path| {
            path.file_name()
                .and_then(|s| s.to_str())
                .map_or(false, |name| name.to_uppercase().contains(&needle))
        })
        .collect();
    matches.sort();
    matches
}
