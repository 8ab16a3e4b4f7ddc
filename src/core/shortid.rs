//! Short ID system for easier entity selection
//!
//! List commands hand out per-type aliases like `RAW@1` or `PART@3` that map
//! to full entity IDs. Aliases are rebuilt each time a type is listed and are
//! persisted in `.pws/shortids.json` so the next command can use them.

use std::collections::HashMap;
use std::fs;

use crate::core::identity::EntityPrefix;
use crate::core::project::Project;

/// Index file location within a project
const INDEX_FILE: &str = ".pws/shortids.json";

/// A mapping of short IDs (PREFIX@N) to full entity IDs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Maps "PREFIX@N" to full entity ID string
    entries: HashMap<String, String>,
    /// Maps full entity ID to "PREFIX@N" (reverse lookup)
    #[serde(skip)]
    reverse: HashMap<String, String>,
}

impl ShortIdIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a project, or create empty if not found
    pub fn load(project: &Project) -> Self {
        let path = project.root().join(INDEX_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::new();
        };
        match serde_json::from_str::<ShortIdIndex>(&content) {
            Ok(mut index) => {
                index.reverse = index
                    .entries
                    .iter()
                    .map(|(k, v)| (v.clone(), k.clone()))
                    .collect();
                index
            }
            Err(e) => {
                tracing::debug!(error = %e, "discarding corrupt short id index");
                Self::new()
            }
        }
    }

    /// Save the index to a project
    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.root().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Replace the aliases of one entity type, numbering from 1 in the given order
    pub fn rebuild(&mut self, prefix: EntityPrefix, entity_ids: impl IntoIterator<Item = String>) {
        let tag = format!("{}@", prefix.as_str());
        self.entries.retain(|k, _| !k.starts_with(&tag));
        self.reverse.retain(|_, v| !v.starts_with(&tag));

        for (i, id) in entity_ids.into_iter().enumerate() {
            let short = format!("{}{}", tag, i + 1);
            self.reverse.insert(id.clone(), short.clone());
            self.entries.insert(short, id);
        }
    }

    /// Resolve a reference to a full or partial entity ID
    ///
    /// `RAW@2` style aliases are looked up (case-insensitive); anything else is
    /// passed through for partial matching. Unknown aliases give `None`.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        match reference.split_once('@') {
            Some((prefix, num)) if !prefix.is_empty() => {
                let key = format!("{}@{}", prefix.to_uppercase(), num);
                self.entries.get(&key).cloned()
            }
            _ => Some(reference.to_string()),
        }
    }

    /// Get the short ID for a full entity ID
    pub fn get_short_id(&self, entity_id: &str) -> Option<String> {
        self.reverse.get(entity_id).cloned()
    }

    /// Short ID if known, else the full ID
    pub fn display(&self, entity_id: &str) -> String {
        self.get_short_id(entity_id)
            .unwrap_or_else(|| entity_id.to_string())
    }

    /// Number of entries in the index
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rebuild_and_resolve() {
        let mut index = ShortIdIndex::new();
        index.rebuild(
            EntityPrefix::Raw,
            vec!["RAW-01ABC".to_string(), "RAW-02DEF".to_string()],
        );

        assert_eq!(index.resolve("RAW@1"), Some("RAW-01ABC".to_string()));
        assert_eq!(index.resolve("raw@2"), Some("RAW-02DEF".to_string()));
        assert_eq!(index.resolve("RAW@9"), None);
        assert_eq!(index.get_short_id("RAW-02DEF"), Some("RAW@2".to_string()));
    }

    #[test]
    fn test_rebuild_only_touches_one_prefix() {
        let mut index = ShortIdIndex::new();
        index.rebuild(EntityPrefix::Raw, vec!["RAW-A".to_string()]);
        index.rebuild(EntityPrefix::Part, vec!["PART-A".to_string(), "PART-B".to_string()]);
        index.rebuild(EntityPrefix::Part, vec!["PART-C".to_string()]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("RAW@1"), Some("RAW-A".to_string()));
        assert_eq!(index.resolve("PART@1"), Some("PART-C".to_string()));
        assert_eq!(index.get_short_id("PART-A"), None);
    }

    #[test]
    fn test_passthrough() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("RAW-01ABC"), Some("RAW-01ABC".to_string()));
        assert_eq!(index.resolve("@1"), Some("@1".to_string()));
        assert_eq!(index.display("PROT-X"), "PROT-X");
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let mut index = ShortIdIndex::new();
        index.rebuild(EntityPrefix::Ord, vec!["ORD-1".to_string()]);
        index.save(&project).unwrap();

        let loaded = ShortIdIndex::load(&project);
        assert_eq!(loaded.resolve("ORD@1"), Some("ORD-1".to_string()));
        assert_eq!(loaded.get_short_id("ORD-1"), Some("ORD@1".to_string()));
    }
}
