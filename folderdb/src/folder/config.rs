use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::folder::open::OpenError;

/// Configuration of one folder, usually kept as JSON next to the application.
///
/// ```json
/// {
///   "name": "myFolder",
///   "path": "myFolder",
///   "index": { "database": "folders.db", "collectionPrefix": "myfolder" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderConfig {
    /// Logical folder name stored on every record.
    pub name: String,
    /// Directory holding the blobs.
    pub path: PathBuf,
    pub index: IndexConfig,
}

/// Where the attribute index lives and which scope it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Scope separating this folder's records from others in the same database.
    pub collection_prefix: String,
}

impl FolderConfig {
    /// Reads a configuration file. Relative paths inside it are resolved
    /// against the file's own directory.
    pub fn load(config_path: &Path) -> Result<Self, OpenError> {
        let content = fs::read_to_string(config_path)?;
        let mut config: FolderConfig = serde_json::from_str(&content)?;

        if let Some(base) = config_path.parent() {
            if config.path.is_relative() {
                config.path = base.join(&config.path);
            }
            if config.index.database.is_relative() {
                config.index.database = base.join(&config.index.database);
            }
        }
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), OpenError> {
        if self.name.is_empty() {
            return Err(OpenError::InvalidConfig("folder name is empty".to_string()));
        }
        if self.index.collection_prefix.is_empty() {
            return Err(OpenError::InvalidConfig("collection prefix is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_folder_config() {
        let json = r#"
        {
            "name": "myFolder",
            "path": "/srv/myFolder",
            "index": {
                "database": "/srv/index.db",
                "collectionPrefix": "myfolder"
            }
        }
        "#;
        let config: FolderConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.name, "myFolder");
        assert_eq!(config.path, PathBuf::from("/srv/myFolder"));
        assert_eq!(config.index.collection_prefix, "myfolder");
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let config = FolderConfig {
            name: "f".to_string(),
            path: PathBuf::from("f"),
            index: IndexConfig {
                database: PathBuf::from("f.db"),
                collection_prefix: "f".to_string(),
            },
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["index"]["collectionPrefix"].as_str(), Some("f"));
        assert!(value["index"]["collection_prefix"].is_null());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("folder.json");
        fs::write(
            &config_path,
            r#"{"name":"docs","path":"blobs","index":{"database":"index.db","collectionPrefix":"docs"}}"#,
        )
        .unwrap();

        let config = FolderConfig::load(&config_path).unwrap();
        assert_eq!(config.path, dir.path().join("blobs"));
        assert_eq!(config.index.database, dir.path().join("index.db"));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("folder.json");
        fs::write(&config_path, "{ not json").unwrap();
        assert!(matches!(
            FolderConfig::load(&config_path),
            Err(OpenError::ConfigParseError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let config = FolderConfig {
            name: String::new(),
            path: PathBuf::from("f"),
            index: IndexConfig {
                database: PathBuf::from("f.db"),
                collection_prefix: "f".to_string(),
            },
        };
        assert!(matches!(config.validate(), Err(OpenError::InvalidConfig(_))));
    }
}
