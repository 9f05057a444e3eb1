use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use polaris_common::{ClientError, ModelEntry, Result};

/// On-disk registry schema: a top-level `models` map keyed by model name.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    models: BTreeMap<String, ModelEntry>,
}

/// Read-only mapping from model name to launch defaults, loaded once per
/// client session.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    path: PathBuf,
    models: BTreeMap<String, ModelEntry>,
}

impl ModelRegistry {
    /// Load the registry from a YAML file. Fails if the file is missing or
    /// violates the schema; serde's field-level detail is preserved in the
    /// error text.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ClientError::RegistryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let file: RegistryFile =
            serde_yaml::from_str(&text).map_err(|e| ClientError::RegistryLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut models = file.models;
        for (name, entry) in models.iter_mut() {
            entry.name = name.clone();
        }

        tracing::debug!(path = %path.display(), count = models.len(), "model registry loaded");
        Ok(Self {
            path: path.to_path_buf(),
            models,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lookup(&self, name: &str) -> Option<&ModelEntry> {
        self.models.get(name)
    }

    /// All entries, ordered by model name.
    pub fn list(&self) -> impl Iterator<Item = &ModelEntry> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
models:
  llama-7b:
    family: llama
    variant: 7b
    num_nodes: 1
    gpus_per_node: 1
    qos: normal
    time_limit: "04:00:00"
  llama-70b:
    family: llama
    variant: 70b
    num_nodes: 2
    gpus_per_node: 4
"#;

    fn write_registry(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_and_orders_entries() {
        let f = write_registry(SAMPLE);
        let reg = ModelRegistry::load(f.path()).unwrap();
        assert_eq!(reg.len(), 2);

        let names: Vec<&str> = reg.list().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["llama-70b", "llama-7b"]);

        let entry = reg.lookup("llama-7b").unwrap();
        assert_eq!(entry.family, "llama");
        assert_eq!(entry.gpus_per_node, Some(1));
        assert_eq!(entry.time_limit.as_deref(), Some("04:00:00"));
    }

    #[test]
    fn missing_file_is_registry_load_error() {
        let err = ModelRegistry::load(Path::new("/nonexistent/models.yaml")).unwrap_err();
        assert!(matches!(err, ClientError::RegistryLoad { .. }));
    }

    #[test]
    fn schema_violation_names_the_field() {
        let f = write_registry("models:\n  broken:\n    variant: 7b\n");
        let err = ModelRegistry::load(f.path()).unwrap_err();
        match err {
            ClientError::RegistryLoad { reason, .. } => {
                assert!(reason.contains("family"), "reason was: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
