use std::path::{Path, PathBuf};

use crate::envelope::{PolicyEnvelope, SavedPolicy};

/// Errors that can occur while reading or writing saved policies.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create policy directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("policy document is not valid JSON: {0}")]
    InvalidDocument(#[source] serde_json::Error),

    #[error("failed to serialize policy envelope: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write policy file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("policy file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to list policy directory {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("policy file '{0}' not found")]
    NotFound(String),
}

/// Directory-backed store of saved policies.
///
/// Each policy is one pretty-printed JSON file holding a
/// [`PolicyEnvelope`].
#[derive(Debug, Clone)]
pub struct PolicyStore {
    dir: PathBuf,
}

impl PolicyStore {
    /// Open the store at `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `document` wrapped in a metadata envelope and return the path
    /// written.
    ///
    /// `name` is sanitised with [`sanitize_name`]; without one, or with a
    /// blank one, a timestamped name is used. An existing file of the same
    /// name is overwritten.
    pub async fn save(
        &self,
        document: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<PathBuf, StoreError> {
        let policy: serde_json::Value =
            serde_json::from_str(document).map_err(StoreError::InvalidDocument)?;

        let name = match name.filter(|n| !n.trim().is_empty()) {
            Some(name) => sanitize_name(name),
            None => default_name(),
        };
        let path = self.dir.join(format!("{name}.json"));

        let envelope = PolicyEnvelope::new(policy, description);
        let bytes = serde_json::to_vec_pretty(&envelope).map_err(StoreError::Serialize)?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "policy saved");
        Ok(path)
    }

    /// Load `filename` from the store directory.
    pub async fn load(&self, filename: &str) -> Result<SavedPolicy, StoreError> {
        load_file(&self.dir.join(filename)).await
    }

    /// Names of all `.json` files in the store, sorted.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let list_err = |source| StoreError::List {
            path: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(list_err)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".json") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Locate `filename` in the store, then in each fallback directory.
    ///
    /// A path that exists as given (absolute or relative to the working
    /// directory) is accepted last.
    pub async fn resolve(
        &self,
        filename: &str,
        fallback_dirs: &[PathBuf],
    ) -> Result<PathBuf, StoreError> {
        let candidates = std::iter::once(self.dir.join(filename))
            .chain(fallback_dirs.iter().map(|d| d.join(filename)))
            .chain(std::iter::once(PathBuf::from(filename)));

        for candidate in candidates {
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(candidate);
            }
        }
        Err(StoreError::NotFound(filename.to_string()))
    }

    /// Resolve and load `filename` in one step.
    pub async fn find(
        &self,
        filename: &str,
        fallback_dirs: &[PathBuf],
    ) -> Result<SavedPolicy, StoreError> {
        let path = self.resolve(filename, fallback_dirs).await?;
        load_file(&path).await
    }
}

/// Read a saved-policy file from an explicit path.
pub async fn load_file(path: &Path) -> Result<SavedPolicy, StoreError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let value = serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SavedPolicy::from_value(value))
}

/// Make `name` safe to use as a file stem: every character other than a
/// letter, digit, `-` or `_` becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Timestamped file stem used when no name is given.
pub fn default_name() -> String {
    format!("policy_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}
