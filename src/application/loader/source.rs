//! Unit sources - where unit identifiers are enumerated from

use std::path::PathBuf;

use async_trait::async_trait;

use crate::application::errors::LoaderError;

/// Lists unit identifiers such as `ready.yaml` or `invites`
#[async_trait]
pub trait UnitSource: Send + Sync {
    async fn list(&self) -> Result<Vec<String>, LoaderError>;

    fn describe(&self) -> String;
}

/// Unit name of an identifier: everything before the first `.`
pub fn unit_name(identifier: &str) -> Option<&str> {
    identifier.split('.').next().filter(|name| !name.is_empty())
}

/// Files in a directory, one unit per file
pub struct DirectorySource {
    path: PathBuf,
}

impl DirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl UnitSource for DirectorySource {
    async fn list(&self) -> Result<Vec<String>, LoaderError> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            tracing::warn!("Unit directory does not exist: {}", self.path.display());
            return Ok(Vec::new());
        }

        let source_err = |source| LoaderError::Source {
            path: self.path.clone(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&self.path).await.map_err(source_err)?;
        let mut identifiers = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(source_err)? {
            match entry.file_type().await {
                Ok(t) if t.is_file() => {}
                _ => continue,
            }
            if let Some(name) = entry.file_name().to_str() {
                identifiers.push(name.to_string());
            }
        }
        identifiers.sort();
        Ok(identifiers)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A fixed list of identifiers
pub struct StaticSource {
    identifiers: Vec<String>,
}

impl StaticSource {
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl UnitSource for StaticSource {
    async fn list(&self) -> Result<Vec<String>, LoaderError> {
        Ok(self.identifiers.clone())
    }

    fn describe(&self) -> String {
        format!("{} static units", self.identifiers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_name() {
        assert_eq!(unit_name("ready.yaml"), Some("ready"));
        assert_eq!(unit_name("messageCreate"), Some("messageCreate"));
        assert_eq!(unit_name("invites.filter.yml"), Some("invites"));
        assert_eq!(unit_name(".gitkeep"), None);
        assert_eq!(unit_name(""), None);
    }

    #[tokio::test]
    async fn test_directory_source_lists_files() {
        let dir = std::env::temp_dir().join(format!("herald-units-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("ready.yaml"), "").unwrap();
        std::fs::write(dir.join("messageCreate.yaml"), "").unwrap();

        let listed = DirectorySource::new(&dir).list().await.unwrap();
        assert_eq!(listed, vec!["messageCreate.yaml", "ready.yaml"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = std::env::temp_dir().join(format!("herald-none-{}", uuid::Uuid::new_v4()));
        assert!(DirectorySource::new(dir).list().await.unwrap().is_empty());
    }
}
