//! Locale loading
//!
//! Layout on disk:
//!
//! ```text
//! locales/
//!   source/            authoritative language, one file per group
//!     general.json
//!     commands.yaml
//!   translated/
//!     fr/              same file names as source/, any subset of them
//!       general.json
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::application::errors::LocaleError;
use crate::domain::entities::{flatten, Locale};

const EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Every loaded locale, by code
pub struct LocaleStore {
    source_code: String,
    locales: RwLock<HashMap<String, Arc<Locale>>>,
}

impl LocaleStore {
    pub fn new(source_code: impl Into<String>) -> Self {
        Self {
            source_code: source_code.into(),
            locales: RwLock::new(HashMap::new()),
        }
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn get(&self, code: &str) -> Option<Arc<Locale>> {
        self.locales.read().ok()?.get(code).cloned()
    }

    /// The authoritative locale; `None` until locales are loaded
    pub fn source(&self) -> Option<Arc<Locale>> {
        self.get(&self.source_code)
    }

    /// The requested locale, or the authoritative one when it is unknown
    pub fn get_or_source(&self, code: &str) -> Option<Arc<Locale>> {
        self.get(code).or_else(|| self.source())
    }

    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .locales
            .read()
            .map(|l| l.keys().cloned().collect())
            .unwrap_or_default();
        codes.sort();
        codes
    }

    pub fn len(&self) -> usize {
        self.locales.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert(&self, locale: Locale) {
        if let Ok(mut locales) = self.locales.write() {
            locales.insert(locale.code.clone(), Arc::new(locale));
        }
    }

    /// Load the source locale and every translation under `root`.
    ///
    /// Replaces whatever was loaded before. Returns the number of locales.
    pub async fn load_dir(&self, root: impl AsRef<Path>) -> Result<usize, LocaleError> {
        let root = root.as_ref();
        let source_dir = root.join("source");
        if !tokio::fs::try_exists(&source_dir).await.unwrap_or(false) {
            return Err(LocaleError::MissingSource(source_dir));
        }

        let source_files = list_files(&source_dir).await?;
        let source_tree = load_tree(&source_dir, &source_files, true).await?;
        let source_data = flatten_tree(&self.source_code, &source_tree);
        let source = Locale::source(&self.source_code, source_data);

        let mut loaded = HashMap::new();
        let translated_dir = root.join("translated");
        if tokio::fs::try_exists(&translated_dir).await.unwrap_or(false) {
            for code in list_dirs(&translated_dir).await? {
                if code == self.source_code {
                    tracing::warn!(
                        "Ignoring translation that shadows the source locale '{}'",
                        code
                    );
                    continue;
                }
                let tree = load_tree(&translated_dir.join(&code), &source_files, false).await?;
                let locale = Locale::overlay(&source, &code, flatten_tree(&code, &tree));
                tracing::debug!(
                    locale = %code,
                    translated = locale.overridden(),
                    total = locale.len(),
                    "Loaded locale"
                );
                loaded.insert(code, Arc::new(locale));
            }
        } else {
            tracing::debug!("No translated locales in {}", translated_dir.display());
        }

        loaded.insert(self.source_code.clone(), Arc::new(source));
        let count = loaded.len();
        if let Ok(mut locales) = self.locales.write() {
            *locales = loaded;
        }
        Ok(count)
    }
}

fn flatten_tree(code: &str, tree: &Value) -> HashMap<String, String> {
    let flat = flatten(tree);
    for key in &flat.collisions {
        tracing::warn!(
            locale = %code,
            key = %key,
            "Duplicate translation key, keeping the first value"
        );
    }
    flat.entries
}

/// Group name of a locale file: its name up to the first dot
fn group_name(file: &str) -> Option<&str> {
    file.split('.').next().filter(|name| !name.is_empty())
}

fn is_locale_file(file: &str) -> bool {
    Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

async fn list_files(dir: &Path) -> Result<Vec<String>, LocaleError> {
    let mut files = list_entries(dir, false).await?;
    files.retain(|f| is_locale_file(f) && group_name(f).is_some());
    Ok(files)
}

async fn list_dirs(dir: &Path) -> Result<Vec<String>, LocaleError> {
    let mut dirs = list_entries(dir, true).await?;
    dirs.retain(|d| !d.starts_with('.'));
    Ok(dirs)
}

async fn list_entries(dir: &Path, want_dirs: bool) -> Result<Vec<String>, LocaleError> {
    let io_err = |source| LocaleError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if is_dir != want_dirs {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    // Directory order differs between platforms; sort for reproducible loads
    names.sort();
    Ok(names)
}

/// Read `files` from `dir` into one tree keyed by group name.
///
/// With `strict` unset, missing or malformed files are skipped with a warning.
async fn load_tree(dir: &Path, files: &[String], strict: bool) -> Result<Value, LocaleError> {
    let mut tree = serde_json::Map::new();
    for file in files {
        let Some(group) = group_name(file) else {
            continue;
        };
        let path = dir.join(file);
        match read_file(&path).await {
            Ok(value) => match tree.get_mut(group) {
                Some(existing) => merge_first_wins(existing, value, group, &path),
                None => {
                    tree.insert(group.to_string(), value);
                }
            },
            Err(LocaleError::Io { source, .. })
                if !strict && source.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) if !strict => {
                tracing::warn!("Skipping translation file: {}", e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(Value::Object(tree))
}

/// Fold a second file of the same group into `existing`. Keys already
/// present keep their value; differing values are logged.
fn merge_first_wins(existing: &mut Value, incoming: Value, key: &str, path: &Path) {
    match (existing, incoming) {
        (Value::Object(current), Value::Object(incoming)) => {
            for (name, value) in incoming {
                let child = format!("{}.{}", key, name);
                match current.get_mut(&name) {
                    Some(slot) => merge_first_wins(slot, value, &child, path),
                    None => {
                        current.insert(name, value);
                    }
                }
            }
        }
        (existing, incoming) if *existing != incoming => {
            tracing::warn!(
                key = %key,
                file = %path.display(),
                "Duplicate translation key, keeping the first value"
            );
        }
        _ => {}
    }
}

async fn read_file(path: &Path) -> Result<Value, LocaleError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LocaleError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
        _ => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| LocaleError::Parse {
        path: PathBuf::from(path),
        reason,
    })
}

#[cfg(test)]
mod tests;
