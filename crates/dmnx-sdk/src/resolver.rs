//! Resource resolution: which model files get compiled together

use crate::error::{Result, SdkError};
use path_absolutize::Absolutize;
use std::fs;
use std::path::{Path, PathBuf};

/// Insertion-ordered set of unique absolute model paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSet {
    paths: Vec<PathBuf>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path in absolute form. Returns false if it was already present.
    pub fn insert(&mut self, path: &Path) -> Result<bool> {
        let absolute = path.absolutize()?.to_path_buf();
        if self.paths.contains(&absolute) {
            tracing::debug!("Skipping duplicate resource {}", absolute.display());
            return Ok(false);
        }
        self.paths.push(absolute);
        Ok(true)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The main model, always inserted first
    pub fn main(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }
}

/// Builds a [`ResourceSet`] from the main model, explicit imports and siblings
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    extension: String,
}

impl Default for ResourceResolver {
    fn default() -> Self {
        Self::new("dmn")
    }
}

impl ResourceResolver {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn resolve(&self, main: &Path, imports: &[PathBuf], auto_import: bool) -> Result<ResourceSet> {
        if !main.is_file() {
            return Err(SdkError::ResourceNotFound {
                path: main.to_path_buf(),
            });
        }

        let mut resources = ResourceSet::new();
        resources.insert(main)?;

        for import in imports {
            if import.is_dir() {
                for file in self.model_files(import)? {
                    resources.insert(&file)?;
                }
            } else if import.is_file() {
                resources.insert(import)?;
            } else {
                tracing::warn!("Import path {} does not exist, skipping", import.display());
            }
        }

        if auto_import {
            let main = main.absolutize()?;
            if let Some(dir) = main.parent() {
                for file in self.model_files(dir)? {
                    if resources.insert(&file)? {
                        tracing::debug!("Auto-imported {}", file.display());
                    }
                }
            }
        }

        tracing::debug!(count = resources.len(), "resources resolved");
        Ok(resources)
    }

    /// Direct children of `dir` with the model extension, sorted by path
    fn model_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && self.is_model_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn is_model_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}
