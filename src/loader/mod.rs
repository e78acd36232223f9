// Namespace loaders
//
// Builds the `Namespace` lookup table for a run from either a JSON
// namespace manifest or Python stubs (single file or package directory).

mod manifest;
mod python;

pub use manifest::{Manifest, MemberKind, MemberSpec};
pub use python::{ParsedModule, PythonLoader, RelativeImport};

use crate::error::{Error, Result};
use crate::namespace::Namespace;
use std::path::Path;
use tracing::info;

/// Kind of namespace source, decided from the path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Manifest,
    PythonFile,
    Package,
}

impl SourceKind {
    /// Detect the source kind of an existing path
    pub fn detect(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            return Ok(SourceKind::Package);
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(SourceKind::Manifest),
            _ if python::is_python_file(path) => Ok(SourceKind::PythonFile),
            _ => Err(Error::UnsupportedSource(path.to_path_buf())),
        }
    }
}

/// Load the root namespace from `path`.
///
/// `name` overrides the root name; otherwise manifests use their recorded
/// name and Python sources use the module name derived from the path.
pub fn load(path: &Path, name: Option<&str>) -> Result<Namespace> {
    let kind = SourceKind::detect(path)?;
    info!(path = %path.display(), ?kind, "loading namespace");

    let namespace = match kind {
        SourceKind::Manifest => Manifest::load(path)?.into_namespace(name),
        SourceKind::PythonFile => {
            let root = name.map(str::to_string).unwrap_or_else(|| module_name(path));
            PythonLoader::new()?.load_file(path, &root)?
        }
        SourceKind::Package => {
            let root = name.map(str::to_string).unwrap_or_else(|| module_name(path));
            PythonLoader::new()?.load_package(path, &root)?
        }
    };

    info!(module = namespace.name(), members = namespace.len(), "namespace loaded");
    Ok(namespace)
}

/// Convert a source path to a Python module name
pub fn module_name(path: &Path) -> String {
    let raw = if path.is_dir() {
        path.file_name()
    } else {
        path.file_stem()
    };
    let stem = raw.unwrap_or_default().to_string_lossy();

    if stem == "__init__" {
        // Use parent directory name
        path.parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| stem.to_string())
    } else {
        stem.to_string()
    }
}
