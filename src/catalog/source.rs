use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use walkdir::WalkDir;

use crate::catalog::model::VariantData;
use crate::foundation::error::{ForgeError, ForgeResult};

/// One uploaded file: a relative path of the form `.../<layer>/<file>` plus its bytes handle.
#[derive(Clone, Debug)]
pub struct FileEntry {
    /// Slash-separated relative path.
    pub rel_path: String,
    /// Where the encoded bytes live.
    pub data: VariantData,
}

impl FileEntry {
    /// Entry backed by a file on disk.
    pub fn from_path(rel_path: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            rel_path: rel_path.into(),
            data: VariantData::Path(path.into()),
        }
    }

    /// Entry backed by in-memory bytes.
    pub fn from_bytes(rel_path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            rel_path: rel_path.into(),
            data: VariantData::Bytes(bytes.into()),
        }
    }
}

/// Anything that can list uploaded files in a stable order.
pub trait FileSource {
    /// List every file. Order is preserved into each layer's variant order.
    fn entries(&self) -> ForgeResult<Vec<FileEntry>>;
}

/// Directory tree on disk, listed like a browser directory picker would.
///
/// Relative paths start with the root folder's own name, so `layers/Eyes/open.png` under a root
/// called `layers` lands in layer `Eyes`. Entries are sorted by file name within each directory.
/// Hidden files and folders (leading `.`) are skipped.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSource for DirSource {
    fn entries(&self) -> ForgeResult<Vec<FileEntry>> {
        if !self.root.is_dir() {
            return Err(ForgeError::validation(format!(
                "layers root '{}' is not a directory",
                self.root.display()
            )));
        }
        let root = self
            .root
            .canonicalize()
            .with_context(|| format!("resolve layers root '{}'", self.root.display()))?;
        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut out = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry.with_context(|| format!("walk '{}'", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&root)
                .with_context(|| format!("relativize '{}'", entry.path().display()))?;
            let rel = rel.to_string_lossy().replace('\\', "/");
            let rel_path = if root_name.is_empty() {
                rel
            } else {
                format!("{root_name}/{rel}")
            };
            out.push(FileEntry::from_path(rel_path, entry.path()));
        }
        Ok(out)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// In-memory file list, returned in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    entries: Vec<FileEntry>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file.
    pub fn push(&mut self, rel_path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.entries.push(FileEntry::from_bytes(rel_path, bytes));
    }

    /// Builder-style [`MemorySource::push`].
    pub fn with(mut self, rel_path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.push(rel_path, bytes);
        self
    }
}

impl FileSource for MemorySource {
    fn entries(&self) -> ForgeResult<Vec<FileEntry>> {
        Ok(self.entries.clone())
    }
}

impl FileSource for Vec<FileEntry> {
    fn entries(&self) -> ForgeResult<Vec<FileEntry>> {
        Ok(self.clone())
    }
}

/// Split a relative path into `(layer name, file name)`: its last two segments.
///
/// Backslashes count as separators; empty and `.` segments are ignored.
pub fn split_layer_path(rel_path: &str) -> ForgeResult<(String, String)> {
    let s = rel_path.replace('\\', "/");
    let parts: Vec<&str> = s
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    match parts.as_slice() {
        [.., layer, file] => Ok(((*layer).to_string(), (*file).to_string())),
        _ => Err(ForgeError::validation(format!(
            "'{rel_path}' is not inside a layer folder (expected '<layer>/<file>')"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/source.rs"]
mod tests;
