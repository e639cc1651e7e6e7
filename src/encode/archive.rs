use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::Context;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::foundation::error::{ForgeError, ForgeResult};

/// Fixed file name offered for the downloaded bundle.
pub const DEFAULT_ARCHIVE_NAME: &str = "nfts.zip";

/// Folder inside the bundle holding generated images.
pub const IMAGES_DIR: &str = "images";

/// Trait table entry name.
pub const TRAITS_FILE: &str = "traits.csv";

/// Optional per-item metadata entry name.
pub const METADATA_FILE: &str = "metadata.json";

/// Receiver for named output blobs.
pub trait ArchiveSink {
    /// Store `bytes` under `name` (slash-separated, relative).
    fn add_file(&mut self, name: &str, bytes: Vec<u8>) -> ForgeResult<()>;
}

/// One named blob in an [`OutputBundle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleEntry {
    /// Slash-separated relative name, e.g. `images/1.png`.
    pub name: String,
    /// Entry contents.
    pub bytes: Vec<u8>,
}

/// In-memory archive built up during a run and serialized on export.
///
/// Entries keep insertion order. Re-adding a name replaces that entry in place.
#[derive(Clone, Debug, Default)]
pub struct OutputBundle {
    entries: Vec<BundleEntry>,
}

impl OutputBundle {
    /// Empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.bytes.as_slice())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize every entry into a deflate-compressed zip archive.
    #[tracing::instrument(skip(self), fields(entries = self.entries.len()))]
    pub fn to_zip_bytes(&self) -> ForgeResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for entry in &self.entries {
            zip.start_file(entry.name.as_str(), options)
                .map_err(|e| ForgeError::encode(format!("start zip entry {}: {e}", entry.name)))?;
            zip.write_all(&entry.bytes)
                .map_err(|e| ForgeError::encode(format!("write zip entry {}: {e}", entry.name)))?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| ForgeError::encode(format!("finalize zip: {e}")))?;
        Ok(cursor.into_inner())
    }

    /// Write the zip archive to `path`, creating parent directories as needed.
    pub fn write_zip(&self, path: impl AsRef<Path>) -> ForgeResult<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        let bytes = self.to_zip_bytes()?;
        std::fs::write(path, bytes)
            .with_context(|| format!("write archive '{}'", path.display()))?;
        Ok(())
    }

    /// Write every entry as a plain file under `dir`.
    pub fn write_dir(&self, dir: impl AsRef<Path>) -> ForgeResult<()> {
        let dir = dir.as_ref();
        for entry in &self.entries {
            let path = dir.join(Path::new(&entry.name));
            ensure_parent_dir(&path)?;
            std::fs::write(&path, &entry.bytes)
                .with_context(|| format!("write '{}'", path.display()))?;
        }
        Ok(())
    }
}

impl ArchiveSink for OutputBundle {
    fn add_file(&mut self, name: &str, bytes: Vec<u8>) -> ForgeResult<()> {
        validate_entry_name(name)?;
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.bytes = bytes,
            None => self.entries.push(BundleEntry {
                name: name.to_string(),
                bytes,
            }),
        }
        Ok(())
    }
}

/// Entry name for the image of 1-based item `index`.
pub fn image_entry_name(index: u32) -> String {
    format!("{IMAGES_DIR}/{index}.{}", crate::encode::png::IMAGE_EXT)
}

/// Reject names that could escape the extraction directory.
fn validate_entry_name(name: &str) -> ForgeResult<()> {
    if name.is_empty()
        || name.contains("..")
        || name.starts_with('/')
        || name.starts_with('\\')
    {
        return Err(ForgeError::validation(format!(
            "invalid archive entry name '{name}'"
        )));
    }
    Ok(())
}

/// Create `path`'s parent directory if it does not exist.
pub fn ensure_parent_dir(path: &Path) -> ForgeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/archive.rs"]
mod tests;
