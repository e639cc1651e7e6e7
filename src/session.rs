use std::path::Path;

use anyhow::Context;

use crate::catalog::builder::build_catalog_from;
use crate::catalog::model::{Catalog, CatalogSummary};
use crate::catalog::source::{DirSource, FileSource};
use crate::encode::archive::ensure_parent_dir;
use crate::foundation::core::GenerateParams;
use crate::foundation::error::{ForgeError, ForgeResult};
use crate::generate::generator::{GenerationObserver, GenerationRun, generate};
use crate::render::compositor::RasterCompositor;

/// Upload, generate and export state for one user.
///
/// The catalog is replaced wholesale by every successful upload. The last run is replaced by
/// every generation that passes validation, and only kept if it succeeds. `&mut self` on both
/// operations means at most one run is ever in flight per session.
#[derive(Debug, Default)]
pub struct Session {
    catalog: Catalog,
    file_count: usize,
    last_run: Option<GenerationRun>,
}

impl Session {
    /// Fresh session with an empty catalog and no run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Summary of the current catalog.
    pub fn summary(&self) -> CatalogSummary {
        self.catalog.summary(self.file_count)
    }

    /// Most recent successful run, if any.
    pub fn last_run(&self) -> Option<&GenerationRun> {
        self.last_run.as_ref()
    }

    /// Rebuild the catalog from `source`.
    ///
    /// The new catalog must be usable (at least one layer, no empty layer); otherwise the
    /// previous catalog stays in place and a validation error is returned.
    #[tracing::instrument(skip_all)]
    pub fn upload(&mut self, source: &dyn FileSource) -> ForgeResult<CatalogSummary> {
        let (catalog, file_count) = build_catalog_from(source)?;
        catalog.validate()?;
        self.catalog = catalog;
        self.file_count = file_count;

        let summary = self.summary();
        tracing::info!(
            layers = summary.layers.len(),
            files = summary.file_count,
            combinations = %summary.combination_space,
            "catalog loaded"
        );
        Ok(summary)
    }

    /// [`Session::upload`] from a directory tree on disk.
    pub fn upload_dir(&mut self, root: impl AsRef<Path>) -> ForgeResult<CatalogSummary> {
        self.upload(&DirSource::new(root.as_ref()))
    }

    /// Run generation against the current catalog with the built-in compositor.
    ///
    /// Validation failures leave the previous run untouched. Once validation passes, the
    /// previous run is discarded before any work starts.
    pub fn generate(
        &mut self,
        params: &GenerateParams,
        observer: &mut dyn GenerationObserver,
    ) -> ForgeResult<&GenerationRun> {
        params.validate()?;
        self.catalog.validate()?;
        self.last_run = None;

        let mut compositor = RasterCompositor::new(params.resize_filter);
        let run = generate(&self.catalog, params, &mut compositor, observer)?;
        Ok(self.last_run.insert(run))
    }

    /// Serialize the last run's bundle as a zip archive.
    pub fn export_zip(&self) -> ForgeResult<Vec<u8>> {
        self.require_run()?.bundle.to_zip_bytes()
    }

    /// Write the last run's zip archive to `path`.
    pub fn export_to(&self, path: impl AsRef<Path>) -> ForgeResult<()> {
        let path = path.as_ref();
        let bytes = self.export_zip()?;
        ensure_parent_dir(path)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("write archive '{}'", path.display()))?;
        Ok(())
    }

    fn require_run(&self) -> ForgeResult<&GenerationRun> {
        self.last_run
            .as_ref()
            .ok_or_else(|| ForgeError::validation("nothing generated yet"))
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
