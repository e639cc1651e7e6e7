use std::borrow::Cow;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{ForgeError, ForgeResult};
use crate::foundation::math::saturating_product;

/// Where a variant's encoded image bytes live.
#[derive(Clone, Debug)]
pub enum VariantData {
    /// File on disk, read when the variant is first rendered.
    Path(PathBuf),
    /// Bytes already held in memory.
    Bytes(Arc<[u8]>),
}

impl VariantData {
    /// Load the raw encoded bytes.
    pub fn load(&self) -> ForgeResult<Cow<'_, [u8]>> {
        match self {
            Self::Path(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("read variant bytes from '{}'", path.display()))
                    .map_err(|e| ForgeError::decode(format!("{e:#}")))?;
                Ok(Cow::Owned(bytes))
            }
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

/// One trait option inside a layer: a named handle to encoded image bytes.
#[derive(Clone, Debug)]
pub struct VariantSource {
    /// File name, e.g. `red.png`.
    pub name: String,
    /// Encoded image bytes or their location.
    pub data: VariantData,
}

impl VariantSource {
    /// Variant backed by a file on disk.
    pub fn from_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            data: VariantData::Path(path.into()),
        }
    }

    /// Variant backed by in-memory bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: VariantData::Bytes(bytes.into()),
        }
    }

    /// Human-readable trait label: the name up to its first `.`.
    pub fn trait_label(&self) -> &str {
        trait_label(&self.name)
    }
}

/// Strip everything from the first `.` on: `red.v2.png` becomes `red`.
pub fn trait_label(file_name: &str) -> &str {
    file_name
        .split_once('.')
        .map_or(file_name, |(stem, _)| stem)
}

/// A trait category: one folder of variants.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Folder name; also the CSV column header.
    pub name: String,
    /// Variants in the order they were supplied.
    pub variants: Vec<VariantSource>,
}

impl Layer {
    /// Build a layer from its name and variants.
    pub fn new(name: impl Into<String>, variants: Vec<VariantSource>) -> Self {
        Self {
            name: name.into(),
            variants,
        }
    }
}

/// Ordered set of layers.
///
/// Layer order is ascending by name (ordinal byte comparison). It fixes both the compositing
/// stack (first layer at the bottom) and the trait table's column order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    layers: Vec<Layer>,
}

impl Catalog {
    /// Sort `layers` by name and reject duplicate layer names and duplicate variant names
    /// within a layer.
    pub fn from_layers(mut layers: Vec<Layer>) -> ForgeResult<Self> {
        layers.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(pair) = layers.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(ForgeError::validation(format!(
                "duplicate layer name '{}'",
                pair[0].name
            )));
        }
        for layer in &layers {
            let mut names = HashSet::with_capacity(layer.variants.len());
            if let Some(dup) = layer.variants.iter().find(|v| !names.insert(v.name.as_str())) {
                return Err(ForgeError::validation(format!(
                    "duplicate variant '{}' in layer '{}'",
                    dup.name, layer.name
                )));
            }
        }
        Ok(Self { layers })
    }

    /// Layers in stack order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Return `true` when the catalog holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer names in stack order.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    /// Number of distinct combinations: the product of every layer's variant count.
    ///
    /// Saturates at `u128::MAX`; an empty catalog has a space of `0`.
    pub fn combination_space(&self) -> u128 {
        saturating_product(self.layers.iter().map(|l| l.variants.len()))
    }

    /// Reject catalogs that cannot define a combination space.
    pub fn validate(&self) -> ForgeResult<()> {
        if self.layers.is_empty() {
            return Err(ForgeError::validation(
                "catalog has no layers; upload at least one layer folder",
            ));
        }
        if let Some(layer) = self.layers.iter().find(|l| l.variants.is_empty()) {
            return Err(ForgeError::validation(format!(
                "layer '{}' has no variants",
                layer.name
            )));
        }
        Ok(())
    }

    /// Summarize the catalog for display after an upload.
    pub fn summary(&self, file_count: usize) -> CatalogSummary {
        CatalogSummary {
            layers: self
                .layers
                .iter()
                .map(|l| (l.name.clone(), l.variants.len()))
                .collect(),
            file_count,
            combination_space: self.combination_space(),
        }
    }
}

/// Counts reported after a catalog is built.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CatalogSummary {
    /// `(layer name, variant count)` in stack order.
    pub layers: Vec<(String, usize)>,
    /// Files supplied by the source, duplicates included.
    pub file_count: usize,
    /// See [`Catalog::combination_space`].
    pub combination_space: u128,
}

impl std::fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} layers with {} total traits ({} unique combinations)",
            self.layers.len(),
            self.file_count,
            self.combination_space
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/model.rs"]
mod tests;
