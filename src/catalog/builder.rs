use std::collections::{BTreeMap, HashSet};

use crate::catalog::model::{Catalog, Layer, VariantSource};
use crate::catalog::source::{FileEntry, FileSource, split_layer_path};
use crate::foundation::error::ForgeResult;

/// Group files by their parent folder into a sorted [`Catalog`].
///
/// Returns the catalog and the number of files supplied. Variants keep the order in which files
/// were supplied; repeated `(layer, file)` pairs keep the first occurrence only. No file bytes
/// are read. Empty input yields an empty catalog; callers decide whether that is an error (see
/// [`Catalog::validate`]).
#[tracing::instrument(skip(entries))]
pub fn build_catalog(
    entries: impl IntoIterator<Item = FileEntry>,
) -> ForgeResult<(Catalog, usize)> {
    let mut groups: BTreeMap<String, Vec<VariantSource>> = BTreeMap::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut file_count = 0usize;

    for entry in entries {
        file_count += 1;
        let (layer, file) = split_layer_path(&entry.rel_path)?;
        if !seen.insert((layer.clone(), file.clone())) {
            tracing::warn!(
                layer = %layer,
                file = %file,
                path = %entry.rel_path,
                "duplicate variant dropped"
            );
            continue;
        }
        groups.entry(layer).or_default().push(VariantSource {
            name: file,
            data: entry.data,
        });
    }

    let layers = groups
        .into_iter()
        .map(|(name, variants)| Layer::new(name, variants))
        .collect();
    let catalog = Catalog::from_layers(layers)?;
    tracing::debug!(layers = catalog.len(), files = file_count, "catalog built");
    Ok((catalog, file_count))
}

/// List `source` and build its catalog.
pub fn build_catalog_from(source: &dyn FileSource) -> ForgeResult<(Catalog, usize)> {
    build_catalog(source.entries()?)
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/builder.rs"]
mod tests;
