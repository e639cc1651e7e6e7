use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::model::Catalog;
use crate::encode::archive::{
    ArchiveSink, METADATA_FILE, OutputBundle, TRAITS_FILE, image_entry_name,
};
use crate::encode::png::encode_png;
use crate::encode::traits_csv::TraitTable;
use crate::foundation::core::GenerateParams;
use crate::foundation::error::{ForgeError, ForgeResult};
use crate::generate::sampler::{Combination, CombinationSampler};
use crate::render::compositor::{Compositor, Raster};

/// Upper bound on items reserved up front; larger runs grow the list as they go.
const ITEM_PREALLOC_CAP: u32 = 1024;

/// One `(layer, trait)` pair of a generated item.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TraitRef {
    /// Layer name.
    pub layer: String,
    /// Trait label: the variant's file name up to its first `.`.
    #[serde(rename = "trait")]
    pub trait_name: String,
}

/// Metadata for one accepted combination. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneratedItem {
    /// 1-based acceptance position.
    pub index: u32,
    /// Display name, `"<prefix> #<index>"`.
    pub name: String,
    /// One entry per catalog layer, in catalog order.
    pub traits: Vec<TraitRef>,
}

impl GeneratedItem {
    fn from_combination(index: u32, prefix: &str, catalog: &Catalog, combo: &Combination) -> Self {
        let traits = catalog
            .layers()
            .iter()
            .zip(combo.picks())
            .map(|(layer, &v)| TraitRef {
                layer: layer.name.clone(),
                trait_name: layer.variants[v].trait_label().to_string(),
            })
            .collect();
        Self {
            index,
            name: format!("{prefix} #{index}"),
            traits,
        }
    }
}

/// Preview and progress surface. Purely cosmetic; both hooks default to no-ops.
pub trait GenerationObserver {
    /// Called after each item is rendered and stored, in acceptance order.
    fn item_generated(&mut self, _item: &GeneratedItem, _raster: &Raster) {}

    /// Called after each pacing batch with the running and target counts.
    fn batch_finished(&mut self, _generated: u32, _total: u32) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}

/// Everything one generation run produced.
#[derive(Clone, Debug)]
pub struct GenerationRun {
    /// Items in acceptance order; `items[i].index == i + 1`.
    pub items: Vec<GeneratedItem>,
    /// Trait table over `items`.
    pub table: TraitTable,
    /// Images, `traits.csv` and, if requested, `metadata.json`.
    pub bundle: OutputBundle,
}

/// Generate `params.total_count` unique artworks from `catalog`.
///
/// The RNG is seeded from `params.seed` when set, otherwise from OS entropy.
pub fn generate(
    catalog: &Catalog,
    params: &GenerateParams,
    compositor: &mut dyn Compositor,
    observer: &mut dyn GenerationObserver,
) -> ForgeResult<GenerationRun> {
    let rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_with_rng(catalog, params, rng, compositor, observer)
}

/// [`generate`] with a caller-supplied RNG.
///
/// Combinations are drawn, rendered and stored strictly one at a time, in acceptance order.
/// Validation and capacity failures happen before anything is rendered. A decode failure aborts
/// the run.
#[tracing::instrument(
    skip_all,
    fields(total = params.total_count, batch = params.batch_size, size = params.image_size)
)]
pub fn generate_with_rng<R: Rng>(
    catalog: &Catalog,
    params: &GenerateParams,
    rng: R,
    compositor: &mut dyn Compositor,
    observer: &mut dyn GenerationObserver,
) -> ForgeResult<GenerationRun> {
    params.validate()?;
    let mut sampler =
        CombinationSampler::new(catalog, params.total_count, params.max_attempts_per_slot, rng)?;
    compositor.begin_run(params.image_size)?;

    let total = params.total_count;
    let mut items = Vec::with_capacity(total.min(ITEM_PREALLOC_CAP) as usize);
    let mut bundle = OutputBundle::new();
    let mut count = 0u32;

    while count < total {
        let batch = params.batch_size.min(total - count);
        for _ in 0..batch {
            let combo = sampler.next_unique()?;
            let index = count + 1;
            tracing::debug!(
                index,
                key = %combo.key(catalog),
                attempts = sampler.last_attempts(),
                "combination accepted"
            );

            let raster = compositor.compose(&combo.stack(catalog), params.image_size)?;
            bundle.add_file(&image_entry_name(index), encode_png(&raster)?)?;

            let item =
                GeneratedItem::from_combination(index, &params.item_name_prefix, catalog, &combo);
            observer.item_generated(&item, &raster);
            items.push(item);
            count += 1;
        }
        tracing::debug!(generated = count, total, "batch finished");
        observer.batch_finished(count, total);
    }

    let table = TraitTable::build(catalog, &items);
    bundle.add_file(TRAITS_FILE, table.to_csv().into_bytes())?;
    if params.write_metadata {
        let json = serde_json::to_vec_pretty(&items)
            .map_err(|e| ForgeError::encode(format!("serialize metadata: {e}")))?;
        bundle.add_file(METADATA_FILE, json)?;
    }

    tracing::info!(items = items.len(), entries = bundle.len(), "generation finished");
    Ok(GenerationRun {
        items,
        table,
        bundle,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/generate/generator.rs"]
mod tests;
