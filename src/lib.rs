//! traitforge composes layered artwork from folders of trait images.
//!
//! Each folder of an upload is a *layer* (a trait category) and each image inside it a
//! *variant*. A generation run picks one variant per layer at random, rejects combinations it
//! has already produced, stacks the chosen images into a square PNG and records which traits went
//! into it. The run ends with a bundle of `images/<n>.png` files plus a `traits.csv` table,
//! exportable as a single zip archive.
//!
//! # Pipeline overview
//!
//! 1. **Catalog**: `FileSource -> Catalog` ([`build_catalog`]): group files by parent folder,
//!    sort layers by name.
//! 2. **Sample**: `Catalog -> Combination` ([`CombinationSampler`]): bounded rejection sampling;
//!    asking for more items than distinct combinations fails up front.
//! 3. **Render**: `Combination -> Raster` ([`Compositor`]): decode, stretch, stack bottom to top.
//! 4. **Encode**: `Raster -> PNG`, items -> [`TraitTable`], everything -> [`OutputBundle`] -> zip.
//!
//! [`Session`] ties the steps together for callers that upload once and generate repeatedly.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Serial runs**: one combination is fully decoded, drawn and stored before the next is drawn.
//! - **Reproducible on request**: a fixed seed yields the same items, images and table.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod catalog;
mod encode;
mod foundation;
mod generate;
mod render;
mod session;

pub use assets::decode::{PreparedImage, decode_image, decode_image_stretched};
pub use catalog::builder::{build_catalog, build_catalog_from};
pub use catalog::model::{Catalog, CatalogSummary, Layer, VariantData, VariantSource, trait_label};
pub use catalog::source::{DirSource, FileEntry, FileSource, MemorySource, split_layer_path};
pub use encode::archive::{
    ArchiveSink, BundleEntry, DEFAULT_ARCHIVE_NAME, IMAGES_DIR, METADATA_FILE, OutputBundle,
    TRAITS_FILE, ensure_parent_dir, image_entry_name,
};
pub use encode::png::{IMAGE_EXT, encode_png};
pub use encode::traits_csv::{TraitTable, escape_field};
pub use foundation::core::{
    DEFAULT_ITEM_NAME_PREFIX, DEFAULT_MAX_ATTEMPTS_PER_SLOT, GenerateConfig, GenerateParams,
    MAX_IMAGE_SIZE, ResizeFilter,
};
pub use foundation::error::{ForgeError, ForgeResult};
pub use generate::generator::{
    GeneratedItem, GenerationObserver, GenerationRun, NoopObserver, TraitRef, generate,
    generate_with_rng,
};
pub use generate::sampler::{Combination, CombinationSampler, ENUMERATION_LIMIT};
pub use render::composite::{
    PremulRgba8, over, over_in_place, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place,
};
pub use render::compositor::{
    Compositor, DEFAULT_CACHE_BUDGET_BYTES, Raster, RasterCompositor, StackEntry,
};
pub use session::Session;
