use std::borrow::Borrow;
use std::collections::HashSet;

use rand::Rng;

use crate::catalog::model::Catalog;
use crate::foundation::error::{ForgeError, ForgeResult};
use crate::render::compositor::StackEntry;

/// Largest combination space the sampler scans in full, for a uniform pick, once random draws
/// run out.
pub const ENUMERATION_LIMIT: u128 = 1 << 20;

/// One chosen variant index per layer, in catalog order.
///
/// Two combinations are the same iff their pick tuples match. Variant names are unique within a
/// layer, so this is equivalent to comparing the ordered tuple of variant names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Combination {
    picks: Vec<usize>,
}

impl Combination {
    /// Combination from explicit per-layer variant indices.
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks }
    }

    /// Variant index per layer.
    pub fn picks(&self) -> &[usize] {
        &self.picks
    }

    /// Identity key: chosen variant names joined by `|`.
    pub fn key(&self, catalog: &Catalog) -> String {
        catalog
            .layers()
            .iter()
            .zip(&self.picks)
            .map(|(layer, &i)| layer.variants[i].name.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Stack entries for the compositor, bottom layer first.
    pub fn stack<'c>(&self, catalog: &'c Catalog) -> Vec<StackEntry<'c>> {
        catalog
            .layers()
            .iter()
            .zip(&self.picks)
            .enumerate()
            .map(|(layer_idx, (layer, &variant))| StackEntry {
                layer: layer_idx,
                variant,
                source: &layer.variants[variant],
            })
            .collect()
    }
}

impl Borrow<[usize]> for Combination {
    fn borrow(&self) -> &[usize] {
        &self.picks
    }
}

/// Rejection sampler handing out combinations never seen before in this run.
///
/// Every attempt draws one variant per layer, uniformly and with replacement, independent of the
/// other layers and of earlier attempts. Duplicates are discarded and redrawn, at most
/// `max_attempts` times per slot. After that the slot is filled deterministically: spaces up to
/// [`ENUMERATION_LIMIT`] pick uniformly among all unused combinations, larger spaces continue an
/// odometer walk from a random starting point to the next unused combination. A slot only fails
/// once every combination has been handed out.
pub struct CombinationSampler<'c, R> {
    catalog: &'c Catalog,
    rng: R,
    radices: Vec<usize>,
    seen: HashSet<Combination>,
    max_attempts: u64,
    space: u128,
    last_attempts: u64,
    scan: Option<Scan>,
    fell_back: bool,
}

/// Position of the odometer walk. Every combination behind the cursor is already used, so the
/// walk covers the space at most once per run.
struct Scan {
    cursor: Vec<usize>,
    remaining: u128,
}

impl<'c, R: Rng> CombinationSampler<'c, R> {
    /// Prepare a sampler for `requested` unique items.
    ///
    /// Fails with a validation error for an unusable catalog and with a capacity error when
    /// `requested` exceeds the number of distinct combinations.
    pub fn new(
        catalog: &'c Catalog,
        requested: u32,
        max_attempts: u64,
        rng: R,
    ) -> ForgeResult<Self> {
        catalog.validate()?;
        if max_attempts == 0 {
            return Err(ForgeError::validation("max attempts per slot must be > 0"));
        }

        let radices: Vec<usize> = catalog.layers().iter().map(|l| l.variants.len()).collect();
        let space = catalog.combination_space();
        if u128::from(requested) > space {
            let counts = radices
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" x ");
            return Err(ForgeError::capacity(
                u64::from(requested),
                format!("the catalog only has {space} distinct combinations ({counts})"),
            ));
        }

        Ok(Self {
            catalog,
            rng,
            radices,
            seen: HashSet::new(),
            max_attempts,
            space,
            last_attempts: 0,
            scan: None,
            fell_back: false,
        })
    }

    /// Catalog the combinations index into.
    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Number of distinct combinations the catalog allows.
    pub fn space(&self) -> u128 {
        self.space
    }

    /// Combinations handed out so far.
    pub fn accepted(&self) -> usize {
        self.seen.len()
    }

    /// Random draws used by the most recent [`CombinationSampler::next_unique`] call.
    pub fn last_attempts(&self) -> u64 {
        self.last_attempts
    }

    /// Draw the next combination not yet produced in this run.
    pub fn next_unique(&mut self) -> ForgeResult<Combination> {
        if self.seen.len() as u128 >= self.space {
            return Err(self.exhausted());
        }

        for attempt in 1..=self.max_attempts {
            let combo = self.draw();
            if self.seen.insert(combo.clone()) {
                self.last_attempts = attempt;
                return Ok(combo);
            }
        }
        self.last_attempts = self.max_attempts;

        if self.fell_back {
            tracing::debug!(used = self.seen.len(), "random draws exhausted");
        } else {
            self.fell_back = true;
            tracing::warn!(
                attempts = self.max_attempts,
                used = self.seen.len(),
                space = %self.space,
                "random draws exhausted; scanning remaining combinations"
            );
        }

        let combo = if self.space <= ENUMERATION_LIMIT {
            self.pick_unused()
        } else {
            self.walk_to_unused()
        };
        let combo = combo.ok_or_else(|| self.exhausted())?;
        self.seen.insert(combo.clone());
        Ok(combo)
    }

    fn exhausted(&self) -> ForgeError {
        ForgeError::capacity(
            self.seen.len() as u64 + 1,
            format!("all {} combinations are already used", self.space),
        )
    }

    fn draw(&mut self) -> Combination {
        let picks = self
            .radices
            .iter()
            .map(|&radix| self.rng.gen_range(0..radix))
            .collect();
        Combination { picks }
    }

    /// Uniform pick among unused combinations via reservoir sampling over the whole space.
    fn pick_unused(&mut self) -> Option<Combination> {
        let mut cursor = vec![0usize; self.radices.len()];
        let mut chosen = None;
        let mut unused = 0u64;
        for _ in 0..self.space {
            if !self.seen.contains(cursor.as_slice()) {
                unused += 1;
                if self.rng.gen_range(0..unused) == 0 {
                    chosen = Some(cursor.clone());
                }
            }
            advance_odometer(&mut cursor, &self.radices);
        }
        chosen.map(Combination::new)
    }

    /// Next unused combination along the odometer walk, started at a random point on first use.
    fn walk_to_unused(&mut self) -> Option<Combination> {
        if self.scan.is_none() {
            let start = self.draw();
            self.scan = Some(Scan {
                cursor: start.picks,
                remaining: self.space,
            });
        }
        let scan = self.scan.as_mut()?;
        while scan.remaining > 0 {
            scan.remaining -= 1;
            let found = !self.seen.contains(scan.cursor.as_slice());
            let picks = found.then(|| scan.cursor.clone());
            advance_odometer(&mut scan.cursor, &self.radices);
            if let Some(picks) = picks {
                return Some(Combination::new(picks));
            }
        }
        None
    }
}

/// Step `cursor` to the next combination, last layer fastest, wrapping to all zeros.
fn advance_odometer(cursor: &mut [usize], radices: &[usize]) {
    for (slot, &radix) in cursor.iter_mut().zip(radices).rev() {
        *slot += 1;
        if *slot < radix {
            return;
        }
        *slot = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/sampler.rs"]
mod tests;
