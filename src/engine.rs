//! Held-Karp engine.
//!
//! The DP state is `(S, j)`: the cheapest path that starts at city 0, visits
//! exactly the cities of `S` and ends at `j`. States of subset size `m` depend
//! only on states of size `m - 1`, so the engine keeps two generations alive:
//! 1. the previous generation (size `m - 1`), read-only, and
//! 2. the current generation (size `m`), written once per state.
//!
//! Once the current generation is complete it replaces the previous one and
//! the old table is dropped, bounding peak memory by two layers of the state
//! space instead of all `n` of them.

use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::city::{City, DistanceMatrix};
use crate::observer::{GenerationStats, NoopObserver};
use crate::subset::{self, DpKey, Subset, MAX_CITIES};
use crate::table::{SparseTable, Table, TableKind};
use crate::traits::{GenerationObserver, GenerationTable};
use crate::utils::choose;
use crate::{Error, Result};

/// Optimal tour cost over `cities`, starting and ending at city 0.
///
/// `city_count` must equal `cities.len()` and lie in `1..=MAX_CITIES`. A
/// single city has the empty tour, cost `0.0`.
///
/// ```
/// use held_karp::{solve, City};
///
/// let cities = [City::new(0.0, 0.0), City::new(3.0, 4.0)];
/// assert_eq!(solve(&cities, 2).unwrap(), 10.0);
/// ```
pub fn solve(cities: &[City], city_count: usize) -> Result<f64> {
    HeldKarp::new(cities, city_count)?.run(&mut NoopObserver)
}

/// Held-Karp solver for one problem instance.
///
/// Typical usage:
/// ```
/// use held_karp::{City, HeldKarp, TableKind};
///
/// let cities: Vec<City> = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]
///     .into_iter()
///     .map(City::from)
///     .collect();
/// let engine = HeldKarp::new(&cities, cities.len())
///     .unwrap()
///     .with_table_kind(TableKind::Dense);
/// let mut generations = 0;
/// let cost = engine.run(&mut |_: &held_karp::GenerationStats| generations += 1).unwrap();
/// assert_eq!(cost, 4.0);
/// assert_eq!(generations, 3);
/// ```
#[derive(Clone, Debug)]
pub struct HeldKarp {
    distances: DistanceMatrix,
    table_kind: TableKind,
}

impl HeldKarp {
    /// Validate the instance and build its distance matrix.
    pub fn new(cities: &[City], city_count: usize) -> Result<Self> {
        if city_count < 1 {
            return Err(Error::invalid_argument("a tour needs at least one city"));
        }
        if city_count != cities.len() {
            return Err(Error::invalid_argument(format!(
                "city count {city_count} does not match the {} cities given",
                cities.len()
            )));
        }
        if city_count > MAX_CITIES {
            return Err(Error::invalid_argument(format!(
                "city count {city_count} exceeds the supported maximum of {MAX_CITIES}"
            )));
        }
        if let Some((idx, city)) = cities
            .iter()
            .enumerate()
            .find(|(_, c)| !(c.x().is_finite() && c.y().is_finite()))
        {
            return Err(Error::invalid_argument(format!(
                "city {idx} has non-finite coordinates ({}, {})",
                city.x(),
                city.y()
            )));
        }
        Ok(Self {
            distances: DistanceMatrix::new(cities),
            table_kind: TableKind::default(),
        })
    }

    pub fn with_table_kind(mut self, table_kind: TableKind) -> Self {
        self.table_kind = table_kind;
        self
    }

    pub fn table_kind(&self) -> TableKind {
        self.table_kind
    }

    pub fn city_count(&self) -> usize {
        self.distances.len()
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Generation of size 1: the path that has only visited city 0 and
    /// stands there, at cost zero. Every other state is unreachable.
    pub fn base_generation(&self) -> Result<Table> {
        let n = self.city_count();
        let mut base = match self.table_kind {
            TableKind::Dense => Table::for_generation(TableKind::Dense, n, 1)?,
            _ => Table::Sparse(SparseTable::with_capacity(n, 1)?),
        };
        base.set(subset::key(1, 0, n), 0.0);
        Ok(base)
    }

    /// Build the generation of subset size `size` from `previous`, the
    /// generation of size `size - 1`.
    ///
    /// For every subset `S` of `size` cities containing city 0 and every
    /// `j ∈ S \ {0}`:
    /// `cost(S, j) = min_{k ∈ S \ {j}} previous(S \ {j}, k) + d(k, j)`.
    /// States missing from `previous` are unreachable and drop out of the
    /// minimum.
    pub fn next_generation<T>(&self, previous: &T, size: usize) -> Result<Table>
    where
        T: GenerationTable + Sync + ?Sized,
    {
        let n = self.city_count();
        if size < 2 || size > n {
            return Err(Error::invalid_argument(format!(
                "generation size {size} must lie in [2, {n}]"
            )));
        }
        let subsets = subset::subsets_containing_zero(n, size)?;
        let mut current = Table::for_generation(self.table_kind, n, size)?;
        fill_generation(self, previous, subsets, size, &mut current)?;
        Ok(current)
    }

    /// Close the tour from the final generation (all cities visited):
    /// `min_{j ≠ 0} cost(F, j) + d(j, 0)`.
    pub fn close_tour<T: GenerationTable + ?Sized>(&self, last: &T) -> f64 {
        let n = self.city_count();
        if n == 1 {
            return 0.0;
        }
        let full = subset::full_subset(n);
        (1..n)
            .map(|j| last.get(subset::key(full, j, n)) + self.distances.get(j, 0))
            .fold(f64::INFINITY, f64::min)
    }

    /// Run every generation and return the optimal tour cost.
    ///
    /// `observer` hears about each generation boundary; it cannot affect the
    /// result.
    pub fn run<O>(&self, observer: &mut O) -> Result<f64>
    where
        O: GenerationObserver + ?Sized,
    {
        let n = self.city_count();
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!("held_karp_run", city_count = n, table = %self.table_kind);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut previous = self.base_generation()?;
        for size in 2..=n {
            let subsets = choose(n as u64 - 1, size as u64 - 1);
            #[cfg(feature = "tracing")]
            let generation_span = tracing::trace_span!("generation", size, subsets);
            #[cfg(feature = "tracing")]
            let _generation = generation_span.enter();

            let start = Instant::now();
            let current = self.next_generation(&previous, size)?;
            observer.on_generation(&GenerationStats {
                size,
                city_count: n,
                subsets,
                previous_entries: previous.len(),
                current_entries: current.len(),
                previous_bytes: previous.heap_bytes(),
                current_bytes: current.heap_bytes(),
                elapsed: start.elapsed(),
            });
            // drops the older generation
            previous = current;
        }
        Ok(self.close_tour(&previous))
    }

    /// Relax every state `(visited, j)` with `j ≠ 0`, handing each result to
    /// `emit` exactly once.
    #[inline]
    fn relax_subset<T, F>(&self, previous: &T, visited: Subset, mut emit: F)
    where
        T: GenerationTable + ?Sized,
        F: FnMut(DpKey, f64),
    {
        let n = self.city_count();
        for j in subset::bit_indices(visited).filter(|&j| j != 0) {
            let rest = subset::remove(visited, j);
            let mut best = f64::INFINITY;
            for k in subset::bit_indices(rest) {
                let prior = previous.get(subset::key(rest, k, n));
                if prior.is_finite() {
                    let candidate = prior + self.distances.get(k, j);
                    if candidate < best {
                        best = candidate;
                    }
                }
            }
            emit(subset::key(visited, j, n), best);
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn fill_generation<T>(
    engine: &HeldKarp,
    previous: &T,
    subsets: subset::SubsetsWithZero,
    _size: usize,
    current: &mut Table,
) -> Result<()>
where
    T: GenerationTable + Sync + ?Sized,
{
    for s in subsets {
        engine.relax_subset(previous, s, |key, cost| current.set(key, cost));
    }
    Ok(())
}

/// Subsets relaxed per parallel batch. Bounds the scratch buffers that sit
/// next to the two live generations.
#[cfg(feature = "parallel")]
pub(crate) const PARALLEL_BATCH: usize = 1 << 12;

/// States of one generation depend only on the previous generation, so each
/// batch of subsets is relaxed in parallel and written back by a single
/// writer. Every key is produced exactly once.
#[cfg(feature = "parallel")]
fn fill_generation<T>(
    engine: &HeldKarp,
    previous: &T,
    mut subsets: subset::SubsetsWithZero,
    size: usize,
    current: &mut Table,
) -> Result<()>
where
    T: GenerationTable + Sync + ?Sized,
{
    let batch_len = PARALLEL_BATCH.min(subsets.len());
    let mut batch: Vec<Subset> = Vec::new();
    let mut relaxed: Vec<(DpKey, f64)> = Vec::new();
    batch
        .try_reserve_exact(batch_len)
        .and_then(|()| relaxed.try_reserve_exact(batch_len * (size - 1)))
        .map_err(|e| {
            Error::resource_exhausted(format!(
                "parallel scratch for generation {size} ({} cities): {e}",
                engine.city_count()
            ))
        })?;

    loop {
        batch.clear();
        batch.extend(subsets.by_ref().take(batch_len));
        if batch.is_empty() {
            return Ok(());
        }
        relaxed.clear();
        relaxed.par_extend(batch.par_iter().flat_map_iter(|&s| {
            let mut out = Vec::with_capacity(size - 1);
            engine.relax_subset(previous, s, |key, cost| out.push((key, cost)));
            out
        }));
        for &(key, cost) in &relaxed {
            current.set(key, cost);
        }
    }
}
