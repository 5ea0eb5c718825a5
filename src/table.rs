//! Generation table implementations.
//!
//! - [`SparseTable`]: hash map from packed key to cost. Small generations.
//! - [`DenseTable`]: flat `2^n × n` array indexed by `(subset, destination)`.
//!   No hashing, but pays for every slot up front.
//! - [`Table`]: the per-generation choice between the two, driven by
//!   [`TableKind`].

use std::fmt;
use std::mem::size_of;
use std::str::FromStr;

use fxhash::FxHashMap;
use sysinfo::System;

use crate::subset::{full_subset, DpKey, MAX_CITIES};
use crate::traits::GenerationTable;
use crate::utils::choose;
use crate::{Error, Result};

/// Largest dense table [`TableKind::Auto`] will allocate.
pub const AUTO_DENSE_BUDGET_BYTES: usize = 64 << 20;

/// [`TableKind::Auto`] goes dense once at least one slot in this many is
/// expected to be filled.
pub const AUTO_DENSE_MIN_FILL: usize = 64;

/// Storage strategy for generation tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TableKind {
    Sparse,
    Dense,
    /// Dense for well-populated generations that fit the dense budget,
    /// sparse otherwise.
    #[default]
    Auto,
}

impl TableKind {
    /// Concrete kind for the generation of subset size `size`. Never `Auto`.
    pub fn resolve(self, city_count: usize, size: usize) -> TableKind {
        match self {
            TableKind::Sparse | TableKind::Dense => self,
            TableKind::Auto => {
                let Some(slots) = dense_slots(city_count) else {
                    return TableKind::Sparse;
                };
                let fits = slots.saturating_mul(size_of::<f64>()) <= AUTO_DENSE_BUDGET_BYTES;
                let populated =
                    expected_entries(city_count, size).saturating_mul(AUTO_DENSE_MIN_FILL) >= slots;
                if size > 1 && fits && populated {
                    TableKind::Dense
                } else {
                    TableKind::Sparse
                }
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Sparse => "sparse",
            TableKind::Dense => "dense",
            TableKind::Auto => "auto",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "sparse" => Ok(TableKind::Sparse),
            "dense" => Ok(TableKind::Dense),
            "auto" => Ok(TableKind::Auto),
            other => Err(Error::invalid_argument(format!(
                "unknown table kind '{other}' (expected sparse, dense or auto)"
            ))),
        }
    }
}

/// Number of `(subset, destination)` states in the generation of subset
/// size `size`: every subset containing city 0, times every non-zero member.
/// The base generation holds exactly one state.
pub fn expected_entries(city_count: usize, size: usize) -> usize {
    if city_count == 0 || size == 0 || size > city_count {
        return 0;
    }
    if size == 1 {
        return 1;
    }
    let subsets = choose(city_count as u64 - 1, size as u64 - 1);
    usize::try_from(subsets)
        .unwrap_or(usize::MAX)
        .saturating_mul(size - 1)
}

/// Whether `key` was packed for a problem of `city_count` cities.
#[inline(always)]
fn owns_key(key: DpKey, city_count: usize) -> bool {
    let tag = key >> city_count;
    tag != 0 && tag <= city_count as u64
}

fn dense_slots(city_count: usize) -> Option<usize> {
    1usize
        .checked_shl(u32::try_from(city_count).ok()?)?
        .checked_mul(city_count)
}

#[derive(Clone, Debug)]
pub struct SparseTable {
    city_count: usize,
    costs: FxHashMap<DpKey, f64>,
}

impl SparseTable {
    pub fn new(city_count: usize) -> Self {
        Self {
            city_count,
            costs: FxHashMap::default(),
        }
    }

    /// Reserve room for `capacity` entries up front.
    ///
    /// Fails with [`Error::ResourceExhausted`] when the allocation is refused.
    pub fn with_capacity(city_count: usize, capacity: usize) -> Result<Self> {
        let mut costs = FxHashMap::default();
        costs.try_reserve(capacity).map_err(|e| {
            Error::resource_exhausted(format!(
                "sparse table for {capacity} entries ({city_count} cities): {e}"
            ))
        })?;
        Ok(Self { city_count, costs })
    }

    pub fn city_count(&self) -> usize {
        self.city_count
    }
}

impl GenerationTable for SparseTable {
    #[inline]
    fn get(&self, key: DpKey) -> f64 {
        self.costs.get(&key).copied().unwrap_or(f64::INFINITY)
    }

    #[inline]
    fn set(&mut self, key: DpKey, cost: f64) {
        if !owns_key(key, self.city_count) {
            return;
        }
        // Absent already means +inf.
        if cost.is_finite() {
            self.costs.insert(key, cost);
        } else {
            self.costs.remove(&key);
        }
    }

    fn len(&self) -> usize {
        self.costs.len()
    }

    fn heap_bytes(&self) -> usize {
        // hashbrown stores one control byte per bucket next to the pair
        self.costs.capacity() * (size_of::<(DpKey, f64)>() + 1)
    }
}

#[derive(Clone, Debug)]
pub struct DenseTable {
    city_count: usize,
    costs: Vec<f64>,
    filled: usize,
}

impl DenseTable {
    /// Allocate all `2^n × n` slots, each initialised to `+∞`.
    ///
    /// Fails with [`Error::InvalidArgument`] past [`MAX_CITIES`] and with
    /// [`Error::ResourceExhausted`] when the slots cannot be allocated or
    /// would not fit in physical memory.
    pub fn new(city_count: usize) -> Result<Self> {
        if city_count > MAX_CITIES {
            return Err(Error::invalid_argument(format!(
                "city count {city_count} exceeds the supported maximum of {MAX_CITIES}"
            )));
        }
        let slots = dense_slots(city_count).ok_or_else(|| {
            Error::resource_exhausted(format!(
                "dense table for {city_count} cities overflows the address space"
            ))
        })?;
        let bytes = slots.saturating_mul(size_of::<f64>());
        if bytes > AUTO_DENSE_BUDGET_BYTES {
            let mut sys = System::new();
            sys.refresh_memory();
            let total = sys.total_memory();
            if total > 0 && bytes as u64 > total {
                return Err(Error::resource_exhausted(format!(
                    "dense table of {bytes} bytes ({city_count} cities) \
                     exceeds {total} bytes of memory"
                )));
            }
        }
        let mut costs = Vec::new();
        costs.try_reserve_exact(slots).map_err(|e| {
            Error::resource_exhausted(format!(
                "dense table of {slots} slots ({city_count} cities): {e}"
            ))
        })?;
        costs.resize(slots, f64::INFINITY);
        Ok(Self {
            city_count,
            costs,
            filled: 0,
        })
    }

    pub fn city_count(&self) -> usize {
        self.city_count
    }

    #[inline(always)]
    fn slot(&self, key: DpKey) -> Option<usize> {
        let n = self.city_count;
        if !owns_key(key, n) {
            return None;
        }
        let subset = (key & full_subset(n)) as usize;
        Some(subset * n + ((key >> n) - 1) as usize)
    }
}

impl GenerationTable for DenseTable {
    #[inline]
    fn get(&self, key: DpKey) -> f64 {
        self.slot(key)
            .map_or(f64::INFINITY, |slot| self.costs[slot])
    }

    #[inline]
    fn set(&mut self, key: DpKey, cost: f64) {
        let Some(slot) = self.slot(key) else {
            return;
        };
        let cell = &mut self.costs[slot];
        match (cell.is_finite(), cost.is_finite()) {
            (false, true) => self.filled += 1,
            (true, false) => self.filled -= 1,
            _ => {}
        }
        *cell = if cost.is_finite() { cost } else { f64::INFINITY };
    }

    fn len(&self) -> usize {
        self.filled
    }

    fn heap_bytes(&self) -> usize {
        self.costs.capacity() * size_of::<f64>()
    }
}

/// One generation, stored either way.
#[derive(Clone, Debug)]
pub enum Table {
    Sparse(SparseTable),
    Dense(DenseTable),
}

impl Table {
    /// Empty table for the generation of subset size `size`, laid out as
    /// `kind` resolves to for that generation.
    pub fn for_generation(kind: TableKind, city_count: usize, size: usize) -> Result<Self> {
        match kind.resolve(city_count, size) {
            TableKind::Dense => DenseTable::new(city_count).map(Table::Dense),
            _ => SparseTable::with_capacity(city_count, expected_entries(city_count, size))
                .map(Table::Sparse),
        }
    }

    pub fn kind(&self) -> TableKind {
        match self {
            Table::Sparse(_) => TableKind::Sparse,
            Table::Dense(_) => TableKind::Dense,
        }
    }
}

impl GenerationTable for Table {
    #[inline]
    fn get(&self, key: DpKey) -> f64 {
        match self {
            Table::Sparse(t) => t.get(key),
            Table::Dense(t) => t.get(key),
        }
    }

    #[inline]
    fn set(&mut self, key: DpKey, cost: f64) {
        match self {
            Table::Sparse(t) => t.set(key, cost),
            Table::Dense(t) => t.set(key, cost),
        }
    }

    fn len(&self) -> usize {
        match self {
            Table::Sparse(t) => t.len(),
            Table::Dense(t) => t.len(),
        }
    }

    fn heap_bytes(&self) -> usize {
        match self {
            Table::Sparse(t) => t.heap_bytes(),
            Table::Dense(t) => t.heap_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subset::pack_key;

    fn both(city_count: usize) -> Vec<Table> {
        vec![
            Table::Sparse(SparseTable::new(city_count)),
            Table::Dense(DenseTable::new(city_count).unwrap()),
        ]
    }

    #[test]
    fn absent_keys_read_as_infinity() {
        for table in both(4) {
            let key = pack_key(0b0111, 2, 4).unwrap();
            assert_eq!(table.get(key), f64::INFINITY);
            assert!(table.is_empty());
        }
    }

    #[test]
    fn set_get_and_overwrite() {
        for mut table in both(4) {
            let a = pack_key(0b0011, 1, 4).unwrap();
            let b = pack_key(0b0101, 2, 4).unwrap();
            table.set(a, 2.5);
            table.set(b, 1.0);
            assert_eq!(table.get(a), 2.5);
            assert_eq!(table.get(b), 1.0);
            assert_eq!(table.len(), 2);
            table.set(a, 0.5);
            assert_eq!(table.get(a), 0.5);
            assert_eq!(table.len(), 2);
        }
    }

    #[test]
    fn storing_infinity_is_the_same_as_absent() {
        for mut table in both(3) {
            let a = pack_key(0b011, 1, 3).unwrap();
            table.set(a, f64::INFINITY);
            assert_eq!(table.len(), 0);
            table.set(a, 3.0);
            assert_eq!(table.len(), 1);
            table.set(a, f64::INFINITY);
            assert_eq!(table.len(), 0);
            assert_eq!(table.get(a), f64::INFINITY);
        }
    }

    #[test]
    fn dense_ignores_foreign_keys_on_read() {
        let table = DenseTable::new(3).unwrap();
        assert_eq!(table.get(0b111), f64::INFINITY);
        assert_eq!(table.get(7 << 3), f64::INFINITY);
    }

    #[test]
    fn dense_allocates_every_slot() {
        let table = DenseTable::new(5).unwrap();
        assert!(table.heap_bytes() >= 32 * 5 * size_of::<f64>());
        assert_eq!(table.city_count(), 5);
    }

    #[test]
    fn dense_rejects_too_many_cities() {
        assert!(matches!(
            DenseTable::new(MAX_CITIES + 1),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn foreign_keys_are_ignored() {
        for mut table in both(3) {
            // packed for 4 cities: destination tag 4 is out of range for 3
            let foreign = pack_key(0b0111, 3, 4).unwrap();
            table.set(foreign, 1.0);
            table.set(0b111, 1.0);
            assert!(table.is_empty());
            assert_eq!(table.get(0b111), f64::INFINITY);
        }
    }

    #[test]
    fn sparse_reports_refused_reservations() {
        assert!(matches!(
            SparseTable::with_capacity(4, usize::MAX),
            Err(Error::ResourceExhausted(_))
        ));
        assert!(matches!(
            Table::for_generation(TableKind::Sparse, 4, 2),
            Ok(Table::Sparse(_))
        ));
    }

    #[test]
    fn dense_refuses_tables_larger_than_memory() {
        // 2^32 × 32 slots of 8 bytes: 1 TiB
        assert!(matches!(
            Table::for_generation(TableKind::Dense, MAX_CITIES, 2),
            Err(Error::ResourceExhausted(_))
        ));
    }

    #[test]
    fn expected_entries_counts_states() {
        assert_eq!(expected_entries(5, 1), 1);
        assert_eq!(expected_entries(5, 2), 4);
        assert_eq!(expected_entries(5, 3), 12);
        assert_eq!(expected_entries(5, 5), 4);
        assert_eq!(expected_entries(5, 6), 0);
    }

    #[test]
    fn auto_switches_with_population() {
        assert_eq!(TableKind::Auto.resolve(12, 1), TableKind::Sparse);
        assert_eq!(TableKind::Auto.resolve(12, 2), TableKind::Sparse);
        assert_eq!(TableKind::Auto.resolve(12, 6), TableKind::Dense);
        assert_eq!(TableKind::Auto.resolve(12, 12), TableKind::Sparse);
        // over budget: 2^25 * 25 * 8 bytes
        assert_eq!(TableKind::Auto.resolve(25, 13), TableKind::Sparse);
        assert_eq!(TableKind::Dense.resolve(12, 2), TableKind::Dense);
        assert_eq!(TableKind::Sparse.resolve(12, 6), TableKind::Sparse);
    }

    #[test]
    fn for_generation_honours_kind() {
        assert_eq!(
            Table::for_generation(TableKind::Dense, 4, 2).unwrap().kind(),
            TableKind::Dense
        );
        assert_eq!(
            Table::for_generation(TableKind::Sparse, 4, 3).unwrap().kind(),
            TableKind::Sparse
        );
    }

    #[test]
    fn kind_parses_and_displays() {
        for kind in [TableKind::Sparse, TableKind::Dense, TableKind::Auto] {
            assert_eq!(kind.to_string().parse::<TableKind>().unwrap(), kind);
        }
        assert!("hash".parse::<TableKind>().is_err());
    }
}
