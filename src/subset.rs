//! Bit-level set operations on city subsets.
//!
//! A [`Subset`] stores city `i` in bit `i`. A [`DpKey`] packs a subset and a
//! destination city into one integer, `subset + ((destination + 1) << n)`,
//! which keeps generation tables keyed by a single machine word.
//!
//! Nothing in this module knows about costs or distances.

use std::iter::FusedIterator;

use crate::utils::choose;
use crate::{Error, Result};

/// A set of city indices, bit `i` set when city `i` is a member.
pub type Subset = u64;

/// A packed `(subset, destination)` pair.
pub type DpKey = u64;

/// Largest supported city count.
///
/// The packed key needs `n` subset bits plus the bits of `n` itself, so 32
/// cities leave ample headroom in a `u64`.
pub const MAX_CITIES: usize = 32;

/// Clear `city` from `subset`. Returns `subset` unchanged when the city is
/// absent or lies beyond the integer width.
///
/// ```
/// use held_karp::subset::remove;
///
/// assert_eq!(remove(0b101, 2), 0b001);
/// assert_eq!(remove(0b1010, 0), 0b1010);
/// ```
#[inline]
pub const fn remove(subset: Subset, city: usize) -> Subset {
    if city >= Subset::BITS as usize {
        subset
    } else {
        subset & !(1 << city)
    }
}

#[inline]
pub const fn contains(subset: Subset, city: usize) -> bool {
    city < Subset::BITS as usize && (subset >> city) & 1 == 1
}

/// The subset holding every one of `n` cities.
#[inline]
pub const fn full_subset(n: usize) -> Subset {
    if n >= Subset::BITS as usize {
        Subset::MAX
    } else {
        (1 << n) - 1
    }
}

/// Ascending indices of the cities in `subset`.
///
/// ```
/// use held_karp::subset::bit_indices;
///
/// assert_eq!(bit_indices(83).collect::<Vec<_>>(), vec![0, 1, 4, 6]);
/// assert_eq!(bit_indices(0).count(), 0);
/// ```
#[inline]
pub fn bit_indices(subset: Subset) -> BitIndices {
    BitIndices { rest: subset }
}

#[derive(Clone, Debug)]
pub struct BitIndices {
    rest: Subset,
}

impl Iterator for BitIndices {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.rest == 0 {
            return None;
        }
        let index = self.rest.trailing_zeros() as usize;
        self.rest &= self.rest - 1;
        Some(index)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.rest.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for BitIndices {}
impl FusedIterator for BitIndices {}

/// All subsets of exactly `size` cities out of `n` that contain city 0.
///
/// The other `size - 1` members are drawn from cities `1..n` by stepping
/// through same-popcount integers (Gosper's hack), so every step produces a
/// valid subset. Callers must not rely on the order.
///
/// Fails with [`Error::InvalidArgument`] unless `1 <= size <= n <= MAX_CITIES`.
///
/// ```
/// use held_karp::subset::subsets_containing_zero;
///
/// let mut subsets: Vec<u64> = subsets_containing_zero(4, 2).unwrap().collect();
/// subsets.sort_unstable();
/// assert_eq!(subsets, vec![3, 5, 9]);
/// ```
pub fn subsets_containing_zero(n: usize, size: usize) -> Result<SubsetsWithZero> {
    if n > MAX_CITIES {
        return Err(Error::invalid_argument(format!(
            "city count {n} exceeds the supported maximum of {MAX_CITIES}"
        )));
    }
    if size < 1 || size > n {
        return Err(Error::invalid_argument(format!(
            "subset size {size} must lie in [1, {n}]"
        )));
    }
    let others = size - 1;
    Ok(SubsetsWithZero {
        current: Some((1 << others) - 1),
        limit: 1 << (n - 1),
        remaining: choose(n as u64 - 1, others as u64) as usize,
    })
}

/// Iterator returned by [`subsets_containing_zero`].
#[derive(Debug)]
pub struct SubsetsWithZero {
    /// Members among cities `1..n`, shifted down by one bit.
    current: Option<Subset>,
    limit: Subset,
    remaining: usize,
}

impl SubsetsWithZero {
    #[inline]
    fn successor(x: Subset, limit: Subset) -> Option<Subset> {
        // The empty combination has no same-popcount successor.
        if x == 0 {
            return None;
        }
        let lowest = x & x.wrapping_neg();
        let ripple = x + lowest;
        let next = (((ripple ^ x) >> 2) / lowest) | ripple;
        (next < limit).then_some(next)
    }
}

impl Iterator for SubsetsWithZero {
    type Item = Subset;

    #[inline]
    fn next(&mut self) -> Option<Subset> {
        let others = self.current?;
        self.current = Self::successor(others, self.limit);
        self.remaining = self.remaining.saturating_sub(1);
        Some((others << 1) | 1)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SubsetsWithZero {}
impl FusedIterator for SubsetsWithZero {}

/// Pack `(subset, destination)` into a [`DpKey`] for a problem of
/// `city_count` cities.
///
/// Fails with [`Error::InvalidArgument`] if `subset` uses a bit at or above
/// `city_count`, if `destination >= city_count`, or if `city_count` exceeds
/// [`MAX_CITIES`]; these checks are what keep the packing injective.
///
/// ```
/// use held_karp::subset::pack_key;
///
/// assert_eq!(pack_key(3, 1, 2).unwrap(), 11);
/// assert_eq!(pack_key(22, 3, 5).unwrap(), 150);
/// assert!(pack_key(4, 0, 2).is_err());
/// ```
pub fn pack_key(subset: Subset, destination: usize, city_count: usize) -> Result<DpKey> {
    if city_count > MAX_CITIES {
        return Err(Error::invalid_argument(format!(
            "city count {city_count} exceeds the supported maximum of {MAX_CITIES}"
        )));
    }
    if subset >> city_count != 0 {
        return Err(Error::invalid_argument(format!(
            "subset {subset:#b} is wider than {city_count} cities"
        )));
    }
    if destination >= city_count {
        return Err(Error::invalid_argument(format!(
            "destination {destination} out of range for {city_count} cities"
        )));
    }
    Ok(key(subset, destination, city_count))
}

/// Inverse of [`pack_key`].
pub fn unpack_key(key: DpKey, city_count: usize) -> Result<(Subset, usize)> {
    if city_count > MAX_CITIES {
        return Err(Error::invalid_argument(format!(
            "city count {city_count} exceeds the supported maximum of {MAX_CITIES}"
        )));
    }
    let tag = key >> city_count;
    if tag == 0 || tag > city_count as u64 {
        return Err(Error::invalid_argument(format!(
            "key {key} does not encode a destination among {city_count} cities"
        )));
    }
    Ok((key & full_subset(city_count), (tag - 1) as usize))
}

/// Unchecked packing for the DP hot loop.
#[inline(always)]
pub(crate) const fn key(subset: Subset, destination: usize, city_count: usize) -> DpKey {
    debug_assert!(subset >> city_count == 0 && destination < city_count);
    subset + (((destination as u64) + 1) << city_count)
}
