//! Assorted numeric helpers.

/// Binomial coefficient `C(n, k)`, zero when `k > n`.
///
/// Multiplies and divides alternately so intermediate values stay exact for
/// every count this crate deals with.
#[inline]
pub fn choose(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc = 1u64;
    for t in 1..=k {
        acc = acc * (n - k + t) / t;
    }
    acc
}

/// Round `value` half away from zero to `places` decimal places.
#[inline]
pub fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::{choose, round_to};

    #[test]
    fn choose_edge_cases() {
        assert_eq!(choose(0, 0), 1);
        assert_eq!(choose(5, 0), 1);
        assert_eq!(choose(5, 5), 1);
        assert_eq!(choose(3, 4), 0);
    }

    #[test]
    fn choose_known_values() {
        assert_eq!(choose(4, 2), 6);
        assert_eq!(choose(9, 3), 84);
        assert_eq!(choose(31, 15), 300_540_195);
        assert_eq!(choose(60, 30), 118_264_581_564_861_424);
    }

    #[test]
    fn choose_rows_sum_to_powers_of_two() {
        for n in 0..=20u64 {
            let total: u64 = (0..=n).map(|k| choose(n, k)).sum();
            assert_eq!(total, 1 << n, "row {n}");
        }
    }

    #[test]
    fn rounding_matches_fixture_precision() {
        assert_eq!(round_to(10.472_135_954_999_58, 4), 10.4721);
        assert_eq!(round_to(33_263.352_889, 1), 33_263.4);
        assert_eq!(round_to(4.0, 0), 4.0);
    }
}
