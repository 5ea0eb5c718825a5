use held_karp::{solve, City, HeldKarp, NoopObserver, TableKind};
use proptest::prelude::*;

/// Cheapest cycle through every city, trying every order of cities 1..n.
fn brute_force_tour(cities: &[City]) -> f64 {
    fn extend(cities: &[City], last: usize, remaining: &mut Vec<usize>, acc: f64, best: &mut f64) {
        if remaining.is_empty() {
            let total = acc + cities[last].distance(&cities[0]);
            if total < *best {
                *best = total;
            }
            return;
        }
        for i in 0..remaining.len() {
            let next = remaining.swap_remove(i);
            extend(cities, next, remaining, acc + cities[last].distance(&cities[next]), best);
            remaining.push(next);
            let end = remaining.len() - 1;
            remaining.swap(i, end);
        }
    }

    if cities.len() < 2 {
        return 0.0;
    }
    let mut remaining: Vec<usize> = (1..cities.len()).collect();
    let mut best = f64::INFINITY;
    extend(cities, 0, &mut remaining, 0.0, &mut best);
    best
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn city_strategy() -> impl Strategy<Value = City> {
    (-100i32..=100, -100i32..=100).prop_map(|(x, y)| City::new(x as f64 * 0.5, y as f64 * 0.5))
}

fn cities_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<City>> {
    prop::collection::vec(city_strategy(), min..=max)
}

#[test]
fn brute_force_reference_on_square() {
    let square = [
        City::new(0.0, 0.0),
        City::new(1.0, 1.0),
        City::new(0.0, 1.0),
        City::new(1.0, 0.0),
    ];
    assert_eq!(brute_force_tour(&square), 4.0);
}

proptest! {
    #[test]
    fn matches_exhaustive_search(cities in cities_strategy(2, 8)) {
        let expected = brute_force_tour(&cities);
        let actual = solve(&cities, cities.len()).unwrap();
        prop_assert!(close(actual, expected), "held-karp {actual} vs brute force {expected}");
    }

    #[test]
    fn two_cities_cost_twice_the_distance(a in city_strategy(), b in city_strategy()) {
        let cost = solve(&[a, b], 2).unwrap();
        prop_assert!(close(cost, 2.0 * a.distance(&b)));
    }

    #[test]
    fn three_cities_cost_the_perimeter(cities in cities_strategy(3, 3)) {
        let perimeter = cities[0].distance(&cities[1])
            + cities[1].distance(&cities[2])
            + cities[2].distance(&cities[0]);
        let cost = solve(&cities, 3).unwrap();
        prop_assert!(close(cost, perimeter), "{cost} vs {perimeter}");
    }

    #[test]
    fn order_of_other_cities_does_not_matter(
        (cities, shuffled) in cities_strategy(3, 9).prop_flat_map(|cities| {
            let rest = cities[1..].to_vec();
            (Just(cities), Just(rest).prop_shuffle())
        })
    ) {
        let mut permuted = vec![cities[0]];
        permuted.extend(shuffled);
        let a = solve(&cities, cities.len()).unwrap();
        let b = solve(&permuted, permuted.len()).unwrap();
        prop_assert!(close(a, b), "{a} vs {b}");
    }

    #[test]
    fn table_kinds_agree(cities in cities_strategy(2, 9)) {
        let n = cities.len();
        let costs: Vec<f64> = [TableKind::Sparse, TableKind::Dense, TableKind::Auto]
            .into_iter()
            .map(|kind| {
                HeldKarp::new(&cities, n)
                    .unwrap()
                    .with_table_kind(kind)
                    .run(&mut NoopObserver)
                    .unwrap()
            })
            .collect();
        // same recurrence, same summation order
        prop_assert_eq!(costs[0], costs[1]);
        prop_assert_eq!(costs[0], costs[2]);
    }
}
