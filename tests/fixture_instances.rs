use held_karp::{utils::round_to, Problem, TableKind};

const KINDS: [TableKind; 3] = [TableKind::Sparse, TableKind::Dense, TableKind::Auto];

fn fixture(name: &str) -> Problem {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    Problem::from_path(&path).unwrap_or_else(|e| panic!("loading {path}: {e}"))
}

fn assert_rounded(name: &str, places: u32, expected: f64) {
    let problem = fixture(name);
    for kind in KINDS {
        let cost = problem.solve_with(kind).unwrap();
        assert_eq!(
            round_to(cost, places),
            expected,
            "{name} with {kind} tables: raw cost {cost}"
        );
    }
}

#[test]
fn four_city_square() {
    let problem = fixture("tsp4.txt");
    assert_eq!(problem.city_count, 4);
    for kind in KINDS {
        assert_eq!(problem.solve_with(kind).unwrap(), 4.0);
    }
}

#[test]
fn five_cities() {
    assert_rounded("tsp5.txt", 4, 10.4721);
}

#[test]
fn six_cities() {
    assert_rounded("tsp6.txt", 5, 6.17986);
}

#[test]
fn six_clustered_cities() {
    assert_rounded("tsp6_clustered.txt", 5, 5.56971);
}

#[test]
fn nine_cities() {
    assert_rounded("tsp9.txt", 1, 26714.9);
}

#[test]
fn nine_spread_cities() {
    assert_rounded("tsp9_spread.txt", 1, 33263.4);
}

#[test]
fn scaling_coordinates_scales_the_cost() {
    // tsp6 is tsp6_clustered stretched about the origin
    let clustered = fixture("tsp6_clustered.txt").solve().unwrap();
    let stretched = fixture("tsp6.txt").solve().unwrap();
    let ratio = stretched / clustered;
    assert!((ratio - 6.17986 / 5.56971).abs() < 1e-5, "ratio {ratio}");
}

#[test]
fn twelve_cities() {
    assert_rounded("tsp12.txt", 3, 290.263);
}
