//! Cities and the pairwise distance matrix.

/// An immutable point in the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct City {
    x: f64,
    y: f64,
}

impl City {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &City) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for City {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Symmetric `n × n` matrix of distances, stored row-major in one buffer.
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    n: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    pub fn new(cities: &[City]) -> Self {
        let n = cities.len();
        let mut cells = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = cities[i].distance(&cities[j]);
                cells[i * n + j] = d;
                cells[j * n + i] = d;
            }
        }
        Self { n, cells }
    }

    #[inline(always)]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.cells[from * self.n + to]
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}
