//! Exact Traveling Salesman tour cost via Held-Karp dynamic programming.
//!
//! This crate computes the minimum-cost Hamiltonian cycle over a small set of
//! 2-D points in O(2^n · n^2) time, instead of the O(n!) of trying every
//! ordering.
//!
//! ## Core idea
//! 1. Encode each visited set of cities as an integer bitmask ([`subset`]).
//! 2. Pack `(visited set, last city)` into one integer key for the tables.
//! 3. Grow paths one city at a time: the generation of subset size `m` is
//!    computed from the generation of size `m - 1` only, so [`HeldKarp`] keeps
//!    just two generations alive at any time.
//! 4. Close the tour by hopping back to city 0 from the cheapest last city.
//!
//! ## Quick start
//! ```
//! use held_karp::{solve, City};
//!
//! let cities = [
//!     City::new(0.0, 0.0),
//!     City::new(0.0, 1.0),
//!     City::new(1.0, 1.0),
//!     City::new(1.0, 0.0),
//! ];
//! let cost = solve(&cities, cities.len()).unwrap();
//! assert_eq!(cost, 4.0);
//! ```
//!
//! ## Storage
//! Generation tables implement [`GenerationTable`]. [`TableKind`] selects a
//! sparse hash map, a dense `2^n × n` array, or a per-generation choice
//! between the two. All of them read unknown states as `+∞`.
//!
//! ## Cargo features
//! - `parallel`: relax the subsets of each generation on the rayon pool.
//! - `tracing`: spans around the run and each generation, plus
//!   [`observer::TracingObserver`].

pub mod builder;
pub mod city;
pub mod engine;
pub mod error;
pub mod observer;
pub mod problem;
pub mod subset;
pub mod table;
pub mod traits;
pub mod utils;

pub use crate::builder::HeldKarpBuilder;
pub use crate::city::{City, DistanceMatrix};
pub use crate::engine::{solve, HeldKarp};
pub use crate::error::{Error, Result};
pub use crate::observer::{GenerationStats, NoopObserver};
pub use crate::problem::Problem;
pub use crate::table::{Table, TableKind};
pub use crate::traits::{GenerationObserver, GenerationTable};
