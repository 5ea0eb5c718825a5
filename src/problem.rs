//! Plain-text problem instances.
//!
//! The format is a city count on the first non-blank line followed by one
//! `x y` pair per city:
//!
//! ```text
//! 4
//! 0 0
//! 0 1
//! 1 1
//! 1 0
//! ```
//!
//! Cities are indexed in file order; the first one is where the tour starts.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::city::City;
use crate::table::TableKind;
use crate::{Error, HeldKarp, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    pub city_count: usize,
    pub cities: Vec<City>,
}

impl Problem {
    pub fn new(cities: Vec<City>) -> Self {
        Self {
            city_count: cities.len(),
            cities,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        text.parse().map_err(|e| match e {
            Error::InvalidData(msg) => Error::invalid_data(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn solve(&self) -> Result<f64> {
        self.solve_with(TableKind::default())
    }

    pub fn solve_with(&self, table_kind: TableKind) -> Result<f64> {
        HeldKarp::new(&self.cities, self.city_count)?
            .with_table_kind(table_kind)
            .run(&mut crate::NoopObserver)
    }
}

impl FromStr for Problem {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_line, header) = lines
            .next()
            .ok_or_else(|| Error::invalid_data("empty problem: missing city count"))?;
        let city_count: usize = header.parse().map_err(|_| {
            Error::invalid_data(format!("line {header_line}: bad city count '{header}'"))
        })?;

        let mut cities = Vec::new();
        for (line_no, line) in lines {
            let mut fields = line.split_whitespace();
            let x = parse_coordinate(fields.next(), line_no)?;
            let y = parse_coordinate(fields.next(), line_no)?;
            if fields.next().is_some() {
                return Err(Error::invalid_data(format!(
                    "line {line_no}: expected two coordinates, got '{line}'"
                )));
            }
            cities.push(City::new(x, y));
        }

        if cities.len() != city_count {
            return Err(Error::invalid_data(format!(
                "header declares {city_count} cities but {} were listed",
                cities.len()
            )));
        }
        Ok(Self { city_count, cities })
    }
}

fn parse_coordinate(field: Option<&str>, line_no: usize) -> Result<f64> {
    let field =
        field.ok_or_else(|| Error::invalid_data(format!("line {line_no}: missing coordinate")))?;
    let value: f64 = field
        .parse()
        .map_err(|_| Error::invalid_data(format!("line {line_no}: bad coordinate '{field}'")))?;
    if !value.is_finite() {
        return Err(Error::invalid_data(format!(
            "line {line_no}: coordinate '{field}' is not finite"
        )));
    }
    Ok(value)
}
