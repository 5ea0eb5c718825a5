use crate::city::City;
use crate::table::TableKind;
use crate::{HeldKarp, Result};

pub struct HeldKarpBuilder<'a> {
    cities: &'a [City],
    city_count: Option<usize>,
    table_kind: Option<TableKind>,
}

impl<'a> HeldKarpBuilder<'a> {
    pub fn new(cities: &'a [City]) -> Self {
        Self {
            cities,
            city_count: None,
            table_kind: None,
        }
    }
    /// Declared city count, checked against the slice. Defaults to its length.
    pub fn with_city_count(mut self, city_count: usize) -> Self {
        self.city_count = Some(city_count);
        self
    }
    pub fn with_table_kind(mut self, table_kind: TableKind) -> Self {
        self.table_kind = Some(table_kind);
        self
    }
    pub fn build(self) -> Result<HeldKarp> {
        let city_count = self.city_count.unwrap_or(self.cities.len());
        let engine = HeldKarp::new(self.cities, city_count)?;
        Ok(match self.table_kind {
            Some(kind) => engine.with_table_kind(kind),
            None => engine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn defaults_to_slice_length_and_auto_tables() {
        let cities = [City::new(0.0, 0.0), City::new(0.0, 2.0)];
        let engine = HeldKarpBuilder::new(&cities).build().unwrap();
        assert_eq!(engine.city_count(), 2);
        assert_eq!(engine.table_kind(), TableKind::Auto);
    }

    #[test]
    fn declared_count_must_match() {
        let cities = [City::new(0.0, 0.0), City::new(0.0, 2.0)];
        let err = HeldKarpBuilder::new(&cities)
            .with_city_count(3)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn table_kind_is_forwarded() {
        let cities = [City::new(0.0, 0.0), City::new(1.0, 0.0), City::new(0.0, 1.0)];
        let engine = HeldKarpBuilder::new(&cities)
            .with_table_kind(TableKind::Sparse)
            .build()
            .unwrap();
        assert_eq!(engine.table_kind(), TableKind::Sparse);
    }
}
