//! Module for loading and representing city tables.
//!
//! A city table maps integer ids to 2-D coordinates. Id 0 is the depot where
//! every tour starts and ends; ids 1..N are the cities a route permutes.
//! Tables are read from (and written to) CSV files with a `CityId,X,Y` header,
//! or synthesised uniformly at random when no data file exists yet.

use crate::distance::{euclidean, penalized_cost};
use crate::error::{DatasetError, ValidationError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Id of the depot.
pub const DEPOT: usize = 0;

/// Set of city ids a route must visit. Never contains the depot.
pub type CitySet = BTreeSet<usize>;

/// A city (or the depot) with its coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "CityId")]
    pub id: usize,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
}

impl City {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        City { id, x, y }
    }

    pub fn is_depot(&self) -> bool {
        self.id == DEPOT
    }

    #[inline]
    pub fn point(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Read-only coordinate table shared by every route of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityTable {
    /// Name of the table (file stem when loaded from disk)
    pub name: String,
    /// Depot first, then cities; `cities[i].id == i`
    cities: Vec<City>,
}

impl CityTable {
    /// Build a table from in-memory points. Point `i` gets id `i`, so the
    /// first point is the depot.
    pub fn from_coordinates(name: &str, points: &[(f64, f64)]) -> Result<Self, DatasetError> {
        let cities = points
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| City::new(id, x, y))
            .collect();
        Self::from_cities(name, cities)
    }

    fn from_cities(name: &str, cities: Vec<City>) -> Result<Self, DatasetError> {
        if cities.is_empty() {
            return Err(DatasetError::Empty);
        }
        for (expected, city) in cities.iter().enumerate() {
            if city.id != expected {
                return Err(DatasetError::NonContiguousIds {
                    expected,
                    found: city.id,
                });
            }
        }

        Ok(CityTable {
            name: name.to_string(),
            cities,
        })
    }

    /// Parse a table from CSV data with a `CityId,X,Y` header
    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_reader(reader);
        let cities = reader
            .deserialize::<City>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_cities(name, cities)
    }

    /// Load a table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = File::open(path)?;
        Self::from_reader(&name, file)
    }

    /// Serialise the table as CSV
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        let mut writer = csv::Writer::from_writer(writer);
        for city in &self.cities {
            writer.serialize(city)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        let file = File::create(path)?;
        self.to_writer(file)
    }

    /// Generate `count` points (depot included) uniformly in `[low, high)²`.
    pub fn synthesize<R: Rng + ?Sized>(
        name: &str,
        count: usize,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Result<Self, DatasetError> {
        if count == 0 {
            return Err(DatasetError::Empty);
        }
        if !(low < high) {
            return Err(DatasetError::InvalidBounds { low, high });
        }

        let xs: Vec<f64> = (0..count).map(|_| rng.gen_range(low..high)).collect();
        let ys: Vec<f64> = (0..count).map(|_| rng.gen_range(low..high)).collect();
        let points: Vec<(f64, f64)> = xs.into_iter().zip(ys).collect();

        Self::from_coordinates(name, &points)
    }

    /// Load the table at `path`, or synthesise `fallback_count` random points
    /// in `[0, 100)²` and write them there when the file does not exist.
    pub fn load_or_synthesize<P: AsRef<Path>, R: Rng + ?Sized>(
        path: P,
        fallback_count: usize,
        rng: &mut R,
    ) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if path.exists() {
            let table = Self::from_csv(path)?;
            log::info!("Loaded {} cities from {:?}", table.num_cities(), path);
            return Ok(table);
        }

        log::warn!(
            "{:?} not found. Generating {} random cities instead.",
            path,
            fallback_count
        );
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "random".to_string());
        let table = Self::synthesize(&name, fallback_count, 0.0, 100.0, rng)?;
        table.write_csv(path)?;
        Ok(table)
    }

    /// Number of entries, depot included
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Always false for a constructed table, which holds at least the depot
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Number of permutable cities (excluding the depot)
    pub fn num_cities(&self) -> usize {
        self.cities.len() - 1
    }

    pub fn depot(&self) -> &City {
        &self.cities[DEPOT]
    }

    pub fn city(&self, id: usize) -> Option<&City> {
        self.cities.get(id)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Every known city except the depot
    pub fn all_cities(&self) -> CitySet {
        (1..self.cities.len()).collect()
    }

    /// Check that a city set only names known, non-depot cities
    pub fn validate_city_set(&self, cities: &CitySet) -> Result<(), ValidationError> {
        if cities.contains(&DEPOT) {
            return Err(ValidationError::DepotInCitySet);
        }
        match cities.last() {
            Some(&id) if id >= self.cities.len() => Err(ValidationError::UnknownCity(id)),
            _ => Ok(()),
        }
    }

    /// Euclidean distance between two ids
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        euclidean(self.cities[i].point(), self.cities[j].point())
    }

    /// Cost of the leg `from -> to` taken as the `step`-th leg of a tour
    #[inline]
    pub fn leg_cost(&self, from: usize, to: usize, step: usize) -> f64 {
        penalized_cost(self.distance(from, to), from, step)
    }

    /// Length of the closed tour depot -> `sequence` -> depot, penalties included
    pub fn tour_length(&self, sequence: &[usize]) -> f64 {
        let mut length = 0.0;
        let mut previous = DEPOT;

        for (idx, &city) in sequence.iter().chain(std::iter::once(&DEPOT)).enumerate() {
            length += self.leg_cost(previous, city, idx + 1);
            previous = city;
        }

        length
    }

    /// Get statistics about the table
    pub fn statistics(&self) -> TableStatistics {
        let min_x = self.cities.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
        let max_x = self.cities.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = self.cities.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
        let max_y = self.cities.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max);

        let mut total = 0.0;
        let mut max_distance: f64 = 0.0;
        let mut pairs = 0usize;
        for i in 0..self.cities.len() {
            for j in i + 1..self.cities.len() {
                let d = self.distance(i, j);
                total += d;
                max_distance = max_distance.max(d);
                pairs += 1;
            }
        }
        let avg_distance = if pairs > 0 { total / pairs as f64 } else { 0.0 };

        TableStatistics {
            name: self.name.clone(),
            num_cities: self.num_cities(),
            depot: self.depot().point(),
            min_x,
            max_x,
            min_y,
            max_y,
            avg_distance,
            max_distance,
        }
    }
}

/// Statistics about a city table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatistics {
    pub name: String,
    pub num_cities: usize,
    pub depot: (f64, f64),
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for TableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Table: {}", self.name)?;
        writeln!(f, "  Cities: {} (+ depot)", self.num_cities)?;
        writeln!(f, "  Depot: ({:.2}, {:.2})", self.depot.0, self.depot.1)?;
        writeln!(f, "  X range: [{:.2}, {:.2}]", self.min_x, self.max_x)?;
        writeln!(f, "  Y range: [{:.2}, {:.2}]", self.min_y, self.max_y)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}
