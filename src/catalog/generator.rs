use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use super::loader::DataFiles;
use crate::error::Result;
use crate::pipeline::round_half_up;
use crate::types::{CatalogRecord, PropertyRecord, SupplierType};

pub const CORRECT_COUNT: usize = SupplierType::ALL.len();
pub const SIMILAR_COUNT: usize = 96;
pub const UNRELATED_COUNT: usize = 400;

const GENERATED_DECIMALS: u32 = 4;

const PROPERTY_NAME: &str = "Hotel Forza Osaka Namba Dotonbori";
const PROPERTY_ADDRESS: &str = "Osaka Prefecture, Osaka, 3f 1-4-22 Dotonbori";

const NAME_VARIATIONS: &[&str] = &[
    "Hotel Forza Osaka Namba",
    "Forza Hotel Osaka Namba Dotonbori",
    "Hotel Forza Namba Dotonbori",
    "Osaka Namba Dotonbori Hotel Forza",
    "Hotel Forza Osaka Dotonbori",
    "Forza Osaka Namba Hotel",
    "Hotel Osaka Namba Dotonbori",
    "Namba Dotonbori Hotel Forza",
];

const ADDRESS_VARIATIONS: &[&str] = &[
    "Osaka Prefecture, Osaka, 1-4-22 Dotonbori",
    "Osaka, 3f 1-4-22 Dotonbori",
    "Osaka Prefecture, Osaka, 3-1-4-22 Dotonbori",
    "Osaka Prefecture, Namba, 3f 1-4-22 Dotonbori",
    "Osaka Prefecture, Osaka, 1-4 Dotonbori",
    "Osaka, Namba, 1-4-22 Dotonbori",
    "Osaka Prefecture, Osaka, 3f 1-4-20 Dotonbori",
];

const CITIES: &[&str] = &[
    "Tokyo", "Yokohama", "Kyoto", "Kobe", "Fukuoka", "Sapporo", "Sendai", "Hiroshima", "Nagoya",
];
const HOTEL_PREFIXES: &[&str] = &["Hotel", "Grand Hotel", "Resort", "Inn", "Hostel", "Ryokan", "Lodge"];
const HOTEL_NAMES: &[&str] = &[
    "Sakura", "Metropolitan", "Royal", "Imperial", "Central", "Bay", "Garden", "Plaza", "Tower", "Palace",
];
const HOTEL_SUFFIXES: &[&str] = &[
    "Tokyo", "Shibuya", "Shinjuku", "Ginza", "Akasaka", "Roppongi", "Asakusa", "Harajuku",
];
const WARDS: &[&str] = &["Chuo", "Minato", "Shibuya", "Shinjuku"];

/// A synthetic property plus its shuffled candidate catalog
#[derive(Debug, Clone)]
pub struct GeneratedDataset {
    pub property: PropertyRecord,
    pub records: Vec<CatalogRecord>,
}

/// Counts reported after generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub correct: usize,
    pub high_similarity: usize,
    pub mid_similarity: usize,
    pub low_similarity: usize,
}

impl GeneratedDataset {
    pub fn summary(&self) -> DatasetSummary {
        let mut summary = DatasetSummary {
            total: self.records.len(),
            correct: 0,
            high_similarity: 0,
            mid_similarity: 0,
            low_similarity: 0,
        };
        for r in &self.records {
            if r.is_correct {
                summary.correct += 1;
            }
            if r.similarity_score > 0.7 {
                summary.high_similarity += 1;
            } else if r.similarity_score >= 0.3 {
                summary.mid_similarity += 1;
            } else {
                summary.low_similarity += 1;
            }
        }
        summary
    }

    /// Write `property_data.csv` and `catalog_data.csv` into `dir`
    pub fn write_csv(&self, dir: impl AsRef<Path>) -> Result<DataFiles> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let files = DataFiles::in_dir(dir);

        let mut writer = csv::Writer::from_path(&files.property)?;
        writer.serialize(&self.property)?;
        writer.flush()?;

        let mut writer = csv::Writer::from_path(&files.catalog)?;
        for record in &self.records {
            writer.serialize(CatalogCsvRow::from(record))?;
        }
        writer.flush()?;

        info!(
            catalog_records = self.records.len(),
            "Wrote {} and {}",
            files.property.display(),
            files.catalog.display()
        );
        Ok(files)
    }
}

// Column order of the catalog file
#[derive(Serialize)]
struct CatalogCsvRow<'a> {
    supplier_type: SupplierType,
    supplier_property_seq: &'a str,
    name: &'a str,
    address: &'a str,
    is_correct: bool,
    similarity_score: f64,
    ml_score: f64,
}

impl<'a> From<&'a CatalogRecord> for CatalogCsvRow<'a> {
    fn from(r: &'a CatalogRecord) -> Self {
        Self {
            supplier_type: r.supplier_type,
            supplier_property_seq: &r.supplier_property_seq,
            name: &r.name,
            address: &r.address,
            is_correct: r.is_correct,
            similarity_score: r.similarity_score,
            ml_score: r.ml_score,
        }
    }
}

/// Produces the dummy data set: 4 correct answers, 96 near-misses and 400
/// unrelated hotels, each with a precomputed similarity and ML score.
pub struct DummyDataGenerator<R: Rng> {
    rng: R,
}

impl DummyDataGenerator<StdRng> {
    /// Reproducible output for a given seed
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> DummyDataGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self) -> GeneratedDataset {
        let property = self.property();
        let mut records = self.correct_answers(&property);
        records.extend(self.similar_records(SIMILAR_COUNT));
        records.extend(self.unrelated_records(UNRELATED_COUNT));
        self.assign_ml_scores(&mut records);
        records.shuffle(&mut self.rng);
        GeneratedDataset { property, records }
    }

    pub fn property(&mut self) -> PropertyRecord {
        PropertyRecord {
            supplier_type: SupplierType::Eps,
            supplier_property_seq: self.property_seq(),
            name: PROPERTY_NAME.to_string(),
            address: PROPERTY_ADDRESS.to_string(),
        }
    }

    /// One record per supplier sharing the property's exact name and address
    pub fn correct_answers(&mut self, property: &PropertyRecord) -> Vec<CatalogRecord> {
        SupplierType::ALL
            .iter()
            .map(|&supplier_type| CatalogRecord {
                supplier_type,
                supplier_property_seq: self.property_seq(),
                name: property.name.clone(),
                address: property.address.clone(),
                similarity_score: self.score(0.95, 1.0),
                ml_score: 0.0,
                is_correct: true,
            })
            .collect()
    }

    pub fn similar_records(&mut self, count: usize) -> Vec<CatalogRecord> {
        (0..count)
            .map(|_| CatalogRecord {
                supplier_type: self.supplier(),
                supplier_property_seq: self.property_seq(),
                name: self.pick(NAME_VARIATIONS).to_string(),
                address: self.pick(ADDRESS_VARIATIONS).to_string(),
                similarity_score: self.score(0.3, 0.95),
                ml_score: 0.0,
                is_correct: false,
            })
            .collect()
    }

    pub fn unrelated_records(&mut self, count: usize) -> Vec<CatalogRecord> {
        (0..count)
            .map(|_| {
                let city = self.pick(CITIES);
                let name = format!(
                    "{} {} {}",
                    self.pick(HOTEL_PREFIXES),
                    self.pick(HOTEL_NAMES),
                    self.pick(HOTEL_SUFFIXES)
                );
                let address = format!(
                    "{city} Prefecture, {city}, {}-{}-{} {}",
                    self.rng.gen_range(1..=10),
                    self.rng.gen_range(1..=20),
                    self.rng.gen_range(1..=30),
                    self.pick(WARDS)
                );
                CatalogRecord {
                    supplier_type: self.supplier(),
                    supplier_property_seq: self.property_seq(),
                    name,
                    address,
                    similarity_score: self.score(0.0, 0.3),
                    ml_score: 0.0,
                    is_correct: false,
                }
            })
            .collect()
    }

    /// Simulated model output: high for correct answers, middling for
    /// near-misses, low for unrelated hotels.
    pub fn assign_ml_scores(&mut self, records: &mut [CatalogRecord]) {
        for record in records.iter_mut() {
            record.ml_score = if record.is_correct {
                self.score(0.95, 1.0)
            } else if record.similarity_score > 0.3 {
                self.score(0.2, 0.9)
            } else {
                self.score(0.0, 0.4)
            };
        }
    }

    fn score(&mut self, low: f64, high: f64) -> f64 {
        round_half_up(self.rng.gen_range(low..=high), GENERATED_DECIMALS)
    }

    fn property_seq(&mut self) -> String {
        self.rng.gen_range(10_000_000u32..=99_999_999).to_string()
    }

    fn supplier(&mut self) -> SupplierType {
        *self.pick(&SupplierType::ALL)
    }

    fn pick<'t, T>(&mut self, items: &'t [T]) -> &'t T {
        // Only ever called with non-empty constant tables
        &items[self.rng.gen_range(0..items.len())]
    }
}
