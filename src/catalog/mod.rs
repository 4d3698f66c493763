// Data set I/O: CSV loading and synthetic data generation

pub mod generator;
pub mod loader;

pub use generator::{DatasetSummary, DummyDataGenerator, GeneratedDataset};
pub use loader::{load_snapshot, CatalogSnapshot, DataFiles};
