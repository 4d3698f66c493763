use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotelMatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field '{field}' on line {line}")]
    MissingField { field: String, line: u64 },

    #[error("Invalid value {value:?} for field '{field}' on line {line}")]
    InvalidField {
        field: String,
        line: u64,
        value: String,
    },

    #[error("Data loading failed: {0}")]
    DataLoad(String),
}

pub type Result<T> = std::result::Result<T, HotelMatchError>;
