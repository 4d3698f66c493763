use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source system a catalog record was supplied by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SupplierType {
    Agoda,
    Eps,
    Dotw,
    Hb,
}

impl SupplierType {
    pub const ALL: [SupplierType; 4] = [
        SupplierType::Agoda,
        SupplierType::Eps,
        SupplierType::Dotw,
        SupplierType::Hb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierType::Agoda => "AGODA",
            SupplierType::Eps => "EPS",
            SupplierType::Dotw => "DOTW",
            SupplierType::Hb => "HB",
        }
    }
}

impl fmt::Display for SupplierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplierType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AGODA" => Ok(SupplierType::Agoda),
            "EPS" => Ok(SupplierType::Eps),
            "DOTW" => Ok(SupplierType::Dotw),
            "HB" => Ok(SupplierType::Hb),
            other => Err(format!("unknown supplier type: {other}")),
        }
    }
}

/// Deduplication key shared by every derived view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey<'a> {
    pub supplier_type: SupplierType,
    pub supplier_property_seq: &'a str,
}

/// The property being searched for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub supplier_type: SupplierType,
    pub supplier_property_seq: String,
    pub name: String,
    pub address: String,
}

/// One candidate match from the supplier catalog.
///
/// Scores are precomputed; nothing in this crate derives them from the
/// name or address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub supplier_type: SupplierType,
    pub supplier_property_seq: String,
    pub name: String,
    pub address: String,
    pub similarity_score: f64,
    pub ml_score: f64,
    pub is_correct: bool,
}

impl CatalogRecord {
    pub fn identity_key(&self) -> IdentityKey<'_> {
        IdentityKey {
            supplier_type: self.supplier_type,
            supplier_property_seq: &self.supplier_property_seq,
        }
    }

    /// Whether this record describes the same place as `property` by name and address
    pub fn matches_property(&self, property: &PropertyRecord) -> bool {
        self.name == property.name && self.address == property.address
    }
}

/// A catalog record with its 1-based position in the ML ordering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord<'a> {
    #[serde(flatten)]
    pub record: &'a CatalogRecord,
    pub rank: usize,
}
