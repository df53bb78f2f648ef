use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// FieldValue – a single passthrough cell
// ---------------------------------------------------------------------------

/// A dynamically-typed value for columns the dashboard does not interpret
/// (KMAG, T0, UPER, ...). They travel untouched from the loader to the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.4}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Null => write!(f, ""),
        }
    }
}

impl FieldValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A closed set of labels a continuous measurement can be binned into.
/// `ALL` is ordered from the lowest bin to the highest.
pub trait Category: Copy + Eq + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;
}

/// Host star radius relative to the Sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StarSize {
    Small,
    Similar,
    Bigger,
}

impl Category for StarSize {
    const ALL: &'static [Self] = &[StarSize::Small, StarSize::Similar, StarSize::Bigger];

    fn label(self) -> &'static str {
        match self {
            StarSize::Small => "small",
            StarSize::Similar => "similar",
            StarSize::Bigger => "bigger",
        }
    }
}

/// Four-level band shared by the temperature and gravity classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Optimal,
    High,
    Extreme,
}

impl Category for Band {
    const ALL: &'static [Self] = &[Band::Low, Band::Optimal, Band::High, Band::Extreme];

    fn label(self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Optimal => "optimal",
            Band::High => "high",
            Band::Extreme => "extreme",
        }
    }
}

/// Habitability heuristic derived from the temperature and gravity bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Promising,
    Challenging,
    Extreme,
}

impl Status {
    /// Display order for legends and series.
    pub const ALL: [Status; 3] = [Status::Challenging, Status::Promising, Status::Extreme];

    pub fn label(self) -> &'static str {
        match self {
            Status::Promising => "promising",
            Status::Challenging => "challenging",
            Status::Extreme => "extreme",
        }
    }
}

impl fmt::Display for StarSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// RawRecord – one row as delivered by the loader
// ---------------------------------------------------------------------------

pub const FIELD_KOI: &str = "KOI";
pub const FIELD_A: &str = "A";
pub const FIELD_RPLANET: &str = "RPLANET";
pub const FIELD_RSTAR: &str = "RSTAR";
pub const FIELD_TPLANET: &str = "TPLANET";
pub const FIELD_MSTAR: &str = "MSTAR";
pub const FIELD_TSTAR: &str = "TSTAR";
pub const FIELD_RA: &str = "RA";
pub const FIELD_DEC: &str = "DEC";
pub const FIELD_PER: &str = "PER";

/// Fields every record must carry, in table column order.
pub const REQUIRED_FIELDS: [&str; 10] = [
    FIELD_KOI,
    FIELD_A,
    FIELD_RPLANET,
    FIELD_RSTAR,
    FIELD_TPLANET,
    FIELD_MSTAR,
    FIELD_TSTAR,
    FIELD_RA,
    FIELD_DEC,
    FIELD_PER,
];

/// A single Kepler Object of Interest.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Integer KOI number; `None` when the source value was not finite.
    pub koi: Option<i64>,
    /// Semi-major axis (AU).
    pub a: f64,
    /// Planetary radius (Earth radii).
    pub rplanet: f64,
    /// Stellar radius (Sol radii).
    pub rstar: f64,
    /// Planet equilibrium temperature (K).
    pub tplanet: f64,
    /// Stellar mass (Msol).
    pub mstar: f64,
    /// Effective stellar temperature (K).
    pub tstar: f64,
    pub ra: f64,
    pub dec: f64,
    /// Orbital period (days).
    pub per: f64,
    /// Every other source column, keyed by its name.
    pub extra: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    /// Value of a named required field, as it appears in the raw table.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let v = match name {
            FIELD_KOI => return Some(self.koi.map_or(FieldValue::Null, FieldValue::Integer)),
            FIELD_A => self.a,
            FIELD_RPLANET => self.rplanet,
            FIELD_RSTAR => self.rstar,
            FIELD_TPLANET => self.tplanet,
            FIELD_MSTAR => self.mstar,
            FIELD_TSTAR => self.tstar,
            FIELD_RA => self.ra,
            FIELD_DEC => self.dec,
            FIELD_PER => self.per,
            other => return self.extra.get(other).cloned(),
        };
        Some(FieldValue::Float(v))
    }
}

// ---------------------------------------------------------------------------
// PlanetRecord – a raw record plus its derived labels
// ---------------------------------------------------------------------------

/// A record enriched by the derivation engine. Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetRecord {
    pub raw: RawRecord,
    pub star_size: Option<StarSize>,
    pub temp: Option<Band>,
    pub gravity: Option<Band>,
    pub status: Status,
    /// `A / RSTAR`.
    pub relative_dist: f64,
}

// ---------------------------------------------------------------------------
// PlanetDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The enriched dataset with pre-computed column information.
#[derive(Debug, Clone)]
pub struct PlanetDataset {
    pub records: Vec<PlanetRecord>,
    /// Sorted names of passthrough columns seen in any record.
    pub passthrough_columns: Vec<String>,
    /// RPLANET extrema, bounds of the radius range selector.
    pub rplanet_range: Option<(f64, f64)>,
}

impl PlanetDataset {
    /// Build column information from the enriched records.
    pub fn from_records(records: Vec<PlanetRecord>) -> Self {
        let passthrough: BTreeSet<&String> =
            records.iter().flat_map(|r| r.raw.extra.keys()).collect();
        let passthrough_columns = passthrough.into_iter().cloned().collect();

        let rplanet_range = records
            .iter()
            .map(|r| r.raw.rplanet)
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            });

        PlanetDataset {
            records,
            passthrough_columns,
            rplanet_range,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
