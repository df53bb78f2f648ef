use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::config::{ConfigError, DerivationConfig};

use super::model::{Band, Category, PlanetDataset, PlanetRecord, RawRecord, StarSize, Status};

// ---------------------------------------------------------------------------
// Bins – continuous value → category
// ---------------------------------------------------------------------------

/// Ordered bin edges for one category type.
///
/// The first edge is excluded and the last edge included, so the covered
/// range is `(first, last]`. A value equal to an interior edge lands in the
/// higher of the two adjacent bins.
#[derive(Debug, Clone)]
pub struct Bins<C: Category> {
    edges: Vec<f64>,
    _category: PhantomData<C>,
}

impl<C: Category> Bins<C> {
    pub fn new(name: &'static str, edges: &[f64]) -> Result<Self, ConfigError> {
        if edges.len() != C::ALL.len() + 1 {
            return Err(ConfigError::BinEdges {
                name,
                reason: format!(
                    "expected {} edges for {} labels, got {}",
                    C::ALL.len() + 1,
                    C::ALL.len(),
                    edges.len()
                ),
            });
        }
        // `<` is false for NaN, so this also rejects non-numbers.
        if !edges.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::BinEdges {
                name,
                reason: format!("edges must be strictly increasing, got {edges:?}"),
            });
        }
        Ok(Self {
            edges: edges.to_vec(),
            _category: PhantomData,
        })
    }

    /// Category for `value`, or `None` outside `(first, last]` and for NaN.
    pub fn classify(&self, value: f64) -> Option<C> {
        let (first, rest) = self.edges.split_first()?;
        let (last, interior) = rest.split_last()?;
        if !(value > *first && value <= *last) {
            return None;
        }
        let idx = interior.iter().take_while(|&&edge| value >= edge).count();
        C::ALL.get(idx).copied()
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Habitability status from the temperature and gravity bands.
///
/// Missing bands never match a rule and fall through to `Extreme`.
pub fn derive_status(temp: Option<Band>, gravity: Option<Band>) -> Status {
    match (temp, gravity) {
        (Some(Band::Optimal), Some(Band::Optimal)) => Status::Promising,
        (Some(Band::Optimal), Some(Band::Low | Band::High)) => Status::Challenging,
        (Some(Band::Low | Band::High), Some(Band::Optimal)) => Status::Challenging,
        _ => Status::Extreme,
    }
}

// ---------------------------------------------------------------------------
// DerivationEngine
// ---------------------------------------------------------------------------

/// Computes the derived columns of every record once, right after load.
#[derive(Debug, Clone)]
pub struct DerivationEngine {
    star_size: Bins<StarSize>,
    temp: Bins<Band>,
    gravity: Bins<Band>,
}

impl DerivationEngine {
    pub fn new(config: &DerivationConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            star_size: Bins::new("StarSize", &config.star_size_edges)?,
            temp: Bins::new("temp", &config.temp_edges)?,
            gravity: Bins::new("gravity", &config.gravity_edges)?,
        })
    }

    /// Enrich a single record. Pure: depends on nothing but `raw`.
    pub fn derive_record(&self, raw: RawRecord) -> PlanetRecord {
        let star_size = self.star_size.classify(raw.rstar);
        let temp = self.temp.classify(raw.tplanet);
        let gravity = self.gravity.classify(raw.rplanet);
        let status = derive_status(temp, gravity);
        let relative_dist = raw.a / raw.rstar;
        PlanetRecord {
            raw,
            star_size,
            temp,
            gravity,
            status,
            relative_dist,
        }
    }

    /// Enrich a whole record set and build the dataset indices.
    pub fn derive_dataset(&self, raws: Vec<RawRecord>) -> PlanetDataset {
        let records: Vec<PlanetRecord> = raws.into_iter().map(|r| self.derive_record(r)).collect();

        if log::log_enabled!(log::Level::Debug) {
            let mut per_status: BTreeMap<Status, usize> = BTreeMap::new();
            for r in &records {
                *per_status.entry(r.status).or_default() += 1;
            }
            let unsized_count = records.iter().filter(|r| r.star_size.is_none()).count();
            log::debug!("Status counts {per_status:?}, {unsized_count} records without a star size");
        }

        PlanetDataset::from_records(records)
    }
}
