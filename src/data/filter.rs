use std::collections::BTreeSet;

use super::model::{Category, PlanetDataset, PlanetRecord, StarSize};

// ---------------------------------------------------------------------------
// Filter predicate: radius window + selected star sizes
// ---------------------------------------------------------------------------

/// The user's current selection. Edited freely by the controls; only read
/// when the user applies it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Lower bound of the RPLANET window (exclusive).
    pub radius_min: f64,
    /// Upper bound of the RPLANET window (exclusive).
    pub radius_max: f64,
    /// Star sizes to keep. Empty means nothing passes.
    pub star_sizes: BTreeSet<StarSize>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            radius_min: 0.0,
            radius_max: 0.0,
            star_sizes: StarSize::ALL.iter().copied().collect(),
        }
    }
}

/// Initialise a [`FilterState`] spanning the whole dataset: the radius
/// window at the RPLANET extrema and every star size selected.
pub fn init_filter_state(dataset: &PlanetDataset) -> FilterState {
    let (radius_min, radius_max) = dataset.rplanet_range.unwrap_or((0.0, 0.0));
    FilterState {
        radius_min,
        radius_max,
        ..FilterState::default()
    }
}

impl FilterState {
    /// Whether a single record passes. Both radius bounds are exclusive and
    /// records without a star size never pass.
    pub fn matches(&self, record: &PlanetRecord) -> bool {
        let r = record.raw.rplanet;
        r > self.radius_min
            && r < self.radius_max
            && record
                .star_size
                .is_some_and(|size| self.star_sizes.contains(&size))
    }

    /// Move the window into `bounds`, keeping `radius_min <= radius_max`.
    pub fn clamp_to(&mut self, bounds: (f64, f64)) {
        let (lo, hi) = bounds;
        self.radius_min = self.radius_min.clamp(lo, hi);
        self.radius_max = self.radius_max.clamp(lo, hi);
        if self.radius_min > self.radius_max {
            std::mem::swap(&mut self.radius_min, &mut self.radius_max);
        }
    }

    /// Toggle one star size in the multi-select.
    pub fn toggle_star_size(&mut self, size: StarSize) {
        if !self.star_sizes.remove(&size) {
            self.star_sizes.insert(size);
        }
    }
}

/// Return indices of records that pass the filter, in dataset order.
pub fn filtered_indices(dataset: &PlanetDataset, filter: &FilterState) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.matches(record))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DerivationConfig;
    use crate::data::derive::DerivationEngine;
    use crate::data::model::RawRecord;
    use std::collections::BTreeMap;

    fn dataset(radii_and_rstar: &[(f64, f64)]) -> PlanetDataset {
        let engine = DerivationEngine::new(&DerivationConfig::default()).expect("engine");
        let raws = radii_and_rstar
            .iter()
            .enumerate()
            .map(|(i, &(rplanet, rstar))| RawRecord {
                koi: Some(i as i64),
                a: 1.0,
                rplanet,
                rstar,
                tplanet: 300.0,
                mstar: 1.0,
                tstar: 5500.0,
                ra: 290.0,
                dec: 45.0,
                per: 100.0,
                extra: BTreeMap::new(),
            })
            .collect();
        engine.derive_dataset(raws)
    }

    #[test]
    fn initial_state_spans_dataset() {
        let ds = dataset(&[(0.4, 1.0), (9.0, 0.5), (2.0, 1.5)]);
        let filter = init_filter_state(&ds);
        assert_eq!(filter.radius_min, 0.4);
        assert_eq!(filter.radius_max, 9.0);
        assert_eq!(filter.star_sizes.len(), 3);
    }

    #[test]
    fn radius_bounds_are_exclusive() {
        let ds = dataset(&[(0.5, 1.0), (1.0, 1.0), (2.0, 1.0), (1.9999, 1.0)]);
        let filter = FilterState {
            radius_min: 0.5,
            radius_max: 2.0,
            ..FilterState::default()
        };
        assert_eq!(filtered_indices(&ds, &filter), vec![1, 3]);
        for i in filtered_indices(&ds, &filter) {
            let r = ds.records[i].raw.rplanet;
            assert!(r > filter.radius_min && r < filter.radius_max);
        }
    }

    #[test]
    fn star_size_selection_applies() {
        let ds = dataset(&[(1.0, 0.5), (1.0, 1.0), (1.0, 2.0)]);
        let filter = FilterState {
            radius_min: 0.0,
            radius_max: 10.0,
            star_sizes: [StarSize::Small, StarSize::Bigger].into_iter().collect(),
        };
        assert_eq!(filtered_indices(&ds, &filter), vec![0, 2]);
    }

    #[test]
    fn unsized_records_never_pass() {
        let ds = dataset(&[(1.0, 250.0), (1.0, 0.9)]);
        let filter = FilterState {
            radius_min: 0.0,
            radius_max: 10.0,
            ..FilterState::default()
        };
        assert_eq!(filtered_indices(&ds, &filter), vec![1]);
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let ds = dataset(&[(1.0, 0.5), (1.0, 1.0)]);
        let filter = FilterState {
            radius_min: 0.0,
            radius_max: 10.0,
            star_sizes: BTreeSet::new(),
        };
        assert!(filtered_indices(&ds, &filter).is_empty());
    }

    #[test]
    fn toggle_adds_and_removes() {
        let mut filter = FilterState::default();
        filter.toggle_star_size(StarSize::Similar);
        assert!(!filter.star_sizes.contains(&StarSize::Similar));
        filter.toggle_star_size(StarSize::Similar);
        assert!(filter.star_sizes.contains(&StarSize::Similar));
    }

    #[test]
    fn clamp_keeps_window_ordered() {
        let mut filter = FilterState {
            radius_min: 30.0,
            radius_max: -4.0,
            ..FilterState::default()
        };
        filter.clamp_to((0.3, 20.0));
        assert_eq!((filter.radius_min, filter.radius_max), (0.3, 20.0));
    }
}
