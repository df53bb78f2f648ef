//! Filter → view recompute.
//!
//! ```text
//!   PlanetDataset + FilterState
//!            │  (user presses Apply)
//!            ▼
//!      ViewBuilder::recompute
//!            │
//!            ▼
//!   ViewBundle { dist_temp, celestial, relative_dist, mstar_tstar, table }
//! ```
//!
//! Every slot is either a payload or the empty-selection placeholder. The
//! bundle is plain data: the renderer draws it and nothing else.

use serde::Serialize;

use crate::color::{ChartColor, StatusPalette, star_size_color};
use crate::config::{ConfigError, DashboardConfig};
use crate::data::filter::{FilterState, filtered_indices};
use crate::data::model::{Category, FieldValue, PlanetDataset, PlanetRecord, REQUIRED_FIELDS, StarSize, Status};

/// x position of the Earth reference line in the relative distance chart.
pub const EARTH_RELATIVE_DIST: f64 = 1.0;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// One output slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum ViewSlot<T> {
    /// Nothing matched the filters; show this message instead.
    Placeholder(String),
    Ready(T),
}

impl<T> ViewSlot<T> {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ViewSlot::Placeholder(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewSlot::Ready(v) => Some(v),
            ViewSlot::Placeholder(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Marker size value (RPLANET) for charts sized by radius.
    pub size: Option<f64>,
    pub koi: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub color: ChartColor,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ScatterSeries>,
    /// Largest marker size value in the chart, for scaling marker radii.
    pub size_max: Option<f64>,
}

/// Five-number summary plus count, drawn as the marginal box above the
/// histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub name: String,
    pub color: ChartColor,
    /// One count per bin, aligned with `HistogramChart::bin_edges`.
    pub counts: Vec<usize>,
    pub summary: Option<DistributionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceMarker {
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramChart {
    pub title: String,
    pub x_label: String,
    /// `bins + 1` ascending edges; empty when no value was finite.
    pub bin_edges: Vec<f64>,
    /// Overlaid, one per status present in the selection.
    pub series: Vec<HistogramSeries>,
    pub marker: ReferenceMarker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<FieldValue>>,
    pub page_size: usize,
}

impl TableData {
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size.max(1))
    }

    /// Rows of page `page` (zero-based); empty past the end.
    pub fn page(&self, page: usize) -> &[Vec<FieldValue>] {
        let start = (page * self.page_size).min(self.rows.len());
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }
}

/// Everything the renderer shows for one applied filter. Replaced as a
/// whole on every recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewBundle {
    pub dist_temp: ViewSlot<ScatterChart>,
    pub celestial: ViewSlot<ScatterChart>,
    pub relative_dist: ViewSlot<HistogramChart>,
    pub mstar_tstar: ViewSlot<ScatterChart>,
    pub table: ViewSlot<TableData>,
    /// Number of records that passed the filter.
    pub matched: usize,
}

impl ViewBundle {
    fn placeholder(message: &str) -> Self {
        let p = || message.to_string();
        ViewBundle {
            dist_temp: ViewSlot::Placeholder(p()),
            celestial: ViewSlot::Placeholder(p()),
            relative_dist: ViewSlot::Placeholder(p()),
            mstar_tstar: ViewSlot::Placeholder(p()),
            table: ViewSlot::Placeholder(p()),
            matched: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matched == 0
    }
}

// ---------------------------------------------------------------------------
// ViewBuilder
// ---------------------------------------------------------------------------

/// Turns an applied filter into a [`ViewBundle`]. Holds only read-only
/// configuration, so the same inputs always give the same bundle.
#[derive(Debug, Clone)]
pub struct ViewBuilder {
    palette: StatusPalette,
    histogram_bins: usize,
    page_size: usize,
    hidden_columns: Vec<String>,
    empty_message: String,
}

impl ViewBuilder {
    pub fn new(config: &DashboardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            palette: StatusPalette::from_config(&config.status_colors)?,
            histogram_bins: config.histogram_bins,
            page_size: config.table_page_size,
            hidden_columns: config.table_hidden_columns.clone(),
            empty_message: config.empty_message.clone(),
        })
    }

    pub fn palette(&self) -> &StatusPalette {
        &self.palette
    }

    /// Filter the dataset and build all five views from the subset.
    pub fn recompute(&self, dataset: &PlanetDataset, filter: &FilterState) -> ViewBundle {
        let subset: Vec<&PlanetRecord> = filtered_indices(dataset, filter)
            .into_iter()
            .map(|i| &dataset.records[i])
            .collect();

        log::debug!(
            "Recompute: RPLANET in ({}, {}), sizes {:?} -> {} of {} records",
            filter.radius_min,
            filter.radius_max,
            filter.star_sizes,
            subset.len(),
            dataset.len()
        );

        if subset.is_empty() {
            return ViewBundle::placeholder(&self.empty_message);
        }

        ViewBundle {
            dist_temp: ViewSlot::Ready(self.dist_temp_chart(&subset)),
            celestial: ViewSlot::Ready(self.status_scatter(
                &subset,
                "Position in the Celestial Sphere",
                ("RA", "DEC"),
                |r| (r.raw.ra, r.raw.dec),
            )),
            relative_dist: ViewSlot::Ready(self.relative_dist_chart(&subset)),
            mstar_tstar: ViewSlot::Ready(self.status_scatter(
                &subset,
                "Star Mass ~ star Temperature",
                ("MSTAR", "TSTAR"),
                |r| (r.raw.mstar, r.raw.tstar),
            )),
            table: ViewSlot::Ready(self.table(dataset, &subset)),
            matched: subset.len(),
        }
    }

    fn dist_temp_chart(&self, subset: &[&PlanetRecord]) -> ScatterChart {
        let series = StarSize::ALL
            .iter()
            .filter_map(|&size| {
                let points: Vec<ScatterPoint> = subset
                    .iter()
                    .filter(|r| r.star_size == Some(size))
                    .map(|r| ScatterPoint {
                        x: r.raw.tplanet,
                        y: r.raw.a,
                        size: None,
                        koi: r.raw.koi,
                    })
                    .collect();
                (!points.is_empty()).then(|| ScatterSeries {
                    name: size.label().to_string(),
                    color: star_size_color(size),
                    points,
                })
            })
            .collect();

        ScatterChart {
            title: "Planet Temperature ~ Distance from the Star".to_string(),
            x_label: "TPLANET".to_string(),
            y_label: "A".to_string(),
            series,
            size_max: None,
        }
    }

    /// Scatter of `xy` over the subset, one series per status, markers
    /// sized by planet radius.
    fn status_scatter(
        &self,
        subset: &[&PlanetRecord],
        title: &str,
        labels: (&str, &str),
        xy: impl Fn(&PlanetRecord) -> (f64, f64),
    ) -> ScatterChart {
        let series = Status::ALL
            .iter()
            .filter_map(|&status| {
                let points: Vec<ScatterPoint> = subset
                    .iter()
                    .filter(|r| r.status == status)
                    .map(|r| {
                        let (x, y) = xy(*r);
                        ScatterPoint {
                            x,
                            y,
                            size: Some(r.raw.rplanet),
                            koi: r.raw.koi,
                        }
                    })
                    .collect();
                (!points.is_empty()).then(|| ScatterSeries {
                    name: status.label().to_string(),
                    color: self.palette.color_for(status),
                    points,
                })
            })
            .collect();

        let size_max = subset
            .iter()
            .map(|r| r.raw.rplanet)
            .filter(|v| v.is_finite())
            .reduce(f64::max);

        ScatterChart {
            title: title.to_string(),
            x_label: labels.0.to_string(),
            y_label: labels.1.to_string(),
            series,
            size_max,
        }
    }

    fn relative_dist_chart(&self, subset: &[&PlanetRecord]) -> HistogramChart {
        let finite: Vec<f64> = subset
            .iter()
            .map(|r| r.relative_dist)
            .filter(|v| v.is_finite())
            .collect();
        let bin_edges = histogram_edges(&finite, self.histogram_bins);

        let series = Status::ALL
            .iter()
            .filter_map(|&status| {
                let values: Vec<f64> = subset
                    .iter()
                    .filter(|r| r.status == status)
                    .map(|r| r.relative_dist)
                    .filter(|v| v.is_finite())
                    .collect();
                if values.is_empty() {
                    return None;
                }
                Some(HistogramSeries {
                    name: status.label().to_string(),
                    color: self.palette.color_for(status),
                    counts: histogram_counts(&values, &bin_edges),
                    summary: summarize(&values),
                })
            })
            .collect();

        HistogramChart {
            title: "Relative Distance (AU/Sol radius)".to_string(),
            x_label: "relative_dist".to_string(),
            bin_edges,
            series,
            marker: ReferenceMarker {
                x: EARTH_RELATIVE_DIST,
                label: "Earth".to_string(),
            },
        }
    }

    fn table(&self, dataset: &PlanetDataset, subset: &[&PlanetRecord]) -> TableData {
        let columns: Vec<String> = REQUIRED_FIELDS
            .iter()
            .map(|f| f.to_string())
            .chain(
                dataset
                    .passthrough_columns
                    .iter()
                    .filter(|c| !self.hidden_columns.contains(c))
                    .cloned(),
            )
            .chain(std::iter::once("status".to_string()))
            .collect();

        let rows = subset
            .iter()
            .map(|r| {
                columns
                    .iter()
                    .map(|col| match col.as_str() {
                        "status" => FieldValue::String(r.status.label().to_string()),
                        name => r.raw.field(name).unwrap_or(FieldValue::Null),
                    })
                    .collect()
            })
            .collect();

        TableData {
            title: "Raw Data".to_string(),
            columns,
            rows,
            page_size: self.page_size,
        }
    }
}

// ---------------------------------------------------------------------------
// Histogram helpers
// ---------------------------------------------------------------------------

/// `bins + 1` equal-width edges spanning `values`. A degenerate range is
/// widened to one unit.
fn histogram_edges(values: &[f64], bins: usize) -> Vec<f64> {
    let Some((lo, mut hi)) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    }) else {
        return Vec::new();
    };
    if hi <= lo {
        hi = lo + 1.0;
    }
    let bins = bins.max(1);
    let width = (hi - lo) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { hi } else { lo + i as f64 * width })
        .collect()
}

/// Count `values` per bin. Bins are `[lo, hi)` except the last, which also
/// takes its upper edge.
fn histogram_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0; bins];
    let (Some(&lo), Some(&hi)) = (edges.first(), edges.last()) else {
        return counts;
    };
    for &v in values {
        if v < lo || v > hi {
            continue;
        }
        let idx = edges[1..bins]
            .iter()
            .take_while(|&&edge| v >= edge)
            .count();
        counts[idx] += 1;
    }
    counts
}

fn summarize(values: &[f64]) -> Option<DistributionSummary> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    Some(DistributionSummary {
        count: sorted.len(),
        min,
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max,
    })
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    let frac = pos - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::DerivationEngine;
    use crate::data::filter::init_filter_state;
    use crate::data::model::{FIELD_KOI, FIELD_RPLANET, RawRecord};
    use std::collections::BTreeMap;

    fn raw(koi: i64, rplanet: f64, rstar: f64, tplanet: f64, a: f64) -> RawRecord {
        let mut extra = BTreeMap::new();
        extra.insert("KMAG".to_string(), FieldValue::Float(11.5));
        extra.insert("ROW".to_string(), FieldValue::Integer(koi));
        RawRecord {
            koi: Some(koi),
            a,
            rplanet,
            rstar,
            tplanet,
            mstar: 0.9,
            tstar: 5300.0,
            ra: 288.0 + koi as f64,
            dec: 42.0,
            per: 80.0,
            extra,
        }
    }

    fn dataset(raws: Vec<RawRecord>) -> PlanetDataset {
        DerivationEngine::new(&DashboardConfig::default().derivation)
            .expect("engine")
            .derive_dataset(raws)
    }

    fn builder() -> ViewBuilder {
        ViewBuilder::new(&DashboardConfig::default()).expect("builder")
    }

    fn mixed_dataset() -> PlanetDataset {
        dataset(vec![
            raw(1, 1.0, 0.6, 300.0, 0.6),
            raw(2, 3.0, 1.0, 300.0, 1.0),
            raw(3, 1.5, 1.1, 150.0, 2.2),
            raw(4, 12.0, 1.5, 1200.0, 0.05),
            raw(5, 0.9, 0.7, 700.0, 0.1),
            raw(6, 45.0, 2.0, 2200.0, 0.02),
        ])
    }

    #[test]
    fn single_promising_record_fills_every_view() {
        let ds = dataset(vec![raw(1, 1.0, 0.6, 300.0, 0.6)]);
        let filter = FilterState {
            radius_min: 0.5,
            radius_max: 2.0,
            star_sizes: [StarSize::Small].into_iter().collect(),
        };
        let bundle = builder().recompute(&ds, &filter);

        assert_eq!(bundle.matched, 1);
        assert_eq!(ds.records[0].status, Status::Promising);
        assert!(!bundle.dist_temp.is_placeholder());
        assert!(!bundle.celestial.is_placeholder());
        assert!(!bundle.relative_dist.is_placeholder());
        assert!(!bundle.mstar_tstar.is_placeholder());
        assert!(!bundle.table.is_placeholder());

        let celestial = bundle.celestial.ready().expect("celestial");
        assert_eq!(celestial.series.len(), 1);
        assert_eq!(celestial.series[0].name, "promising");
        assert_eq!(celestial.series[0].color, ChartColor([0x1F, 0x85, 0xDE]));
        assert_eq!(celestial.series[0].points[0].size, Some(1.0));
    }

    #[test]
    fn empty_selection_gives_five_placeholders() {
        let ds = mixed_dataset();
        let filter = FilterState {
            radius_min: 100.0,
            radius_max: 200.0,
            ..FilterState::default()
        };
        let bundle = builder().recompute(&ds, &filter);
        let message = DashboardConfig::default().empty_message;

        assert!(bundle.is_empty());
        assert_eq!(bundle.dist_temp, ViewSlot::Placeholder(message.clone()));
        assert_eq!(bundle.celestial, ViewSlot::Placeholder(message.clone()));
        assert_eq!(bundle.relative_dist, ViewSlot::Placeholder(message.clone()));
        assert_eq!(bundle.mstar_tstar, ViewSlot::Placeholder(message.clone()));
        assert_eq!(bundle.table, ViewSlot::Placeholder(message));
    }

    #[test]
    fn reapplying_a_filter_is_byte_identical() {
        let ds = mixed_dataset();
        let filter = init_filter_state(&ds);
        let vb = builder();
        let first = serde_json::to_vec(&vb.recompute(&ds, &filter)).expect("serialize");
        let second = serde_json::to_vec(&vb.recompute(&ds, &filter)).expect("serialize");
        assert_eq!(first, second);
    }

    #[test]
    fn every_plotted_record_is_strictly_inside_the_window() {
        let ds = mixed_dataset();
        let filter = FilterState {
            radius_min: 0.9,
            radius_max: 12.0,
            ..FilterState::default()
        };
        let bundle = builder().recompute(&ds, &filter);
        let chart = bundle.mstar_tstar.ready().expect("chart");
        let sizes: Vec<f64> = chart
            .series
            .iter()
            .flat_map(|s| s.points.iter().filter_map(|p| p.size))
            .collect();
        assert_eq!(bundle.matched, 3);
        assert!(sizes.iter().all(|&r| r > 0.9 && r < 12.0));
    }

    #[test]
    fn dist_temp_series_follow_star_size_order() {
        let ds = mixed_dataset();
        let bundle = builder().recompute(
            &ds,
            &FilterState {
                radius_min: 0.0,
                radius_max: 50.0,
                ..FilterState::default()
            },
        );
        let chart = bundle.dist_temp.ready().expect("chart");
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["small", "similar", "bigger"]);
        let small = &chart.series[0];
        assert_eq!(small.points[0].x, 300.0);
        assert_eq!(small.points[0].y, 0.6);
    }

    #[test]
    fn relative_distance_is_filter_invariant() {
        let ds = mixed_dataset();
        let wide = FilterState {
            radius_min: 0.0,
            radius_max: 50.0,
            ..FilterState::default()
        };
        let narrow = FilterState {
            radius_min: 2.0,
            radius_max: 4.0,
            ..FilterState::default()
        };
        let vb = builder();
        let wide_bundle = vb.recompute(&ds, &wide);
        let narrow_bundle = vb.recompute(&ds, &narrow);

        let value_for = |bundle: &ViewBundle| {
            let hist = bundle.relative_dist.ready().expect("hist");
            hist.series
                .iter()
                .filter_map(|s| s.summary.as_ref())
                .find(|s| s.count == 1 && s.min == 1.0)
                .map(|s| s.min)
        };
        assert_eq!(value_for(&narrow_bundle), Some(1.0));
        assert!(ds.records.iter().all(|r| r.relative_dist == r.raw.a / r.raw.rstar));
        assert!(!wide_bundle.relative_dist.is_placeholder());
    }

    #[test]
    fn histogram_has_earth_marker_and_consistent_counts() {
        let ds = mixed_dataset();
        let filter = FilterState {
            radius_min: 0.0,
            radius_max: 50.0,
            ..FilterState::default()
        };
        let bundle = builder().recompute(&ds, &filter);
        let hist = bundle.relative_dist.ready().expect("hist");

        assert_eq!(hist.marker.x, 1.0);
        assert_eq!(hist.marker.label, "Earth");
        assert_eq!(hist.bin_edges.len(), 31);
        let total: usize = hist.series.iter().flat_map(|s| s.counts.iter()).sum();
        assert_eq!(total, bundle.matched);
        for s in &hist.series {
            assert_eq!(s.counts.len(), 30);
        }
    }

    #[test]
    fn table_drops_working_columns() {
        let ds = mixed_dataset();
        let bundle = builder().recompute(&ds, &init_filter_state(&ds));
        let table = bundle.table.ready().expect("table");

        assert_eq!(table.columns.first().map(String::as_str), Some(FIELD_KOI));
        assert!(table.columns.contains(&FIELD_RPLANET.to_string()));
        assert!(table.columns.contains(&"KMAG".to_string()));
        assert!(table.columns.contains(&"status".to_string()));
        for hidden in ["ROW", "relative_dist", "StarSize", "temp", "gravity"] {
            assert!(!table.columns.contains(&hidden.to_string()), "{hidden} shown");
        }
        assert!(table.rows.iter().all(|row| row.len() == table.columns.len()));
        assert_eq!(table.page_size, 40);
    }

    #[test]
    fn table_pages() {
        let table = TableData {
            title: String::new(),
            columns: vec!["KOI".to_string()],
            rows: (0..5).map(|i| vec![FieldValue::Integer(i)]).collect(),
            page_size: 2,
        };
        assert_eq!(table.page_count(), 3);
        assert_eq!(table.page(2), &[vec![FieldValue::Integer(4)]]);
        assert!(table.page(7).is_empty());
    }

    #[test]
    fn histogram_helpers() {
        let edges = histogram_edges(&[0.0, 1.0, 2.0, 4.0], 4);
        assert_eq!(edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(histogram_counts(&[0.0, 1.0, 2.0, 4.0], &edges), vec![1, 1, 1, 1]);
        assert_eq!(histogram_edges(&[2.5, 2.5], 2), vec![2.5, 3.0, 3.5]);
        assert!(histogram_edges(&[], 10).is_empty());
    }

    #[test]
    fn summary_quartiles() {
        let summary = summarize(&[4.0, 1.0, 3.0, 2.0, 5.0]).expect("summary");
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 5.0);
        assert!(summarize(&[]).is_none());
    }
}
