use clap::ValueEnum;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::FieldNames;
use crate::dataset::TrafficDataset;
use crate::error::PipelineResult;
use crate::matching::alias::AliasTable;
use crate::matching::types::{AggregatedMetrics, CanonicalName, TrafficMetrics};

/// How the values of one canonical road are reduced to a single number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Aggregation {
    #[default]
    Mean,
    Median,
    Sum,
    Min,
    Max,
    First,
    Last,
}

impl Aggregation {
    /// Reduces `values`. Returns 0.0 for empty input.
    pub fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            Aggregation::Mean => mean(values),
            Aggregation::Median => median(values),
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::First => values[0],
            Aggregation::Last => values[values.len() - 1],
        }
    }
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[derive(Default)]
struct Series {
    volume: Vec<f64>,
    speed: Vec<f64>,
    congestion: Vec<f64>,
}

/// Groups the dataset by canonical road name and aggregates its metrics.
///
/// Every key in the result has at least one contributing row. Blank numeric
/// cells are skipped; a group whose cells are all blank aggregates to 0.0.
///
/// # Errors
///
/// Returns [`MissingField`](crate::PipelineError::MissingField) if the name or
/// volume column is absent.
pub fn aggregate(
    dataset: &TrafficDataset,
    fields: &FieldNames,
    aliases: &AliasTable,
    agg: Aggregation,
) -> PipelineResult<AggregatedMetrics> {
    let records = dataset.records(fields)?;
    let has_speed = dataset.has_column(&fields.speed);
    let has_congestion = dataset.has_column(&fields.congestion);

    let mut groups: BTreeMap<CanonicalName, Series> = BTreeMap::new();
    for record in &records {
        let series = groups
            .entry(aliases.canonicalize(record.name.as_deref()))
            .or_default();
        series.volume.extend(record.volume);
        series.speed.extend(record.average_speed);
        series.congestion.extend(record.congestion_level);
    }

    let metrics: AggregatedMetrics = groups
        .into_iter()
        .map(|(name, series)| {
            let metrics = TrafficMetrics {
                volume: agg.apply(&series.volume),
                average_speed: has_speed.then(|| agg.apply(&series.speed)),
                congestion_level: has_congestion.then(|| agg.apply(&series.congestion)),
            };
            (name, metrics)
        })
        .collect();

    debug!(
        rows = records.len(),
        roads = metrics.len(),
        ?agg,
        "Aggregated traffic by road name"
    );
    Ok(metrics)
}
