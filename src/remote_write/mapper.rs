//! Flattening of registry metric families into uniform series.

use crate::core::{BucketSample, MetricFamily, Sample, Series, SeriesLabels, METRIC_NAME_LABEL};
use std::collections::BTreeMap;

/// Map a registry snapshot to the series pushed over remote write.
///
/// Counters and gauges become one series each carrying all their samples.
/// Histograms and summaries become one single-point series per bucket or
/// quantile sample.
pub fn map_families(families: &[MetricFamily]) -> Vec<Series> {
    let mut series = Vec::with_capacity(families.len());

    for family in families {
        match family {
            MetricFamily::Counter {
                name,
                labels,
                values,
            }
            | MetricFamily::Gauge {
                name,
                labels,
                values,
            } => series.push(scalar_series(name, labels.as_ref(), values)),
            MetricFamily::Histogram { values, .. } => {
                series.extend(values.iter().map(|sample| bucket_series(sample, None)));
            },
            MetricFamily::Summary { name, values } => {
                // Overall sum/count samples may come without a per-sample name.
                series.extend(values.iter().map(|sample| bucket_series(sample, Some(name.as_str()))));
            },
        }
    }

    series
}

fn scalar_series(
    name: &str,
    labels: Option<&BTreeMap<String, String>>,
    values: &[Sample],
) -> Series {
    let mut labels = labels.cloned().unwrap_or_default();
    labels.insert(METRIC_NAME_LABEL.to_string(), name.to_string());

    Series {
        labels: SeriesLabels::Map(labels),
        samples: values.to_vec(),
    }
}

fn bucket_series(sample: &BucketSample, fallback_name: Option<&str>) -> Series {
    let mut labels = sample.labels.clone();

    match sample.metric_name.as_deref().or(fallback_name) {
        Some(name) => {
            labels.insert(METRIC_NAME_LABEL.to_string(), name.to_string());
        },
        None => {
            labels.remove(METRIC_NAME_LABEL);
        },
    }

    Series {
        labels: SeriesLabels::Map(labels),
        samples: vec![Sample::new(sample.value)],
    }
}
