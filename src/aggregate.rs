//! Metric extraction and aggregation
//!
//! For every experiment and every per-trial run, node values are collected
//! (summary rows skipped), reduced to one scalar with an aggregate function,
//! and for paired metrics combined with a binary function. The output is one
//! series of per-run scalars per experiment.

use crate::error::{CampaignError, Result};
use crate::experiment::Experiment;
use crate::results::{MetricValue, NodeStats, RunResults};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-run scalars of one experiment, in run order
pub type MetricSeries = Vec<f64>;

/// Arithmetic mean; 0.0 for an empty sequence
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Largest value; 0.0 for an empty sequence
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Smallest value; 0.0 for an empty sequence
pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

/// Packet delivery ratio in percent from lost/received counts
pub fn pdr(lost: f64, received: f64) -> f64 {
    if lost + received != 0.0 {
        100.0 * (1.0 - lost / (lost + received))
    } else {
        0.0
    }
}

/// Parent acknowledgement ratio in percent from acked/transmitted counts
pub fn par(acked: f64, transmitted: f64) -> f64 {
    if transmitted != 0.0 {
        100.0 * acked / transmitted
    } else {
        0.0
    }
}

/// Extract one metric per node; `null` values become `default`.
pub fn extract_metric<'a, I, A>(experiments: I, metric: &str, default: f64, aggregate: A) -> Result<Vec<MetricSeries>>
where
    I: IntoIterator<Item = &'a Experiment>,
    A: Fn(&[f64]) -> f64,
{
    let mut results = Vec::new();
    for exp in experiments {
        let tree = exp.results()?;
        let mut series = MetricSeries::with_capacity(tree.run_count());
        for run in tree.runs() {
            let mut values = Vec::new();
            for node in run.nodes() {
                let value = node_value(exp, run, node, metric)?.unwrap_or(default);
                values.push(value);
            }
            debug!("{} run {} {}: {:?}", exp.name(), run.id, metric, values);
            series.push(aggregate(&values));
        }
        results.push(series);
    }
    Ok(results)
}

/// Extract two metrics per node, aggregate each per run, then combine the
/// two aggregates. `null` values count as 0.0. `combine` must guard its own
/// division.
pub fn extract_metrics<'a, I, C, A>(
    experiments: I,
    metric1: &str,
    metric2: &str,
    combine: C,
    aggregate: A,
) -> Result<Vec<MetricSeries>>
where
    I: IntoIterator<Item = &'a Experiment>,
    C: Fn(f64, f64) -> f64,
    A: Fn(&[f64]) -> f64,
{
    let mut results = Vec::new();
    for exp in experiments {
        let tree = exp.results()?;
        let mut series = MetricSeries::with_capacity(tree.run_count());
        for run in tree.runs() {
            let mut values1 = Vec::new();
            let mut values2 = Vec::new();
            for node in run.nodes() {
                values1.push(node_value(exp, run, node, metric1)?.unwrap_or(0.0));
                values2.push(node_value(exp, run, node, metric2)?.unwrap_or(0.0));
            }
            debug!(
                "{} run {} {}/{}: {:?} {:?}",
                exp.name(),
                run.id,
                metric1,
                metric2,
                values1,
                values2
            );
            series.push(combine(aggregate(&values1), aggregate(&values2)));
        }
        results.push(series);
    }
    Ok(results)
}

/// `Ok(None)` for a null value; absent keys are a hard failure since they
/// mean the results do not match the requested metric name.
fn node_value(exp: &Experiment, run: &RunResults, node: &NodeStats, metric: &str) -> Result<Option<f64>> {
    match node.metric(metric) {
        Some(MetricValue::Number(v)) => Ok(Some(*v)),
        Some(MetricValue::Null) => Ok(None),
        Some(MetricValue::NonNumeric) => Err(CampaignError::ResultsShape(format!(
            "metric '{}' of node {} in run {} of {} is not a number",
            metric,
            node.id,
            run.id,
            exp.name()
        ))),
        None => Err(CampaignError::MissingMetric {
            experiment: exp.name().to_string(),
            run: run.id.clone(),
            node: node.id.clone(),
            metric: metric.to_string(),
        }),
    }
}

/// Named node-level reduction, selectable from a campaign config
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    #[default]
    Mean,
    Max,
    Min,
}

impl Aggregate {
    pub fn as_fn(self) -> fn(&[f64]) -> f64 {
        match self {
            Aggregate::Mean => mean,
            Aggregate::Max => max,
            Aggregate::Min => min,
        }
    }
}

/// Named combination of two per-run aggregates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// `100 * (1 - a / (a + b))`, 0 when `a + b == 0`
    Pdr,
    /// `100 * a / b`, 0 when `b == 0`
    Par,
}

impl Combine {
    pub fn as_fn(self) -> fn(f64, f64) -> f64 {
        match self {
            Combine::Pdr => pdr,
            Combine::Par => par,
        }
    }
}

/// What to pull out of the results for one chart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricQuery {
    Single {
        metric: String,
        default: f64,
    },
    Paired {
        metric1: String,
        metric2: String,
        combine: Combine,
    },
}

impl MetricQuery {
    pub fn single(metric: impl Into<String>, default: f64) -> Self {
        MetricQuery::Single {
            metric: metric.into(),
            default,
        }
    }

    pub fn paired(metric1: impl Into<String>, metric2: impl Into<String>, combine: Combine) -> Self {
        MetricQuery::Paired {
            metric1: metric1.into(),
            metric2: metric2.into(),
            combine,
        }
    }

    pub fn extract<'a, I>(&self, experiments: I, aggregate: Aggregate) -> Result<Vec<MetricSeries>>
    where
        I: IntoIterator<Item = &'a Experiment>,
    {
        match self {
            MetricQuery::Single { metric, default } => {
                extract_metric(experiments, metric, *default, aggregate.as_fn())
            }
            MetricQuery::Paired {
                metric1,
                metric2,
                combine,
            } => extract_metrics(experiments, metric1, metric2, combine.as_fn(), aggregate.as_fn()),
        }
    }
}
