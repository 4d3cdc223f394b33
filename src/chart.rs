//! Chart summaries: per-experiment (mean, min, max) and y-axis bounds
//!
//! Drawing is done in `plots`; this module only computes the numbers.

use crate::aggregate::{self, Aggregate, MetricQuery, MetricSeries};
use crate::error::{CampaignError, Result};
use crate::experiment::Experiment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One chart of a campaign: what to extract and how to title it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub query: MetricQuery,
    #[serde(default)]
    pub aggregate: Aggregate,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, query: MetricQuery) -> Self {
        Self {
            title: title.into(),
            query,
            aggregate: Aggregate::Mean,
        }
    }

    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    /// Extract and summarize over `experiments`, labelled by experiment name
    pub fn summarize<'a, I>(&self, experiments: I) -> Result<ChartData>
    where
        I: IntoIterator<Item = &'a Experiment> + Clone,
    {
        let series = self.query.extract(experiments.clone(), self.aggregate)?;
        let labels: Vec<String> = experiments.into_iter().map(|e| e.name().to_string()).collect();
        summarize(&self.title, &labels, &series)
    }
}

/// Lower-bound policy of the y axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricClass {
    /// Delivery ratios ("PDR" in the title); the axis may start above zero
    Delivery,
    /// Everything else starts at zero
    Other,
}

impl MetricClass {
    pub fn from_title(title: &str) -> Self {
        if title.contains("PDR") {
            MetricClass::Delivery
        } else {
            MetricClass::Other
        }
    }
}

/// Reduced triple of one experiment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarStats {
    pub label: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub runs: usize,
}

impl BarStats {
    pub fn from_series(label: impl Into<String>, series: &[f64]) -> Result<Self> {
        let label = label.into();
        if series.is_empty() {
            return Err(CampaignError::EmptySeries(label));
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(CampaignError::NonFiniteSeries(label));
        }
        let min = aggregate::min(series);
        let max = aggregate::max(series);
        // rounding in the sum must not push the mean outside [min, max]
        let mean = aggregate::mean(series).clamp(min, max);
        Ok(Self {
            label,
            mean,
            min,
            max,
            runs: series.len(),
        })
    }

    /// Length of the error bar below the mean
    pub fn lower_error(&self) -> f64 {
        self.mean - self.min
    }

    /// Length of the error bar above the mean
    pub fn upper_error(&self) -> f64 {
        self.max - self.mean
    }
}

/// Everything the renderer needs for one bar chart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub bars: Vec<BarStats>,
    /// `floor(min of mins) - 1`
    pub total_min: f64,
    /// `ceil(max of maxes) + 1`
    pub total_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Reduce each experiment's series and derive the axis bounds
pub fn summarize(title: &str, labels: &[String], series: &[MetricSeries]) -> Result<ChartData> {
    if labels.len() != series.len() {
        return Err(CampaignError::LabelMismatch {
            title: title.to_string(),
            labels: labels.len(),
            series: series.len(),
        });
    }
    if series.is_empty() {
        return Err(CampaignError::Config(format!("chart '{}' has no experiments", title)));
    }

    let bars = labels
        .iter()
        .zip(series)
        .map(|(label, s)| BarStats::from_series(label.clone(), s))
        .collect::<Result<Vec<_>>>()?;

    let total_min = bars.iter().map(|b| b.min).fold(f64::INFINITY, f64::min).floor() - 1.0;
    let total_max = bars.iter().map(|b| b.max).fold(f64::NEG_INFINITY, f64::max).ceil() + 1.0;

    let y_min = match MetricClass::from_title(title) {
        MetricClass::Delivery => total_min,
        MetricClass::Other => 0.0,
    };

    Ok(ChartData {
        title: title.to_string(),
        bars,
        total_min,
        total_max,
        y_min,
        y_max: total_max,
    })
}

impl ChartData {
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["experiment", "mean", "min", "max", "runs"])?;
        for bar in &self.bars {
            wtr.write_record(&[
                bar.label.clone(),
                bar.mean.to_string(),
                bar.min.to_string(),
                bar.max.to_string(),
                bar.runs.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
