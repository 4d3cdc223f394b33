//! Bar charts with asymmetric error bars
//!
//! One chart per metric: a bar per experiment at the mean of its per-run
//! values, an error bar from the smallest to the largest run value.
//! Charts are written as SVG next to a JSON and CSV dump of the same data.

use crate::chart::ChartData;
use crate::error::{CampaignError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};
use tracing::info;

const SIZE: (u32, u32) = (1024, 640);
const BAR_STYLE: RGBColor = RGBColor(0x1f, 0x77, 0xb4);

/// Files written for one chart
#[derive(Clone, Debug, PartialEq)]
pub struct ChartFiles {
    pub svg: PathBuf,
    pub json: PathBuf,
    pub csv: PathBuf,
}

/// `plot <title>`, with path separators replaced
pub fn chart_stem(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("plot {}", safe)
}

/// Write `plot <title>.svg/.json/.csv` into `outdir`
pub fn export_chart(data: &ChartData, outdir: &Path) -> Result<ChartFiles> {
    std::fs::create_dir_all(outdir)?;
    let stem = chart_stem(&data.title);
    let files = ChartFiles {
        svg: outdir.join(format!("{}.svg", stem)),
        json: outdir.join(format!("{}.json", stem)),
        csv: outdir.join(format!("{}.csv", stem)),
    };

    // numbers are on disk even if rendering fails
    data.save_json(&files.json)?;
    data.save_csv(&files.csv)?;
    render_svg(data, &files.svg)?;

    info!("wrote {}", files.svg.display());
    Ok(files)
}

pub fn render_svg(data: &ChartData, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error(path))?;
    draw_bars(data, &root).map_err(plot_error(path))?;
    root.present().map_err(plot_error(path))?;
    Ok(())
}

fn plot_error<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> CampaignError + '_ {
    move |e| CampaignError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn draw_bars<DB: DrawingBackend>(
    data: &ChartData,
    area: &DrawingArea<DB, Shift>,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let n = data.bars.len();
    if n == 0 {
        return Ok(());
    }
    let labels: Vec<&str> = data.bars.iter().map(|b| b.label.as_str()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(&data.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        // integer ranges are inclusive: 0..=n-1 gives one segment per bar
        .build_cartesian_2d((0..n.saturating_sub(1)).into_segmented(), data.y_min..data.y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc(data.title.as_str())
        .label_style(("sans-serif", 14))
        .draw()?;

    let y_min = data.y_min;
    chart.draw_series(data.bars.iter().enumerate().map(|(i, bar)| {
        Rectangle::new(
            [(SegmentValue::Exact(i), y_min), (right_edge(i, n), bar.mean)],
            BAR_STYLE.mix(0.8).filled(),
        )
    }))?;
    chart.draw_series(data.bars.iter().enumerate().map(|(i, bar)| {
        Rectangle::new(
            [(SegmentValue::Exact(i), y_min), (right_edge(i, n), bar.mean)],
            BLACK.stroke_width(1),
        )
    }))?;
    chart.draw_series(data.bars.iter().enumerate().map(|(i, bar)| {
        ErrorBar::new_vertical(SegmentValue::CenterOf(i), bar.min, bar.mean, bar.max, BLACK.filled(), 12)
    }))?;

    Ok(())
}

fn right_edge(i: usize, n: usize) -> SegmentValue<usize> {
    if i + 1 == n {
        SegmentValue::Last
    } else {
        SegmentValue::Exact(i + 1)
    }
}
