use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{
    info,
    warn,
};
use plotly;

use crate::{
    types::Result,
    cli::OptProcess,
    table::Table,
};


/// Grouping columns with more categories than this produce unreadable
/// dodged bars and are rejected.
const MAX_GROUPS: usize = 10;

const DEFAULT_NBINS: f64 = 20.0;


#[derive(Debug, Args)]
/// Plot a histogram of one numeric column of a CSV file.
///
/// Bars carry their counts as labels. With --group-by, one dodged bar series
/// is drawn per category of the grouping column.
pub struct Hist {
    /// CSV data file with a header row.
    data: PathBuf,

    #[arg(short = 'c', long)]
    /// Numeric column to histogram.
    column: String,

    #[arg(short = 'g', long)]
    /// Categorical column to group bars by; at most 10 distinct values.
    group_by: Option<String>,

    #[arg(long)]
    /// Lower bound of the value range. Defaults to the column's observed minimum.
    min: Option<f64>,

    #[arg(long)]
    /// Upper bound of the value range (inclusive). Defaults to the observed maximum.
    max: Option<f64>,

    #[arg(long)]
    /// Bin width. Defaults to a twentieth of the range.
    bin_width: Option<f64>,

    #[arg(long, default_value = "960")]
    /// Plot width in pixels.
    width: usize,

    #[arg(long, default_value = "600")]
    /// Plot height in pixels.
    height: usize,

    #[arg(short = 'o', long, default_value = "hist.html")]
    /// Write the plot to html and view it in the web browser.
    htmlout: PathBuf,

    #[arg(long)]
    /// Also export a static image named `<column>.png`.
    png: bool,

    #[arg(long)]
    /// Open default browser to see the plot immediately.
    show: bool,
}


impl OptProcess for Hist {
    fn process(&self) -> Result<()> {
        info!("Reading table from {:?} ...", &self.data);
        let table = Table::from_csv(&self.data)?;

        let cells = table.column(&self.column)?;
        let labels = match &self.group_by {
            Some(group) => {
                let labels = table.column(group)?;
                let ndistinct = labels.iter().unique().count();
                if ndistinct > MAX_GROUPS {
                    bail!("Column '{}' has {} distinct values; grouping is limited to {}.",
                          group, ndistinct, MAX_GROUPS);
                }
                labels
            },
            None => vec![""; cells.len()],
        };

        let mut samples = Vec::new();
        for (cell, label) in cells.iter().zip(labels.iter()) {
            match cell.parse::<f64>() {
                Ok(v) => samples.push((v, *label)),
                Err(_) if cell.is_empty() => {},
                Err(_) => warn!("Skipping non-numeric cell '{}' in column '{}'.",
                                cell, self.column),
            }
        }
        if samples.is_empty() {
            bail!("Column '{}' contains no numeric values.", self.column);
        }

        let observed_min = samples.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
        let observed_max = samples.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
        let min = self.min.unwrap_or(observed_min);
        let max = self.max.unwrap_or(observed_max);
        if min > max {
            bail!("Invalid range: min {} exceeds max {}.", min, max);
        }

        let bin_width = self.bin_width.unwrap_or_else(|| {
            if max > min { (max - min) / DEFAULT_NBINS } else { 1.0 }
        });
        if !(bin_width > 0.0) {
            bail!("Bin width must be positive, got {}.", bin_width);
        }

        let (centers, counts) = bin_samples(&samples, min, max, bin_width);

        let mut plot = plotly::Plot::new();
        for (label, group_counts) in counts.iter() {
            let texts = group_counts.iter().map(|c| c.to_string()).collect::<Vec<_>>();
            let trace = plotly::Bar::new(centers.clone(), group_counts.clone())
                .name(label)
                .text_array(texts)
                .text_position(plotly::common::TextPosition::Outside);
            plot.add_trace(trace);
        }
        plot.use_local_plotly();

        let layout = plotly::Layout::new()
            .title(plotly::common::Title::new(&format!("Histogram of {}", self.column)))
            .bar_mode(plotly::layout::BarMode::Group)
            .width(self.width)
            .height(self.height)
            .x_axis(plotly::layout::Axis::new()
                    .title(plotly::common::Title::new(&self.column)))
            .y_axis(plotly::layout::Axis::new()
                    .title(plotly::common::Title::new("Count"))
                    .zero_line(true));
        plot.set_layout(layout);

        info!("Writing to {:?}", self.htmlout);
        plot.to_html(&self.htmlout);

        if self.png {
            let pngout = PathBuf::from(format!("{}.png", self.column));
            info!("Writing to {:?}", pngout);
            plot.save(pngout, plotly::ImageFormat::PNG,
                      self.width, self.height, 1.0);
        }

        if self.show {
            plot.show();
        }

        Ok(())
    }
}


/// Bins samples into `[min + i*w, min + (i+1)*w)`, the last bin inclusive of
/// `max`; samples outside the inclusive range are dropped. Returns the bin
/// centers and per-group counts, groups in first-appearance order.
fn bin_samples(samples: &[(f64, &str)], min: f64, max: f64, width: f64)
    -> (Vec<f64>, IndexMap<String, Vec<u64>>)
{
    let nbins = (((max - min) / width).ceil() as usize).max(1);
    let centers = (0 .. nbins)
        .map(|i| min + (i as f64 + 0.5) * width)
        .collect::<Vec<_>>();

    let mut counts: IndexMap<String, Vec<u64>> = IndexMap::new();
    for &(v, label) in samples {
        if v < min || v > max {
            continue;
        }
        let mut idx = ((v - min) / width) as usize;
        if idx >= nbins {
            idx = nbins - 1;
        }
        counts.entry(label.to_string())
              .or_insert_with(|| vec![0; nbins])[idx] += 1;
    }

    (centers, counts)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_samples_single_group() {
        let samples = [(0.5, ""), (1.5, ""), (1.7, ""), (4.0, ""), (9.0, "")];
        let (centers, counts) = bin_samples(&samples, 0.0, 4.0, 1.0);

        assert_eq!(centers, vec![0.5, 1.5, 2.5, 3.5]);
        // 4.0 lands in the final, max-inclusive bin; 9.0 is out of range
        assert_eq!(counts[""], vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_bin_samples_groups_keep_order() {
        let samples = [(0.1, "b"), (0.2, "a"), (0.3, "b")];
        let (_, counts) = bin_samples(&samples, 0.0, 1.0, 0.5);

        let groups = counts.keys().cloned().collect::<Vec<_>>();
        assert_eq!(groups, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(counts["b"], vec![2, 0]);
        assert_eq!(counts["a"], vec![1, 0]);
    }

    #[test]
    fn test_bin_samples_degenerate_range() {
        let samples = [(2.0, ""), (2.0, "")];
        let (centers, counts) = bin_samples(&samples, 2.0, 2.0, 1.0);
        assert_eq!(centers.len(), 1);
        assert_eq!(counts[""], vec![2]);
    }
}
