//! Horizontal bar chart

use super::{BAR_COLOR, FONT_FAMILY};
use crate::stats::ButtonCount;
use plotters::coord::Shift;
use plotters::prelude::*;

pub(super) fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    counts: &[ButtonCount],
    text: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    // bottom-up: the most pressed button ends up on top
    let bars: Vec<&ButtonCount> = counts.iter().rev().collect();
    let rows = bars.len().max(1);
    let max_count = bars.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if text {
        builder
            .caption("Canine button presses", (FONT_FAMILY, 32))
            .x_label_area_size(40)
            .y_label_area_size(140);
    }
    let mut chart =
        builder.build_cartesian_2d(0f64..max_count * 1.05, (0usize..rows).into_segmented())?;

    if text {
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(rows)
            .y_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => bars
                    .get(*i)
                    .map(|b| b.content.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc("presses")
            .label_style((FONT_FAMILY, 16))
            .draw()?;
    }

    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let mut rect = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(i)),
                (bar.count as f64, SegmentValue::Exact(i + 1)),
            ],
            BAR_COLOR.filled(),
        );
        rect.set_margin(2, 2, 0, 0);
        rect
    }))?;

    Ok(())
}
