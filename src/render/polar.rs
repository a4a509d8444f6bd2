//! Clock-face histogram
//!
//! One wedge per hour, midnight at the top, hours running clockwise. Wedge
//! length is proportional to the count for that hour.

use super::{BAR_COLOR, FONT_FAMILY};
use crate::stats::HOURS_PER_DAY;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::TAU;

const ARC_STEPS: usize = 8;
const RINGS: usize = 4;

/// Point at `radius` and clockwise angle `theta` from twelve o'clock
fn polar_point(radius: f64, theta: f64) -> (f64, f64) {
    (radius * theta.sin(), radius * theta.cos())
}

fn wedge(inner: f64, outer: f64, theta0: f64, theta1: f64) -> Vec<(f64, f64)> {
    let arc = |radius: f64, from: f64, to: f64| {
        (0..=ARC_STEPS).map(move |i| {
            let t = from + (to - from) * i as f64 / ARC_STEPS as f64;
            polar_point(radius, t)
        })
    };
    arc(outer, theta0, theta1)
        .chain(arc(inner, theta1, theta0))
        .collect()
}

pub(super) fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    bins: &[usize; HOURS_PER_DAY],
    text: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let area = if text {
        root.titled("Canine presses by time of day", (FONT_FAMILY, 32))?
    } else {
        root.margin(0, 0, 0, 0)
    };
    let (w, h) = area.dim_in_pixel();
    let side = w.min(h);
    let square = area.shrink(((w - side) / 2, (h - side) / 2), (side, side));

    let max_count = bins.iter().copied().max().unwrap_or(0).max(1) as f64;
    let inner = max_count * 0.1;
    let outer = inner + max_count;
    let label_radius = outer * 1.1;
    let extent = outer * 1.25;

    let mut chart = ChartBuilder::on(&square)
        .margin(10)
        .build_cartesian_2d(-extent..extent, -extent..extent)?;

    let grid = BLACK.mix(0.15);
    for ring in 1..=RINGS {
        let radius = inner + max_count * ring as f64 / RINGS as f64;
        let circle: Vec<(f64, f64)> = (0..=HOURS_PER_DAY * ARC_STEPS)
            .map(|i| polar_point(radius, TAU * i as f64 / (HOURS_PER_DAY * ARC_STEPS) as f64))
            .collect();
        chart.draw_series(std::iter::once(PathElement::new(circle, grid)))?;
    }
    for tick in (0..HOURS_PER_DAY).step_by(3) {
        let theta = TAU * tick as f64 / HOURS_PER_DAY as f64;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![polar_point(inner, theta), polar_point(outer, theta)],
            grid,
        )))?;
    }

    let bin_width = TAU / HOURS_PER_DAY as f64;
    chart.draw_series(
        bins.iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(hour, &count)| {
                let theta0 = bin_width * hour as f64;
                Polygon::new(
                    wedge(inner, inner + count as f64, theta0, theta0 + bin_width),
                    BAR_COLOR.mix(0.85).filled(),
                )
            }),
    )?;

    if text {
        let style = TextStyle::from((FONT_FAMILY, 20).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series((0..HOURS_PER_DAY).step_by(3).map(|hour| {
            let theta = TAU * hour as f64 / HOURS_PER_DAY as f64;
            Text::new(format!("{}:00", hour), polar_point(label_radius, theta), style.clone())
        }))?;
    }

    Ok(())
}
