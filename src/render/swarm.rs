//! Swarm plot of gap times
//!
//! Points of a category are spread sideways just enough not to overlap,
//! so the width of the swarm shows how many gaps share a value.

use super::FONT_FAMILY;
use crate::stats::GapSeries;
use plotters::coord::Shift;
use plotters::prelude::*;

const POINT_RADIUS: u32 = 3;

/// Horizontal offsets (in pixels) placing each value without overlap.
///
/// `y_scale` converts values to pixels. Points are placed in ascending
/// order on slots `0, +d, -d, +2d, -2d, ...` (`d` = `diameter`), taking the
/// first slot not held by a point less than one diameter lower. Slots never
/// exceed `max_offset`; a point finding no free slot is pinned to the edge
/// and allowed to overlap.
pub fn swarm_offsets(values: &[f64], y_scale: f64, diameter: f64, max_offset: f64) -> Vec<f64> {
    let ys: Vec<f64> = values.iter().map(|v| v * y_scale).collect();
    let mut order: Vec<usize> = (0..ys.len()).collect();
    order.sort_by(|&a, &b| ys[a].total_cmp(&ys[b]));

    let mut offsets = vec![0.0; values.len()];
    if diameter <= 0.0 {
        return offsets;
    }
    let max_slot = (max_offset.max(0.0) / diameter).floor() as i64;

    // (y, slot) of points on a slot, ascending y
    let mut placed: Vec<(f64, i64)> = Vec::with_capacity(values.len());
    let mut blocked: Vec<bool> = Vec::new();

    for idx in order {
        let y = ys[idx];
        let first = placed.partition_point(|&(py, _)| py <= y - diameter);
        let neighbours = &placed[first..];

        // one of the first `neighbours.len() + 1` slots is always free
        let reach = max_slot.min(neighbours.len() as i64);
        blocked.clear();
        blocked.resize((2 * reach + 1) as usize, false);
        for &(_, slot) in neighbours {
            if slot.abs() <= reach {
                blocked[(slot + reach) as usize] = true;
            }
        }

        let free = (0..=2 * reach)
            .map(|step| if step % 2 == 1 { (step + 1) / 2 } else { -(step / 2) })
            .find(|slot| !blocked[(slot + reach) as usize]);

        match free {
            Some(slot) => {
                offsets[idx] = slot as f64 * diameter;
                placed.push((y, slot));
            }
            None => {
                offsets[idx] = if idx % 2 == 0 { max_offset } else { -max_offset };
            }
        }
    }

    offsets
}

pub(super) fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[GapSeries],
    text: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let categories = series.len().max(1);
    let all = series.iter().flat_map(|s| s.seconds.iter().copied());
    let (lo, hi) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 1.0) };
    let pad = ((hi - lo) * 0.05).max(0.5);
    let (y_min, y_max) = (lo - pad, hi + pad);

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if text {
        builder
            .caption("Turn-taking gap time (seconds)", (FONT_FAMILY, 32))
            .x_label_area_size(50)
            .y_label_area_size(70);
    }
    let mut chart = builder.build_cartesian_2d(-0.5f64..categories as f64 - 0.5, y_min..y_max)?;

    if text {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories * 2 + 1)
            .x_label_formatter(&|x| {
                let nearest = x.round();
                if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
                    return String::new();
                }
                series
                    .get(nearest as usize)
                    .map(|s| s.category.clone())
                    .unwrap_or_default()
            })
            .x_desc("transition")
            .y_desc("gap time between turns (seconds)")
            .label_style((FONT_FAMILY, 16))
            .draw()?;
    }

    let (width_px, height_px) = chart.plotting_area().dim_in_pixel();
    let x_scale = width_px as f64 / categories as f64;
    let y_scale = height_px as f64 / (y_max - y_min);
    let diameter = (POINT_RADIUS * 2) as f64 + 0.5;

    for (i, s) in series.iter().enumerate() {
        let offsets = swarm_offsets(&s.seconds, y_scale, diameter, x_scale * 0.45);
        chart.draw_series(s.seconds.iter().zip(offsets).map(|(&y, dx)| {
            Circle::new((i as f64 + dx / x_scale, y), POINT_RADIUS, BLACK.filled())
        }))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separated_values_stay_centered() {
        let offsets = swarm_offsets(&[0.0, 10.0, 20.0], 1.0, 6.0, 50.0);
        assert_eq!(offsets, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_equal_values_spread_out() {
        let offsets = swarm_offsets(&[5.0, 5.0, 5.0], 1.0, 6.0, 50.0);
        assert_eq!(offsets, vec![0.0, 6.0, -6.0]);
    }

    #[test]
    fn test_no_overlap_within_limit() {
        let values: Vec<f64> = (0..40).map(|i| (i % 5) as f64 * 0.5).collect();
        let diameter = 6.0;
        let offsets = swarm_offsets(&values, 4.0, diameter, 1000.0);
        for i in 0..values.len() {
            for j in (i + 1)..values.len() {
                let dy = (values[i] - values[j]) * 4.0;
                let dx = offsets[i] - offsets[j];
                assert!(dx.hypot(dy) >= diameter - 1e-9, "points {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn test_offsets_clamped() {
        let offsets = swarm_offsets(&[1.0; 10], 1.0, 6.0, 10.0);
        assert!(offsets.iter().all(|o| o.abs() <= 10.0));
    }

    #[test]
    fn test_large_input_fills_slots_outward() {
        let values: Vec<f64> = (0..20_000).map(|i| (i % 50) as f64).collect();
        let diameter = 6.5;
        let offsets = swarm_offsets(&values, 10.0, diameter, 200.0);
        assert_eq!(offsets.len(), values.len());
        assert!(offsets.iter().all(|o| o.abs() <= 200.0));

        // 400 points per value; the first ones fill slots outward from 0
        let at_zero: Vec<f64> = values
            .iter()
            .zip(&offsets)
            .filter(|(v, _)| **v == 0.0)
            .map(|(_, o)| *o)
            .take(5)
            .collect();
        assert_eq!(at_zero, vec![0.0, 6.5, -6.5, 13.0, -13.0]);
    }

    #[test]
    fn test_empty() {
        assert!(swarm_offsets(&[], 1.0, 6.0, 10.0).is_empty());
    }
}
