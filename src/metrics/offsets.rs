use serde::{Deserialize, Serialize};

use crate::config::DotPlotConfig;

/// Vertical offsets that keep dot-plot circles of `radius` from overlapping.
///
/// Points are placed in input order at `x = scale(duration)`, starting at
/// `y = 0`. A point that overlaps an already placed one is lifted to sit on top
/// of it (plus `epsilon`), and the check repeats against every placed point
/// until it is clear of all of them. Offsets are parallel to `durations`.
pub fn collision_free_offsets<F>(durations: &[f64], radius: f64, epsilon: f64, scale: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    let diameter = 2.0 * radius;
    let mut placed: Vec<(f64, f64)> = Vec::with_capacity(durations.len());

    for &duration in durations {
        let x = scale(duration);
        let mut y = 0.0_f64;
        loop {
            let mut moved = false;
            for &(px, py) in &placed {
                let dx = (x - px).abs();
                let dy = y - py;
                if dx < diameter && dx * dx + dy * dy < diameter * diameter {
                    let lifted = py + (diameter * diameter - dx * dx).sqrt() + epsilon;
                    // rounding can leave a point touching from below; only ever move up
                    if lifted > y {
                        y = lifted;
                        moved = true;
                    }
                }
            }
            if !moved {
                break;
            }
        }
        placed.push((x, y));
    }

    placed.into_iter().map(|(_, y)| y).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DotLayout {
    pub radius: f64,
    pub offsets: Vec<f64>,
}

impl DotLayout {
    /// Distance from the bottom of the lowest circle to the top of the highest.
    pub fn height(&self) -> f64 {
        match self.offsets.iter().copied().reduce(f64::max) {
            Some(top) => top + 2.0 * self.radius,
            None => 0.0,
        }
    }
}

/// Shrink the dot radius until the stacked dots fit in `max_height`, `min_radius` is
/// reached, or `max_iterations` shrink steps have been taken.
pub fn fit_dot_radius<F>(durations: &[f64], config: &DotPlotConfig, scale: F) -> DotLayout
where
    F: Fn(f64) -> f64,
{
    let layout_at = |radius: f64| DotLayout {
        radius,
        offsets: collision_free_offsets(durations, radius, config.epsilon, &scale),
    };

    let mut layout = layout_at(config.radius);
    for _ in 0..config.max_iterations {
        let next = layout.radius - config.radius_step;
        // NaN steps and steps below the radius' precision make no progress
        if layout.height() <= config.max_height || !(next < layout.radius) || next < config.min_radius {
            break;
        }
        tracing::debug!(radius = layout.radius, height = layout.height(), "Dot plot too tall, shrinking radius");
        layout = layout_at(next);
    }
    layout
}
