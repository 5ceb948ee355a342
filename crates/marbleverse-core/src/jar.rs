//! Marble placement and milestone detection.
//!
//! Placement is approximate stacking: each marble lands in a random spot of a
//! horizontal band, on the vertical layer its ordinal falls in. No collision
//! detection; the jitter just keeps layers from looking ruled.

use rand::Rng;

use crate::{marble_id, Marble, MarbleSize, Position, DAY_MS};

/// Layout thresholds of the jar fill, kept as configuration so they can be
/// tuned and tested independently of rendering.
#[derive(Debug, Clone)]
pub struct JarLayout {
    /// Marbles per visual layer before the next band starts.
    pub layer_capacity: usize,
    /// Left edge of the safe horizontal band, in percent.
    pub x_min: f64,
    /// Width of the safe horizontal band, in percent.
    pub x_span: f64,
    /// Bottom offset of the first layer, in percent.
    pub y_base: f64,
    /// Vertical distance between layers, in percent.
    pub y_per_layer: f64,
    /// Upper bound of the random vertical offset, in percent.
    pub y_jitter: f64,
    /// Vertical cap so marbles never render above the jar shoulder.
    pub y_max: f64,
}

impl Default for JarLayout {
    fn default() -> Self {
        Self {
            layer_capacity: 8,
            x_min: 10.0,
            x_span: 75.0,
            y_base: 5.0,
            y_per_layer: 8.0,
            y_jitter: 5.0,
            y_max: 90.0,
        }
    }
}

/// One requested batch of marbles.
#[derive(Debug, Clone)]
pub struct DropSpec {
    /// Batch size, at least 1. More than 1 only for retroactive batches.
    pub count: usize,
    /// Retroactive entry ("honoring the past"): backdated, rendered muted.
    pub honoring: bool,
    /// Attached to the first marble of the batch only.
    pub note: Option<String>,
    pub color: String,
    pub category: String,
    pub label: Option<String>,
    /// Caller-selected tier. The milestone marble is forced to `Xl`.
    pub size: MarbleSize,
}

/// Planned batch: the new marbles plus the threshold they crossed, if any.
#[derive(Debug)]
pub struct DropPlan {
    pub marbles: Vec<Marble>,
    pub crossed: Option<u32>,
}

/// Milestone crossed by growing the collection from `existing` by `count`.
///
/// First catalog threshold `m` (ascending) with `existing < m <= existing +
/// count` that is not already celebrated. At most one threshold fires per
/// batch even when a large batch spans several.
pub fn crossed_milestone(
    existing: usize,
    count: usize,
    catalog: &[u32],
    celebrated: &[u32],
) -> Option<u32> {
    let total = existing + count;
    catalog.iter().copied().find(|&m| {
        let m = m as usize;
        existing < m && m <= total && !celebrated.contains(&(m as u32))
    })
}

/// Lay out a batch of new marbles on top of `existing` ones.
///
/// Ids continue the `marble-N` sequence from `first_seq`. The newest marble
/// of a milestone-crossing batch is promoted to `Xl` and flagged; everything
/// else keeps the caller-selected tier.
#[allow(clippy::too_many_arguments)]
pub fn plan_drop(
    existing: usize,
    first_seq: u64,
    spec: &DropSpec,
    catalog: &[u32],
    celebrated: &[u32],
    layout: &JarLayout,
    now: i64,
    rng: &mut impl Rng,
) -> DropPlan {
    let crossed = crossed_milestone(existing, spec.count, catalog, celebrated);
    let mut marbles = Vec::with_capacity(spec.count);

    for i in 0..spec.count {
        let x = layout.x_min + rng.random_range(0.0..layout.x_span);
        let layer = (existing + i) / layout.layer_capacity;
        let y = (layout.y_base
            + layer as f64 * layout.y_per_layer
            + rng.random_range(0.0..layout.y_jitter))
        .min(layout.y_max);

        let newest = i == spec.count - 1;
        let peak = crossed.is_some() && newest;

        marbles.push(Marble {
            id: marble_id(first_seq + i as u64),
            timestamp: if spec.honoring { now - DAY_MS * (i as i64 + 1) } else { now },
            note: if i == 0 {
                spec.note.clone().filter(|n| !n.trim().is_empty())
            } else {
                None
            },
            color: spec.color.clone(),
            position: Position { x, y },
            is_honoring: spec.honoring.then_some(true),
            category: Some(spec.category.clone()),
            label: spec.label.clone(),
            size: Some(if peak { MarbleSize::Xl } else { spec.size }),
            is_milestone: peak.then_some(true),
        });
    }

    DropPlan { marbles, crossed }
}
