// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inverse mapping from pointer positions to data entities.

#[cfg(not(feature = "std"))]
use castviz_core::FloatExt;
use castviz_core::{TimeBucket, rem_euclid};
use kurbo::{BezPath, Point, Rect, Shape};

use crate::scale::ScaleLinear;

/// Padding added around box-plot cells for their hit rectangles.
pub const HIT_PADDING: f64 = 4.0;
/// Minimum width of a box-plot hit rectangle.
pub const MIN_HIT_WIDTH: f64 = 10.0;

/// Returns the radar axis nearest to `point` by angle alone.
///
/// The pointer angle is measured clockwise from 12 o'clock, divided by the slice width and
/// rounded half-up, so a pointer exactly between two axes resolves to the later one.
pub fn polar_index(center: Point, point: Point, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let d = point - center;
    if d.hypot2() == 0.0 {
        return None;
    }
    let tau = core::f64::consts::TAU;
    let angle = rem_euclid(d.atan2() + core::f64::consts::FRAC_PI_2, tau);
    let t = angle / (tau / count as f64);
    // The epsilon absorbs rounding noise so exact midpoints still go up.
    let k = (t + 0.5 + 1e-9).floor();
    #[allow(clippy::cast_possible_truncation, reason = "angle is in [0, 2π)")]
    let k = k as usize;
    Some(k % count)
}

/// Returns the index of the topmost band (last in `paths`) containing `point`.
pub fn band_at<'a>(paths: impl IntoIterator<Item = &'a BezPath>, point: Point) -> Option<usize> {
    let mut hit = None;
    for (i, path) in paths.into_iter().enumerate() {
        if path.contains(point) {
            hit = Some(i);
        }
    }
    hit
}

/// Returns the included bucket nearest to pixel `x` on a bucket-value scale.
pub fn nearest_bucket(scale: &ScaleLinear, x: f64, included: &[TimeBucket]) -> Option<TimeBucket> {
    let value = scale.invert(x);
    included.iter().copied().min_by(|a, b| {
        (a.as_f64() - value)
            .abs()
            .total_cmp(&(b.as_f64() - value).abs())
    })
}

/// Pads a cell rectangle into its hit rectangle.
///
/// The rectangle grows by [`HIT_PADDING`] on every side and is widened around its center to at
/// least [`MIN_HIT_WIDTH`].
pub fn hit_rect(cell: Rect) -> Rect {
    let r = cell.abs().inflate(HIT_PADDING, HIT_PADDING);
    if r.width() >= MIN_HIT_WIDTH {
        return r;
    }
    let cx = r.center().x;
    Rect::new(
        cx - MIN_HIT_WIDTH / 2.0,
        r.y0,
        cx + MIN_HIT_WIDTH / 2.0,
        r.y1,
    )
}

/// Returns the index of the topmost (last) rectangle containing `point`.
///
/// Overlapping hit rectangles resolve to the cell drawn last.
pub fn rect_at(rects: &[Rect], point: Point) -> Option<usize> {
    rects.iter().rposition(|r| r.contains(point))
}
