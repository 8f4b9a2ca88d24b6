// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polar projection for radar charts.
//!
//! Axis `i` of `N` points at `angle(i) = i·(2π/N) − π/2`, so axis 0 is at 12 o'clock and axes
//! advance clockwise in screen coordinates (y grows downward).

extern crate alloc;

use alloc::string::String;

use kurbo::{BezPath, Point, Vec2};
use smallvec::SmallVec;

#[cfg(not(feature = "std"))]
use castviz_core::FloatExt;
use castviz_core::TextAnchor;

use crate::scale::{ScaleKind, ScaleMapper};
use crate::settings::LayoutSize;

/// Shortest truncated label length, in characters.
pub const MIN_LABEL_CHARS: usize = 6;
/// Longest label length before truncation, in characters.
pub const MAX_LABEL_CHARS: usize = 30;

/// Average glyph advance as a fraction of the font size, used for label budgets.
const CHAR_WIDTH_EM: f64 = 0.6;

/// Vertex list of one radar polygon.
pub type PolarPoints = SmallVec<[Point; 16]>;

/// A placed axis label.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisLabel {
    /// Anchor position.
    pub pos: Point,
    /// Rotation in degrees around `pos`.
    pub angle_deg: f64,
    /// Horizontal anchor after the upright flip.
    pub anchor: TextAnchor,
    /// Text to draw (possibly truncated).
    pub text: String,
    /// Untruncated text when `text` was shortened.
    pub tooltip: Option<String>,
}

/// Maps category axes and magnitudes onto a radial layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolarProjector {
    center: Point,
    radius: f64,
    count: usize,
    scale: ScaleMapper,
    layout: LayoutSize,
}

impl PolarProjector {
    /// Creates a projector for `count` axes.
    ///
    /// Magnitudes in `[0, max]` map onto `[0, radius]` with a linear or logarithmic scale (a
    /// log domain is clamped).
    pub fn new(center: Point, radius: f64, count: usize, kind: ScaleKind, max: f64) -> Self {
        Self {
            center,
            radius,
            count,
            scale: ScaleMapper::new(kind, (0.0, max), (0.0, radius)),
            layout: LayoutSize::default(),
        }
    }

    /// Sets the layout size class (label distance and font).
    pub fn with_layout(mut self, layout: LayoutSize) -> Self {
        self.layout = layout;
        self
    }

    /// Center of the chart.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Outer (axis) radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Number of axes.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Radius scale.
    pub fn scale(&self) -> &ScaleMapper {
        &self.scale
    }

    /// Angular width of one axis slice.
    pub fn slice(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        core::f64::consts::TAU / self.count as f64
    }

    /// Angle of axis `i` in radians.
    pub fn angle(&self, i: usize) -> f64 {
        i as f64 * self.slice() - core::f64::consts::FRAC_PI_2
    }

    fn at(&self, i: usize, r: f64) -> Point {
        self.center + Vec2::from_angle(self.angle(i)) * r
    }

    /// Outer endpoint of axis `i`.
    pub fn axis_end(&self, i: usize) -> Point {
        self.at(i, self.radius)
    }

    /// Data point for `value` on axis `i`.
    pub fn point(&self, i: usize, value: f64) -> Point {
        let r = self.scale.map(value).clamp(0.0, self.radius);
        self.at(i, r)
    }

    /// Vertices for one value per axis, or `None` when every value is zero.
    pub fn points(&self, values: &[f64]) -> Option<PolarPoints> {
        if values.iter().all(|v| *v <= 0.0) {
            return None;
        }
        Some(
            values
                .iter()
                .take(self.count)
                .enumerate()
                .map(|(i, v)| self.point(i, *v))
                .collect(),
        )
    }

    /// Closed polygon through the data points, or `None` when every value is zero.
    pub fn polygon(&self, values: &[f64]) -> Option<BezPath> {
        let points = self.points(values)?;
        let mut path = BezPath::new();
        let mut iter = points.iter();
        let first = iter.next()?;
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
        path.close_path();
        Some(path)
    }

    /// Regular polygon through every axis at `r` (a grid ring).
    pub fn ring(&self, r: f64) -> BezPath {
        let mut path = BezPath::new();
        for i in 0..self.count {
            let p = self.at(i, r);
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        if self.count > 0 {
            path.close_path();
        }
        path
    }

    /// Distance from the center to label anchors.
    pub fn label_radius(&self) -> f64 {
        self.radius * self.layout.label_fraction()
    }

    /// Label font size.
    pub fn font_size(&self) -> f64 {
        self.layout.font_size()
    }

    /// Character budget for one label, derived from the arc each axis gets at the label radius.
    pub fn max_label_chars(&self) -> usize {
        if self.count == 0 {
            return MAX_LABEL_CHARS;
        }
        let arc = core::f64::consts::TAU * self.label_radius() / self.count as f64;
        let chars = (arc / (CHAR_WIDTH_EM * self.font_size())).floor();
        let chars = chars.clamp(MIN_LABEL_CHARS as f64, MAX_LABEL_CHARS as f64);
        #[allow(clippy::cast_possible_truncation, reason = "clamped to 6..=30")]
        {
            chars as usize
        }
    }

    /// Places the label for axis `i`.
    ///
    /// Labels read outward along their axis; in the left half-plane they are flipped by 180° and
    /// end-anchored so the text stays upright.
    pub fn label(&self, i: usize, text: &str) -> AxisLabel {
        let a = self.angle(i);
        let pos = self.at(i, self.label_radius());
        let mut angle_deg = a.to_degrees();
        let mut anchor = TextAnchor::Start;
        if Vec2::from_angle(a).x < -1e-9 {
            angle_deg += 180.0;
            anchor = TextAnchor::End;
        }
        let (text, tooltip) = truncate_label(text, self.max_label_chars());
        AxisLabel {
            pos,
            angle_deg,
            anchor,
            text,
            tooltip,
        }
    }
}

/// Shortens `text` to at most `max_chars` characters, ending in `…`.
///
/// Returns the display text and, when it was shortened, the full text for a tooltip.
pub fn truncate_label(text: &str, max_chars: usize) -> (String, Option<String>) {
    if text.chars().count() <= max_chars {
        return (text.into(), None);
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('…');
    (out, Some(text.into()))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    const EPS: f64 = 1e-9;

    fn projector(n: usize) -> PolarProjector {
        PolarProjector::new(Point::new(100.0, 100.0), 50.0, n, ScaleKind::Linear, 10.0)
    }

    #[test]
    fn four_axes_put_index_two_straight_down() {
        let p = projector(4);
        assert!((p.angle(2) - core::f64::consts::FRAC_PI_2).abs() < EPS);
        let end = p.axis_end(2);
        assert!((end.x - 100.0).abs() < EPS);
        assert!((end.y - 150.0).abs() < EPS);
        let top = p.axis_end(0);
        assert!((top.y - 50.0).abs() < EPS, "axis 0 is at 12 o'clock");
    }

    #[test]
    fn values_scale_along_the_axis() {
        let p = projector(4);
        let half = p.point(1, 5.0);
        assert!((half.x - 125.0).abs() < EPS);
        assert!((half.y - 100.0).abs() < EPS);
    }

    #[test]
    fn all_zero_values_produce_no_polygon() {
        let p = projector(3);
        assert!(p.polygon(&[0.0, 0.0, 0.0]).is_none());
        let poly = p.polygon(&[1.0, 0.0, 2.0]).unwrap();
        assert_eq!(poly.elements().len(), 4, "move, two lines, close");
    }

    #[test]
    fn left_labels_flip_upright() {
        let p = projector(4);
        let right = p.label(1, "Right");
        assert_eq!(right.anchor, TextAnchor::Start);
        let left = p.label(3, "Left");
        assert_eq!(left.anchor, TextAnchor::End);
        assert!((left.angle_deg - 360.0).abs() < 1e-6, "180° turned upright: {}", left.angle_deg);
        let top = p.label(0, "Top");
        assert_eq!(top.anchor, TextAnchor::Start);
    }

    #[test]
    fn compact_layout_pulls_labels_in() {
        let large = projector(6);
        let compact = projector(6).with_layout(LayoutSize::Compact);
        assert!(compact.label_radius() < large.label_radius());
    }

    #[test]
    fn truncation_keeps_tooltip() {
        let (text, tooltip) = truncate_label("Distributed systems", 8);
        assert_eq!(text, "Distrib…");
        assert_eq!(tooltip.as_deref(), Some("Distributed systems"));
        assert_eq!(truncate_label("Rust", 8), ("Rust".into(), None));
    }

    #[test]
    fn label_budget_shrinks_with_axis_count() {
        let few = projector(3).max_label_chars();
        let many = projector(40).max_label_chars();
        assert!(few >= many);
        assert!((MIN_LABEL_CHARS..=MAX_LABEL_CHARS).contains(&many));
    }
}
