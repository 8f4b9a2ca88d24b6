// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radar (polar) comparison chart.
//!
//! One axis per active category and one polygon per included bucket. Polygons are identified by
//! their overlay slot rather than their bucket, so stepping playback from one year to the next
//! morphs the existing polygon in place.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use castviz_core::{
    Category, CategoryId, CategoryPalette, Mark, MarkId, Matrix, Primitive, TextPrimitive,
    TimeBucket,
};
use kurbo::{BezPath, Circle, Line, Point, Shape};
use peniko::Color;

use crate::geometry::{ChartGeometry, Highlight, LayoutFrame, Placeholder};
use crate::hit::polar_index;
use crate::interaction::Entity;
use crate::polar::{PolarPoints, PolarProjector};
use crate::scale::ScaleKind;
use crate::settings::{LayoutSize, Theme};
use crate::z_order;

const RING_IDS: u64 = 100;
const AXIS_IDS: u64 = 1_000;
const LABEL_IDS: u64 = 2_000;
const POLYGON_IDS: u64 = 3_000;
const POINT_IDS: u64 = 10_000;
const POINTS_PER_SLOT: u64 = 1_000;

const RING_COUNT: usize = 4;
const POINT_RADIUS: f64 = 3.0;
const POLYGON_FILL_ALPHA: f32 = 0.2;

#[derive(Clone, Debug)]
struct Overlay {
    bucket: TimeBucket,
    path: BezPath,
    points: PolarPoints,
}

#[derive(Clone, Debug)]
struct RadarLayout {
    projector: PolarProjector,
    axes: Vec<CategoryId>,
    overlays: Vec<Overlay>,
    latest: TimeBucket,
}

/// Radar chart geometry over a bucket × category matrix.
#[derive(Clone, Debug)]
pub struct RadarChart {
    matrix: Matrix,
    categories: Vec<Category>,
    scale: ScaleKind,
    layout_size: LayoutSize,
    theme: Theme,
    layout: Option<RadarLayout>,
}

impl RadarChart {
    /// Creates a radar chart. Category colors follow the matrix column rank.
    pub fn new(matrix: Matrix) -> Self {
        let categories = CategoryPalette::assign(matrix.categories(), |_| None);
        Self {
            matrix,
            categories,
            scale: ScaleKind::default(),
            layout_size: LayoutSize::default(),
            theme: Theme::default(),
            layout: None,
        }
    }

    /// Uses display names for axis labels; ids without a name are shown as-is.
    pub fn with_names(mut self, names: &BTreeMap<CategoryId, String>) -> Self {
        self.categories = CategoryPalette::assign(self.matrix.categories(), |id| {
            names.get(id).map(String::as_str)
        });
        self
    }

    /// Sets the radius scale kind.
    pub fn with_scale(mut self, scale: ScaleKind) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the layout size class.
    pub fn with_layout(mut self, layout: LayoutSize) -> Self {
        self.layout_size = layout;
        self
    }

    /// Sets the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// The projector of the last layout.
    pub fn projector(&self) -> Option<&PolarProjector> {
        self.layout.as_ref().map(|l| &l.projector)
    }

    fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    fn color(&self, id: &CategoryId) -> Color {
        self.category(id).map_or(self.theme.text(), |c| c.color)
    }
}

impl ChartGeometry for RadarChart {
    fn categories(&self) -> Vec<CategoryId> {
        self.matrix.categories().to_vec()
    }

    fn buckets(&self) -> Vec<TimeBucket> {
        self.matrix.buckets().to_vec()
    }

    fn layout(&mut self, frame: &LayoutFrame<'_>) -> Option<Placeholder> {
        self.layout = None;
        let axes = frame.categories.to_vec();
        let Some(latest) = frame.included.last().copied() else {
            return Some(Placeholder::NoData);
        };
        if axes.is_empty() {
            return Some(Placeholder::NoData);
        }

        let rows: Vec<(TimeBucket, Vec<f64>)> = frame
            .included
            .iter()
            .map(|b| (*b, axes.iter().map(|c| self.matrix.value(*b, c)).collect()))
            .collect();
        let max = rows
            .iter()
            .flat_map(|(_, v)| v.iter().copied())
            .fold(0.0, f64::max);
        if max <= 0.0 {
            return Some(Placeholder::NoData);
        }

        let plot = frame.plot;
        let label_room = self.layout_size.label_fraction() + 0.1;
        let radius = 0.5 * plot.width().min(plot.height()) / label_room;
        let projector = PolarProjector::new(plot.center(), radius, axes.len(), self.scale, max)
            .with_layout(self.layout_size);

        let overlays = rows
            .iter()
            .filter_map(|(bucket, values)| {
                let points = projector.points(values)?;
                let path = projector.polygon(values)?;
                Some(Overlay {
                    bucket: *bucket,
                    path,
                    points,
                })
            })
            .collect();

        self.layout = Some(RadarLayout {
            projector,
            axes,
            overlays,
            latest,
        });
        None
    }

    fn marks(&self, highlight: &Highlight<'_>) -> Vec<Mark> {
        let Some(layout) = &self.layout else {
            return Vec::new();
        };
        let p = &layout.projector;
        let mut out = Vec::new();

        for k in 1..=RING_COUNT {
            let r = p.radius() * k as f64 / RING_COUNT as f64;
            out.push(
                Mark::new(
                    MarkId::from_raw(RING_IDS).offset(k as u64),
                    z_order::GRID_LINES,
                    Primitive::Path(p.ring(r)),
                    Color::TRANSPARENT,
                )
                .with_stroke(self.theme.grid(), 1.0),
            );
        }

        for (i, id) in layout.axes.iter().enumerate() {
            let opacity = highlight.opacity(id);
            out.push(
                Mark::new(
                    MarkId::from_raw(AXIS_IDS).offset(i as u64),
                    z_order::GRID_LINES,
                    Primitive::Line(Line::new(p.center(), p.axis_end(i))),
                    Color::TRANSPARENT,
                )
                .with_stroke(self.theme.grid(), 1.0),
            );
            let name = self.category(id).map_or(id.as_str(), |c| c.name.as_str());
            let label = p.label(i, name);
            out.push(
                Mark::new(
                    MarkId::from_raw(LABEL_IDS).offset(i as u64),
                    z_order::LABELS,
                    Primitive::Text(TextPrimitive {
                        pos: label.pos,
                        text: label.text,
                        tooltip: label.tooltip,
                        font_size: p.font_size(),
                        angle: label.angle_deg,
                        anchor: label.anchor,
                    }),
                    self.theme.text(),
                )
                .with_opacity(opacity),
            );
        }

        let overlay_count = layout.overlays.len();
        for (slot, overlay) in layout.overlays.iter().enumerate() {
            // Older overlays fade so the latest bucket reads on top.
            let age = (overlay_count - 1 - slot) as f64;
            let base = (1.0 - 0.15 * age).max(0.4);
            let opacity = base * highlight.bucket_opacity(overlay.bucket);
            let color = CategoryPalette::color(slot);
            out.push(
                Mark::new(
                    MarkId::from_raw(POLYGON_IDS).offset(slot as u64),
                    z_order::SERIES_FILL,
                    Primitive::Path(overlay.path.clone()),
                    color.with_alpha(POLYGON_FILL_ALPHA),
                )
                .with_stroke(color, 2.0)
                .with_opacity(opacity),
            );
            for (i, pt) in overlay.points.iter().enumerate() {
                let id = &layout.axes[i];
                out.push(
                    Mark::new(
                        MarkId::from_raw(POINT_IDS)
                            .offset(slot as u64 * POINTS_PER_SLOT + i as u64),
                        z_order::SERIES_POINTS,
                        Primitive::Circle(Circle::new(*pt, POINT_RADIUS)),
                        self.color(id),
                    )
                    .with_opacity(opacity.min(highlight.opacity(id))),
                );
            }
        }
        out
    }

    fn hit(&self, point: Point) -> Option<Entity> {
        let layout = self.layout.as_ref()?;
        let p = &layout.projector;
        if (point - p.center()).hypot() > p.label_radius() {
            return None;
        }
        let i = polar_index(p.center(), point, layout.axes.len())?;
        let category = layout.axes.get(i)?.clone();
        let bucket = layout
            .overlays
            .iter()
            .rev()
            .find(|o| o.path.contains(point))
            .map_or(layout.latest, |o| o.bucket);
        Some(Entity {
            category,
            bucket: Some(bucket),
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use kurbo::Rect;

    use super::*;

    fn chart() -> RadarChart {
        let m = Matrix::from_entries(vec![
            (TimeBucket::year(2020), CategoryId::from("a"), 4.0),
            (TimeBucket::year(2020), CategoryId::from("b"), 2.0),
            (TimeBucket::year(2020), CategoryId::from("c"), 1.0),
            (TimeBucket::year(2021), CategoryId::from("a"), 1.0),
            (TimeBucket::year(2021), CategoryId::from("b"), 3.0),
        ]);
        RadarChart::new(m)
    }

    fn frame<'a>(categories: &'a [CategoryId], included: &'a [TimeBucket]) -> LayoutFrame<'a> {
        LayoutFrame {
            categories,
            included,
            plot: Rect::new(0.0, 0.0, 300.0, 300.0),
        }
    }

    #[test]
    fn one_polygon_per_included_bucket() {
        let mut c = chart();
        let cats = c.categories();
        let years = c.buckets();
        assert_eq!(c.layout(&frame(&cats, &years)), None);
        let marks = c.marks(&Highlight::default());
        let polygons = marks
            .iter()
            .filter(|m| m.z_index == z_order::SERIES_FILL)
            .count();
        assert_eq!(polygons, 2);
    }

    #[test]
    fn all_zero_selection_is_a_placeholder() {
        let mut c = chart();
        let cats = vec![CategoryId::from("c")];
        assert_eq!(
            c.layout(&frame(&cats, &[TimeBucket::year(2021)])),
            Some(Placeholder::NoData)
        );
        assert!(c.marks(&Highlight::default()).is_empty());
        assert_eq!(c.hit(Point::new(150.0, 100.0)), None);
    }

    #[test]
    fn hit_resolves_axis_and_bucket() {
        let mut c = chart();
        let cats = c.categories();
        let years = [TimeBucket::year(2021)];
        c.layout(&frame(&cats, &years));
        // Straight above the center is axis 0 ("a").
        let e = c.hit(Point::new(150.0, 140.0)).unwrap();
        assert_eq!(e.category.as_str(), "a");
        assert_eq!(e.bucket, Some(TimeBucket::year(2021)));
        assert_eq!(c.hit(Point::new(0.0, 0.0)), None, "outside the label ring");
    }
}
