// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! River (stream graph) chart.
//!
//! Included buckets are stacked by [`castviz_transforms::stack`] and drawn as smoothed bands.
//! Band outlines are Catmull-Rom splines through the stacked edges; the smoothing is visual only
//! and the stacked values themselves are untouched.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use castviz_core::{
    Category, CategoryId, CategoryPalette, Mark, MarkId, Matrix, Primitive, TextAnchor,
    TextPrimitive, TimeBucket,
};
use castviz_transforms::{StackLayout, StackOffset, stack};
use kurbo::{BezPath, Line, Point, Rect};
use peniko::Color;

use crate::geometry::{ChartGeometry, Highlight, LayoutFrame, Placeholder};
use crate::hit::{band_at, nearest_bucket};
use crate::interaction::Entity;
use crate::scale::ScaleLinear;
use crate::settings::Theme;
use crate::z_order;

const BAND_IDS: u64 = 1_000;
const TICK_IDS: u64 = 100_000;
const LABEL_IDS: u64 = 200_000;

/// Space reserved under the plot for bucket labels.
const AXIS_HEIGHT: f64 = 20.0;
const LABEL_FONT_SIZE: f64 = 11.0;

#[derive(Clone, Debug)]
struct RiverLayout {
    stack: StackLayout,
    x: ScaleLinear,
    /// `(category, path)` in draw order, bottom first.
    bands: Vec<(CategoryId, BezPath)>,
    ticks: Vec<(TimeBucket, f64)>,
    plot: Rect,
}

/// River chart geometry.
#[derive(Clone, Debug)]
pub struct RiverChart {
    matrix: Matrix,
    categories: Vec<Category>,
    offset: StackOffset,
    theme: Theme,
    layout: Option<RiverLayout>,
}

impl RiverChart {
    /// Creates a river chart over a ranked matrix.
    pub fn new(matrix: Matrix) -> Self {
        let categories = CategoryPalette::assign(matrix.categories(), |_| None);
        Self {
            matrix,
            categories,
            offset: StackOffset::default(),
            theme: Theme::default(),
            layout: None,
        }
    }

    /// Uses display names for categories.
    pub fn with_names(mut self, names: &BTreeMap<CategoryId, String>) -> Self {
        self.categories = CategoryPalette::assign(self.matrix.categories(), |id| {
            names.get(id).map(String::as_str)
        });
        self
    }

    /// Sets the stack offset policy.
    pub fn with_offset(mut self, offset: StackOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// The stack of the last layout.
    pub fn stack_layout(&self) -> Option<&StackLayout> {
        self.layout.as_ref().map(|l| &l.stack)
    }

    fn color(&self, id: &CategoryId) -> Color {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .map_or(self.theme.text(), |c| c.color)
    }

    fn band_id(&self, id: &CategoryId) -> MarkId {
        let rank = self.matrix.category_index(id).unwrap_or(0);
        MarkId::from_raw(BAND_IDS).offset(rank as u64)
    }

    fn bucket_offset(&self, bucket: TimeBucket) -> u64 {
        self.matrix.bucket_index(bucket).unwrap_or(0) as u64
    }
}

impl ChartGeometry for RiverChart {
    fn categories(&self) -> Vec<CategoryId> {
        self.matrix.categories().to_vec()
    }

    fn buckets(&self) -> Vec<TimeBucket> {
        self.matrix.buckets().to_vec()
    }

    fn layout(&mut self, frame: &LayoutFrame<'_>) -> Option<Placeholder> {
        self.layout = None;
        let active = self.matrix.select(self.matrix.buckets(), frame.categories);
        let stacked = stack(&active, frame.included, self.offset);
        if stacked.is_empty() {
            return Some(Placeholder::NoData);
        }

        let plot = frame.plot;
        let body = Rect::new(plot.x0, plot.y0, plot.x1, (plot.y1 - AXIS_HEIGHT).max(plot.y0));
        let buckets = stacked.buckets();
        let (first, last) = match (buckets.first(), buckets.last()) {
            (Some(f), Some(l)) => (f.as_f64(), l.as_f64()),
            _ => return Some(Placeholder::NoData),
        };
        let x = ScaleLinear::new((first, last), (body.x0, body.x1));
        let (lo, hi) = stacked.extent();
        let y = ScaleLinear::new((lo, hi), (body.y1, body.y0));

        // A lone bucket is drawn as a flat band spanning the plot.
        let xs: Vec<f64> = if buckets.len() == 1 {
            alloc::vec![body.x0, body.x1]
        } else {
            buckets.iter().map(|b| x.map(b.as_f64())).collect()
        };
        let column = |j: usize| if buckets.len() == 1 { 0 } else { j };

        let bands = stacked
            .order()
            .iter()
            .map(|&c| {
                let upper: Vec<Point> = xs
                    .iter()
                    .enumerate()
                    .map(|(j, px)| Point::new(*px, y.map(stacked.band(column(j), c).y1)))
                    .collect();
                let lower: Vec<Point> = xs
                    .iter()
                    .enumerate()
                    .rev()
                    .map(|(j, px)| Point::new(*px, y.map(stacked.band(column(j), c).y0)))
                    .collect();
                (stacked.categories()[c].clone(), band_path(&upper, &lower))
            })
            .collect();

        let ticks = buckets
            .iter()
            .map(|b| {
                let px = if buckets.len() == 1 {
                    body.center().x
                } else {
                    x.map(b.as_f64())
                };
                (*b, px)
            })
            .collect();

        self.layout = Some(RiverLayout {
            stack: stacked,
            x,
            bands,
            ticks,
            plot: body,
        });
        None
    }

    fn marks(&self, highlight: &Highlight<'_>) -> Vec<Mark> {
        let Some(layout) = &self.layout else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (id, path) in &layout.bands {
            let color = self.color(id);
            out.push(
                Mark::new(
                    self.band_id(id),
                    z_order::SERIES_FILL,
                    Primitive::Path(path.clone()),
                    color,
                )
                .with_stroke(self.theme.background(), 0.5)
                .with_opacity(highlight.opacity(id)),
            );
        }
        for (bucket, px) in &layout.ticks {
            let k = self.bucket_offset(*bucket);
            out.push(
                Mark::new(
                    MarkId::from_raw(TICK_IDS).offset(k),
                    z_order::GRID_LINES,
                    Primitive::Line(Line::new((*px, layout.plot.y0), (*px, layout.plot.y1))),
                    Color::TRANSPARENT,
                )
                .with_stroke(self.theme.grid(), 1.0),
            );
            out.push(Mark::new(
                MarkId::from_raw(LABEL_IDS).offset(k),
                z_order::LABELS,
                Primitive::Text(TextPrimitive {
                    pos: Point::new(*px, layout.plot.y1 + AXIS_HEIGHT - 4.0),
                    text: alloc::format!("{bucket}"),
                    tooltip: None,
                    font_size: LABEL_FONT_SIZE,
                    angle: 0.0,
                    anchor: TextAnchor::Middle,
                }),
                self.theme.text(),
            ));
        }
        out
    }

    fn hit(&self, point: Point) -> Option<Entity> {
        let layout = self.layout.as_ref()?;
        let i = band_at(layout.bands.iter().map(|(_, p)| p), point)?;
        let category = layout.bands[i].0.clone();
        let bucket = if layout.stack.buckets().len() == 1 {
            layout.stack.buckets().first().copied()
        } else {
            nearest_bucket(&layout.x, point.x, layout.stack.buckets())
        };
        Some(Entity { category, bucket })
    }
}

/// Closed band outline: the upper edge left to right, then the lower edge right to left.
fn band_path(upper: &[Point], lower: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(start) = upper.first() else {
        return path;
    };
    path.move_to(*start);
    catmull_rom(&mut path, upper);
    if let Some(p) = lower.first() {
        path.line_to(*p);
    }
    catmull_rom(&mut path, lower);
    path.close_path();
    path
}

/// Appends a Catmull-Rom spline through `points` (starting at `points[0]`, which must already be
/// the current point) as cubic Bézier segments.
fn catmull_rom(path: &mut BezPath, points: &[Point]) {
    let n = points.len();
    for i in 0..n.saturating_sub(1) {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        let c1 = p1 + (p2 - p0) / 6.0;
        let c2 = p2 - (p3 - p1) / 6.0;
        path.curve_to(c1, c2, p2);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use kurbo::Shape;

    use super::*;

    fn chart() -> RiverChart {
        RiverChart::new(Matrix::from_entries(vec![
            (TimeBucket::year(2019), CategoryId::from("rust"), 4.0),
            (TimeBucket::year(2020), CategoryId::from("rust"), 6.0),
            (TimeBucket::year(2021), CategoryId::from("rust"), 5.0),
            (TimeBucket::year(2019), CategoryId::from("go"), 2.0),
            (TimeBucket::year(2020), CategoryId::from("go"), 1.0),
            (TimeBucket::year(2021), CategoryId::from("go"), 3.0),
        ]))
    }

    fn plot() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 220.0)
    }

    #[test]
    fn bands_stay_inside_the_plot_horizontally() {
        let mut c = chart();
        let cats = c.categories();
        let years = c.buckets();
        assert_eq!(
            c.layout(&LayoutFrame {
                categories: &cats,
                included: &years,
                plot: plot(),
            }),
            None
        );
        for m in c.marks(&Highlight::default()) {
            if let Primitive::Path(p) = &m.primitive {
                let b = p.bounding_box();
                assert!(b.x0 >= -1e-9 && b.x1 <= 400.0 + 1e-9, "{b:?}");
            }
        }
    }

    #[test]
    fn single_bucket_spans_the_width() {
        let mut c = chart().with_offset(StackOffset::Normalize);
        let cats = c.categories();
        c.layout(&LayoutFrame {
            categories: &cats,
            included: &[TimeBucket::year(2020)],
            plot: plot(),
        });
        let hit = c.hit(Point::new(390.0, 100.0)).unwrap();
        assert_eq!(hit.bucket, Some(TimeBucket::year(2020)));
        let bands: Vec<_> = c
            .marks(&Highlight::default())
            .into_iter()
            .filter_map(|m| match m.primitive {
                Primitive::Path(p) => Some(p.bounding_box()),
                _ => None,
            })
            .collect();
        assert_eq!(bands.len(), 2);
        assert!(bands.iter().all(|b| (b.width() - 400.0).abs() < 1e-9));
    }

    #[test]
    fn filtered_out_categories_leave_nothing_to_draw() {
        let mut c = chart();
        let years = c.buckets();
        let placeholder = c.layout(&LayoutFrame {
            categories: &[CategoryId::from("zig")],
            included: &years,
            plot: plot(),
        });
        assert_eq!(placeholder, Some(Placeholder::NoData));
    }

    #[test]
    fn hit_finds_band_and_nearest_bucket() {
        let mut c = chart().with_offset(StackOffset::Normalize);
        let cats = c.categories();
        let years = c.buckets();
        c.layout(&LayoutFrame {
            categories: &cats,
            included: &years,
            plot: plot(),
        });
        // Normalized stacks fill the body from top to bottom, so any point in it is in a band.
        let e = c.hit(Point::new(395.0, 100.0)).unwrap();
        assert_eq!(e.bucket, Some(TimeBucket::year(2021)));
        assert!(c.hit(Point::new(200.0, 215.0)).is_none(), "axis strip is not a band");
    }
}
