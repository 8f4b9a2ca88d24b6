// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-speaker segment-duration box plot for one episode.
//!
//! The x axis is episode time in seconds. Each fixed-width interval is split between the active
//! speakers with a band scale, and every (speaker, interval) cell draws a whisker, a box and a
//! median line against one shared logarithmic y axis.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use castviz_core::{
    Category, CategoryId, CategoryPalette, Mark, MarkId, Primitive, TextAnchor, TextPrimitive,
    TimeBucket,
};
use castviz_transforms::{SummaryEntry, SummaryTable};
use kurbo::{Line, Point, Rect};
use peniko::Color;

use crate::geometry::{ChartGeometry, Highlight, LayoutFrame, Placeholder};
use crate::hit::{hit_rect, rect_at};
use crate::interaction::Entity;
use crate::polar::truncate_label;
use crate::scale::{ScaleBand, ScaleKind, ScaleLinear, ScaleMapper};
use crate::settings::Theme;
use crate::time::format_duration;
use crate::z_order;

const GRID_IDS: u64 = 100;
const TOPIC_IDS: u64 = 1_000;
const INTERVAL_LABEL_IDS: u64 = 5_000;
const CELL_IDS: u64 = 100_000;
const PARTS_PER_CELL: u64 = 4;
const INTERVALS_PER_CATEGORY: u64 = 10_000;

const AXIS_WIDTH: f64 = 48.0;
const AXIS_HEIGHT: f64 = 20.0;
const TOPIC_STRIP_HEIGHT: f64 = 18.0;
const FONT_SIZE: f64 = 10.0;
const CHAR_WIDTH_EM: f64 = 0.6;
const Y_TICKS: usize = 6;

#[derive(Clone, Debug)]
struct Cell {
    entity: Entity,
    rank: usize,
    interval: usize,
    whisker: Line,
    body: Rect,
    median: Line,
    hit: Rect,
}

#[derive(Clone, Debug)]
struct TopicBox {
    rect: Rect,
    label: Option<(String, Option<String>)>,
}

#[derive(Clone, Debug)]
struct BoxplotLayout {
    cells: Vec<Cell>,
    hit_rects: Vec<Rect>,
    y_ticks: Vec<(f64, f64)>,
    interval_labels: Vec<(f64, f64)>,
    topics: Vec<TopicBox>,
    body: Rect,
}

/// Box-plot chart geometry over a [`SummaryTable`].
#[derive(Clone, Debug)]
pub struct BoxplotChart {
    table: SummaryTable,
    categories: Vec<Category>,
    theme: Theme,
    layout: Option<BoxplotLayout>,
}

impl BoxplotChart {
    /// Creates a box plot. Speaker colors follow the table's median-sum rank.
    pub fn new(table: SummaryTable) -> Self {
        let categories = CategoryPalette::assign(table.categories(), |_| None);
        Self {
            table,
            categories,
            theme: Theme::default(),
            layout: None,
        }
    }

    /// Uses display names for speakers.
    pub fn with_names(mut self, names: &BTreeMap<CategoryId, String>) -> Self {
        self.categories = CategoryPalette::assign(self.table.categories(), |id| {
            names.get(id).map(String::as_str)
        });
        self
    }

    /// Sets the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// The underlying table.
    pub fn table(&self) -> &SummaryTable {
        &self.table
    }

    fn rank(&self, id: &CategoryId) -> usize {
        self.categories
            .iter()
            .position(|c| &c.id == id)
            .unwrap_or(self.categories.len())
    }

    fn color(&self, id: &CategoryId) -> Color {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .map_or(self.theme.text(), |c| c.color)
    }

    fn cell_id(&self, cell: &Cell, part: u64) -> MarkId {
        let key = cell.rank as u64 * INTERVALS_PER_CATEGORY + cell.interval as u64;
        MarkId::from_raw(CELL_IDS).offset(key * PARTS_PER_CELL + part)
    }
}

impl ChartGeometry for BoxplotChart {
    fn categories(&self) -> Vec<CategoryId> {
        self.table.categories().to_vec()
    }

    fn buckets(&self) -> Vec<TimeBucket> {
        self.table.intervals().into_iter().map(|(b, _)| b).collect()
    }

    fn layout(&mut self, frame: &LayoutFrame<'_>) -> Option<Placeholder> {
        self.layout = None;
        let active: Vec<&CategoryId> = self
            .table
            .categories()
            .iter()
            .filter(|c| frame.categories.contains(c))
            .collect();
        let intervals: Vec<(usize, TimeBucket, f64)> = self
            .table
            .intervals()
            .into_iter()
            .enumerate()
            .filter(|(_, (b, _))| frame.included.binary_search(b).is_ok())
            .map(|(i, (b, end))| (i, b, end))
            .collect();
        let visible: Vec<&SummaryEntry> = self
            .table
            .entries()
            .iter()
            .filter(|e| active.contains(&&e.category))
            .filter(|e| intervals.iter().any(|(_, b, _)| *b == e.bucket))
            .collect();
        if visible.is_empty() {
            return Some(Placeholder::NoData);
        }
        let Some(extent) = self.table.extent() else {
            return Some(Placeholder::NoData);
        };

        let plot = frame.plot;
        let strip = if self.table.topics().is_empty() {
            0.0
        } else {
            TOPIC_STRIP_HEIGHT
        };
        let body = Rect::new(
            plot.x0 + AXIS_WIDTH,
            plot.y0 + strip,
            plot.x1.max(plot.x0 + AXIS_WIDTH),
            (plot.y1 - AXIS_HEIGHT).max(plot.y0 + strip),
        );
        let duration = self.table.episode_duration();
        let x = ScaleLinear::new((0.0, duration), (body.x0, body.x1));
        let y = ScaleMapper::new(ScaleKind::Log, extent, (body.y1, body.y0));

        let mut cells = Vec::new();
        for (interval, bucket, end) in &intervals {
            let x0 = x.map(bucket.as_f64());
            let x1 = x.map(*end);
            let band = ScaleBand::new((x0, x1), active.len()).with_padding(0.2, 0.1);
            let bw = band.band_width();
            for (k, id) in active.iter().enumerate() {
                let Some(entry) = visible
                    .iter()
                    .find(|e| e.bucket == *bucket && &e.category == *id)
                else {
                    continue;
                };
                let s = entry.summary;
                let left = band.x(k);
                let cx = left + 0.5 * bw;
                let body_rect = Rect::new(left, y.map(s.q3), left + bw, y.map(s.q1));
                let whisker = Line::new((cx, y.map(s.max)), (cx, y.map(s.min)));
                let span = Rect::new(left, whisker.p0.y, left + bw, whisker.p1.y);
                cells.push(Cell {
                    entity: Entity::new((*id).clone(), *bucket),
                    rank: self.rank(id),
                    interval: *interval,
                    whisker,
                    body: body_rect,
                    median: Line::new((left, y.map(s.median)), (left + bw, y.map(s.median))),
                    hit: hit_rect(span.union(body_rect)),
                });
            }
        }

        let y_ticks = y
            .ticks(Y_TICKS)
            .into_iter()
            .map(|v| (v, y.map(v)))
            .collect();
        let interval_labels = intervals
            .iter()
            .map(|(_, b, _)| (b.as_f64(), x.map(b.as_f64())))
            .collect();
        let topics = self
            .table
            .topics()
            .iter()
            .filter(|t| t.duration_sec > 0.0)
            .map(|t| {
                let rect = Rect::new(
                    x.map(t.position_sec),
                    plot.y0,
                    x.map(t.position_sec + t.duration_sec),
                    plot.y0 + strip,
                );
                let chars = rect.width() / (CHAR_WIDTH_EM * FONT_SIZE);
                let label = (chars >= 2.0).then(|| {
                    #[allow(clippy::cast_possible_truncation, reason = "positive and small")]
                    let max = chars as usize;
                    truncate_label(&t.topic, max)
                });
                TopicBox { rect, label }
            })
            .collect();

        let hit_rects = cells.iter().map(|c| c.hit).collect();
        self.layout = Some(BoxplotLayout {
            cells,
            hit_rects,
            y_ticks,
            interval_labels,
            topics,
            body,
        });
        None
    }

    fn marks(&self, highlight: &Highlight<'_>) -> Vec<Mark> {
        let Some(layout) = &self.layout else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let body = layout.body;

        for (k, (v, py)) in layout.y_ticks.iter().enumerate() {
            let id = MarkId::from_raw(GRID_IDS).offset(2 * k as u64);
            out.push(
                Mark::new(
                    id,
                    z_order::GRID_LINES,
                    Primitive::Line(Line::new((body.x0, *py), (body.x1, *py))),
                    Color::TRANSPARENT,
                )
                .with_stroke(self.theme.grid(), 1.0),
            );
            out.push(Mark::new(
                id.offset(1),
                z_order::LABELS,
                text(
                    Point::new(body.x0 - 4.0, *py + 3.0),
                    format_duration(*v),
                    None,
                    TextAnchor::End,
                ),
                self.theme.text(),
            ));
        }

        for (k, (start, px)) in layout.interval_labels.iter().enumerate() {
            out.push(Mark::new(
                MarkId::from_raw(INTERVAL_LABEL_IDS).offset(k as u64),
                z_order::LABELS,
                text(
                    Point::new(*px, body.y1 + AXIS_HEIGHT - 6.0),
                    format_duration(*start),
                    None,
                    TextAnchor::Start,
                ),
                self.theme.text(),
            ));
        }

        for (k, topic) in layout.topics.iter().enumerate() {
            let id = MarkId::from_raw(TOPIC_IDS).offset(2 * k as u64);
            out.push(
                Mark::new(
                    id,
                    z_order::ANNOTATIONS,
                    Primitive::Rect(topic.rect),
                    self.theme.annotation(),
                )
                .with_stroke(self.theme.grid(), 0.5),
            );
            if let Some((label, tooltip)) = &topic.label {
                out.push(Mark::new(
                    id.offset(1),
                    z_order::LABELS,
                    text(
                        Point::new(topic.rect.x0 + 2.0, topic.rect.y1 - 5.0),
                        label.clone(),
                        tooltip.clone(),
                        TextAnchor::Start,
                    ),
                    self.theme.text(),
                ));
            }
        }

        for cell in &layout.cells {
            let color = self.color(&cell.entity.category);
            let mut opacity = highlight.opacity(&cell.entity.category);
            if let Some(b) = cell.entity.bucket {
                opacity = opacity.min(highlight.bucket_opacity(b));
            }
            out.push(
                Mark::new(
                    self.cell_id(cell, 0),
                    z_order::SERIES_STROKE,
                    Primitive::Line(cell.whisker),
                    Color::TRANSPARENT,
                )
                .with_stroke(color, 1.0)
                .with_opacity(opacity),
            );
            out.push(
                Mark::new(
                    self.cell_id(cell, 1),
                    z_order::SERIES_FILL,
                    Primitive::Rect(cell.body),
                    color,
                )
                .with_opacity(opacity),
            );
            out.push(
                Mark::new(
                    self.cell_id(cell, 2),
                    z_order::SERIES_POINTS,
                    Primitive::Line(cell.median),
                    Color::TRANSPARENT,
                )
                .with_stroke(self.theme.background(), 2.0)
                .with_opacity(opacity),
            );
            out.push(
                Mark::new(
                    self.cell_id(cell, 3),
                    z_order::HIT_TARGETS,
                    Primitive::Rect(cell.hit),
                    Color::TRANSPARENT,
                )
                .with_opacity(0.0),
            );
        }
        out
    }

    fn hit(&self, point: Point) -> Option<Entity> {
        let layout = self.layout.as_ref()?;
        let i = rect_at(&layout.hit_rects, point)?;
        layout.cells.get(i).map(|c| c.entity.clone())
    }
}

fn text(pos: Point, text: String, tooltip: Option<String>, anchor: TextAnchor) -> Primitive {
    Primitive::Text(TextPrimitive {
        pos,
        text,
        tooltip,
        font_size: FONT_SIZE,
        angle: 0.0,
        anchor,
    })
}
