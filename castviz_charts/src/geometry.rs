// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between the chart controller and the individual chart geometries.

extern crate alloc;

use alloc::vec::Vec;

use castviz_core::{CategoryId, Mark, MarkId, Primitive, TextAnchor, TextPrimitive, TimeBucket};
use kurbo::{Point, Rect};

use crate::interaction::Entity;
use crate::settings::Theme;
use crate::z_order;

/// Opacity of categories unrelated to the hovered or selected entity.
pub const DIM_OPACITY: f64 = 0.25;

/// Mark id of the "no data" placeholder text.
pub const PLACEHOLDER_MARK: MarkId = MarkId::from_raw(1);

/// Why a layout produced no series geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placeholder {
    /// Nothing to draw for the current filter (no categories, no buckets, or all-zero data).
    NoData,
}

/// Inputs for one layout pass.
#[derive(Clone, Copy, Debug)]
pub struct LayoutFrame<'a> {
    /// Active categories in rank order.
    pub categories: &'a [CategoryId],
    /// Included buckets, ascending.
    pub included: &'a [TimeBucket],
    /// Plot rectangle in scene units.
    pub plot: Rect,
}

/// Highlighting inputs for mark generation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Highlight<'a> {
    /// The entity driving highlighting, if any.
    pub focus: Option<&'a Entity>,
}

impl Highlight<'_> {
    /// Opacity for marks of `category`.
    pub fn opacity(&self, category: &CategoryId) -> f64 {
        match self.focus {
            Some(e) if &e.category != category => DIM_OPACITY,
            _ => 1.0,
        }
    }

    /// Opacity for marks belonging to `bucket` (radar overlays).
    ///
    /// Only dims when the focus names a bucket.
    pub fn bucket_opacity(&self, bucket: TimeBucket) -> f64 {
        match self.focus.and_then(|e| e.bucket) {
            Some(b) if b != bucket => DIM_OPACITY,
            _ => 1.0,
        }
    }
}

/// A chart geometry: turns the current filter into marks and maps pointer positions back to
/// entities.
pub trait ChartGeometry {
    /// Every category of the dataset, in rank order (the default active set).
    fn categories(&self) -> Vec<CategoryId>;

    /// Every bucket of the dataset, ascending.
    fn buckets(&self) -> Vec<TimeBucket>;

    /// Recomputes geometry for `frame`. Returns a placeholder when there is nothing to draw.
    fn layout(&mut self, frame: &LayoutFrame<'_>) -> Option<Placeholder>;

    /// Emits marks for the last layout. Must not recompute geometry.
    fn marks(&self, highlight: &Highlight<'_>) -> Vec<Mark>;

    /// Maps a pointer position to the entity under it.
    fn hit(&self, point: Point) -> Option<Entity>;
}

/// Marks shown instead of series geometry.
pub fn placeholder_marks(placeholder: Placeholder, plot: Rect, theme: Theme) -> Vec<Mark> {
    let text = match placeholder {
        Placeholder::NoData => "No data",
    };
    alloc::vec![Mark::new(
        PLACEHOLDER_MARK,
        z_order::PLACEHOLDER,
        Primitive::Text(TextPrimitive {
            pos: plot.center(),
            text: text.into(),
            tooltip: None,
            font_size: 14.0,
            angle: 0.0,
            anchor: TextAnchor::Middle,
        }),
        theme.text(),
    )]
}
