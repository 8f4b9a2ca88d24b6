// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable marks and the frame-to-frame geometry diff.
//!
//! Charts describe each frame as a flat list of [`Mark`]s with stable ids. A [`Scene`] keeps the
//! previously emitted frame and turns the next one into [`MarkDiff`]s, so a renderer can:
//! - restyle nodes whose geometry did not change (hover/selection highlighting),
//! - morph an existing node from one shape to the next (playback animation), or
//! - replace, add, and remove nodes.

extern crate alloc;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{BezPath, Circle, Line, Point, Rect, Shape};
use peniko::{Brush, Color};

/// Stable identity of a mark across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkId(pub u64);

impl MarkId {
    /// Creates a mark id from a raw value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Offsets the id by `n` (ids are allocated in per-chart ranges).
    pub const fn offset(self, n: u64) -> Self {
        Self(self.0 + n)
    }
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the anchor point.
    Start,
    /// Text is centered on the anchor point.
    Middle,
    /// Text ends at the anchor point.
    End,
}

/// A text primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPrimitive {
    /// Anchor position.
    pub pos: Point,
    /// Displayed (possibly truncated) text.
    pub text: String,
    /// Full text for a tooltip when `text` was shortened.
    pub tooltip: Option<String>,
    /// Font size in scene units.
    pub font_size: f64,
    /// Rotation around `pos`, in degrees.
    pub angle: f64,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
}

/// The geometry carried by a mark.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// An arbitrary (usually closed) path.
    Path(BezPath),
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A line segment.
    Line(Line),
    /// A circle.
    Circle(Circle),
    /// A text run.
    Text(TextPrimitive),
}

impl Primitive {
    /// Returns `true` when both primitives are the same kind of shape.
    pub fn same_kind(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    /// Returns the geometric bounds, or `None` for text (which is measured downstream).
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Path(p) => Some(p.bounding_box()),
            Self::Rect(r) => Some(*r),
            Self::Line(l) => Some(l.bounding_box()),
            Self::Circle(c) => Some(c.bounding_box()),
            Self::Text(_) => None,
        }
    }
}

/// One drawable item.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Stable id.
    pub id: MarkId,
    /// Paint order; renderers sort by `(z_index, id)`.
    pub z_index: i32,
    /// Geometry.
    pub primitive: Primitive,
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width; `0.0` disables the stroke.
    pub stroke_width: f64,
    /// Overall opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Mark {
    /// Creates a filled, unstroked, fully opaque mark.
    pub fn new(id: MarkId, z_index: i32, primitive: Primitive, fill: impl Into<Brush>) -> Self {
        Self {
            id,
            z_index,
            primitive,
            fill: fill.into(),
            stroke: Brush::Solid(Color::TRANSPARENT),
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }

    /// Sets the stroke paint and width.
    pub fn with_stroke(mut self, stroke: impl Into<Brush>, width: f64) -> Self {
        self.stroke = stroke.into();
        self.stroke_width = width;
        self
    }

    /// Sets the opacity (clamped to `[0, 1]`).
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    fn paint_eq(&self, other: &Self) -> bool {
        self.z_index == other.z_index
            && self.fill == other.fill
            && self.stroke == other.stroke
            && self.stroke_width == other.stroke_width
            && self.opacity == other.opacity
    }
}

/// How geometry changes between two frames should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Swap geometry immediately.
    Immediate,
    /// Interpolate geometry (and paint) over `duration_ms`, reusing the existing node.
    Morph {
        /// Animation length in milliseconds.
        duration_ms: u32,
    },
}

/// A single change between two frames.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkDiff {
    /// A new mark appeared.
    Enter {
        /// The new mark.
        mark: Box<Mark>,
    },
    /// A mark's geometry changed and should be redrawn in place.
    Replace {
        /// The updated mark.
        mark: Box<Mark>,
    },
    /// A mark's geometry changed and should be animated from the old shape to the new one.
    Morph {
        /// The previously drawn mark.
        from: Box<Mark>,
        /// The target mark.
        to: Box<Mark>,
        /// Animation length in milliseconds.
        duration_ms: u32,
    },
    /// Only paint (fill, stroke, opacity, z-order) changed.
    Restyle {
        /// The restyled mark.
        mark: Box<Mark>,
    },
    /// A mark disappeared.
    Exit {
        /// Id of the removed mark.
        id: MarkId,
    },
}

impl MarkDiff {
    /// Returns the id of the affected mark.
    pub fn id(&self) -> MarkId {
        match self {
            Self::Enter { mark } | Self::Replace { mark } | Self::Restyle { mark } => mark.id,
            Self::Morph { to, .. } => to.id,
            Self::Exit { id } => *id,
        }
    }
}

/// The retained set of marks from the last emitted frame.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    marks: BTreeMap<MarkId, Mark>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of retained marks.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Returns `true` if no marks are retained.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Looks up a retained mark.
    pub fn get(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(&id)
    }

    /// Returns the retained marks in paint order (`z_index`, then id).
    pub fn sorted(&self) -> Vec<&Mark> {
        let mut out: Vec<&Mark> = self.marks.values().collect();
        out.sort_by_key(|m| (m.z_index, m.id));
        out
    }

    /// Replaces the retained frame with `marks`, returning the diff from the previous frame.
    ///
    /// Diffs are ordered by mark id, exits last. Later duplicates of an id win.
    pub fn tick(&mut self, marks: Vec<Mark>, transition: Transition) -> Vec<MarkDiff> {
        let mut next: BTreeMap<MarkId, Mark> = BTreeMap::new();
        for m in marks {
            next.insert(m.id, m);
        }

        let mut diffs = Vec::new();
        for (id, mark) in &next {
            let Some(prev) = self.marks.get(id) else {
                diffs.push(MarkDiff::Enter {
                    mark: Box::new(mark.clone()),
                });
                continue;
            };
            if prev.primitive == mark.primitive {
                if !prev.paint_eq(mark) {
                    diffs.push(MarkDiff::Restyle {
                        mark: Box::new(mark.clone()),
                    });
                }
                continue;
            }
            match transition {
                Transition::Morph { duration_ms } if prev.primitive.same_kind(&mark.primitive) => {
                    diffs.push(MarkDiff::Morph {
                        from: Box::new(prev.clone()),
                        to: Box::new(mark.clone()),
                        duration_ms,
                    });
                }
                _ => diffs.push(MarkDiff::Replace {
                    mark: Box::new(mark.clone()),
                }),
            }
        }
        for id in self.marks.keys() {
            if !next.contains_key(id) {
                diffs.push(MarkDiff::Exit { id: *id });
            }
        }

        self.marks = next;
        diffs
    }

    /// Drops all retained marks, returning exits for each.
    pub fn clear(&mut self) -> Vec<MarkDiff> {
        let diffs = self
            .marks
            .keys()
            .map(|id| MarkDiff::Exit { id: *id })
            .collect();
        self.marks.clear();
        diffs
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use peniko::color::palette::css;

    use super::*;

    fn dot(id: u64, x: f64) -> Mark {
        Mark::new(
            MarkId::from_raw(id),
            0,
            Primitive::Circle(Circle::new((x, 0.0), 2.0)),
            css::TOMATO,
        )
    }

    #[test]
    fn first_tick_enters_everything() {
        let mut scene = Scene::new();
        let diffs = scene.tick(vec![dot(1, 0.0), dot(2, 1.0)], Transition::Immediate);
        assert_eq!(diffs.len(), 2);
        assert!(diffs.iter().all(|d| matches!(d, MarkDiff::Enter { .. })));
    }

    #[test]
    fn unchanged_frame_is_silent_and_paint_change_restyles() {
        let mut scene = Scene::new();
        scene.tick(vec![dot(1, 0.0)], Transition::Immediate);
        assert!(scene.tick(vec![dot(1, 0.0)], Transition::Immediate).is_empty());

        let faded = dot(1, 0.0).with_opacity(0.25);
        let diffs = scene.tick(vec![faded], Transition::Immediate);
        assert!(matches!(&diffs[..], [MarkDiff::Restyle { .. }]));
    }

    #[test]
    fn animated_geometry_change_morphs_the_existing_node() {
        let mut scene = Scene::new();
        scene.tick(vec![dot(1, 0.0)], Transition::Immediate);
        let diffs = scene.tick(vec![dot(1, 5.0)], Transition::Morph { duration_ms: 300 });
        let [MarkDiff::Morph {
            from,
            to,
            duration_ms,
        }] = &diffs[..]
        else {
            panic!("expected a single morph diff, got {diffs:?}");
        };
        assert_eq!(*duration_ms, 300);
        assert_eq!(from.primitive, dot(1, 0.0).primitive);
        assert_eq!(to.primitive, dot(1, 5.0).primitive);
    }

    #[test]
    fn kind_change_replaces_even_when_animated() {
        let mut scene = Scene::new();
        scene.tick(vec![dot(1, 0.0)], Transition::Immediate);
        let rect = Mark::new(
            MarkId::from_raw(1),
            0,
            Primitive::Rect(Rect::new(0.0, 0.0, 1.0, 1.0)),
            css::TOMATO,
        );
        let diffs = scene.tick(vec![rect], Transition::Morph { duration_ms: 300 });
        assert!(matches!(&diffs[..], [MarkDiff::Replace { .. }]));
    }

    #[test]
    fn missing_marks_exit() {
        let mut scene = Scene::new();
        scene.tick(vec![dot(1, 0.0), dot(2, 0.0)], Transition::Immediate);
        let diffs = scene.tick(vec![dot(2, 0.0)], Transition::Immediate);
        assert_eq!(diffs, vec![MarkDiff::Exit { id: MarkId::from_raw(1) }]);
        assert_eq!(scene.len(), 1);
    }
}
