// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! z-order conventions for chart-generated marks.
//!
//! Renderers sort by `(z_index, MarkId)` for a deterministic tie-break.

/// Gridlines, rings and axes drawn behind series.
pub const GRID_LINES: i32 = -50;
/// Annotation strips (topic intervals).
pub const ANNOTATIONS: i32 = -20;

/// Filled series marks (bands, polygons, boxes).
pub const SERIES_FILL: i32 = 0;
/// Stroked series marks (whiskers, medians).
pub const SERIES_STROKE: i32 = 10;
/// Point series marks drawn above strokes.
pub const SERIES_POINTS: i32 = 20;

/// Invisible hit targets.
pub const HIT_TARGETS: i32 = 30;
/// Axis and category labels.
pub const LABELS: i32 = 40;
/// "No data" placeholder.
pub const PLACEHOLDER: i32 = 80;
