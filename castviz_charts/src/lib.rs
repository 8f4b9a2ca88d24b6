// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart geometry and interaction for podcast analytics.
//!
//! This crate sits between the decoded analytics data (`castviz_core`, `castviz_transforms`) and a
//! rendering collaborator that paints [`Mark`](castviz_core::Mark)s:
//! - **Scales** ([`ScaleMapper`], [`ScaleBand`]) map data values to scene units and back.
//! - **Geometries** ([`RadarChart`], [`RiverChart`], [`BoxplotChart`]) lay out marks and resolve
//!   pointer positions back to data entities.
//! - **Interaction** ([`Interaction`]) tracks hover, selection and playback, and decides how much
//!   of the frame each change invalidates.
//! - [`ChartController`] ties one geometry to its interaction state and the retained scene.
//!
//! Timers come from the host through [`Scheduler`]; nothing here reads a clock.

#![no_std]

extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

mod boxplot;
mod controller;
#[cfg(test)]
mod controller_tests;
mod detail_cache;
mod dispatch;
mod geometry;
mod hit;
mod interaction;
mod playback;
mod polar;
mod radar;
mod river;
mod scale;
mod settings;
mod time;
mod z_order;

pub use boxplot::BoxplotChart;
pub use controller::ChartController;
pub use detail_cache::{DetailCache, DetailEntry};
pub use dispatch::{Dispatcher, Invalidation};
pub use geometry::{
    ChartGeometry, DIM_OPACITY, Highlight, LayoutFrame, PLACEHOLDER_MARK, Placeholder,
    placeholder_marks,
};
pub use hit::{HIT_PADDING, MIN_HIT_WIDTH, band_at, hit_rect, nearest_bucket, polar_index, rect_at};
pub use interaction::{Entity, Interaction, InteractionEvent, PlaybackState, SelectionState};
pub use playback::{ManualScheduler, PLAYBACK_PERIOD_MS, Scheduler, TimerHandle};
pub use polar::{
    AxisLabel, MAX_LABEL_CHARS, MIN_LABEL_CHARS, PolarPoints, PolarProjector, truncate_label,
};
pub use radar::RadarChart;
pub use river::RiverChart;
pub use scale::{
    LOG_EPSILON, ScaleBand, ScaleKind, ScaleLinear, ScaleLog, ScaleMapper, clamp_log_domain,
};
pub use settings::{
    ChartSettings, DEFAULT_TOP_N, LOCKED_TOPIC_VARIANT, LayoutSize, MAX_TOP_N, MIN_TOP_N,
    SettingsError, Theme,
};
pub use time::{format_duration, nice_time_ticks_seconds};
pub use z_order::*;
