// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for podcast analytics charts.
//!
//! This crate is the leaf of the workspace:
//! - the **data model** (categories, time buckets, the bucket × category [`Matrix`], box-plot
//!   summaries),
//! - deterministic **category colors** ([`CategoryPalette`]),
//! - the **mark layer**: flat lists of stable-id [`Mark`]s diffed frame-to-frame by a [`Scene`]
//!   into restyle / replace / morph instructions for a rendering collaborator, and
//! - the **input shapes** decoded from the analytics JSON.
//!
//! Painting, fetching and persistence live outside this workspace.

#![no_std]

extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

mod error;
mod float;
mod input;
mod mark;
mod model;
mod palette;

pub use error::InputError;
pub use float::{FloatExt, rem_euclid};
pub use input::{
    BoxplotInput, EpisodeRef, RadarInput, RadarMetric, RiverInput, RiverSeries, RiverStatistics,
    SpeakerStats, TemporalInterval, TopicInterval, YearCount,
};
pub use mark::{Mark, MarkDiff, MarkId, Primitive, Scene, TextAnchor, TextPrimitive, Transition};
pub use model::{BoxplotSummary, Category, CategoryId, Matrix, TimeBucket};
pub use palette::{CategoryPalette, GOLDEN_ANGLE_DEG};
