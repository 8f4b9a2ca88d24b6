// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data transforms between the decoded inputs and chart geometry.
//!
//! This crate provides:
//! - **matrix builders** turning radar snapshots and river series into bucket × category
//!   [`Matrix`](castviz_core::Matrix) tables,
//! - the **stack layout** ([`stack`]) with wiggle-minimizing and normalized offsets, and
//! - the **summary adapter** ([`SummaryTable`]) for per-interval box-plot statistics.
//!
//! Everything here is a pure function of its inputs: identical inputs produce identical outputs.

#![no_std]

extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

mod matrix;
mod stack;
mod summary;

pub use matrix::{radar_matrix, river_matrix};
pub use stack::{Band, NORMALIZED_TOTAL, StackLayout, StackOffset, inside_out_order, stack};
pub use summary::{SummaryEntry, SummaryTable};
