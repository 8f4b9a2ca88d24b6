// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack layout for river (stream) charts.
//!
//! Given a bucket × category [`Matrix`] and the included buckets, this computes one [`Band`] per
//! (bucket, category) in data units. Bands in one bucket are contiguous: each band starts where
//! the previous one in draw order ends, so together they partition the bucket's stack.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

use castviz_core::{CategoryId, Matrix, TimeBucket};

/// Stack height of every bucket in [`StackOffset::Normalize`] mode.
pub const NORMALIZED_TOTAL: f64 = 100.0;

/// Stack baseline offset mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StackOffset {
    /// Streamgraph-style "wiggle" baseline.
    ///
    /// The first bucket starts at `0`; each following baseline is shifted to minimize the
    /// weighted change in band centers from the previous bucket (the classic streamgraph
    /// minimization, as in D3's `stackOffsetWiggle`). Bucket heights are the raw magnitudes.
    #[default]
    Wiggle,
    /// Every bucket is scaled to [`NORMALIZED_TOTAL`] (percentage of the bucket total).
    ///
    /// Buckets with a zero total produce zero-height bands.
    Normalize,
}

/// A `[y0, y1]` interval in data units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Band {
    /// Lower edge.
    pub y0: f64,
    /// Upper edge.
    pub y1: f64,
}

impl Band {
    /// Band height.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Band midpoint.
    pub fn center(&self) -> f64 {
        0.5 * (self.y0 + self.y1)
    }
}

/// Output of [`stack`].
#[derive(Clone, Debug, PartialEq)]
pub struct StackLayout {
    offset: StackOffset,
    buckets: Vec<TimeBucket>,
    categories: Vec<CategoryId>,
    order: Vec<usize>,
    bands: Vec<Band>,
    extent: (f64, f64),
}

impl StackLayout {
    /// The offset policy used.
    pub fn offset(&self) -> StackOffset {
        self.offset
    }

    /// Stacked buckets (ascending).
    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    /// Stacked categories, in the matrix column order.
    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    /// Draw order from the bottom of the stack to the top, as indices into
    /// [`StackLayout::categories`].
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Returns the band for `(bucket, category)` indices.
    pub fn band(&self, bucket: usize, category: usize) -> Band {
        self.bands
            .get(bucket * self.categories.len() + category)
            .copied()
            .unwrap_or_default()
    }

    /// Returns all bands of one bucket, in category column order.
    pub fn bucket_bands(&self, bucket: usize) -> &[Band] {
        let w = self.categories.len();
        self.bands.get(bucket * w..(bucket + 1) * w).unwrap_or(&[])
    }

    /// `(min y0, max y1)` over all bands, or the fixed `[0, NORMALIZED_TOTAL]` range when
    /// normalized.
    pub fn extent(&self) -> (f64, f64) {
        self.extent
    }

    /// Returns `true` when there is nothing to draw (no buckets, no categories, or all bands
    /// have zero height).
    pub fn is_empty(&self) -> bool {
        self.bands.iter().all(|b| b.height() <= 0.0)
    }
}

/// Orders categories inside-out by descending total.
///
/// The largest category is placed in the middle of the stack; the following ones alternate
/// below and above it, always onto the lighter side, so dominant categories anchor the center.
/// Ties are broken by index, which keeps the order deterministic.
pub fn inside_out_order(totals: &[f64]) -> Vec<usize> {
    let mut by_size: Vec<usize> = (0..totals.len()).collect();
    by_size.sort_by(|&a, &b| {
        totals[b]
            .partial_cmp(&totals[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut top = 0.0;
    let mut bottom = 0.0;
    let mut tops = Vec::new();
    let mut bottoms = Vec::new();
    for i in by_size {
        if top < bottom {
            top += totals[i];
            tops.push(i);
        } else {
            bottom += totals[i];
            bottoms.push(i);
        }
    }
    bottoms.reverse();
    bottoms.extend(tops);
    bottoms
}

/// Computes stacked bands for the `included` buckets of `matrix`.
///
/// Buckets are stacked in ascending order; included buckets unknown to the matrix stack as
/// all-zero rows. The category order is [`inside_out_order`] over the totals of the included
/// buckets, so identical inputs always produce identical layouts.
pub fn stack(matrix: &Matrix, included: &[TimeBucket], offset: StackOffset) -> StackLayout {
    let sub = matrix.select(included, matrix.categories());
    let buckets = sub.buckets().to_vec();
    let categories = sub.categories().to_vec();
    let n = categories.len();
    let m = buckets.len();
    let order = inside_out_order(&sub.category_totals());

    let baselines = match offset {
        StackOffset::Wiggle => wiggle_baselines(&sub, &order),
        StackOffset::Normalize => alloc::vec![0.0; m],
    };

    let mut bands = alloc::vec![Band::default(); m * n];
    for (j, base) in baselines.iter().enumerate() {
        let total = sub.bucket_total(j);
        let scale = match offset {
            StackOffset::Wiggle => 1.0,
            StackOffset::Normalize if total > 0.0 => NORMALIZED_TOTAL / total,
            StackOffset::Normalize => 0.0,
        };
        let mut y = *base;
        for &c in &order {
            let h = sub.get(j, c) * scale;
            bands[j * n + c] = Band { y0: y, y1: y + h };
            y += h;
        }
    }

    let extent = match offset {
        StackOffset::Normalize => (0.0, NORMALIZED_TOTAL),
        StackOffset::Wiggle => bands.iter().fold(None, |acc: Option<(f64, f64)>, b| {
            Some(match acc {
                None => (b.y0, b.y1),
                Some((lo, hi)) => (lo.min(b.y0), hi.max(b.y1)),
            })
        })
        .unwrap_or((0.0, 0.0)),
    };

    StackLayout {
        offset,
        buckets,
        categories,
        order,
        bands,
        extent,
    }
}

/// Per-bucket baselines minimizing the weighted squared movement of band centers.
fn wiggle_baselines(matrix: &Matrix, order: &[usize]) -> Vec<f64> {
    let m = matrix.buckets().len();
    let mut baselines = alloc::vec![0.0; m];
    for j in 1..m {
        let mut total = 0.0;
        let mut weighted = 0.0;
        let mut below = 0.0;
        for &c in order {
            let cur = matrix.get(j, c);
            let delta = cur - matrix.get(j - 1, c);
            // Center shift of this band if the baseline stayed put.
            let shift = below + 0.5 * delta;
            below += delta;
            total += cur;
            weighted += shift * cur;
        }
        let step = if total > 0.0 { weighted / total } else { 0.0 };
        baselines[j] = baselines[j - 1] - step;
    }
    baselines
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn inside_out_puts_largest_pair_in_the_middle() {
        // Sizes: idx0=1, idx1=10, idx2=5, idx3=7
        let order = inside_out_order(&[1.0, 10.0, 5.0, 7.0]);
        // by size: 1(10) -> bottom, 3(7) -> top, 2(5) -> top (7 < 10), 0(1) -> bottom.
        assert_eq!(order, vec![0, 1, 3, 2]);
    }

    #[test]
    fn inside_out_is_stable_for_ties() {
        assert_eq!(inside_out_order(&[2.0, 2.0, 2.0]), vec![2, 0, 1]);
    }

    #[test]
    fn empty_matrix_stacks_to_nothing() {
        let layout = stack(&Matrix::default(), &[], StackOffset::Wiggle);
        assert!(layout.is_empty());
        assert_eq!(layout.extent(), (0.0, 0.0));
    }

    #[test]
    fn constant_series_keep_a_flat_baseline() {
        let a = CategoryId::from("a");
        let b = CategoryId::from("b");
        let m = Matrix::from_entries(vec![
            (TimeBucket::year(2020), a.clone(), 2.0),
            (TimeBucket::year(2020), b.clone(), 1.0),
            (TimeBucket::year(2021), a, 2.0),
            (TimeBucket::year(2021), b, 1.0),
        ]);
        let layout = stack(&m, m.buckets(), StackOffset::Wiggle);
        assert_eq!(layout.band(0, 0), layout.band(1, 0));
        assert_eq!(layout.band(0, 1), layout.band(1, 1));
    }
}
