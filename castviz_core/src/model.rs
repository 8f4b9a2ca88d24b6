// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core data model: categories, time buckets, and the bucket × category magnitude matrix.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use hashbrown::HashMap;
use peniko::Color;
use serde::Deserialize;

/// Stable identifier of a plotted category (a subject or a speaker).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Creates a category id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(String::from(value))
    }
}

impl From<String> for CategoryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A category with its display name and assigned color.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    /// Stable identifier.
    pub id: CategoryId,
    /// Human readable name used for labels.
    pub name: String,
    /// Color assigned by rank (see [`crate::CategoryPalette`]).
    pub color: Color,
}

/// A time bucket: either a calendar year or the start (in seconds) of a fixed-width interval.
///
/// Buckets order by their raw value, which is what layout uses for the time axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeBucket(i64);

impl TimeBucket {
    /// A calendar-year bucket.
    pub const fn year(year: i32) -> Self {
        Self(year as i64)
    }

    /// An interval bucket keyed by its start offset in seconds.
    pub const fn starting_at(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns the raw ordering value (year or start seconds).
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns the raw value as `f64` for scale mapping.
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Five-number summary for one (category, interval) cell of a duration box plot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct BoxplotSummary {
    /// Lower whisker.
    pub min: f64,
    /// First quartile.
    pub q1: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q3: f64,
    /// Upper whisker.
    pub max: f64,
}

impl BoxplotSummary {
    /// Creates a summary from its five values (in order).
    pub const fn new(min: f64, q1: f64, median: f64, q3: f64, max: f64) -> Self {
        Self {
            min,
            q1,
            median,
            q3,
            max,
        }
    }

    /// `max == 0` means no segments were observed in the interval.
    pub fn is_empty(&self) -> bool {
        self.max == 0.0
    }

    /// Returns the summary with negative values clamped to zero and the five values in
    /// non-decreasing order.
    ///
    /// Returns `None` if any value is not finite.
    pub fn normalized(&self) -> Option<Self> {
        let mut v = [self.min, self.q1, self.median, self.q3, self.max];
        if v.iter().any(|x| !x.is_finite()) {
            return None;
        }
        for x in &mut v {
            *x = x.max(0.0);
        }
        v.sort_unstable_by(f64::total_cmp);
        Some(Self::new(v[0], v[1], v[2], v[3], v[4]))
    }
}

/// Dense bucket × category magnitude table.
///
/// Buckets are kept in ascending order. Missing entries are `0.0`; negative and non-finite inputs
/// are stored as `0.0` too, so every cell is a valid non-negative magnitude.
#[derive(Clone, Debug, Default)]
pub struct Matrix {
    buckets: Vec<TimeBucket>,
    categories: Vec<CategoryId>,
    values: Vec<f64>,
    index: HashMap<CategoryId, usize>,
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.buckets == other.buckets
            && self.categories == other.categories
            && self.values == other.values
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

impl Matrix {
    /// Creates an all-zero matrix.
    ///
    /// Buckets are sorted and deduplicated; duplicate categories keep their first position.
    pub fn zeros(mut buckets: Vec<TimeBucket>, categories: Vec<CategoryId>) -> Self {
        buckets.sort_unstable();
        buckets.dedup();
        let mut index = HashMap::with_capacity(categories.len());
        let mut unique = Vec::with_capacity(categories.len());
        for id in categories {
            if !index.contains_key(&id) {
                index.insert(id.clone(), unique.len());
                unique.push(id);
            }
        }
        let values = alloc::vec![0.0; buckets.len() * unique.len()];
        Self {
            buckets,
            categories: unique,
            values,
            index,
        }
    }

    /// Builds a matrix by accumulating `(bucket, category, magnitude)` entries.
    ///
    /// Categories end up ranked by descending total (ties broken by id), which is the order color
    /// assignment and top-N filtering rely on.
    pub fn from_entries(entries: impl IntoIterator<Item = (TimeBucket, CategoryId, f64)>) -> Self {
        let entries: Vec<_> = entries.into_iter().collect();
        let buckets = entries.iter().map(|(b, _, _)| *b).collect();
        let categories = entries.iter().map(|(_, c, _)| c.clone()).collect();
        let mut m = Self::zeros(buckets, categories);
        for (bucket, category, value) in entries {
            if let (Some(b), Some(c)) = (m.bucket_index(bucket), m.category_index(&category)) {
                m.add(b, c, value);
            }
        }
        m.ranked()
    }

    /// Ordered buckets (ascending).
    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    /// Categories in column order.
    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    /// Returns the row index of `bucket`, if present.
    pub fn bucket_index(&self, bucket: TimeBucket) -> Option<usize> {
        self.buckets.binary_search(&bucket).ok()
    }

    /// Returns the column index of `category`, if present.
    pub fn category_index(&self, category: &CategoryId) -> Option<usize> {
        self.index.get(category).copied()
    }

    /// Returns the magnitude at `(bucket, category)` indices, `0.0` when out of range.
    pub fn get(&self, bucket: usize, category: usize) -> f64 {
        if category >= self.categories.len() {
            return 0.0;
        }
        self.values
            .get(bucket * self.categories.len() + category)
            .copied()
            .unwrap_or(0.0)
    }

    /// Returns the magnitude for a bucket/category pair, `0.0` when either is unknown.
    pub fn value(&self, bucket: TimeBucket, category: &CategoryId) -> f64 {
        match (self.bucket_index(bucket), self.category_index(category)) {
            (Some(b), Some(c)) => self.get(b, c),
            _ => 0.0,
        }
    }

    /// Adds a magnitude to a cell. Invalid magnitudes are ignored.
    pub fn add(&mut self, bucket: usize, category: usize, value: f64) {
        let width = self.categories.len();
        if category >= width {
            return;
        }
        if let Some(cell) = self.values.get_mut(bucket * width + category) {
            *cell += sanitize(value);
        }
    }

    /// Returns one bucket's row (one value per category).
    pub fn row(&self, bucket: usize) -> &[f64] {
        let width = self.categories.len();
        self.values
            .get(bucket * width..(bucket + 1) * width)
            .unwrap_or(&[])
    }

    /// Sum of one bucket's row.
    pub fn bucket_total(&self, bucket: usize) -> f64 {
        self.row(bucket).iter().sum()
    }

    /// Per-category totals across all buckets, in column order.
    pub fn category_totals(&self) -> Vec<f64> {
        let mut totals = alloc::vec![0.0; self.categories.len()];
        for b in 0..self.buckets.len() {
            for (t, v) in totals.iter_mut().zip(self.row(b)) {
                *t += v;
            }
        }
        totals
    }

    /// Returns `true` when no cell holds a positive magnitude.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Reorders the columns by descending total, breaking ties by category id.
    pub fn ranked(self) -> Self {
        let totals = self.category_totals();
        let mut order: Vec<usize> = (0..self.categories.len()).collect();
        order.sort_by(|&a, &b| {
            totals[b]
                .partial_cmp(&totals[a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.categories[a].cmp(&self.categories[b]))
        });
        let categories: Vec<CategoryId> =
            order.iter().map(|&i| self.categories[i].clone()).collect();
        let buckets = self.buckets.clone();
        self.select(&buckets, &categories)
    }

    /// Returns the first `n` categories of the column order.
    ///
    /// On a [`Matrix::ranked`] matrix these are the `n` largest categories.
    pub fn top_categories(&self, n: usize) -> Vec<CategoryId> {
        self.categories.iter().take(n).cloned().collect()
    }

    /// Extracts a sub-matrix with the given buckets and categories (in the given column order).
    ///
    /// Unknown buckets or categories produce zero-filled rows/columns.
    pub fn select(&self, buckets: &[TimeBucket], categories: &[CategoryId]) -> Self {
        let mut out = Self::zeros(buckets.to_vec(), categories.to_vec());
        for (bi, bucket) in out.buckets.clone().into_iter().enumerate() {
            let Some(src_b) = self.bucket_index(bucket) else {
                continue;
            };
            for ci in 0..out.categories.len() {
                if let Some(src_c) = self.category_index(&out.categories[ci]) {
                    let v = self.get(src_b, src_c);
                    out.add(bi, ci, v);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn id(s: &str) -> CategoryId {
        CategoryId::from(s)
    }

    #[test]
    fn missing_entries_read_as_zero() {
        let m = Matrix::from_entries(vec![
            (TimeBucket::year(2021), id("a"), 3.0),
            (TimeBucket::year(2022), id("b"), 1.0),
        ]);
        assert_eq!(m.value(TimeBucket::year(2021), &id("b")), 0.0);
        assert_eq!(m.value(TimeBucket::year(2030), &id("a")), 0.0);
        assert_eq!(m.row(0).len(), 2, "row width equals category count");
    }

    #[test]
    fn columns_are_ranked_by_descending_total_then_id() {
        let m = Matrix::from_entries(vec![
            (TimeBucket::year(2020), id("small"), 1.0),
            (TimeBucket::year(2020), id("big"), 5.0),
            (TimeBucket::year(2021), id("tie_b"), 2.0),
            (TimeBucket::year(2021), id("tie_a"), 2.0),
        ]);
        let names: Vec<&str> = m.categories().iter().map(CategoryId::as_str).collect();
        assert_eq!(names, vec!["big", "tie_a", "tie_b", "small"]);
    }

    #[test]
    fn negative_and_nan_magnitudes_are_stored_as_zero() {
        let m = Matrix::from_entries(vec![
            (TimeBucket::year(2020), id("a"), -4.0),
            (TimeBucket::year(2020), id("b"), f64::NAN),
            (TimeBucket::year(2020), id("c"), 2.0),
        ]);
        assert_eq!(m.bucket_total(0), 2.0);
    }

    #[test]
    fn select_keeps_requested_order_and_zero_fills() {
        let m = Matrix::from_entries(vec![
            (TimeBucket::year(2020), id("a"), 1.0),
            (TimeBucket::year(2021), id("b"), 2.0),
        ]);
        let sub = m.select(
            &[TimeBucket::year(2021), TimeBucket::year(2019)],
            &[id("b"), id("zz")],
        );
        assert_eq!(sub.buckets(), &[TimeBucket::year(2019), TimeBucket::year(2021)]);
        assert_eq!(sub.get(1, 0), 2.0);
        assert_eq!(sub.get(0, 0), 0.0);
        assert_eq!(sub.get(1, 1), 0.0);
    }

    #[test]
    fn boxplot_summary_normalization_sorts_and_clamps() {
        let s = BoxplotSummary::new(5.0, -1.0, 3.0, 10.0, 4.0)
            .normalized()
            .expect("finite values");
        assert_eq!(s, BoxplotSummary::new(0.0, 3.0, 4.0, 5.0, 10.0));
        assert!(
            BoxplotSummary::new(0.0, 1.0, f64::INFINITY, 2.0, 3.0)
                .normalized()
                .is_none()
        );
    }
}
