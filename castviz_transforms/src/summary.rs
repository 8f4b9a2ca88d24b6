// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box-plot summary adapter.
//!
//! Turns the per-speaker, per-interval summaries of a [`BoxplotInput`] into a flat table of
//! five-number entries keyed by `(category, bucket)`, plus the global value extent used for the
//! shared logarithmic y axis.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

#[cfg(not(feature = "std"))]
use castviz_core::FloatExt;
use castviz_core::{BoxplotInput, BoxplotSummary, CategoryId, TimeBucket, TopicInterval};
use tracing::{debug, warn};

/// One retained box-plot cell.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryEntry {
    /// Speaker.
    pub category: CategoryId,
    /// Interval, keyed by its start in whole seconds.
    pub bucket: TimeBucket,
    /// Interval end in seconds.
    pub end_sec: f64,
    /// Normalized five-number summary (`min <= q1 <= median <= q3 <= max`, all `>= 0`).
    pub summary: BoxplotSummary,
}

/// Retained box-plot entries for one episode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SummaryTable {
    entries: Vec<SummaryEntry>,
    categories: Vec<CategoryId>,
    totals: Vec<f64>,
    extent: Option<(f64, f64)>,
    episode_duration: f64,
    topics: Vec<TopicInterval>,
}

impl SummaryTable {
    /// Builds the table from a decoded box-plot input.
    ///
    /// Intervals whose `max == 0` carry no observed segments and are dropped, as are intervals with
    /// non-finite values or start offsets. Speakers are ranked by the sum of their retained medians
    /// (descending, ties by input order); speakers with no retained entries are omitted.
    pub fn from_input(input: &BoxplotInput) -> Self {
        let mut speakers: Vec<&CategoryId> = Vec::new();
        for id in input.speakers.iter().chain(input.speaker_stats.keys()) {
            if !speakers.contains(&id) {
                speakers.push(id);
            }
        }

        let mut entries = Vec::new();
        let mut ranked: Vec<(CategoryId, f64)> = Vec::new();
        for id in speakers {
            let Some(stats) = input.speaker_stats.get(id) else {
                continue;
            };
            let mut total = 0.0;
            let mut kept = 0_usize;
            for interval in &stats.temporal {
                if interval.boxplot.is_empty() {
                    debug!(
                        category = %id,
                        start = interval.interval_start_sec,
                        "skipping empty interval"
                    );
                    continue;
                }
                let Some(summary) = interval.boxplot.normalized() else {
                    warn!(
                        category = %id,
                        start = interval.interval_start_sec,
                        "non-finite boxplot values"
                    );
                    continue;
                };
                if summary.max == 0.0 {
                    continue;
                }
                let start = interval.interval_start_sec;
                if !start.is_finite() || !interval.interval_end_sec.is_finite() {
                    warn!(category = %id, "non-finite interval bounds");
                    continue;
                }
                total += summary.median;
                kept += 1;
                #[allow(clippy::cast_possible_truncation, reason = "finite offsets in seconds")]
                let start = start.round() as i64;
                entries.push(SummaryEntry {
                    category: id.clone(),
                    bucket: TimeBucket::starting_at(start),
                    end_sec: interval.interval_end_sec,
                    summary,
                });
            }
            if kept > 0 {
                ranked.push((id.clone(), total));
            }
        }
        // Stable sort keeps input order for equal totals.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let (categories, totals) = ranked.into_iter().unzip();

        let extent = entries.iter().fold(None, |acc: Option<(f64, f64)>, e| {
            Some(match acc {
                None => (e.summary.min, e.summary.max),
                Some((lo, hi)) => (lo.min(e.summary.min), hi.max(e.summary.max)),
            })
        });

        let last_end = input
            .speaker_stats
            .values()
            .flat_map(|s| s.temporal.iter())
            .map(|t| t.interval_end_sec)
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);
        let episode_duration =
            if input.episode_duration_sec.is_finite() && input.episode_duration_sec > 0.0 {
                input.episode_duration_sec
            } else {
                last_end
            };

        let topics = input
            .topics
            .iter()
            .filter(|t| t.position_sec.is_finite() && t.duration_sec.is_finite())
            .cloned()
            .collect();

        Self {
            entries,
            categories,
            totals,
            extent,
            episode_duration,
            topics,
        }
    }

    /// All retained entries, grouped by speaker in input order.
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    /// Retained speakers, ranked by descending sum of medians.
    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    /// Sum of retained medians per speaker, aligned with [`SummaryTable::categories`].
    pub fn category_totals(&self) -> &[f64] {
        &self.totals
    }

    /// Looks up the entry for `(category, bucket)`.
    pub fn get(&self, category: &CategoryId, bucket: TimeBucket) -> Option<&SummaryEntry> {
        self.entries
            .iter()
            .find(|e| e.bucket == bucket && &e.category == category)
    }

    /// Distinct interval buckets with their end offsets, ascending.
    pub fn intervals(&self) -> Vec<(TimeBucket, f64)> {
        let mut out: Vec<(TimeBucket, f64)> = Vec::new();
        for e in &self.entries {
            match out.iter_mut().find(|(b, _)| *b == e.bucket) {
                Some((_, end)) => *end = end.max(e.end_sec),
                None => out.push((e.bucket, e.end_sec)),
            }
        }
        out.sort_by_key(|(b, _)| *b);
        out
    }

    /// `(min, max)` over every retained summary, or `None` when nothing was retained.
    pub fn extent(&self) -> Option<(f64, f64)> {
        self.extent
    }

    /// Episode length in seconds; falls back to the latest interval end when the input omits it.
    pub fn episode_duration(&self) -> f64 {
        self.episode_duration
    }

    /// Topic annotations with finite bounds.
    pub fn topics(&self) -> &[TopicInterval] {
        &self.topics
    }

    /// Returns `true` when no interval survived filtering.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn input() -> BoxplotInput {
        BoxplotInput::from_json(
            r#"{
                "episodeDurationSec": 0,
                "speakers": ["guest", "host"],
                "speakerStats": {
                    "host": {"temporal": [
                        {"intervalStartSec": 0, "intervalEndSec": 600,
                         "boxplot": {"min": 2, "q1": 4, "median": 9, "q3": 12, "max": 40}},
                        {"intervalStartSec": 600, "intervalEndSec": 1200,
                         "boxplot": {"min": 0, "q1": 0, "median": 0, "q3": 0, "max": 0}}
                    ]},
                    "guest": {"temporal": [
                        {"intervalStartSec": 600, "intervalEndSec": 1150,
                         "boxplot": {"min": 1, "q1": 2, "median": 3, "q3": 5, "max": 8}}
                    ]},
                    "silent": {"temporal": [
                        {"intervalStartSec": 0, "intervalEndSec": 600,
                         "boxplot": {"min": 0, "q1": 0, "median": 0, "q3": 0, "max": 0}}
                    ]}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn empty_intervals_are_dropped() {
        let table = SummaryTable::from_input(&input());
        assert_eq!(table.entries().len(), 2);
        assert!(table.entries().iter().all(|e| e.summary.max > 0.0));
        assert!(table.get(&CategoryId::from("host"), TimeBucket::starting_at(600)).is_none());
    }

    #[test]
    fn zero_max_drops_interval_with_other_values_set() {
        let input = BoxplotInput::from_json(
            r#"{
                "speakers": ["host"],
                "speakerStats": {"host": {"temporal": [
                    {"intervalStartSec": 0, "intervalEndSec": 600,
                     "boxplot": {"min": 5, "q1": 4, "median": 3, "q3": 2, "max": 0}}
                ]}}
            }"#,
        )
        .unwrap();
        let table = SummaryTable::from_input(&input);
        assert!(table.is_empty());
        assert!(table.categories().is_empty());
        assert_eq!(table.extent(), None);
    }

    #[test]
    fn repeated_speaker_ids_count_once() {
        let input = BoxplotInput::from_json(
            r#"{
                "speakers": ["host", "host"],
                "speakerStats": {"host": {"temporal": [
                    {"intervalStartSec": 0, "intervalEndSec": 600,
                     "boxplot": {"min": 1, "q1": 2, "median": 3, "q3": 4, "max": 5}}
                ]}}
            }"#,
        )
        .unwrap();
        let table = SummaryTable::from_input(&input);
        assert_eq!(table.categories(), &[CategoryId::from("host")]);
        assert_eq!(table.entries().len(), 1);
        assert_eq!(table.category_totals(), &[3.0]);
    }

    #[test]
    fn speakers_ranked_by_median_sum_and_silent_ones_omitted() {
        let table = SummaryTable::from_input(&input());
        let ids: alloc::vec::Vec<&str> = table.categories().iter().map(CategoryId::as_str).collect();
        assert_eq!(ids, ["host", "guest"]);
        assert_eq!(table.category_totals(), &[9.0, 3.0]);
    }

    #[test]
    fn extent_and_duration_fallback() {
        let table = SummaryTable::from_input(&input());
        assert_eq!(table.extent(), Some((1.0, 40.0)));
        assert_eq!(table.episode_duration(), 1200.0);
        assert_eq!(
            table.intervals(),
            [(TimeBucket::starting_at(0), 600.0), (TimeBucket::starting_at(600), 1150.0)]
        );
    }

    #[test]
    fn empty_input_has_no_extent() {
        let table = SummaryTable::from_input(&BoxplotInput::default());
        assert!(table.is_empty());
        assert_eq!(table.extent(), None);
    }
}
