// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pre-aggregated JSON shapes consumed by the charts.
//!
//! All shapes are read-only snapshots produced by the analytics backend. Unknown fields are
//! ignored and optional collections default to empty, so partially populated documents still
//! decode.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;

use crate::error::InputError;
use crate::model::{BoxplotSummary, CategoryId};

/// Which numeric map of a [`RadarInput`] drives the radar radius.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RadarMetric {
    /// Episode/appearance counts.
    #[default]
    Values,
    /// Total speaking or topic duration in seconds.
    Durations,
    /// Number of distinct topics.
    TopicCounts,
}

/// Per-category numeric maps for one radar snapshot (typically one year).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadarInput {
    /// Counts per category.
    pub values: BTreeMap<CategoryId, f64>,
    /// Durations (seconds) per category.
    pub durations: BTreeMap<CategoryId, f64>,
    /// Topic counts per category.
    pub topic_counts: BTreeMap<CategoryId, f64>,
}

impl RadarInput {
    /// Decodes a radar snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        serde_json::from_str(json).map_err(|e| InputError::from_json("radar", &e))
    }

    /// Returns the map selected by `metric`.
    pub fn metric(&self, metric: RadarMetric) -> &BTreeMap<CategoryId, f64> {
        match metric {
            RadarMetric::Values => &self.values,
            RadarMetric::Durations => &self.durations,
            RadarMetric::TopicCounts => &self.topic_counts,
        }
    }
}

/// Global statistics block of a river input.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiverStatistics {
    /// All years covered by the dataset.
    pub years: Vec<i32>,
}

/// Reference to one episode contributing to a year count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct EpisodeRef {
    /// Episode number.
    pub number: u32,
}

/// One year's count for a river series.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearCount {
    /// Calendar year.
    pub year: i32,
    /// Magnitude for the year.
    pub count: f64,
    /// Episodes behind the count.
    #[serde(default)]
    pub episodes: Vec<EpisodeRef>,
}

/// One subject's (or speaker's) series.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiverSeries {
    /// Display name.
    pub name: String,
    /// Total number of episodes featuring the category.
    pub total_episodes: u32,
    /// Per-year counts.
    pub year_data: Vec<YearCount>,
}

/// Input for river (stream) charts: subjects or speakers over years.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiverInput {
    /// Dataset-wide statistics.
    pub statistics: RiverStatistics,
    /// Series keyed by category id. Accepts either `subjects` or `speakers`.
    #[serde(alias = "speakers")]
    pub subjects: BTreeMap<CategoryId, RiverSeries>,
}

impl RiverInput {
    /// Decodes a river input from JSON.
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        serde_json::from_str(json).map_err(|e| InputError::from_json("river", &e))
    }

    /// Returns the display name of a category, if known and non-empty.
    pub fn name(&self, id: &CategoryId) -> Option<&str> {
        self.subjects
            .get(id)
            .map(|s| s.name.as_str())
            .filter(|n| !n.is_empty())
    }
}

/// One fixed-width interval of a speaker's duration statistics.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalInterval {
    /// Interval start in seconds from the episode start.
    pub interval_start_sec: f64,
    /// Interval end in seconds from the episode start.
    pub interval_end_sec: f64,
    /// Segment-duration summary for the interval.
    pub boxplot: BoxplotSummary,
}

/// Per-speaker duration statistics.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeakerStats {
    /// Intervals in time order.
    pub temporal: Vec<TemporalInterval>,
}

/// A topic span used to annotate the box-plot time axis.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInterval {
    /// Start of the topic in seconds.
    pub position_sec: f64,
    /// Length of the topic in seconds.
    pub duration_sec: f64,
    /// Topic label.
    pub topic: String,
}

/// Input for the per-speaker duration box plot of one episode.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxplotInput {
    /// Episode length in seconds.
    pub episode_duration_sec: f64,
    /// Speakers in display order.
    pub speakers: Vec<CategoryId>,
    /// Statistics keyed by speaker.
    pub speaker_stats: BTreeMap<CategoryId, SpeakerStats>,
    /// Optional topic annotations.
    pub topics: Vec<TopicInterval>,
}

impl BoxplotInput {
    /// Decodes a box-plot input from JSON.
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        serde_json::from_str(json).map_err(|e| InputError::from_json("boxplot", &e))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn radar_metric_selects_map() {
        let input = RadarInput::from_json(
            r#"{"values":{"a":3},"durations":{"a":120.5},"topicCounts":{"a":7}}"#,
        )
        .unwrap();
        let a = CategoryId::from("a");
        assert_eq!(input.metric(RadarMetric::Values)[&a], 3.0);
        assert_eq!(input.metric(RadarMetric::Durations)[&a], 120.5);
        assert_eq!(input.metric(RadarMetric::TopicCounts)[&a], 7.0);
    }

    #[test]
    fn river_accepts_speakers_alias_and_missing_fields() {
        let input = RiverInput::from_json(
            r#"{
                "statistics": {"years": [2020, 2021]},
                "speakers": {
                    "s1": {"name": "Ann", "totalEpisodes": 4,
                           "yearData": [{"year": 2020, "count": 3, "episodes": [{"number": 12}]}]},
                    "s2": {}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(input.statistics.years, [2020, 2021]);
        assert_eq!(input.name(&CategoryId::from("s1")), Some("Ann"));
        assert_eq!(input.name(&CategoryId::from("s2")), None);
        assert_eq!(input.subjects[&CategoryId::from("s1")].year_data[0].episodes[0].number, 12);
    }

    #[test]
    fn boxplot_input_decodes_intervals_and_topics() {
        let input = BoxplotInput::from_json(
            r#"{
                "episodeDurationSec": 1800,
                "speakers": ["host"],
                "speakerStats": {"host": {"temporal": [
                    {"intervalStartSec": 0, "intervalEndSec": 600,
                     "boxplot": {"min": 1, "q1": 2, "median": 3, "q3": 4, "max": 5}}
                ]}},
                "topics": [{"positionSec": 30, "durationSec": 90, "topic": "Intro"}]
            }"#,
        )
        .unwrap();
        let host = &input.speaker_stats[&CategoryId::from("host")];
        assert_eq!(host.temporal[0].boxplot.median, 3.0);
        assert_eq!(input.topics[0].topic, "Intro");
    }

    #[test]
    fn malformed_json_reports_location() {
        let err = RiverInput::from_json("{\n  \"statistics\": 5\n}").unwrap_err();
        let InputError::Malformed { shape, line, .. } = err;
        assert_eq!(shape, "river");
        assert_eq!(line, 2);
    }
}
