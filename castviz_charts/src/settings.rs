// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart settings read from the host's settings store.
//!
//! The store hands over a JSON snapshot. Every field is optional and validated here, at the read
//! boundary: out-of-range numbers are clamped and unknown values fall back to defaults (with a
//! warning). Only a document that is not JSON at all is an error.

extern crate alloc;

use alloc::string::{String, ToString};

use castviz_core::RadarMetric;
use castviz_transforms::StackOffset;
use peniko::Color;
use peniko::color::palette::css;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::scale::ScaleKind;

/// The only topic-clustering variant the charts are built against.
///
/// Settings naming any other variant are rewritten to this one.
pub const LOCKED_TOPIC_VARIANT: &str = "v2";

/// Smallest accepted top-N category count.
pub const MIN_TOP_N: usize = 1;
/// Largest accepted top-N category count.
pub const MAX_TOP_N: usize = 30;
/// Default top-N category count.
pub const DEFAULT_TOP_N: usize = 10;

/// Errors returned when decoding a settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The snapshot is not a JSON object.
    #[error("malformed settings at line {line}, column {column}: {message}")]
    Malformed {
        /// 1-based line of the failure.
        line: usize,
        /// 1-based column of the failure.
        column: usize,
        /// Decoder message.
        message: String,
    },
}

/// Color theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    /// Dark text on a light background.
    #[default]
    Light,
    /// Light text on a dark background.
    Dark,
}

impl Theme {
    /// Background fill.
    pub fn background(self) -> Color {
        match self {
            Self::Light => css::WHITE,
            Self::Dark => Color::from_rgb8(0x1e, 0x1e, 0x24),
        }
    }

    /// Label and placeholder text.
    pub fn text(self) -> Color {
        match self {
            Self::Light => css::DIM_GRAY,
            Self::Dark => css::GAINSBORO,
        }
    }

    /// Gridlines, rings and axes.
    pub fn grid(self) -> Color {
        match self {
            Self::Light => css::GAINSBORO,
            Self::Dark => css::DIM_GRAY,
        }
    }

    /// Annotation strip fill.
    pub fn annotation(self) -> Color {
        match self {
            Self::Light => css::WHITE_SMOKE,
            Self::Dark => css::DARK_SLATE_GRAY,
        }
    }
}

/// Chart size class; compact layouts keep labels closer to the plot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutSize {
    /// Small embedded charts.
    Compact,
    /// Full-page charts.
    #[default]
    Large,
}

impl LayoutSize {
    /// Radial label distance as a fraction of the radar radius.
    pub fn label_fraction(self) -> f64 {
        match self {
            Self::Compact => 1.15,
            Self::Large => 1.25,
        }
    }

    /// Label font size in scene units.
    pub fn font_size(self) -> f64 {
        match self {
            Self::Compact => 10.0,
            Self::Large => 12.0,
        }
    }
}

/// Validated chart settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSettings {
    /// Number of top categories shown.
    pub top_n: usize,
    /// River offset policy.
    pub stream_offset: StackOffset,
    /// Radar metric.
    pub radar_metric: RadarMetric,
    /// Radar radius scale.
    pub radar_scale: ScaleKind,
    /// Theme.
    pub theme: Theme,
    /// Layout size class.
    pub layout: LayoutSize,
    /// Topic-clustering variant, always [`LOCKED_TOPIC_VARIANT`].
    pub topic_variant: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            stream_offset: StackOffset::default(),
            radar_metric: RadarMetric::default(),
            radar_scale: ScaleKind::default(),
            theme: Theme::default(),
            layout: LayoutSize::default(),
            topic_variant: LOCKED_TOPIC_VARIANT.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    top_n: Option<Value>,
    stream_offset: Option<Value>,
    radar_metric: Option<Value>,
    radar_scale: Option<Value>,
    theme: Option<Value>,
    layout: Option<Value>,
    topic_variant: Option<Value>,
}

impl ChartSettings {
    /// Decodes and validates a settings snapshot.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let raw: RawSettings =
            serde_json::from_str(json).map_err(|e| SettingsError::Malformed {
                line: e.line(),
                column: e.column(),
                message: e.to_string(),
            })?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSettings) -> Self {
        let defaults = Self::default();

        let top_n = match raw.top_n {
            None => defaults.top_n,
            Some(v) => match v.as_f64().filter(|n| n.is_finite()) {
                Some(n) => {
                    let clamped = n.clamp(MIN_TOP_N as f64, MAX_TOP_N as f64);
                    if clamped != n {
                        warn!(requested = n, clamped, "topN out of range");
                    }
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "clamped to 1..=30 above"
                    )]
                    {
                        clamped as usize
                    }
                }
                None => {
                    warn!(value = %v, "topN is not a number, using default");
                    defaults.top_n
                }
            },
        };

        let stream_offset = pick(raw.stream_offset, "streamOffset", defaults.stream_offset, |s| {
            match s {
                "wiggle" => Some(StackOffset::Wiggle),
                "normalize" | "normalized" => Some(StackOffset::Normalize),
                _ => None,
            }
        });
        let radar_metric = pick(raw.radar_metric, "radarMetric", defaults.radar_metric, |s| {
            match s {
                "values" => Some(RadarMetric::Values),
                "durations" => Some(RadarMetric::Durations),
                "topicCounts" => Some(RadarMetric::TopicCounts),
                _ => None,
            }
        });
        let radar_scale = pick(raw.radar_scale, "radarScale", defaults.radar_scale, |s| match s {
            "linear" => Some(ScaleKind::Linear),
            "log" => Some(ScaleKind::Log),
            _ => None,
        });
        let theme = pick(raw.theme, "theme", defaults.theme, |s| match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        });
        let layout = pick(raw.layout, "layout", defaults.layout, |s| match s {
            "compact" => Some(LayoutSize::Compact),
            "large" => Some(LayoutSize::Large),
            _ => None,
        });

        if let Some(v) = raw.topic_variant
            && v.as_str() != Some(LOCKED_TOPIC_VARIANT)
        {
            warn!(requested = %v, locked = LOCKED_TOPIC_VARIANT, "topic variant is locked");
        }

        Self {
            top_n,
            stream_offset,
            radar_metric,
            radar_scale,
            theme,
            layout,
            topic_variant: defaults.topic_variant,
        }
    }
}

fn pick<T>(value: Option<Value>, field: &str, default: T, parse: impl Fn(&str) -> Option<T>) -> T {
    let Some(value) = value else {
        return default;
    };
    match value.as_str().and_then(&parse) {
        Some(v) => v,
        None => {
            warn!(field, value = %value, "unknown setting value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(ChartSettings::from_json("{}").unwrap(), ChartSettings::default());
    }

    #[test]
    fn values_are_parsed_and_clamped() {
        let s = ChartSettings::from_json(
            r#"{"topN": 99, "streamOffset": "normalize", "radarMetric": "topicCounts",
                "radarScale": "log", "theme": "dark", "layout": "compact"}"#,
        )
        .unwrap();
        assert_eq!(s.top_n, MAX_TOP_N);
        assert_eq!(s.stream_offset, StackOffset::Normalize);
        assert_eq!(s.radar_metric, RadarMetric::TopicCounts);
        assert_eq!(s.radar_scale, ScaleKind::Log);
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.layout, LayoutSize::Compact);

        let low = ChartSettings::from_json(r#"{"topN": 0}"#).unwrap();
        assert_eq!(low.top_n, MIN_TOP_N);
    }

    #[test]
    fn unknown_values_fall_back_and_variant_stays_locked() {
        let s = ChartSettings::from_json(
            r#"{"topN": "many", "theme": "sepia", "streamOffset": 3, "topicVariant": "v1"}"#,
        )
        .unwrap();
        assert_eq!(s.top_n, DEFAULT_TOP_N);
        assert_eq!(s.theme, Theme::Light);
        assert_eq!(s.stream_offset, StackOffset::Wiggle);
        assert_eq!(s.topic_variant, LOCKED_TOPIC_VARIANT);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = ChartSettings::from_json("{ topN: }").unwrap_err();
        let SettingsError::Malformed { line, .. } = err;
        assert_eq!(line, 1);
    }
}
