// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Domain-to-pixel scales.
//!
//! Continuous scales map exactly the authored domain onto the range. There is no implicit
//! "nice" rounding of bounds; [`ScaleMapper::ticks`] only suggests guide positions.

extern crate alloc;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use castviz_core::FloatExt;

/// Smallest lower bound accepted by a log domain.
pub const LOG_EPSILON: f64 = 0.1;

/// Continuous scale kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScaleKind {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Base-10 logarithmic interpolation.
    Log,
}

/// Clamps a domain so it is valid for a log scale.
///
/// The lower bound is raised to [`LOG_EPSILON`] when it is not a positive value above it (real
/// data often contains zeros), and the upper bound is bumped when the domain would be empty.
pub fn clamp_log_domain((lo, hi): (f64, f64)) -> (f64, f64) {
    let lo = if lo.is_finite() && lo > LOG_EPSILON {
        lo
    } else {
        LOG_EPSILON
    };
    let hi = if hi.is_finite() && hi > lo {
        hi
    } else {
        lo * 1.1
    };
    (lo, hi)
}

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Maps a range value back into domain space.
    pub fn invert(&self, y: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = r1 - r0;
        if denom == 0.0 {
            return d0;
        }
        let t = (y - r0) / denom;
        d0 + t * (d1 - d0)
    }

    /// Returns the configured domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns the configured range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns "nice-ish" tick values covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }
}

/// A base-10 log mapping from a positive domain to a range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLog {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLog {
    /// Creates a new log scale; the domain is passed through [`clamp_log_domain`].
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain: clamp_log_domain(domain),
            range,
        }
    }

    /// Maps a value from domain space into range space.
    ///
    /// Values at or below zero map to the start of the range.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if x <= 0.0 {
            return r0;
        }
        let ld0 = d0.log10();
        let denom = d1.log10() - ld0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x.log10() - ld0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Maps a range value back into domain space.
    pub fn invert(&self, y: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = r1 - r0;
        if denom == 0.0 {
            return d0;
        }
        let t = (y - r0) / denom;
        let ld0 = d0.log10();
        let l = ld0 + t * (d1.log10() - ld0);
        (l * core::f64::consts::LN_10).exp()
    }

    /// Returns the (clamped) domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns the configured range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns tick values for the domain: the 1-2-5 multiples of each power of ten that fall
    /// inside it, thinned to plain powers of ten when that would exceed `count`.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        if count == 0 {
            return Vec::new();
        }
        let (min, max) = self.domain;
        let min_e = exponent(min.log10().floor());
        let max_e = exponent(max.log10().ceil());
        let within = |v: f64| v >= min * (1.0 - 1e-9) && v <= max * (1.0 + 1e-9);

        let mut out = Vec::new();
        for e in min_e..=max_e {
            let base = 10_f64.powi(e);
            for m in [1.0, 2.0, 5.0] {
                let v = base * m;
                if within(v) {
                    out.push(v);
                }
            }
        }
        if out.len() > count {
            out.retain(|v| {
                let l = v.log10();
                (l - l.round()).abs() < 1e-9
            });
        }
        out
    }
}

fn exponent(e: f64) -> i32 {
    let e = e.clamp(-300.0, 300.0);
    #[allow(clippy::cast_possible_truncation, reason = "clamped to a small range")]
    {
        e as i32
    }
}

/// A continuous scale selected at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleMapper {
    /// Linear scale.
    Linear(ScaleLinear),
    /// Log scale.
    Log(ScaleLog),
}

impl ScaleMapper {
    /// Creates a scale of the given kind.
    pub fn new(kind: ScaleKind, domain: (f64, f64), range: (f64, f64)) -> Self {
        match kind {
            ScaleKind::Linear => Self::Linear(ScaleLinear::new(domain, range)),
            ScaleKind::Log => Self::Log(ScaleLog::new(domain, range)),
        }
    }

    /// Returns the scale kind.
    pub fn kind(&self) -> ScaleKind {
        match self {
            Self::Linear(_) => ScaleKind::Linear,
            Self::Log(_) => ScaleKind::Log,
        }
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        match self {
            Self::Linear(s) => s.map(x),
            Self::Log(s) => s.map(x),
        }
    }

    /// Maps a range value back into domain space.
    pub fn invert(&self, y: f64) -> f64 {
        match self {
            Self::Linear(s) => s.invert(y),
            Self::Log(s) => s.invert(y),
        }
    }

    /// Returns the effective domain.
    pub fn domain(&self) -> (f64, f64) {
        match self {
            Self::Linear(s) => s.domain(),
            Self::Log(s) => s.domain(),
        }
    }

    /// Returns tick values.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match self {
            Self::Linear(s) => s.ticks(count),
            Self::Log(s) => s.ticks(count),
        }
    }
}

pub(crate) fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let span = max - min;
    let step = nice_step(span / count as f64);
    if step == 0.0 {
        return alloc::vec![min, max];
    }

    // Ticks stay inside the domain: bounds are not rounded outward.
    let start = (min / step).ceil() * step;
    let n_f = ((max - start) / step + 1e-9).floor();
    let n = if n_f.is_finite() && n_f >= 0.0 {
        let n_f = n_f.min(10_000.0);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded by finite/non-negative checks and capped at 10k"
        )]
        {
            n_f as u64
        }
    } else {
        0
    };
    (0..=n).map(|i| start + step * i as f64).collect()
}

fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powi(exponent(power));
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// A discrete band scale, used to split one time interval between speakers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    /// Creates a new band scale covering `count` bands over `range`.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Sets inner and outer padding in band units.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Returns the computed band width.
    pub fn band_width(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let span = (r1 - r0).abs();
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        if denom == 0.0 { 0.0 } else { span / denom }
    }

    /// Returns the number of bands.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the start position of the band at `index`.
    pub fn x(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let bw = self.band_width();
        let step = bw * (1.0 + self.padding_inner);
        let start = if r1 >= r0 { r0 } else { r1 };
        start + bw * self.padding_outer + step * index as f64
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn log_scale_maps_endpoints_to_range() {
        let s = ScaleLog::new((1.0, 100.0), (0.0, 10.0));
        assert!((s.map(1.0) - 0.0).abs() < 1e-9);
        assert!((s.map(100.0) - 10.0).abs() < 1e-9);
        assert!((s.map(10.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn log_domain_is_clamped_and_never_empty() {
        assert_eq!(clamp_log_domain((0.0, 50.0)), (LOG_EPSILON, 50.0));
        let (lo, hi) = clamp_log_domain((0.0, 0.0));
        assert_eq!(lo, LOG_EPSILON);
        assert!(hi > lo);
        let s = ScaleLog::new((0.0, 0.0), (0.0, 100.0));
        assert!(s.map(LOG_EPSILON).is_finite());
    }

    #[test]
    fn linear_domain_is_not_rounded() {
        let s = ScaleLinear::new((3.0, 97.0), (0.0, 1.0));
        assert_eq!(s.domain(), (3.0, 97.0));
        assert_eq!(s.map(97.0), 1.0);
        let ticks = s.ticks(5);
        assert!(ticks.iter().all(|t| (3.0..=97.0).contains(t)), "{ticks:?}");
    }

    #[test]
    fn degenerate_linear_domain_maps_to_range_start() {
        let s = ScaleLinear::new((5.0, 5.0), (10.0, 20.0));
        assert_eq!(s.map(5.0), 10.0);
        assert_eq!(s.invert(15.0), 5.0);
    }

    #[test]
    fn log_ticks_thin_to_powers_of_ten() {
        let s = ScaleLog::new((0.1, 1000.0), (0.0, 1.0));
        assert_eq!(s.ticks(5), alloc::vec![0.1, 1.0, 10.0, 100.0, 1000.0]);
        let dense = s.ticks(100);
        assert!(dense.contains(&20.0));
    }

    #[test]
    fn band_positions_are_monotonic() {
        let scale = ScaleBand::new((0.0, 100.0), 3).with_padding(0.2, 0.1);
        assert!(scale.x(0) < scale.x(1));
        assert!(scale.x(1) + scale.band_width() < scale.x(2));
        assert!(scale.x(2) + scale.band_width() <= 100.0 + 1e-9);
    }

    proptest! {
        #[test]
        fn linear_invert_round_trips(
            d0 in -1e6_f64..1e6,
            span in 1e-3_f64..1e6,
            r0 in -1e4_f64..1e4,
            rspan in 1.0_f64..1e4,
            t in 0.0_f64..1.0,
        ) {
            let s = ScaleLinear::new((d0, d0 + span), (r0, r0 + rspan));
            let x = d0 + t * span;
            let back = s.invert(s.map(x));
            prop_assert!((back - x).abs() <= 1e-6 * (1.0 + x.abs()), "{} -> {}", x, back);
        }

        #[test]
        fn log_invert_round_trips(
            lo in 0.1_f64..100.0,
            factor in 1.5_f64..1e4,
            t in 0.0_f64..1.0,
        ) {
            let hi = lo * factor;
            let s = ScaleMapper::new(ScaleKind::Log, (lo, hi), (400.0, 0.0));
            let x = lo + t * (hi - lo);
            let back = s.invert(s.map(x));
            prop_assert!((back - x).abs() <= 1e-6 * x, "{} -> {}", x, back);
        }
    }
}
