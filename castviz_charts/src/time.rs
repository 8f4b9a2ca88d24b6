// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Episode-time ticks and duration labels.
//!
//! Time is a numeric value in **seconds** from the start of an episode.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use castviz_core::FloatExt;

/// Returns "nice-ish" tick values for a time domain expressed in seconds.
///
/// Steps snap to whole seconds, minutes, or hours. Ticks stay within `[min, max]`.
pub fn nice_time_ticks_seconds(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }

    let step = nice_time_step_seconds((max - min) / count as f64);
    if step == 0.0 {
        return alloc::vec![min, max];
    }

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

fn nice_time_step_seconds(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }

    const STEPS: &[f64] = &[
        1.0,
        2.0,
        5.0,
        10.0,
        15.0,
        30.0,
        60.0,
        2.0 * 60.0,
        5.0 * 60.0,
        10.0 * 60.0,
        15.0 * 60.0,
        30.0 * 60.0,
        60.0 * 60.0,
        2.0 * 60.0 * 60.0,
        3.0 * 60.0 * 60.0,
        6.0 * 60.0 * 60.0,
    ];

    for &s in STEPS {
        if s >= step {
            return s;
        }
    }
    let hours = (step / 3600.0).ceil();
    hours.max(1.0) * 3600.0
}

/// Formats a duration in seconds as `m:ss` below one hour and `h:mm:ss` from one hour on.
///
/// Sub-second durations (which only appear as log-axis ticks) keep one decimal, e.g. `0.5s`.
pub fn format_duration(v: f64) -> String {
    if !v.is_finite() {
        return alloc::format!("{v}");
    }

    let sign = if v < 0.0 { "-" } else { "" };
    let abs = v.abs();
    if abs > 0.0 && abs < 1.0 {
        return alloc::format!("{sign}{abs:.1}s");
    }
    let secs = {
        let secs_f = abs.round().min(i64::MAX as f64);
        #[allow(clippy::cast_possible_truncation, reason = "clamped to the i64 range")]
        {
            secs_f as i64
        }
    };

    let h = secs / 3600;
    let m = (secs / 60) % 60;
    let s = secs % 60;

    if h > 0 {
        alloc::format!("{sign}{h}:{m:02}:{s:02}")
    } else {
        alloc::format!("{sign}{m}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn time_ticks_choose_minute_steps_for_long_spans() {
        let ticks = nice_time_ticks_seconds(0.0, 3600.0, 6);
        assert_eq!(ticks.first(), Some(&0.0));
        let step = ticks[1] - ticks[0];
        assert_eq!(step, 600.0);
        assert_eq!(ticks.last(), Some(&3600.0));
    }

    #[test]
    fn durations_use_minutes_then_hours() {
        assert_eq!(format_duration(5.0), "0:05");
        assert_eq!(format_duration(65.0), "1:05");
        assert_eq!(format_duration(3723.0), "1:02:03");
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(0.5), "0.5s");
    }
}
