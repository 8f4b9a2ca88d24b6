// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float helpers for `no_std` builds.
//!
//! Rust's float math methods like `f64::ln` and `f64::floor` are not available in `core`.
//! This trait dispatches to either `std` or `libm` depending on features, and is re-exported so
//! the chart crates can share one implementation.

/// Float math helpers for `f64` in `no_std` mode.
///
/// With the `std` feature enabled the inherent methods take precedence, so callers only import
/// this trait under `#[cfg(not(feature = "std"))]`.
pub trait FloatExt {
    /// Largest integer less than or equal to `self`.
    fn floor(self) -> Self;
    /// Smallest integer greater than or equal to `self`.
    fn ceil(self) -> Self;
    /// Nearest integer, rounding half-way cases away from zero.
    fn round(self) -> Self;
    /// Natural logarithm.
    fn ln(self) -> Self;
    /// Base-10 logarithm.
    fn log10(self) -> Self;
    /// `e^self`.
    fn exp(self) -> Self;
    /// `self^n` for an integer exponent.
    fn powi(self, n: i32) -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
}

#[cfg(feature = "std")]
impl FloatExt for f64 {
    fn floor(self) -> Self {
        Self::floor(self)
    }

    fn ceil(self) -> Self {
        Self::ceil(self)
    }

    fn round(self) -> Self {
        Self::round(self)
    }

    fn ln(self) -> Self {
        Self::ln(self)
    }

    fn log10(self) -> Self {
        Self::log10(self)
    }

    fn exp(self) -> Self {
        Self::exp(self)
    }

    fn powi(self, n: i32) -> Self {
        Self::powi(self, n)
    }

    fn sqrt(self) -> Self {
        Self::sqrt(self)
    }
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
impl FloatExt for f64 {
    fn floor(self) -> Self {
        libm::floor(self)
    }

    fn ceil(self) -> Self {
        libm::ceil(self)
    }

    fn round(self) -> Self {
        libm::round(self)
    }

    fn ln(self) -> Self {
        libm::log(self)
    }

    fn log10(self) -> Self {
        libm::log10(self)
    }

    fn exp(self) -> Self {
        libm::exp(self)
    }

    fn powi(self, n: i32) -> Self {
        if n == 0 {
            return 1.0;
        }

        let mut exp = i64::from(n);
        let mut base = self;
        if exp < 0 {
            base = 1.0 / base;
            exp = -exp;
        }

        let mut acc = 1.0;
        let mut e = exp as u64;
        while e != 0 {
            if (e & 1) != 0 {
                acc *= base;
            }
            base *= base;
            e >>= 1;
        }
        acc
    }

    fn sqrt(self) -> Self {
        libm::sqrt(self)
    }
}

/// Euclidean remainder of `x` by a positive modulus, always in `[0, m)`.
pub fn rem_euclid(x: f64, m: f64) -> f64 {
    let r = x % m;
    if r >= 0.0 {
        return r;
    }
    // A tiny negative remainder can round up to exactly `m`.
    let wrapped = r + m;
    if wrapped >= m { 0.0 } else { wrapped }
}

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("castviz_core requires either the `std` or `libm` feature");
