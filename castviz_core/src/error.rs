// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for the fallible input boundary.

extern crate alloc;

use alloc::string::{String, ToString};

/// Errors returned when decoding chart input JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The document is not valid JSON or does not match the expected shape.
    #[error("malformed {shape} input at line {line}, column {column}: {message}")]
    Malformed {
        /// Which input shape was being decoded.
        shape: &'static str,
        /// 1-based line of the failure (0 if unknown).
        line: usize,
        /// 1-based column of the failure (0 if unknown).
        column: usize,
        /// Decoder message.
        message: String,
    },
}

impl InputError {
    pub(crate) fn from_json(shape: &'static str, err: &serde_json::Error) -> Self {
        Self::Malformed {
            shape,
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}
