// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic category colors.
//!
//! Categories are colored by rank (descending total magnitude). The first ranks take colors from
//! a fixed named palette; later ranks fall back to generated HSL colors whose hue advances by the
//! golden angle so neighbouring ranks stay distinguishable.

extern crate alloc;

use alloc::vec::Vec;

use peniko::Color;
use peniko::color::palette::css;

use crate::model::{Category, CategoryId};

/// Hue step (degrees) between consecutive generated colors.
pub const GOLDEN_ANGLE_DEG: f32 = 137.508;

const PALETTE: [Color; 10] = [
    css::CORNFLOWER_BLUE,
    css::ORANGE,
    css::MEDIUM_SEA_GREEN,
    css::CRIMSON,
    css::GOLDENROD,
    css::SLATE_BLUE,
    css::DARK_CYAN,
    css::HOT_PINK,
    css::SIENNA,
    css::OLIVE_DRAB,
];

const SATURATIONS: [f32; 3] = [0.65, 0.5, 0.8];
const LIGHTNESSES: [f32; 3] = [0.55, 0.42, 0.68];

/// Rank-based category color assignment.
#[derive(Clone, Copy, Debug, Default)]
pub struct CategoryPalette;

impl CategoryPalette {
    /// Number of colors in the fixed part of the palette.
    pub const FIXED_LEN: usize = PALETTE.len();

    /// Returns the color for a 0-based rank.
    pub fn color(rank: usize) -> Color {
        if let Some(c) = PALETTE.get(rank) {
            return *c;
        }
        let k = rank - PALETTE.len();
        let hue = (k as f32 * GOLDEN_ANGLE_DEG) % 360.0;
        let s = SATURATIONS[k % SATURATIONS.len()];
        let l = LIGHTNESSES[(k / SATURATIONS.len()) % LIGHTNESSES.len()];
        hsl_to_color(hue, s, l)
    }

    /// Assigns colors to categories given in rank order, pairing each id with its display name.
    ///
    /// Missing names fall back to the id.
    pub fn assign<'a>(
        ranked: &[CategoryId],
        mut name_of: impl FnMut(&CategoryId) -> Option<&'a str>,
    ) -> Vec<Category> {
        ranked
            .iter()
            .enumerate()
            .map(|(rank, id)| Category {
                id: id.clone(),
                name: name_of(id).unwrap_or(id.as_str()).into(),
                color: Self::color(rank),
            })
            .collect()
    }
}

/// Converts HSL (`h` in degrees, `s`/`l` in `[0, 1]`) to an opaque sRGB color.
fn hsl_to_color(h: f32, s: f32, l: f32) -> Color {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - ((hp % 2.0) - 1.0).abs());
    let (r, g, b) = match hp {
        hp if hp < 1.0 => (c, x, 0.0),
        hp if hp < 2.0 => (x, c, 0.0),
        hp if hp < 3.0 => (0.0, c, x),
        hp if hp < 4.0 => (0.0, x, c),
        hp if hp < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Color::new([r + m, g + m, b + m, 1.0])
}
