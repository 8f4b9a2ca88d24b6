// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Matrix builders for the radar and river inputs.

extern crate alloc;

use alloc::vec::Vec;

use castviz_core::{CategoryId, Matrix, RadarInput, RadarMetric, RiverInput, TimeBucket};

/// Builds the year × subject count matrix of a river input.
///
/// Every year listed in the statistics block gets a row, even when no subject has data for it,
/// so the time axis covers the whole dataset. Columns are ranked by descending total.
pub fn river_matrix(input: &RiverInput) -> Matrix {
    let mut years: Vec<TimeBucket> = input
        .statistics
        .years
        .iter()
        .copied()
        .map(TimeBucket::year)
        .collect();
    years.extend(
        input
            .subjects
            .values()
            .flat_map(|s| s.year_data.iter())
            .map(|y| TimeBucket::year(y.year)),
    );
    let categories: Vec<CategoryId> = input.subjects.keys().cloned().collect();

    let mut m = Matrix::zeros(years, categories);
    for (id, series) in &input.subjects {
        let Some(c) = m.category_index(id) else {
            continue;
        };
        for yc in &series.year_data {
            if let Some(b) = m.bucket_index(TimeBucket::year(yc.year)) {
                m.add(b, c, yc.count);
            }
        }
    }
    m.ranked()
}

/// Builds the bucket × category matrix for a sequence of radar snapshots.
///
/// `metric` selects which of the snapshot maps feeds the magnitudes.
pub fn radar_matrix<'a>(
    snapshots: impl IntoIterator<Item = (TimeBucket, &'a RadarInput)>,
    metric: RadarMetric,
) -> Matrix {
    Matrix::from_entries(snapshots.into_iter().flat_map(|(bucket, input)| {
        input
            .metric(metric)
            .iter()
            .map(move |(id, v)| (bucket, id.clone(), *v))
    }))
}
