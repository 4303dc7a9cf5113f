// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;

pub const DEFAULT_ROW_TOLERANCE_FLOOR: f64 = 3.0;
pub const DEFAULT_ROW_TOLERANCE_FACTOR: f64 = 0.25;
pub const DEFAULT_MERGE_FACTOR: f64 = 1.5;

/// How the vertical tolerances are derived from piece heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TolerancePolicy {
    /// Lower bound for the row tolerance, in source pixels.
    pub floor: f64,
    /// Fraction of the median piece height used as row tolerance.
    pub height_factor: f64,
    /// Multiplier turning the row tolerance into the merge tolerance.
    pub merge_factor: f64,
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self {
            floor: DEFAULT_ROW_TOLERANCE_FLOOR,
            height_factor: DEFAULT_ROW_TOLERANCE_FACTOR,
            merge_factor: DEFAULT_MERGE_FACTOR,
        }
    }
}

/// Tolerances computed for one puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowTolerance {
    pub median_height: f64,
    pub row: f64,
    pub merge: f64,
}

impl TolerancePolicy {
    /// Returns `None` for an empty height set.
    pub fn tolerance_for(&self, heights: impl IntoIterator<Item = f64>) -> Option<RowTolerance> {
        let median_height = median_height(heights)?;
        let row = self.floor.max(median_height * self.height_factor);
        Some(RowTolerance {
            median_height,
            row,
            merge: row * self.merge_factor,
        })
    }
}

/// Median of the heights; for an even count the upper of the two middle values.
pub fn median_height(heights: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted = heights.into_iter().collect::<Vec<_>>();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(sorted[sorted.len() / 2])
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{median_height, TolerancePolicy};

    #[rstest]
    #[case::odd(&[5.0, 1.0, 3.0], 3.0)]
    #[case::even_takes_upper(&[4.0, 1.0, 3.0, 2.0], 3.0)]
    #[case::single(&[9.5], 9.5)]
    fn median_matches_upper_middle(#[case] heights: &[f64], #[case] expected: f64) {
        assert_eq!(median_height(heights.iter().copied()), Some(expected));
    }

    #[test]
    fn median_of_nothing_is_none() {
        assert_eq!(median_height(std::iter::empty()), None);
    }

    #[test]
    fn small_pieces_hit_the_floor() {
        let tol = TolerancePolicy::default().tolerance_for([10.0; 4]).unwrap();
        assert_eq!(tol.median_height, 10.0);
        assert_eq!(tol.row, 3.0);
        assert_eq!(tol.merge, 4.5);
    }

    #[test]
    fn large_pieces_scale_with_median_height() {
        let tol = TolerancePolicy::default()
            .tolerance_for([100.0, 120.0, 80.0])
            .unwrap();
        assert_eq!(tol.row, 25.0);
        assert_eq!(tol.merge, 37.5);
    }
}
