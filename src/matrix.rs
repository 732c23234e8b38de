//! Distance fabric: turns raw oracle matrices into clean symmetric ones.
//!
//! The oracle may return non-finite cells for unreachable pairs and may
//! be slightly asymmetric. Repairs happen here exactly once, with fixed
//! tolerances; downstream stages consume the output without a second
//! pass. Locations whose rows are mostly missing are dropped and the
//! surviving index list is returned so callers can re-index.

use tracing::{info, warn};

use crate::error::PlanError;
use crate::traits::MatrixProvider;

/// Placeholder for an unreachable-but-finite distance.
pub const SENTINEL_DISTANCE_KM: f64 = 1000.0;
/// Placeholder for an unreachable-but-finite travel time.
pub const SENTINEL_TIME_HOURS: f64 = 10.0;

/// Asymmetry beyond this triggers symmetrization by averaging.
const DISTANCE_TOLERANCE_KM: f64 = 0.1;
/// 0.1 seconds, expressed in hours.
const TIME_TOLERANCE_HOURS: f64 = 0.1 / 3600.0;

/// Counters for repairs applied to one matrix pair. Diagnostic only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairStats {
    pub excluded_locations: usize,
    pub clamped_distance_cells: usize,
    pub clamped_time_cells: usize,
    pub symmetrized_distance: bool,
    pub symmetrized_time: bool,
}

/// Repaired symmetric matrices plus the surviving location indices.
#[derive(Debug, Clone)]
pub struct TravelMatrices {
    pub distance_km: Vec<Vec<f64>>,
    pub time_hours: Vec<Vec<f64>>,
    /// Indices into the caller's location list, in input order.
    pub kept_indices: Vec<usize>,
    pub stats: RepairStats,
}

impl TravelMatrices {
    pub fn len(&self) -> usize {
        self.kept_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept_indices.is_empty()
    }
}

/// Fetch and repair distance/time matrices for a set of (lat, lon)
/// locations.
pub fn build_matrices<M: MatrixProvider>(
    provider: &M,
    locations: &[(f64, f64)],
) -> Result<TravelMatrices, PlanError> {
    for &(latitude, longitude) in locations {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(PlanError::InvalidLocation {
                latitude,
                longitude,
            });
        }
    }

    let raw = provider.matrices_for(locations)?;
    let n = locations.len();
    check_shape(&raw.distances_km, n)?;
    check_shape(&raw.durations_hours, n)?;

    let mut stats = RepairStats::default();

    // Drop locations whose row is mostly missing in either matrix.
    let threshold = n / 2;
    let kept_indices: Vec<usize> = (0..n)
        .filter(|&i| {
            let missing_dist = count_non_finite(&raw.distances_km[i]);
            let missing_time = count_non_finite(&raw.durations_hours[i]);
            let keep = missing_dist <= threshold && missing_time <= threshold;
            if !keep {
                warn!(
                    location = i,
                    missing_dist, missing_time, "excluding location with mostly missing data"
                );
            }
            keep
        })
        .collect();

    if kept_indices.is_empty() {
        return Err(PlanError::NoUsableLocations);
    }
    stats.excluded_locations = n - kept_indices.len();

    let mut distance_km = shrink(&raw.distances_km, &kept_indices);
    let mut time_hours = shrink(&raw.durations_hours, &kept_indices);

    stats.clamped_distance_cells = clamp_non_finite(&mut distance_km, SENTINEL_DISTANCE_KM);
    stats.clamped_time_cells = clamp_non_finite(&mut time_hours, SENTINEL_TIME_HOURS);
    if stats.clamped_distance_cells > 0 || stats.clamped_time_cells > 0 {
        warn!(
            distance_cells = stats.clamped_distance_cells,
            time_cells = stats.clamped_time_cells,
            "replaced missing matrix cells with sentinel values"
        );
    }

    stats.symmetrized_distance = symmetrize(&mut distance_km, DISTANCE_TOLERANCE_KM);
    stats.symmetrized_time = symmetrize(&mut time_hours, TIME_TOLERANCE_HOURS);
    if stats.symmetrized_distance || stats.symmetrized_time {
        warn!("oracle matrices were asymmetric; averaged with transpose");
    }

    if has_negative(&distance_km) {
        return Err(PlanError::NegativeMatrixValue { matrix: "distance" });
    }
    if has_negative(&time_hours) {
        return Err(PlanError::NegativeMatrixValue { matrix: "time" });
    }

    info!(
        locations = kept_indices.len(),
        excluded = stats.excluded_locations,
        "built travel matrices"
    );

    Ok(TravelMatrices {
        distance_km,
        time_hours,
        kept_indices,
        stats,
    })
}

fn check_shape(matrix: &[Vec<f64>], n: usize) -> Result<(), PlanError> {
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(PlanError::MatrixShape {
            expected: n,
            got: matrix.len(),
        });
    }
    Ok(())
}

fn count_non_finite(row: &[f64]) -> usize {
    row.iter().filter(|value| !value.is_finite()).count()
}

fn shrink(matrix: &[Vec<f64>], kept: &[usize]) -> Vec<Vec<f64>> {
    kept.iter()
        .map(|&i| kept.iter().map(|&j| matrix[i][j]).collect())
        .collect()
}

fn clamp_non_finite(matrix: &mut [Vec<f64>], sentinel: f64) -> usize {
    let mut clamped = 0;
    for row in matrix.iter_mut() {
        for cell in row.iter_mut() {
            if !cell.is_finite() {
                *cell = sentinel;
                clamped += 1;
            }
        }
    }
    clamped
}

/// Average with the transpose when asymmetry exceeds `tolerance`.
/// Returns whether the repair was applied. Cells are finite by the time
/// this runs, so averaging cannot reintroduce non-finite values.
fn symmetrize(matrix: &mut [Vec<f64>], tolerance: f64) -> bool {
    let n = matrix.len();
    let mut max_diff: f64 = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            max_diff = max_diff.max((matrix[i][j] - matrix[j][i]).abs());
        }
    }
    if max_diff <= tolerance {
        return false;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let mean = (matrix[i][j] + matrix[j][i]) / 2.0;
            matrix[i][j] = mean;
            matrix[j][i] = mean;
        }
    }
    true
}

fn has_negative(matrix: &[Vec<f64>]) -> bool {
    matrix.iter().any(|row| row.iter().any(|cell| *cell < 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RawMatrices;

    struct FixedMatrices(RawMatrices);

    impl MatrixProvider for FixedMatrices {
        fn matrices_for(&self, _locations: &[(f64, f64)]) -> Result<RawMatrices, PlanError> {
            Ok(self.0.clone())
        }
    }

    fn locations(n: usize) -> Vec<(f64, f64)> {
        (0..n).map(|i| (26.9 + i as f64 * 0.01, 75.8)).collect()
    }

    fn symmetric(matrix: &[Vec<f64>]) -> bool {
        let n = matrix.len();
        (0..n).all(|i| (0..n).all(|j| (matrix[i][j] - matrix[j][i]).abs() < 1e-9))
    }

    #[test]
    fn test_clean_matrices_pass_through() {
        let provider = FixedMatrices(RawMatrices {
            distances_km: vec![vec![0.0, 5.0], vec![5.0, 0.0]],
            durations_hours: vec![vec![0.0, 0.2], vec![0.2, 0.0]],
        });
        let result = build_matrices(&provider, &locations(2)).unwrap();
        assert_eq!(result.kept_indices, vec![0, 1]);
        assert_eq!(result.stats, RepairStats::default());
        assert_eq!(result.distance_km[0][1], 5.0);
    }

    #[test]
    fn test_non_finite_cells_become_sentinels() {
        let provider = FixedMatrices(RawMatrices {
            distances_km: vec![
                vec![0.0, f64::NAN, 3.0],
                vec![f64::NAN, 0.0, 4.0],
                vec![3.0, 4.0, 0.0],
            ],
            durations_hours: vec![
                vec![0.0, f64::INFINITY, 0.1],
                vec![f64::INFINITY, 0.0, 0.2],
                vec![0.1, 0.2, 0.0],
            ],
        });
        let result = build_matrices(&provider, &locations(3)).unwrap();
        assert_eq!(result.distance_km[0][1], SENTINEL_DISTANCE_KM);
        assert_eq!(result.time_hours[0][1], SENTINEL_TIME_HOURS);
        assert_eq!(result.stats.clamped_distance_cells, 2);
        assert_eq!(result.stats.clamped_time_cells, 2);
        assert!(symmetric(&result.distance_km));
    }

    #[test]
    fn test_mostly_missing_row_excluded() {
        // Location 2 has 2 of 3 distances missing; threshold is 3/2 = 1.
        let provider = FixedMatrices(RawMatrices {
            distances_km: vec![
                vec![0.0, 2.0, f64::NAN],
                vec![2.0, 0.0, f64::NAN],
                vec![f64::NAN, f64::NAN, 0.0],
            ],
            durations_hours: vec![
                vec![0.0, 0.1, 0.3],
                vec![0.1, 0.0, 0.3],
                vec![0.3, 0.3, 0.0],
            ],
        });
        let result = build_matrices(&provider, &locations(3)).unwrap();
        assert_eq!(result.kept_indices, vec![0, 1]);
        assert_eq!(result.stats.excluded_locations, 1);
        assert_eq!(result.distance_km.len(), 2);
    }

    #[test]
    fn test_all_rows_missing_is_fatal() {
        let provider = FixedMatrices(RawMatrices {
            distances_km: vec![
                vec![f64::NAN, f64::NAN],
                vec![f64::NAN, f64::NAN],
            ],
            durations_hours: vec![vec![0.0, 0.1], vec![0.1, 0.0]],
        });
        let err = build_matrices(&provider, &locations(2)).unwrap_err();
        assert!(matches!(err, PlanError::NoUsableLocations));
    }

    #[test]
    fn test_asymmetric_matrix_averaged() {
        let provider = FixedMatrices(RawMatrices {
            distances_km: vec![vec![0.0, 10.0], vec![12.0, 0.0]],
            durations_hours: vec![vec![0.0, 0.25], vec![0.25, 0.0]],
        });
        let result = build_matrices(&provider, &locations(2)).unwrap();
        assert_eq!(result.distance_km[0][1], 11.0);
        assert_eq!(result.distance_km[1][0], 11.0);
        assert!(result.stats.symmetrized_distance);
        assert!(!result.stats.symmetrized_time);
    }

    #[test]
    fn test_small_asymmetry_within_tolerance_kept() {
        let provider = FixedMatrices(RawMatrices {
            distances_km: vec![vec![0.0, 10.0], vec![10.05, 0.0]],
            durations_hours: vec![vec![0.0, 0.25], vec![0.25, 0.0]],
        });
        let result = build_matrices(&provider, &locations(2)).unwrap();
        assert!(!result.stats.symmetrized_distance);
        assert_eq!(result.distance_km[1][0], 10.05);
    }

    #[test]
    fn test_negative_cell_rejected() {
        let provider = FixedMatrices(RawMatrices {
            distances_km: vec![vec![0.0, -1.0], vec![-1.0, 0.0]],
            durations_hours: vec![vec![0.0, 0.1], vec![0.1, 0.0]],
        });
        let err = build_matrices(&provider, &locations(2)).unwrap_err();
        assert!(matches!(err, PlanError::NegativeMatrixValue { matrix: "distance" }));
    }

    #[test]
    fn test_out_of_range_coordinate_rejected() {
        let provider = FixedMatrices(RawMatrices {
            distances_km: vec![vec![0.0]],
            durations_hours: vec![vec![0.0]],
        });
        let err = build_matrices(&provider, &[(95.0, 10.0)]).unwrap_err();
        assert!(matches!(err, PlanError::InvalidLocation { .. }));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let provider = FixedMatrices(RawMatrices {
            distances_km: vec![vec![0.0, 1.0]],
            durations_hours: vec![vec![0.0, 0.1], vec![0.1, 0.0]],
        });
        let err = build_matrices(&provider, &locations(2)).unwrap_err();
        assert!(matches!(err, PlanError::MatrixShape { expected: 2, .. }));
    }
}
