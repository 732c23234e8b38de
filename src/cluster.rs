//! Spatial clustering over a precomputed distance matrix.
//!
//! Partitions activity locations into day-sized groups. Density-based
//! clustering is the default; an average-linkage hierarchical mode is
//! available behind the same radius threshold. Input matrices are
//! expected to be repaired (symmetric, finite, non-negative) by the
//! distance fabric.

use tracing::{debug, info};

use crate::matrix::TravelMatrices;

/// Label for points too sparse to join any cluster.
pub const NOISE: i32 = -1;

const UNVISITED: i32 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterMethod {
    Density,
    Hierarchical,
}

#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub method: ClusterMethod,
    /// Density radius in km. Auto-estimated from the k-distance curve
    /// when absent.
    pub radius_km: Option<f64>,
    /// Minimum points per cluster, self included.
    pub min_samples: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            method: ClusterMethod::Density,
            radius_km: None,
            min_samples: 2,
        }
    }
}

/// Assign a cluster label per matrix index, same order as the matrix.
pub fn cluster_locations(matrices: &TravelMatrices, options: &ClusterOptions) -> Vec<i32> {
    let distance_km = &matrices.distance_km;
    let n = distance_km.len();
    if n == 0 {
        return Vec::new();
    }
    // Too few points to express density at all: one cluster, no noise.
    if n < options.min_samples {
        debug!(points = n, "too few points for clustering, single cluster");
        return vec![0; n];
    }

    let radius = options
        .radius_km
        .unwrap_or_else(|| estimate_radius(distance_km, options.min_samples));
    debug!(radius_km = radius, "clustering radius");

    let labels = match options.method {
        ClusterMethod::Density => density_cluster(distance_km, radius, options.min_samples),
        ClusterMethod::Hierarchical => {
            hierarchical_cluster(distance_km, radius, options.min_samples)
        }
    };

    let cluster_count = labels.iter().filter(|&&l| l >= 0).max().map_or(0, |l| l + 1);
    let mut sizes = vec![0usize; cluster_count as usize];
    for &label in &labels {
        if label >= 0 {
            sizes[label as usize] += 1;
        }
    }
    let noise = labels.iter().filter(|&&l| l == NOISE).count();
    info!(clusters = cluster_count, ?sizes, noise, "clustering complete");
    labels
}

/// k-distance elbow heuristic: the 75th percentile of each point's
/// distance to its `min_samples`-th nearest neighbor (self included),
/// clamped to [1.0 km, max finite distance].
fn estimate_radius(distance_km: &[Vec<f64>], min_samples: usize) -> f64 {
    let n = distance_km.len();
    let mut k_distances: Vec<f64> = distance_km
        .iter()
        .map(|row| {
            let mut sorted = row.clone();
            sorted.sort_by(f64::total_cmp);
            sorted[min_samples - 1]
        })
        .collect();
    k_distances.sort_by(f64::total_cmp);

    let max_finite = distance_km
        .iter()
        .flatten()
        .copied()
        .filter(|value| value.is_finite())
        .fold(1.0_f64, f64::max);

    let percentile = k_distances[((0.75 * n as f64) as usize).min(n - 1)];
    percentile.clamp(1.0, max_finite)
}

fn neighborhoods(distance_km: &[Vec<f64>], radius: f64) -> Vec<Vec<usize>> {
    distance_km
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|&(_, &d)| d <= radius)
                .map(|(j, _)| j)
                .collect()
        })
        .collect()
}

/// DBSCAN over a precomputed matrix. A point is a core point when its
/// radius neighborhood (self included) holds at least `min_samples`
/// points; clusters grow from core points, border points attach, the
/// rest is noise.
fn density_cluster(distance_km: &[Vec<f64>], radius: f64, min_samples: usize) -> Vec<i32> {
    let n = distance_km.len();
    let neighbors = neighborhoods(distance_km, radius);
    let mut labels = vec![UNVISITED; n];
    let mut next_label = 0;

    for i in 0..n {
        if labels[i] != UNVISITED {
            continue;
        }
        if neighbors[i].len() < min_samples {
            labels[i] = NOISE;
            continue;
        }

        labels[i] = next_label;
        let mut queue = vec![i];
        while let Some(point) = queue.pop() {
            for &neighbor in &neighbors[point] {
                if labels[neighbor] == NOISE {
                    labels[neighbor] = next_label;
                } else if labels[neighbor] == UNVISITED {
                    labels[neighbor] = next_label;
                    if neighbors[neighbor].len() >= min_samples {
                        queue.push(neighbor);
                    }
                }
            }
        }
        next_label += 1;
    }

    labels
}

/// Average-linkage agglomerative clustering cut at `radius`. The cut
/// does not enforce a minimum size, so undersized clusters are
/// re-labeled as noise afterwards.
fn hierarchical_cluster(distance_km: &[Vec<f64>], radius: f64, min_samples: usize) -> Vec<i32> {
    let n = distance_km.len();
    let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in 0..clusters.len() {
            for b in (a + 1)..clusters.len() {
                let linkage = average_linkage(distance_km, &clusters[a], &clusters[b]);
                if best.is_none_or(|(_, _, d)| linkage < d) {
                    best = Some((a, b, linkage));
                }
            }
        }
        match best {
            Some((a, b, linkage)) if linkage < radius => {
                let merged = clusters.swap_remove(b);
                clusters[a].extend(merged);
            }
            _ => break,
        }
    }

    let mut labels = vec![NOISE; n];
    for (label, members) in clusters.iter().enumerate() {
        if members.len() >= min_samples {
            for &point in members {
                labels[point] = label as i32;
            }
        }
    }
    labels
}

fn average_linkage(distance_km: &[Vec<f64>], a: &[usize], b: &[usize]) -> f64 {
    let mut total = 0.0;
    for &i in a {
        for &j in b {
            total += distance_km[i][j];
        }
    }
    total / (a.len() * b.len()) as f64
}
