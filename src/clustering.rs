// Clustering Engine: groups mover events into interpretable risk categories
// via k-means with k-means++ seeding.
//
// Seeding is randomized by design; callers inject the random source so tests
// can pin outcomes with a seeded generator. Cluster statistics and labels are
// computed over the raw field values, never the normalized feature space.

use crate::analysis::{Analysis, MoverEvent};
use crate::error::AnalysisError;
use log::debug;
use rand::Rng;
use serde::Serialize;

/// Feature space: years since move, change/100, percent/100, employees/100.
pub const FEATURE_DIM: usize = 4;

/// Iteration cap for the assignment/update loop.
pub const MAX_ITERATIONS: usize = 100;

// ============================================================================
// CLUSTER TYPES
// ============================================================================

/// Risk tier assigned to a cluster by the labeling decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    High,
    Medium,
    Growth,
    Decline,
    Low,
}

/// Human-facing label for a cluster, fixed per tier.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterLabel {
    pub title: &'static str,
    pub description: &'static str,
    /// Display color, fixed per tier.
    pub color: &'static str,
    pub tier: RiskTier,
}

/// Aggregate statistics over a cluster's members (raw values).
#[derive(Debug, Clone, Serialize)]
pub struct ClusterStats {
    pub avg_years_since_move: f64,
    pub avg_change: f64,
    pub avg_percent_change: f64,
    pub avg_size: f64,
    pub median_change: f64,
    pub std_dev_change: f64,
}

/// One partition of the mover events. Recomputed on every clustering run,
/// never stored.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub id: usize,
    pub members: Vec<MoverEvent>,
    pub size: usize,
    /// Centroid in the normalized feature space.
    pub centroid: [f64; FEATURE_DIM],
    pub stats: ClusterStats,
    pub label: ClusterLabel,
}

// ============================================================================
// FEATURE EXTRACTION
// ============================================================================

/// Project a mover into the normalized feature space.
///
/// Returns `None` when any feature is unavailable or non-finite; such events
/// are excluded from clustering entirely.
pub fn feature_vector(mover: &MoverEvent) -> Option<[f64; FEATURE_DIM]> {
    let percent = mover.change_percent().value()?;
    let features = [
        mover.years_since_move() as f64,
        mover.employee_change() as f64 / 100.0,
        percent / 100.0,
        mover.employees_now() as f64 / 100.0,
    ];
    features.iter().all(|v| v.is_finite()).then_some(features)
}

/// Euclidean distance between two feature vectors of equal dimension.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64, AnalysisError> {
    if a.len() != b.len() {
        return Err(AnalysisError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt())
}

// ============================================================================
// K-MEANS
// ============================================================================

/// Cluster the movers qualifying for the given years-ago windows.
///
/// This is the query-surface entry point: the original analysis uses the
/// 8- and 3-year windows together.
pub fn cluster_movers(
    analysis: &Analysis,
    k: usize,
    years_ago_windows: &[u32],
    rng: &mut impl Rng,
) -> Result<Vec<Cluster>, AnalysisError> {
    let movers: Vec<MoverEvent> = years_ago_windows
        .iter()
        .flat_map(|&w| analysis.movers_by_year(w))
        .collect();
    kmeans(movers, k, rng)
}

/// Partition mover events into `k` clusters.
///
/// Errors: `InvalidClusterCount` for `k == 0` (caller bug), `NotEnoughData`
/// when fewer than `k` events survive feature extraction.
pub fn kmeans(
    movers: Vec<MoverEvent>,
    k: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Cluster>, AnalysisError> {
    if k == 0 {
        return Err(AnalysisError::InvalidClusterCount(0));
    }

    let points: Vec<(MoverEvent, [f64; FEATURE_DIM])> = movers
        .into_iter()
        .filter_map(|m| feature_vector(&m).map(|f| (m, f)))
        .collect();

    if points.len() < k {
        return Err(AnalysisError::NotEnoughData {
            available: points.len(),
            required: k,
        });
    }

    let mut centroids = seed_centroids(&points, k, rng)?;
    let mut assignments = vec![0usize; points.len()];
    let mut iteration = 0;

    loop {
        let mut new_assignments = Vec::with_capacity(points.len());
        for (_, features) in &points {
            new_assignments.push(nearest_centroid(features, &centroids)?);
        }

        let converged = new_assignments == assignments;
        assignments = new_assignments;
        centroids = update_centroids(&points, &assignments, k, rng);
        iteration += 1;

        if converged || iteration >= MAX_ITERATIONS {
            debug!(
                "k-means finished after {} iterations (converged: {})",
                iteration, converged
            );
            break;
        }
    }

    // Materialize non-empty clusters with stats and labels
    let mut clusters = Vec::new();
    for id in 0..k {
        let members: Vec<MoverEvent> = points
            .iter()
            .zip(assignments.iter())
            .filter(|(_, &a)| a == id)
            .map(|((m, _), _)| m.clone())
            .collect();

        if members.is_empty() {
            continue;
        }

        let stats = cluster_stats(&members);
        let label = label_for(&stats);
        clusters.push(Cluster {
            id,
            size: members.len(),
            centroid: centroids[id],
            stats,
            label,
            members,
        });
    }

    Ok(clusters)
}

/// k-means++ seeding: first centroid uniformly random, each subsequent one
/// chosen with probability proportional to the squared distance from the
/// nearest already-chosen centroid.
fn seed_centroids(
    points: &[(MoverEvent, [f64; FEATURE_DIM])],
    k: usize,
    rng: &mut impl Rng,
) -> Result<Vec<[f64; FEATURE_DIM]>, AnalysisError> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].1);

    while centroids.len() < k {
        let mut weights = Vec::with_capacity(points.len());
        for (_, features) in points {
            let mut min_dist = f64::INFINITY;
            for centroid in &centroids {
                min_dist = min_dist.min(euclidean_distance(features, centroid)?);
            }
            weights.push(min_dist * min_dist);
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            // All remaining points coincide with a centroid; pick uniformly
            centroids.push(points[rng.gen_range(0..points.len())].1);
            continue;
        }

        let mut threshold = rng.gen::<f64>() * total;
        let mut chosen = points.len() - 1;
        for (i, weight) in weights.iter().enumerate() {
            threshold -= weight;
            if threshold <= 0.0 {
                chosen = i;
                break;
            }
        }
        centroids.push(points[chosen].1);
    }

    Ok(centroids)
}

fn nearest_centroid(
    features: &[f64; FEATURE_DIM],
    centroids: &[[f64; FEATURE_DIM]],
) -> Result<usize, AnalysisError> {
    let mut nearest = 0;
    let mut min_dist = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let dist = euclidean_distance(features, centroid)?;
        if dist < min_dist {
            min_dist = dist;
            nearest = i;
        }
    }
    Ok(nearest)
}

/// Recompute each centroid as the component-wise mean of its members. An
/// empty cluster is reseeded from a random point's features; this keeps
/// every cluster usable at the cost of run-to-run stability.
fn update_centroids(
    points: &[(MoverEvent, [f64; FEATURE_DIM])],
    assignments: &[usize],
    k: usize,
    rng: &mut impl Rng,
) -> Vec<[f64; FEATURE_DIM]> {
    let mut centroids = Vec::with_capacity(k);

    for id in 0..k {
        let members: Vec<&[f64; FEATURE_DIM]> = points
            .iter()
            .zip(assignments.iter())
            .filter(|(_, &a)| a == id)
            .map(|((_, f), _)| f)
            .collect();

        if members.is_empty() {
            debug!("cluster {} empty after reassignment, reseeding", id);
            centroids.push(points[rng.gen_range(0..points.len())].1);
            continue;
        }

        let mut centroid = [0.0; FEATURE_DIM];
        for features in &members {
            for (dim, value) in features.iter().enumerate() {
                centroid[dim] += value;
            }
        }
        for value in &mut centroid {
            *value /= members.len() as f64;
        }
        centroids.push(centroid);
    }

    centroids
}

// ============================================================================
// STATISTICS & LABELING
// ============================================================================

fn cluster_stats(members: &[MoverEvent]) -> ClusterStats {
    let years: Vec<f64> = members
        .iter()
        .map(|m| m.years_since_move() as f64)
        .collect();
    let changes: Vec<f64> = members.iter().map(|m| m.employee_change() as f64).collect();
    let percents: Vec<f64> = members
        .iter()
        .map(|m| m.change_percent().value().unwrap_or(0.0))
        .collect();
    let sizes: Vec<f64> = members.iter().map(|m| m.employees_now() as f64).collect();

    ClusterStats {
        avg_years_since_move: mean(&years),
        avg_change: mean(&changes),
        avg_percent_change: mean(&percents),
        avg_size: mean(&sizes),
        median_change: median(&changes),
        std_dev_change: std_dev(&changes),
    }
}

/// Fixed decision table, first match wins.
pub fn label_for(stats: &ClusterStats) -> ClusterLabel {
    if stats.avg_years_since_move >= 7.0 && stats.avg_percent_change.abs() > 30.0 {
        ClusterLabel {
            title: "High risk - outgoing lease",
            description: "Moved long ago with a large change in headcount",
            color: "#ef4444",
            tier: RiskTier::High,
        }
    } else if stats.avg_years_since_move >= 5.0 && stats.avg_percent_change.abs() > 15.0 {
        ClusterLabel {
            title: "Medium risk - potential need",
            description: "Moderate time since the move with a significant change",
            color: "#f59e0b",
            tier: RiskTier::Medium,
        }
    } else if stats.avg_percent_change > 50.0 {
        ClusterLabel {
            title: "Growth - expansion",
            description: "Strong growth, may need larger premises soon",
            color: "#10b981",
            tier: RiskTier::Growth,
        }
    } else if stats.avg_percent_change < -30.0 {
        ClusterLabel {
            title: "Decline - downsizing",
            description: "Shrinking headcount, may need smaller premises",
            color: "#3b82f6",
            tier: RiskTier::Decline,
        }
    } else {
        ClusterLabel {
            title: "Stable - low risk",
            description: "Stable conditions, change unlikely",
            color: "#6b7280",
            tier: RiskTier::Low,
        }
    }
}

/// Find a cluster by its assigned risk tier (e.g. the high-risk cluster).
pub fn cluster_by_tier(clusters: &[Cluster], tier: RiskTier) -> Option<&Cluster> {
    clusters.iter().find(|c| c.label.tier == tier)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite values"));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance: Vec<f64> = values.iter().map(|v| (v - avg).powi(2)).collect();
    mean(&variance).sqrt()
}

// ============================================================================
// TESTS
// ============================================================================
