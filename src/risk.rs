// Risk Scorer: a bounded heuristic estimate of how likely a company is to
// need new premises soon.
//
// Pure function of one mover event; no shared state, safe to call
// concurrently on distinct events.

use crate::analysis::MoverEvent;
use crate::clustering::Cluster;
use serde::Serialize;

/// A mover event paired with its computed risk score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredMover {
    pub mover: MoverEvent,
    pub score: u8,
}

/// Score a mover event on a 0-100 scale.
///
/// Three additive banded factors: years since the move (up to 40), absolute
/// employee delta (up to 30) and absolute percentage delta (up to 30), with
/// since-move values preferred over at-move ones via the event's accessors.
/// The bands sum to at most 100; the final clamp is a safety net.
pub fn risk_score(mover: &MoverEvent) -> u8 {
    let mut score: u32 = 0;

    let years = mover.years_since_move();
    score += match years {
        y if y >= 8 => 40,
        y if y >= 5 => 30,
        y if y >= 3 => 20,
        _ => 10,
    };

    let abs_change = mover.employee_change().unsigned_abs();
    score += match abs_change {
        c if c >= 100 => 30,
        c if c >= 50 => 20,
        c if c >= 20 => 10,
        _ => 5,
    };

    // An N/A percent contributes the bottom band, matching an absent value
    let abs_percent = mover.change_percent().abs().unwrap_or(0.0);
    score += match abs_percent {
        p if p >= 100.0 => 30,
        p if p >= 50.0 => 20,
        p if p >= 25.0 => 10,
        _ => 5,
    };

    score.min(100) as u8
}

/// Flatten all cluster members, score each, and keep those at or above the
/// threshold, sorted descending by score. The sort is stable, so tied
/// scores keep their cluster order.
pub fn high_risk_movers(clusters: &[Cluster], threshold: u8) -> Vec<ScoredMover> {
    let mut scored: Vec<ScoredMover> = clusters
        .iter()
        .flat_map(|c| c.members.iter())
        .map(|m| ScoredMover {
            mover: m.clone(),
            score: risk_score(m),
        })
        .filter(|s| s.score >= threshold)
        .collect();

    scored.sort_by_key(|s| std::cmp::Reverse(s.score));
    scored
}

// ============================================================================
// TESTS
// ============================================================================
