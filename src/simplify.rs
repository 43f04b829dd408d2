//! Waypoint simplifier (spec §4.5, L4): trades geometric fidelity for a
//! bounded waypoint count, exploiting the consumer's ability to fly a
//! straight heading between two waypoints while triggering photos on a
//! timer.

use crate::geometry::{haversine_distance_m, Coordinate};
use crate::waypoint::Waypoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Knobs controlling simplification (spec §6.1 `simplify` substructure).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimplifyOptions {
    pub enabled: bool,
    pub angle_threshold_deg: f64,
    pub max_time_between_s: Option<f64>,
    pub max_distance_between_m: Option<f64>,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            angle_threshold_deg: 15.0,
            max_time_between_s: None,
            max_distance_between_m: None,
        }
    }
}

/// Outcome counters surfaced alongside the simplified waypoint list
/// (spec §3 `SimplificationStats`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplificationStats {
    pub original_count: usize,
    pub simplified_count: usize,
    pub reduction_pct: f64,
    pub enabled: bool,
}

fn heading_delta(a: f64, b: f64) -> f64 {
    let delta = (a - b).abs();
    if delta > 180.0 {
        360.0 - delta
    } else {
        delta
    }
}

/// Reduces `waypoints` to its critical set plus any intermediates required
/// to satisfy the distance/time bounds, re-indexed `0..M-1` (spec §4.5).
/// Waypoints that are dropped are not otherwise mutated or reordered.
pub fn simplify(waypoints: &[Waypoint], options: &SimplifyOptions) -> (Vec<Waypoint>, SimplificationStats) {
    let n = waypoints.len();
    if !options.enabled || n <= 2 {
        let stats = SimplificationStats {
            original_count: n,
            simplified_count: n,
            reduction_pct: 0.0,
            enabled: options.enabled,
        };
        return (waypoints.to_vec(), stats);
    }

    // Step 2: critical set via heading-delta threshold.
    let mut critical: BTreeSet<usize> = BTreeSet::new();
    critical.insert(0);
    critical.insert(n - 1);
    for i in 1..n {
        let delta = heading_delta(waypoints[i].heading_deg, waypoints[i - 1].heading_deg);
        if delta >= options.angle_threshold_deg {
            critical.insert(i - 1);
            critical.insert(i);
        }
    }

    // Step 3: bounded intermediate insertion. Time takes precedence over
    // distance when both are set (spec §4.5 edge semantics).
    if options.max_time_between_s.is_some() || options.max_distance_between_m.is_some() {
        let default_speed = 5.0;
        let sorted: Vec<usize> = critical.iter().copied().collect();
        for pair in sorted.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if hi <= lo + 1 {
                continue;
            }

            let mut last_kept = waypoints[lo];
            for idx in (lo + 1)..hi {
                let speed = if last_kept.speed_ms > 0.0 {
                    last_kept.speed_ms
                } else {
                    default_speed
                };
                let max_dist = match options.max_time_between_s {
                    Some(max_time) => max_time * speed,
                    None => options.max_distance_between_m.unwrap_or(f64::INFINITY),
                };

                let dist = haversine_distance_m(
                    Coordinate::new(last_kept.lon, last_kept.lat),
                    Coordinate::new(waypoints[idx].lon, waypoints[idx].lat),
                );
                if dist >= max_dist {
                    critical.insert(idx);
                    last_kept = waypoints[idx];
                }
            }
        }
    }

    let mut simplified: Vec<Waypoint> = critical.iter().map(|&i| waypoints[i]).collect();
    Waypoint::reindex(&mut simplified);

    let simplified_count = simplified.len();
    let raw_pct = if n == 0 {
        0.0
    } else {
        (1.0 - simplified_count as f64 / n as f64) * 100.0
    };

    let stats = SimplificationStats {
        original_count: n,
        simplified_count,
        reduction_pct: (raw_pct * 10.0).round() / 10.0,
        enabled: options.enabled,
    };
    (simplified, stats)
}
