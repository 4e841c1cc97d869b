use crate::cover::coverage::CoverageSet;

/// Result of a greedy set-cover run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverOutcome {
    /// Station indices in selection order; no duplicates.
    pub selected: Vec<usize>,
    pub covered_count: usize,
    pub total: usize,
}

/// Greedy approximation to weighted set cover.
///
/// Each round selects the station covering the most currently-uncovered
/// demand points; ties break toward the lowest station index. Terminates when
/// every point is covered, no station yields positive marginal gain, or all
/// stations are selected. Marginal gains are recomputed from scratch each
/// round (O(S*D) per round), which is fine for interactive station counts; a
/// lazy-greedy heap would have to preserve this exact selection order.
pub fn solve(num_demand: usize, coverage: &CoverageSet) -> CoverOutcome {
    let num_stations = coverage.len();
    let mut selected = Vec::new();
    let mut in_selection = vec![false; num_stations];
    let mut covered = vec![false; num_demand];
    let mut remaining = num_demand;

    while remaining > 0 && selected.len() < num_stations {
        let mut best_station = None;
        let mut best_gain = 0usize;
        for s in 0..num_stations {
            if in_selection[s] {
                continue;
            }
            let gain = coverage[s].iter().filter(|&&d| !covered[d]).count();
            if gain > best_gain {
                best_gain = gain;
                best_station = Some(s);
            }
        }

        let Some(station) = best_station else { break };
        selected.push(station);
        in_selection[station] = true;
        for &d in &coverage[station] {
            if !covered[d] {
                covered[d] = true;
                remaining -= 1;
            }
        }
    }

    CoverOutcome { selected, covered_count: num_demand - remaining, total: num_demand }
}
