//! Coverage precomputation and greedy set-cover selection.

mod coverage;
mod greedy;
mod grid;

pub use coverage::{
    CoverageSet, MAX_RADIUS_FACTOR, MIN_RADIUS_FACTOR, precompute_coverage,
    precompute_coverage_variable, radii_from_weights,
};
pub use greedy::{CoverOutcome, solve};
pub use grid::GridIndex;
