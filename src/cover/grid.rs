use ahash::AHashMap;
use geo::Coord;

/// Uniform spatial hash grid over planar points for O(1) neighborhood lookup.
///
/// The 3x3 neighborhood query returns a candidate set only: it is sound (no
/// false negatives) when the cell size is at least the largest query radius
/// used against this index, and callers must re-test exact distance.
#[derive(Debug)]
pub struct GridIndex {
    cell_size: f64,
    buckets: AHashMap<(i64, i64), Vec<usize>>,
}

impl GridIndex {
    /// Bucket each point into its integer cell `(floor(x/c), floor(y/c))`.
    pub fn build(points: &[Coord<f64>], cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");

        let mut buckets: AHashMap<(i64, i64), Vec<usize>> = AHashMap::new();
        for (idx, point) in points.iter().enumerate() {
            buckets.entry(Self::key(point.x, point.y, cell_size)).or_default().push(idx);
        }
        Self { cell_size, buckets }
    }

    #[inline]
    fn key(x: f64, y: f64, cell_size: f64) -> (i64, i64) {
        ((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
    }

    #[inline]
    pub fn cell_size(&self) -> f64 { self.cell_size }

    /// Candidate point indices from the 3x3 block of cells around (x, y).
    pub fn neighborhood(&self, x: f64, y: f64) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = Self::key(x, y, self.cell_size);
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                self.buckets
                    .get(&(cx + dx, cy + dy))
                    .map(|bucket| bucket.iter().copied())
                    .into_iter()
                    .flatten()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_points() -> Vec<Coord<f64>> {
        // 10x10 lattice at 100 m spacing.
        (0..10)
            .flat_map(|i| (0..10).map(move |j| Coord { x: i as f64 * 100.0, y: j as f64 * 100.0 }))
            .collect()
    }

    #[test]
    fn neighborhood_is_a_superset_of_the_radius() {
        let points = make_points();
        let radius = 250.0;
        let index = GridIndex::build(&points, radius);

        let (qx, qy) = (450.0, 450.0);
        let candidates: Vec<usize> = index.neighborhood(qx, qy).collect();
        for (idx, point) in points.iter().enumerate() {
            let d2 = (point.x - qx).powi(2) + (point.y - qy).powi(2);
            if d2 <= radius * radius {
                assert!(candidates.contains(&idx), "missing in-radius point {idx}");
            }
        }
    }

    #[test]
    fn negative_coordinates_bucket_correctly() {
        let points = vec![Coord { x: -50.0, y: -50.0 }, Coord { x: 50.0, y: 50.0 }];
        let index = GridIndex::build(&points, 100.0);
        let candidates: Vec<usize> = index.neighborhood(0.0, 0.0).collect();
        assert!(candidates.contains(&0));
        assert!(candidates.contains(&1));
    }

    #[test]
    #[should_panic]
    fn zero_cell_size_panics() {
        GridIndex::build(&[], 0.0);
    }
}
