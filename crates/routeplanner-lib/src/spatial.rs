//! KD-tree spatial index for nearest-node queries.
//!
//! The index covers every graph node, connected or not, keyed by its
//! [`NodeIndex`]. Queries return Euclidean distances in normalized map units.

use std::collections::HashSet;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::graph::NodeIndex;
use crate::map::Position;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Initial candidates fetched per query; widened while all of them tie.
const TIE_CANDIDATES: usize = 8;

/// Precomputed spatial index over node positions.
pub struct SpatialIndex {
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
    len: usize,
}

impl SpatialIndex {
    /// Build an index where each position's slot becomes its node index.
    ///
    /// Only the first node at each exact position is stored; kiddo cannot
    /// split a bucket holding more than `BUCKET_SIZE` identical points.
    pub fn build(positions: &[Position]) -> Self {
        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        let mut occupied = HashSet::with_capacity(positions.len());
        let mut stacked = 0usize;
        for (index, position) in positions.iter().enumerate() {
            if !occupied.insert(position_key(position)) {
                stacked += 1;
                continue;
            }
            tree.add(&[position.x, position.y], index);
        }

        debug!(
            node_count = positions.len(),
            stacked, "built spatial index"
        );

        Self {
            tree,
            len: positions.len(),
        }
    }

    /// Number of nodes the index was built from.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find the node closest to `point`.
    ///
    /// Equidistant candidates resolve to the lowest node index.
    pub fn nearest(&self, point: Position) -> Option<(NodeIndex, f64)> {
        if self.is_empty() {
            return None;
        }

        let query = [point.x, point.y];
        let mut wanted = TIE_CANDIDATES;
        loop {
            let candidates = self.tree.nearest_n::<SquaredEuclidean>(&query, wanted);
            let best = candidates.first()?.distance;
            let all_tied = candidates
                .last()
                .is_some_and(|neighbour| neighbour.distance <= best);

            if candidates.len() < wanted || !all_tied {
                return candidates
                    .iter()
                    .filter(|neighbour| neighbour.distance <= best)
                    .map(|neighbour| neighbour.item)
                    .min()
                    .map(|index| (index, best.sqrt()));
            }
            wanted *= 2;
        }
    }
}

fn position_key(position: &Position) -> (u64, u64) {
    // Adding zero folds -0.0 into 0.0.
    ((position.x + 0.0).to_bits(), (position.y + 0.0).to_bits())
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("node_count", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(points: &[(f64, f64)]) -> Vec<Position> {
        points.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[test]
    fn empty_index_has_no_nearest() {
        let index = SpatialIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.nearest(Position::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn nearest_picks_closest_point() {
        let index = SpatialIndex::build(&positions(&[(0.0, 0.0), (10.0, 10.0), (50.0, 50.0)]));
        let (node, distance) = index.nearest(Position::new(1.0, 1.0)).expect("nearest");
        assert_eq!(node, 0);
        assert!((distance - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn equidistant_points_resolve_to_lowest_index() {
        let index = SpatialIndex::build(&positions(&[(10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]));
        let (node, _) = index.nearest(Position::new(5.0, 5.0)).expect("nearest");
        assert_eq!(node, 0);
    }

    #[test]
    fn ties_beyond_the_first_candidates_still_pick_lowest_index() {
        let mut points = vec![(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)];
        for (dx, dy) in [
            (5.0, 0.0),
            (-5.0, 0.0),
            (0.0, 5.0),
            (0.0, -5.0),
            (3.0, 4.0),
            (-3.0, 4.0),
            (3.0, -4.0),
            (-3.0, -4.0),
            (4.0, 3.0),
            (-4.0, 3.0),
            (4.0, -3.0),
            (-4.0, -3.0),
        ] {
            points.push((50.0 + dx, 50.0 + dy));
        }
        let index = SpatialIndex::build(&positions(&points));

        let (node, distance) = index.nearest(Position::new(50.0, 50.0)).expect("nearest");
        assert_eq!(node, 4);
        assert_eq!(distance, 5.0);
    }

    #[test]
    fn stacked_duplicates_build_and_resolve_to_first() {
        let mut points = vec![(7.0, 7.0); 100];
        points.push((1.0, 1.0));
        let index = SpatialIndex::build(&positions(&points));

        assert_eq!(index.len(), 101);
        assert_eq!(index.nearest(Position::new(6.0, 6.0)).map(|(n, _)| n), Some(0));
        assert_eq!(index.nearest(Position::new(0.0, 0.0)).map(|(n, _)| n), Some(100));
    }
}
