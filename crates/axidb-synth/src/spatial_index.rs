//! Static 2-D k-d tree over one representative point per element.
//!
//! The tree is stored implicitly: `order` is a permutation of the point ids in
//! which every subrange `[lo, hi)` holds its splitting point at `(lo + hi) / 2`,
//! split on axis `depth % 2`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<[f64; 2]>,
    order: Vec<usize>,
}

/// Neighbour candidate ordered by squared distance, then id
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    dist2: f64,
    id: usize,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2
            .total_cmp(&other.dist2)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl KdTree {
    /// Build a balanced tree over the given points
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        build(&points, &mut order, 0);
        Self { points, order }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Up to `k` point ids ordered nearest-first by Euclidean distance to `query`
    ///
    /// Equal distances are ordered by ascending id.
    pub fn nearest(&self, query: [f64; 2], k: usize) -> Vec<usize> {
        self.nearest_with_distance(query, k)
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    /// Like [`KdTree::nearest`], also returning the distances
    pub fn nearest_with_distance(&self, query: [f64; 2], k: usize) -> Vec<(usize, f64)> {
        if k == 0 || self.points.is_empty() {
            return Vec::new();
        }
        let k = k.min(self.points.len());
        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.search(query, k, 0, self.order.len(), 0, &mut heap);
        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.id, c.dist2.sqrt()))
            .collect()
    }

    fn search(
        &self,
        query: [f64; 2],
        k: usize,
        lo: usize,
        hi: usize,
        depth: usize,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let id = self.order[mid];
        let point = self.points[id];

        let candidate = Candidate {
            dist2: (query[0] - point[0]).powi(2) + (query[1] - point[1]).powi(2),
            id,
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(worst) = heap.peek()
            && candidate < *worst
        {
            heap.pop();
            heap.push(candidate);
        }

        let axis = depth % 2;
        let diff = query[axis] - point[axis];
        let (near, far) = if diff < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.search(query, k, near.0, near.1, depth + 1, heap);

        let must_visit_far = heap.len() < k
            || heap
                .peek()
                .is_some_and(|worst| diff * diff <= worst.dist2);
        if must_visit_far {
            self.search(query, k, far.0, far.1, depth + 1, heap);
        }
    }
}

fn build(points: &[[f64; 2]], order: &mut [usize], depth: usize) {
    if order.len() <= 1 {
        return;
    }
    let axis = depth % 2;
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));
    let (left, right) = order.split_at_mut(mid);
    build(points, left, depth + 1);
    build(points, &mut right[1..], depth + 1);
}
