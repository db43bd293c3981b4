use crate::prelude::*;

use std::cmp::Ordering;

/// A node returned from a nearest neighbour query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// 0-based node index
    pub index: usize,
    /// euclidean distance to the query point
    pub distance: f64,
}

/// Static 2D kd-tree over the mesh nodes.
///
/// The tree is implicit: `order` is a permutation of the node indices where every
/// subrange `lo..hi` holds its splitting node at the midpoint, with the smaller half
/// before it. Split axes alternate between x and y with depth. The tree does not own
/// the coordinates; they are borrowed from the mesh for every query.
#[derive(Debug, Clone)]
pub struct KdTree {
    order: Vec<usize>,
}

impl KdTree {
    pub fn new(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Self {
        let mut order: Vec<usize> = (0..x.len()).collect();
        build(&mut order, &x, &y, 0);
        Self { order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The `k` nodes closest to `point`, nearest first. Nodes at the same distance
    /// are returned in ascending index order. Fewer than `k` nodes are returned only
    /// if the tree holds fewer than `k`.
    pub fn nearest<'v>(
        &self,
        x: ArrayView1<'v, f64>,
        y: ArrayView1<'v, f64>,
        point: [f64; 2],
        k: usize,
    ) -> Vec<Neighbor> {
        let mut best: Vec<(f64, usize)> = Vec::with_capacity(k + 1);

        if k > 0 {
            let query = Query {
                x: &x,
                y: &y,
                point,
                k,
            };
            self.search(&query, 0, self.order.len(), 0, &mut best);
        }

        best.into_iter()
            .map(|(d2, index)| Neighbor {
                index,
                distance: d2.sqrt(),
            })
            .collect()
    }

    fn search(
        &self,
        query: &Query<'_, '_>,
        lo: usize,
        hi: usize,
        depth: usize,
        best: &mut Vec<(f64, usize)>,
    ) {
        if lo >= hi {
            return;
        }

        let mid = lo + (hi - lo) / 2;
        let node = self.order[mid];
        query.consider(node, best);

        let axis = depth % 2;
        let diff = query.point[axis] - coordinate(query.x, query.y, axis, node);

        let (near, far) = if diff < 0. {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.search(query, near.0, near.1, depth + 1, best);

        // equal distances must still be visited so that lower indices win ties
        let worst = best.last().map(|b| b.0).unwrap_or(f64::INFINITY);
        if best.len() < query.k || diff * diff <= worst {
            self.search(query, far.0, far.1, depth + 1, best);
        }
    }
}

struct Query<'a, 'v> {
    x: &'a ArrayView1<'v, f64>,
    y: &'a ArrayView1<'v, f64>,
    point: [f64; 2],
    k: usize,
}

impl Query<'_, '_> {
    fn consider(&self, node: usize, best: &mut Vec<(f64, usize)>) {
        let dx = self.x[node] - self.point[0];
        let dy = self.y[node] - self.point[1];
        let candidate = (dx * dx + dy * dy, node);

        if best.len() == self.k {
            match best.last() {
                Some(worst) if by_distance(&candidate, worst) == Ordering::Less => (),
                _ => return,
            }
        }

        let position = best
            .binary_search_by(|probe| by_distance(probe, &candidate))
            .unwrap_or_else(|p| p);
        best.insert(position, candidate);
        best.truncate(self.k);
    }
}

fn by_distance(a: &(f64, usize), b: &(f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

fn coordinate(x: &ArrayView1<f64>, y: &ArrayView1<f64>, axis: usize, node: usize) -> f64 {
    if axis == 0 {
        x[node]
    } else {
        y[node]
    }
}

fn build(order: &mut [usize], x: &ArrayView1<f64>, y: &ArrayView1<f64>, depth: usize) {
    if order.len() <= 1 {
        return;
    }

    let axis = depth % 2;
    let mid = order.len() / 2;

    order.select_nth_unstable_by(mid, |a, b| {
        coordinate(x, y, axis, *a)
            .total_cmp(&coordinate(x, y, axis, *b))
            .then(a.cmp(b))
    });

    let (left, right) = order.split_at_mut(mid);
    build(left, x, y, depth + 1);
    build(&mut right[1..], x, y, depth + 1);
}
