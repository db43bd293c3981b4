use super::{signed_area, Mesh};
use crate::prelude::*;

/// Relative tolerance of the area containment test. A point is inside an element
/// when the summed absolute areas of its three sub triangles differ from the element
/// area by at most this fraction of the element area.
pub const CONTAINMENT_TOLERANCE: f64 = 1e-5;

/// The element containing a query point together with its interpolation weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentElement {
    /// 0-based element index
    pub element: usize,
    /// 0-based node indices, in the element's own order
    pub nodes: [usize; 3],
    /// barycentric weight of each node. All in `[0, 1]`, summing to 1.
    pub weights: [f64; 3],
}

impl ParentElement {
    /// interpolate per-node values at the query point
    pub fn interpolate(&self, values: ArrayView1<f64>) -> f64 {
        self.nodes
            .iter()
            .zip(self.weights.iter())
            .map(|(node, weight)| values[*node] * weight)
            .sum()
    }
}

impl Mesh {
    /// Find the element containing `(x, y)` and the barycentric weights of its nodes.
    ///
    /// Elements are scanned in ascending index order and the first one that passes the
    /// area containment test is returned, so a point on a shared edge belongs to the
    /// lower numbered element.
    pub fn locate(&self, x: f64, y: f64) -> Result<ParentElement, Error> {
        for (element, nodes) in self.elements.iter().enumerate() {
            let area = self.areas[element];

            let mut out = [0.; 3];
            for (j, sub_area) in out.iter_mut().enumerate() {
                let n1 = nodes[(j + 1) % 3];
                let n2 = nodes[(j + 2) % 3];
                *sub_area = signed_area(self.x[n1], self.x[n2], x, self.y[n1], self.y[n2], y);
            }

            let summed: f64 = out.iter().map(|a| a.abs()).sum();

            if (summed - area).abs() / area <= CONTAINMENT_TOLERANCE {
                let parent = ParentElement {
                    element,
                    nodes: *nodes,
                    weights: clamp_weights([out[0] / area, out[1] / area, out[2] / area]),
                };

                debug!(
                    element = element + 1,
                    nodes = ?parent.nodes,
                    weights = ?parent.weights,
                    "parent element"
                );

                return Ok(parent);
            }
        }

        Err(error::PointNotFound::new(x, y).into())
    }
}

/// Force raw barycentric weights into `[0, 1]` with a sum of exactly one. Points
/// on or slightly outside an edge pick up small negative weights from float error.
fn clamp_weights(raw: [f64; 3]) -> [f64; 3] {
    // the third weight is always rebuilt from the other two
    let [w0, w1, _] = raw;
    let w1 = w1.clamp(0., 1.);

    if w0 + w1 > 1. {
        [w0, 1. - w0, 0.]
    } else {
        [w0, w1, 1. - w0 - w1]
    }
}
