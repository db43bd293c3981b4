//! # Horizontal grid
//!
//! The unstructured triangular mesh stored right after the [`Header`](crate::Header).
//! The layout in the file is
//!
//! ```text
//! np:i32 ne:i32
//! np x [x:f32 y:f32 depth:f32 bottom_index:i32]
//! ne x [type:i32 n0:i32 n1:i32 n2:i32]
//! ```
//!
//! The node block is a single byte region holding both floats and ints. It is read
//! once into a raw buffer and then viewed twice: once as floats for the
//! coordinates and depth, once as ints for the bottom index. Element node numbers
//! are 1-based in the file and 0-based everywhere in this crate.
//!
//! A [`Mesh`] is immutable once built. It owns its coordinate and connectivity
//! arrays, and the kd-tree over the node coordinates is built alongside it.

mod kdtree;
mod locate;

pub use kdtree::{KdTree, Neighbor};
pub use locate::{ParentElement, CONTAINMENT_TOLERANCE};

use crate::parse::{self, PreambleReader, SCALAR_LEN};
use crate::prelude::*;

/// slots per node in the node block
const NODE_SLOTS: usize = 4;
/// slots per element in the connectivity block (type tag + 3 nodes)
const ELEMENT_SLOTS: usize = 4;

#[derive(Debug, Clone)]
pub struct Mesh {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    /// bathymetric depth of each node
    pub depth: Array1<f64>,
    /// 1-based index of the first wet level of each node, values below 1 clamped to 1
    pub bottom_index: Vec<usize>,
    /// 0-based node indices of each triangle
    pub elements: Vec<[usize; 3]>,
    areas: Vec<f64>,
    index: KdTree,
}

impl Mesh {
    /// decode the horizontal grid. The reader must be positioned right after the header.
    pub fn read<R: Read>(reader: &mut PreambleReader<R>) -> Result<Mesh, Error> {
        let np = parse::count("np", reader.int("np")?)?;
        let ne = parse::count("ne", reader.int("ne")?)?;

        let node_block = reader.raw("nodes", np * NODE_SLOTS * SCALAR_LEN)?;
        let floats = parse::float_view(&node_block);
        let ints = parse::int_view(&node_block);

        let x = floats.chunks_exact(NODE_SLOTS).map(|n| n[0] as f64).collect();
        let y = floats.chunks_exact(NODE_SLOTS).map(|n| n[1] as f64).collect();
        let depth = floats.chunks_exact(NODE_SLOTS).map(|n| n[2] as f64).collect();
        let bottom = ints.chunks_exact(NODE_SLOTS).map(|n| n[3]).collect();

        // first column is the element type tag
        let elements = reader
            .ints("elements", ne * ELEMENT_SLOTS)?
            .chunks_exact(ELEMENT_SLOTS)
            .map(|e| [e[1], e[2], e[3]])
            .collect();

        Mesh::from_parts(x, y, depth, bottom, elements)
    }

    /// Build a mesh from node arrays and 1-based element connectivity, with the
    /// same validation that is applied when decoding a file.
    pub fn from_parts(
        x: Array1<f64>,
        y: Array1<f64>,
        depth: Array1<f64>,
        bottom_index: Vec<i32>,
        elements: Vec<[i32; 3]>,
    ) -> Result<Mesh, Error> {
        let np = x.len();

        if y.len() != np || depth.len() != np || bottom_index.len() != np {
            let reason = format!(
                "node arrays disagree in length: x {}, y {}, depth {}, bottom index {}",
                np,
                y.len(),
                depth.len(),
                bottom_index.len()
            );
            return Err(error::MalformedHeader::new("nodes", reason).into());
        }

        let bottom_index = bottom_index.into_iter().map(|k| k.max(1) as usize).collect();

        let mut zero_based = Vec::with_capacity(elements.len());
        for (element, nodes) in elements.iter().enumerate() {
            let mut converted = [0; 3];
            for (slot, node) in nodes.iter().enumerate() {
                if *node < 1 || *node as usize > np {
                    let reason = format!(
                        "element {element} references node {node}, outside [1, {np}]"
                    );
                    return Err(error::MalformedHeader::new("elements", reason).into());
                }
                converted[slot] = *node as usize - 1;
            }
            zero_based.push(converted);
        }

        let areas = element_areas(x.view(), y.view(), &zero_based)?;
        let index = KdTree::new(x.view(), y.view());

        debug!(nodes = np, elements = zero_based.len(), "decoded horizontal grid");

        Ok(Mesh {
            x,
            y,
            depth,
            bottom_index,
            elements: zero_based,
            areas,
            index,
        })
    }

    pub fn node_count(&self) -> usize {
        self.x.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// signed (always positive) area of an element
    pub fn element_area(&self, element: usize) -> Option<f64> {
        self.areas.get(element).copied()
    }

    /// the `k` nodes closest to `(x, y)`, nearest first
    pub fn nearest_nodes(&self, x: f64, y: f64, k: usize) -> Vec<Neighbor> {
        self.index.nearest(self.x.view(), self.y.view(), [x, y], k)
    }
}

/// signed area of the triangle `(1, 2, 3)`, positive for counter clockwise winding
pub(crate) fn signed_area(x1: f64, x2: f64, x3: f64, y1: f64, y2: f64, y3: f64) -> f64 {
    ((x1 - x3) * (y2 - y3) - (x2 - x3) * (y1 - y3)) / 2.
}

fn element_areas(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    elements: &[[usize; 3]],
) -> Result<Vec<f64>, Error> {
    let mut areas = Vec::with_capacity(elements.len());

    for (element, &[n0, n1, n2]) in elements.iter().enumerate() {
        let area = signed_area(x[n1], x[n2], x[n0], y[n1], y[n2], y[n0]);

        if area <= 0. {
            return Err(error::DegenerateElement::new(element, [n0, n1, n2], area).into());
        }

        areas.push(area);
    }

    Ok(areas)
}
