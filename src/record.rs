//! # Timestep records
//!
//! After the horizontal grid every file holds `nsteps` records of identical size:
//!
//! ```text
//! time:f32 iteration:i32 eta:f32[np] data:f32[step_size * flag_sv]
//! ```
//!
//! For depth integrated files `step_size` is the node count. For layered files each
//! node stores only its wet levels, from its bottom index up to `nlevels`, so
//! `step_size` is the sum of `nlevels - bottom_index + 1` over all nodes. The data
//! block is node major, then level, then component.

use crate::header::Dimension;
use crate::parse::{self, SCALAR_LEN};
use crate::prelude::*;

use byteorder::{ByteOrder, NativeEndian};

/// the leading time and iteration slots of a record
const RECORD_PREFIX_SLOTS: usize = 2;

/// Position of every value inside a timestep record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLayout {
    nodes: usize,
    levels: usize,
    components: usize,
    /// 0-based first wet level of each node
    first_level: Vec<usize>,
    /// offset (in values) of each node's first value inside the data block
    node_offsets: Vec<usize>,
    step_size: usize,
}

impl RecordLayout {
    pub fn new(header: &Header, mesh: &Mesh) -> Result<RecordLayout, Error> {
        let nodes = mesh.node_count();
        let levels = header.effective_levels();

        let first_level = match header.dimension {
            Dimension::Two => vec![0; nodes],
            Dimension::Three => {
                let mut first_level = Vec::with_capacity(nodes);
                for (node, bottom) in mesh.bottom_index.iter().enumerate() {
                    if *bottom > levels {
                        let reason = format!(
                            "node {node} has bottom index {bottom} above the {levels} levels"
                        );
                        return Err(error::MalformedHeader::new("bottom_index", reason).into());
                    }
                    first_level.push(bottom - 1);
                }
                first_level
            }
        };

        let mut node_offsets = Vec::with_capacity(nodes);
        let mut step_size = 0;
        for first in &first_level {
            node_offsets.push(step_size * header.flag_sv);
            step_size += levels - first;
        }

        Ok(RecordLayout {
            nodes,
            levels,
            components: header.flag_sv,
            first_level,
            node_offsets,
            step_size,
        })
    }

    /// number of stored values per component in one record
    pub fn step_size(&self) -> usize {
        self.step_size
    }

    /// levels per node after decoding: `nlevels` for layered files, 1 otherwise
    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn components(&self) -> usize {
        self.components
    }

    /// size of one full record in bytes
    pub fn record_bytes(&self) -> usize {
        SCALAR_LEN * (RECORD_PREFIX_SLOTS + self.nodes + self.step_size * self.components)
    }

    /// Index of a value inside the data block of a record, or `None` if the level is
    /// dry at that node or any index is out of range.
    pub fn value_offset(&self, node: usize, level: usize, component: usize) -> Option<usize> {
        let first = *self.first_level.get(node)?;

        if level < first || level >= self.levels || component >= self.components {
            return None;
        }

        Some(self.node_offsets[node] + (level - first) * self.components + component)
    }

    /// Decode one record. Dry levels are filled with NaN.
    ///
    /// Callers read exactly [`record_bytes`](Self::record_bytes) bytes first; a
    /// short file has already been reported as a truncated record by then.
    pub(crate) fn decode(&self, bytes: &[u8]) -> Record {
        let time = NativeEndian::read_f32(&bytes[0..SCALAR_LEN]) as f64;
        let iteration = NativeEndian::read_i32(&bytes[SCALAR_LEN..2 * SCALAR_LEN]);

        let values = parse::float_view(&bytes[RECORD_PREFIX_SLOTS * SCALAR_LEN..]);
        let (eta, block) = values.split_at(self.nodes);

        let eta = eta.iter().map(|v| *v as f64).collect();

        let mut data = Array3::from_elem((self.nodes, self.levels, self.components), f64::NAN);
        for node in 0..self.nodes {
            for level in self.first_level[node]..self.levels {
                for component in 0..self.components {
                    if let Some(offset) = self.value_offset(node, level, component) {
                        data[[node, level, component]] = block[offset] as f64;
                    }
                }
            }
        }

        Record {
            time,
            iteration,
            eta,
            data,
        }
    }
}

/// A single decoded timestep covering every node
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub time: f64,
    pub iteration: i32,
    /// water surface elevation per node
    pub eta: Array1<f64>,
    /// `(node, level, component)`
    pub data: Array3<f64>,
}
