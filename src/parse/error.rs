use crate::prelude::*;

use std::path::PathBuf;

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "file preamble ended while reading `{}` at byte {}: needed {} bytes",
    field,
    offset,
    needed
)]
pub struct TruncatedHeader {
    pub field: &'static str,
    pub offset: u64,
    pub needed: usize,
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "{:?} ended inside timestep record {} (expected {} records of {} bytes)",
    path,
    step,
    nsteps,
    record_bytes
)]
pub struct TruncatedRecord {
    pub path: PathBuf,
    pub step: usize,
    pub nsteps: usize,
    pub record_bytes: usize,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "malformed header field `{}`: {}", field, reason)]
pub struct MalformedHeader {
    pub field: &'static str,
    pub reason: String,
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "element {} (nodes {:?}) has non-positive signed area {}",
    element,
    nodes,
    area
)]
pub struct DegenerateElement {
    pub element: usize,
    pub nodes: [usize; 3],
    pub area: f64,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "cannot find a parent element for point ({}, {})", x, y)]
pub struct PointNotFound {
    pub x: f64,
    pub y: f64,
}

#[derive(Display, Debug, Constructor, Clone, PartialEq)]
#[display(
    fmt = "sequence file {:?} (index {}) could not be read: {}",
    path,
    index,
    reason
)]
pub struct MissingSequenceFile {
    pub index: usize,
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "invalid {} selector: {}", selector, reason)]
pub struct InvalidSelector {
    pub selector: &'static str,
    pub reason: String,
}
