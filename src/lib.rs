#![doc = include_str!("../README.md")]

pub mod dataset;
pub mod header;
pub mod interp;
pub mod mesh;
pub mod parse;
pub mod prelude;
pub mod record;
pub mod series;

pub use dataset::Dataset;
pub use header::{Dimension, Header, TextField};
pub use interp::{PointSeries, SigmaLevel};
pub use mesh::{KdTree, Mesh, Neighbor, ParentElement};
pub use record::{Record, RecordLayout};
pub use series::{ExtractRequest, SkipPolicy, SkippedFile, TimeSeries};

pub use ndarray;

use parse::error;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug, derive_more::From)]
pub enum Error {
    #[error("An io error occured: `{0}`")]
    Io(std::io::Error),
    #[error("Could not assemble the output arrays: `{0}`")]
    Shape(ndarray::ShapeError),
    #[error("{0}")]
    TruncatedHeader(error::TruncatedHeader),
    #[error("{0}")]
    TruncatedRecord(error::TruncatedRecord),
    #[error("{0}")]
    MalformedHeader(error::MalformedHeader),
    #[error("{0}")]
    DegenerateElement(error::DegenerateElement),
    #[error("{0}")]
    PointNotFound(error::PointNotFound),
    #[error("{0}")]
    MissingSequenceFile(error::MissingSequenceFile),
    #[error("{0}")]
    InvalidSelector(error::InvalidSelector),
}

/// Open the first file of a series. Shorthand for [`Dataset::open`].
pub fn open_dataset<P: AsRef<std::path::Path>>(path: P, file_count: usize) -> Result<Dataset, Error> {
    Dataset::open(path, file_count)
}
