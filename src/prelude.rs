//! Common traits and types that are useful for working with `selfe`
#![allow(unused_imports)]

pub use crate::dataset::Dataset;
pub use crate::header::{Header, TextField};
pub use crate::interp::{PointSeries, SigmaLevel};
pub use crate::mesh::{Mesh, Neighbor, ParentElement};
pub use crate::series::{ExtractRequest, SkipPolicy, SkippedFile, TimeSeries};

pub(crate) use crate::parse::error;
pub(crate) use crate::Error;

pub(crate) use std::io::{Read, Seek, SeekFrom};

pub(crate) use derive_more::{Constructor, Deref, Display, From, Into};

pub(crate) use ndarray::{Array1, Array2, Array3, Array4, ArrayView1, ArrayView2, Axis};

pub(crate) use tracing::{debug, info, warn};
