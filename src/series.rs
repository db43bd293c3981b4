//! # Time series extraction
//!
//! A model run is split into numbered files `1_elev.61`, `2_elev.61`, ... inside one
//! directory, each holding `nsteps` records. Extraction walks the files in increasing
//! index order and the records of each file in increasing timestep order, slicing every
//! record by node first and level second. The output arrays are the concatenation of
//! all files that could be read.
//!
//! Files that cannot be opened or read are skipped by default and reported in
//! [`TimeSeries::skipped`]; use [`SkipPolicy::Fail`] to turn them into errors.

use crate::interp;
use crate::prelude::*;
use crate::record::RecordLayout;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// What to do with a file of the sequence that cannot be opened or read completely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipPolicy {
    /// leave the file out of the result and record it in [`TimeSeries::skipped`]
    #[default]
    SkipUnreadable,
    /// abort the extraction with the first failure
    Fail,
}

/// A file of the sequence that was left out of a result
#[derive(Debug, Clone, PartialEq, From, Into)]
pub struct SkippedFile(pub error::MissingSequenceFile);

impl SkippedFile {
    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn path(&self) -> &Path {
        &self.0.path
    }
}

/// The arguments of a time series extraction. Everything except the variable is
/// optional; unset values fall back to the defaults of the [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest {
    pub(crate) variable: String,
    pub(crate) nodes: Option<Vec<usize>>,
    pub(crate) levels: Option<Vec<usize>>,
    pub(crate) points: Option<Array2<f64>>,
    pub(crate) file_count: Option<usize>,
    pub(crate) start_file: Option<usize>,
    pub(crate) directory: Option<PathBuf>,
    pub(crate) skip_policy: SkipPolicy,
}

impl ExtractRequest {
    /// `variable` is the file suffix, such as `elev.61` or `hvel.64`
    pub fn new<T: Into<String>>(variable: T) -> Self {
        Self {
            variable: variable.into(),
            ..Default::default()
        }
    }

    /// 0-based node indices to extract, in output order
    pub fn nodes(mut self, nodes: Vec<usize>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// 0-based level indices to extract. Ignored for depth integrated files.
    pub fn levels(mut self, levels: Vec<usize>) -> Self {
        self.levels = Some(levels);
        self
    }

    /// `(n, 2)` array of query coordinates. Each point is located in the mesh and the
    /// result is interpolated to the points. Cannot be combined with [`nodes`](Self::nodes).
    pub fn points(mut self, points: Array2<f64>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn file_count(mut self, file_count: usize) -> Self {
        self.file_count = Some(file_count);
        self
    }

    /// index of the first file of the sequence, 1 unless set
    pub fn start_file(mut self, start_file: usize) -> Self {
        self.start_file = Some(start_file);
        self
    }

    pub fn directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn skip_policy(mut self, skip_policy: SkipPolicy) -> Self {
        self.skip_policy = skip_policy;
        self
    }
}

/// Result of a time series extraction
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// seconds since the start of the run, one per timestep
    pub t: Array1<f64>,
    /// iteration number of each timestep
    pub t_iter: Array1<i32>,
    /// water surface elevation `(timestep, node)`
    pub eta: Array2<f64>,
    /// bathymetric depth per node
    pub dp: Array1<f64>,
    /// `(timestep, node, level, component)`
    pub data: Array4<f64>,
    /// files of the sequence that were left out
    pub skipped: Vec<SkippedFile>,
}

impl TimeSeries {
    /// number of timesteps across all files that were read
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// file indices of the skipped files, in sequence order
    pub fn skipped_indices(&self) -> Vec<usize> {
        self.skipped.iter().map(SkippedFile::index).collect()
    }
}

/// Reads timestep records from a file sequence that shares one header and grid
pub(crate) struct TimeSeriesReader<'a> {
    pub(crate) header: &'a Header,
    pub(crate) mesh: &'a Mesh,
    pub(crate) layout: &'a RecordLayout,
    /// byte offset of the first record in every file
    pub(crate) data_start: u64,
}

/// node and level indices to keep, after request validation
struct Selection {
    nodes: Vec<usize>,
    levels: Vec<usize>,
    parents: Option<Vec<ParentElement>>,
}

/// all records of one file, already sliced
struct FileSlice {
    t: Vec<f64>,
    t_iter: Vec<i32>,
    eta: Vec<f64>,
    data: Vec<f64>,
}

impl<'a> TimeSeriesReader<'a> {
    /// Extract the requested slice. `directory` and `file_count` are the resolved
    /// defaults for values the request leaves unset.
    pub(crate) fn extract(
        &self,
        request: &ExtractRequest,
        directory: &Path,
        file_count: usize,
    ) -> Result<TimeSeries, Error> {
        let selection = self.select(request)?;

        let directory = request.directory.as_deref().unwrap_or(directory);
        let file_count = request.file_count.unwrap_or(file_count);
        let start = request.start_file.unwrap_or(1);
        let end = start.checked_add(file_count).ok_or_else(|| {
            let reason = format!("{file_count} files starting at index {start} overflow");
            error::InvalidSelector::new("file", reason)
        })?;

        let mut t = Vec::new();
        let mut t_iter = Vec::new();
        let mut eta = Vec::new();
        let mut data = Vec::new();
        let mut skipped = Vec::new();

        for index in start..end {
            let path = directory.join(format!("{index}_{}", request.variable));

            match self.read_file(index, &path, &selection) {
                Ok(slice) => {
                    t.extend(slice.t);
                    t_iter.extend(slice.t_iter);
                    eta.extend(slice.eta);
                    data.extend(slice.data);
                }
                Err(err) if request.skip_policy == SkipPolicy::Fail => return Err(err),
                Err(err) => {
                    warn!(index, path = %path.display(), %err, "skipping sequence file");
                    let missing = match err {
                        Error::MissingSequenceFile(missing) => missing,
                        other => error::MissingSequenceFile::new(index, path, other.to_string()),
                    };
                    skipped.push(SkippedFile::from(missing));
                }
            }
        }

        let steps = t.len();
        let nodes = selection.nodes.len();
        let levels = selection.levels.len();
        let components = self.layout.components();

        let series = TimeSeries {
            t: Array1::from(t),
            t_iter: Array1::from(t_iter),
            eta: Array2::from_shape_vec((steps, nodes), eta)?,
            dp: self.mesh.depth.select(Axis(0), &selection.nodes),
            data: Array4::from_shape_vec((steps, nodes, levels, components), data)?,
            skipped,
        };

        info!(
            variable = %request.variable,
            timesteps = steps,
            nodes,
            levels,
            skipped = series.skipped.len(),
            "extracted time series"
        );

        let series = match &selection.parents {
            Some(parents) => interp::interpolate(&series, parents),
            None => series,
        };

        Ok(series)
    }

    /// Resolve and validate the node and level selectors before touching any file
    fn select(&self, request: &ExtractRequest) -> Result<Selection, Error> {
        let np = self.mesh.node_count();

        let (nodes, parents) = match (&request.nodes, &request.points) {
            (Some(_), Some(_)) => {
                let reason = "query points and node indices are mutually exclusive".to_string();
                return Err(error::InvalidSelector::new("node", reason).into());
            }
            (None, Some(points)) => {
                if points.ncols() != 2 {
                    let reason = format!("expected an (n, 2) array, got {:?}", points.dim());
                    return Err(error::InvalidSelector::new("point", reason).into());
                }

                let parents = points
                    .rows()
                    .into_iter()
                    .map(|xy| self.mesh.locate(xy[0], xy[1]))
                    .collect::<Result<Vec<_>, _>>()?;

                let nodes = parents.iter().flat_map(|p| p.nodes).collect();
                (nodes, Some(parents))
            }
            (Some(nodes), None) => {
                if let Some(node) = nodes.iter().find(|n| **n >= np) {
                    let reason = format!("node {node} is outside the {np} mesh nodes");
                    return Err(error::InvalidSelector::new("node", reason).into());
                }
                (nodes.clone(), None)
            }
            (None, None) => ((0..np).collect(), None),
        };

        let levels = if self.header.is_3d() {
            match &request.levels {
                Some(levels) => {
                    let nlevels = self.header.nlevels;
                    if let Some(level) = levels.iter().find(|l| **l >= nlevels) {
                        let reason = format!("level {level} is outside the {nlevels} levels");
                        return Err(error::InvalidSelector::new("level", reason).into());
                    }
                    levels.clone()
                }
                None => (0..self.header.nlevels).collect(),
            }
        } else {
            // depth integrated files only have a single level
            vec![0]
        };

        Ok(Selection {
            nodes,
            levels,
            parents,
        })
    }

    /// Read and slice every record of one file. Nothing is returned unless all
    /// `nsteps` records could be read.
    fn read_file(
        &self,
        index: usize,
        path: &Path,
        selection: &Selection,
    ) -> Result<FileSlice, Error> {
        let file = File::open(path).map_err(|e| {
            error::MissingSequenceFile::new(index, path.to_path_buf(), e.to_string())
        })?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(self.data_start))?;

        let nsteps = self.header.nsteps;
        let record_bytes = self.layout.record_bytes();
        let mut buffer = vec![0; record_bytes];

        // nsteps is taken from the header, so the output only grows as records arrive
        let mut slice = FileSlice {
            t: Vec::new(),
            t_iter: Vec::new(),
            eta: Vec::new(),
            data: Vec::new(),
        };

        for step in 0..nsteps {
            if let Err(e) = reader.read_exact(&mut buffer) {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    let truncated =
                        error::TruncatedRecord::new(path.to_path_buf(), step, nsteps, record_bytes);
                    return Err(truncated.into());
                }
                return Err(e.into());
            }

            let record = self.layout.decode(&buffer);

            let data = record
                .data
                .select(Axis(0), &selection.nodes)
                .select(Axis(1), &selection.levels);

            slice.t.push(record.time);
            slice.t_iter.push(record.iteration);
            slice
                .eta
                .extend(selection.nodes.iter().map(|node| record.eta[*node]));
            slice.data.extend(data.iter());
        }

        Ok(slice)
    }
}
