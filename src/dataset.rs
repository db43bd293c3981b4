use crate::interp;
use crate::parse::PreambleReader;
use crate::prelude::*;
use crate::record::RecordLayout;
use crate::series::TimeSeriesReader;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// number of nodes combined by [`Dataset::extract_at_points`]
const POINT_NODES: usize = 3;

/// A series of SELFE binary output files sharing one header and horizontal grid.
///
/// The header and grid are decoded once from the first file and are read only
/// afterwards; every extraction reads the timestep records from disk again.
///
/// ```ignore
/// let model = selfe::Dataset::open("./data/1_elev.61", 3)?;
/// let series = model.extract_time_series(&selfe::ExtractRequest::new("hvel.64"))?;
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    directory: PathBuf,
    file_count: usize,
    header: Header,
    mesh: Mesh,
    layout: RecordLayout,
    data_start: u64,
}

impl Dataset {
    /// Decode the header and grid of `path`, normally the first file of a series.
    /// `file_count` is the number of files read when a request does not say otherwise.
    pub fn open<P: AsRef<Path>>(path: P, file_count: usize) -> Result<Dataset, Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut dataset = Dataset::from_reader(BufReader::new(file), file_count)?;

        dataset.path = path.to_path_buf();
        dataset.directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        info!(
            path = %path.display(),
            nodes = dataset.mesh.node_count(),
            elements = dataset.mesh.element_count(),
            nsteps = dataset.header.nsteps,
            record_bytes = dataset.layout.record_bytes(),
            "opened dataset"
        );

        Ok(dataset)
    }

    /// Decode the header and grid from any stream positioned at the start of a file.
    /// The dataset has no path, so extractions default to the working directory.
    pub fn from_reader<R: Read>(reader: R, file_count: usize) -> Result<Dataset, Error> {
        let mut reader = PreambleReader::new(reader);

        let header = Header::read(&mut reader)?;
        let mesh = Mesh::read(&mut reader)?;
        let data_start = reader.consumed();
        let layout = RecordLayout::new(&header, &mesh)?;

        Ok(Dataset {
            path: PathBuf::new(),
            directory: PathBuf::new(),
            file_count,
            header,
            mesh,
            layout,
            data_start,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// directory searched for sequence files unless a request names another one
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// byte offset of the first timestep record in every file of the series
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// number of stored values per component in one timestep record
    pub fn step_size(&self) -> usize {
        self.layout.step_size()
    }

    /// size of one timestep record in bytes
    pub fn record_bytes(&self) -> usize {
        self.layout.record_bytes()
    }

    /// the element containing `(x, y)` and the interpolation weights of its nodes
    pub fn locate(&self, x: f64, y: f64) -> Result<ParentElement, Error> {
        self.mesh.locate(x, y)
    }

    /// Locate a batch of points. A point outside the mesh fails on its own without
    /// affecting the others.
    pub fn locate_all(&self, points: ArrayView2<f64>) -> Result<Vec<Result<ParentElement, Error>>, Error> {
        if points.ncols() != 2 {
            let reason = format!("expected an (n, 2) array, got {:?}", points.dim());
            return Err(error::InvalidSelector::new("point", reason).into());
        }

        Ok(points
            .rows()
            .into_iter()
            .map(|xy| self.mesh.locate(xy[0], xy[1]))
            .collect())
    }

    /// the `k` nodes nearest to `(x, y)`, nearest first
    pub fn nearest_nodes(&self, x: f64, y: f64, k: usize) -> Vec<Neighbor> {
        self.mesh.nearest_nodes(x, y, k)
    }

    /// Extract a time, node and level slice of a variable over a sequence of files.
    pub fn extract_time_series(&self, request: &ExtractRequest) -> Result<TimeSeries, Error> {
        self.reader()
            .extract(request, &self.directory, self.file_count)
    }

    /// Extract a variable at `(x, y)` from the three nearest nodes, averaged with
    /// equal weights, collapsing the vertical as `mode` describes.
    pub fn extract_at_points(
        &self,
        variable: &str,
        x: f64,
        y: f64,
        mode: SigmaLevel,
        return_elevation: bool,
    ) -> Result<PointSeries, Error> {
        let nodes: Vec<usize> = self
            .mesh
            .nearest_nodes(x, y, POINT_NODES)
            .into_iter()
            .map(|neighbor| neighbor.index)
            .collect();

        if nodes.is_empty() {
            let reason = "the mesh has no nodes".to_string();
            return Err(error::InvalidSelector::new("point", reason).into());
        }

        let mut request = ExtractRequest::new(variable).nodes(nodes);
        if let Some(level) = mode.level(self.header.nlevels) {
            request = request.levels(vec![level]);
        }

        let series = self.extract_time_series(&request)?;

        Ok(interp::reduce(&series, mode, return_elevation))
    }

    fn reader(&self) -> TimeSeriesReader<'_> {
        TimeSeriesReader {
            header: &self.header,
            mesh: &self.mesh,
            layout: &self.layout,
            data_start: self.data_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::tests::header_bytes;
    use crate::mesh::tests::mesh_bytes;

    fn preamble() -> Vec<u8> {
        let mut bytes = header_bytes(2, 1, 2, 1, 0);
        bytes.extend(mesh_bytes(
            &[(0., 0., 1., 1), (1., 0., 2., 1), (0., 1., 3., 1)],
            &[[1, 2, 3]],
        ));
        bytes
    }

    #[test]
    fn data_starts_after_the_grid() {
        let bytes = preamble();
        let dataset = Dataset::from_reader(bytes.as_slice(), 1).unwrap();

        assert_eq!(dataset.data_start() as usize, bytes.len());
        assert_eq!(dataset.step_size(), 3);
        assert_eq!(dataset.record_bytes(), 4 * (2 + 3 + 3));
        assert_eq!(dataset.file_count(), 1);
        assert_eq!(dataset.directory(), Path::new(""));
    }

    #[test]
    fn locate_all_keeps_going() {
        let dataset = Dataset::from_reader(preamble().as_slice(), 1).unwrap();
        let points = ndarray::array![[0.2, 0.2], [5., 5.], [0.1, 0.1]];

        let out = dataset.locate_all(points.view()).unwrap();

        assert!(out[0].is_ok());
        assert!(matches!(out[1], Err(Error::PointNotFound(_))));
        assert!(out[2].is_ok());
    }

    #[test]
    fn locate_all_checks_shape() {
        let dataset = Dataset::from_reader(preamble().as_slice(), 1).unwrap();
        let points = ndarray::array![[0.2, 0.2, 0.]];

        assert!(matches!(
            dataset.locate_all(points.view()),
            Err(Error::InvalidSelector(_))
        ));
    }

    #[test]
    fn truncated_preamble() {
        let mut bytes = preamble();
        bytes.truncate(100);

        assert!(matches!(
            Dataset::from_reader(bytes.as_slice(), 1),
            Err(Error::TruncatedHeader(_))
        ));
    }
}
