//! Conversion of node valued time series to values at arbitrary points

use crate::prelude::*;

use std::str::FromStr;

/// How the vertical dimension is collapsed when extracting a series at a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigmaLevel {
    /// mean over all levels of the first component
    Average,
    /// level 0
    Top,
    /// level `nlevels - 1`
    Bottom,
    /// level `nlevels / 2`
    Middle,
}

impl SigmaLevel {
    /// the single level read for this mode, `None` when all levels are averaged
    pub fn level(&self, nlevels: usize) -> Option<usize> {
        match self {
            SigmaLevel::Average => None,
            SigmaLevel::Top => Some(0),
            SigmaLevel::Bottom => Some(nlevels.saturating_sub(1)),
            SigmaLevel::Middle => Some(nlevels / 2),
        }
    }
}

impl FromStr for SigmaLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(SigmaLevel::Average),
            "top" => Ok(SigmaLevel::Top),
            "bottom" => Ok(SigmaLevel::Bottom),
            "middle" => Ok(SigmaLevel::Middle),
            other => {
                let reason = format!(
                    "unknown reduction `{other}`, expected average, top, bottom or middle"
                );
                Err(error::InvalidSelector::new("sigma level", reason).into())
            }
        }
    }
}

/// A time series reduced to a single location
#[derive(Debug, Clone, PartialEq)]
pub struct PointSeries {
    pub t: Array1<f64>,
    /// `(timestep, component)`. A single column for [`SigmaLevel::Average`].
    pub values: Array2<f64>,
    /// elevation at the point, when it was requested
    pub eta: Option<Array1<f64>>,
}

impl PointSeries {
    /// `[t, value...]` per row
    pub fn columns(&self) -> Array2<f64> {
        stack_time(&self.t, self.values.view())
    }

    /// `[t, eta]` per row, when elevation was requested
    pub fn eta_columns(&self) -> Option<Array2<f64>> {
        self.eta
            .as_ref()
            .map(|eta| stack_time(&self.t, eta.view().insert_axis(Axis(1))))
    }
}

fn stack_time(t: &Array1<f64>, values: ArrayView2<f64>) -> Array2<f64> {
    let mut out = Array2::zeros((t.len(), values.ncols() + 1));
    out.column_mut(0).assign(t);
    out.slice_mut(ndarray::s![.., 1..]).assign(&values);
    out
}

/// Combine each consecutive triple of nodes in `series` into one point using the
/// barycentric weights of the matching parent element. Elevation, depth and every
/// `(timestep, level, component)` slot are interpolated independently.
pub(crate) fn interpolate(series: &TimeSeries, parents: &[ParentElement]) -> TimeSeries {
    let (steps, _, levels, components) = series.data.dim();
    let points = parents.len();

    let mut data = Array4::zeros((steps, points, levels, components));
    let mut eta = Array2::zeros((steps, points));
    let mut dp = Array1::zeros(points);

    for (point, parent) in parents.iter().enumerate() {
        for (slot, weight) in parent.weights.iter().enumerate() {
            let column = 3 * point + slot;

            data.index_axis_mut(Axis(1), point)
                .scaled_add(*weight, &series.data.index_axis(Axis(1), column));
            eta.column_mut(point)
                .scaled_add(*weight, &series.eta.column(column));
            dp[point] += weight * series.dp[column];
        }
    }

    TimeSeries {
        t: series.t.clone(),
        t_iter: series.t_iter.clone(),
        eta,
        dp,
        data,
        skipped: series.skipped.clone(),
    }
}

/// Collapse a series read at a handful of nodes to a single point.
///
/// For [`SigmaLevel::Average`] the first component is averaged over levels and then
/// over nodes. Otherwise the series must have been read at exactly one level, and
/// every component is averaged over nodes. Dry levels (NaN) do not take part in
/// the averages.
pub(crate) fn reduce(series: &TimeSeries, mode: SigmaLevel, return_elevation: bool) -> PointSeries {
    let values = match mode {
        SigmaLevel::Average => series
            .data
            .index_axis(Axis(3), 0)
            .map_axis(Axis(2), nanmean)
            .map_axis(Axis(1), nanmean)
            .insert_axis(Axis(1)),
        _ => series
            .data
            .index_axis(Axis(2), 0)
            .map_axis(Axis(1), nanmean),
    };

    let eta = return_elevation.then(|| series.eta.map_axis(Axis(1), nanmean));

    PointSeries {
        t: series.t.clone(),
        values,
        eta,
    }
}

/// mean of the non NaN values, NaN if there are none
fn nanmean(lane: ArrayView1<f64>) -> f64 {
    let (sum, count) = lane
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0., 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
