//! # Header
//!
//! The preamble of every SELFE binary output file (data format version 5). Five text
//! descriptors are followed by the scalar run parameters and the vertical grid
//! description:
//!
//! ```text
//! data_format[48] version[48] start_time[48] var_type[48] var_dimension[48]
//! nsteps:i32 dt:f32 skip:i32 flag_sv:i32 flag_dm:i32
//! nlevels:i32 kz:i32 h0:f32 hs:f32 hc:f32 theta_b:f32 theta:f32
//! zlevels:f32[kz] slevels:f32[nlevels - kz]
//! ```
//!
//! Only pure sigma coordinates are handled; `zlevels` is decoded but never used to
//! build hybrid sigma-z depths.

use crate::parse::{self, PreambleReader, TEXT_FIELD_LEN};
use crate::prelude::*;

/// A fixed width text descriptor exactly as it is stored in the file
#[derive(Debug, Clone, PartialEq, Eq, Constructor, Deref, Into)]
pub struct TextField([u8; TEXT_FIELD_LEN]);

impl TextField {
    /// lossy utf8 rendering without trailing padding. Only meant for display.
    pub fn trimmed(&self) -> String {
        String::from_utf8_lossy(&self.0)
            .trim_end_matches(|c: char| c == ' ' || c == '\0')
            .to_string()
    }
}

/// Whether a variable is stored once per node or once per node and level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// depth integrated, `flag_dm == 2`
    Two,
    /// layered, `flag_dm == 3`
    Three,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub data_format: TextField,
    pub version: TextField,
    pub start_time: TextField,
    pub var_type: TextField,
    pub var_dimension: TextField,
    /// timestep records per file
    pub nsteps: usize,
    pub dt: f32,
    pub skip: i32,
    /// number of components per value: 1 for scalars, 2 for vectors
    pub flag_sv: usize,
    pub dimension: Dimension,
    /// number of vertical levels
    pub nlevels: usize,
    /// number of fixed z levels
    pub kz: usize,
    pub h0: f32,
    pub hs: f32,
    pub hc: f32,
    pub theta_b: f32,
    pub theta: f32,
    pub zlevels: Vec<f32>,
    pub slevels: Vec<f32>,
}

impl Header {
    /// decode the header from the start of a file
    pub fn read<R: Read>(reader: &mut PreambleReader<R>) -> Result<Header, Error> {
        let data_format = TextField::new(reader.text("data_format")?);
        let version = TextField::new(reader.text("version")?);
        let start_time = TextField::new(reader.text("start_time")?);
        let var_type = TextField::new(reader.text("var_type")?);
        let var_dimension = TextField::new(reader.text("var_dimension")?);

        let nsteps = parse::count("nsteps", reader.int("nsteps")?)?;
        let dt = reader.float("dt")?;
        let skip = reader.int("skip")?;
        let flag_sv = match reader.int("flag_sv")? {
            value @ (1 | 2) => value as usize,
            other => {
                let reason = format!("expected 1 (scalar) or 2 (vector), got {other}");
                return Err(error::MalformedHeader::new("flag_sv", reason).into());
            }
        };
        let dimension = match reader.int("flag_dm")? {
            2 => Dimension::Two,
            3 => Dimension::Three,
            other => {
                let reason = format!("expected 2 or 3, got {other}");
                return Err(error::MalformedHeader::new("flag_dm", reason).into());
            }
        };

        // vertical grid
        let nlevels = parse::count("nlevels", reader.int("nlevels")?)?;
        let kz = parse::count("kz", reader.int("kz")?)?;
        if kz > nlevels {
            let reason = format!("{kz} z levels exceed the {nlevels} total levels");
            return Err(error::MalformedHeader::new("kz", reason).into());
        }

        let h0 = reader.float("h0")?;
        let hs = reader.float("hs")?;
        let hc = reader.float("hc")?;
        let theta_b = reader.float("theta_b")?;
        let theta = reader.float("theta")?;
        let zlevels = reader.floats("zlevels", kz)?;
        let slevels = reader.floats("slevels", nlevels - kz)?;

        let header = Header {
            data_format,
            version,
            start_time,
            var_type,
            var_dimension,
            nsteps,
            dt,
            skip,
            flag_sv,
            dimension,
            nlevels,
            kz,
            h0,
            hs,
            hc,
            theta_b,
            theta,
            zlevels,
            slevels,
        };

        debug!(
            format = %header.data_format.trimmed(),
            variable = %header.var_type.trimmed(),
            nsteps = header.nsteps,
            nlevels = header.nlevels,
            flag_sv = header.flag_sv,
            dimension = ?header.dimension,
            "decoded header"
        );

        Ok(header)
    }

    pub fn is_3d(&self) -> bool {
        self.dimension == Dimension::Three
    }

    /// number of levels stored per node in a record: 1 for depth integrated files
    pub fn effective_levels(&self) -> usize {
        match self.dimension {
            Dimension::Two => 1,
            Dimension::Three => self.nlevels,
        }
    }
}
