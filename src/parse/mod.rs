//! low level decoding of the fixed layout file preamble
//!
//! Every field of a SELFE binary file is either a 48 byte text block or a 4 byte
//! native-endian `int` / `float`. Fields are read strictly in the order they are
//! declared; nothing is skipped and nothing is reordered. Running out of bytes
//! in the preamble is reported as [`TruncatedHeader`](error::TruncatedHeader)
//! with the name of the field that could not be filled.

pub mod error;

use crate::prelude::*;

use byteorder::{ByteOrder, NativeEndian};

/// width in bytes of every text descriptor in the header
pub const TEXT_FIELD_LEN: usize = 48;

/// width in bytes of every numeric field (`int` and `float`)
pub const SCALAR_LEN: usize = 4;

/// A reader over the file preamble that keeps track of how many bytes have been
/// consumed, so the start of the timestep records can be recorded without
/// requiring `Seek` on the underlying stream.
pub struct PreambleReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> PreambleReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    /// number of bytes read so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// read exactly `length` raw bytes for the named field
    ///
    /// `length` usually comes from a header count, so the buffer only grows with
    /// the bytes that are actually present
    pub fn raw(&mut self, field: &'static str, length: usize) -> Result<Vec<u8>, Error> {
        let mut buffer = Vec::new();
        (&mut self.inner)
            .take(length as u64)
            .read_to_end(&mut buffer)?;

        if buffer.len() < length {
            return Err(error::TruncatedHeader::new(field, self.consumed, length).into());
        }

        self.consumed += length as u64;
        Ok(buffer)
    }

    /// read one fixed width text descriptor. No trimming is done here.
    pub fn text(&mut self, field: &'static str) -> Result<[u8; TEXT_FIELD_LEN], Error> {
        let mut buffer = [0; TEXT_FIELD_LEN];
        self.fill(field, &mut buffer)?;
        Ok(buffer)
    }

    pub fn int(&mut self, field: &'static str) -> Result<i32, Error> {
        let mut buffer = [0; SCALAR_LEN];
        self.fill(field, &mut buffer)?;
        Ok(NativeEndian::read_i32(&buffer))
    }

    pub fn float(&mut self, field: &'static str) -> Result<f32, Error> {
        let mut buffer = [0; SCALAR_LEN];
        self.fill(field, &mut buffer)?;
        Ok(NativeEndian::read_f32(&buffer))
    }

    /// read a table of `count` floats
    pub fn floats(&mut self, field: &'static str, count: usize) -> Result<Vec<f32>, Error> {
        let bytes = self.raw(field, count * SCALAR_LEN)?;
        Ok(float_view(&bytes))
    }

    /// read a table of `count` ints
    pub fn ints(&mut self, field: &'static str, count: usize) -> Result<Vec<i32>, Error> {
        let bytes = self.raw(field, count * SCALAR_LEN)?;
        Ok(int_view(&bytes))
    }

    fn fill(&mut self, field: &'static str, buffer: &mut [u8]) -> Result<(), Error> {
        match self.inner.read_exact(buffer) {
            Ok(()) => {
                self.consumed += buffer.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(error::TruncatedHeader::new(field, self.consumed, buffer.len()).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// interpret a raw byte region as native-endian `f32` values
///
/// trailing bytes that do not fill a whole value are ignored
pub fn float_view(bytes: &[u8]) -> Vec<f32> {
    let mut out = vec![0.; bytes.len() / SCALAR_LEN];
    NativeEndian::read_f32_into(&bytes[..out.len() * SCALAR_LEN], &mut out);
    out
}

/// interpret a raw byte region as native-endian `i32` values
///
/// trailing bytes that do not fill a whole value are ignored
pub fn int_view(bytes: &[u8]) -> Vec<i32> {
    let mut out = vec![0; bytes.len() / SCALAR_LEN];
    NativeEndian::read_i32_into(&bytes[..out.len() * SCALAR_LEN], &mut out);
    out
}

/// convert a decoded count into a `usize`, rejecting negative values
pub(crate) fn count(field: &'static str, value: i32) -> Result<usize, Error> {
    usize::try_from(value).map_err(|_| {
        error::MalformedHeader::new(field, format!("expected a non-negative count, got {value}"))
            .into()
    })
}
