//! Writers for small synthetic SELFE runs. Every stored value is a known function
//! of its file, timestep, node, level and component so tests can check exact
//! positions after slicing.
#![allow(dead_code)]

use byteorder::{NativeEndian, WriteBytesExt};

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const TEXT_LEN: usize = 48;
pub const DT: f32 = 90.;

#[derive(Debug, Clone)]
pub struct Run {
    pub nsteps: usize,
    pub flag_sv: usize,
    pub flag_dm: i32,
    pub nlevels: usize,
    /// `[x, y, depth]`
    pub nodes: Vec<[f32; 3]>,
    /// raw bottom index as written to the file
    pub bottom: Vec<i32>,
    /// 1-based connectivity
    pub elements: Vec<[i32; 3]>,
}

impl Run {
    /// one triangle, three nodes, one timestep, scalar depth integrated variable
    pub fn minimal() -> Run {
        Run {
            nsteps: 1,
            flag_sv: 1,
            flag_dm: 2,
            nlevels: 1,
            nodes: vec![[0., 0., 4.], [3., 0., 5.], [0., 3., 6.]],
            bottom: vec![1, 1, 1],
            elements: vec![[1, 2, 3]],
        }
    }

    /// A 10 x 10 square split into two triangles with four levels and a vector
    /// variable. Node 2 is dry in its two upper levels.
    pub fn layered() -> Run {
        Run {
            nsteps: 3,
            flag_sv: 2,
            flag_dm: 3,
            nlevels: 4,
            nodes: vec![
                [0., 0., 20.],
                [10., 0., 21.],
                [10., 10., 22.],
                [0., 10., 23.],
            ],
            bottom: vec![1, 0, 3, 1],
            elements: vec![[1, 2, 3], [1, 3, 4]],
        }
    }

    /// the layered run with a scalar variable
    pub fn layered_scalar() -> Run {
        Run {
            flag_sv: 1,
            ..Run::layered()
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// levels stored per node after decoding
    pub fn levels(&self) -> usize {
        if self.flag_dm == 3 {
            self.nlevels
        } else {
            1
        }
    }

    /// 0-based first wet level of a node
    pub fn first_level(&self, node: usize) -> usize {
        if self.flag_dm == 3 {
            (self.bottom[node].max(1) - 1) as usize
        } else {
            0
        }
    }

    pub fn time(&self, file: usize, step: usize) -> f32 {
        self.iteration(file, step) as f32 * DT
    }

    pub fn iteration(&self, file: usize, step: usize) -> i32 {
        ((file - 1) * self.nsteps + step + 1) as i32
    }

    pub fn write_preamble<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for label in ["DataFormat v5.0", "v5.0", "2010-01-01 00:00", "salt", "3D"] {
            let mut text = label.as_bytes().to_vec();
            text.resize(TEXT_LEN, b' ');
            out.write_all(&text)?;
        }

        out.write_i32::<NativeEndian>(self.nsteps as i32)?;
        out.write_f32::<NativeEndian>(DT)?;
        out.write_i32::<NativeEndian>(1)?;
        out.write_i32::<NativeEndian>(self.flag_sv as i32)?;
        out.write_i32::<NativeEndian>(self.flag_dm)?;
        out.write_i32::<NativeEndian>(self.nlevels as i32)?;
        // kz
        out.write_i32::<NativeEndian>(0)?;
        for value in [-10., 20., 5., 0.5, 10.] {
            out.write_f32::<NativeEndian>(value)?;
        }
        for k in 0..self.nlevels {
            out.write_f32::<NativeEndian>(-1. + k as f32 / self.nlevels as f32)?;
        }

        out.write_i32::<NativeEndian>(self.nodes.len() as i32)?;
        out.write_i32::<NativeEndian>(self.elements.len() as i32)?;
        for ([x, y, depth], bottom) in self.nodes.iter().zip(&self.bottom) {
            out.write_f32::<NativeEndian>(*x)?;
            out.write_f32::<NativeEndian>(*y)?;
            out.write_f32::<NativeEndian>(*depth)?;
            out.write_i32::<NativeEndian>(*bottom)?;
        }
        for element in &self.elements {
            out.write_i32::<NativeEndian>(3)?;
            for node in element {
                out.write_i32::<NativeEndian>(*node)?;
            }
        }

        Ok(())
    }

    /// write the first `steps` records of `file`
    pub fn write_records<W: Write>(&self, out: &mut W, file: usize, steps: usize) -> io::Result<()> {
        for step in 0..steps {
            out.write_f32::<NativeEndian>(self.time(file, step))?;
            out.write_i32::<NativeEndian>(self.iteration(file, step))?;

            for node in 0..self.node_count() {
                out.write_f32::<NativeEndian>(eta(file, step, node))?;
            }

            for node in 0..self.node_count() {
                for level in self.first_level(node)..self.levels() {
                    for component in 0..self.flag_sv {
                        out.write_f32::<NativeEndian>(value(file, step, node, level, component))?;
                    }
                }
            }
        }

        Ok(())
    }

    /// write a complete file of the sequence
    pub fn write_file(&self, path: &Path, file: usize) -> io::Result<()> {
        self.write_partial_file(path, file, self.nsteps)
    }

    /// write a file that ends after `steps` records
    pub fn write_partial_file(&self, path: &Path, file: usize, steps: usize) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_preamble(&mut out)?;
        self.write_records(&mut out, file, steps)?;
        out.flush()
    }

    /// write `{index}_{variable}` for every index in `files`, returning the first path
    pub fn write_series(&self, dir: &Path, variable: &str, files: &[usize]) -> io::Result<PathBuf> {
        for file in files {
            self.write_file(&series_path(dir, *file, variable), *file)?;
        }
        Ok(series_path(dir, files[0], variable))
    }
}

pub fn series_path(dir: &Path, file: usize, variable: &str) -> PathBuf {
    dir.join(format!("{file}_{variable}"))
}

pub fn eta(file: usize, step: usize, node: usize) -> f32 {
    file as f32 + step as f32 * 0.25 + node as f32 * 0.125
}

pub fn value(file: usize, step: usize, node: usize, level: usize, component: usize) -> f32 {
    (file * 10_000 + step * 1_000 + node * 10 + level) as f32 + component as f32 * 0.5
}

/// equality that treats two NaN as equal
pub fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}
