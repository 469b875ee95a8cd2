// src/io/netcdf.rs

use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{HistError, Result};

/// Named dimensions and variables of a scientific data file.
///
/// Variables are returned flattened in row-major order and widened to f64.
pub trait VarSource {
    fn path(&self) -> &Path;
    fn dim_len(&self, name: &str) -> Result<usize>;
    fn has_var(&self, name: &str) -> bool;
    fn read_f64(&mut self, name: &str) -> Result<Vec<f64>>;
}

/// A netCDF file (classic or netCDF-4) opened for reading.
pub struct NcFile {
    path: PathBuf,
    file: netcdf::File,
}

impl NcFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path).map_err(|e| HistError::Netcdf {
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!("Opened netCDF file {:?}", path);
        Ok(Self { path, file })
    }
}

impl VarSource for NcFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn dim_len(&self, name: &str) -> Result<usize> {
        self.file
            .dimension(name)
            .map(|dim| dim.len())
            .ok_or_else(|| HistError::MissingDimension(name.to_string()))
    }

    fn has_var(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Integer variables are converted by the netCDF library.
    fn read_f64(&mut self, name: &str) -> Result<Vec<f64>> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| HistError::MissingVariable(name.to_string()))?;
        var.get_values::<f64, _>(..).map_err(|e| HistError::Netcdf {
            path: self.path.clone(),
            message: format!("variable `{}`: {}", name, e),
        })
    }
}

/// In-memory dimensions and variables, same contract as `NcFile`.
#[derive(Debug, Clone, Default)]
pub struct MemSource {
    path: PathBuf,
    dims: HashMap<String, usize>,
    vars: HashMap<String, Vec<f64>>,
}

impl MemSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn dim(mut self, name: &str, len: usize) -> Self {
        self.dims.insert(name.to_string(), len);
        self
    }

    pub fn var(mut self, name: &str, values: Vec<f64>) -> Self {
        self.vars.insert(name.to_string(), values);
        self
    }
}

impl VarSource for MemSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn dim_len(&self, name: &str) -> Result<usize> {
        self.dims
            .get(name)
            .copied()
            .ok_or_else(|| HistError::MissingDimension(name.to_string()))
    }

    fn has_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    fn read_f64(&mut self, name: &str) -> Result<Vec<f64>> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| HistError::MissingVariable(name.to_string()))
    }
}
