// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read netCDF file {path:?}: {message}")]
    Netcdf { path: PathBuf, message: String },

    #[error("Dimension `{0}` not found in file")]
    MissingDimension(String),

    #[error("Variable `{0}` not found in file")]
    MissingVariable(String),

    #[error("Variable `{name}` has {found} values, expected {expected}")]
    Shape {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Alchemical mixing is not supported, num_pseudos ({npsp}) != ntypat ({ntypat})")]
    AlchemicalMixing { npsp: usize, ntypat: usize },

    #[error("Cannot overwrite pre-existing file {0:?}")]
    FileExists(PathBuf),

    #[error("Invalid atomic number {0}")]
    UnknownElement(f64),

    #[error("Invalid atom type {typat} (number of types: {ntypat})")]
    InvalidType { typat: f64, ntypat: usize },

    #[error("Invalid value for what: `{0}`")]
    InvalidQuantity(String),

    #[error("Trajectory is empty")]
    EmptyTrajectory,

    #[error("Plotting failed: {0}")]
    Plot(String),

    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Unsupported figure format `{0}` (use png, pdf or svg)")]
    FigureFormat(String),

    #[error("Malformed XDATCAR at line {line}: {message}")]
    Xdatcar { line: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Robot is empty")]
    EmptyRobot,

    #[error("Label `{0}` is already in the robot")]
    DuplicateLabel(String),
}

pub type Result<T> = std::result::Result<T, HistError>;
