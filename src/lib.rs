//! Reader, exporter and plotter for ABINIT HIST files (structural relaxation and
//! molecular dynamics trajectories stored in netCDF).

pub mod config;
pub mod error;
pub mod hist;
pub mod io;
pub mod model;
pub mod physics;
pub mod rendering;
pub mod robot;
pub mod units;
pub mod utils;

pub use config::Config;
pub use error::{HistError, Result};
pub use hist::{HistFile, HistReader};
pub use model::Structure;
pub use rendering::Quantity;
pub use robot::HistRobot;
