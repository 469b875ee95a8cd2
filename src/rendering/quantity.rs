// src/rendering/quantity.rs

use std::fmt;
use std::str::FromStr;

use crate::error::HistError;
use crate::hist::HistFile;
use crate::utils::linalg;

/// Quantities that can be plotted as a function of the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Energy,
    Abc,
    Angles,
    Volume,
    Pressure,
    Forces,
}

impl Quantity {
    pub const ALL: [Quantity; 6] = [
        Quantity::Energy,
        Quantity::Abc,
        Quantity::Angles,
        Quantity::Volume,
        Quantity::Pressure,
        Quantity::Forces,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Quantity::Energy => "energy",
            Quantity::Abc => "abc",
            Quantity::Angles => "angles",
            Quantity::Volume => "volume",
            Quantity::Pressure => "pressure",
            Quantity::Forces => "forces",
        }
    }

    pub fn ylabel(self) -> &'static str {
        match self {
            Quantity::Energy => "Total energy [eV]",
            Quantity::Abc => "Lattice lengths [A]",
            Quantity::Angles => "Lattice Angles [degree]",
            Quantity::Volume => "Lattice volume [A^3]",
            Quantity::Pressure => "Pressure [GPa]",
            Quantity::Forces => "Force stats [eV/A]",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quantity {
    type Err = HistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::ALL
            .iter()
            .copied()
            .find(|q| q.name() == s)
            .ok_or_else(|| HistError::InvalidQuantity(s.to_string()))
    }
}

/// A labelled (step, value) curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(label: &str, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            label: label.to_string(),
            points: values
                .into_iter()
                .enumerate()
                .map(|(step, y)| (step as f64, y))
                .collect(),
        }
    }
}

/// The curves drawn for `what`. Cell quantities come from the lattices alone.
pub fn quantity_series(hist: &HistFile, what: Quantity) -> Vec<Series> {
    let lattices = hist.lattices();
    match what {
        Quantity::Energy => vec![Series::new("Energy", hist.etotals().iter().copied())],
        Quantity::Abc => ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, label)| Series::new(label, lattices.iter().map(|l| linalg::lattice_abc(l)[i])))
            .collect(),
        Quantity::Angles => ["alpha", "beta", "gamma"]
            .iter()
            .enumerate()
            .map(|(i, label)| {
                Series::new(label, lattices.iter().map(|l| linalg::lattice_angles(l)[i]))
            })
            .collect(),
        Quantity::Volume => vec![Series::new("Volume", lattices.iter().map(linalg::cell_volume))],
        Quantity::Pressure => vec![Series::new("Pressure", hist.pressures().iter().copied())],
        Quantity::Forces => {
            let stats = hist.force_stats();
            vec![
                Series::new("min |F|", stats.iter().map(|s| s.min)),
                Series::new("max |F|", stats.iter().map(|s| s.max)),
                Series::new("mean |F|", stats.iter().map(|s| s.mean)),
                Series::new("std |F|", stats.iter().map(|s| s.std)),
            ]
        }
    }
}

/// Energy terms that are not identically zero.
pub fn energy_series(hist: &HistFile) -> Vec<Series> {
    hist.eterms()
        .items()
        .iter()
        .filter(|(_, values)| values.iter().any(|&v| v != 0.0))
        .map(|(name, values)| Series::new(name, values.iter().copied()))
        .collect()
}
