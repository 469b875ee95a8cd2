// src/hist/file.rs

use log::{debug, info};
use std::cell::OnceCell;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::reader::{build_structures, species_from_types};
use super::{EnergyTerms, HistReader};
use crate::config::PlotStyle;
use crate::error::{HistError, Result};
use crate::io::netcdf::{NcFile, VarSource};
use crate::io::notebook::{py_str, Notebook};
use crate::io::xdatcar::Xdatcar;
use crate::model::Structure;
use crate::physics::forces::{force_stats_per_step, ForceStats};
use crate::physics::relaxation::RelaxationAnalyzer;
use crate::physics::stress::{format_tensor, StressTensor};
use crate::rendering;
use crate::units::{EnergyUnit, ForceUnit};
use crate::utils::linalg;
use crate::utils::report::{filestat, marquee};

/// History of a structural relaxation or molecular dynamics run.
///
/// The arrays are read when the file is opened and the file is closed right
/// after. Structures are assembled on first use and cached, so a file mixing
/// pseudopotentials still gives access to energies, stresses and forces.
#[derive(Debug, Clone)]
pub struct HistFile {
    path: PathBuf,
    natom: usize,
    npsp: usize,
    ntypat: usize,
    typat: Vec<f64>,
    znucl: Vec<f64>,
    lattices: Vec<[[f64; 3]; 3]>,
    reduced_coords: Vec<Vec<[f64; 3]>>,
    structures: OnceCell<Vec<Structure>>,
    eterms: EnergyTerms,
    cart_forces: Vec<Vec<[f64; 3]>>,
    reduced_forces: Option<Vec<Vec<[f64; 3]>>>,
    cart_coords: Vec<Vec<[f64; 3]>>,
    stress_tensors: Vec<StressTensor>,
    pressures: Vec<f64>,
}

impl HistFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_source(NcFile::open(path)?)
    }

    pub fn from_source<S: VarSource>(source: S) -> Result<Self> {
        let mut reader = HistReader::new(source)?;
        if reader.num_steps() == 0 {
            return Err(HistError::EmptyTrajectory);
        }

        let lattices = reader.read_lattices()?;
        let reduced_coords = reader.read_reduced_coords()?;
        let eterms = reader.read_eterms(EnergyUnit::Ev)?;
        let cart_forces = reader.read_cart_forces(ForceUnit::EvPerAng)?;
        let (stress_tensors, pressures) = reader.read_cart_stress_tensors()?;

        let reduced_forces = if reader.has_value("fred") {
            Some(reader.read_reduced_forces()?)
        } else {
            None
        };
        let cart_coords = if reader.has_value("xcart") {
            reader.read_cart_coords()?
        } else {
            lattices
                .iter()
                .zip(&reduced_coords)
                .map(|(lattice, frac)| frac.iter().map(|&x| linalg::frac_to_cart(x, lattice)).collect())
                .collect()
        };

        let hist = Self {
            path: reader.path().to_path_buf(),
            natom: reader.natom(),
            npsp: reader.read_dimvalue("npsp")?,
            ntypat: reader.read_dimvalue("ntypat")?,
            typat: reader.read_value("typat")?,
            znucl: reader.read_value("znucl")?,
            lattices,
            reduced_coords,
            structures: OnceCell::new(),
            eterms,
            cart_forces,
            reduced_forces,
            cart_coords,
            stress_tensors,
            pressures,
        };
        info!("Loaded {:?} ({} steps)", hist.path, hist.num_steps());
        Ok(hist)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the working directory when possible.
    pub fn relpath(&self) -> String {
        std::env::current_dir()
            .ok()
            .and_then(|cwd| self.path.strip_prefix(cwd).ok().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| self.path.clone())
            .display()
            .to_string()
    }

    /// Number of iterations performed.
    pub fn num_steps(&self) -> usize {
        self.lattices.len()
    }

    pub fn natom(&self) -> usize {
        self.natom
    }

    /// Step indices.
    pub fn steps(&self) -> Vec<usize> {
        (0..self.num_steps()).collect()
    }

    /// Lattice vectors in Angstrom for every step.
    pub fn lattices(&self) -> &[[[f64; 3]; 3]] {
        &self.lattices
    }

    fn check_no_alchemy(&self) -> Result<()> {
        if self.npsp != self.ntypat {
            return Err(HistError::AlchemicalMixing {
                npsp: self.npsp,
                ntypat: self.ntypat,
            });
        }
        Ok(())
    }

    /// The structures at the different iteration steps, built on first call.
    ///
    /// Alchemical mixing (`npsp != ntypat`) is not supported.
    pub fn structures(&self) -> Result<&[Structure]> {
        if let Some(structures) = self.structures.get() {
            return Ok(structures.as_slice());
        }
        self.check_no_alchemy()?;
        let species = species_from_types(&self.typat, &self.znucl, self.natom)?;
        let built = build_structures(&self.lattices, &self.reduced_coords, &species, &self.cart_forces);
        Ok(self.structures.get_or_init(|| built).as_slice())
    }

    pub fn initial_structure(&self) -> Result<&Structure> {
        Ok(&self.structures()?[0])
    }

    pub fn final_structure(&self) -> Result<&Structure> {
        let structures = self.structures()?;
        Ok(&structures[structures.len() - 1])
    }

    /// All energy terms in eV.
    pub fn eterms(&self) -> &EnergyTerms {
        &self.eterms
    }

    /// Total energies in eV.
    pub fn etotals(&self) -> &[f64] {
        &self.eterms.etotals
    }

    pub fn final_energy(&self) -> f64 {
        self.eterms.etotals[self.eterms.etotals.len() - 1]
    }

    /// Stress tensors in Ha/Bohr^3.
    pub fn stress_tensors(&self) -> &[StressTensor] {
        &self.stress_tensors
    }

    /// Pressures in GPa.
    pub fn pressures(&self) -> &[f64] {
        &self.pressures
    }

    /// Final pressure in GPa.
    pub fn final_pressure(&self) -> f64 {
        self.pressures[self.pressures.len() - 1]
    }

    /// Cartesian forces in eV/Ang, (num_steps, natom, 3).
    pub fn cart_forces(&self) -> &[Vec<[f64; 3]>] {
        &self.cart_forces
    }

    pub fn reduced_forces(&self) -> Option<&[Vec<[f64; 3]>]> {
        self.reduced_forces.as_deref()
    }

    /// Cartesian coordinates in Angstrom, (num_steps, natom, 3).
    pub fn cart_coords(&self) -> &[Vec<[f64; 3]>] {
        &self.cart_coords
    }

    pub fn force_stats(&self) -> Vec<ForceStats> {
        force_stats_per_step(&self.cart_forces)
    }

    pub fn final_force_stats(&self) -> ForceStats {
        ForceStats::from_forces(&self.cart_forces[self.cart_forces.len() - 1])
    }

    pub fn relaxation_analyzer(&self) -> Result<RelaxationAnalyzer<'_>> {
        Ok(RelaxationAnalyzer::new(
            self.initial_structure()?,
            self.final_structure()?,
        ))
    }

    pub fn to_report(&self, verbose: u8, title: Option<&str>) -> Result<String> {
        let mut lines: Vec<String> = Vec::new();
        if let Some(title) = title {
            lines.push(marquee(title, '='));
        }

        lines.push(marquee("File Info", '='));
        lines.push(filestat(&self.path));
        lines.push(String::new());
        lines.push(self.initial_structure()?.to_report(verbose, Some("Initial Structure")));
        lines.push(String::new());
        lines.push(format!("Number of relaxation steps performed: {}", self.num_steps()));
        lines.push(self.final_structure()?.to_report(verbose, Some("Final structure")));
        lines.push(String::new());

        let an = self.relaxation_analyzer()?;
        lines.push(format!(
            "Volume change in percentage: {:.2}%",
            an.percentage_volume_change() * 100.0
        ));
        let d = an.percentage_lattice_parameter_changes();
        lines.push(format!(
            "Percentage lattice parameter changes:\n\ta: {:.2}%, b: {:.2}%, c: {:.2}%",
            d.a * 100.0,
            d.b * 100.0,
            d.c * 100.0
        ));
        lines.push(String::new());

        let last = self.stress_tensors.len() - 1;
        lines.push(format!(
            "Stress tensor (Cartesian coordinates in Ha/Bohr**3):\n{}",
            format_tensor(&self.stress_tensors[last])
        ));
        lines.push(format!("Pressure: {:.3} [GPa]", self.final_pressure()));

        Ok(lines.join("\n"))
    }

    /// The trajectory in XDATCAR form, without touching the disk.
    ///
    /// With `groupby_type` atoms are regrouped by species (first-appearance
    /// order), which may change the atom order.
    pub fn xdatcar(&self, groupby_type: bool) -> Result<Xdatcar> {
        let structures = self.structures()?;
        let initial = &structures[0];
        let symbols: Vec<&str> = initial.atoms.iter().map(|a| a.element.as_str()).collect();

        let (species, counts, group_ids) = if groupby_type {
            let order = initial.species_order();
            let mut ids = Vec::with_capacity(symbols.len());
            let mut counts = Vec::with_capacity(order.len());
            for symbol in &order {
                let members: Vec<usize> = symbols
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| **s == symbol.as_str())
                    .map(|(i, _)| i)
                    .collect();
                counts.push(members.len());
                ids.extend(members);
            }
            (order, counts, ids)
        } else {
            (
                symbols.iter().map(|s| s.to_string()).collect(),
                vec![1; symbols.len()],
                (0..symbols.len()).collect(),
            )
        };

        let configurations = structures
            .iter()
            .map(|s| group_ids.iter().map(|&i| s.atoms[i].frac_coords).collect())
            .collect();

        Ok(Xdatcar {
            comment: initial.formula(),
            scale: 1.0,
            lattice: initial.lattice,
            species,
            counts,
            configurations,
        })
    }

    /// Writes the trajectory to `filepath` in XDATCAR format.
    ///
    /// `None` writes to a fresh temporary file. An existing file is only
    /// replaced when `overwrite` is set. Returns the path written.
    pub fn write_xdatcar(
        &self,
        filepath: Option<&Path>,
        groupby_type: bool,
        overwrite: bool,
    ) -> Result<PathBuf> {
        let xdatcar = self.xdatcar(groupby_type)?;

        let (file, path) = match filepath {
            Some(p) if overwrite => (File::create(p)?, p.to_path_buf()),
            Some(p) => {
                let file = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(p)
                    .map_err(|e| match e.kind() {
                        io::ErrorKind::AlreadyExists => HistError::FileExists(p.to_path_buf()),
                        _ => HistError::Io(e),
                    })?;
                (file, p.to_path_buf())
            }
            None => {
                let tmp = tempfile::Builder::new().prefix("XDATCAR_").tempfile()?;
                tmp.keep().map_err(|e| e.error)?
            }
        };

        let mut out = BufWriter::new(file);
        xdatcar.write(&mut out)?;
        out.flush()?;
        debug!("XDATCAR with {} frames written to {:?}", xdatcar.configurations.len(), path);
        Ok(path)
    }

    /// Writes the XDATCAR (replacing any existing file) and reads it back.
    pub fn to_xdatcar(&self, filepath: Option<&Path>, groupby_type: bool) -> Result<Xdatcar> {
        let path = self.write_xdatcar(filepath, groupby_type, true)?;
        Xdatcar::from_file(path)
    }

    pub fn write_notebook(&self, nbpath: Option<&Path>) -> Result<PathBuf> {
        let mut nb = Notebook::with_header(None);
        nb.push_code(&format!(
            "hist = abilab.abiopen({})",
            py_str(&self.path.display().to_string())
        ));
        nb.push_code("print(hist)");
        nb.push_code("hist.plot_energies();");
        nb.push_code("hist.plot();");
        nb.write(nbpath)
    }

    /// Lattice, volume, pressure, forces and energy vs step in one figure.
    pub fn plot(&self, path: &Path, style: &PlotStyle) -> Result<()> {
        rendering::plot(self, path, style)
    }

    pub fn plot_energies(&self, path: &Path, style: &PlotStyle) -> Result<()> {
        rendering::plot_energies(self, path, style)
    }
}

impl fmt::Display for HistFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_report(0, None) {
            Ok(text) => f.write_str(&text),
            Err(e) => write!(f, "{}: {}", self.path.display(), e),
        }
    }
}
