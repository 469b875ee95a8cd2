// src/hist/reader.rs

use log::debug;
use std::path::Path;

use super::EnergyTerms;
use crate::error::{HistError, Result};
use crate::io::netcdf::{NcFile, VarSource};
use crate::model::elements::symbol_from_znucl;
use crate::model::Structure;
use crate::physics::stress::{self, StressTensor};
use crate::units::{bohr_to_ang, EnergyUnit, ForceUnit, BOHR_TO_ANG};

/// Reads the arrays stored in a HIST file.
pub struct HistReader<S: VarSource = NcFile> {
    source: S,
    num_steps: usize,
    natom: usize,
}

impl HistReader<NcFile> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(NcFile::open(path)?)
    }
}

impl<S: VarSource> HistReader<S> {
    pub fn new(source: S) -> Result<Self> {
        let num_steps = source.dim_len("time")?;
        let natom = source.dim_len("natom")?;
        debug!(
            "HIST {:?}: {} steps, {} atoms",
            source.path(),
            num_steps,
            natom
        );
        Ok(Self {
            source,
            num_steps,
            natom,
        })
    }

    pub fn path(&self) -> &Path {
        self.source.path()
    }

    /// Number of iterations present in the file.
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Number of atoms in the unit cell.
    pub fn natom(&self) -> usize {
        self.natom
    }

    pub fn read_dimvalue(&self, name: &str) -> Result<usize> {
        self.source.dim_len(name)
    }

    pub fn read_value(&mut self, name: &str) -> Result<Vec<f64>> {
        self.source.read_f64(name)
    }

    /// Reads a per-step variable and checks it holds `num_steps * per_step` values.
    fn read_steps(&mut self, name: &str, per_step: usize) -> Result<Vec<f64>> {
        let values = self.source.read_f64(name)?;
        let expected = self.num_steps * per_step;
        if values.len() != expected {
            return Err(HistError::Shape {
                name: name.to_string(),
                expected,
                found: values.len(),
            });
        }
        Ok(values)
    }

    /// (nstep, natom, 3) variable as one Vec of triplets per step.
    fn read_atom_triplets(&mut self, name: &str, factor: f64) -> Result<Vec<Vec<[f64; 3]>>> {
        let natom = self.natom;
        let flat = self.read_steps(name, natom * 3)?;
        if natom == 0 {
            return Ok(vec![Vec::new(); self.num_steps]);
        }
        Ok(flat
            .chunks_exact(natom * 3)
            .map(|step| {
                step.chunks_exact(3)
                    .map(|v| [v[0] * factor, v[1] * factor, v[2] * factor])
                    .collect()
            })
            .collect())
    }

    /// Fails unless every atom type has its own pseudopotential.
    pub fn check_no_alchemy(&self) -> Result<()> {
        let npsp = self.source.dim_len("npsp")?;
        let ntypat = self.source.dim_len("ntypat")?;
        if npsp != ntypat {
            return Err(HistError::AlchemicalMixing { npsp, ntypat });
        }
        Ok(())
    }

    /// Element symbol of each atom, from `typat` (1-based) and `znucl`.
    pub fn read_species(&mut self) -> Result<Vec<String>> {
        self.check_no_alchemy()?;
        let znucl = self.source.read_f64("znucl")?;
        let typat = self.source.read_f64("typat")?;
        species_from_types(&typat, &znucl, self.natom)
    }

    /// Lattice vectors in Angstrom for every step.
    pub fn read_lattices(&mut self) -> Result<Vec<[[f64; 3]; 3]>> {
        let mut rprimd = self.read_steps("rprimd", 9)?;
        bohr_to_ang(&mut rprimd);
        Ok(rprimd
            .chunks_exact(9)
            .map(|m| [[m[0], m[1], m[2]], [m[3], m[4], m[5]], [m[6], m[7], m[8]]])
            .collect())
    }

    /// Reduced coordinates, shape (num_steps, natom, 3).
    pub fn read_reduced_coords(&mut self) -> Result<Vec<Vec<[f64; 3]>>> {
        self.read_atom_triplets("xred", 1.0)
    }

    /// Cartesian coordinates in Angstrom, shape (num_steps, natom, 3).
    pub fn read_cart_coords(&mut self) -> Result<Vec<Vec<[f64; 3]>>> {
        self.read_atom_triplets("xcart", BOHR_TO_ANG)
    }

    /// The structures at the different iteration steps, forces attached in eV/Ang.
    pub fn read_all_structures(&mut self) -> Result<Vec<Structure>> {
        // Alchemical mixing is not supported.
        self.check_no_alchemy()?;

        let lattices = self.read_lattices()?;
        let xred = self.read_reduced_coords()?;
        let species = self.read_species()?;
        let forces = self.read_cart_forces(ForceUnit::EvPerAng)?;

        Ok(build_structures(&lattices, &xred, &species, &forces))
    }

    pub fn read_eterms(&mut self, unit: EnergyUnit) -> Result<EnergyTerms> {
        let k = unit.from_hartree();
        let mut read = |name: &str| -> Result<Vec<f64>> {
            Ok(self.read_steps(name, 1)?.into_iter().map(|e| e * k).collect())
        };
        Ok(EnergyTerms {
            unit,
            etotals: read("etotal")?,
            kinetic_terms: read("ekin")?,
            entropies: read("entropy")?,
        })
    }

    /// Cartesian forces in `unit`, shape (num_steps, natom, 3).
    pub fn read_cart_forces(&mut self, unit: ForceUnit) -> Result<Vec<Vec<[f64; 3]>>> {
        self.read_atom_triplets("fcart", unit.from_ha_bohr())
    }

    /// Forces in reduced coordinates, shape (num_steps, natom, 3).
    pub fn read_reduced_forces(&mut self) -> Result<Vec<Vec<[f64; 3]>>> {
        self.read_atom_triplets("fred", 1.0)
    }

    /// Cartesian stress tensors (Ha/Bohr^3) and pressures (GPa) for every step.
    pub fn read_cart_stress_tensors(&mut self) -> Result<(Vec<StressTensor>, Vec<f64>)> {
        let strten = self.read_steps("strten", 6)?;
        Ok(stress::tensors_and_pressures(&strten))
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.source.has_var(name)
    }
}

/// Maps the 1-based `typat` of each atom onto the symbol of its `znucl`.
pub fn species_from_types(typat: &[f64], znucl: &[f64], natom: usize) -> Result<Vec<String>> {
    if typat.len() != natom {
        return Err(HistError::Shape {
            name: "typat".to_string(),
            expected: natom,
            found: typat.len(),
        });
    }

    typat
        .iter()
        .map(|&t| {
            let itype = t.round() as i64 - 1;
            if itype < 0 || itype as usize >= znucl.len() {
                return Err(HistError::InvalidType {
                    typat: t,
                    ntypat: znucl.len(),
                });
            }
            let z = znucl[itype as usize];
            symbol_from_znucl(z)
                .map(String::from)
                .ok_or(HistError::UnknownElement(z))
        })
        .collect()
}

/// One structure per step with the cartesian forces attached.
pub fn build_structures(
    lattices: &[[[f64; 3]; 3]],
    xred: &[Vec<[f64; 3]>],
    species: &[String],
    forces: &[Vec<[f64; 3]>],
) -> Vec<Structure> {
    let structures: Vec<Structure> = lattices
        .iter()
        .zip(xred)
        .zip(forces)
        .map(|((lattice, frac), f)| Structure::from_reduced(*lattice, species, frac).with_forces(f))
        .collect();
    debug!("Reconstructed {} structures", structures.len());
    structures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hist::testdata::relax_source;
    use crate::io::netcdf::MemSource;
    use crate::units::HA_TO_EV;

    #[test]
    fn test_dimensions() {
        let reader = HistReader::new(relax_source(4)).unwrap();
        assert_eq!(reader.num_steps(), 4);
        assert_eq!(reader.natom(), 3);
    }

    #[test]
    fn test_one_structure_per_step() {
        for n in [1, 2, 5] {
            let mut reader = HistReader::new(relax_source(n)).unwrap();
            let structures = reader.read_all_structures().unwrap();
            assert_eq!(structures.len(), n);
        }
    }

    #[test]
    fn test_structure_content() {
        let mut reader = HistReader::new(relax_source(2)).unwrap();
        let structures = reader.read_all_structures().unwrap();
        let s = &structures[1];

        let a = 10.1 * BOHR_TO_ANG;
        assert!((s.lattice[0][0] - a).abs() < 1e-12);
        assert_eq!(s.atoms[0].element, "O");
        assert_eq!(s.atoms[1].element, "Si");
        assert_eq!(s.atoms[2].element, "O");
        assert!((s.atoms[1].position[0] - 0.26 * a).abs() < 1e-12);

        let f = ForceUnit::EvPerAng.from_ha_bohr();
        assert!((s.atoms[0].force[0] - 0.005 * f).abs() < 1e-12);
    }

    #[test]
    fn test_alchemical_mixing_rejected() {
        let src = relax_source(2).dim("npsp", 3);
        let mut reader = HistReader::new(src).unwrap();
        let err = reader.read_all_structures().unwrap_err();
        assert!(matches!(err, HistError::AlchemicalMixing { npsp: 3, ntypat: 2 }));
        assert!(matches!(
            reader.read_species(),
            Err(HistError::AlchemicalMixing { .. })
        ));
    }

    #[test]
    fn test_inconsistent_step_count() {
        let src = relax_source(3).var("etotal", vec![-1.0, -2.0]);
        let mut reader = HistReader::new(src).unwrap();
        let err = reader.read_eterms(EnergyUnit::Ev).unwrap_err();
        assert!(matches!(
            err,
            HistError::Shape {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_eterms_units() {
        let mut reader = HistReader::new(relax_source(2)).unwrap();
        let ev = reader.read_eterms(EnergyUnit::Ev).unwrap();
        let ha = reader.read_eterms(EnergyUnit::Ha).unwrap();
        assert_eq!(ha.etotals, vec![-10.0, -10.1]);
        assert!((ev.etotals[0] + 10.0 * HA_TO_EV).abs() < 1e-9);
        assert!(ev.kinetic_terms.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_stress_and_pressure() {
        let mut reader = HistReader::new(relax_source(2)).unwrap();
        let (tensors, pressures) = reader.read_cart_stress_tensors().unwrap();
        assert_eq!(tensors.len(), 2);
        assert_eq!(tensors[0][1][0], 1e-6);
        assert_eq!(tensors[0][0][1], 1e-6);
        let expected = -(29421.033 / 3.0) * (-3e-4);
        assert!((pressures[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_type_and_element() {
        let src = relax_source(1).var("typat", vec![1.0, 3.0, 1.0]);
        let mut reader = HistReader::new(src).unwrap();
        assert!(matches!(reader.read_species(), Err(HistError::InvalidType { .. })));

        let src = relax_source(1).var("znucl", vec![14.0, 0.0]);
        let mut reader = HistReader::new(src).unwrap();
        assert!(matches!(reader.read_species(), Err(HistError::UnknownElement(_))));

        assert!(matches!(
            species_from_types(&[1.0, 2.0], &[14.0, 8.0], 3),
            Err(HistError::Shape { expected: 3, found: 2, .. })
        ));
    }

    #[test]
    fn test_missing_dimension() {
        let src = MemSource::new("empty.nc").dim("natom", 1);
        assert!(matches!(
            HistReader::new(src),
            Err(HistError::MissingDimension(_))
        ));
    }

    #[test]
    fn test_cart_coords_in_angstrom() {
        let mut reader = HistReader::new(relax_source(1)).unwrap();
        let xcart = reader.read_cart_coords().unwrap();
        assert!((xcart[0][2][0] - 5.0 * BOHR_TO_ANG).abs() < 1e-12);
    }
}
