use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::elements::electronegativity;
use crate::utils::linalg;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Atom {
    pub element: String,
    /// Reduced coordinates
    pub frac_coords: [f64; 3],
    /// Cartesian position in Angstrom
    pub position: [f64; 3],
    /// Cartesian force in eV/Ang, zero if the file carries none
    pub force: [f64; 3],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Structure {
    // Lattice vectors in Angstrom: [a_vec, b_vec, c_vec]
    pub lattice: [[f64; 3]; 3],
    pub atoms: Vec<Atom>,
}

impl Structure {
    /// Builds a structure from reduced coordinates; cartesian positions follow from the lattice.
    pub fn from_reduced(lattice: [[f64; 3]; 3], species: &[String], xred: &[[f64; 3]]) -> Self {
        let atoms = species
            .iter()
            .zip(xred)
            .map(|(element, &frac)| Atom {
                element: element.clone(),
                frac_coords: frac,
                position: linalg::frac_to_cart(frac, &lattice),
                force: [0.0; 3],
            })
            .collect();

        Self { lattice, atoms }
    }

    /// Attaches one cartesian force per atom. Extra entries are ignored.
    pub fn with_forces(mut self, forces: &[[f64; 3]]) -> Self {
        for (atom, f) in self.atoms.iter_mut().zip(forces) {
            atom.force = *f;
        }
        self
    }

    pub fn num_sites(&self) -> usize {
        self.atoms.len()
    }

    /// Lattice lengths (a, b, c) in Angstrom.
    pub fn abc(&self) -> [f64; 3] {
        linalg::lattice_abc(&self.lattice)
    }

    /// Lattice angles (alpha, beta, gamma) in degrees.
    pub fn angles(&self) -> [f64; 3] {
        linalg::lattice_angles(&self.lattice)
    }

    pub fn volume(&self) -> f64 {
        linalg::cell_volume(&self.lattice)
    }

    /// Element -> number of atoms, sorted by symbol.
    pub fn composition(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.element.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Elements by increasing electronegativity, e.g. "Si2 O4". Elements
    /// without a Pauling value come last.
    pub fn formula(&self) -> String {
        let mut items: Vec<(String, usize)> = self.composition().into_iter().collect();
        items.sort_by(|(a, _), (b, _)| {
            let xa = electronegativity(a).unwrap_or(f64::INFINITY);
            let xb = electronegativity(b).unwrap_or(f64::INFINITY);
            xa.total_cmp(&xb).then_with(|| a.cmp(b))
        });
        items
            .iter()
            .map(|(el, count)| format!("{}{}", el, count))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Element symbols in first-appearance order.
    pub fn species_order(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for atom in &self.atoms {
            if !order.contains(&atom.element) {
                order.push(atom.element.clone());
            }
        }
        order
    }

    pub fn cart_forces(&self) -> Vec<[f64; 3]> {
        self.atoms.iter().map(|a| a.force).collect()
    }

    pub fn to_report(&self, verbose: u8, title: Option<&str>) -> String {
        crate::utils::report::structure_summary(self, verbose, title)
    }
}
