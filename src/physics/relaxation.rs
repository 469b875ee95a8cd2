// src/physics/relaxation.rs

use crate::model::Structure;

/// Compares the initial and final structures of a relaxation.
pub struct RelaxationAnalyzer<'a> {
    pub initial: &'a Structure,
    pub final_structure: &'a Structure,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeChanges {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl<'a> RelaxationAnalyzer<'a> {
    pub fn new(initial: &'a Structure, final_structure: &'a Structure) -> Self {
        Self {
            initial,
            final_structure,
        }
    }

    /// Fractional volume change V_f / V_i - 1 (multiply by 100 for percent).
    pub fn percentage_volume_change(&self) -> f64 {
        self.final_structure.volume() / self.initial.volume() - 1.0
    }

    /// Fractional change of each lattice length.
    pub fn percentage_lattice_parameter_changes(&self) -> LatticeChanges {
        let i = self.initial.abc();
        let f = self.final_structure.abc();
        LatticeChanges {
            a: f[0] / i[0] - 1.0,
            b: f[1] / i[1] - 1.0,
            c: f[2] / i[2] - 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(a: f64, c: f64) -> Structure {
        Structure::from_reduced(
            [[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, c]],
            &["Si".to_string()],
            &[[0.0; 3]],
        )
    }

    #[test]
    fn test_changes() {
        let initial = cell(2.0, 4.0);
        let relaxed = cell(2.2, 4.0);
        let an = RelaxationAnalyzer::new(&initial, &relaxed);

        assert!((an.percentage_volume_change() - 0.21).abs() < 1e-12);
        let d = an.percentage_lattice_parameter_changes();
        assert!((d.a - 0.1).abs() < 1e-12);
        assert!((d.b - 0.1).abs() < 1e-12);
        assert!(d.c.abs() < 1e-12);
    }
}
