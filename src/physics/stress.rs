// src/physics/stress.rs

use crate::units::HA_BOHR3_TO_GPA;

/// Symmetric 3x3 cartesian stress tensor in Ha/Bohr^3.
pub type StressTensor = [[f64; 3]; 3];

/// Off-diagonal (row, col) pairs for components 3, 4 and 5 of `strten`.
///
/// ABINIT stores the six unique components in the order
/// (1,1), (2,2), (3,3), (3,2), (3,1), (2,1).
const VOIGT_PAIRS: [(usize, usize); 3] = [(2, 1), (2, 0), (1, 0)];

pub fn stress_tensor(c: [f64; 6]) -> StressTensor {
    let mut t = [[0.0; 3]; 3];
    for i in 0..3 {
        t[i][i] = c[i];
    }
    for (p, &(i, j)) in VOIGT_PAIRS.iter().enumerate() {
        t[i][j] = c[3 + p];
        t[j][i] = c[3 + p];
    }
    t
}

/// Isotropic pressure in GPa: -(K/3) * tr(sigma).
pub fn pressure(t: &StressTensor) -> f64 {
    let trace = t[0][0] + t[1][1] + t[2][2];
    -(HA_BOHR3_TO_GPA / 3.0) * trace
}

/// Tensors and pressures for a flattened (nstep, 6) `strten` array.
pub fn tensors_and_pressures(strten: &[f64]) -> (Vec<StressTensor>, Vec<f64>) {
    let tensors: Vec<StressTensor> = strten
        .chunks_exact(6)
        .map(|c| stress_tensor([c[0], c[1], c[2], c[3], c[4], c[5]]))
        .collect();
    let pressures = tensors.iter().map(pressure).collect();
    (tensors, pressures)
}

pub fn format_tensor(t: &StressTensor) -> String {
    t.iter()
        .map(|row| format!("[{:>14.6e} {:>14.6e} {:>14.6e}]", row[0], row[1], row[2]))
        .collect::<Vec<_>>()
        .join("\n")
}
