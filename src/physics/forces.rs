// src/physics/forces.rs

/// Statistics of the force moduli |F| of one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
}

impl ForceStats {
    pub fn from_forces(forces: &[[f64; 3]]) -> Self {
        if forces.is_empty() {
            return Self::default();
        }

        let moduli: Vec<f64> = forces
            .iter()
            .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
            .collect();
        let n = moduli.len() as f64;
        let mean = moduli.iter().sum::<f64>() / n;
        let var = moduli.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n;

        Self {
            min: moduli.iter().cloned().fold(f64::INFINITY, f64::min),
            max: moduli.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std: var.sqrt(),
        }
    }
}

/// One `ForceStats` per step of a (nstep, natom, 3) force history.
pub fn force_stats_per_step(history: &[Vec<[f64; 3]>]) -> Vec<ForceStats> {
    history.iter().map(|f| ForceStats::from_forces(f)).collect()
}
